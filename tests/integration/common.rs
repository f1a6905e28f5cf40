//! Shared fixtures for the integration tests.

use std::sync::{Arc, Once};

use freeipa_membership::testing::MockDirectory;
use freeipa_membership::{MemberType, ObjectType, Reconciler, RelationDeclaration};

static TRACING: Once = Once::new();

/// Installs a `tracing` subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A mock directory holding the given parent objects, and a reconciler on it.
pub fn fixture(objects: &[(ObjectType, &str)]) -> (Arc<MockDirectory>, Reconciler) {
    init_tracing();
    let directory = MockDirectory::new();
    for (object_type, name) in objects {
        directory.insert_object(*object_type, *name);
    }
    let directory = Arc::new(directory);
    let reconciler = Reconciler::new(directory.clone());
    (directory, reconciler)
}

/// A set-mode declaration with one dimension.
pub fn set_of(
    parent: &str,
    member_type: MemberType,
    members: &[&str],
    identifier: &str,
) -> RelationDeclaration {
    RelationDeclaration::new(parent)
        .with_members(member_type, members.iter().copied())
        .with_identifier(identifier)
}
