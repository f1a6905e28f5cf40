//! End-to-end reconciliation scenarios.

use freeipa_membership::testing::CallOperation;
use freeipa_membership::{
    Error, ErrorKind, FailedMember, InstanceState, MemberResult, MemberType, ObjectType,
    ReadOutcome, RelationInstance, RelationKind,
};

use crate::common::{fixture, set_of};

/// Creating a set-mode relation issues one add and returns `parent/mh/<identifier>`.
#[tokio::test]
async fn test_create_set_mode_single_add() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["a.example.com"], "frontend"),
    );

    let id = reconciler.create(&mut instance).await.unwrap();

    assert_eq!(id.to_string(), "webservers/mh/frontend");
    let calls = directory.member_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, CallOperation::Add);
    assert_eq!(calls[0].members, ["a.example.com"]);
}

/// Moving `[a, b]` to `[b, c]` adds exactly `c`, removes exactly `a`, and
/// never mentions `b`.
#[tokio::test]
async fn test_update_minimal_delta() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["a", "b"], "frontend"),
    );
    reconciler.create(&mut instance).await.unwrap();
    directory.clear_calls();

    reconciler
        .update(
            &mut instance,
            set_of("webservers", MemberType::Host, &["b", "c"], "frontend"),
        )
        .await
        .unwrap();

    let calls = directory.member_calls();
    assert_eq!(calls.len(), 2);
    let adds: Vec<_> = calls.iter().filter(|c| c.operation == CallOperation::Add).collect();
    let removes: Vec<_> = calls.iter().filter(|c| c.operation == CallOperation::Remove).collect();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].members, ["c"]);
    assert_eq!(removes.len(), 1);
    assert_eq!(removes[0].members, ["a"]);
    assert!(calls.iter().all(|c| !c.members.iter().any(|m| m == "b")));

    let mut stored = directory.members(RelationKind::HostGroupMember, "webservers", MemberType::Host);
    stored.sort();
    assert_eq!(stored, ["b", "c"]);
}

/// An update to the same list makes no directory call at all.
#[tokio::test]
async fn test_update_unchanged_makes_no_calls() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["a"], "frontend"),
    );
    reconciler.create(&mut instance).await.unwrap();
    directory.clear_calls();

    let deltas = reconciler
        .update(
            &mut instance,
            set_of("webservers", MemberType::Host, &["a"], "frontend"),
        )
        .await
        .unwrap();

    assert!(deltas.is_empty());
    assert_eq!(directory.call_count(), 0);
}

/// An add the directory accepts but completes for nobody is a distinct
/// `ZeroEffect` error carrying the directory's reasons.
#[tokio::test]
async fn test_zero_completed_is_zero_effect() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    directory.set_next_result(MemberResult {
        completed: 0,
        failed: vec![FailedMember::new("x", "no such entry")],
    });
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["x"], "frontend"),
    );

    let err = reconciler.create(&mut instance).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ZeroEffect);
    assert!(!err.is_transport());
    assert_eq!(err.failed_members(), [FailedMember::new("x", "no such entry")]);
    assert!(err.to_string().contains("x: no such entry"));
    assert_eq!(instance.state(), InstanceState::Unbound);
}

/// A read whose parent is gone reports `Absent` without an error.
#[tokio::test]
async fn test_read_missing_parent_is_absent() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["a"], "frontend"),
    );
    reconciler.create(&mut instance).await.unwrap();
    directory.remove_object(ObjectType::HostGroup, "webservers");

    let outcome = reconciler.read(&mut instance).await.unwrap();

    assert_eq!(outcome, ReadOutcome::Absent);
    assert_eq!(instance.state(), InstanceState::Absent);
}

/// Transport failures are surfaced verbatim and stay distinguishable from
/// zero-effect outcomes.
#[tokio::test]
async fn test_transport_error_is_not_zero_effect() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);
    directory.set_failure(Error::connection("connection refused"));
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["a"], "frontend"),
    );

    let err = reconciler.create(&mut instance).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.is_transport());
    assert!(err.failed_members().is_empty());
}

/// Members written with different casing still read back in the caller's
/// spelling, so the next plan sees no drift.
#[tokio::test]
async fn test_case_folding_does_not_cause_drift() {
    let (directory, reconciler) = fixture(&[(ObjectType::Group, "admins")]);
    directory.seed_member(RelationKind::GroupMember, "admins", MemberType::User, "Alice");
    let mut instance = RelationInstance::new(
        RelationKind::GroupMember,
        set_of("admins", MemberType::User, &["bob"], "core"),
    );
    reconciler.create(&mut instance).await.unwrap();

    let mut instance = RelationInstance::restore(
        RelationKind::GroupMember,
        "admins/mu/core",
        set_of("admins", MemberType::User, &["alice", "bob"], "core"),
    )
    .unwrap();
    reconciler.read(&mut instance).await.unwrap();

    assert_eq!(
        instance.declaration().members(MemberType::User).unwrap(),
        ["alice", "bob"]
    );
}
