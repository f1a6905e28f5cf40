//! # freeipa-membership
//!
//! Set-membership reconciliation for FreeIPA relations: host groups, user
//! groups, HBAC rules, sudo rules, sudo command groups and HBAC service
//! groups.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use freeipa_membership::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = DirectoryConfig::from_url("https://ipa.example.com")?;
//!     config.session_cookie = Some("ipa_session=MagBearerToken=...".into());
//!     let reconciler = Reconciler::new(Arc::new(RpcTransport::new(&config)?));
//!
//!     // Hosts and a host group in "allow_ssh", told apart from other host
//!     // declarations on the same rule by "bastions".
//!     let declaration = RelationDeclaration::new("allow_ssh")
//!         .with_members(MemberType::Host, ["bastion1.example.com"])
//!         .with_members(MemberType::HostGroup, ["jump"])
//!         .with_identifier("bastions");
//!     shape::validate(RelationKind::HbacPolicyHost, &declaration)?;
//!
//!     let mut instance = RelationInstance::new(RelationKind::HbacPolicyHost, declaration);
//!     let id = reconciler.create(&mut instance).await?;
//!     println!("store this: {}", id); // allow_ssh/mh/bastions
//!
//!     // Next run: restore from the stored identifier and converge.
//!     if reconciler.read(&mut instance).await?.is_absent() {
//!         println!("relation is gone, recreate it");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Two shapes**: a relation instance is either one member of one
//!   dimension (legacy scalar) or member lists plus an `identifier`
//!   (disambiguated set). See [`shape`].
//! - **Identifier**: `parent/tag/discriminator`, with `%` and `/` in
//!   the parent escaped as `%25` and `%2F`. See [`RelationId`].
//! - **Case rules**: the directory folds member case (except sudo commands);
//!   local state keeps the caller's spelling. See [`matcher`].
//! - **Absent ≠ Error**: a missing parent on read is
//!   [`ReadOutcome::Absent`], not `Err`.
//! - **Zero effect is an error**: a non-empty batch that changed nothing
//!   fails with [`ErrorKind::ZeroEffect`] and the directory's reasons.
//!
//! ## Features
//!
//! - `rpc` (default): Enable the JSON-RPC transport via reqwest
//! - `rustls` (default): Use rustls for TLS
//! - `native-tls`: Use native TLS (OpenSSL on Linux, Secure Transport on macOS)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod config;
pub mod delta;
pub mod error;
pub mod matcher;
pub mod shape;
pub mod types;

// Reconciliation
pub mod reconcile;

// Transport layer
pub mod transport;

// Testing utilities
pub mod testing;

mod user_agent;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use config::{DirectoryConfig, TlsConfig};
pub use delta::Delta;
pub use error::{Error, ErrorKind, Result};
pub use reconcile::{
    DimensionDelta, InstanceState, ReadOutcome, Reconciler, RelationInstance,
};
pub use transport::{
    DirectoryClient, DirectoryObject, MemberRequest, MemberResult, Transport, TransportStats,
};
#[cfg(feature = "rpc")]
pub use transport::RpcTransport;
pub use types::{
    CaseSensitivity, Dimension, FailedMember, KindDescriptor, MemberType, ObjectType,
    RelationDeclaration, RelationId, RelationKind, RelationMode,
};
