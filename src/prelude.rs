//! Prelude module for convenient imports.
//!
//! ```rust
//! use freeipa_membership::prelude::*;
//! ```
//!
//! This provides access to:
//! - The reconciler and relation instances
//! - Declarations, kinds and member types
//! - Error types
//! - Directory configuration and transports

#[cfg(feature = "rpc")]
pub use crate::transport::RpcTransport;
pub use crate::{
    config::{DirectoryConfig, TlsConfig},
    error::{Error, ErrorKind, Result},
    reconcile::{InstanceState, ReadOutcome, Reconciler, RelationInstance},
    shape,
    transport::DirectoryClient,
    types::{MemberType, RelationDeclaration, RelationId, RelationKind, RelationMode},
};
