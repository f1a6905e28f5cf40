//! Directory transport layer.
//!
//! The reconciler talks to the directory only through the
//! [`DirectoryClient`] trait. Two implementations ship with the crate:
//!
//! - [`RpcTransport`] - FreeIPA JSON-RPC over HTTPS (via reqwest)
//! - [`MockDirectory`](crate::testing::MockDirectory) - in-memory directory
//!   for tests
//!
//! ## Feature Flags
//!
//! - `rpc` (default): Enable the JSON-RPC transport

pub(crate) mod traits;

#[cfg(feature = "rpc")]
pub(crate) mod rpc;

pub use traits::{
    DirectoryClient, DirectoryObject, MemberRequest, MemberResult, Transport, TransportStats,
};

#[cfg(feature = "rpc")]
pub use rpc::RpcTransport;
