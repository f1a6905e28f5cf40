//! Directory client trait and the request/response types it exchanges.

use std::collections::BTreeMap;

use crate::Error;
use crate::types::{FailedMember, MemberType, ObjectType, RelationKind};

// ============================================================================
// Transport Enum
// ============================================================================

/// Available directory client implementations.
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::Transport;
///
/// let transport = Transport::JsonRpc;
/// assert!(transport.is_json_rpc());
/// assert_eq!(transport.to_string(), "JSON-RPC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// FreeIPA JSON-RPC over HTTPS (default).
    #[default]
    JsonRpc,
    /// In-memory directory - for testing without a server.
    Mock,
}

impl Transport {
    /// Returns `true` if this is the JSON-RPC transport.
    pub fn is_json_rpc(&self) -> bool {
        matches!(self, Transport::JsonRpc)
    }

    /// Returns `true` if this is the in-memory transport.
    pub fn is_mock(&self) -> bool {
        matches!(self, Transport::Mock)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::JsonRpc => write!(f, "JSON-RPC"),
            Transport::Mock => write!(f, "Mock"),
        }
    }
}

// ============================================================================
// Transport Stats
// ============================================================================

/// Request counters for a directory client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Total requests sent.
    pub requests_sent: u64,
    /// Requests that ended in an error, including RPC-level errors.
    pub requests_failed: u64,
}

// ============================================================================
// Member Request/Result
// ============================================================================

/// A batched add or remove of members of one dimension on one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRequest {
    /// The relation kind, which selects the directory command.
    pub kind: RelationKind,
    /// The parent object's name.
    pub parent: String,
    /// The dimension being changed.
    pub member_type: MemberType,
    /// The members to add or remove. Never empty.
    pub members: Vec<String>,
}

impl MemberRequest {
    /// Creates a member request.
    pub fn new(
        kind: RelationKind,
        parent: impl Into<String>,
        member_type: MemberType,
        members: Vec<String>,
    ) -> Self {
        Self {
            kind,
            parent: parent.into(),
            member_type,
            members,
        }
    }
}

/// The outcome of a batched member operation.
///
/// The directory applies what it can and reports the rest: a request with
/// three members may complete two and list the third in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberResult {
    /// Number of members the directory changed.
    pub completed: u32,
    /// Members the directory refused, with its reasons.
    pub failed: Vec<FailedMember>,
}

impl MemberResult {
    /// Creates a result where every one of `count` members succeeded.
    pub fn completed(count: u32) -> Self {
        Self {
            completed: count,
            failed: Vec::new(),
        }
    }

    /// Returns `true` if nothing was changed.
    #[inline]
    pub fn is_zero_effect(&self) -> bool {
        self.completed == 0
    }
}

// ============================================================================
// Directory Object
// ============================================================================

/// A parent object as read back from the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryObject {
    /// The object's name.
    pub name: String,
    /// Multi-valued attributes, keyed by attribute name.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryObject {
    /// Creates an object with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the values of `attribute`, or an empty slice if the directory
    /// omitted it. FreeIPA omits membership attributes that have no values.
    pub fn attribute(&self, attribute: &str) -> &[String] {
        self.attributes.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ============================================================================
// Directory Client Trait
// ============================================================================

/// Operations the reconciler needs from the directory.
///
/// Implemented by the JSON-RPC transport and the in-memory mock. Each call
/// is a single request; implementations do not retry.
#[async_trait::async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Adds members to a parent. Members that are already present come back
    /// in [`MemberResult::failed`].
    ///
    /// Returns a [`NotFound`](crate::ErrorKind::NotFound) error if the parent
    /// does not exist.
    async fn add_member(&self, request: MemberRequest) -> Result<MemberResult, Error>;

    /// Removes members from a parent. Members that are not present come back
    /// in [`MemberResult::failed`].
    ///
    /// Returns a [`NotFound`](crate::ErrorKind::NotFound) error if the parent
    /// does not exist.
    async fn remove_member(&self, request: MemberRequest) -> Result<MemberResult, Error>;

    /// Reads a parent object with all of its attributes.
    ///
    /// Returns a [`NotFound`](crate::ErrorKind::NotFound) error if the object
    /// does not exist.
    async fn show_object(&self, object_type: ObjectType, name: &str) -> Result<DirectoryObject, Error>;

    /// Returns the transport type.
    fn transport_type(&self) -> Transport;

    /// Returns request counters.
    fn stats(&self) -> TransportStats;
}
