//! Error kind enumeration for categorizing reconciliation errors.

/// Categorization of reconciliation errors.
///
/// This enum provides a stable interface for matching on error types. The
/// reconciler never retries on its own; the kind tells the caller what went
/// wrong so it can pick its own policy.
///
/// ## Error Classes
///
/// | ErrorKind             | Class          | Meaning                                        |
/// |-----------------------|----------------|------------------------------------------------|
/// | `Connection`          | transport      | Directory unreachable (DNS, TLS, refused)      |
/// | `Timeout`             | transport      | Directory did not answer in time               |
/// | `Unauthorized`        | transport      | Session rejected by the directory              |
/// | `Api`                 | transport      | Directory answered with an RPC error           |
/// | `InvalidResponse`     | transport      | Response body could not be interpreted         |
/// | `Transport`           | transport      | Any other HTTP/protocol failure                |
/// | `NotFound`            | state          | Parent object does not exist                   |
/// | `MalformedIdentifier` | corruption     | Stored identifier does not decompose           |
/// | `ZeroEffect`          | semantic       | Batch accepted but no member was changed       |
/// | `Configuration`       | configuration  | Declaration or client settings are invalid     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Connection error (DNS, TLS handshake, network unreachable).
    #[error("connection error")]
    Connection,

    /// Request timed out in the transport.
    #[error("timeout")]
    Timeout,

    /// The directory rejected the session or credentials.
    ///
    /// HTTP: 401 Unauthorized
    #[error("unauthorized")]
    Unauthorized,

    /// The directory returned an RPC-level error other than "not found".
    #[error("directory api error")]
    Api,

    /// Response could not be parsed or was malformed.
    #[error("invalid response")]
    InvalidResponse,

    /// Generic transport error for HTTP issues that don't fit
    /// more specific categories.
    #[error("transport error")]
    Transport,

    /// The parent object was not found in the directory.
    ///
    /// During a read this is turned into an `Absent` outcome and never
    /// reaches the caller as an error.
    #[error("not found")]
    NotFound,

    /// A relation identifier does not split into parent, tag and
    /// discriminator, or carries a tag the relation kind does not know.
    #[error("malformed identifier")]
    MalformedIdentifier,

    /// A non-empty add/remove batch completed zero members.
    ///
    /// The directory accepted the call but performed no change, usually
    /// because every requested member was already in the target state. The
    /// error carries the failed-member detail reported by the directory.
    #[error("zero effect")]
    ZeroEffect,

    /// Configuration error (mutually exclusive fields, missing identifier,
    /// invalid URL).
    #[error("configuration error")]
    Configuration,
}

impl ErrorKind {
    /// Returns `true` if this kind means the directory could not be reached
    /// or did not speak the expected protocol.
    ///
    /// Transport-class errors are propagated verbatim by every reconciler
    /// operation. They are distinct from [`ErrorKind::ZeroEffect`], which
    /// means the directory was reached and refused the semantic change.
    ///
    /// # Example
    ///
    /// ```rust
    /// use freeipa_membership::ErrorKind;
    ///
    /// assert!(ErrorKind::Timeout.is_transport());
    /// assert!(!ErrorKind::ZeroEffect.is_transport());
    /// ```
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ErrorKind::Connection
                | ErrorKind::Timeout
                | ErrorKind::Unauthorized
                | ErrorKind::Api
                | ErrorKind::InvalidResponse
                | ErrorKind::Transport
        )
    }

    /// Returns `true` if this kind is caused by the caller's input rather
    /// than by the directory.
    #[inline]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ErrorKind::Configuration | ErrorKind::MalformedIdentifier)
    }

    /// Maps an HTTP status code from the directory endpoint to an error kind.
    ///
    /// A 404 means the endpoint itself is missing, so it maps to
    /// [`ErrorKind::Transport`]. Missing objects are reported in the
    /// JSON-RPC error body instead.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Unauthorized,
            408 | 504 => ErrorKind::Timeout,
            502 | 503 => ErrorKind::Connection,
            _ => ErrorKind::Transport,
        }
    }
}
