//! Main error type for the reconciliation engine.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use super::ErrorKind;
use crate::types::FailedMember;

/// The primary error type for membership reconciliation.
///
/// `Error` provides context for debugging and error handling:
/// - [`kind()`](Error::kind): Categorization for `match` statements
/// - [`failed_members()`](Error::failed_members): Per-member rejection detail
///   for [`ErrorKind::ZeroEffect`]
/// - [`is_transport()`](Error::is_transport): Quick "directory unreachable"
///   check
///
/// ## Error Hierarchy
///
/// ```text
/// Error
/// ├── kind: ErrorKind          (category for matching)
/// ├── message: String          (human-readable description)
/// ├── failed: Vec              (members the directory refused)
/// └── source: Option           (underlying cause)
/// ```
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::{Error, ErrorKind};
///
/// fn describe(err: &Error) -> String {
///     match err.kind() {
///         ErrorKind::ZeroEffect => {
///             let names: Vec<_> = err.failed_members().iter().map(|m| m.name.as_str()).collect();
///             format!("directory refused: {}", names.join(", "))
///         }
///         kind if kind.is_transport() => format!("directory unreachable: {}", err),
///         _ => err.to_string(),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    /// The error category.
    kind: ErrorKind,

    /// Human-readable error message.
    message: Cow<'static, str>,

    /// Members the directory reported as failed.
    failed: Vec<FailedMember>,

    /// The underlying error, if any.
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use freeipa_membership::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::Configuration, "identifier is required");
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            failed: Vec::new(),
            source: None,
        }
    }

    /// Creates an error from a kind with a default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::Connection => "connection failed",
            ErrorKind::Timeout => "request timed out",
            ErrorKind::Unauthorized => "session rejected",
            ErrorKind::Api => "directory returned an error",
            ErrorKind::InvalidResponse => "unparseable directory response",
            ErrorKind::Transport => "transport failure",
            ErrorKind::NotFound => "object not found",
            ErrorKind::MalformedIdentifier => "malformed relation identifier",
            ErrorKind::ZeroEffect => "batch completed no members",
            ErrorKind::Configuration => "invalid configuration",
        };
        Self::new(kind, message)
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message without the kind prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the members the directory refused, if any.
    ///
    /// Populated for [`ErrorKind::ZeroEffect`] so callers can see which
    /// members were rejected and why.
    #[inline]
    pub fn failed_members(&self) -> &[FailedMember] {
        &self.failed
    }

    /// Returns `true` if the directory could not be reached or answered
    /// outside the expected protocol.
    #[inline]
    pub fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }

    /// Returns `true` if this is a "parent object does not exist" error.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Attaches the failed-member detail to this error.
    #[must_use]
    pub fn with_failed_members(mut self, failed: Vec<FailedMember>) -> Self {
        self.failed = failed;
        self
    }

    /// Sets the source error for this error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors for common error types

    /// Creates a not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a malformed identifier error.
    pub fn malformed_identifier(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MalformedIdentifier, message)
    }

    /// Creates a zero-effect error carrying the refused members.
    pub fn zero_effect(
        message: impl Into<Cow<'static, str>>,
        failed: Vec<FailedMember>,
    ) -> Self {
        Self::new(ErrorKind::ZeroEffect, message).with_failed_members(failed)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates a directory API error.
    pub fn api(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    /// Creates a generic transport error.
    pub fn transport(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if !self.failed.is_empty() {
            write!(f, " (failed: ")?;
            for (i, member) in self.failed.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", member)?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::configuration(format!("invalid URL: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::invalid_response(format!("JSON error: {}", err)).with_source(err)
    }
}
