//! Composite identifiers for relation instances.
//!
//! A relation instance is persisted by the caller under a single opaque
//! string of the form `parent/tag/discriminator`:
//!
//! - `parent` is the parent object's name with every `%` escaped as `%25`
//!   and every `/` as `%2F` (HBAC service names such as `/bin/bash` are
//!   path-like);
//! - `tag` names the relation mode (`h`, `hg`, `mh`, `msrac`, ...);
//! - `discriminator` is the single member (legacy scalar mode) or the
//!   caller's identifier (set mode). It is stored verbatim and may itself
//!   contain `/`, because parsing stops after the second separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Separator between the three identifier segments.
const SEPARATOR: char = '/';

/// Escape sequence substituted for `/` inside parent names.
const ESCAPED_SEPARATOR: &str = "%2F";

/// Escape sequence substituted for `%` inside parent names.
const ESCAPED_PERCENT: &str = "%25";

/// Escapes a parent name so it can occupy the first identifier segment.
///
/// `%` is escaped before `/`, so a name that already contains `%2F` keeps
/// its text through a round trip.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::types::encode_name;
///
/// assert_eq!(encode_name("/bin/bash"), "%2Fbin%2Fbash");
/// assert_eq!(encode_name("50%2Foff"), "50%252Foff");
/// assert_eq!(encode_name("webservers"), "webservers");
/// ```
pub fn encode_name(name: &str) -> String {
    name.replace('%', ESCAPED_PERCENT)
        .replace(SEPARATOR, ESCAPED_SEPARATOR)
}

/// Reverses [`encode_name`].
///
/// Every `%` in an encoded name starts an escape, so unescaping `/` first
/// cannot consume part of an escaped `%`.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::types::decode_name;
///
/// assert_eq!(decode_name("%2Fbin%2Fbash"), "/bin/bash");
/// assert_eq!(decode_name("50%252Foff"), "50%2Foff");
/// ```
pub fn decode_name(name: &str) -> String {
    name.replace(ESCAPED_SEPARATOR, "/")
        .replace(ESCAPED_PERCENT, "%")
}

/// The durable identifier of a relation instance.
///
/// ## String Format
///
/// ```rust
/// use freeipa_membership::RelationId;
///
/// let id = RelationId::new("sshd-admins", "srac", "/usr/bin/systemctl restart sshd");
/// assert_eq!(id.to_string(), "sshd-admins/srac//usr/bin/systemctl restart sshd");
///
/// let parsed: RelationId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelationId {
    parent: String,
    tag: String,
    discriminator: String,
}

impl RelationId {
    /// Creates an identifier from its three parts.
    pub fn new(
        parent: impl Into<String>,
        tag: impl Into<String>,
        discriminator: impl Into<String>,
    ) -> Self {
        Self {
            parent: parent.into(),
            tag: tag.into(),
            discriminator: discriminator.into(),
        }
    }

    /// Splits an identifier string into parent, tag and discriminator.
    ///
    /// The string is split on `/` into at most three segments, so a
    /// discriminator containing `/` survives intact. Fewer than three
    /// segments, or an empty segment, is a malformed identifier.
    pub fn decompose(id: &str) -> Result<Self, Error> {
        let mut segments = id.splitn(3, SEPARATOR);
        let (Some(parent), Some(tag), Some(discriminator)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(Error::malformed_identifier(format!(
                "expected 'parent/tag/discriminator', got '{}'",
                id
            )));
        };

        if parent.is_empty() {
            return Err(Error::malformed_identifier(format!(
                "identifier '{}' has an empty parent segment",
                id
            )));
        }
        if tag.is_empty() {
            return Err(Error::malformed_identifier(format!(
                "identifier '{}' has an empty tag segment",
                id
            )));
        }
        if discriminator.is_empty() {
            return Err(Error::malformed_identifier(format!(
                "identifier '{}' has an empty discriminator segment",
                id
            )));
        }

        Ok(Self::new(decode_name(parent), tag, discriminator))
    }

    /// Renders the identifier string. Same as `to_string()`.
    pub fn compose(&self) -> String {
        self.to_string()
    }

    /// Returns the parent object's name, unescaped.
    #[inline]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Returns the mode tag.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the member name or the caller's set identifier.
    #[inline]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            encode_name(&self.parent),
            SEPARATOR,
            self.tag,
            SEPARATOR,
            self.discriminator
        )
    }
}

impl FromStr for RelationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decompose(s)
    }
}

impl TryFrom<String> for RelationId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decompose(&value)
    }
}

impl From<RelationId> for String {
    fn from(id: RelationId) -> Self {
        id.to_string()
    }
}
