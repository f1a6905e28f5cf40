//! Declared relation fields and the resolved relation mode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::member::MemberType;

/// The fields of one relation instance as the configuration layer declares
/// them.
///
/// A declaration uses **either** a single scalar member (legacy mode) **or**
/// one or two member sets plus an `identifier` (set mode). Which one is
/// active is decided by [`shape::resolve`](crate::shape::resolve).
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::{MemberType, RelationDeclaration};
///
/// // Legacy scalar: one host in the "webservers" host group.
/// let legacy = RelationDeclaration::new("webservers")
///     .with_member(MemberType::Host, "web01.example.com");
///
/// // Disambiguated set: several hosts and a host group, told apart from
/// // sibling declarations on the same group by "frontend".
/// let set = RelationDeclaration::new("webservers")
///     .with_members(MemberType::Host, ["web01.example.com", "web02.example.com"])
///     .with_members(MemberType::HostGroup, ["edge"])
///     .with_identifier("frontend");
/// assert_eq!(set.members(MemberType::Host).map(|m| m.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDeclaration {
    /// Name of the parent object (group, rule, ...).
    pub parent: String,

    /// Legacy single-member fields, keyed by member type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scalars: BTreeMap<MemberType, String>,

    /// Member set fields, keyed by member type. A key that is present counts
    /// as populated even when its list is empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sets: BTreeMap<MemberType, Vec<String>>,

    /// Caller-chosen name distinguishing sibling set-mode instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl RelationDeclaration {
    /// Creates an empty declaration for the given parent.
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            ..Default::default()
        }
    }

    /// Sets the legacy single member of a dimension.
    #[must_use]
    pub fn with_member(mut self, member_type: MemberType, member: impl Into<String>) -> Self {
        self.scalars.insert(member_type, member.into());
        self
    }

    /// Sets the member list of a dimension.
    #[must_use]
    pub fn with_members<I, S>(mut self, member_type: MemberType, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .insert(member_type, members.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the set-mode identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Returns the declared member list of a dimension, if populated.
    pub fn members(&self, member_type: MemberType) -> Option<&[String]> {
        self.sets.get(&member_type).map(Vec::as_slice)
    }

    /// Returns the legacy single member of a dimension, if set.
    pub fn member(&self, member_type: MemberType) -> Option<&str> {
        self.scalars.get(&member_type).map(String::as_str)
    }

    /// Returns `true` if any set field is populated.
    pub fn uses_sets(&self) -> bool {
        !self.sets.is_empty()
    }
}

/// The active shape of a relation instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationMode {
    /// Exactly one member of one dimension.
    ///
    /// Legacy scalar instances are immutable: any change is a replacement.
    LegacyScalar {
        /// The dimension the member belongs to.
        member_type: MemberType,
        /// The member's name as declared.
        member: String,
    },
    /// Arbitrary member sets per dimension, distinguished from sibling
    /// instances on the same parent by `identifier`.
    DisambiguatedSet {
        /// The caller's identifier.
        identifier: String,
    },
}

impl RelationMode {
    /// Returns `true` for [`RelationMode::LegacyScalar`].
    pub fn is_legacy(&self) -> bool {
        matches!(self, RelationMode::LegacyScalar { .. })
    }

    /// Returns the identifier discriminator for this mode: the member name
    /// in legacy mode, the caller's identifier in set mode.
    pub fn discriminator(&self) -> &str {
        match self {
            RelationMode::LegacyScalar { member, .. } => member,
            RelationMode::DisambiguatedSet { identifier } => identifier,
        }
    }
}
