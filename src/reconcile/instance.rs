//! Relation instances and their lifecycle state.

use std::fmt;

use crate::error::Result;
use crate::shape;
use crate::types::{RelationDeclaration, RelationId, RelationKind, RelationMode};

/// Where a relation instance is in its lifecycle.
///
/// ```text
/// Unbound ──create──▶ Created ──read──▶ Verified | Absent
///                                          │
///                                          ├──update──▶ Updated (repeatable)
///                                          └──delete──▶ Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstanceState {
    /// Declared but never created; there is no identifier.
    #[default]
    Unbound,
    /// Created, or restored from a stored identifier.
    Created,
    /// Confirmed present by the last read.
    Verified,
    /// The last read found the parent or the member gone.
    Absent,
    /// Changed in place by an update.
    Updated,
    /// Removed from the directory.
    Deleted,
}

impl InstanceState {
    /// Returns `true` if the instance has an identifier the directory may
    /// still back.
    pub fn is_bound(&self) -> bool {
        matches!(
            self,
            InstanceState::Created | InstanceState::Verified | InstanceState::Updated
        )
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceState::Unbound => "unbound",
            InstanceState::Created => "created",
            InstanceState::Verified => "verified",
            InstanceState::Absent => "absent",
            InstanceState::Updated => "updated",
            InstanceState::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// One relation instance: a declaration plus what is known about it in the
/// directory.
///
/// The [`Reconciler`](super::Reconciler) drives instances through their
/// lifecycle; callers persist [`id`](Self::id) between runs and bring an
/// instance back with [`restore`](Self::restore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInstance {
    pub(super) kind: RelationKind,
    pub(super) id: Option<RelationId>,
    pub(super) mode: Option<RelationMode>,
    pub(super) declaration: RelationDeclaration,
    pub(super) state: InstanceState,
}

impl RelationInstance {
    /// Creates an unbound instance from a declaration.
    pub fn new(kind: RelationKind, declaration: RelationDeclaration) -> Self {
        Self {
            kind,
            id: None,
            mode: None,
            declaration,
            state: InstanceState::Unbound,
        }
    }

    /// Restores an instance from its stored identifier and last-known
    /// declaration.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedIdentifier`](crate::ErrorKind::MalformedIdentifier)
    /// if `id` does not decompose or its tag is unknown for `kind`.
    pub fn restore(kind: RelationKind, id: &str, declaration: RelationDeclaration) -> Result<Self> {
        let id = RelationId::decompose(id)?;
        let mode = shape::mode_for_id(kind, &id)?;
        Ok(Self {
            kind,
            id: Some(id),
            mode: Some(mode),
            declaration,
            state: InstanceState::Created,
        })
    }

    /// Restores an instance from nothing but its identifier.
    ///
    /// The parent and, for legacy scalars, the member are taken from the
    /// identifier; a subsequent read fills in the rest.
    pub fn import(kind: RelationKind, id: &str) -> Result<Self> {
        let mut instance = Self::restore(kind, id, RelationDeclaration::default())?;
        if let (Some(id), Some(mode)) = (&instance.id, &instance.mode) {
            instance.declaration.parent = id.parent().to_owned();
            match mode {
                RelationMode::LegacyScalar { member_type, member } => {
                    instance.declaration.scalars.insert(*member_type, member.clone());
                },
                RelationMode::DisambiguatedSet { identifier } => {
                    instance.declaration.identifier = Some(identifier.clone());
                },
            }
        }
        Ok(instance)
    }

    /// Returns the relation kind.
    #[inline]
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Returns the identifier, once created.
    #[inline]
    pub fn id(&self) -> Option<&RelationId> {
        self.id.as_ref()
    }

    /// Returns the active mode, once created or restored.
    #[inline]
    pub fn mode(&self) -> Option<&RelationMode> {
        self.mode.as_ref()
    }

    /// Returns the last-known declaration.
    #[inline]
    pub fn declaration(&self) -> &RelationDeclaration {
        &self.declaration
    }

    /// Returns the lifecycle state.
    #[inline]
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Returns the parent name used in logs: the identifier's parent once
    /// bound, the declared one before.
    pub(super) fn parent(&self) -> &str {
        self.id
            .as_ref()
            .map_or(self.declaration.parent.as_str(), RelationId::parent)
    }
}
