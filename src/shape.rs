//! Relation shape resolution.
//!
//! Every relation instance is either a legacy scalar (one member of one
//! dimension) or a disambiguated set (member lists plus a caller-chosen
//! identifier). This module checks that a declaration is exactly one of the
//! two, resolves the active [`RelationMode`], and maps modes to and from the
//! tag stored in the [`RelationId`].

use crate::error::{Error, Result};
use crate::types::{Dimension, RelationDeclaration, RelationId, RelationKind, RelationMode};

/// Checks that `declaration` is a well-formed instance of `kind`.
///
/// # Errors
///
/// Returns a [`Configuration`](crate::ErrorKind::Configuration) error when
/// the parent is empty, a member type is not a dimension of `kind`, both or
/// neither of the scalar and set fields are populated, more than one scalar
/// is set, a member name is empty, one list spells the same member two ways
/// under the directory's case rules, or member lists are used without an
/// identifier (or an identifier without member lists).
pub fn validate(kind: RelationKind, declaration: &RelationDeclaration) -> Result<()> {
    let descriptor = kind.descriptor();

    if declaration.parent.is_empty() {
        return Err(Error::configuration(format!(
            "{kind}: the parent {} name must not be empty",
            descriptor.parent
        )));
    }

    for member_type in declaration.scalars.keys().chain(declaration.sets.keys()) {
        if descriptor.dimension(*member_type).is_none() {
            return Err(Error::configuration(format!(
                "{kind}: '{member_type}' members cannot be attached to a {}",
                descriptor.parent
            )));
        }
    }

    match (declaration.scalars.is_empty(), declaration.sets.is_empty()) {
        (false, false) => {
            return Err(Error::configuration(format!(
                "{kind}: a single member and member lists are mutually exclusive"
            )));
        },
        (true, true) => {
            return Err(Error::configuration(format!(
                "{kind}: declare either a single member or member lists"
            )));
        },
        _ => {},
    }

    if declaration.scalars.len() > 1 {
        return Err(Error::configuration(format!(
            "{kind}: only one single-member field may be set"
        )));
    }

    if declaration.scalars.values().any(String::is_empty)
        || declaration.sets.values().flatten().any(String::is_empty)
    {
        return Err(Error::configuration(format!("{kind}: member names must not be empty")));
    }

    for (member_type, members) in &declaration.sets {
        let Some(dimension) = descriptor.dimension(*member_type) else {
            continue;
        };
        let case = dimension.case_sensitivity();
        for (index, member) in members.iter().enumerate() {
            let variant = members[..index]
                .iter()
                .find(|earlier| earlier.as_str() != member.as_str() && case.matches(earlier, member));
            if let Some(earlier) = variant {
                return Err(Error::configuration(format!(
                    "{kind}: '{earlier}' and '{member}' name the same {member_type}"
                )));
            }
        }
    }

    let identifier = declaration.identifier.as_deref();
    if declaration.uses_sets() {
        if identifier.is_none_or(str::is_empty) {
            return Err(Error::configuration(format!(
                "{kind}: an identifier is required when member lists are used"
            )));
        }
    } else if identifier.is_some() {
        return Err(Error::configuration(format!(
            "{kind}: an identifier can only be used with member lists"
        )));
    }

    Ok(())
}

/// Validates `declaration` and returns its active mode.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::{MemberType, RelationDeclaration, RelationKind, RelationMode, shape};
///
/// let decl = RelationDeclaration::new("webservers").with_member(MemberType::HostGroup, "edge");
/// let mode = shape::resolve(RelationKind::HostGroupMember, &decl).unwrap();
/// assert_eq!(
///     mode,
///     RelationMode::LegacyScalar { member_type: MemberType::HostGroup, member: "edge".into() }
/// );
/// assert_eq!(shape::mode_tag(RelationKind::HostGroupMember, &mode).unwrap(), "hg");
/// ```
pub fn resolve(kind: RelationKind, declaration: &RelationDeclaration) -> Result<RelationMode> {
    validate(kind, declaration)?;

    if let Some(identifier) = &declaration.identifier {
        return Ok(RelationMode::DisambiguatedSet {
            identifier: identifier.clone(),
        });
    }

    match declaration.scalars.iter().next() {
        Some((member_type, member)) => Ok(RelationMode::LegacyScalar {
            member_type: *member_type,
            member: member.clone(),
        }),
        None => Err(Error::configuration(format!(
            "{kind}: declare either a single member or member lists"
        ))),
    }
}

/// Returns the identifier tag for `mode` under `kind`.
///
/// # Errors
///
/// Returns a configuration error if a legacy mode names a member type that
/// is not a dimension of `kind`.
pub fn mode_tag(kind: RelationKind, mode: &RelationMode) -> Result<&'static str> {
    let descriptor = kind.descriptor();
    match mode {
        RelationMode::DisambiguatedSet { .. } => Ok(descriptor.set_tag),
        RelationMode::LegacyScalar { member_type, .. } => descriptor
            .dimension(*member_type)
            .map(|dimension| dimension.legacy_tag)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "{kind}: '{member_type}' members cannot be attached to a {}",
                    descriptor.parent
                ))
            }),
    }
}

/// Composes the identifier of an instance of `kind` on `parent` in `mode`.
pub fn relation_id(kind: RelationKind, parent: &str, mode: &RelationMode) -> Result<RelationId> {
    Ok(RelationId::new(parent, mode_tag(kind, mode)?, mode.discriminator()))
}

/// Resolves a decoded identifier back to the mode it was created in.
///
/// # Errors
///
/// Returns [`MalformedIdentifier`](crate::ErrorKind::MalformedIdentifier) if
/// the tag is neither the set tag nor a legacy tag of `kind`.
pub fn mode_for_id(kind: RelationKind, id: &RelationId) -> Result<RelationMode> {
    let descriptor = kind.descriptor();

    if id.tag() == descriptor.set_tag {
        return Ok(RelationMode::DisambiguatedSet {
            identifier: id.discriminator().to_owned(),
        });
    }

    descriptor
        .dimension_for_tag(id.tag())
        .map(|dimension| RelationMode::LegacyScalar {
            member_type: dimension.member_type,
            member: id.discriminator().to_owned(),
        })
        .ok_or_else(|| {
            Error::malformed_identifier(format!(
                "unknown tag '{}' for {kind} in identifier '{id}'",
                id.tag()
            ))
        })
}

/// Returns the dimensions `mode` touches together with their member lists.
///
/// A legacy scalar touches only its own dimension with its single member.
/// A set touches every dimension declared in `declaration`, in descriptor
/// order, including dimensions declared with an empty list.
pub fn active_dimensions<'a>(
    kind: RelationKind,
    mode: &'a RelationMode,
    declaration: &'a RelationDeclaration,
) -> Vec<(&'static Dimension, &'a [String])> {
    let descriptor = kind.descriptor();
    match mode {
        RelationMode::LegacyScalar { member_type, member } => descriptor
            .dimension(*member_type)
            .map(|dimension| (dimension, std::slice::from_ref(member)))
            .into_iter()
            .collect(),
        RelationMode::DisambiguatedSet { .. } => descriptor
            .dimensions
            .iter()
            .filter_map(|dimension| {
                declaration
                    .members(dimension.member_type)
                    .map(|members| (dimension, members))
            })
            .collect(),
    }
}
