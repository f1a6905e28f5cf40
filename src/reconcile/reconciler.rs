//! The relation reconciler.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::instance::{InstanceState, RelationInstance};
use crate::delta::Delta;
use crate::error::{Error, Result};
use crate::matcher::{contains_member, filter_present};
use crate::shape;
use crate::transport::{DirectoryClient, MemberRequest, MemberResult};
use crate::types::{
    CaseSensitivity, MemberType, RelationDeclaration, RelationId, RelationKind, RelationMode,
};

/// The outcome of [`Reconciler::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The relation exists and the instance reflects it.
    Verified,
    /// The parent or the legacy member is gone; the caller should forget the
    /// instance.
    Absent,
}

impl ReadOutcome {
    /// Returns `true` for [`ReadOutcome::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }
}

/// The change applied to one dimension by [`Reconciler::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionDelta {
    /// The dimension.
    pub member_type: MemberType,
    /// The members added and removed.
    pub delta: Delta,
}

/// Converges relation instances against the directory.
///
/// One reconciler serves every [`RelationKind`]: the kind's descriptor
/// supplies the commands, attributes and tags. Each operation issues its
/// directory calls one after another and never retries; a failed operation
/// can be retried as a whole.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use freeipa_membership::testing::MockDirectory;
/// use freeipa_membership::{
///     MemberType, ObjectType, Reconciler, RelationDeclaration, RelationInstance, RelationKind,
/// };
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let directory = Arc::new(MockDirectory::new().with_object(ObjectType::HostGroup, "webservers"));
/// let reconciler = Reconciler::new(directory.clone());
///
/// let declaration = RelationDeclaration::new("webservers")
///     .with_members(MemberType::Host, ["a.example.com"])
///     .with_identifier("frontend");
/// let mut instance = RelationInstance::new(RelationKind::HostGroupMember, declaration);
///
/// let id = reconciler.create(&mut instance).await.unwrap();
/// assert_eq!(id.compose(), "webservers/mh/frontend");
/// # });
/// ```
#[derive(Clone)]
pub struct Reconciler {
    directory: Arc<dyn DirectoryClient>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("transport", &self.directory.transport_type())
            .finish()
    }
}

impl Reconciler {
    /// Creates a reconciler over a directory client.
    pub fn new(directory: Arc<dyn DirectoryClient>) -> Self {
        Self { directory }
    }

    /// Returns the directory client.
    pub fn directory(&self) -> &Arc<dyn DirectoryClient> {
        &self.directory
    }

    /// Creates the relation: one batched add per declared dimension.
    ///
    /// On success the instance is `Created` and holds its identifier. On any
    /// failure it stays `Unbound` with no identifier.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the declaration is invalid or the instance was
    ///   already created
    /// - `ZeroEffect` if a non-empty batch completed no members
    /// - transport errors and `NotFound` (missing parent) verbatim
    #[instrument(
        skip_all,
        fields(kind = %instance.kind, parent = %instance.declaration.parent)
    )]
    pub async fn create(&self, instance: &mut RelationInstance) -> Result<RelationId> {
        if instance.state != InstanceState::Unbound {
            return Err(Error::configuration(format!(
                "{}: instance is already {}",
                instance.kind, instance.state
            )));
        }

        let kind = instance.kind;
        let mode = shape::resolve(kind, &instance.declaration)?;
        let id = shape::relation_id(kind, &instance.declaration.parent, &mode)?;

        for (dimension, members) in shape::active_dimensions(kind, &mode, &instance.declaration) {
            if members.is_empty() {
                continue;
            }
            let request = MemberRequest::new(
                kind,
                instance.declaration.parent.clone(),
                dimension.member_type,
                Delta::between(None::<&[String]>, members).added,
            );
            self.add(request).await?;
        }

        info!(id = %id, "relation created");
        instance.id = Some(id.clone());
        instance.mode = Some(mode);
        instance.state = InstanceState::Created;
        Ok(id)
    }

    /// Reads the relation back from the directory.
    ///
    /// A missing parent, or a legacy member no longer present, is reported
    /// as [`ReadOutcome::Absent`] rather than an error. For sets, every
    /// declared dimension is narrowed to the members the directory still
    /// holds, keeping the declared spelling.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the instance has no identifier
    /// - `MalformedIdentifier` if the identifier's tag is unknown
    /// - transport errors verbatim
    #[instrument(skip_all, fields(kind = %instance.kind, parent = %instance.parent()))]
    pub async fn read(&self, instance: &mut RelationInstance) -> Result<ReadOutcome> {
        let kind = instance.kind;
        let id = bound_id(instance)?;
        let mode = shape::mode_for_id(kind, &id)?;

        let object = match self.directory.show_object(kind.parent_type(), id.parent()).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => {
                warn!(id = %id, "parent not found, relation is absent");
                instance.state = InstanceState::Absent;
                return Ok(ReadOutcome::Absent);
            },
            Err(e) => return Err(e),
        };

        let descriptor = kind.descriptor();
        let declaration = &mut instance.declaration;
        declaration.parent = id.parent().to_owned();

        let outcome = match &mode {
            RelationMode::LegacyScalar { member_type, member } => {
                let present = descriptor.dimension(*member_type).is_some_and(|dimension| {
                    contains_member(
                        object.attribute(dimension.attribute),
                        member,
                        dimension.case_sensitivity(),
                    )
                });
                if present {
                    declaration.scalars.clear();
                    declaration.scalars.insert(*member_type, member.clone());
                    declaration.sets.clear();
                    declaration.identifier = None;
                    ReadOutcome::Verified
                } else {
                    ReadOutcome::Absent
                }
            },
            RelationMode::DisambiguatedSet { identifier } => {
                declaration.identifier = Some(identifier.clone());
                for dimension in descriptor.dimensions {
                    if let Some(held) = declaration.sets.get_mut(&dimension.member_type) {
                        let observed = object.attribute(dimension.attribute);
                        *held = filter_present(observed, held.as_slice(), dimension.case_sensitivity());
                    }
                }
                ReadOutcome::Verified
            },
        };

        instance.mode = Some(mode);
        instance.state = match outcome {
            ReadOutcome::Verified => InstanceState::Verified,
            ReadOutcome::Absent => {
                warn!(id = %id, "member no longer present, relation is absent");
                InstanceState::Absent
            },
        };
        debug!(state = %instance.state, "relation read");
        Ok(outcome)
    }

    /// Moves a set-mode relation to `desired`, one dimension at a time.
    ///
    /// Each dimension issues at most one add (exactly the new members) and
    /// one remove (exactly the dropped members); unchanged dimensions issue
    /// nothing. The instance tracks each successful call, so retrying after
    /// a partial failure only repeats the calls that did not happen.
    ///
    /// Returns the non-empty per-dimension deltas.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `desired` is invalid, the instance is not bound,
    ///   is a legacy scalar, or the change needs a replacement (different
    ///   parent, identifier, or mode)
    /// - `ZeroEffect` if a non-empty batch completed no members
    /// - transport errors and `NotFound` verbatim
    #[instrument(skip_all, fields(kind = %instance.kind, parent = %instance.parent()))]
    pub async fn update(
        &self,
        instance: &mut RelationInstance,
        desired: RelationDeclaration,
    ) -> Result<Vec<DimensionDelta>> {
        let kind = instance.kind;
        let id = bound_id(instance)?;
        if !instance.state.is_bound() {
            return Err(Error::configuration(format!(
                "{kind}: cannot update an instance that is {}",
                instance.state
            )));
        }

        let current = shape::mode_for_id(kind, &id)?;
        let RelationMode::DisambiguatedSet { identifier } = &current else {
            return Err(Error::configuration(format!(
                "{kind}: single-member relations cannot change in place, replace '{id}'"
            )));
        };

        let target = shape::resolve(kind, &desired)?;
        let RelationMode::DisambiguatedSet {
            identifier: desired_identifier,
        } = &target
        else {
            return Err(Error::configuration(format!(
                "{kind}: switching to a single member requires replacing '{id}'"
            )));
        };
        if !CaseSensitivity::Insensitive.matches(&desired.parent, id.parent()) {
            return Err(Error::configuration(format!(
                "{kind}: changing the parent from '{}' to '{}' requires replacement",
                id.parent(),
                desired.parent
            )));
        }
        if desired_identifier != identifier {
            return Err(Error::configuration(format!(
                "{kind}: changing the identifier from '{identifier}' to '{desired_identifier}' requires replacement"
            )));
        }

        let mut applied = Vec::new();
        for dimension in kind.descriptor().dimensions {
            let member_type = dimension.member_type;
            let prior = instance.declaration.members(member_type);
            let wanted = desired.members(member_type);
            if prior.is_none() && wanted.is_none() {
                continue;
            }

            let delta = Delta::between(prior, wanted.unwrap_or(&[]));
            if delta.is_empty() {
                continue;
            }
            debug!(
                member_type = %member_type,
                added = delta.added.len(),
                removed = delta.removed.len(),
                "applying delta"
            );

            if !delta.added.is_empty() {
                let request = MemberRequest::new(kind, id.parent(), member_type, delta.added.clone());
                self.add(request).await?;
                instance
                    .declaration
                    .sets
                    .entry(member_type)
                    .or_default()
                    .extend(delta.added.iter().cloned());
            }

            if !delta.removed.is_empty() {
                let request = MemberRequest::new(kind, id.parent(), member_type, delta.removed.clone());
                self.remove(request).await?;
            }

            match wanted {
                Some(members) => {
                    instance.declaration.sets.insert(member_type, members.to_vec());
                },
                None => {
                    instance.declaration.sets.remove(&member_type);
                },
            }
            applied.push(DimensionDelta { member_type, delta });
        }

        instance.declaration = desired;
        instance.mode = Some(target);
        instance.state = InstanceState::Updated;
        info!(id = %id, dimensions = applied.len(), "relation updated");
        Ok(applied)
    }

    /// Removes the relation's members from the directory.
    ///
    /// Members already gone and a parent that no longer exists both count
    /// as success. Dimensions with an empty last-known list issue no call.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the instance has no identifier
    /// - `MalformedIdentifier` if the identifier's tag is unknown
    /// - transport errors verbatim
    #[instrument(skip_all, fields(kind = %instance.kind, parent = %instance.parent()))]
    pub async fn delete(&self, instance: &mut RelationInstance) -> Result<()> {
        let kind = instance.kind;
        let id = bound_id(instance)?;
        let mode = shape::mode_for_id(kind, &id)?;

        for (dimension, members) in shape::active_dimensions(kind, &mode, &instance.declaration) {
            if members.is_empty() {
                continue;
            }
            let members = Delta::between(None::<&[String]>, members).added;
            debug!(member_type = %dimension.member_type, count = members.len(), "removing members");
            let request = MemberRequest::new(kind, id.parent(), dimension.member_type, members);

            match self.directory.remove_member(request).await {
                Ok(result) if result.is_zero_effect() => {
                    let refusals = unexpected_refusals(&result);
                    if refusals.is_empty() {
                        debug!(member_type = %dimension.member_type, "members already absent");
                    } else {
                        warn!(
                            member_type = %dimension.member_type,
                            refusals = ?refusals,
                            "directory removed no members"
                        );
                    }
                },
                Ok(result) => log_partial(&result),
                Err(e) if e.is_not_found() => {
                    warn!(id = %id, "parent already gone");
                    break;
                },
                Err(e) => return Err(e),
            }
        }

        info!(id = %id, "relation deleted");
        instance.id = None;
        instance.state = InstanceState::Deleted;
        Ok(())
    }

    async fn add(&self, request: MemberRequest) -> Result<MemberResult> {
        debug!(member_type = %request.member_type, count = request.members.len(), "adding members");
        let summary = Summary::of("add", &request);
        let result = self.directory.add_member(request).await?;
        check_effect(summary, result)
    }

    async fn remove(&self, request: MemberRequest) -> Result<MemberResult> {
        debug!(member_type = %request.member_type, count = request.members.len(), "removing members");
        let summary = Summary::of("remove", &request);
        let result = self.directory.remove_member(request).await?;
        check_effect(summary, result)
    }
}

/// What a batch asked for, kept for the zero-effect message.
struct Summary {
    operation: &'static str,
    kind: RelationKind,
    parent: String,
    member_type: MemberType,
    count: usize,
}

impl Summary {
    fn of(operation: &'static str, request: &MemberRequest) -> Self {
        Self {
            operation,
            kind: request.kind,
            parent: request.parent.clone(),
            member_type: request.member_type,
            count: request.members.len(),
        }
    }
}

/// Turns a batch that changed nothing into a `ZeroEffect` error.
fn check_effect(summary: Summary, result: MemberResult) -> Result<MemberResult> {
    if summary.count > 0 && result.is_zero_effect() {
        warn!(
            operation = summary.operation,
            failed = result.failed.len(),
            "directory completed no members"
        );
        return Err(Error::zero_effect(
            format!(
                "{} of {} {} member(s) on {} '{}' completed none",
                summary.operation,
                summary.count,
                summary.member_type,
                summary.kind.parent_type(),
                summary.parent
            ),
            result.failed,
        ));
    }
    log_partial(&result);
    Ok(result)
}

fn log_partial(result: &MemberResult) {
    if !result.failed.is_empty() {
        let names: Vec<&str> = result.failed.iter().map(|m| m.name.as_str()).collect();
        warn!(
            completed = result.completed,
            failed = ?names,
            "directory refused some members"
        );
    }
}

/// Refusals other than "not a member", rendered with their reasons.
fn unexpected_refusals(result: &MemberResult) -> Vec<String> {
    result
        .failed
        .iter()
        .filter(|member| !member.is_not_member())
        .map(ToString::to_string)
        .collect()
}

fn bound_id(instance: &RelationInstance) -> Result<RelationId> {
    instance.id.clone().ok_or_else(|| {
        Error::configuration(format!(
            "{}: instance has no identifier (state {})",
            instance.kind, instance.state
        ))
    })
}
