//! In-memory directory with FreeIPA membership semantics.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::Error;
use crate::transport::{
    DirectoryClient, DirectoryObject, MemberRequest, MemberResult, Transport, TransportStats,
};
use crate::types::{ALREADY_MEMBER, FailedMember, MemberType, NOT_MEMBER, ObjectType, RelationKind};

/// The directory operation a [`RecordedCall`] made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOperation {
    /// `add_member`
    Add,
    /// `remove_member`
    Remove,
    /// `show_object`
    Show,
}

/// A call made against a [`MockDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Which operation was called.
    pub operation: CallOperation,
    /// The parent object type.
    pub object_type: ObjectType,
    /// The parent object's name.
    pub parent: String,
    /// The relation kind, for member operations.
    pub kind: Option<RelationKind>,
    /// The dimension, for member operations.
    pub member_type: Option<MemberType>,
    /// The members named, for member operations.
    pub members: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    name: String,
    attributes: BTreeMap<String, Vec<String>>,
}

type ObjectKey = (ObjectType, String);

fn object_key(object_type: ObjectType, name: &str) -> ObjectKey {
    (object_type, name.to_lowercase())
}

/// An in-memory directory for tests.
///
/// Behaves like FreeIPA for everything the reconciler relies on:
///
/// - object names are case-insensitive;
/// - members are stored in the case they were first written and matched
///   with the dimension's case rule (`sudocmd` exactly, everything else
///   folded);
/// - adding a present member or removing an absent one is reported in
///   [`MemberResult::failed`] instead of failing the call;
/// - member operations and reads on a missing parent return `NotFound`.
///
/// Every call is recorded for assertions.
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::testing::MockDirectory;
/// use freeipa_membership::{MemberType, ObjectType, RelationKind};
///
/// let directory = MockDirectory::new().with_object(ObjectType::HostGroup, "webservers");
/// directory.seed_member(RelationKind::HostGroupMember, "webservers", MemberType::Host, "A.example.com");
///
/// assert_eq!(
///     directory.members(RelationKind::HostGroupMember, "webservers", MemberType::Host),
///     vec!["A.example.com".to_string()],
/// );
/// ```
pub struct MockDirectory {
    objects: RwLock<HashMap<ObjectKey, StoredObject>>,
    calls: RwLock<Vec<RecordedCall>>,
    request_count: AtomicU64,
    failed_count: AtomicU64,
    simulate_failure: RwLock<Option<Error>>,
    next_result: RwLock<Option<MemberResult>>,
}

impl MockDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            request_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            simulate_failure: RwLock::new(None),
            next_result: RwLock::new(None),
        }
    }

    /// Adds an empty object and returns the directory.
    #[must_use]
    pub fn with_object(self, object_type: ObjectType, name: impl Into<String>) -> Self {
        self.insert_object(object_type, name);
        self
    }

    /// Adds an empty object. An existing object of the same name is kept.
    pub fn insert_object(&self, object_type: ObjectType, name: impl Into<String>) {
        let name = name.into();
        self.objects
            .write()
            .entry(object_key(object_type, &name))
            .or_insert_with(|| StoredObject {
                name,
                attributes: BTreeMap::new(),
            });
    }

    /// Removes an object, as if it were deleted outside the reconciler.
    pub fn remove_object(&self, object_type: ObjectType, name: &str) -> bool {
        self.objects
            .write()
            .remove(&object_key(object_type, name))
            .is_some()
    }

    /// Returns `true` if the object exists.
    pub fn has_object(&self, object_type: ObjectType, name: &str) -> bool {
        self.objects.read().contains_key(&object_key(object_type, name))
    }

    /// Writes a member directly, creating the parent if needed. Nothing is
    /// recorded.
    pub fn seed_member(
        &self,
        kind: RelationKind,
        parent: &str,
        member_type: MemberType,
        member: impl Into<String>,
    ) {
        let Some(dimension) = kind.descriptor().dimension(member_type) else {
            return;
        };
        self.insert_object(kind.parent_type(), parent);

        let mut objects = self.objects.write();
        if let Some(object) = objects.get_mut(&object_key(kind.parent_type(), parent)) {
            object
                .attributes
                .entry(dimension.attribute.to_owned())
                .or_default()
                .push(member.into());
        }
    }

    /// Returns the stored members of a dimension in storage order.
    pub fn members(&self, kind: RelationKind, parent: &str, member_type: MemberType) -> Vec<String> {
        let Some(dimension) = kind.descriptor().dimension(member_type) else {
            return Vec::new();
        };
        self.objects
            .read()
            .get(&object_key(kind.parent_type(), parent))
            .and_then(|object| object.attributes.get(dimension.attribute))
            .cloned()
            .unwrap_or_default()
    }

    /// Makes the next call fail with `error`.
    pub fn set_failure(&self, error: Error) {
        *self.simulate_failure.write() = Some(error);
    }

    /// Clears any simulated failure.
    pub fn clear_failure(&self) {
        *self.simulate_failure.write() = None;
    }

    /// Makes the next member operation return `result` without touching
    /// stored state.
    pub fn set_next_result(&self, result: MemberResult) {
        *self.next_result.write() = Some(result);
    }

    /// Returns every recorded call.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().clone()
    }

    /// Returns the recorded add and remove calls.
    pub fn member_calls(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .iter()
            .filter(|call| call.operation != CallOperation::Show)
            .cloned()
            .collect()
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    fn record(&self, call: RecordedCall) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.calls.write().push(call);
    }

    fn check_failure(&self) -> Result<(), Error> {
        let failure = self.simulate_failure.write().take();
        if let Some(error) = failure {
            self.failed_count.fetch_add(1, Ordering::Relaxed);
            return Err(error);
        }
        Ok(())
    }

    fn not_found(&self, object_type: ObjectType, name: &str) -> Error {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
        Error::not_found(format!("{}: {} not found", name, object_type))
    }

    fn apply(&self, operation: CallOperation, request: MemberRequest) -> Result<MemberResult, Error> {
        let object_type = request.kind.parent_type();
        self.record(RecordedCall {
            operation,
            object_type,
            parent: request.parent.clone(),
            kind: Some(request.kind),
            member_type: Some(request.member_type),
            members: request.members.clone(),
        });
        self.check_failure()?;

        if let Some(result) = self.next_result.write().take() {
            return Ok(result);
        }

        let Some(dimension) = request.kind.descriptor().dimension(request.member_type) else {
            self.failed_count.fetch_add(1, Ordering::Relaxed);
            return Err(Error::api(format!(
                "OptionError (3005): unknown option '{}'",
                request.member_type
            )));
        };
        let case = dimension.case_sensitivity();

        let mut objects = self.objects.write();
        let Some(object) = objects.get_mut(&object_key(object_type, &request.parent)) else {
            return Err(self.not_found(object_type, &request.parent));
        };
        let stored = object.attributes.entry(dimension.attribute.to_owned()).or_default();

        let mut result = MemberResult::default();
        for member in request.members {
            let position = stored.iter().position(|m| case.matches(m, &member));
            match (operation, position) {
                (CallOperation::Add, None) => {
                    stored.push(member);
                    result.completed += 1;
                },
                (CallOperation::Add, Some(_)) => {
                    result.failed.push(FailedMember::new(member, ALREADY_MEMBER));
                },
                (CallOperation::Remove, Some(index)) => {
                    stored.remove(index);
                    result.completed += 1;
                },
                (CallOperation::Remove, None) | (CallOperation::Show, _) => {
                    result.failed.push(FailedMember::new(member, NOT_MEMBER));
                },
            }
        }

        if stored.is_empty() {
            object.attributes.remove(dimension.attribute);
        }
        Ok(result)
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDirectory")
            .field("objects", &self.objects.read().len())
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl DirectoryClient for MockDirectory {
    async fn add_member(&self, request: MemberRequest) -> Result<MemberResult, Error> {
        self.apply(CallOperation::Add, request)
    }

    async fn remove_member(&self, request: MemberRequest) -> Result<MemberResult, Error> {
        self.apply(CallOperation::Remove, request)
    }

    async fn show_object(&self, object_type: ObjectType, name: &str) -> Result<DirectoryObject, Error> {
        self.record(RecordedCall {
            operation: CallOperation::Show,
            object_type,
            parent: name.to_owned(),
            kind: None,
            member_type: None,
            members: Vec::new(),
        });
        self.check_failure()?;

        let objects = self.objects.read();
        let Some(object) = objects.get(&object_key(object_type, name)) else {
            return Err(self.not_found(object_type, name));
        };

        let mut shown = DirectoryObject::new(object.name.clone());
        shown.attributes.insert("cn".into(), vec![object.name.clone()]);
        shown.attributes.extend(
            object
                .attributes
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Ok(shown)
    }

    fn transport_type(&self) -> Transport {
        Transport::Mock
    }

    fn stats(&self) -> TransportStats {
        TransportStats {
            requests_sent: self.request_count.load(Ordering::Relaxed),
            requests_failed: self.failed_count.load(Ordering::Relaxed),
        }
    }
}
