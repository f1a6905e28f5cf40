//! Testing utilities.
//!
//! [`MockDirectory`] stands in for a FreeIPA server so reconciler code can
//! be exercised without a network:
//!
//! ```rust
//! use std::sync::Arc;
//! use freeipa_membership::testing::MockDirectory;
//! use freeipa_membership::{ObjectType, Reconciler};
//!
//! let directory = Arc::new(MockDirectory::new().with_object(ObjectType::Group, "admins"));
//! let reconciler = Reconciler::new(directory.clone());
//! ```

mod mock_directory;

pub use crate::types::{ALREADY_MEMBER, NOT_MEMBER};
pub use mock_directory::{CallOperation, MockDirectory, RecordedCall};
