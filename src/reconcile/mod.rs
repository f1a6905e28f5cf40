//! Reconciliation of membership relations against the directory.
//!
//! A [`RelationInstance`] pairs a declaration with its identifier and
//! lifecycle state; the [`Reconciler`] moves it through
//! create / read / update / delete.

mod instance;
mod reconciler;

pub use instance::{InstanceState, RelationInstance};
pub use reconciler::{DimensionDelta, ReadOutcome, Reconciler};
