//! Error types for the reconciliation engine.
//!
//! Every fallible operation returns [`Error`], categorized by [`ErrorKind`].
//!
//! ## Key Invariant
//!
//! A missing parent object during a read is **not** an error: the reconciler
//! reports it as an `Absent` outcome. A batch that the directory accepted but
//! that changed nothing is an error of its own kind
//! ([`ErrorKind::ZeroEffect`]) so callers can tell "directory unreachable"
//! from "directory rejected the change".
//!
//! ```rust,ignore
//! match reconciler.update(&mut instance, desired).await {
//!     Ok(deltas) => println!("applied {} dimension deltas", deltas.len()),
//!     Err(e) if e.kind() == ErrorKind::ZeroEffect => {
//!         for member in e.failed_members() {
//!             eprintln!("{}", member);
//!         }
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

mod core;
mod kind;

pub use core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
