//! Integration tests for freeipa-membership.
//!
//! These tests drive the public API end to end: the reconciler against the
//! in-memory [`MockDirectory`](freeipa_membership::testing::MockDirectory),
//! and the JSON-RPC transport against a local `wiremock` server. No FreeIPA
//! server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With directory call logging
//! RUST_LOG=freeipa_membership=debug cargo test --test integration -- --nocapture
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;
mod lifecycle_tests;
#[cfg(feature = "rpc")]
mod rpc_tests;
mod scenario_tests;
