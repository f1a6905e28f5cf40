//! Configuration types for the directory connection.
//!
//! - [`DirectoryConfig`]: Server URL, API version, timeouts and session
//! - [`TlsConfig`]: TLS/SSL settings

mod directory;
mod tls;

pub use directory::{
    DEFAULT_API_VERSION, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, DirectoryConfig,
};
pub use tls::TlsConfig;
