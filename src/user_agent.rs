//! `User-Agent` header sent to the directory server.
//!
//! FreeIPA records the user agent in its access log, which makes requests
//! from this crate easy to pick out when debugging a rejected change.

use std::sync::OnceLock;

/// Crate name and version from Cargo.toml.
const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

static USER_AGENT: OnceLock<String> = OnceLock::new();

/// Returns the User-Agent string for directory requests.
///
/// Format: `freeipa-membership/0.1.0 (rust/1.92; linux/x86_64)`
pub fn user_agent() -> &'static str {
    USER_AGENT.get_or_init(|| {
        format!(
            "{}/{} (rust/{}; {}/{})",
            CRATE_NAME,
            CRATE_VERSION,
            env!("CARGO_PKG_RUST_VERSION"),
            os_name(),
            std::env::consts::ARCH,
        )
    })
}

fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}
