//! Directory server connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::TlsConfig;
use crate::error::{Error, Result};

/// JSON-RPC API version sent with every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "2.251";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Path of the session JSON-RPC endpoint below the server root.
const RPC_PATH: &str = "/ipa/session/json";

/// Path sent as `Referer`; FreeIPA rejects requests without it.
const REFERER_PATH: &str = "/ipa";

/// Connection settings for a FreeIPA server.
///
/// The crate does not log in: callers that need an authenticated session
/// pass an already-established `ipa_session` cookie.
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::{DirectoryConfig, TlsConfig};
///
/// let config = DirectoryConfig::builder()
///     .url("https://ipa.example.com".parse().unwrap())
///     .tls(TlsConfig::builder().ca_cert_file("/etc/ipa/ca.crt").build())
///     .session_cookie("ipa_session=MagBearerToken=abc")
///     .build();
///
/// assert_eq!(config.api_version, "2.251");
/// assert_eq!(config.rpc_url().unwrap().as_str(), "https://ipa.example.com/ipa/session/json");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct DirectoryConfig {
    /// Server base URL, e.g. `https://ipa.example.com`.
    pub url: Url,

    /// JSON-RPC API version.
    #[builder(into, default = DEFAULT_API_VERSION.to_owned())]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds.
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT_SECS)]
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// TLS settings.
    #[builder(default)]
    #[serde(default)]
    pub tls: TlsConfig,

    /// Pre-established session cookie, sent verbatim as the `Cookie` header.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("url", &self.url.as_str())
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("tls", &self.tls)
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DirectoryConfig {
    /// Creates a configuration with defaults for everything but the URL.
    pub fn from_url(url: &str) -> Result<Self> {
        let config = Self::builder().url(Url::parse(url)?).build();
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings for values the transport cannot use.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.url.scheme(), "https" | "http") {
            return Err(Error::configuration(format!(
                "unsupported URL scheme '{}', expected https",
                self.url.scheme()
            )));
        }
        if self.url.host_str().is_none() {
            return Err(Error::configuration(format!(
                "URL '{}' has no host",
                self.url
            )));
        }
        if self.api_version.is_empty() {
            return Err(Error::configuration("api_version must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration("timeout_secs must be greater than zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::configuration(
                "connect_timeout_secs must be greater than zero",
            ));
        }
        if self.session_cookie.as_deref().is_some_and(str::is_empty) {
            return Err(Error::configuration("session_cookie must not be empty"));
        }
        Ok(())
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the JSON-RPC endpoint URL.
    pub fn rpc_url(&self) -> Result<Url> {
        Ok(self.url.join(RPC_PATH)?)
    }

    /// Returns the value of the `Referer` header.
    pub fn referer(&self) -> Result<Url> {
        Ok(self.url.join(REFERER_PATH)?)
    }
}
