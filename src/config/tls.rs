//! TLS settings for the directory connection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for TLS connections to the directory server.
///
/// FreeIPA servers usually present a certificate issued by the deployment's
/// own CA, so most setups point [`ca_cert_file`](Self::ca_cert_file) at
/// `/etc/ipa/ca.crt`.
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::TlsConfig;
///
/// let config = TlsConfig::builder()
///     .ca_cert_file("/etc/ipa/ca.crt")
///     .build();
/// assert!(config.has_custom_ca());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct TlsConfig {
    /// Custom CA certificate file path.
    #[builder(into)]
    pub ca_cert_file: Option<PathBuf>,

    /// Custom CA certificate PEM data.
    #[builder(into)]
    pub ca_cert_pem: Option<String>,

    /// Whether to skip certificate verification.
    ///
    /// **WARNING**: This is insecure and should only be used against
    /// throwaway development servers.
    #[builder(default = false)]
    pub skip_verification: bool,
}

impl TlsConfig {
    /// Creates an insecure TLS config that skips verification.
    ///
    /// **WARNING**: This makes connections vulnerable to man-in-the-middle attacks.
    pub fn insecure() -> Self {
        Self::builder().skip_verification(true).build()
    }

    /// Returns `true` if a custom CA is configured.
    pub fn has_custom_ca(&self) -> bool {
        self.ca_cert_file.is_some() || self.ca_cert_pem.is_some()
    }

    /// Returns every configured CA certificate as PEM bytes, file first.
    pub fn ca_certificates(&self) -> Result<Vec<Vec<u8>>> {
        let mut certs = Vec::new();

        if let Some(ref path) = self.ca_cert_file {
            let pem = std::fs::read(path).map_err(|e| {
                Error::configuration(format!("failed to read CA certificate {:?}: {}", path, e))
                    .with_source(e)
            })?;
            certs.push(pem);
        }

        if let Some(ref pem) = self.ca_cert_pem {
            certs.push(pem.as_bytes().to_vec());
        }

        Ok(certs)
    }
}
