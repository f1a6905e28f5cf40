//! FreeIPA JSON-RPC transport using reqwest.
//!
//! Every call is a single `POST` to `<base>/ipa/session/json`:
//!
//! ```json
//! {"method": "hostgroup_add_member",
//!  "params": [["webservers"], {"host": ["a.example.com"], "version": "2.251"}],
//!  "id": 0}
//! ```
//!
//! Batched member commands answer with `completed` and a nested `failed`
//! structure of `[name, reason]` pairs; errors come back with HTTP 200 and a
//! populated `error` object.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, REFERER};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::config::DirectoryConfig;
use crate::error::ErrorKind;
use crate::transport::traits::{
    DirectoryClient, DirectoryObject, MemberRequest, MemberResult, Transport, TransportStats,
};
use crate::types::{FailedMember, ObjectType};
use crate::user_agent;

/// RPC error code FreeIPA uses for a missing object.
const NOT_FOUND_CODE: i64 = 4001;

// ============================================================================
// RPC Transport
// ============================================================================

/// JSON-RPC client for a FreeIPA server.
///
/// ## Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use freeipa_membership::{DirectoryConfig, Reconciler, RpcTransport};
///
/// # fn example() -> freeipa_membership::Result<()> {
/// let mut config = DirectoryConfig::from_url("https://ipa.example.com")?;
/// config.session_cookie = Some("ipa_session=MagBearerToken=...".into());
///
/// let transport = RpcTransport::new(&config)?;
/// let reconciler = Reconciler::new(Arc::new(transport));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RpcTransport {
    client: reqwest::Client,
    endpoint: Url,
    api_version: String,
    headers: HeaderMap,
    stats: Arc<RwLock<TransportStats>>,
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl RpcTransport {
    /// Creates a transport for the configured server.
    pub fn new(config: &DirectoryConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut client_builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(user_agent::user_agent());

        if config.tls.skip_verification {
            warn!(url = %config.url, "TLS certificate verification is disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        for pem in config.tls.ca_certificates()? {
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::configuration(format!("invalid CA certificate: {}", e)).with_source(e)
            })?;
            client_builder = client_builder.add_root_certificate(cert);
        }

        let client = client_builder.build().map_err(|e| {
            Error::configuration(format!("failed to create HTTP client: {}", e)).with_source(e)
        })?;

        Ok(Self {
            client,
            endpoint: config.rpc_url()?,
            api_version: config.api_version.clone(),
            headers: build_headers(config)?,
            stats: Arc::new(RwLock::new(TransportStats::default())),
        })
    }

    /// Issues one JSON-RPC call and returns its `result` member.
    async fn call(&self, method: &str, name: &str, mut options: Map<String, Value>) -> Result<Value, Error> {
        options.insert("version".into(), Value::String(self.api_version.clone()));

        let body = RpcRequest {
            method,
            params: (vec![name], options),
            id: 0,
        };

        debug!(method, name, "sending directory request");

        let result = self.send(&body).await;
        {
            let mut stats = self.stats.write();
            stats.requests_sent += 1;
            if result.is_err() {
                stats.requests_failed += 1;
            }
        }

        if let Err(ref e) = result {
            debug!(method, name, error = %e, "directory request failed");
        }
        result
    }

    async fn send(&self, body: &RpcRequest<'_>) -> Result<Value, Error> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status_error(status.as_u16(), &error_text));
        }

        let response: RpcResponse = response.json().await.map_err(|e| {
            Error::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
        })?;

        if let Some(error) = response.error {
            return Err(map_rpc_error(error));
        }

        response
            .result
            .ok_or_else(|| Error::invalid_response("response has neither result nor error"))
    }

    async fn member_call(&self, method: String, request: MemberRequest) -> Result<MemberResult, Error> {
        let mut options = Map::new();
        options.insert(
            request.member_type.as_str().to_owned(),
            Value::Array(request.members.into_iter().map(Value::String).collect()),
        );

        let result = self.call(&method, &request.parent, options).await?;
        parse_member_result(&result)
    }
}

/// Builds the per-request headers. User-Agent is set on the client.
fn build_headers(config: &DirectoryConfig) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let referer = config.referer()?;
    headers.insert(
        REFERER,
        HeaderValue::from_str(referer.as_str())
            .map_err(|_| Error::configuration("invalid Referer URL"))?,
    );

    if let Some(ref cookie) = config.session_cookie {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie)
                .map_err(|_| Error::configuration("invalid session cookie format"))?,
        );
    }

    Ok(headers)
}

#[async_trait::async_trait]
impl DirectoryClient for RpcTransport {
    async fn add_member(&self, request: MemberRequest) -> Result<MemberResult, Error> {
        let method = request.kind.descriptor().add_command();
        self.member_call(method, request).await
    }

    async fn remove_member(&self, request: MemberRequest) -> Result<MemberResult, Error> {
        let method = request.kind.descriptor().remove_command();
        self.member_call(method, request).await
    }

    async fn show_object(&self, object_type: ObjectType, name: &str) -> Result<DirectoryObject, Error> {
        let method = format!("{}_show", object_type.command_prefix());
        let mut options = Map::new();
        options.insert("all".into(), Value::Bool(true));

        let result = self.call(&method, name, options).await?;
        parse_object(name, &result)
    }

    fn transport_type(&self) -> Transport {
        Transport::JsonRpc
    }

    fn stats(&self) -> TransportStats {
        *self.stats.read()
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: (Vec<&'a str>, Map<String, Value>),
    id: u32,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parses the `result` of an `*_add_*` / `*_remove_*` command.
fn parse_member_result(result: &Value) -> Result<MemberResult, Error> {
    let completed = result
        .get("completed")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::invalid_response("member result has no 'completed' count"))?;

    let mut failed = Vec::new();
    if let Some(tree) = result.get("failed") {
        collect_failed(tree, &mut failed);
    }

    Ok(MemberResult {
        completed: u32::try_from(completed).unwrap_or(u32::MAX),
        failed,
    })
}

/// Walks the nested `failed` structure.
///
/// Leaves are `[name, reason]` pairs; older servers send bare names.
fn collect_failed(value: &Value, out: &mut Vec<FailedMember>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| collect_failed(v, out)),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Array(pair) => {
                        if let Some(name) = pair.first().and_then(Value::as_str) {
                            let reason = pair.get(1).and_then(Value::as_str).unwrap_or_default();
                            out.push(FailedMember::new(name, reason));
                        }
                    },
                    Value::String(name) => out.push(FailedMember::new(name.as_str(), "")),
                    other => collect_failed(other, out),
                }
            }
        },
        _ => {},
    }
}

/// Parses the `result` of a `*_show` command.
fn parse_object(name: &str, result: &Value) -> Result<DirectoryObject, Error> {
    let attributes = result
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::invalid_response(format!("show result for '{}' has no attributes", name)))?;

    let mut object = DirectoryObject::new(name);
    for (attribute, value) in attributes {
        let values: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
            other => scalar_to_string(other).into_iter().collect(),
        };
        object.attributes.insert(attribute.clone(), values);
    }
    Ok(object)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::new(ErrorKind::Timeout, format!("request timed out: {}", e)).with_source(e)
    } else if e.is_connect() {
        Error::connection(format!("connection failed: {}", e)).with_source(e)
    } else if e.is_decode() {
        Error::invalid_response(format!("failed to read response: {}", e)).with_source(e)
    } else {
        Error::transport(format!("HTTP error: {}", e)).with_source(e)
    }
}

/// Maps HTTP status codes to errors.
fn map_status_error(status: u16, body: &str) -> Error {
    let message = if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };
    Error::new(ErrorKind::from_http_status(status), message)
}

fn map_rpc_error(error: RpcError) -> Error {
    if error.code == NOT_FOUND_CODE {
        return Error::not_found(error.message);
    }
    Error::api(format!("{} ({}): {}", error.name, error.code, error.message))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_member_result_nested_failures() {
        let result = json!({
            "completed": 1,
            "failed": {
                "member": {
                    "host": [["b.example.com", "This entry is already a member"]],
                    "hostgroup": []
                }
            },
            "result": {"cn": ["webservers"]}
        });

        let parsed = parse_member_result(&result).unwrap();
        assert_eq!(parsed.completed, 1);
        assert_eq!(
            parsed.failed,
            vec![FailedMember::new("b.example.com", "This entry is already a member")]
        );
    }

    #[test]
    fn test_parse_member_result_policy_shape() {
        let result = json!({
            "completed": 0,
            "failed": {
                "memberallowcmd": {
                    "sudocmd": [["/usr/bin/less", "no such entry"]],
                    "sudocmdgroup": [["pagers", "no such entry"]]
                }
            }
        });

        let parsed = parse_member_result(&result).unwrap();
        assert!(parsed.is_zero_effect());
        assert_eq!(parsed.failed.len(), 2);
    }

    #[test]
    fn test_parse_member_result_bare_names() {
        let result = json!({"completed": 0, "failed": {"member": {"user": ["alice"]}}});
        let parsed = parse_member_result(&result).unwrap();
        assert_eq!(parsed.failed, vec![FailedMember::new("alice", "")]);
    }

    #[test]
    fn test_parse_member_result_missing_completed() {
        let err = parse_member_result(&json!({"failed": {}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_parse_object() {
        let result = json!({
            "result": {
                "cn": ["webservers"],
                "member_host": ["a.example.com", "B.example.com"],
                "description": "web tier",
                "ipaenabledflag": [true],
                "dn": {"__dn__": "cn=webservers"}
            },
            "value": "webservers"
        });

        let object = parse_object("webservers", &result).unwrap();
        assert_eq!(object.name, "webservers");
        assert_eq!(object.attribute("member_host"), ["a.example.com", "B.example.com"]);
        assert_eq!(object.attribute("description"), ["web tier"]);
        assert_eq!(object.attribute("ipaenabledflag"), ["true"]);
        assert!(object.attribute("dn").is_empty());
        assert!(object.attribute("member_hostgroup").is_empty());
    }

    #[test]
    fn test_map_rpc_errors() {
        let err = map_rpc_error(RpcError {
            code: 4001,
            name: "NotFound".into(),
            message: "webservers: host group not found".into(),
        });
        assert!(err.is_not_found());

        let err = map_rpc_error(RpcError {
            code: 3009,
            name: "ValidationError".into(),
            message: "invalid 'host'".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.message().contains("ValidationError (3009)"));
    }

    #[test]
    fn test_map_status_error() {
        assert_eq!(map_status_error(401, "").kind(), ErrorKind::Unauthorized);
        assert_eq!(map_status_error(404, "").kind(), ErrorKind::Transport);
        assert_eq!(map_status_error(500, "boom").message(), "HTTP 500: boom");
    }

    #[test]
    fn test_request_serialization() {
        let mut options = Map::new();
        options.insert("host".into(), json!(["a.example.com"]));
        let body = RpcRequest {
            method: "hostgroup_add_member",
            params: (vec!["webservers"], options),
            id: 0,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "method": "hostgroup_add_member",
                "params": [["webservers"], {"host": ["a.example.com"]}],
                "id": 0
            })
        );
    }
}
