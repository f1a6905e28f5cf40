//! The reconciler driving the JSON-RPC transport against a local server.

use std::sync::Arc;

use freeipa_membership::{
    DirectoryClient, DirectoryConfig, ErrorKind, MemberType, ReadOutcome, Reconciler,
    RelationInstance, RelationKind, RpcTransport,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{init_tracing, set_of};

fn reconciler_for(server: &MockServer) -> (Arc<RpcTransport>, Reconciler) {
    init_tracing();
    let config = DirectoryConfig::builder()
        .url(server.uri().parse().unwrap())
        .session_cookie("ipa_session=integration")
        .build();
    let transport = Arc::new(RpcTransport::new(&config).unwrap());
    let reconciler = Reconciler::new(transport.clone());
    (transport, reconciler)
}

fn rpc_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": result,
        "error": null,
        "id": 0,
        "principal": "admin@EXAMPLE.COM",
        "version": "4.10.1"
    }))
}

fn rpc_error(code: i64, name: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": null,
        "error": {"code": code, "name": name, "message": message, "data": {}},
        "id": 0,
        "principal": "admin@EXAMPLE.COM",
        "version": "4.10.1"
    }))
}

fn member_ok(completed: u32) -> ResponseTemplate {
    rpc_ok(json!({
        "completed": completed,
        "failed": {"memberuser": {"user": [], "group": []}},
        "result": {"cn": ["allow_ssh"]}
    }))
}

#[tokio::test]
async fn test_create_read_update_delete_over_rpc() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({
            "method": "hbacrule_add_user",
            "params": [["allow_ssh"], {"user": ["alice", "bob"]}]
        })))
        .respond_with(member_ok(2))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({"method": "hbacrule_show", "params": [["allow_ssh"], {"all": true}]})))
        .respond_with(rpc_ok(json!({
            "result": {
                "cn": ["allow_ssh"],
                "memberuser_user": ["Alice", "bob", "carol"]
            },
            "value": "allow_ssh",
            "summary": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({
            "method": "hbacrule_add_user",
            "params": [["allow_ssh"], {"user": ["dave"]}]
        })))
        .respond_with(member_ok(1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({
            "method": "hbacrule_remove_user",
            "params": [["allow_ssh"], {"user": ["alice"]}]
        })))
        .respond_with(member_ok(1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({
            "method": "hbacrule_remove_user",
            "params": [["allow_ssh"], {"user": ["bob", "dave"]}]
        })))
        .respond_with(member_ok(2))
        .expect(1)
        .mount(&server)
        .await;

    let (transport, reconciler) = reconciler_for(&server);
    let mut instance = RelationInstance::new(
        RelationKind::HbacPolicyUser,
        set_of("allow_ssh", MemberType::User, &["alice", "bob"], "admins"),
    );

    let id = reconciler.create(&mut instance).await.unwrap();
    assert_eq!(id.to_string(), "allow_ssh/mu/admins");

    // "carol" belongs to someone else and must not leak into this instance.
    assert_eq!(reconciler.read(&mut instance).await.unwrap(), ReadOutcome::Verified);
    assert_eq!(instance.declaration().members(MemberType::User).unwrap(), ["alice", "bob"]);

    reconciler
        .update(&mut instance, set_of("allow_ssh", MemberType::User, &["bob", "dave"], "admins"))
        .await
        .unwrap();
    reconciler.delete(&mut instance).await.unwrap();

    assert_eq!(transport.stats().requests_sent, 5);
    assert_eq!(transport.stats().requests_failed, 0);
}

#[tokio::test]
async fn test_missing_rule_reads_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .and(body_partial_json(json!({"method": "sudorule_show"})))
        .respond_with(rpc_error(4001, "NotFound", "ops: sudo rule not found"))
        .mount(&server)
        .await;

    let (_, reconciler) = reconciler_for(&server);
    let mut instance = RelationInstance::import(RelationKind::SudoRuleHost, "ops/h/web1.example.com").unwrap();

    assert_eq!(reconciler.read(&mut instance).await.unwrap(), ReadOutcome::Absent);
}

#[tokio::test]
async fn test_already_member_is_zero_effect_with_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .respond_with(rpc_ok(json!({
            "completed": 0,
            "failed": {"member": {"host": [["web1.example.com", "This entry is already a member"]], "hostgroup": []}},
            "result": {"cn": ["webservers"]}
        })))
        .mount(&server)
        .await;

    let (_, reconciler) = reconciler_for(&server);
    let mut instance = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["web1.example.com"], "web"),
    );

    let err = reconciler.create(&mut instance).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ZeroEffect);
    assert_eq!(err.failed_members()[0].name, "web1.example.com");
    assert_eq!(err.failed_members()[0].reason, "This entry is already a member");
}

#[tokio::test]
async fn test_expired_session_surfaces_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ipa/session/json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (transport, reconciler) = reconciler_for(&server);
    let mut instance = RelationInstance::new(
        RelationKind::GroupMember,
        set_of("admins", MemberType::User, &["alice"], "core"),
    );

    let err = reconciler.create(&mut instance).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.is_transport());
    assert_eq!(transport.stats().requests_failed, 1);
}
