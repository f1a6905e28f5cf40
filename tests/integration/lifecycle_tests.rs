//! Full create / read / update / delete lifecycles across relation kinds.

use freeipa_membership::testing::CallOperation;
use freeipa_membership::{
    ErrorKind, InstanceState, MemberType, ObjectType, ReadOutcome, RelationDeclaration,
    RelationInstance, RelationKind,
};
use test_case::test_case;

use crate::common::{fixture, set_of};

#[test_case(RelationKind::HbacPolicyHost, ObjectType::HbacRule, MemberType::HostGroup, "mh" ; "hbac hosts")]
#[test_case(RelationKind::HbacPolicyUser, ObjectType::HbacRule, MemberType::Group, "mu" ; "hbac users")]
#[test_case(RelationKind::HbacPolicyService, ObjectType::HbacRule, MemberType::HbacService, "ms" ; "hbac services")]
#[test_case(RelationKind::SudoRuleHost, ObjectType::SudoRule, MemberType::Host, "mh" ; "sudo hosts")]
#[test_case(RelationKind::SudoRuleUser, ObjectType::SudoRule, MemberType::User, "mu" ; "sudo users")]
#[test_case(RelationKind::SudoRuleAllowCommand, ObjectType::SudoRule, MemberType::SudoCmdGroup, "msrac" ; "sudo allow commands")]
#[test_case(RelationKind::SudoRuleRunAsUser, ObjectType::SudoRule, MemberType::User, "msru" ; "sudo runas users")]
#[test_case(RelationKind::SudoRuleRunAsGroup, ObjectType::SudoRule, MemberType::Group, "msrg" ; "sudo runas groups")]
#[test_case(RelationKind::SudoCmdGroupMember, ObjectType::SudoCmdGroup, MemberType::SudoCmd, "msc" ; "sudo command group")]
#[test_case(RelationKind::HbacServiceGroupMember, ObjectType::HbacServiceGroup, MemberType::HbacService, "ms" ; "hbac service group")]
#[tokio::test]
async fn test_set_lifecycle(kind: RelationKind, object_type: ObjectType, member_type: MemberType, tag: &str) {
    let (directory, reconciler) = fixture(&[(object_type, "rule1")]);

    let mut instance = RelationInstance::new(kind, set_of("rule1", member_type, &["m1", "m2"], "batch"));
    let id = reconciler.create(&mut instance).await.unwrap();
    assert_eq!(id.to_string(), format!("rule1/{tag}/batch"));

    // Persist, then restore on a later run.
    let stored = id.to_string();
    let mut instance = RelationInstance::restore(kind, &stored, instance.declaration().clone()).unwrap();
    assert_eq!(reconciler.read(&mut instance).await.unwrap(), ReadOutcome::Verified);

    reconciler
        .update(&mut instance, set_of("rule1", member_type, &["m2", "m3"], "batch"))
        .await
        .unwrap();
    let mut members = directory.members(kind, "rule1", member_type);
    members.sort();
    assert_eq!(members, ["m2", "m3"]);

    reconciler.delete(&mut instance).await.unwrap();
    assert!(directory.members(kind, "rule1", member_type).is_empty());
    assert_eq!(instance.state(), InstanceState::Deleted);
}

#[tokio::test]
async fn test_legacy_lifecycle_with_slashes() {
    let (directory, reconciler) = fixture(&[(ObjectType::SudoRule, "ops/restart")]);
    let declaration =
        RelationDeclaration::new("ops/restart").with_member(MemberType::SudoCmd, "/usr/bin/systemctl restart sshd");
    let mut instance = RelationInstance::new(RelationKind::SudoRuleAllowCommand, declaration);

    let id = reconciler.create(&mut instance).await.unwrap();
    assert_eq!(id.to_string(), "ops%2Frestart/srac//usr/bin/systemctl restart sshd");

    let mut imported = RelationInstance::import(RelationKind::SudoRuleAllowCommand, &id.to_string()).unwrap();
    assert_eq!(reconciler.read(&mut imported).await.unwrap(), ReadOutcome::Verified);
    assert_eq!(imported.declaration().parent, "ops/restart");
    assert_eq!(
        imported.declaration().member(MemberType::SudoCmd),
        Some("/usr/bin/systemctl restart sshd")
    );

    reconciler.delete(&mut imported).await.unwrap();
    assert!(directory
        .members(RelationKind::SudoRuleAllowCommand, "ops/restart", MemberType::SudoCmd)
        .is_empty());
}

#[tokio::test]
async fn test_sudo_commands_match_exactly() {
    let (directory, reconciler) = fixture(&[(ObjectType::SudoCmdGroup, "pagers")]);
    directory.seed_member(
        RelationKind::SudoCmdGroupMember,
        "pagers",
        MemberType::SudoCmd,
        "/usr/bin/LESS",
    );

    let mut instance = RelationInstance::import(RelationKind::SudoCmdGroupMember, "pagers/sc//usr/bin/less").unwrap();
    assert_eq!(reconciler.read(&mut instance).await.unwrap(), ReadOutcome::Absent);
}

#[tokio::test]
async fn test_sibling_sets_on_one_parent() {
    let (directory, reconciler) = fixture(&[(ObjectType::HostGroup, "webservers")]);

    let mut frontend = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["fe1", "fe2"], "frontend"),
    );
    let mut backend = RelationInstance::new(
        RelationKind::HostGroupMember,
        set_of("webservers", MemberType::Host, &["be1"], "backend"),
    );
    reconciler.create(&mut frontend).await.unwrap();
    reconciler.create(&mut backend).await.unwrap();
    assert_ne!(frontend.id(), backend.id());

    // Each read sees only its own members.
    reconciler.read(&mut frontend).await.unwrap();
    reconciler.read(&mut backend).await.unwrap();
    assert_eq!(frontend.declaration().members(MemberType::Host).unwrap(), ["fe1", "fe2"]);
    assert_eq!(backend.declaration().members(MemberType::Host).unwrap(), ["be1"]);

    reconciler.delete(&mut frontend).await.unwrap();
    assert_eq!(
        directory.members(RelationKind::HostGroupMember, "webservers", MemberType::Host),
        ["be1"]
    );
}

#[tokio::test]
async fn test_delete_after_parent_removed() {
    let (directory, reconciler) = fixture(&[(ObjectType::HbacRule, "allow_ssh")]);
    let mut instance = RelationInstance::new(
        RelationKind::HbacPolicyUser,
        set_of("allow_ssh", MemberType::User, &["alice"], "people"),
    );
    reconciler.create(&mut instance).await.unwrap();
    directory.remove_object(ObjectType::HbacRule, "allow_ssh");

    reconciler.delete(&mut instance).await.unwrap();
    assert_eq!(instance.state(), InstanceState::Deleted);
}

#[tokio::test]
async fn test_corrupt_identifier_is_reported() {
    let err = RelationInstance::restore(
        RelationKind::HbacPolicyUser,
        "allow_ssh-without-separators",
        RelationDeclaration::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);

    let err = RelationInstance::restore(
        RelationKind::HbacPolicyUser,
        "allow_ssh/srac/x",
        RelationDeclaration::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);
}

#[tokio::test]
async fn test_invalid_declaration_never_reaches_directory() {
    let (directory, reconciler) = fixture(&[(ObjectType::Group, "admins")]);
    let declaration = RelationDeclaration::new("admins")
        .with_member(MemberType::User, "alice")
        .with_members(MemberType::Group, ["ops"])
        .with_identifier("mixed");

    let mut instance = RelationInstance::new(RelationKind::GroupMember, declaration);
    let err = reconciler.create(&mut instance).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(directory.call_count(), 0);
    assert!(directory.calls().iter().all(|c| c.operation != CallOperation::Add));
}
