//! Relation kinds and the descriptors that drive the reconciler.
//!
//! Every membership relation the crate manages is described by a
//! [`KindDescriptor`]: which parent object it hangs off, which member types
//! it exposes as dimensions, which attribute of the parent lists each
//! dimension's members, and which identifier tags denote each mode. The
//! reconciler is written once against these descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::member::{CaseSensitivity, MemberType};

/// The type of the parent object a relation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A host group.
    HostGroup,
    /// A user group.
    Group,
    /// An HBAC policy rule.
    HbacRule,
    /// A sudo rule.
    SudoRule,
    /// A sudo command group.
    SudoCmdGroup,
    /// An HBAC service group.
    HbacServiceGroup,
}

impl ObjectType {
    /// Returns the directory command prefix for this object type
    /// (`hostgroup_show`, `hbacrule_add_host`, ...).
    pub fn command_prefix(&self) -> &'static str {
        match self {
            ObjectType::HostGroup => "hostgroup",
            ObjectType::Group => "group",
            ObjectType::HbacRule => "hbacrule",
            ObjectType::SudoRule => "sudorule",
            ObjectType::SudoCmdGroup => "sudocmdgroup",
            ObjectType::HbacServiceGroup => "hbacsvcgroup",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_prefix())
    }
}

/// One member axis of a relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// The member type this dimension holds.
    pub member_type: MemberType,
    /// Identifier tag used when an instance declares a single member of
    /// this dimension.
    pub legacy_tag: &'static str,
    /// Parent attribute listing the current members of this dimension.
    pub attribute: &'static str,
}

impl Dimension {
    const fn new(member_type: MemberType, legacy_tag: &'static str, attribute: &'static str) -> Self {
        Self {
            member_type,
            legacy_tag,
            attribute,
        }
    }

    /// Returns how member names of this dimension are compared.
    #[inline]
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.member_type.case_sensitivity()
    }
}

/// Static description of a relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// The parent object type.
    pub parent: ObjectType,
    /// Suffix of the add/remove commands (`member`, `host`, `allow_command`).
    pub command: &'static str,
    /// Identifier tag for disambiguated set instances.
    pub set_tag: &'static str,
    /// The one or two member dimensions, in declaration order.
    pub dimensions: &'static [Dimension],
}

impl KindDescriptor {
    /// Returns the dimension holding the given member type, if any.
    pub fn dimension(&self, member_type: MemberType) -> Option<&'static Dimension> {
        self.dimensions.iter().find(|d| d.member_type == member_type)
    }

    /// Returns the dimension whose legacy tag is `tag`, if any.
    pub fn dimension_for_tag(&self, tag: &str) -> Option<&'static Dimension> {
        self.dimensions.iter().find(|d| d.legacy_tag == tag)
    }

    /// Returns the directory command adding members for this kind.
    pub fn add_command(&self) -> String {
        format!("{}_add_{}", self.parent.command_prefix(), self.command)
    }

    /// Returns the directory command removing members for this kind.
    pub fn remove_command(&self) -> String {
        format!("{}_remove_{}", self.parent.command_prefix(), self.command)
    }
}

const HOST_DIMENSIONS_MEMBER: &[Dimension] = &[
    Dimension::new(MemberType::Host, "h", "member_host"),
    Dimension::new(MemberType::HostGroup, "hg", "member_hostgroup"),
];

const USER_DIMENSIONS_MEMBER: &[Dimension] = &[
    Dimension::new(MemberType::User, "u", "member_user"),
    Dimension::new(MemberType::Group, "g", "member_group"),
];

const HOST_DIMENSIONS_POLICY: &[Dimension] = &[
    Dimension::new(MemberType::Host, "h", "memberhost_host"),
    Dimension::new(MemberType::HostGroup, "hg", "memberhost_hostgroup"),
];

const USER_DIMENSIONS_POLICY: &[Dimension] = &[
    Dimension::new(MemberType::User, "u", "memberuser_user"),
    Dimension::new(MemberType::Group, "g", "memberuser_group"),
];

const HBAC_SERVICE_DIMENSIONS: &[Dimension] = &[
    Dimension::new(MemberType::HbacService, "s", "memberservice_hbacsvc"),
    Dimension::new(MemberType::HbacServiceGroup, "sg", "memberservice_hbacsvcgroup"),
];

const SUDO_ALLOW_COMMAND_DIMENSIONS: &[Dimension] = &[
    Dimension::new(MemberType::SudoCmd, "srac", "memberallowcmd_sudocmd"),
    Dimension::new(MemberType::SudoCmdGroup, "sracg", "memberallowcmd_sudocmdgroup"),
];

const SUDO_RUNAS_USER_DIMENSIONS: &[Dimension] =
    &[Dimension::new(MemberType::User, "sru", "ipasudorunas_user")];

const SUDO_RUNAS_GROUP_DIMENSIONS: &[Dimension] =
    &[Dimension::new(MemberType::Group, "srg", "ipasudorunasgroup_group")];

const SUDOCMDGROUP_DIMENSIONS: &[Dimension] =
    &[Dimension::new(MemberType::SudoCmd, "sc", "member_sudocmd")];

const HBACSVCGROUP_DIMENSIONS: &[Dimension] =
    &[Dimension::new(MemberType::HbacService, "s", "member_hbacsvc")];

/// A membership relation family: a parent object type paired with a member
/// role.
///
/// ## Example
///
/// ```rust
/// use freeipa_membership::{MemberType, ObjectType, RelationKind};
///
/// let kind = RelationKind::HbacPolicyHost;
/// let descriptor = kind.descriptor();
/// assert_eq!(descriptor.parent, ObjectType::HbacRule);
/// assert_eq!(descriptor.set_tag, "mh");
/// assert_eq!(descriptor.add_command(), "hbacrule_add_host");
/// assert!(descriptor.dimension(MemberType::HostGroup).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Hosts and host groups inside a host group.
    HostGroupMember,
    /// Users and groups inside a group.
    GroupMember,
    /// Hosts and host groups an HBAC rule applies to.
    HbacPolicyHost,
    /// Users and groups an HBAC rule applies to.
    HbacPolicyUser,
    /// Services and service groups an HBAC rule grants.
    HbacPolicyService,
    /// Hosts and host groups a sudo rule applies to.
    SudoRuleHost,
    /// Users and groups a sudo rule applies to.
    SudoRuleUser,
    /// Commands and command groups a sudo rule allows.
    SudoRuleAllowCommand,
    /// Users a sudo rule may run commands as.
    SudoRuleRunAsUser,
    /// Groups a sudo rule may run commands as.
    SudoRuleRunAsGroup,
    /// Commands inside a sudo command group.
    SudoCmdGroupMember,
    /// Services inside an HBAC service group.
    HbacServiceGroupMember,
}

impl RelationKind {
    /// All relation kinds, in a stable order.
    pub const ALL: [RelationKind; 12] = [
        RelationKind::HostGroupMember,
        RelationKind::GroupMember,
        RelationKind::HbacPolicyHost,
        RelationKind::HbacPolicyUser,
        RelationKind::HbacPolicyService,
        RelationKind::SudoRuleHost,
        RelationKind::SudoRuleUser,
        RelationKind::SudoRuleAllowCommand,
        RelationKind::SudoRuleRunAsUser,
        RelationKind::SudoRuleRunAsGroup,
        RelationKind::SudoCmdGroupMember,
        RelationKind::HbacServiceGroupMember,
    ];

    /// Returns the static descriptor for this kind.
    pub fn descriptor(&self) -> &'static KindDescriptor {
        static HOST_GROUP_MEMBER: KindDescriptor = KindDescriptor {
            parent: ObjectType::HostGroup,
            command: "member",
            set_tag: "mh",
            dimensions: HOST_DIMENSIONS_MEMBER,
        };
        static GROUP_MEMBER: KindDescriptor = KindDescriptor {
            parent: ObjectType::Group,
            command: "member",
            set_tag: "mu",
            dimensions: USER_DIMENSIONS_MEMBER,
        };
        static HBAC_POLICY_HOST: KindDescriptor = KindDescriptor {
            parent: ObjectType::HbacRule,
            command: "host",
            set_tag: "mh",
            dimensions: HOST_DIMENSIONS_POLICY,
        };
        static HBAC_POLICY_USER: KindDescriptor = KindDescriptor {
            parent: ObjectType::HbacRule,
            command: "user",
            set_tag: "mu",
            dimensions: USER_DIMENSIONS_POLICY,
        };
        static HBAC_POLICY_SERVICE: KindDescriptor = KindDescriptor {
            parent: ObjectType::HbacRule,
            command: "service",
            set_tag: "ms",
            dimensions: HBAC_SERVICE_DIMENSIONS,
        };
        static SUDO_RULE_HOST: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoRule,
            command: "host",
            set_tag: "mh",
            dimensions: HOST_DIMENSIONS_POLICY,
        };
        static SUDO_RULE_USER: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoRule,
            command: "user",
            set_tag: "mu",
            dimensions: USER_DIMENSIONS_POLICY,
        };
        static SUDO_RULE_ALLOW_COMMAND: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoRule,
            command: "allow_command",
            set_tag: "msrac",
            dimensions: SUDO_ALLOW_COMMAND_DIMENSIONS,
        };
        static SUDO_RULE_RUNAS_USER: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoRule,
            command: "runasuser",
            set_tag: "msru",
            dimensions: SUDO_RUNAS_USER_DIMENSIONS,
        };
        static SUDO_RULE_RUNAS_GROUP: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoRule,
            command: "runasgroup",
            set_tag: "msrg",
            dimensions: SUDO_RUNAS_GROUP_DIMENSIONS,
        };
        static SUDOCMDGROUP_MEMBER: KindDescriptor = KindDescriptor {
            parent: ObjectType::SudoCmdGroup,
            command: "member",
            set_tag: "msc",
            dimensions: SUDOCMDGROUP_DIMENSIONS,
        };
        static HBACSVCGROUP_MEMBER: KindDescriptor = KindDescriptor {
            parent: ObjectType::HbacServiceGroup,
            command: "member",
            set_tag: "ms",
            dimensions: HBACSVCGROUP_DIMENSIONS,
        };

        match self {
            RelationKind::HostGroupMember => &HOST_GROUP_MEMBER,
            RelationKind::GroupMember => &GROUP_MEMBER,
            RelationKind::HbacPolicyHost => &HBAC_POLICY_HOST,
            RelationKind::HbacPolicyUser => &HBAC_POLICY_USER,
            RelationKind::HbacPolicyService => &HBAC_POLICY_SERVICE,
            RelationKind::SudoRuleHost => &SUDO_RULE_HOST,
            RelationKind::SudoRuleUser => &SUDO_RULE_USER,
            RelationKind::SudoRuleAllowCommand => &SUDO_RULE_ALLOW_COMMAND,
            RelationKind::SudoRuleRunAsUser => &SUDO_RULE_RUNAS_USER,
            RelationKind::SudoRuleRunAsGroup => &SUDO_RULE_RUNAS_GROUP,
            RelationKind::SudoCmdGroupMember => &SUDOCMDGROUP_MEMBER,
            RelationKind::HbacServiceGroupMember => &HBACSVCGROUP_MEMBER,
        }
    }

    /// Returns the parent object type.
    #[inline]
    pub fn parent_type(&self) -> ObjectType {
        self.descriptor().parent
    }

    /// Returns the snake_case name of this kind, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RelationKind::HostGroupMember => "host_group_member",
            RelationKind::GroupMember => "group_member",
            RelationKind::HbacPolicyHost => "hbac_policy_host",
            RelationKind::HbacPolicyUser => "hbac_policy_user",
            RelationKind::HbacPolicyService => "hbac_policy_service",
            RelationKind::SudoRuleHost => "sudo_rule_host",
            RelationKind::SudoRuleUser => "sudo_rule_user",
            RelationKind::SudoRuleAllowCommand => "sudo_rule_allow_command",
            RelationKind::SudoRuleRunAsUser => "sudo_rule_run_as_user",
            RelationKind::SudoRuleRunAsGroup => "sudo_rule_run_as_group",
            RelationKind::SudoCmdGroupMember => "sudo_cmd_group_member",
            RelationKind::HbacServiceGroupMember => "hbac_service_group_member",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
