//! Member types and the case rules the directory applies to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of object that can appear as a member in a relation.
///
/// Each variant corresponds to one member option of the FreeIPA member
/// commands (`host`, `hostgroup`, `user`, ...). A relation kind exposes one
/// or two of these as its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberType {
    /// A host, identified by its fully-qualified name.
    #[serde(rename = "host")]
    Host,
    /// A host group.
    #[serde(rename = "hostgroup")]
    HostGroup,
    /// A user, identified by login.
    #[serde(rename = "user")]
    User,
    /// A user group.
    #[serde(rename = "group")]
    Group,
    /// An HBAC service (`sshd`, `/bin/bash`, ...).
    #[serde(rename = "hbacsvc")]
    HbacService,
    /// An HBAC service group.
    #[serde(rename = "hbacsvcgroup")]
    HbacServiceGroup,
    /// A sudo command, identified by its literal command path.
    #[serde(rename = "sudocmd")]
    SudoCmd,
    /// A sudo command group.
    #[serde(rename = "sudocmdgroup")]
    SudoCmdGroup,
}

impl MemberType {
    /// Returns the directory's option name for this member type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use freeipa_membership::MemberType;
    ///
    /// assert_eq!(MemberType::HbacServiceGroup.as_str(), "hbacsvcgroup");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Host => "host",
            MemberType::HostGroup => "hostgroup",
            MemberType::User => "user",
            MemberType::Group => "group",
            MemberType::HbacService => "hbacsvc",
            MemberType::HbacServiceGroup => "hbacsvcgroup",
            MemberType::SudoCmd => "sudocmd",
            MemberType::SudoCmdGroup => "sudocmdgroup",
        }
    }

    /// Returns how the directory compares names of this member type.
    ///
    /// Sudo commands are literal paths and are stored case-sensitively;
    /// every other member type is case-folded by the directory.
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        match self {
            MemberType::SudoCmd => CaseSensitivity::Sensitive,
            _ => CaseSensitivity::Insensitive,
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the directory treats two member names differing only in case as
/// the same member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    /// Names are folded before comparison (`Host1` == `host1`).
    #[default]
    Insensitive,
    /// Names must match exactly.
    Sensitive,
}

impl CaseSensitivity {
    /// Compares two member names under this rule.
    ///
    /// Folding uses full Unicode lowercase mapping without allocating.
    ///
    /// # Example
    ///
    /// ```rust
    /// use freeipa_membership::CaseSensitivity;
    ///
    /// assert!(CaseSensitivity::Insensitive.matches("Host1", "host1"));
    /// assert!(!CaseSensitivity::Sensitive.matches("Host1", "host1"));
    /// ```
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => {
                a == b
                    || a.chars()
                        .flat_map(char::to_lowercase)
                        .eq(b.chars().flat_map(char::to_lowercase))
            }
        }
    }
}

/// Reason FreeIPA gives when adding a member that is already present.
pub const ALREADY_MEMBER: &str = "This entry is already a member";

/// Reason FreeIPA gives when removing a member that is not present.
pub const NOT_MEMBER: &str = "This entry is not a member";

/// A member the directory refused to add or remove, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailedMember {
    /// The member name as reported by the directory.
    pub name: String,
    /// The directory's explanation (e.g. "This entry is already a member").
    pub reason: String,
}

impl FailedMember {
    /// Creates a new failed-member record.
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the directory refused a removal because the member
    /// was not there.
    #[inline]
    pub fn is_not_member(&self) -> bool {
        self.reason == NOT_MEMBER
    }
}

impl fmt::Display for FailedMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.reason)
        }
    }
}
