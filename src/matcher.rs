//! Membership predicates that follow the directory's case rules.
//!
//! The directory folds the case of most member names (hosts, users, groups)
//! and echoes them back in whatever case was last written. Local state keeps
//! the caller's casing. These helpers compare across the two worlds without
//! ever replacing the caller's spelling with the directory's.

use crate::types::CaseSensitivity;

/// Returns `true` if `set` contains `candidate` under the given case rule.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::CaseSensitivity;
/// use freeipa_membership::matcher::contains_member;
///
/// let observed = ["Host1.example.com".to_string()];
/// assert!(contains_member(&observed, "host1.example.com", CaseSensitivity::Insensitive));
/// assert!(!contains_member(&observed, "host1.example.com", CaseSensitivity::Sensitive));
/// ```
pub fn contains_member<S: AsRef<str>>(set: &[S], candidate: &str, case: CaseSensitivity) -> bool {
    set.iter().any(|member| case.matches(member.as_ref(), candidate))
}

/// Returns the elements of `desired`, in their original order and casing,
/// that are present in `observed`.
///
/// Used after reading a parent object to keep only the tracked members the
/// directory still confirms. Members removed outside this engine drop out
/// naturally.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::CaseSensitivity;
/// use freeipa_membership::matcher::filter_present;
///
/// let observed = ["Host1", "Host2"];
/// let desired = ["host2", "Host3", "HOST1"];
/// assert_eq!(
///     filter_present(&observed, &desired, CaseSensitivity::Insensitive),
///     vec!["host2".to_string(), "HOST1".to_string()],
/// );
/// ```
pub fn filter_present<O, D>(observed: &[O], desired: &[D], case: CaseSensitivity) -> Vec<String>
where
    O: AsRef<str>,
    D: AsRef<str>,
{
    desired
        .iter()
        .map(AsRef::as_ref)
        .filter(|member| contains_member(observed, member, case))
        .map(str::to_owned)
        .collect()
}
