//! Add/remove deltas between a prior and a desired member list.

use std::collections::HashSet;

/// The members to add and remove to move one dimension from its prior list
/// to its desired list.
///
/// Membership is exact and case-sensitive: local state is compared as the
/// caller wrote it. Both lists follow the order of their source sequence and
/// name each member at most once.
///
/// # Example
///
/// ```rust
/// use freeipa_membership::Delta;
///
/// let prior = vec!["a".to_string(), "b".to_string()];
/// let desired = vec!["b".to_string(), "c".to_string()];
///
/// let delta = Delta::between(Some(prior.as_slice()), &desired);
/// assert_eq!(delta.added, ["c"]);
/// assert_eq!(delta.removed, ["a"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Members in `desired` but not in `prior`.
    pub added: Vec<String>,
    /// Members in `prior` but not in `desired`.
    pub removed: Vec<String>,
}

impl Delta {
    /// Computes the delta from `prior` to `desired`.
    ///
    /// An absent `prior` means nothing is known yet: every desired member is
    /// added and nothing is removed.
    pub fn between<P, D>(prior: Option<&[P]>, desired: &[D]) -> Self
    where
        P: AsRef<str>,
        D: AsRef<str>,
    {
        let prior: &[P] = prior.unwrap_or(&[]);

        let prior_set: HashSet<&str> = prior.iter().map(AsRef::as_ref).collect();
        let desired_set: HashSet<&str> = desired.iter().map(AsRef::as_ref).collect();

        Self {
            added: difference(desired, &prior_set),
            removed: difference(prior, &desired_set),
        }
    }

    /// Returns `true` if neither list has members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Elements of `from` not in `exclude`, in order, first occurrence only.
fn difference<S: AsRef<str>>(from: &[S], exclude: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(from.len());
    from.iter()
        .map(AsRef::as_ref)
        .filter(|member| !exclude.contains(member) && seen.insert(*member))
        .map(str::to_owned)
        .collect()
}
