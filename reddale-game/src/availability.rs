//! Resolves which policies can be chosen given the enactment history.
use std::collections::HashSet;

use crate::catalog::{Policy, PolicyCatalog};

/// Policies selectable after `history` has been enacted.
///
/// Base policies are offered until enacted. Upgrades are offered once their
/// prerequisite is enacted and until they are enacted themselves. Base policies
/// come first, then upgrades, each in catalog order.
#[must_use]
pub fn available_policies<'a, S: AsRef<str>>(
    catalog: &'a PolicyCatalog,
    history: &[S],
) -> Vec<&'a Policy> {
    let enacted: HashSet<&str> = history.iter().map(AsRef::as_ref).collect();
    let base = catalog
        .base_policies()
        .filter(|policy| !enacted.contains(policy.id.as_str()));
    let upgrades = catalog.upgrade_policies().filter(|policy| {
        !enacted.contains(policy.id.as_str())
            && policy
                .prerequisite()
                .is_some_and(|parent| enacted.contains(parent))
    });
    base.chain(upgrades).collect()
}

/// Whether `id` would be offered after `history`.
#[must_use]
pub fn is_available<S: AsRef<str>>(catalog: &PolicyCatalog, history: &[S], id: &str) -> bool {
    available_policies(catalog, history)
        .iter()
        .any(|policy| policy.id == id)
}
