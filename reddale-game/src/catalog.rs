//! Policy catalog and its unlock forest.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::metrics::Metrics;

const DEFAULT_POLICY_DATA: &str = include_str!("../assets/data/policies.json");

/// An immutable civic policy the mayor can enact once per game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Budget points debited when the policy is selected.
    pub cost: u32,
    /// Signed per-metric deltas applied when the policy is enacted.
    #[serde(default)]
    pub effects: Metrics,
    pub narrative: String,
    /// Single prerequisite that must be enacted before this policy is offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_by: Option<String>,
    #[serde(default)]
    pub is_upgrade: bool,
}

impl Policy {
    #[must_use]
    pub const fn is_base(&self) -> bool {
        self.unlocked_by.is_none()
    }

    #[must_use]
    pub fn prerequisite(&self) -> Option<&str> {
        self.unlocked_by.as_deref()
    }
}

/// Structural problems detected while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("policy catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("policy id `{0}` appears more than once")]
    DuplicateId(String),
    #[error("policy `{policy}` is unlocked by unknown policy `{prerequisite}`")]
    UnknownPrerequisite { policy: String, prerequisite: String },
    #[error("policy `{0}` lists itself as its prerequisite")]
    SelfPrerequisite(String),
    #[error("upgrade `{policy}` is unlocked by `{prerequisite}`, which is itself an upgrade")]
    NestedUpgrade { policy: String, prerequisite: String },
    #[error("policy `{policy}` has is_upgrade = {is_upgrade} but unlocked_by is {unlocked_by:?}")]
    UpgradeFlagMismatch {
        policy: String,
        is_upgrade: bool,
        unlocked_by: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    policies: Vec<Policy>,
}

/// The fixed set of policies for a game, validated as a forest of depth one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyCatalog {
    policies: Vec<Policy>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PolicyCatalog {
    /// Build a catalog, validating ids and the unlock forest.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if ids repeat, a prerequisite is missing or
    /// self-referential, an upgrade chains onto another upgrade, or the
    /// `is_upgrade` flag disagrees with `unlocked_by`.
    pub fn new(policies: Vec<Policy>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(policies.len());
        for (idx, policy) in policies.iter().enumerate() {
            if index.insert(policy.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateId(policy.id.clone()));
            }
        }

        for policy in &policies {
            if policy.is_upgrade != policy.unlocked_by.is_some() {
                return Err(CatalogError::UpgradeFlagMismatch {
                    policy: policy.id.clone(),
                    is_upgrade: policy.is_upgrade,
                    unlocked_by: policy.unlocked_by.clone(),
                });
            }
            let Some(prerequisite) = policy.prerequisite() else {
                continue;
            };
            if prerequisite == policy.id {
                return Err(CatalogError::SelfPrerequisite(policy.id.clone()));
            }
            let Some(&parent_idx) = index.get(prerequisite) else {
                return Err(CatalogError::UnknownPrerequisite {
                    policy: policy.id.clone(),
                    prerequisite: prerequisite.to_string(),
                });
            };
            // Depth one: a prerequisite must be a base policy. This also rules out cycles.
            if !policies[parent_idx].is_base() {
                return Err(CatalogError::NestedUpgrade {
                    policy: policy.id.clone(),
                    prerequisite: prerequisite.to_string(),
                });
            }
        }

        Ok(Self { policies, index })
    }

    /// Parse and validate a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and any validation
    /// error from [`PolicyCatalog::new`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.policies)
    }

    /// The Reddale catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset is corrupt.
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_POLICY_DATA)
    }

    /// Look up a policy by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Policy> {
        self.index.get(id).map(|&idx| &self.policies[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Policy> {
        self.policies.iter()
    }

    pub fn base_policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter().filter(|policy| policy.is_base())
    }

    pub fn upgrade_policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter().filter(|policy| !policy.is_base())
    }

    /// Upgrades unlocked by enacting `id`.
    pub fn upgrades_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Policy> + 'a {
        self.upgrade_policies()
            .filter(move |policy| policy.prerequisite() == Some(id))
    }

    /// Sum the effects of every listed id, counting repeats. Unknown ids contribute nothing.
    #[must_use]
    pub fn sum_effects<S: AsRef<str>>(&self, ids: &[S]) -> Metrics {
        ids.iter()
            .filter_map(|id| self.get(id.as_ref()))
            .map(|policy| policy.effects)
            .sum()
    }

    /// Total cost of the listed ids. Unknown ids cost nothing.
    #[must_use]
    pub fn total_cost<S: AsRef<str>>(&self, ids: &[S]) -> u32 {
        ids.iter()
            .filter_map(|id| self.get(id.as_ref()))
            .map(|policy| policy.cost)
            .sum()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl<'a> IntoIterator for &'a PolicyCatalog {
    type Item = &'a Policy;
    type IntoIter = std::slice::Iter<'a, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(id: &str, cost: u32, unlocked_by: Option<&str>) -> Policy {
        Policy {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            cost,
            effects: Metrics::new(1, 2, 3, 4),
            narrative: format!("{id} happened"),
            unlocked_by: unlocked_by.map(str::to_string),
            is_upgrade: unlocked_by.is_some(),
        }
    }

    #[test]
    fn bundled_catalog_is_a_valid_depth_one_forest() {
        let catalog = PolicyCatalog::load_default().unwrap();
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.base_policies().count(), 8);
        assert_eq!(catalog.upgrade_policies().count(), 6);
        for upgrade in catalog.upgrade_policies() {
            let parent = catalog.get(upgrade.prerequisite().unwrap()).unwrap();
            assert!(parent.is_base(), "{} chains onto an upgrade", upgrade.id);
        }
    }

    #[test]
    fn upgrades_of_lists_every_child() {
        let catalog = PolicyCatalog::load_default().unwrap();
        let mut children: Vec<_> = catalog
            .upgrades_of("brownfield-cleanup")
            .map(|p| p.id.as_str())
            .collect();
        children.sort_unstable();
        assert_eq!(children, vec!["brownfield-playground", "solar-microgrid"]);
        assert_eq!(catalog.upgrades_of("participatory-budget").count(), 0);
    }

    #[test]
    fn sum_effects_and_cost_skip_unknown_ids() {
        let catalog = PolicyCatalog::new(vec![policy("a", 10, None), policy("b", 5, Some("a"))])
            .unwrap();
        let ids = ["a", "b", "ghost"];
        assert_eq!(catalog.sum_effects(&ids), Metrics::new(2, 4, 6, 8));
        assert_eq!(catalog.total_cost(&ids), 15);
        assert!(catalog.contains("b"));
        assert!(!catalog.contains("ghost"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = PolicyCatalog::new(vec![policy("a", 1, None), policy("a", 2, None)]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn rejects_unknown_prerequisite() {
        let err = PolicyCatalog::new(vec![policy("b", 1, Some("missing"))]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPrerequisite { .. }));
    }

    #[test]
    fn rejects_self_prerequisite() {
        let err = PolicyCatalog::new(vec![policy("loop", 1, Some("loop"))]).unwrap_err();
        assert!(matches!(err, CatalogError::SelfPrerequisite(id) if id == "loop"));
    }

    #[test]
    fn rejects_nested_upgrades_and_cycles() {
        let chain = vec![
            policy("a", 1, None),
            policy("b", 1, Some("a")),
            policy("c", 1, Some("b")),
        ];
        assert!(matches!(
            PolicyCatalog::new(chain).unwrap_err(),
            CatalogError::NestedUpgrade { policy, .. } if policy == "c"
        ));

        let cycle = vec![policy("x", 1, Some("y")), policy("y", 1, Some("x"))];
        assert!(matches!(
            PolicyCatalog::new(cycle).unwrap_err(),
            CatalogError::NestedUpgrade { .. }
        ));
    }

    #[test]
    fn rejects_upgrade_flag_mismatch() {
        let mut flagged = policy("a", 1, None);
        flagged.is_upgrade = true;
        assert!(matches!(
            PolicyCatalog::new(vec![flagged]).unwrap_err(),
            CatalogError::UpgradeFlagMismatch { .. }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PolicyCatalog::from_json("{ \"policies\": [ { \"id\": 7 } ] }").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn from_json_defaults_missing_effects_and_flags() {
        let json = r#"{
            "policies": [
                {
                    "id": "quiet",
                    "name": "Quiet Policy",
                    "description": "Does nothing",
                    "cost": 0,
                    "narrative": "Nothing changes."
                }
            ]
        }"#;
        let catalog = PolicyCatalog::from_json(json).unwrap();
        let quiet = catalog.get("quiet").unwrap();
        assert_eq!(quiet.effects, Metrics::default());
        assert!(quiet.is_base());
        assert!(!quiet.is_upgrade);
    }
}
