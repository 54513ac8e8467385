use serde::{Deserialize, Serialize};

const DEFAULT_STAKEHOLDER_DATA: &str = include_str!("../assets/data/stakeholders.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub priorities: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
struct StakeholderNoId {
    pub name: String,
    #[serde(default)]
    pub priorities: Vec<String>,
    pub description: String,
}

impl Stakeholder {
    #[must_use]
    fn with_id(id: String, s: StakeholderNoId) -> Self {
        Self {
            id,
            name: s.name,
            priorities: s.priorities,
            description: s.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StakeholderList(pub Vec<Stakeholder>);

impl StakeholderList {
    #[must_use]
    pub const fn empty() -> Self {
        Self(vec![])
    }

    /// Load stakeholders from a JSON object keyed by id
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid stakeholder data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut map: std::collections::HashMap<String, StakeholderNoId> =
            serde_json::from_str(json)?;
        let order = [
            "factory-workers",
            "transit-students",
            "environmental",
            "business",
        ];
        let mut v = Vec::with_capacity(order.len());
        for id in order {
            if let Some(s) = map.remove(id) {
                v.push(Stakeholder::with_id(id.to_string(), s));
            }
        }
        Ok(Self(v))
    }

    /// Stakeholders bundled with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset is corrupt.
    pub fn load_default() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_STAKEHOLDER_DATA)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Stakeholder> {
        self.0.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stakeholder> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a StakeholderList {
    type Item = &'a Stakeholder;
    type IntoIter = std::slice::Iter<'a, Stakeholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
