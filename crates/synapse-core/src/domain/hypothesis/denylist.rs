//! Generic entity names that lower hypothesis confidence

use std::collections::HashSet;

use crate::config::{DEFAULT_DENYLIST, HypothesisConfig};
use crate::domain::graph::Entity;

/// Set of overly generic entity names
///
/// Names are stored normalized, so matching ignores case and spacing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Denylist {
    names: HashSet<String>,
}

impl Denylist {
    /// Build a denylist from names
    pub fn new<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|n| Entity::normalize(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Denylist from the hypothesis settings
    pub fn from_config(config: &HypothesisConfig) -> Self {
        Self::new(&config.denylist)
    }

    /// Empty denylist
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&Entity::normalize(name))
    }

    /// True when either the id or the display name is generic
    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.contains(&entity.id) || self.contains(&entity.display_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Built-in list of generic biomedical terms
pub fn default_denylist() -> Denylist {
    Denylist::new(DEFAULT_DENYLIST.iter())
}
