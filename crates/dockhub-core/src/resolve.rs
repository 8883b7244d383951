//! Service metadata resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_CATEGORY, DEFAULT_ICON, ServiceDescriptor};

/// Values used for containers that have no curated descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UncategorizedDefaults {
    pub description: String,
    pub icon: String,
    pub category: String,
}

impl Default for UncategorizedDefaults {
    fn default() -> Self {
        Self {
            description: "Categorize this service in settings".to_string(),
            icon: DEFAULT_ICON.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Looks container names up in a store snapshot.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    defaults: UncategorizedDefaults,
}

impl Resolver {
    pub fn new(defaults: UncategorizedDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &UncategorizedDefaults {
        &self.defaults
    }

    /// Exact-match lookup. A hit is returned as stored; a miss yields the
    /// synthetic uncategorized descriptor, which is never written back.
    pub fn resolve(
        &self,
        container_name: &str,
        services: &BTreeMap<String, ServiceDescriptor>,
    ) -> ServiceDescriptor {
        match services.get(container_name) {
            Some(stored) => stored.clone(),
            None => self.uncategorized(container_name),
        }
    }

    /// The descriptor used for a container with no stored entry.
    pub fn uncategorized(&self, container_name: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: container_name.to_string(),
            description: self.defaults.description.clone(),
            icon: self.defaults.icon.clone(),
            category: self.defaults.category.clone(),
            uncategorized: true,
            ..Default::default()
        }
    }
}
