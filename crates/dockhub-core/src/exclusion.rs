//! Exclusion rules that move endpoints out of the main catalog.
//!
//! Rules come from a comma-separated string such as
//! `proxy, db:5432`. A bare token excludes every port of that container;
//! a `name:port` token excludes only that host port.

use std::collections::HashSet;

use crate::types::ServiceView;

/// One parsed exclusion token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionToken {
    Container(String),
    ContainerPort { container: String, port: String },
}

impl ExclusionToken {
    /// Parse a single token; blank tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(match token.split_once(':') {
            Some((container, port)) => ExclusionToken::ContainerPort {
                container: container.trim().to_string(),
                port: port.trim().to_string(),
            },
            None => ExclusionToken::Container(token.to_string()),
        })
    }
}

/// Which bucket a view lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Main,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    containers: HashSet<String>,
    container_ports: HashSet<(String, String)>,
}

impl ExclusionRules {
    pub fn parse(raw: &str) -> Self {
        let mut rules = Self::default();
        for token in raw.split(',').filter_map(ExclusionToken::parse) {
            match token {
                ExclusionToken::Container(name) => {
                    rules.containers.insert(name);
                }
                ExclusionToken::ContainerPort { container, port } => {
                    rules.container_ports.insert((container, port));
                }
            }
        }
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.container_ports.is_empty()
    }

    /// Port-specific rules are checked before container-wide rules.
    pub fn placement(&self, container_name: &str, host_port: &str) -> Placement {
        let key = (container_name.to_string(), host_port.to_string());
        if self.container_ports.contains(&key) || self.containers.contains(container_name) {
            Placement::Other
        } else {
            Placement::Main
        }
    }

    /// Split views into `(main, other)`, preserving input order in both.
    pub fn partition(&self, views: Vec<ServiceView>) -> (Vec<ServiceView>, Vec<ServiceView>) {
        views
            .into_iter()
            .partition(|v| self.placement(&v.container_name, &v.host_port) == Placement::Main)
    }
}
