//! The discovery-to-view pipeline.
//!
//! ```text
//! ContainerRecord ──extract_ports──▶ Endpoint ──resolve──▶ ServiceView
//!                                                   │
//!                                     ExclusionRules::partition
//!                                          │             │
//!                                        main          other
//!                                          │
//!                                      aggregate ──▶ groups + display order
//! ```
//!
//! Everything here is pure: the caller enumerates containers and loads a
//! store snapshot, then hands both in.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{Aggregated, aggregate};
use crate::config::ViewSettings;
use crate::ports::extract_ports;
use crate::resolve::Resolver;
use crate::types::{CategoryDescriptor, ContainerRecord, ServiceView, StoreDocument};

/// Result of one view computation.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub title: String,
    /// Main partition, grouped and ordered.
    pub main: Aggregated,
    /// Excluded endpoints, in discovery order.
    pub other: Vec<ServiceView>,
    /// Category display metadata from the snapshot.
    pub categories: BTreeMap<String, CategoryDescriptor>,
    pub container_count: usize,
}

impl Catalog {
    pub fn service_count(&self) -> usize {
        self.main.groups.iter().map(|g| g.services.len()).sum()
    }
}

/// Expand containers into one view per endpoint. Containers without a
/// supported port mapping produce nothing.
pub fn collect_views(
    containers: &[ContainerRecord],
    snapshot: &StoreDocument,
    resolver: &Resolver,
    client_host: &str,
) -> Vec<ServiceView> {
    let mut views = Vec::new();
    for record in containers {
        let container_name = record.container_name();
        let endpoints = extract_ports(&record.ports, client_host);
        debug!(container = %container_name, endpoints = endpoints.len(), "container scanned");
        if endpoints.is_empty() {
            continue;
        }
        let descriptor = resolver.resolve(&container_name, &snapshot.services);
        for endpoint in endpoints {
            views.push(ServiceView::new(record, &container_name, &descriptor, endpoint));
        }
    }
    views
}

pub fn build_catalog(
    containers: &[ContainerRecord],
    snapshot: &StoreDocument,
    settings: &ViewSettings,
    client_host: &str,
) -> Catalog {
    let views = collect_views(containers, snapshot, &settings.resolver, client_host);
    let total = views.len();
    let (main, other) = settings.exclusions.partition(views);
    debug!(total, main = main.len(), other = other.len(), "endpoints partitioned");

    Catalog {
        title: settings.title.clone(),
        main: aggregate(main, &snapshot.category_order),
        other,
        categories: snapshot.categories.clone(),
        container_count: containers.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EXCLUDED_ENV, HubConfig};
    use crate::types::ServiceDescriptor;

    fn snapshot() -> StoreDocument {
        let mut doc = StoreDocument::default_shape();
        doc.services.insert(
            "jellyfin".into(),
            ServiceDescriptor {
                name: "Jellyfin".into(),
                description: "Media".into(),
                icon: "🎬".into(),
                category: "Media".into(),
                ..Default::default()
            },
        );
        doc.category_order = vec!["Media".into(), "Other".into(), "Ghost".into()];
        doc
    }

    fn containers() -> Vec<ContainerRecord> {
        vec![
            ContainerRecord::new("jellyfin", "0.0.0.0:8096->8096/tcp", "Up 2 hours", "t1"),
            ContainerRecord::new("db", "0.0.0.0:5432->5432/tcp, 0.0.0.0:5433->5433/tcp", "Up", "t2"),
            ContainerRecord::new("proxy", "0.0.0.0:80->80/tcp, 0.0.0.0:443->443/tcp", "Up", "t3"),
            ContainerRecord::new("worker", "", "Up", "t4"),
            ContainerRecord::new("dns", "0.0.0.0:53->53/udp", "Up", "t5"),
        ]
    }

    fn settings(excluded: &'static str) -> ViewSettings {
        HubConfig::default().view_settings(move |k| (k == EXCLUDED_ENV).then(|| excluded.to_string()))
    }

    #[test]
    fn full_pipeline() {
        let catalog = build_catalog(&containers(), &snapshot(), &settings("proxy,db:5432"), "hub");

        assert_eq!(catalog.container_count, 5);
        assert_eq!(catalog.main.display_order, vec!["Media", "Other"]);

        let media = catalog.main.group("Media").unwrap();
        assert_eq!(media.services[0].name, "Jellyfin");
        assert_eq!(media.services[0].url, "//hub:8096");
        assert!(!media.services[0].uncategorized);

        let other = catalog.main.group("Other").unwrap();
        assert_eq!(other.services.len(), 1);
        assert_eq!(other.services[0].container_name, "db");
        assert_eq!(other.services[0].host_port, "5433");
        assert!(other.services[0].uncategorized);

        let hidden: Vec<_> = catalog
            .other
            .iter()
            .map(|v| (&*v.container_name, &*v.host_port))
            .collect();
        assert_eq!(hidden, vec![("db", "5432"), ("proxy", "80"), ("proxy", "443")]);
    }

    #[test]
    fn every_view_in_exactly_one_partition() {
        let all = collect_views(&containers(), &snapshot(), &Resolver::default(), "hub");
        assert_eq!(all.len(), 5);

        let catalog = build_catalog(&containers(), &snapshot(), &settings("proxy,db:5432"), "hub");
        assert_eq!(catalog.service_count() + catalog.other.len(), all.len());

        let main: std::collections::HashSet<_> = catalog
            .main
            .groups
            .iter()
            .flat_map(|g| &g.services)
            .map(|v| (v.container_name.clone(), v.host_port.clone()))
            .collect();
        let other: std::collections::HashSet<_> = catalog
            .other
            .iter()
            .map(|v| (v.container_name.clone(), v.host_port.clone()))
            .collect();
        assert!(main.is_disjoint(&other));
        assert_eq!(main.len() + other.len(), all.len());
    }

    #[test]
    fn containers_without_ports_are_invisible() {
        let views = collect_views(&containers(), &snapshot(), &Resolver::default(), "hub");
        assert!(views.iter().all(|v| v.container_name != "worker"));
        assert!(views.iter().all(|v| v.container_name != "dns"));
    }

    #[test]
    fn synthetic_descriptor_not_persisted() {
        let snap = snapshot();
        let before = snap.clone();
        let _ = build_catalog(&containers(), &snap, &settings(""), "hub");
        assert_eq!(snap, before);
        assert!(!snap.services.contains_key("db"));
    }

    #[test]
    fn empty_discovery() {
        let catalog = build_catalog(&[], &snapshot(), &settings(""), "hub");
        assert_eq!(catalog.service_count(), 0);
        assert!(catalog.main.display_order.is_empty());
        assert!(catalog.other.is_empty());
    }
}
