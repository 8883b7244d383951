//! Shared types used across dockhub crates.
//!
//! Container records come from the runtime and live for one poll. Service
//! and category descriptors are the persisted, operator-curated metadata.
//! `ServiceView` is the per-endpoint join of both that the dashboard renders.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Placeholder for container fields the runtime did not report.
pub const UNKNOWN: &str = "Unknown";

// ── Runtime records ────────────────────────────────────────────────

/// One running container as reported by `docker ps --format json`.
///
/// Every field is read permissively: absent or `null` values fall back to
/// a default and non-string scalars are stringified. Fields this crate does
/// not use are kept in `extra` so the debug surface can echo them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(rename = "Names", default, deserialize_with = "lenient_string")]
    pub names: String,
    #[serde(rename = "Ports", default, deserialize_with = "lenient_string")]
    pub ports: String,
    #[serde(
        rename = "Status",
        default = "unknown",
        deserialize_with = "lenient_or_unknown"
    )]
    pub status: String,
    #[serde(
        rename = "CreatedAt",
        default = "unknown",
        deserialize_with = "lenient_or_unknown"
    )]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerRecord {
    /// Build a record from the four fields the pipeline consumes.
    pub fn new(names: &str, ports: &str, status: &str, created_at: &str) -> Self {
        Self {
            names: names.to_string(),
            ports: ports.to_string(),
            status: status.to_string(),
            created_at: created_at.to_string(),
            extra: Map::new(),
        }
    }

    /// Container name with any leading `/` separators removed.
    pub fn container_name(&self) -> String {
        self.names.replace('/', "")
    }
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_or_unknown<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?).unwrap_or_else(unknown))
}

/// One host-IP-bound TCP mapping of a container.
///
/// Ports are kept as the text the runtime printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host_port: String,
    pub container_port: String,
    /// Scheme-relative link: `//<client-host>:<host_port>`.
    pub url: String,
}

// ── Persisted metadata ─────────────────────────────────────────────

/// Curated display identity for a container, keyed by container name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    /// Set only on the synthetic descriptor for unknown containers.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub uncategorized: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Display metadata for a category, keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategoryDescriptor {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            icon: icon.to_string(),
            name: name.to_string(),
            extra: Map::new(),
        }
    }
}

/// The `defaults` block written into a freshly created store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDefaults {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
}

/// Whole contents of the metadata store file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryDescriptor>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceDescriptor>,
    #[serde(
        rename = "categoryOrder",
        default,
        deserialize_with = "lenient_name_list"
    )]
    pub category_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DescriptorDefaults>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category every store starts with.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Icon used for the default category and unknown services.
pub const DEFAULT_ICON: &str = "🐳";

impl StoreDocument {
    /// Shape used when the store file is absent or unreadable.
    pub fn default_shape() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            DEFAULT_CATEGORY.to_string(),
            CategoryDescriptor::new(DEFAULT_CATEGORY, DEFAULT_ICON),
        );
        Self {
            categories,
            services: BTreeMap::new(),
            category_order: Vec::new(),
            defaults: Some(DescriptorDefaults {
                name: "Docker service".to_string(),
                description: "Docker service".to_string(),
                icon: DEFAULT_ICON.to_string(),
                category: DEFAULT_CATEGORY.to_string(),
            }),
            extra: Map::new(),
        }
    }
}

/// A non-list `categoryOrder` reads as empty; non-string entries are dropped.
fn lenient_name_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// ── View ───────────────────────────────────────────────────────────

/// One rendered catalog entry: descriptor + endpoint + live container fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceView {
    pub name: String,
    pub container_name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub uncategorized: bool,
    pub url: String,
    pub host_port: String,
    pub container_port: String,
    pub status: String,
    pub created: String,
}

impl ServiceView {
    pub fn new(
        record: &ContainerRecord,
        container_name: &str,
        descriptor: &ServiceDescriptor,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            container_name: container_name.to_string(),
            description: descriptor.description.clone(),
            icon: descriptor.icon.clone(),
            category: descriptor.category.clone(),
            uncategorized: descriptor.uncategorized,
            url: endpoint.url,
            host_port: endpoint.host_port,
            container_port: endpoint.container_port,
            status: record.status.clone(),
            created: record.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_record_reads_permissively() {
        let rec: ContainerRecord =
            serde_json::from_str(r#"{"Names":"/web","Ports":null,"ID":"abc"}"#).unwrap();
        assert_eq!(rec.container_name(), "web");
        assert_eq!(rec.ports, "");
        assert_eq!(rec.status, UNKNOWN);
        assert_eq!(rec.created_at, UNKNOWN);
        assert_eq!(rec.extra.get("ID"), Some(&Value::String("abc".into())));
    }

    #[test]
    fn container_record_stringifies_scalars() {
        let rec: ContainerRecord =
            serde_json::from_str(r#"{"Names":"db","Status":42}"#).unwrap();
        assert_eq!(rec.status, "42");
    }

    #[test]
    fn store_document_tolerates_bad_order() {
        let doc: StoreDocument =
            serde_json::from_str(r#"{"categoryOrder":"Media","services":{}}"#).unwrap();
        assert!(doc.category_order.is_empty());

        let doc: StoreDocument =
            serde_json::from_str(r#"{"categoryOrder":["Media",3,"Dev"]}"#).unwrap();
        assert_eq!(doc.category_order, vec!["Media", "Dev"]);
    }

    #[test]
    fn store_document_keeps_unknown_fields() {
        let raw = r#"{"services":{"web":{"name":"Web","port_hint":8080}},"theme":"dark"}"#;
        let doc: StoreDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.extra.get("theme"), Some(&Value::String("dark".into())));
        let web = &doc.services["web"];
        assert_eq!(web.extra.get("port_hint"), Some(&Value::from(8080)));

        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["theme"], "dark");
        assert_eq!(out["services"]["web"]["port_hint"], 8080);
        assert!(out["services"]["web"].get("uncategorized").is_none());
    }

    #[test]
    fn default_shape_has_other_category() {
        let doc = StoreDocument::default_shape();
        assert!(doc.services.is_empty());
        assert!(doc.category_order.is_empty());
        assert_eq!(doc.categories[DEFAULT_CATEGORY].name, DEFAULT_CATEGORY);
    }
}
