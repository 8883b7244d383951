//! View types for dashboard template rendering.
//!
//! These types are purpose-built for Askama templates: they carry
//! pre-formatted strings and computed fields so templates stay simple.

use std::collections::BTreeMap;

use dockhub_core::{
    Catalog, CategoryDescriptor, DEFAULT_CATEGORY, DEFAULT_ICON, ServiceDescriptor, ServiceView,
};

// ── Catalog ─────────────────────────────────────────────────────

pub struct CategorySection {
    pub key: String,
    pub display_name: String,
    pub icon: String,
    pub services: Vec<ServiceCard>,
}

pub struct ServiceCard {
    pub name: String,
    pub container_name: String,
    pub description: String,
    pub icon: String,
    pub url: String,
    pub port_display: String,
    pub status: String,
    pub status_class: &'static str,
    pub created: String,
    pub uncategorized: bool,
}

impl ServiceCard {
    pub fn from_view(view: &ServiceView) -> Self {
        Self {
            name: view.name.clone(),
            container_name: view.container_name.clone(),
            description: view.description.clone(),
            icon: view.icon.clone(),
            url: view.url.clone(),
            port_display: format!("{} → {}", view.host_port, view.container_port),
            status: view.status.clone(),
            status_class: status_class(&view.status),
            created: view.created.clone(),
            uncategorized: view.uncategorized,
        }
    }
}

/// Sections in display order, with category metadata from the store.
pub fn catalog_sections(catalog: &Catalog) -> Vec<CategorySection> {
    catalog
        .main
        .ordered()
        .map(|group| {
            let (display_name, icon) = category_label(&catalog.categories, &group.category);
            CategorySection {
                key: group.category.clone(),
                display_name,
                icon,
                services: group.services.iter().map(ServiceCard::from_view).collect(),
            }
        })
        .collect()
}

/// Display name and icon for a category, falling back to the key.
pub fn category_label(
    categories: &BTreeMap<String, CategoryDescriptor>,
    key: &str,
) -> (String, String) {
    match categories.get(key) {
        Some(cat) => (
            non_empty(&cat.name).unwrap_or(key).to_string(),
            non_empty(&cat.icon).unwrap_or(DEFAULT_ICON).to_string(),
        ),
        None => (key.to_string(), DEFAULT_ICON.to_string()),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

/// CSS class for a `docker ps` status string.
pub fn status_class(status: &str) -> &'static str {
    if status.starts_with("Up") {
        if status.contains("unhealthy") {
            "status-warn"
        } else {
            "status-up"
        }
    } else if status.starts_with("Exited") || status.starts_with("Dead") {
        "status-down"
    } else {
        "status-unknown"
    }
}

// ── Settings ────────────────────────────────────────────────────

pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

pub struct ServiceRow {
    pub key: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub options: Vec<CategoryOption>,
}

impl ServiceRow {
    pub fn new(key: &str, desc: &ServiceDescriptor, category_names: &[String]) -> Self {
        Self {
            key: key.to_string(),
            name: desc.name.clone(),
            description: desc.description.clone(),
            icon: desc.icon.clone(),
            category: desc.category.clone(),
            options: category_options(category_names, &desc.category),
        }
    }
}

pub struct CategoryRow {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub is_first: bool,
    pub is_last: bool,
}

/// Options for a category `<select>`; the default category is always offered.
pub fn category_options(category_names: &[String], selected: &str) -> Vec<CategoryOption> {
    let mut names: Vec<&str> = category_names.iter().map(String::as_str).collect();
    if !names.contains(&DEFAULT_CATEGORY) {
        names.push(DEFAULT_CATEGORY);
    }
    if !selected.is_empty() && !names.contains(&selected) {
        names.push(selected);
    }
    names
        .into_iter()
        .map(|name| CategoryOption {
            name: name.to_string(),
            selected: name == selected,
        })
        .collect()
}

pub fn category_rows(
    ordered: &[String],
    categories: &BTreeMap<String, CategoryDescriptor>,
) -> Vec<CategoryRow> {
    let last = ordered.len().saturating_sub(1);
    ordered
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let (name, icon) = category_label(categories, key);
            CategoryRow {
                key: key.clone(),
                name,
                icon,
                is_first: i == 0,
                is_last: i == last,
            }
        })
        .collect()
}
