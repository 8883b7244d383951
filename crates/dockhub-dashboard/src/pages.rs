//! Dashboard page handlers.
//!
//! Each handler gathers state, builds view types, and renders an Askama
//! template. Form handlers are in `actions.rs`.

use askama::Template;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::response::Html;

use dockhub_core::client_host;
use dockhub_state::known_order;

use crate::DashboardState;
use crate::views::*;

pub(crate) fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

// ── Catalog ─────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    title: String,
    active_page: &'static str,
    sections: Vec<CategorySection>,
    other: Vec<ServiceCard>,
    container_count: usize,
    service_count: usize,
}

pub async fn index(State(state): State<DashboardState>, headers: HeaderMap) -> Html<String> {
    let host = client_host(headers.get(HOST).and_then(|v| v.to_str().ok()));
    let catalog = state.catalog(&host).await;

    render(IndexTemplate {
        title: catalog.title.clone(),
        active_page: "catalog",
        sections: catalog_sections(&catalog),
        other: catalog.other.iter().map(ServiceCard::from_view).collect(),
        container_count: catalog.container_count,
        service_count: catalog.service_count(),
    })
}

// ── Settings ────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsTemplate {
    title: String,
    active_page: &'static str,
    services: Vec<ServiceRow>,
    categories: Vec<CategoryRow>,
    new_service_options: Vec<CategoryOption>,
}

pub async fn settings(State(state): State<DashboardState>) -> Html<String> {
    let doc = state.store.load().document;
    let ordered = known_order(&doc);

    let services = doc
        .services
        .iter()
        .map(|(key, desc)| ServiceRow::new(key, desc, &ordered))
        .collect();

    render(SettingsTemplate {
        title: state.title(),
        active_page: "settings",
        services,
        categories: category_rows(&ordered, &doc.categories),
        new_service_options: category_options(&ordered, &state.config.defaults.category),
    })
}
