//! dockhub-dashboard: server-rendered web UI for dockhub.
//!
//! Renders the categorized service catalog and a settings page for the
//! metadata store. Every catalog request polls the container runtime and
//! reloads the store; nothing is cached between requests.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | Service catalog |
//! | `GET /settings` | Services and categories editor |
//! | `POST /settings/services` | Save a service |
//! | `POST /settings/services/{name}/delete` | Delete a service |
//! | `POST /settings/categories` | Save a category |
//! | `POST /settings/categories/{name}/delete` | Delete a category |
//! | `POST /settings/categories/{name}/move` | Move a category up or down |

pub mod actions;
pub mod pages;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use dockhub_core::{Catalog, EnvLookup, HubConfig, build_catalog};
use dockhub_docker::ContainerSource;
use dockhub_state::MetadataStore;

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub store: MetadataStore,
    pub containers: Arc<dyn ContainerSource>,
    pub config: Arc<HubConfig>,
    pub env: EnvLookup,
}

impl DashboardState {
    /// Run one discovery-to-view computation for a client on `client_host`.
    pub async fn catalog(&self, client_host: &str) -> Catalog {
        let containers = self.containers.list_containers().await;
        let snapshot = self.store.load();
        let settings = self.config.view_settings(self.env);
        let catalog = build_catalog(&containers, &snapshot.document, &settings, client_host);
        tracing::debug!(
            containers = catalog.container_count,
            services = catalog.service_count(),
            hidden = catalog.other.len(),
            "catalog computed"
        );
        catalog
    }

    /// Title for pages that do not compute a catalog.
    pub fn title(&self) -> String {
        self.config.view_settings(self.env).title
    }
}

/// Build the dashboard router.
pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/settings", get(pages::settings))
        .route("/settings/services", post(actions::save_service))
        .route("/settings/services/{name}/delete", post(actions::delete_service))
        .route("/settings/categories", post(actions::save_category))
        .route("/settings/categories/{name}/delete", post(actions::delete_category))
        .route("/settings/categories/{name}/move", post(actions::move_category))
        .with_state(state)
}
