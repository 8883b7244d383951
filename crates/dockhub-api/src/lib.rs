//! dockhub-api: REST API for dockhub.
//!
//! Provides axum route handlers for editing the metadata store and a pair
//! of operational endpoints. Mounts the dashboard at `/`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/services` | Whole store document |
//! | POST | `/api/services` | Create or replace a service |
//! | PUT | `/api/services/{name}` | Replace an existing service |
//! | DELETE | `/api/services/{name}` | Delete a service |
//! | GET | `/api/categories` | Category map |
//! | POST | `/api/categories` | Create or replace a category |
//! | PUT | `/api/categories/{name}` | Replace an existing category |
//! | DELETE | `/api/categories/{name}` | Delete a category |
//! | PUT | `/api/categories/order` | Store the category order |
//! | GET | `/health` | Liveness |
//! | GET | `/debug` | Raw container records |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};

use dockhub_core::{EnvLookup, HubConfig};
use dockhub_dashboard::DashboardState;
use dockhub_docker::ContainerSource;
use dockhub_state::MetadataStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: MetadataStore,
    pub containers: Arc<dyn ContainerSource>,
}

/// Build the complete router (REST + dashboard + operational endpoints).
pub fn build_router(
    store: MetadataStore,
    containers: Arc<dyn ContainerSource>,
    config: Arc<HubConfig>,
    env: EnvLookup,
) -> Router {
    let api_state = ApiState {
        store: store.clone(),
        containers: containers.clone(),
    };

    let dashboard_state = DashboardState {
        store,
        containers,
        config,
        env,
    };

    let api_routes = Router::new()
        .route("/services", get(handlers::list_services).post(handlers::create_service))
        .route(
            "/services/{name}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        .route("/categories", get(handlers::list_categories).post(handlers::create_category))
        .route("/categories/order", put(handlers::update_category_order))
        .route(
            "/categories/{name}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .with_state(api_state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health))
        .route("/debug", get(handlers::debug).with_state(api_state))
        .merge(dockhub_dashboard::dashboard_router(dashboard_state))
}
