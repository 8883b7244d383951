//! REST API handlers.
//!
//! Each mutating handler performs one store mutation and returns the JSON
//! envelope used across the API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use dockhub_core::{CategoryDescriptor, ServiceDescriptor};
use dockhub_state::StateError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn state_error(e: StateError) -> axum::response::Response {
    let status = match e {
        StateError::MissingName(_) => StatusCode::BAD_REQUEST,
        StateError::NotFound { .. } => StatusCode::NOT_FOUND,
        StateError::Conflict => StatusCode::CONFLICT,
        StateError::Read(_) | StateError::Write(_) | StateError::Serialize(_) => {
            tracing::error!(error = %e, "metadata store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(&e.to_string(), status).into_response()
}

// ── Services ───────────────────────────────────────────────────

/// GET /api/services
pub async fn list_services(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.store.load().document)
}

/// POST /api/services
pub async fn create_service(
    State(state): State<ApiState>,
    Json(descriptor): Json<ServiceDescriptor>,
) -> impl IntoResponse {
    match state.store.put_service(descriptor) {
        Ok(stored) => ApiResponse::ok(stored).into_response(),
        Err(e) => state_error(e),
    }
}

/// PUT /api/services/{name}
pub async fn update_service(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(descriptor): Json<ServiceDescriptor>,
) -> impl IntoResponse {
    match state.store.replace_service(&name, descriptor) {
        Ok(stored) => ApiResponse::ok(stored).into_response(),
        Err(e) => state_error(e),
    }
}

/// DELETE /api/services/{name}
pub async fn delete_service(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_service(&name) {
        Ok(()) => ApiResponse::ok("deleted").into_response(),
        Err(e) => state_error(e),
    }
}

// ── Categories ─────────────────────────────────────────────────

/// GET /api/categories
pub async fn list_categories(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.store.categories())
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<ApiState>,
    Json(descriptor): Json<CategoryDescriptor>,
) -> impl IntoResponse {
    match state.store.put_category(descriptor) {
        Ok(stored) => ApiResponse::ok(stored).into_response(),
        Err(e) => state_error(e),
    }
}

/// PUT /api/categories/{name}
pub async fn update_category(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(descriptor): Json<CategoryDescriptor>,
) -> impl IntoResponse {
    match state.store.replace_category(&name, descriptor) {
        Ok(stored) => ApiResponse::ok(stored).into_response(),
        Err(e) => state_error(e),
    }
}

/// DELETE /api/categories/{name}
pub async fn delete_category(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_category(&name) {
        Ok(()) => ApiResponse::ok("deleted").into_response(),
        Err(e) => state_error(e),
    }
}

/// Pull a list of names out of `{"order": [...]}`. A missing key is an
/// empty list; a body that is not an object, or an order that is not an
/// array of strings, is rejected.
fn parse_order(body: &Value) -> Result<Vec<String>, &'static str> {
    let Value::Object(fields) = body else {
        return Err("body must be an object with an order list");
    };
    match fields.get("order") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or("order entries must be category names"),
        Some(_) => Err("order must be a list of category names"),
    }
}

/// PUT /api/categories/order
pub async fn update_category_order(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let order = match parse_order(&body) {
        Ok(order) => order,
        Err(msg) => return error_response(msg, StatusCode::BAD_REQUEST).into_response(),
    };
    match state.store.set_category_order(order) {
        Ok(order) => ApiResponse::ok(order).into_response(),
        Err(e) => state_error(e),
    }
}

// ── Operational ────────────────────────────────────────────────

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /debug
pub async fn debug(State(state): State<ApiState>) -> impl IntoResponse {
    let containers = state.containers.list_containers().await;
    Json(serde_json::json!({
        "total_containers": containers.len(),
        "containers": containers,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
