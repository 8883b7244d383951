//! Dashboard action endpoints.
//!
//! Plain HTML form handlers that mutate the metadata store and redirect
//! back to the settings page.

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use dockhub_core::{CategoryDescriptor, ServiceDescriptor};
use dockhub_state::{Move, StateError, StateResult};

use crate::DashboardState;

fn finish<T>(result: StateResult<T>) -> Response {
    match result {
        Ok(_) => Redirect::to("/settings").into_response(),
        Err(e) => {
            let status = match e {
                StateError::MissingName(_) => StatusCode::BAD_REQUEST,
                StateError::NotFound { .. } => StatusCode::NOT_FOUND,
                StateError::Conflict => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!(error = %e, "settings action failed");
            (
                status,
                Html(format!(
                    r#"<div class="error">{}</div><a href="/settings">Back to settings</a>"#,
                    escape(&e.to_string())
                )),
            )
                .into_response()
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ── Services ────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
pub struct ServiceForm {
    /// Existing store key when editing; empty when creating.
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
}

pub async fn save_service(
    State(state): State<DashboardState>,
    Form(form): Form<ServiceForm>,
) -> Response {
    let descriptor = ServiceDescriptor {
        name: form.name,
        description: form.description,
        icon: form.icon,
        category: form.category,
        ..Default::default()
    };
    let result = if form.key.is_empty() {
        state.store.put_service(descriptor)
    } else {
        state.store.edit_service(&form.key, descriptor)
    };
    finish(result)
}

pub async fn delete_service(
    State(state): State<DashboardState>,
    Path(name): Path<String>,
) -> Response {
    finish(state.store.delete_service(&name))
}

// ── Categories ──────────────────────────────────────────────────

#[derive(serde::Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

pub async fn save_category(
    State(state): State<DashboardState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let descriptor = CategoryDescriptor::new(&form.name, &form.icon);
    let result = if form.key.is_empty() {
        state.store.put_category(descriptor)
    } else {
        state.store.edit_category(&form.key, descriptor)
    };
    finish(result)
}

pub async fn delete_category(
    State(state): State<DashboardState>,
    Path(name): Path<String>,
) -> Response {
    finish(state.store.delete_category(&name))
}

#[derive(serde::Deserialize)]
pub struct MoveForm {
    pub direction: String,
}

pub async fn move_category(
    State(state): State<DashboardState>,
    Path(name): Path<String>,
    Form(form): Form<MoveForm>,
) -> Response {
    let direction = match form.direction.as_str() {
        "up" => Move::Up,
        "down" => Move::Down,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Html(format!("unknown direction: {}", escape(other))),
            )
                .into_response();
        }
    };
    finish(state.store.move_category(&name, direction))
}
