use crate::components::edit_stamp::{EditNotification, EditOutcome, EditStampWorkflow};
use crate::components::manual_entry::insert_manual_contact_row;
use crate::components::sheets::SheetStore;
use crate::config::Config;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct WebhookState {
    pub config: Arc<RwLock<Config>>,
    pub edits: EditStampWorkflow,
    pub sheets: Arc<dyn SheetStore>,
}

/// Routes of the webhook server
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/hooks/edit", post(edit_handler))
        .route("/hooks/manual-entry", post(manual_entry_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn edit_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(notification): Json<Option<EditNotification>>,
) -> Result<Json<EditOutcome>, (StatusCode, String)> {
    let config = state.config.read().await.clone();
    authorize(&headers, &config)?;

    state
        .edits
        .on_edit(&config, notification.as_ref(), Utc::now())
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to handle edit notification: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

async fn manual_entry_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let config = state.config.read().await.clone();
    authorize(&headers, &config)?;

    match insert_manual_contact_row(state.sheets.as_ref(), &config).await {
        Ok(inserted) => Ok(Json(json!({ "inserted": inserted }))),
        Err(e) => {
            error!("Failed to insert manual contact row: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Require the bearer secret when one is configured
fn authorize(headers: &HeaderMap, config: &Config) -> Result<(), (StatusCode, String)> {
    let Some(secret) = config.webhook_secret.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if presented.is_some_and(|token| constant_time_eq(token.as_bytes(), secret.as_bytes())) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}

/// Comparison whose duration does not depend on where the inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
