use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Map, Value};
use site_content_core::Section;

use crate::error::ApiResult;
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check: the content document must load and validate.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let doc = state.store().read().await?;

    let mut sections = Map::new();
    for section in Section::ALL {
        sections.insert(section.as_str().to_string(), json!(doc.section_len(section)));
    }

    Ok(Json(json!({
        "status": "ok",
        "version": doc.version(),
        "lastUpdated": doc.last_updated(),
        "sections": sections,
        "backupRetention": state.config().backup_retention,
        "subscribers": state.event_bus().subscriber_count(),
    })))
}

/// Lightweight ping, no storage access.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
