use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use site_content_core::document::section::UnknownSection;
use site_content_core::store::BackupInfo;
use site_content_core::{ContentDocument, Section};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Content read/write routes used by the site and its admin UI.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/content",
            get(get_content).put(save_content).post(save_content),
        )
        .route("/api/content/backups", get(list_backups))
        .route("/api/content/backups/{id}/restore", post(restore_backup))
        .route("/api/content/{section}", get(get_section))
}

async fn get_content(State(state): State<AppState>) -> ApiResult<Json<ContentDocument>> {
    Ok(Json(state.store().read().await?))
}

async fn save_content(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(doc) = body?;
    let outcome = state.store().write(doc).await?;
    Ok(Json(json!({
        "success": true,
        "lastUpdated": outcome.last_updated,
        "backupId": outcome.backup_id,
    })))
}

/// One section from the local store, or from the fallback source when the
/// local section is empty.
async fn get_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let section: Section = name
        .parse()
        .map_err(|e: UnknownSection| ApiError::NotFound(e.to_string()))?;

    let items = state.store().section(section).await?;
    let (source, items) = match state.fallback() {
        Some(fallback) if items.is_empty() => {
            let remote = fallback.section(section);
            if remote.is_empty() {
                ("local", items)
            } else {
                tracing::debug!(%section, count = remote.len(), "serving section from fallback");
                (fallback.name(), remote)
            }
        }
        _ => ("local", items),
    };

    Ok(Json(json!({
        "section": section,
        "source": source,
        "items": items,
    })))
}

async fn list_backups(State(state): State<AppState>) -> ApiResult<Json<Vec<BackupInfo>>> {
    Ok(Json(state.store().backups().await?))
}

async fn restore_backup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let outcome = state.store().restore(&id).await?;
    Ok(Json(json!({
        "success": true,
        "restoredFrom": id,
        "lastUpdated": outcome.last_updated,
        "backupId": outcome.backup_id,
    })))
}
