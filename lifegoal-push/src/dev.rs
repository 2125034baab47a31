//! Development-only helpers, mounted when `LIFEGOAL_DEV_ROUTES` is set.
//!
//! - POST /api/save-subscription
//! - GET  /api/vapid-public-key
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/save-subscription", post(save_subscription))
        .route("/api/vapid-public-key", get(vapid_public_key))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedResponse {
    pub ok: bool,
}

/// Append the posted JSON, compacted to one line, to the subscriptions file.
async fn save_subscription(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SavedResponse>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest("expected a JSON object".to_string()));
    }
    let mut line = value.to_string();
    line.push('\n');

    let path = &state.config.subscriptions_file;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|err| ApiError::Internal(format!("open {}: {err}", path.display())))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|err| ApiError::Internal(format!("write {}: {err}", path.display())))?;
    log::debug!("appended subscription to {}", path.display());
    Ok(Json(SavedResponse { ok: true }))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

async fn vapid_public_key(
    State(state): State<AppState>,
) -> Result<Json<VapidKeyResponse>, ApiError> {
    let key = state
        .config
        .vapid_public_key
        .clone()
        .ok_or_else(|| ApiError::Internal("VAPID_PUBLIC_KEY is not configured".to_string()))?;
    Ok(Json(VapidKeyResponse { public_key: key }))
}
