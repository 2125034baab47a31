//! Public endpoints.
//!
//! - GET  /health
//! - POST /subscribe
//! - POST /test
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{AuthError, bearer_token};
use crate::error::ApiError;
use crate::store::{PushSubscription, SubscriptionKeys, UpsertOutcome};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/subscribe", post(subscribe))
        .route("/test", post(send_test))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Browser `PushSubscription.toJSON()` shape.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl SubscribeRequest {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let req: Self =
            serde_json::from_slice(body).map_err(|err| ApiError::BadRequest(err.to_string()))?;
        if req.endpoint.trim().is_empty() {
            return Err(ApiError::BadRequest("endpoint is required".to_string()));
        }
        if req.keys.p256dh.trim().is_empty() || req.keys.auth.trim().is_empty() {
            return Err(ApiError::BadRequest("keys.p256dh and keys.auth are required".to_string()));
        }
        Ok(req)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub created: bool,
}

async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header_value).ok_or(AuthError::MissingToken)?;
    let user_id = state.verifier.verify(token)?;

    let req = SubscribeRequest::parse(&body)?;
    let outcome = state
        .subscriptions
        .upsert(PushSubscription {
            user_id: user_id.clone(),
            endpoint: req.endpoint.trim().to_string(),
            keys: req.keys,
            updated_at: Utc::now(),
        })
        .await?;
    log::info!("stored push subscription for {user_id} ({outcome:?})");
    Ok(Json(SubscribeResponse {
        ok: true,
        created: outcome == UpsertOutcome::Created,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestPushResponse {
    pub ok: bool,
    pub sent: u32,
}

/// Delivery lives with the browser push provider; nothing is sent here.
async fn send_test() -> Json<TestPushResponse> {
    Json(TestPushResponse { ok: true, sent: 0 })
}
