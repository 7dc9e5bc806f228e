//! HTTP handlers for the relay surface.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::playback::PlaybackState;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Liveness probe.
///
/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Point-in-time read of the canonical playback snapshot.
///
/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<PlaybackState> {
    let snapshot = state.playback.read().await.clone();
    Json(snapshot)
}

/// Redirect the caller to the provider's authorize endpoint with a fresh
/// anti-forgery state token.
///
/// GET /api/login
pub async fn login(State(state): State<AppState>) -> Redirect {
    let token = new_state_token();
    let url = state.credentials.authorize_url(&token);
    *state.pending_login.lock().await = Some(token);

    Redirect::temporary(&url)
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Authorization callback: verify the anti-forgery token, exchange the code,
/// then send the caller back to the application root.
///
/// GET /api/callback
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    {
        let mut pending = state.pending_login.lock().await;
        let valid = matches!(
            (&query.state, pending.as_ref()),
            (Some(got), Some(want)) if got == want
        );
        if !valid {
            return Err(ApiError::bad_request("authorization state mismatch"));
        }
        pending.take();
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;
    state.credentials.exchange(&code).await?;

    info!("authorization callback completed");
    Ok(Redirect::temporary(&state.settings.public_base_url))
}

/// Out-of-band credential refresh.
///
/// GET /api/refresh
pub async fn refresh(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.credentials.refresh().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Random hex token tying a login redirect to its callback.
fn new_state_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}
