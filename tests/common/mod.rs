//! Test utilities and common setup.

use axum::Router;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nowcast::api::{self, AppState};
use nowcast::settings::Settings;

/// Settings pointing every upstream endpoint at the given mock server.
pub fn test_settings(upstream: &str) -> Settings {
    Settings {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        authorize_url: format!("{upstream}/authorize"),
        token_url: format!("{upstream}/api/token"),
        api_base_url: upstream.to_string(),
        public_base_url: "http://localhost:8888".to_string(),
        fallback_name: "Nobody".to_string(),
        ..Settings::default()
    }
}

/// Application state wired against a mock upstream.
pub fn test_state(upstream: &str) -> AppState {
    AppState::new(test_settings(upstream))
}

/// Router plus its state, wired against a mock upstream.
pub fn test_app(upstream: &str) -> (Router, AppState) {
    let state = test_state(upstream);
    (api::create_router(state.clone()), state)
}

/// Mount a token endpoint answering code exchanges, then store a credential
/// by exchanging a code.
pub async fn authenticate(server: &MockServer, state: &AppState) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-test",
            "token_type": "Bearer",
            "refresh_token": "rt-test",
            "expires_in": 3600,
            "scope": "user-read-playback-state",
        })))
        .mount(server)
        .await;

    state
        .credentials
        .exchange("test-code")
        .await
        .expect("code exchange against mock server");
}

/// Body of an active-playback player response.
pub fn playing_body(track: &str) -> serde_json::Value {
    json!({
        "is_playing": true,
        "item": {
            "id": "track-1",
            "name": track,
            "artists": [{"id": "artist-1", "name": "Rick Astley"}],
            "album": {"images": [{"url": "https://i.example/cover.jpg"}]}
        }
    })
}

/// Artist lookup response matching [`playing_body`].
pub fn artists_body() -> serde_json::Value {
    json!({
        "artists": [
            {"name": "Rick Astley", "images": [{"url": "https://i.example/rick.jpg"}]}
        ]
    })
}
