//! Player API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use reqwest::{Client, StatusCode};

use crate::auth::CredentialManager;

use super::error::{ProviderError, ProviderResult};
use super::types::*;

/// Client for the upstream player API.
///
/// Every call fetches a bearer token from the credential manager first. The
/// client itself never retries; the single refresh-and-retry on a rejected
/// token is the caller's decision.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
}

impl SpotifyClient {
    /// Create a new player API client.
    pub fn new(base_url: impl Into<String>, credentials: Arc<CredentialManager>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    /// Fetch the current playback state.
    ///
    /// A `204 No Content` answer, an empty body, or a payload reporting
    /// inactive playback all map to [`ProviderPlayback::Inactive`]. When a
    /// track is playing, artist display metadata is resolved with one
    /// batched lookup; a failure there degrades to names without images
    /// rather than failing the poll.
    pub async fn fetch_playback(&self) -> ProviderResult<ProviderPlayback> {
        let credential = self.credentials.ensure_fresh().await?;

        let url = format!("{}/v1/me/player", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => return Ok(ProviderPlayback::Inactive),
            StatusCode::UNAUTHORIZED => return Err(ProviderError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            status if !status.is_success() => return Err(ProviderError::Upstream { status }),
            _ => {}
        }

        // some upstream deployments answer 200 with an empty body instead of 204
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(ProviderPlayback::Inactive);
        }

        let player: PlayerResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("player response: {e}")))?;

        let Some(item) = player.item else {
            return Ok(ProviderPlayback::Inactive);
        };
        if !player.is_playing {
            return Ok(ProviderPlayback::Inactive);
        }

        let artists = match self.lookup_artists(&credential.access_token, &item.artists).await {
            Ok(resolved) if !resolved.is_empty() => resolved,
            Ok(_) => names_only(&item.artists),
            Err(err) => {
                warn!("artist lookup failed, degrading to names without images: {err}");
                names_only(&item.artists)
            }
        };

        Ok(ProviderPlayback::Active(NowPlaying {
            track_id: item.id,
            track_name: item.name,
            image_url: item
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
            artists,
        }))
    }

    /// Resolve display metadata for all artists of the current track in one
    /// batched call, preserving upstream order.
    async fn lookup_artists(
        &self,
        access_token: &str,
        refs: &[ArtistRef],
    ) -> ProviderResult<Vec<ResolvedArtist>> {
        let ids: Vec<&str> = refs
            .iter()
            .map(|artist| artist.id.as_str())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/artists", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.join(","))])
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Upstream { status });
        }

        let resolved: ArtistsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("artists response: {e}")))?;

        Ok(resolved
            .artists
            .into_iter()
            .map(|artist| ResolvedArtist {
                name: artist.name,
                image_url: artist.images.into_iter().next().map(|image| image.url),
            })
            .collect())
    }
}

/// Fall back to the names carried on the track itself.
fn names_only(refs: &[ArtistRef]) -> Vec<ResolvedArtist> {
    refs.iter()
        .map(|artist| ResolvedArtist {
            name: artist.name.clone(),
            image_url: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::auth::Credential;
    use crate::settings::Settings;

    use super::*;

    async fn test_client(base_url: String) -> SpotifyClient {
        let settings = Settings {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            public_base_url: "http://localhost:8888".to_string(),
            fallback_name: "Nobody".to_string(),
            ..Settings::default()
        };
        let credentials = Arc::new(CredentialManager::new(&settings));
        credentials
            .seed(Credential {
                access_token: "at-test".to_string(),
                refresh_token: "rt-test".to_string(),
                expires_at: None,
            })
            .await;
        SpotifyClient::new(base_url, credentials)
    }

    fn player_body() -> serde_json::Value {
        json!({
            "is_playing": true,
            "item": {
                "id": "track-1",
                "name": "Never Gonna Give You Up",
                "artists": [
                    {"id": "artist-1", "name": "Rick Astley"},
                    {"id": "artist-2", "name": "Someone Else"}
                ],
                "album": {"images": [{"url": "https://i.example/cover.jpg"}]}
            }
        })
    }

    #[tokio::test]
    async fn test_no_content_is_inactive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(server.uri()).await;
        assert_eq!(
            client.fetch_playback().await.unwrap(),
            ProviderPlayback::Inactive
        );
    }

    #[tokio::test]
    async fn test_paused_playback_is_inactive() {
        let server = MockServer::start().await;
        let mut body = player_body();
        body["is_playing"] = json!(false);
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = test_client(server.uri()).await;
        assert_eq!(
            client.fetch_playback().await.unwrap(),
            ProviderPlayback::Inactive
        );
    }

    #[tokio::test]
    async fn test_active_playback_resolves_artists_in_one_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(player_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/artists"))
            .and(query_param("ids", "artist-1,artist-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "artists": [
                    {"name": "Rick Astley", "images": [{"url": "https://i.example/rick.jpg"}]},
                    {"name": "Someone Else", "images": []}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri()).await;
        let ProviderPlayback::Active(now) = client.fetch_playback().await.unwrap() else {
            panic!("expected active playback");
        };

        assert_eq!(now.track_name, "Never Gonna Give You Up");
        assert_eq!(now.image_url.as_deref(), Some("https://i.example/cover.jpg"));
        assert_eq!(now.artists.len(), 2);
        assert_eq!(now.artists[0].name, "Rick Astley");
        assert_eq!(
            now.artists[0].image_url.as_deref(),
            Some("https://i.example/rick.jpg")
        );
        assert_eq!(now.artists[1].image_url, None);
    }

    #[tokio::test]
    async fn test_artist_lookup_failure_degrades_to_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(player_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/artists"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(server.uri()).await;
        let ProviderPlayback::Active(now) = client.fetch_playback().await.unwrap() else {
            panic!("expected active playback");
        };

        assert_eq!(now.artists.len(), 2);
        assert_eq!(now.artists[0].name, "Rick Astley");
        assert!(now.artists.iter().all(|artist| artist.image_url.is_none()));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        for (status, check) in [
            (401u16, ProviderError::is_unauthorized as fn(&ProviderError) -> bool),
            (429, |e: &ProviderError| matches!(e, ProviderError::RateLimited)),
            (503, |e: &ProviderError| {
                matches!(e, ProviderError::Upstream { status } if status.as_u16() == 503)
            }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/me/player"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let client = test_client(server.uri()).await;
            let err = client.fetch_playback().await.unwrap_err();
            assert!(check(&err), "unexpected error for HTTP {status}: {err}");
        }
    }
}
