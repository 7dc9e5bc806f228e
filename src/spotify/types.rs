//! Wire types for the upstream player API, plus the normalized shapes the
//! rest of the relay consumes.

use serde::Deserialize;

// ============================================================================
// Upstream response shapes
// ============================================================================

/// `GET /v1/me/player` response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlayerResponse {
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<TrackObject>,
}

/// Track entry inside the player response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackObject {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumObject>,
}

/// Artist reference on a track; carries no images, those come from the
/// batched artist lookup.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArtistRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AlbumObject {
    #[serde(default)]
    pub images: Vec<ImageObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageObject {
    pub url: String,
}

/// `GET /v1/artists?ids=...` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ArtistsResponse {
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArtistObject {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageObject>,
}

// ============================================================================
// Normalized shapes
// ============================================================================

/// Outcome of one playback poll. "Nothing playing" is a success, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPlayback {
    /// The account is not playing anything right now.
    Inactive,
    /// Active playback with resolved display metadata.
    Active(NowPlaying),
}

/// The currently playing track, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub track_id: String,
    pub track_name: String,
    /// Album cover, when the upstream provided one.
    pub image_url: Option<String>,
    /// Track artists in upstream order.
    pub artists: Vec<ResolvedArtist>,
}

/// One artist with display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArtist {
    pub name: String,
    pub image_url: Option<String>,
}
