//! The canonical playback snapshot.

use serde::Serialize;

use crate::spotify::NowPlaying;

/// Playback status as observed by viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Upstream reports active playback.
    Playing,
    /// Upstream explicitly reports nothing playing.
    Paused,
    /// Pre-first-poll placeholder only.
    Unknown,
    /// The last poll cycle failed.
    Error,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Unknown => write!(f, "unknown"),
            PlaybackStatus::Error => write!(f, "error"),
        }
    }
}

/// One artist as shown to viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistDisplay {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The canonical snapshot every consumer observes.
///
/// Invariant: `artists` is never empty; constructors substitute the fallback
/// display name when the upstream yields none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub track_name: String,
    pub track_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub artists: Vec<ArtistDisplay>,
}

impl PlaybackState {
    /// Placeholder shown before the first poll completes.
    pub fn connecting(fallback_name: &str) -> Self {
        Self::placeholder(PlaybackStatus::Unknown, fallback_name)
    }

    /// Snapshot for an account that is not playing anything.
    pub fn idle(fallback_name: &str) -> Self {
        Self::placeholder(PlaybackStatus::Paused, fallback_name)
    }

    /// Snapshot for a failed poll cycle with nothing worth preserving.
    pub fn unavailable(fallback_name: &str) -> Self {
        Self::placeholder(PlaybackStatus::Error, fallback_name)
    }

    /// Snapshot for an actively playing track.
    pub fn playing(now: NowPlaying, fallback_name: &str) -> Self {
        let mut artists: Vec<ArtistDisplay> = now
            .artists
            .into_iter()
            .map(|artist| ArtistDisplay {
                name: artist.name,
                image_url: artist.image_url,
            })
            .collect();
        if artists.is_empty() {
            artists.push(ArtistDisplay {
                name: fallback_name.to_string(),
                image_url: None,
            });
        }

        Self {
            status: PlaybackStatus::Playing,
            track_name: now.track_name,
            track_id: now.track_id,
            image_url: now.image_url,
            artists,
        }
    }

    /// The pair deciding whether two snapshots differ meaningfully.
    pub fn stability_key(&self) -> (PlaybackStatus, &str) {
        (self.status, &self.track_name)
    }

    /// Whether this snapshot carries only the fallback display name instead
    /// of real track data.
    pub fn is_placeholder(&self, fallback_name: &str) -> bool {
        self.artists
            .first()
            .is_none_or(|artist| artist.name == fallback_name)
    }

    fn placeholder(status: PlaybackStatus, fallback_name: &str) -> Self {
        Self {
            status,
            track_name: fallback_name.to_string(),
            track_id: String::new(),
            image_url: None,
            artists: vec![ArtistDisplay {
                name: fallback_name.to_string(),
                image_url: None,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::spotify::ResolvedArtist;

    use super::*;

    fn now_playing(artists: Vec<ResolvedArtist>) -> NowPlaying {
        NowPlaying {
            track_id: "track-1".to_string(),
            track_name: "Song".to_string(),
            image_url: Some("https://i.example/cover.jpg".to_string()),
            artists,
        }
    }

    #[test]
    fn test_placeholders_carry_fallback_artist() {
        for state in [
            PlaybackState::connecting("Nobody"),
            PlaybackState::idle("Nobody"),
            PlaybackState::unavailable("Nobody"),
        ] {
            assert_eq!(state.track_name, "Nobody");
            assert_eq!(state.artists.len(), 1);
            assert_eq!(state.artists[0].name, "Nobody");
            assert!(state.is_placeholder("Nobody"));
        }
    }

    #[test]
    fn test_playing_without_artists_substitutes_fallback() {
        let state = PlaybackState::playing(now_playing(Vec::new()), "Nobody");
        assert_eq!(state.status, PlaybackStatus::Playing);
        assert_eq!(state.artists.len(), 1);
        assert_eq!(state.artists[0].name, "Nobody");
    }

    #[test]
    fn test_playing_keeps_real_artists() {
        let state = PlaybackState::playing(
            now_playing(vec![ResolvedArtist {
                name: "Rick Astley".to_string(),
                image_url: None,
            }]),
            "Nobody",
        );
        assert!(!state.is_placeholder("Nobody"));
        assert_eq!(state.stability_key(), (PlaybackStatus::Playing, "Song"));
    }

    #[test]
    fn test_serialized_shape() {
        let state = PlaybackState::idle("Nobody");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "paused");
        assert_eq!(json["track_name"], "Nobody");
        assert_eq!(json["artists"][0]["name"], "Nobody");
        // absent optionals are omitted, not null
        assert!(json.get("image_url").is_none());
    }
}
