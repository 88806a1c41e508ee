//! Spotify Now Playing
//!
//! Exchanges a long-lived refresh token for an access token, asks for the
//! currently playing track and falls back to the most recently played one.
//! Replies are cached in a single slot for a short window so page loads do
//! not hammer the Spotify API.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// How long a reply is served from cache
pub const CACHE_TTL: Duration = Duration::from_secs(10);

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Status label for a live track
pub const LISTENING: &str = "LISTENING TO";

/// Status label for a paused or past track
pub const LAST_PLAYED: &str = "LAST PLAYED";

/// Spotify errors
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("Spotify token error: {0}")]
    Token(String),

    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Refresh-token credentials
#[derive(Clone, Debug)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl SpotifyCredentials {
    /// Read SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN
    ///
    /// Returns None (with a warning) if any is missing or empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match (
            get("SPOTIFY_CLIENT_ID"),
            get("SPOTIFY_CLIENT_SECRET"),
            get("SPOTIFY_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(Self {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => {
                tracing::warn!(
                    "Spotify credentials missing; set SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN"
                );
                None
            }
        }
    }
}

/// Reply sent to the page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NowPlaying {
    /// Nothing to show
    pub fn idle() -> Self {
        Self::default()
    }

    fn from_track(track: &Track, status: &str) -> Self {
        let artist = track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            is_playing: true,
            is_live: Some(status == LISTENING),
            status: Some(status.to_string()),
            title: Some(track.name.clone()),
            artist: Some(artist),
            album_art: track.album.images.first().map(|i| i.url.clone()),
            url: track.external_urls.spotify.clone(),
        }
    }
}

// =============================================================================
// Spotify API shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    is_playing: Option<bool>,
    item: Option<Track>,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayed {
    #[serde(default)]
    items: Vec<PlayHistory>,
}

#[derive(Debug, Deserialize)]
struct PlayHistory {
    track: Track,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Album,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

/// Pick what to show from the two Spotify answers
fn choose(current: Option<CurrentlyPlaying>, recent: Option<RecentlyPlayed>) -> NowPlaying {
    if let Some(CurrentlyPlaying {
        is_playing,
        item: Some(track),
    }) = current
    {
        let status = if is_playing == Some(false) {
            LAST_PLAYED
        } else {
            LISTENING
        };
        return NowPlaying::from_track(&track, status);
    }

    recent
        .and_then(|r| r.items.into_iter().next())
        .map(|h| NowPlaying::from_track(&h.track, LAST_PLAYED))
        .unwrap_or_else(NowPlaying::idle)
}

struct Cached {
    fetched_at: Instant,
    reply: NowPlaying,
}

/// Now-playing client with a single-slot cache
pub struct SpotifyClient {
    credentials: Option<SpotifyCredentials>,
    http_client: reqwest::Client,
    cache: Mutex<Option<Cached>>,
}

impl SpotifyClient {
    pub fn new(credentials: Option<SpotifyCredentials>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            credentials,
            http_client,
            cache: Mutex::new(None),
        }
    }

    /// Whether credentials are configured
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// What to show right now
    ///
    /// Served from cache when fresh. Errors are not cached.
    pub async fn now_playing(&self) -> Result<NowPlaying, SpotifyError> {
        let Some(credentials) = &self.credentials else {
            return Ok(NowPlaying::idle());
        };

        let mut cache = self.cache.lock().await;
        if let Some(reply) = fresh(cache.as_ref(), Instant::now()) {
            tracing::trace!("Spotify cache hit");
            return Ok(reply);
        }

        let reply = self.fetch(credentials).await?;
        *cache = Some(Cached {
            fetched_at: Instant::now(),
            reply: reply.clone(),
        });
        Ok(reply)
    }

    async fn fetch(&self, credentials: &SpotifyCredentials) -> Result<NowPlaying, SpotifyError> {
        let token = self.access_token(credentials).await?;

        let response = self
            .http_client
            .get(format!("{API_BASE}/me/player/currently-playing"))
            .bearer_auth(&token)
            .send()
            .await?;
        let current = if response.status() == reqwest::StatusCode::NO_CONTENT {
            None
        } else {
            response.json::<CurrentlyPlaying>().await.ok()
        };

        let has_track = current.as_ref().is_some_and(|c| c.item.is_some());
        let recent = if has_track {
            None
        } else {
            self.http_client
                .get(format!("{API_BASE}/me/player/recently-played?limit=1"))
                .bearer_auth(&token)
                .send()
                .await?
                .json::<RecentlyPlayed>()
                .await
                .ok()
        };

        Ok(choose(current, recent))
    }

    async fn access_token(&self, credentials: &SpotifyCredentials) -> Result<String, SpotifyError> {
        let reply: TokenReply = self
            .http_client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = reply.error {
            let description = reply.error_description.unwrap_or_default();
            return Err(SpotifyError::Token(format!("{error} - {description}")));
        }
        reply
            .access_token
            .ok_or_else(|| SpotifyError::Token("no access token in reply".to_string()))
    }
}

fn fresh(cached: Option<&Cached>, now: Instant) -> Option<NowPlaying> {
    cached
        .filter(|c| now.duration_since(c.fetched_at) < CACHE_TTL)
        .map(|c| c.reply.clone())
}
