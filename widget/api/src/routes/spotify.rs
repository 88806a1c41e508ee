//! Spotify now-playing route.

use axum::extract::State;
use axum::response::Json;

use crate::spotify::NowPlaying;
use crate::state::AppState;

/// `GET /api/spotify`: current or last played track, or `{isPlaying: false}`.
pub async fn now_playing(State(state): State<AppState>) -> Json<NowPlaying> {
    match state.spotify.now_playing().await {
        Ok(reply) => Json(reply),
        Err(e) => {
            tracing::warn!(error = %e, "Spotify lookup failed");
            Json(NowPlaying::idle())
        }
    }
}
