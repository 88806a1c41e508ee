//! Shared application state, injected into handlers via the `State` extractor.

use std::sync::Arc;

use crate::spotify::SpotifyClient;
use crate::store::JsonFileStore;

#[derive(Clone)]
pub struct AppState {
    /// Chat log, input log and visit counter
    pub store: JsonFileStore,
    /// Now-playing proxy
    pub spotify: Arc<SpotifyClient>,
}

impl AppState {
    pub fn new(store: JsonFileStore, spotify: SpotifyClient) -> Self {
        Self {
            store,
            spotify: Arc::new(spotify),
        }
    }
}
