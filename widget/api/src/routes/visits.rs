//! Visit counter route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct VisitCount {
    pub visits: u64,
}

/// `GET /api/visits`: count this visit and return the total.
pub async fn visits(State(state): State<AppState>) -> Result<Json<VisitCount>, StatusCode> {
    match state.store.increment_visits().await {
        Ok(visits) => Ok(Json(VisitCount { visits })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update visit counter");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
