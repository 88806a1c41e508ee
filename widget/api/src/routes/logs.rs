//! Chat and input log routes.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap};
use axum::response::Json;
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::ApiReply;
use crate::state::AppState;
use crate::store::{CHAT_LOG_FILE, INPUT_LOG_FILE};

#[derive(Debug, Default, Deserialize)]
pub struct LogChatRequest {
    pub question: Option<String>,
    pub response: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveInputRequest {
    #[serde(rename = "userInput")]
    pub user_input: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatLogEntry {
    id: String,
    timestamp: String,
    question: String,
    response: String,
    status: String,
    metadata: EntryMetadata,
}

#[derive(Debug, Serialize)]
struct EntryMetadata {
    user_agent: String,
    /// Peer address, hashed
    ip_hash: String,
}

#[derive(Debug, Serialize)]
struct InputEntry {
    timestamp: String,
    input: String,
}

/// Short unique entry id, `chat_` plus 13 hex digits
fn chat_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("chat_{}", &hex[..13])
}

fn hash_address(peer: &SocketAddr) -> String {
    hex::encode(Sha256::digest(peer.ip().to_string().as_bytes()))
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// `POST /api/log_chat`: append a question/response pair.
pub async fn log_chat(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<LogChatRequest>, JsonRejection>,
) -> Json<ApiReply> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let Some(question) = non_empty(request.question) else {
        return Json(ApiReply::failed("Question is required."));
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let entry = ChatLogEntry {
        id: chat_id(),
        timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        question,
        response: request.response.map(|r| r.trim().to_string()).unwrap_or_default(),
        status: request.status.unwrap_or_else(|| "unknown".to_string()),
        metadata: EntryMetadata {
            user_agent,
            ip_hash: hash_address(&peer),
        },
    };

    match state.store.append(CHAT_LOG_FILE, &entry).await {
        Ok(()) => {
            tracing::debug!(id = %entry.id, status = %entry.status, "Chat logged");
            Json(ApiReply {
                id: Some(entry.id),
                ..ApiReply::ok("Chat logged successfully.")
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to write chat log");
            Json(ApiReply::failed("Failed to write log file."))
        }
    }
}

/// `POST /api/save_input`: append a raw question.
pub async fn save_input(
    State(state): State<AppState>,
    body: Result<Json<SaveInputRequest>, JsonRejection>,
) -> Json<ApiReply> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let Some(input) = non_empty(request.user_input) else {
        return Json(ApiReply::failed("No user input provided."));
    };

    let entry = InputEntry {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        input,
    };

    match state.store.append(INPUT_LOG_FILE, &entry).await {
        Ok(()) => Json(ApiReply::ok("User input saved successfully.")),
        Err(e) => {
            tracing::error!(error = %e, "Failed to write input log");
            Json(ApiReply::failed("Failed to write to file."))
        }
    }
}

/// `POST /api/clear_inputs`: truncate the input log.
pub async fn clear_inputs(State(state): State<AppState>) -> Json<ApiReply> {
    match state.store.clear(INPUT_LOG_FILE).await {
        Ok(true) => {
            tracing::info!("Input log cleared");
            Json(ApiReply::ok("User inputs cleared successfully."))
        }
        Ok(false) => Json(ApiReply::ok(
            "User inputs file does not exist, nothing to clear.",
        )),
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear input log");
            Json(ApiReply::failed("Failed to clear user inputs file."))
        }
    }
}
