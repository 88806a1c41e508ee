//! Flat JSON File Store
//!
//! Every log the portfolio keeps is a single JSON file: an array of entries
//! for the chat and input logs, an object for the visit counter. All
//! read-modify-write cycles go through one async lock so concurrent
//! requests never lose each other's updates.
//!
//! Reads are lenient: a missing, empty or malformed file reads as empty.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// Chat question/response log
pub const CHAT_LOG_FILE: &str = "chat_logs.json";

/// Raw submitted questions
pub const INPUT_LOG_FILE: &str = "user_inputs.json";

/// Visit counter
pub const VISITS_FILE: &str = "visits.json";

/// Every file the store writes
pub const STORE_FILES: [&str; 3] = [CHAT_LOG_FILE, INPUT_LOG_FILE, VISITS_FILE];

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serialized access to the JSON files in one directory
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Create a store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Append one entry to an array file
    pub async fn append<T: Serialize>(&self, file: &str, entry: &T) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.path(file);

        let mut entries = read_array(&path).await?;
        entries.push(serde_json::to_value(entry)?);
        write_json(&path, &Value::Array(entries)).await
    }

    /// Truncate an array file to `[]`
    ///
    /// Returns false if the file did not exist (nothing to clear).
    pub async fn clear(&self, file: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.path(file);

        if !tokio::fs::try_exists(&path).await.map_err(|e| io(&path, e))? {
            return Ok(false);
        }
        write_json(&path, &Value::Array(Vec::new())).await?;
        Ok(true)
    }

    /// Increment the visit counter and return the new count
    ///
    /// Other keys in the counter file are preserved.
    pub async fn increment_visits(&self) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().await;
        let path = self.path(VISITS_FILE);

        let mut object = match read_value(&path).await? {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let count = object.get("count").and_then(Value::as_u64).unwrap_or(0) + 1;
        object.insert("count".to_string(), Value::from(count));

        write_json(&path, &Value::Object(object)).await?;
        Ok(count)
    }

    /// Current entries of an array file
    pub async fn entries(&self, file: &str) -> Result<Vec<Value>, StoreError> {
        let _guard = self.lock.lock().await;
        read_array(&self.path(file)).await
    }
}

fn io(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

async fn read_value(path: &Path) -> Result<Option<Value>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io(path, e)),
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed JSON store, starting over");
            Ok(None)
        }
    }
}

async fn read_array(path: &Path) -> Result<Vec<Value>, StoreError> {
    Ok(match read_value(path).await? {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    })
}

async fn write_json(path: &Path, value: &Value) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io(parent, e))?;
    }
    let body = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, body).await.map_err(|e| io(path, e))
}
