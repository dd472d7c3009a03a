use std::time::Duration;

use thiserror::Error;

/// Failure modes of the sync engine. The streaming core never surfaces these
/// to callers; they degrade to a logged event plus an observable state
/// change. Only the request/response API client returns them.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("api request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("backend rejected request: {0}")]
    Backend(String),
}
