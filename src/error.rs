use thiserror::Error;

/// Failure to produce a snapshot from the upstream provider
#[derive(Debug, Error)]
pub enum FetchError {
    /// Unreachable, timed out, rate limited or a server-side error.
    /// Recovered by waiting for the next poll cycle.
    #[error("provider unavailable: {0}")]
    Transient(String),

    /// Payload missing required fields or not decodable
    #[error("malformed provider payload: {0}")]
    Malformed(String),

    /// Provider has no data for this game id
    #[error("unknown game id: {0}")]
    UnknownGame(String),
}

impl FetchError {
    pub fn is_unknown_game(&self) -> bool {
        matches!(self, FetchError::UnknownGame(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Failure talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection could not be acquired or was lost
    #[error("document store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("document store query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode document {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Classify a sqlx error into connection loss or statement failure
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Protocol(_) => StoreError::Unavailable(err),
            other => StoreError::Query(other),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Failure answering a chat assistant request
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("GEMINI_API_KEY is not configured")]
    NotConfigured,

    /// The language model call failed or returned an error status
    #[error("language model request failed: {0}")]
    Model(String),
}
