//! Gateway error types.

/// Failures of the writable local key/value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local store io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value or a value being written is not valid JSON for its key.
    #[error("local store value for {key} is invalid: {source}")]
    Json { key: String, source: serde_json::Error },

    /// The key cannot be mapped onto the backing store.
    #[error("invalid local store key: {0}")]
    InvalidKey(String),

    /// The browser refused the operation (quota exceeded, storage disabled).
    #[error("browser storage failed: {0}")]
    Browser(String),
}

/// Errors surfaced by [`crate::Gateway`] operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a status the contract does not allow.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A static source could not be read for a reason other than "missing".
    #[error("static source read failed for {path}: {message}")]
    Source { path: String, message: String },

    /// Rejected input, e.g. an empty username.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
