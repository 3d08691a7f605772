use thiserror::Error;

/// Errors returned by the listings HTTP client.
#[derive(Debug, Error)]
pub enum ListingsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("listings API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid listings base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
