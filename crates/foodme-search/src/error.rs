use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// A required parameter is missing or malformed. Never retried.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A single selection was requested from an empty candidate set.
    #[error("no restaurants matched the query")]
    NoCandidates,

    /// The listings provider failed or missed its deadline.
    #[error("listings provider unavailable: {0}")]
    ProviderUnavailable(String),
}
