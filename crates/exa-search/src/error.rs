//! Errors returned by the search client.

/// Errors that can occur while talking to the search provider.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}. {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Convenience result type.
pub type SearchResult<T> = Result<T, SearchError>;
