//! Exa search — async client for the Exa semantic web search API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ExaClient, SearchProvider, DEFAULT_BASE_URL};
pub use error::{SearchError, SearchResult};
pub use types::*;
