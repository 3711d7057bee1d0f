pub mod cohere;
pub mod ollama;
pub mod traits;

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Request failed: {0}")]
    Http(reqwest::Error),
    #[error("API request failed: status {status}, body: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response format: missing {0}")]
    MissingField(&'static str),
    #[error("{0} does not support {1}")]
    Unsupported(&'static str, &'static str),
}

/// Classify a reqwest failure, keeping timeouts distinguishable so an
/// unresponsive backend reads differently from an unreachable one.
pub(crate) fn request_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::Http(e)
    }
}

pub use cohere::CohereProvider;
pub use ollama::OllamaProvider;
pub use traits::CompletionProvider;
