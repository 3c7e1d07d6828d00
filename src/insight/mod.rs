pub mod types;
pub mod prompt;
pub mod client;
pub mod parser;
pub mod cleanup;
pub mod fallback;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use client::*;
pub use parser::*;
pub use cleanup::*;
pub use fallback::*;
pub use orchestrator::*;

use thiserror::Error;

/// Failures of a single insight call.
///
/// Everything here is the explicit-error tier: the caller sees it.
/// Content that arrives but cannot be parsed never becomes an
/// `InsightError`; it is replaced by the kind's fallback payload.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("Upstream service is not reachable at {0}")]
    UpstreamConnection(String),

    #[error("Upstream returned error (status {status}): {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

impl InsightError {
    /// True for failures that happened before anything was sent upstream.
    pub fn is_rejection(&self) -> bool {
        matches!(self, InsightError::MissingField(_))
    }
}
