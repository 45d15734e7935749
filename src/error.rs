//! Unified error handling for the translation pipeline.
//!
//! Two layers: `PipelineError` covers process-level preconditions and I/O
//! (configuration, corpus loading, cache writes), while `TranslateFailure`
//! classifies everything the remote service can do wrong. Classification is
//! an explicit tagged property of the failure, not control flow in the
//! caller.

use thiserror::Error;

/// Process-level pipeline errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Live runs require a credential; dry runs do not.
    #[error("TRANSLATOR_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Classified failure of a single translation attempt.
///
/// The message carries a truncated excerpt of whatever the service returned,
/// enough for the error log without retaining full payloads.
#[derive(Error, Debug, Clone)]
pub enum TranslateFailure {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("translation refused: {0}")]
    Refused(String),

    #[error("{0}")]
    Unknown(String),
}

impl TranslateFailure {
    /// Whether the backoff executor may retry this failure.
    ///
    /// Rate limits, timeouts, server-side errors, and malformed or truncated
    /// responses are transient. A refusal or anything unclassified is
    /// terminal on first occurrence.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateFailure::RateLimited(_) => true,
            TranslateFailure::Timeout(_) => true,
            TranslateFailure::ServerError(_) => true,
            TranslateFailure::MalformedResponse(_) => true,
            TranslateFailure::Refused(_) => false,
            TranslateFailure::Unknown(_) => false,
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            TranslateFailure::RateLimited(_) => FailureCategory::RateLimited,
            TranslateFailure::Timeout(_) => FailureCategory::Timeout,
            TranslateFailure::ServerError(_) => FailureCategory::ServerError,
            TranslateFailure::MalformedResponse(_) => FailureCategory::MalformedResponse,
            TranslateFailure::Refused(_) => FailureCategory::Refused,
            TranslateFailure::Unknown(_) => FailureCategory::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TranslateFailure::RateLimited(msg)
            | TranslateFailure::Timeout(msg)
            | TranslateFailure::ServerError(msg)
            | TranslateFailure::MalformedResponse(msg)
            | TranslateFailure::Refused(msg)
            | TranslateFailure::Unknown(msg) => msg,
        }
    }

    /// Failure reported for a task that was cancelled before completing.
    pub fn cancelled() -> Self {
        TranslateFailure::Unknown("cancelled before completion".to_string())
    }
}

/// Failure taxonomy used for aggregation and the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureCategory {
    RateLimited,
    Timeout,
    ServerError,
    MalformedResponse,
    Refused,
    Unknown,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureCategory::RateLimited => "rate-limited",
            FailureCategory::Timeout => "timeout",
            FailureCategory::ServerError => "server-error",
            FailureCategory::MalformedResponse => "malformed-response",
            FailureCategory::Refused => "refused",
            FailureCategory::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}
