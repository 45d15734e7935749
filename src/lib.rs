//! # Polyglot
//!
//! Batch-translates a markdown post corpus into multiple target languages
//! through a remote LLM service, with content-addressed caching, bounded
//! concurrency, and resilient retry.
//!
//! ## Module organization
//!
//! - `corpus` - document discovery and front matter parsing
//! - `fingerprint` - content digests used as cache-validity keys
//! - `cache` - persisted per-(language, post) translation records
//! - `service` - the remote translation backend contract and HTTP client
//! - `retry` - capped exponential backoff around single remote calls
//! - `scheduler` - task planning and bounded-concurrency execution
//! - `summary` - outcome aggregation, exit status, human-readable report
//! - `error_log` - append-only failure log for offline diagnosis

pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod error_log;
pub mod fingerprint;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod summary;

// Re-export commonly used items for convenience
pub use cache::{TranslationCache, TranslationRecord};
pub use config::{LanguageSpec, PipelineConfig, SUPPORTED_LANGUAGES};
pub use error::{FailureCategory, PipelineError, PipelineResult, TranslateFailure};
pub use retry::RetryPolicy;
pub use scheduler::{Scheduler, SchedulerOptions, TranslationTask};
pub use service::{LlmTranslator, TranslationBackend, TranslationReply, TranslationRequest};
pub use summary::{ExitStatus, JobSummary, TaskOutcome};
