//! Process-wide configuration: supported languages, credentials, paths,
//! and tuning defaults.
//!
//! Everything here is loaded once at startup and passed into the scheduler
//! as an immutable value; nothing reads the environment after construction.

use std::env;
use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};

/// Tuning defaults, matching the service's documented throughput limits.
pub mod defaults {
    use std::time::Duration;

    /// Maximum simultaneously in-flight translation requests.
    pub const CONCURRENCY: usize = 5;
    /// Total attempts per task, first try included.
    pub const MAX_ATTEMPTS: u32 = 5;
    /// First backoff sleep after a retryable failure.
    pub const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(5);
    /// Backoff ceiling regardless of attempt count.
    pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);
    /// Pacing delay a concurrency slot is held for after each task.
    pub const COOLDOWN: Duration = Duration::from_secs(120);
    /// Per-request HTTP timeout; long posts take minutes to translate.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
    /// Completion budget handed to the service per request.
    pub const MAX_TOKENS: u32 = 50_000;
}

/// One supported target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    /// ISO 639-1 code, also the cache directory name.
    pub code: &'static str,
    /// English name, used in the translation prompt.
    pub name: &'static str,
    /// Native name, used in the translation prompt.
    pub native: &'static str,
}

/// The fixed set of target languages.
pub const SUPPORTED_LANGUAGES: [LanguageSpec; 8] = [
    LanguageSpec { code: "es", name: "Spanish", native: "Español" },
    LanguageSpec { code: "zh", name: "Chinese", native: "中文" },
    LanguageSpec { code: "hi", name: "Hindi", native: "हिन्दी" },
    LanguageSpec { code: "pt", name: "Portuguese", native: "Português" },
    LanguageSpec { code: "fr", name: "French", native: "Français" },
    LanguageSpec { code: "de", name: "German", native: "Deutsch" },
    LanguageSpec { code: "ja", name: "Japanese", native: "日本語" },
    LanguageSpec { code: "ko", name: "Korean", native: "한국어" },
];

/// Looks up a language by code.
pub fn language(code: &str) -> Option<&'static LanguageSpec> {
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Immutable pipeline configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// API credential; `None` is only acceptable for dry runs.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub posts_dir: PathBuf,
    pub translations_dir: PathBuf,
    pub error_log_path: PathBuf,
}

impl PipelineConfig {
    /// Reads credentials and endpoint overrides from the environment.
    /// `dotenv` is expected to have been loaded by the caller already.
    pub fn from_env(
        posts_dir: PathBuf,
        translations_dir: PathBuf,
        error_log_path: PathBuf,
    ) -> Self {
        Self {
            api_key: env::var("TRANSLATOR_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("TRANSLATOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com".to_string()),
            model: env::var("TRANSLATOR_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string()),
            posts_dir,
            translations_dir,
            error_log_path,
        }
    }

    /// Returns the credential, or the process-fatal error for live runs.
    pub fn require_api_key(&self) -> PipelineResult<&str> {
        self.api_key.as_deref().ok_or(PipelineError::MissingApiKey)
    }
}
