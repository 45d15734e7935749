//! Append-only failure log for offline diagnosis.
//!
//! Every terminal and retried failure gets one delimited block with a
//! timestamp, the task key, the classification, and a truncated message.
//! Logging failures never crash the run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::error::FailureCategory;

const MESSAGE_LIMIT: usize = 500;

/// Durable error log. The mutex keeps blocks from interleaving when
/// concurrent tasks fail at the same time.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ErrorLog {
    /// The file is created lazily on the first record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends one failure block.
    pub fn record(&self, slug: &str, language: &str, category: FailureCategory, message: &str) {
        let truncated: String = message.chars().take(MESSAGE_LIMIT).collect();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                writeln!(file, "{}", "=".repeat(80))?;
                writeln!(file, "Timestamp: {}", timestamp)?;
                writeln!(file, "Post: {}", slug)?;
                writeln!(file, "Language: {}", language)?;
                writeln!(file, "Category: {}", category)?;
                writeln!(file, "Message: {}", truncated)?;
                Ok(())
            });

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to write error log");
        }
    }
}
