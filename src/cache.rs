//! Content-addressed translation cache.
//!
//! One JSON record per `(language, slug)` pair at
//! `<root>/<lang>/<slug>.json`. Freshness is purely fingerprint equality;
//! there is no time-based expiry. Reads fail open: a missing, unreadable,
//! or corrupt record is a miss and triggers retranslation rather than ever
//! serving stale data. Writes go through a temp file in the destination
//! directory and an atomic rename, so concurrent writes to distinct keys
//! need no locking.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::fingerprint::Fingerprint;
use crate::service::TranslationReply;

/// Persisted result of one successful translation. Overwritten wholesale on
/// retranslation; latest wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub title: String,
    pub excerpt: String,
    pub content_html: String,
    /// Fingerprint of the source document at translation time.
    pub source_hash: Fingerprint,
    /// Identifier of the model/service that produced this record.
    pub model: String,
    /// RFC 3339 creation timestamp.
    pub generated_at: String,
}

impl TranslationRecord {
    pub fn new(reply: TranslationReply, source_hash: Fingerprint, model: &str) -> Self {
        Self {
            title: reply.title,
            excerpt: reply.excerpt,
            content_html: reply.content_html,
            source_hash,
            model: model.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// On-disk cache, sole owner of the records under its root.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    root: PathBuf,
}

impl TranslationCache {
    /// Storage is created lazily on first `store`; `new` never touches disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entry_path(&self, language: &str, slug: &str) -> PathBuf {
        self.root.join(language).join(format!("{}.json", slug))
    }

    /// Looks up the cached record for `(language, slug)`. Never fails:
    /// anything unreadable is treated as absent.
    pub fn lookup(&self, language: &str, slug: &str) -> Option<TranslationRecord> {
        let path = self.entry_path(language, slug);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring corrupt cache record");
                None
            }
        }
    }

    /// A record is fresh iff its stored fingerprint matches the document's
    /// current fingerprint. This is the sole staleness check.
    pub fn is_fresh(&self, record: &TranslationRecord, current: &Fingerprint) -> bool {
        record.source_hash == *current
    }

    /// Persists a record atomically: serialized to a temp file in the
    /// destination directory, then renamed into place.
    pub fn store(
        &self,
        language: &str,
        slug: &str,
        record: &TranslationRecord,
    ) -> PipelineResult<()> {
        let dir = self.root.join(language);
        fs::create_dir_all(&dir)
            .map_err(|e| PipelineError::Cache(format!("create {}: {}", dir.display(), e)))?;

        let json = serde_json::to_string_pretty(record)?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| PipelineError::Cache(format!("temp file in {}: {}", dir.display(), e)))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| PipelineError::Cache(format!("write record: {}", e)))?;

        let path = self.entry_path(language, slug);
        tmp.persist(&path)
            .map_err(|e| PipelineError::Cache(format!("persist {}: {}", path.display(), e)))?;

        debug!(language, slug, "stored translation record");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
