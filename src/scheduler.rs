//! Task scheduler: plans the (document × language) cross product against
//! the cache, then executes the remainder under a bounded concurrency slot
//! pool with per-slot cool-down pacing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{TranslationCache, TranslationRecord};
use crate::config::{defaults, LanguageSpec};
use crate::corpus::Document;
use crate::error::{FailureCategory, TranslateFailure};
use crate::error_log::ErrorLog;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::retry::{self, RetryPolicy};
use crate::service::{TranslationBackend, TranslationRequest};
use crate::summary::{PlanStats, TaskOutcome};

/// Operator-tunable knobs, fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Skip the cache check entirely and schedule every pair.
    pub force: bool,
    /// Maximum simultaneously in-flight tasks.
    pub concurrency: usize,
    pub retry: RetryPolicy,
    /// Pacing delay a slot is held for after each task, bounding the
    /// steady-state request rate independent of the concurrency bound.
    pub cooldown: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            force: false,
            concurrency: defaults::CONCURRENCY,
            retry: RetryPolicy::default(),
            cooldown: defaults::COOLDOWN,
        }
    }
}

/// One (document, target-language) unit of work. Ephemeral; exists only
/// within one scheduler run.
#[derive(Debug, Clone)]
pub struct TranslationTask {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub language: &'static LanguageSpec,
    /// Document fingerprint at planning time; written into the cache record.
    pub fingerprint: Fingerprint,
}

impl TranslationTask {
    fn request(&self) -> TranslationRequest {
        TranslationRequest {
            slug: self.slug.clone(),
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            body: self.body.clone(),
            language: self.language,
        }
    }
}

pub struct Scheduler<B> {
    backend: Arc<B>,
    cache: Arc<TranslationCache>,
    error_log: Arc<ErrorLog>,
    options: SchedulerOptions,
}

impl<B: TranslationBackend + 'static> Scheduler<B> {
    pub fn new(
        backend: Arc<B>,
        cache: Arc<TranslationCache>,
        error_log: Arc<ErrorLog>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            backend,
            cache,
            error_log,
            options,
        }
    }

    /// Enumerates ready documents × target languages, pruning pairs whose
    /// cached record is fresh for the document's current fingerprint.
    /// Performs no remote calls; dry-run mode stops after this.
    pub fn plan(
        &self,
        documents: &[Document],
        languages: &[&'static LanguageSpec],
        parse_errors: usize,
    ) -> (Vec<TranslationTask>, PlanStats) {
        let mut stats = PlanStats {
            total_documents: documents.len(),
            parse_errors,
            ..Default::default()
        };
        for language in languages {
            stats.by_language.entry(language.code.to_string()).or_default();
        }

        let mut tasks = Vec::new();

        for document in documents {
            if !document.ready {
                debug!(slug = %document.slug, "skipping post marked not ready");
                stats.skipped_not_ready += 1;
                continue;
            }

            let current = fingerprint(document.raw.as_bytes());

            for language in languages {
                stats.total_candidates += 1;
                let breakdown = stats.by_language.entry(language.code.to_string()).or_default();

                if !self.options.force {
                    if let Some(record) = self.cache.lookup(language.code, &document.slug) {
                        if self.cache.is_fresh(&record, &current) {
                            stats.cached += 1;
                            breakdown.cached += 1;
                            continue;
                        }
                        debug!(
                            slug = %document.slug,
                            language = language.code,
                            "cached translation is stale, rescheduling"
                        );
                    }
                }

                stats.to_translate += 1;
                breakdown.to_translate += 1;
                tasks.push(TranslationTask {
                    slug: document.slug.clone(),
                    title: document.title.clone(),
                    excerpt: document.excerpt.clone(),
                    body: document.body.clone(),
                    language,
                    fingerprint: current.clone(),
                });
            }
        }

        info!(
            candidates = stats.total_candidates,
            cached = stats.cached,
            scheduled = stats.to_translate,
            "planning complete"
        );

        (tasks, stats)
    }

    /// Executes the task list. Order among runnable tasks is not guaranteed;
    /// any task may dispatch as soon as a slot frees. Every task yields
    /// exactly one outcome, including under cancellation.
    pub async fn run(
        &self,
        tasks: Vec<TranslationTask>,
        cancel: CancellationToken,
    ) -> Vec<TaskOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut join_set = JoinSet::new();
        let mut keys: HashMap<tokio::task::Id, (String, String)> = HashMap::new();

        for task in tasks {
            let key = (task.slug.clone(), task.language.code.to_string());
            let backend = Arc::clone(&self.backend);
            let cache = Arc::clone(&self.cache);
            let error_log = Arc::clone(&self.error_log);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let retry_policy = self.options.retry;
            let cooldown = self.options.cooldown;

            let handle = join_set.spawn(async move {
                run_task(task, backend, cache, error_log, semaphore, retry_policy, cooldown, cancel)
                    .await
            });
            keys.insert(handle.id(), key);
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, outcome)) => outcomes.push(outcome),
                Err(join_error) => {
                    // A panicked task still owes the aggregator an outcome.
                    error!(error = %join_error, "translation task aborted");
                    let (slug, language) = keys
                        .get(&join_error.id())
                        .cloned()
                        .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));
                    outcomes.push(TaskOutcome::Failure {
                        slug,
                        language,
                        category: FailureCategory::Unknown,
                        message: format!("task aborted: {}", join_error),
                    });
                }
            }
        }

        outcomes
    }
}

fn cancelled_outcome(slug: &str, language: &str) -> TaskOutcome {
    let failure = TranslateFailure::cancelled();
    TaskOutcome::Failure {
        slug: slug.to_string(),
        language: language.to_string(),
        category: failure.category(),
        message: failure.message().to_string(),
    }
}

/// One task end to end: slot wait, retried remote call, cache write-through,
/// cool-down. Strictly sequential within the task.
#[allow(clippy::too_many_arguments)]
async fn run_task<B: TranslationBackend>(
    task: TranslationTask,
    backend: Arc<B>,
    cache: Arc<TranslationCache>,
    error_log: Arc<ErrorLog>,
    semaphore: Arc<Semaphore>,
    retry_policy: RetryPolicy,
    cooldown: Duration,
    cancel: CancellationToken,
) -> TaskOutcome {
    let slug = task.slug.clone();
    let language = task.language.code.to_string();

    let permit = tokio::select! {
        permit = Arc::clone(&semaphore).acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return cancelled_outcome(&slug, &language),
        },
        _ = cancel.cancelled() => return cancelled_outcome(&slug, &language),
    };

    debug!(slug = %slug, language = %language, "dispatching translation");

    let request = task.request();
    let result = retry::execute(
        &retry_policy,
        &cancel,
        || backend.translate(&request),
        |attempt, failure| {
            error_log.record(&slug, &language, failure.category(), failure.message());
            debug!(slug = %slug, language = %language, attempt, error = %failure, "attempt failed");
        },
    )
    .await;

    let outcome = match result {
        Ok(reply) => {
            let record = TranslationRecord::new(reply, task.fingerprint.clone(), backend.model_id());
            match cache.store(&language, &slug, &record) {
                Ok(()) => {
                    info!(slug = %slug, language = %language, "translation complete");
                    TaskOutcome::Success {
                        slug: slug.clone(),
                        language: language.clone(),
                    }
                }
                Err(e) => {
                    let message = format!("cache write failed: {}", e);
                    error_log.record(&slug, &language, FailureCategory::Unknown, &message);
                    TaskOutcome::Failure {
                        slug: slug.clone(),
                        language: language.clone(),
                        category: FailureCategory::Unknown,
                        message,
                    }
                }
            }
        }
        Err(failure) => {
            warn!(slug = %slug, language = %language, error = %failure, "translation failed");
            TaskOutcome::Failure {
                slug: slug.clone(),
                language: language.clone(),
                category: failure.category(),
                message: failure.message().to_string(),
            }
        }
    };

    // Pacing is a property of slot release, not of the task: the permit is
    // held through the cool-down so steady-state request rate stays bounded
    // even when tasks finish instantly.
    tokio::select! {
        _ = sleep(cooldown) => {}
        _ = cancel.cancelled() => {}
    }
    drop(permit);

    outcome
}
