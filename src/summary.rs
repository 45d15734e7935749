//! Result aggregation: per-task outcomes folded into a job summary and an
//! exit status.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::FailureCategory;

/// Tagged result of one task execution. Every scheduled task yields exactly
/// one of these, even under cancellation.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Success {
        slug: String,
        language: String,
    },
    Failure {
        slug: String,
        language: String,
        category: FailureCategory,
        message: String,
    },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }
}

/// Overall job exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    AllSatisfied,
    PartialFailure,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::AllSatisfied => 0,
            ExitStatus::PartialFailure => 1,
        }
    }
}

/// Per-language cached/scheduled split.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageBreakdown {
    pub cached: usize,
    pub to_translate: usize,
}

/// Counters from the planning pass, before any remote call.
#[derive(Debug, Clone, Default)]
pub struct PlanStats {
    pub total_documents: usize,
    /// Ready documents × target languages.
    pub total_candidates: usize,
    pub cached: usize,
    pub to_translate: usize,
    pub skipped_not_ready: usize,
    pub parse_errors: usize,
    pub by_language: BTreeMap<String, LanguageBreakdown>,
}

/// Enough context per failure for post-run diagnosis without retaining full
/// response payloads.
#[derive(Debug, Clone)]
pub struct FailureDetail {
    pub slug: String,
    pub language: String,
    pub category: FailureCategory,
    pub message: String,
}

/// Aggregate counts for one run. Computed once at the end; never mutated.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub plan: PlanStats,
    pub translated: usize,
    pub failed: usize,
    pub failed_by_category: BTreeMap<FailureCategory, usize>,
    pub failures: Vec<FailureDetail>,
    pub elapsed: Duration,
    pub status: ExitStatus,
}

impl JobSummary {
    /// Folds the full outcome stream (order not significant) into the
    /// summary. Exit status is `PartialFailure` iff any outcome failed.
    pub fn from_outcomes(plan: PlanStats, outcomes: &[TaskOutcome], elapsed: Duration) -> Self {
        let mut translated = 0;
        let mut failed_by_category: BTreeMap<FailureCategory, usize> = BTreeMap::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                TaskOutcome::Success { .. } => translated += 1,
                TaskOutcome::Failure {
                    slug,
                    language,
                    category,
                    message,
                } => {
                    *failed_by_category.entry(*category).or_insert(0) += 1;
                    failures.push(FailureDetail {
                        slug: slug.clone(),
                        language: language.clone(),
                        category: *category,
                        message: message.clone(),
                    });
                }
            }
        }

        let failed = failures.len();
        let status = if failed > 0 {
            ExitStatus::PartialFailure
        } else {
            ExitStatus::AllSatisfied
        };

        Self {
            plan,
            translated,
            failed,
            failed_by_category,
            failures,
            elapsed,
            status,
        }
    }

    /// Human-readable summary block, always printed at the end of a run.
    pub fn render(&self, error_log: &Path) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        out.push_str(&format!("{}\nSummary:\n", rule));
        out.push_str(&format!("  Total posts: {}\n", self.plan.total_documents));

        let cached_pct = if self.plan.total_candidates > 0 {
            self.plan.cached as f64 / self.plan.total_candidates as f64 * 100.0
        } else {
            0.0
        };
        out.push_str(&format!("  Cached: {} ({:.1}%)\n", self.plan.cached, cached_pct));
        out.push_str(&format!("  Newly translated: {}\n", self.translated));
        if self.failed > 0 {
            out.push_str(&format!("  Failed: {}\n", self.failed));
            for (category, count) in &self.failed_by_category {
                out.push_str(&format!("    {}: {}\n", category, count));
            }
        }
        if self.plan.skipped_not_ready > 0 {
            out.push_str(&format!("  Skipped (not ready): {}\n", self.plan.skipped_not_ready));
        }
        if self.plan.parse_errors > 0 {
            out.push_str(&format!("  Parse errors: {}\n", self.plan.parse_errors));
        }
        out.push_str(&format!("  Time taken: {:.1}s\n", self.elapsed.as_secs_f64()));

        if !self.plan.by_language.is_empty() {
            out.push_str("  By language:\n");
            for (code, breakdown) in &self.plan.by_language {
                out.push_str(&format!(
                    "    {}: {} cached, {} scheduled\n",
                    code, breakdown.cached, breakdown.to_translate
                ));
            }
        }
        out.push_str(&rule);
        out.push('\n');

        if self.failed > 0 {
            out.push_str(&format!("\n{} translation(s) failed:\n", self.failed));
            for failure in self.failures.iter().take(5) {
                let message: String = failure.message.chars().take(80).collect();
                out.push_str(&format!(
                    "  [{}] {}: {} ({})\n",
                    failure.language, failure.slug, message, failure.category
                ));
            }
            if self.failures.len() > 5 {
                out.push_str(&format!("  ... and {} more\n", self.failures.len() - 5));
            }
            out.push_str(&format!("Check {} for details\n", error_log.display()));
        }

        out
    }
}
