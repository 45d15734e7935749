//! Polyglot CLI: batch-translate the post corpus.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use polyglot::cache::TranslationCache;
use polyglot::config::{self, defaults, LanguageSpec, PipelineConfig};
use polyglot::corpus;
use polyglot::error::{PipelineError, PipelineResult};
use polyglot::error_log::ErrorLog;
use polyglot::retry::RetryPolicy;
use polyglot::scheduler::{Scheduler, SchedulerOptions};
use polyglot::service::LlmTranslator;
use polyglot::summary::{ExitStatus, JobSummary};

#[derive(Parser, Debug)]
#[command(
    name = "polyglot",
    about = "Translate blog posts to multiple languages via an LLM service",
    version
)]
struct Cli {
    /// Force retranslation even if a fresh cached translation exists
    #[arg(long)]
    force: bool,

    /// Translate only a specific post (filename or slug)
    #[arg(long)]
    post: Option<String>,

    /// Translate to a specific language only (e.g. "es")
    #[arg(long)]
    lang: Option<String>,

    /// Show what would be translated without making API calls
    #[arg(long)]
    dry_run: bool,

    /// Number of parallel translation requests
    #[arg(short, long, default_value_t = defaults::CONCURRENCY)]
    concurrency: usize,

    /// Maximum number of attempts per task, first try included
    #[arg(long, default_value_t = defaults::MAX_ATTEMPTS)]
    max_retries: u32,

    /// Initial retry delay in seconds
    #[arg(long, default_value_t = defaults::INITIAL_RETRY_DELAY.as_secs())]
    retry_delay: u64,

    /// Cool-down in seconds a concurrency slot is held after each task
    #[arg(long, default_value_t = defaults::COOLDOWN.as_secs())]
    cooldown: u64,

    /// Directory containing the markdown posts
    #[arg(long, default_value = "_posts")]
    posts_dir: PathBuf,

    /// Directory the translation records are written to
    #[arg(long, default_value = "assets/translations")]
    output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn target_languages(filter: Option<&str>) -> PipelineResult<Vec<&'static LanguageSpec>> {
    match filter {
        Some(code) => {
            let language = config::language(code)
                .ok_or_else(|| PipelineError::UnsupportedLanguage(code.to_string()))?;
            Ok(vec![language])
        }
        None => Ok(config::SUPPORTED_LANGUAGES.iter().collect()),
    }
}

async fn run(cli: Cli) -> PipelineResult<ExitStatus> {
    let pipeline_config = PipelineConfig::from_env(
        cli.posts_dir.clone(),
        cli.output_dir.clone(),
        PathBuf::from("translation_errors.log"),
    );

    let languages = target_languages(cli.lang.as_deref())?;
    let (documents, corpus_stats) =
        corpus::load_corpus(&pipeline_config.posts_dir, cli.post.as_deref())?;

    let options = SchedulerOptions {
        force: cli.force,
        concurrency: cli.concurrency,
        retry: RetryPolicy {
            max_attempts: cli.max_retries,
            initial_delay: Duration::from_secs(cli.retry_delay),
            max_delay: defaults::MAX_RETRY_DELAY,
        },
        cooldown: Duration::from_secs(cli.cooldown),
    };

    let cache = Arc::new(TranslationCache::new(&pipeline_config.translations_dir));
    let error_log = Arc::new(ErrorLog::new(&pipeline_config.error_log_path));

    // Dry runs never need a credential, so the backend is built only for
    // live execution; planning below shares the same scheduler either way.
    if cli.dry_run {
        let planner = Scheduler::new(
            Arc::new(NullBackend),
            Arc::clone(&cache),
            Arc::clone(&error_log),
            options,
        );
        let (tasks, stats) = planner.plan(&documents, &languages, corpus_stats.parse_errors);
        println!(
            "Dry run - would translate {} post(s) to {} language(s) (cached: {})",
            stats.to_translate,
            languages.len(),
            stats.cached
        );
        for task in &tasks {
            println!("  {} ({})", task.slug, task.language.code);
        }
        return Ok(ExitStatus::AllSatisfied);
    }

    let backend = Arc::new(LlmTranslator::new(&pipeline_config)?);
    let scheduler = Scheduler::new(backend, cache, error_log, options);
    let (tasks, stats) = scheduler.plan(&documents, &languages, corpus_stats.parse_errors);

    if tasks.is_empty() {
        println!("All translations are up to date ({} cached)", stats.cached);
        return Ok(ExitStatus::AllSatisfied);
    }

    println!(
        "Translating {} post(s) to {} language(s)",
        stats.to_translate,
        languages.len()
    );
    println!(
        "Cached: {} | New: {} | Total: {}",
        stats.cached, stats.to_translate, stats.total_candidates
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling pending work");
            interrupt.cancel();
        }
    });

    let started = Instant::now();
    let outcomes = scheduler.run(tasks, cancel).await;
    let summary = JobSummary::from_outcomes(stats, &outcomes, started.elapsed());

    println!("{}", summary.render(&pipeline_config.error_log_path));
    info!(
        translated = summary.translated,
        failed = summary.failed,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "run finished"
    );

    Ok(summary.status)
}

/// Placeholder backend for dry runs; planning never calls it.
struct NullBackend;

#[async_trait::async_trait]
impl polyglot::service::TranslationBackend for NullBackend {
    async fn translate(
        &self,
        _request: &polyglot::service::TranslationRequest,
    ) -> Result<polyglot::service::TranslationReply, polyglot::error::TranslateFailure> {
        Err(polyglot::error::TranslateFailure::Unknown(
            "dry-run backend cannot translate".to_string(),
        ))
    }

    fn model_id(&self) -> &str {
        "dry-run"
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "polyglot=debug" } else { "polyglot=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
