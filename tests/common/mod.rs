//! Shared test helpers: a scriptable mock translation backend and corpus
//! fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use polyglot::error::TranslateFailure;
use polyglot::service::{TranslationBackend, TranslationReply, TranslationRequest};

/// Scriptable in-memory backend. By default every call succeeds with a
/// deterministic reply; per-key failure scripts are consumed front to back
/// before the default kicks in.
pub struct MockBackend {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    script: Mutex<HashMap<String, Vec<Result<TranslationReply, TranslateFailure>>>>,
    call_instants: Mutex<Vec<tokio::time::Instant>>,
    delay: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// A backend whose calls take `delay` to complete, for overlap tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            script: Mutex::new(HashMap::new()),
            call_instants: Mutex::new(Vec::new()),
            delay,
        }
    }

    fn key(slug: &str, language: &str) -> String {
        format!("{}:{}", slug, language)
    }

    /// Queues scripted results for one (slug, language) pair.
    pub fn script(
        &self,
        slug: &str,
        language: &str,
        results: Vec<Result<TranslationReply, TranslateFailure>>,
    ) {
        self.script
            .lock()
            .unwrap()
            .entry(Self::key(slug, language))
            .or_default()
            .extend(results);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Timestamps of every call, in arrival order.
    pub fn call_instants(&self) -> Vec<tokio::time::Instant> {
        self.call_instants.lock().unwrap().clone()
    }

    pub fn default_reply(request: &TranslationRequest) -> TranslationReply {
        TranslationReply {
            title: format!("[{}] {}", request.language.code, request.title),
            excerpt: format!("[{}] {}", request.language.code, request.excerpt),
            content_html: format!("<p>[{}] {}</p>", request.language.code, request.body),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationReply, TranslateFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_instants
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = {
            let mut script = self.script.lock().unwrap();
            let key = Self::key(&request.slug, request.language.code);
            match script.get_mut(&key) {
                Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                _ => None,
            }
        };

        match scripted {
            Some(result) => result,
            None => Ok(Self::default_reply(request)),
        }
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

/// Writes a post file with front matter into `dir` and returns its slug.
pub fn write_post(dir: &Path, filename: &str, title: &str, ready: bool, body: &str) -> String {
    let contents = format!(
        "---\ntitle: \"{}\"\nexcerpt: Excerpt of {}\nready: {}\n---\n{}\n",
        title, title, ready, body
    );
    fs::write(dir.join(filename), contents).unwrap();
    polyglot::corpus::post_slug(filename)
}

/// A three-post fixture corpus, all ready.
pub fn write_fixture_corpus(dir: &Path) -> Vec<String> {
    vec![
        write_post(dir, "2026-01-01-first-post.md", "First Post", true, "Body one."),
        write_post(dir, "2026-01-02-second-post.md", "Second Post", true, "Body two."),
        write_post(dir, "2026-01-03-third-post.md", "Third Post", true, "Body three."),
    ]
}
