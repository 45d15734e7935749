//! Remote translation service client.
//!
//! The pipeline depends only on the narrow `TranslationBackend` contract:
//! submit a structured request, receive a structured reply or a classified
//! `TranslateFailure`. The production implementation talks to an
//! OpenAI-style chat/completions endpoint and asks the model for strict
//! JSON output.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{defaults, LanguageSpec, PipelineConfig};
use crate::error::{PipelineResult, TranslateFailure};

/// One translation request: a document's translatable fields plus the
/// target language.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub language: &'static LanguageSpec,
}

/// Structured reply the service must produce. A response that parses but
/// omits any of these fields is a malformed-response failure, not a success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationReply {
    pub title: String,
    pub excerpt: String,
    pub content_html: String,
}

/// The seam between the scheduler and the remote service.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationReply, TranslateFailure>;

    /// Identifier recorded in cache entries produced through this backend.
    fn model_id(&self) -> &str;
}

const SYSTEM_PROMPT: &str = "You are a professional translator.\n\
CRITICAL: respond with valid JSON only, no markdown fences, no explanations.\n\
Output format: {\"title\": \"...\", \"excerpt\": \"...\", \"content_html\": \"...\"}\n\
Rules:\n\
- Preserve all markdown formatting, code blocks, and HTML tags exactly\n\
- Keep technical terms, proper nouns, and code in English\n\
- Translate naturally, not literally, keeping the author's voice\n\
- Keep URLs and image paths unchanged\n\
- Convert the markdown body to HTML for the content_html field";

fn build_user_prompt(request: &TranslationRequest) -> String {
    format!(
        "Translate this blog post to {} ({}) and return ONLY valid JSON:\n\n\
         TITLE: {}\n\nEXCERPT: {}\n\nCONTENT:\n{}\n\n\
         Remember: return ONLY valid JSON with \"title\", \"excerpt\", and \"content_html\" fields.",
        request.language.name, request.language.native, request.title, request.excerpt, request.body
    )
}

/// Truncates a payload excerpt for failure messages and the error log.
fn snippet(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}…", cut)
    }
}

/// Models wrapping output in ```json fences happens often enough to be
/// worth tolerating before parsing.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses and validates the model's JSON output into a reply.
fn parse_reply(content: &str) -> Result<TranslationReply, TranslateFailure> {
    let payload = strip_code_fence(content);
    let reply: TranslationReply = serde_json::from_str(payload).map_err(|e| {
        TranslateFailure::MalformedResponse(format!(
            "invalid translation JSON: {} (response: {})",
            e,
            snippet(content, 500)
        ))
    })?;

    if reply.title.is_empty() || reply.content_html.is_empty() {
        return Err(TranslateFailure::MalformedResponse(format!(
            "translation JSON has empty required fields (response: {})",
            snippet(content, 500)
        )));
    }

    Ok(reply)
}

// --- Wire types for the chat/completions endpoint ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat/completions client with strict JSON output.
pub struct LlmTranslator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmTranslator {
    /// Builds the client from pipeline configuration. Fails if no credential
    /// is configured; that is the only process-fatal precondition.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(defaults::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| crate::error::PipelineError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Maps one HTTP exchange onto the failure taxonomy. A single attempt;
    /// retries live in the backoff executor.
    async fn send_once(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationReply, TranslateFailure> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(request)}
            ],
            "max_tokens": defaults::MAX_TOKENS,
            "temperature": 0
        });

        let result = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(TranslateFailure::Timeout(format!(
                    "request exceeded {}s",
                    defaults::REQUEST_TIMEOUT.as_secs()
                )));
            }
            Err(e) => return Err(TranslateFailure::Unknown(e.to_string())),
        };

        let status = response.status();
        if status.as_u16() == 429 {
            let text = response.text().await.unwrap_or_default();
            return Err(TranslateFailure::RateLimited(snippet(&text, 200)));
        }
        // 499 is "client closed request": the connection dropped server-side,
        // same treatment as a 5xx.
        if status.is_server_error() || status.as_u16() == 499 {
            let text = response.text().await.unwrap_or_default();
            return Err(TranslateFailure::ServerError(format!(
                "status {}: {}",
                status,
                snippet(&text, 200)
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TranslateFailure::Unknown(format!(
                "unexpected status {}: {}",
                status,
                snippet(&text, 200)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            TranslateFailure::MalformedResponse(format!("invalid completion body: {}", e))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            TranslateFailure::MalformedResponse("completion has no choices".to_string())
        })?;

        match choice.finish_reason.as_deref() {
            Some("content_filter") => {
                return Err(TranslateFailure::Refused(
                    "service declined to translate this content".to_string(),
                ));
            }
            Some("length") => {
                return Err(TranslateFailure::MalformedResponse(
                    "response truncated at the completion token limit".to_string(),
                ));
            }
            _ => {}
        }

        let content = choice.message.content.unwrap_or_default();
        debug!(slug = %request.slug, language = request.language.code, bytes = content.len(), "received completion");
        parse_reply(&content)
    }
}

#[async_trait]
impl TranslationBackend for LlmTranslator {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationReply, TranslateFailure> {
        self.send_once(request).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
