//! LLM interaction: wrap the document in the prompt and call the provider.
//!
//! ## Retry Strategy
//!
//! Only quota exhaustion is retried. The wait is a fixed delay (30 s by
//! default) with no jitter and no growth, up to `max_attempts` calls in
//! total, and the user is warned before each wait. Any other API error or
//! unexpected failure stops the loop at once. Every failure path yields
//! the same fallback text, so the user always gets a final message.
//!
//! The wait is an async timer raced against a [`CancelSignal`], and so is
//! the LLM call itself.

use crate::cancel::CancelSignal;
use crate::config::{RetryPolicy, SummarizerConfig, API_KEY_ENV, DEFAULT_PROVIDER};
use crate::error::{GenerateError, PdfSumError};
use crate::messages;
use crate::prompts::summary_prompt;
use crate::ui::{ChatUi, NoticeLevel};
use async_trait::async_trait;
use edgequake_llm::{
    ChatMessage, CompletionOptions, GeminiProvider, LLMProvider, ProviderFactory,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Text produced by one successful LLM call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Generation {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Generation {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// The remote LLM boundary: one prompt in, one text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerateError>;
}

#[async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerateError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerateError> {
        (**self).generate(prompt).await
    }
}

/// Matches provider error text that signals quota or rate-limit exhaustion.
static QUOTA_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b429\b|resource[ _]?exhausted|quota|rate[ _-]?limit|too many requests")
        .expect("quota pattern is valid")
});

/// Classify a provider error message into a [`GenerateError`].
pub fn classify_provider_error(message: &str) -> GenerateError {
    if QUOTA_SIGNAL.is_match(message) {
        GenerateError::QuotaExhausted(message.to_string())
    } else {
        GenerateError::Api(message.to_string())
    }
}

/// [`TextGenerator`] backed by an `edgequake_llm` provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SummarizerConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }

    /// Build the generator from `config`, creating the provider if needed.
    ///
    /// A pre-built `config.provider` is used as-is. Otherwise an API key
    /// must be configured and the named provider is created through
    /// [`ProviderFactory`].
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, PdfSumError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation, GenerateError> {
        let messages = vec![ChatMessage::user(prompt)];
        let call = self.provider.chat(&messages, Some(&self.options));

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify_provider_error(&format!("{}", e))),
            Err(_) => {
                return Err(GenerateError::Unexpected(format!(
                    "no response after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        if response.content.trim().is_empty() {
            return Err(GenerateError::Unexpected(
                "model returned an empty response".into(),
            ));
        }

        Ok(Generation {
            text: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// How a summarization attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// The model produced a summary.
    Generated,
    /// Every attempt hit quota exhaustion.
    RetriesExhausted,
    /// A non-quota API error stopped the loop.
    AbortedApiError,
    /// A non-API failure stopped the loop.
    AbortedUnexpected,
    /// The caller cancelled the run.
    Cancelled,
}

/// The single string shown to the user, plus how it came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutcome {
    /// The summary, or the fixed fallback/cancel message.
    pub text: String,
    pub status: SummaryStatus,
    /// LLM calls started, including one interrupted by cancellation.
    pub attempts: u32,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

impl SummaryOutcome {
    pub fn is_generated(&self) -> bool {
        self.status == SummaryStatus::Generated
    }
}

/// Summarizes document text with bounded retry on quota exhaustion.
pub struct Summarizer<G> {
    generator: G,
    retry: RetryPolicy,
    prompt_prefix: String,
}

impl<G: TextGenerator> Summarizer<G> {
    /// Summarizer with the default prompt and retry policy.
    pub fn new(generator: G) -> Self {
        let defaults = SummarizerConfig::default();
        Self {
            generator,
            retry: defaults.retry,
            prompt_prefix: defaults.prompt_prefix,
        }
    }

    /// Summarizer using the prompt prefix and retry policy from `config`.
    pub fn with_config(generator: G, config: &SummarizerConfig) -> Self {
        Self {
            generator,
            retry: config.retry,
            prompt_prefix: config.prompt_prefix.clone(),
        }
    }

    /// Summarize `text`. Never fails: errors become the fallback text.
    pub async fn summarize(&self, text: &str, ui: &dyn ChatUi) -> SummaryOutcome {
        self.summarize_with_cancel(text, ui, &CancelSignal::never()).await
    }

    /// Like [`summarize`](Self::summarize), but gives up as soon as `cancel`
    /// fires, whether the summarizer is waiting on the LLM or on the timer.
    pub async fn summarize_with_cancel(
        &self,
        text: &str,
        ui: &dyn ChatUi,
        cancel: &CancelSignal,
    ) -> SummaryOutcome {
        let start = Instant::now();
        let prompt = summary_prompt(&self.prompt_prefix, text);
        let max = self.retry.max_attempts;

        let mut attempts = 0;
        let status = loop {
            if attempts >= max {
                break SummaryStatus::RetriesExhausted;
            }
            attempts += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SummaryStatus::Cancelled,
                r = self.generator.generate(&prompt) => r,
            };

            match result {
                Ok(generation) => {
                    info!(
                        "Summary generated on attempt {}/{}: {} tokens in, {} out",
                        attempts, max, generation.input_tokens, generation.output_tokens
                    );
                    return SummaryOutcome {
                        text: generation.text,
                        status: SummaryStatus::Generated,
                        attempts,
                        input_tokens: generation.input_tokens,
                        output_tokens: generation.output_tokens,
                        duration_ms: start.elapsed().as_millis() as u64,
                    };
                }
                Err(err) if err.is_retryable() => {
                    warn!("Attempt {}/{}: quota exhausted: {}", attempts, max, err);
                    if !self.retry.has_attempt_after(attempts) {
                        break SummaryStatus::RetriesExhausted;
                    }
                    ui.notify(
                        NoticeLevel::Warning,
                        &messages::quota_retry(self.retry.delay, attempts, max),
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break SummaryStatus::Cancelled,
                        _ = tokio::time::sleep(self.retry.delay) => {}
                    }
                }
                Err(GenerateError::Api(detail)) => {
                    warn!("Attempt {}/{}: API error: {}", attempts, max, detail);
                    ui.notify(NoticeLevel::Error, &messages::api_error(&detail));
                    break SummaryStatus::AbortedApiError;
                }
                Err(err) => {
                    warn!("Attempt {}/{}: unexpected error: {}", attempts, max, err);
                    ui.notify(NoticeLevel::Error, &messages::unexpected_error(&err));
                    break SummaryStatus::AbortedUnexpected;
                }
            }
        };

        let text = match status {
            SummaryStatus::Cancelled => messages::SUMMARY_CANCELLED,
            _ => messages::SUMMARY_FALLBACK,
        };
        debug!("Summarization ended with {:?} after {} attempts", status, attempts);

        SummaryOutcome {
            text: text.to_string(),
            status,
            attempts,
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &SummarizerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is. Useful in
///    tests or when the caller wraps the provider in middleware.
/// 2. **Gemini**: built directly from `config.api_key` and `config.model`;
///    the process environment is not consulted again.
/// 3. **Any other provider name**: [`ProviderFactory::create_llm_provider`],
///    which reads that provider's own credentials from the environment.
fn resolve_provider(config: &SummarizerConfig) -> Result<Arc<dyn LLMProvider>, PdfSumError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if config.provider_name.eq_ignore_ascii_case(DEFAULT_PROVIDER) {
        let key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PdfSumError::ProviderNotConfigured {
                provider: config.provider_name.clone(),
                hint: format!(
                    "No API key configured.\nSet {} in the environment or in a .env file.",
                    API_KEY_ENV
                ),
            })?;
        debug!("Using Gemini provider with model {}", config.model);
        return Ok(Arc::new(GeminiProvider::new(key).with_model(&config.model)));
    }

    ProviderFactory::create_llm_provider(&config.provider_name, &config.model).map_err(|e| {
        PdfSumError::ProviderNotConfigured {
            provider: config.provider_name.clone(),
            hint: format!("{e}"),
        }
    })
}
