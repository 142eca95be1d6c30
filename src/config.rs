//! Configuration types for PDF summarization.
//!
//! All run behaviour is controlled through [`SummarizerConfig`], built via
//! its [`SummarizerConfigBuilder`] or loaded with
//! [`SummarizerConfig::from_env`]. The config is passed explicitly into the
//! summarizer and extractor at construction; there is no process-wide
//! client or model state.

use crate::error::PdfSumError;
use crate::prompts::DEFAULT_PROMPT_PREFIX;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the LLM API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default provider name passed to `edgequake_llm::ProviderFactory`.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default model: a lightweight, fast model that hits quota limits less often.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Extracted text longer than this (in characters) is refused.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;

/// Configuration for a PDF summarization run.
///
/// # Example
/// ```rust
/// use pdfsum::SummarizerConfig;
///
/// let config = SummarizerConfig::builder()
///     .api_key("test-key")
///     .max_text_chars(50_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.retry.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct SummarizerConfig {
    /// API key for the LLM provider. Required unless `provider` is set.
    pub api_key: Option<String>,

    /// LLM provider name understood by `edgequake_llm::ProviderFactory`.
    /// Default: `"gemini"`.
    pub provider_name: String,

    /// Model identifier. Default: `"gemini-1.5-flash-latest"`.
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Text placed in front of the document in the prompt.
    /// Default: `"Summarize the following document:\n\n"`.
    pub prompt_prefix: String,

    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate. `None` leaves the provider default.
    pub max_tokens: Option<usize>,

    /// Retry behaviour on quota exhaustion.
    pub retry: RetryPolicy,

    /// Extracted text longer than this many characters is refused without
    /// calling the API. Default: 100 000.
    pub max_text_chars: usize,

    /// Per-LLM-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Path to a pdfium shared library. `None` binds the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            prompt_prefix: DEFAULT_PROMPT_PREFIX.to_string(),
            temperature: None,
            max_tokens: None,
            retry: RetryPolicy::default(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            pdfium_lib_path: None,
            password: None,
        }
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .field("max_text_chars", &self.max_text_chars)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl SummarizerConfig {
    /// Create a new builder for `SummarizerConfig`.
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or any parent) is loaded
    /// first if present; variables already set in the environment win.
    pub fn from_env() -> Result<Self, PdfSumError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but loads the given env file
    /// instead of searching for `.env`.
    pub fn from_env_file(path: impl AsRef<std::path::Path>) -> Result<Self, PdfSumError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| {
            PdfSumError::InvalidConfig(format!("cannot load env file {}: {e}", path.display()))
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, PdfSumError> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(key) = get(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(provider) = get("PDFSUM_PROVIDER") {
            builder = builder.provider_name(provider);
        }
        if let Some(model) = get("PDFSUM_MODEL") {
            builder = builder.model(model);
        }
        if let Some(raw) = get("PDFSUM_MAX_CHARS") {
            let n = raw.trim().parse::<usize>().map_err(|e| {
                PdfSumError::InvalidConfig(format!("PDFSUM_MAX_CHARS={raw:?}: {e}"))
            })?;
            builder = builder.max_text_chars(n);
        }
        if let Some(path) = get("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(path);
        }
        builder.build()
    }
}

/// Builder for [`SummarizerConfig`].
#[derive(Debug)]
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prompt_prefix = prefix.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.retry.max_attempts = n;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry.delay = delay;
        self
    }

    pub fn max_text_chars(mut self, n: usize) -> Self {
        self.config.max_text_chars = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizerConfig, PdfSumError> {
        let c = &self.config;
        if c.retry.max_attempts == 0 {
            return Err(PdfSumError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.retry.delay.as_secs() == 0 || c.retry.delay.subsec_nanos() != 0 {
            return Err(PdfSumError::InvalidConfig(format!(
                "retry delay must be a whole number of seconds ≥ 1, got {:?}",
                c.retry.delay
            )));
        }
        if c.max_text_chars == 0 {
            return Err(PdfSumError::InvalidConfig(
                "max_text_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfSumError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(PdfSumError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

/// Fixed-delay retry on quota exhaustion.
///
/// No jitter and no growth: every wait is exactly `delay`. The summarizer
/// waits only between attempts, so the worst case blocks for
/// `(max_attempts - 1) * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Default: 3.
    pub max_attempts: u32,
    /// Wait before each retry. Default: 30 s.
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempt` (1-indexed) failed.
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = SummarizerConfig::default();
        assert_eq!(c.provider_name, "gemini");
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_text_chars, 100_000);
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.retry.delay, Duration::from_secs(30));
        assert_eq!(c.prompt_prefix, "Summarize the following document:\n\n");
    }

    #[test]
    fn builder_rejects_zero_attempts() {
        let err = SummarizerConfig::builder().max_attempts(0).build().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn builder_rejects_sub_second_retry_delay() {
        for delay in [Duration::ZERO, Duration::from_millis(500), Duration::from_millis(1500)] {
            let err = SummarizerConfig::builder()
                .retry_delay(delay)
                .build()
                .unwrap_err();
            assert!(err.to_string().contains("retry delay"), "{delay:?}: {err}");
        }
        assert!(SummarizerConfig::builder()
            .retry_delay(Duration::from_secs(1))
            .build()
            .is_ok());
    }

    #[test]
    fn builder_rejects_zero_char_limit() {
        assert!(SummarizerConfig::builder().max_text_chars(0).build().is_err());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = SummarizerConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, Some(2.0));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = SummarizerConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn lookup_reads_known_variables() {
        let c = SummarizerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PDFSUM_MODEL", "gemini-2.0-flash"),
            ("PDFSUM_MAX_CHARS", "500"),
            ("PDFIUM_LIB_PATH", "/opt/pdfium/libpdfium.so"),
        ]))
        .unwrap();
        assert_eq!(c.api_key.as_deref(), Some("k"));
        assert_eq!(c.model, "gemini-2.0-flash");
        assert_eq!(c.max_text_chars, 500);
        assert_eq!(
            c.pdfium_lib_path,
            Some(PathBuf::from("/opt/pdfium/libpdfium.so"))
        );
    }

    #[test]
    fn lookup_ignores_blank_values() {
        let c = SummarizerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(c.api_key.is_none());
    }

    #[test]
    fn lookup_rejects_bad_char_limit() {
        let err = SummarizerConfig::from_lookup(lookup(&[("PDFSUM_MAX_CHARS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("PDFSUM_MAX_CHARS"));
    }

    #[test]
    fn retry_policy_attempt_bounds() {
        let p = RetryPolicy::default();
        assert!(p.has_attempt_after(1));
        assert!(p.has_attempt_after(2));
        assert!(!p.has_attempt_after(3));
    }

    #[test]
    fn retry_policy_serialises_delay_as_seconds() {
        let json = serde_json::to_string(&RetryPolicy::default()).unwrap();
        assert_eq!(json, r#"{"max_attempts":3,"delay":30}"#);
    }
}
