//! Error types for the pdfsum library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PdfSumError`] is **fatal**: a run cannot start at all (input file
//!   missing, download failed, provider not configured, bad configuration).
//!   Returned as `Err(PdfSumError)` from the top-level `summarize_*`
//!   functions.
//!
//! * [`ExtractionError`]: the PDF bytes could not be turned into text.
//!   Recovered inside the pipeline: the controller collapses it into an
//!   empty string and the user sees the "no readable text" message.
//!
//! * [`GenerateError`]: a single LLM call failed. The summarizer decides
//!   from the variant whether to wait and retry or to give up; either way
//!   the user receives a final message rather than an `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfsum library.
#[derive(Debug, Error)]
pub enum PdfSumError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input string is empty or otherwise unusable.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider could not be created (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a PDF could not be turned into text.
///
/// The pipeline never propagates this: it is reported once through the
/// chat notification channel and then treated as "no readable text".
/// Library callers using [`crate::pipeline::extract::PdfTextExtractor::extract`]
/// directly get the tagged variant instead.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Reading the document from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine opened the bytes but could not parse them or a page.
    #[error("malformed PDF: {0}")]
    Parse(String),

    /// The bytes are not a PDF, or the PDF uses a feature we cannot read
    /// (e.g. encryption without a password).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The PDF engine itself could not be loaded.
    #[error("PDF engine unavailable: {0}\nSet PDFIUM_LIB_PATH or install pdfium system-wide.")]
    EngineUnavailable(String),
}

/// A failed call to the remote LLM.
///
/// Only [`GenerateError::QuotaExhausted`] is worth retrying; the other
/// two variants end the summarization attempt immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The provider signalled quota/rate-limit exhaustion.
    #[error("{0}")]
    QuotaExhausted(String),

    /// Any other error reported by the provider API.
    #[error("{0}")]
    Api(String),

    /// Anything that is not an API response: timeouts, empty output, panics.
    #[error("{0}")]
    Unexpected(String),
}

impl GenerateError {
    /// Whether waiting and calling again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerateError::QuotaExhausted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_not_configured_display() {
        let e = PdfSumError::ProviderNotConfigured {
            provider: "gemini".into(),
            hint: "Set GEMINI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gemini"), "got: {msg}");
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn download_timeout_display() {
        let e = PdfSumError::DownloadTimeout {
            url: "https://example.com/a.pdf".into(),
            secs: 5,
        };
        assert!(e.to_string().contains("5s"));
    }

    #[test]
    fn extraction_error_variants_display() {
        assert_eq!(
            ExtractionError::Parse("bad xref".into()).to_string(),
            "malformed PDF: bad xref"
        );
        assert!(ExtractionError::UnsupportedFormat("not a PDF".into())
            .to_string()
            .contains("not a PDF"));
        let io = ExtractionError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated",
        ));
        assert!(io.to_string().contains("truncated"));
    }

    #[test]
    fn generate_error_displays_bare_message() {
        let e = GenerateError::Api("400 Bad Request".into());
        assert_eq!(e.to_string(), "400 Bad Request");
    }

    #[test]
    fn only_quota_is_retryable() {
        assert!(GenerateError::QuotaExhausted("429".into()).is_retryable());
        assert!(!GenerateError::Api("500".into()).is_retryable());
        assert!(!GenerateError::Unexpected("timeout".into()).is_retryable());
    }
}
