//! Top-level entry points: one document in, one [`PipelineReport`] out.
//!
//! These wire the production collaborators together (pdfium for extraction,
//! an `edgequake_llm` provider for generation) from a [`SummarizerConfig`].
//! Use [`crate::pipeline::controller::PipelineController`] directly to plug
//! in other backends.

use crate::cancel::CancelSignal;
use crate::config::SummarizerConfig;
use crate::error::PdfSumError;
use crate::output::PipelineReport;
use crate::pipeline::controller::PipelineController;
use crate::pipeline::extract::{PdfTextExtractor, PdfiumBackend};
use crate::pipeline::input::{self, UploadedDocument};
use crate::pipeline::summarize::{ProviderGenerator, Summarizer};
use crate::ui::ChatUi;
use tracing::info;

/// Build the production controller for `config`.
///
/// # Errors
/// [`PdfSumError::ProviderNotConfigured`] when no API key (or pre-built
/// provider) is available.
pub fn controller_from_config(
    config: &SummarizerConfig,
) -> Result<PipelineController<PdfiumBackend, ProviderGenerator>, PdfSumError> {
    let generator = ProviderGenerator::from_config(config)?;
    Ok(PipelineController::new(
        PdfTextExtractor::from_config(config),
        Summarizer::with_config(generator, config),
        config.max_text_chars,
    ))
}

/// Summarize a PDF file or URL.
///
/// # Returns
/// `Ok(PipelineReport)` whenever the document could be obtained, including
/// runs that ended in "no readable text", "too long" or the fallback
/// message. Check [`PipelineReport::is_success`].
///
/// # Errors
/// Only for problems before the pipeline starts: missing file, failed
/// download, provider not configured.
pub async fn summarize_file(
    input_str: impl AsRef<str>,
    config: &SummarizerConfig,
    ui: &dyn ChatUi,
) -> Result<PipelineReport, PdfSumError> {
    summarize_file_with_cancel(input_str, config, ui, &CancelSignal::never()).await
}

/// [`summarize_file`] with a cancellation signal.
pub async fn summarize_file_with_cancel(
    input_str: impl AsRef<str>,
    config: &SummarizerConfig,
    ui: &dyn ChatUi,
    cancel: &CancelSignal,
) -> Result<PipelineReport, PdfSumError> {
    let input_str = input_str.as_ref();
    info!("Starting summarization: {}", input_str);

    // Provider first: a missing key should fail before any download.
    let controller = controller_from_config(config)?;
    let document = input::resolve_input(input_str, config.download_timeout_secs).await?;
    Ok(controller.run_with_cancel(document, ui, cancel).await)
}

/// Summarize PDF bytes already in memory.
pub async fn summarize_bytes(
    name: impl Into<String>,
    bytes: impl Into<Vec<u8>>,
    config: &SummarizerConfig,
    ui: &dyn ChatUi,
) -> Result<PipelineReport, PdfSumError> {
    let controller = controller_from_config(config)?;
    let document = UploadedDocument::new(name, bytes);
    Ok(controller.run(document, ui).await)
}

/// Synchronous wrapper around [`summarize_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_file_sync(
    input_str: impl AsRef<str>,
    config: &SummarizerConfig,
    ui: &dyn ChatUi,
) -> Result<PipelineReport, PdfSumError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfSumError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize_file(input_str, config, ui))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NoopChat;

    #[tokio::test]
    async fn missing_key_fails_before_reading_input() {
        let config = SummarizerConfig::default();
        let err = summarize_file("/definitely/not/a/real/file.pdf", &config, &NoopChat)
            .await
            .unwrap_err();
        assert!(
            matches!(err, PdfSumError::ProviderNotConfigured { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn sync_wrapper_propagates_errors() {
        let config = SummarizerConfig::default();
        assert!(summarize_file_sync("x.pdf", &config, &NoopChat).is_err());
    }
}
