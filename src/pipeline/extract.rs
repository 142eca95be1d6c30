//! PDF text extraction: raw bytes → one plain-text string.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is
//! synchronous and CPU-bound. `tokio::task::spawn_blocking` moves the work
//! onto the blocking pool so runtime workers keep serving the spinner,
//! Ctrl-C and timers while a large document is parsed.
//!
//! ## Two modes
//!
//! [`PdfTextExtractor::extract`] returns a tagged [`ExtractionError`].
//! [`PdfTextExtractor::extract_or_empty`] is what the pipeline uses: any
//! error is reported once through the chat and collapses to `""`, which the
//! controller treats as "no readable text".

use crate::error::ExtractionError;
use crate::messages;
use crate::ui::{ChatUi, NoticeLevel};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of per-page plain text for a PDF byte stream.
///
/// Implementations are called on the blocking pool and may block.
pub trait PdfBackend: Send + Sync + 'static {
    /// Text of every page, in document order.
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// [`PdfBackend`] backed by the pdfium engine.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    lib_path: Option<PathBuf>,
    password: Option<String>,
}

impl PdfiumBackend {
    /// Bind to the system pdfium library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the pdfium shared library at `path` instead of the system one.
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.lib_path = Some(path.into());
        self
    }

    /// Password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn bind(&self) -> Result<Pdfium, ExtractionError> {
        let bindings = match &self.lib_path {
            Some(path) => Pdfium::bind_to_library(path.as_path()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ExtractionError::EngineUnavailable(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PdfBackend for PdfiumBackend {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, self.password.as_deref())
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    ExtractionError::UnsupportedFormat(if self.password.is_some() {
                        "wrong password for encrypted PDF".to_string()
                    } else {
                        "PDF is encrypted and requires a password".to_string()
                    })
                } else {
                    ExtractionError::Parse(err_str)
                }
            })?;

        let pages = document.pages();
        debug!("PDF loaded: {} pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| {
                ExtractionError::Parse(format!("page {}: {:?}", idx + 1, e))
            })?;
            texts.push(text.all());
        }
        Ok(texts)
    }
}

/// Extracts the full plain text of a PDF.
#[derive(Debug)]
pub struct PdfTextExtractor<B = PdfiumBackend> {
    backend: Arc<B>,
}

impl<B> Clone for PdfTextExtractor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: PdfBackend> PdfTextExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Extract the text of every page, concatenated in page order with no
    /// separator, then trimmed.
    pub async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        check_magic(bytes)?;

        let backend = Arc::clone(&self.backend);
        let owned = bytes.to_vec();
        let pages = tokio::task::spawn_blocking(move || backend.page_texts(&owned))
            .await
            .map_err(|e| ExtractionError::Parse(format!("extraction task panicked: {e}")))??;

        let text = join_pages(&pages);
        info!(
            "Extracted {} chars from {} pages",
            text.chars().count(),
            pages.len()
        );
        Ok(text)
    }

    /// Read `path` and extract its text.
    pub async fn extract_file(&self, path: impl AsRef<Path>) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.extract(&bytes).await
    }

    /// Extract, collapsing any failure to `""`.
    ///
    /// On failure exactly one error notice `Error reading PDF: {error}` is
    /// sent to `ui`.
    pub async fn extract_or_empty(&self, bytes: &[u8], ui: &dyn ChatUi) -> String {
        match self.extract(bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                ui.notify(NoticeLevel::Error, &messages::read_error(&e));
                String::new()
            }
        }
    }
}

impl PdfTextExtractor<PdfiumBackend> {
    /// Extractor using pdfium with the library path and password from `config`.
    pub fn from_config(config: &crate::config::SummarizerConfig) -> Self {
        let mut backend = PdfiumBackend::new();
        if let Some(ref path) = config.pdfium_lib_path {
            backend = backend.with_library(path);
        }
        if let Some(ref pwd) = config.password {
            backend = backend.with_password(pwd);
        }
        Self::new(backend)
    }
}

/// Concatenate page texts in order and trim the result.
pub fn join_pages(pages: &[String]) -> String {
    pages.concat().trim().to_string()
}

/// Reject anything that does not start with the `%PDF` magic.
fn check_magic(bytes: &[u8]) -> Result<(), ExtractionError> {
    match bytes.get(..4) {
        Some(magic) if magic == b"%PDF" => Ok(()),
        Some(magic) => Err(ExtractionError::UnsupportedFormat(format!(
            "not a PDF (first bytes: {:?})",
            magic
        ))),
        None => Err(ExtractionError::UnsupportedFormat(format!(
            "not a PDF ({} bytes)",
            bytes.len()
        ))),
    }
}
