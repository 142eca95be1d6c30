//! # pdfsum
//!
//! Summarize PDF documents with a remote large language model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (path / URL / bytes)
//!  │
//!  ├─ 1. Upload     read the file or download the URL into memory
//!  ├─ 2. Extract    page text via pdfium (spawn_blocking), concatenated + trimmed
//!  ├─ 3. Bound      refuse text over 100 000 characters, no API call
//!  ├─ 4. Summarize  one prompt to the LLM, fixed 30 s retry on quota errors (3 attempts)
//!  └─ 5. Reply      summary or a fixed apology, always as a final chat message
//! ```
//!
//! Every stage reports to a [`ChatUi`](ui::ChatUi); the library never prints.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsum::{summarize_file, SummarizerConfig, Transcript};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY (and .env if present)
//!     let config = SummarizerConfig::from_env()?;
//!     let chat = Transcript::new();
//!     let report = summarize_file("document.pdf", &config, &chat).await?;
//!     println!("{}", report.final_message());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Builds the `pdfsum` binary (clap, anyhow, tracing-subscriber, indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfsum = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod config;
pub mod error;
pub mod messages;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod run;
pub mod ui;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use config::{RetryPolicy, SummarizerConfig, SummarizerConfigBuilder};
pub use error::{ExtractionError, GenerateError, PdfSumError};
pub use output::{PipelineOutcome, PipelineReport, RunStats};
pub use pipeline::controller::{PipelineController, PipelineState};
pub use pipeline::extract::{PdfBackend, PdfTextExtractor, PdfiumBackend};
pub use pipeline::input::UploadedDocument;
pub use pipeline::summarize::{
    Generation, ProviderGenerator, Summarizer, SummaryOutcome, SummaryStatus, TextGenerator,
};
pub use run::{
    controller_from_config, summarize_bytes, summarize_file, summarize_file_sync,
    summarize_file_with_cancel,
};
pub use ui::{ChatUi, NoopChat, NoticeLevel, Role, Transcript};
