//! The per-upload state machine.
//!
//! ```text
//! Idle → Uploaded → Extracting ─┬─▶ ExtractionFailed                       (terminal)
//!                               └─▶ Extracted ─┬─▶ TooLong                 (terminal)
//!                                              └─▶ LengthChecked → Summarizing → Done
//! ```
//!
//! Linear, no backward transitions. Every run starts a fresh [`PipelineRun`]
//! and every terminal state leaves a final bot message in the chat.

use crate::cancel::CancelSignal;
use crate::messages;
use crate::output::{PipelineOutcome, PipelineReport, RunStats};
use crate::pipeline::extract::{PdfBackend, PdfTextExtractor};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::summarize::{Summarizer, TextGenerator};
use crate::ui::{ChatUi, Role};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Where one upload is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Uploaded,
    Extracting,
    Extracted,
    ExtractionFailed,
    LengthChecked,
    TooLong,
    Summarizing,
    Done,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineState::ExtractionFailed | PipelineState::TooLong | PipelineState::Done
        )
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Uploaded)
                | (Uploaded, Extracting)
                | (Extracting, Extracted)
                | (Extracting, ExtractionFailed)
                | (Extracted, LengthChecked)
                | (Extracted, TooLong)
                | (LengthChecked, Summarizing)
                | (Summarizing, Done)
        )
    }
}

/// The path one upload took through the state machine.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    states: Vec<PipelineState>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self {
            states: vec![PipelineState::Idle],
        }
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        *self.states.last().unwrap_or(&PipelineState::Idle)
    }

    /// Move to `next`. Illegal transitions are a programming error.
    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal transition {:?} → {:?}",
            self.state(),
            next
        );
        debug!("Pipeline: {:?} → {:?}", self.state(), next);
        self.states.push(next);
    }

    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    pub fn into_states(self) -> Vec<PipelineState> {
        self.states
    }
}

/// Orchestrates extract → length check → summarize for one upload at a time.
pub struct PipelineController<B, G> {
    extractor: PdfTextExtractor<B>,
    summarizer: Summarizer<G>,
    max_text_chars: usize,
}

impl<B: PdfBackend, G: TextGenerator> PipelineController<B, G> {
    pub fn new(
        extractor: PdfTextExtractor<B>,
        summarizer: Summarizer<G>,
        max_text_chars: usize,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            max_text_chars,
        }
    }

    /// Run one upload through the pipeline. Never fails.
    pub async fn run(&self, document: UploadedDocument, ui: &dyn ChatUi) -> PipelineReport {
        self.run_with_cancel(document, ui, &CancelSignal::never()).await
    }

    /// Like [`run`](Self::run), with a cancellation signal for the
    /// summarization step.
    pub async fn run_with_cancel(
        &self,
        document: UploadedDocument,
        ui: &dyn ChatUi,
        cancel: &CancelSignal,
    ) -> PipelineReport {
        let start = Instant::now();
        let mut run = PipelineRun::new();
        let mut stats = RunStats {
            document_bytes: document.len(),
            ..Default::default()
        };
        info!("Processing upload '{}' ({} bytes)", document.name, document.len());

        run.advance(PipelineState::Uploaded);
        ui.render(messages::UPLOADED, Role::Bot);

        // ── Extract ──────────────────────────────────────────────────────
        run.advance(PipelineState::Extracting);
        let extract_start = Instant::now();
        ui.activity_started(messages::EXTRACTING);
        let text = self.extractor.extract_or_empty(&document.bytes, ui).await;
        ui.activity_finished();
        stats.extract_duration_ms = extract_start.elapsed().as_millis() as u64;
        drop(document);

        if text.is_empty() {
            run.advance(PipelineState::ExtractionFailed);
            ui.render(messages::NO_TEXT_FOUND, Role::Bot);
            return finish(run, PipelineOutcome::ExtractionFailed, stats, start);
        }
        run.advance(PipelineState::Extracted);

        // ── Bound input size ─────────────────────────────────────────────
        let chars = text.chars().count();
        stats.extracted_chars = chars;
        if chars > self.max_text_chars {
            info!("Refusing {} chars (limit {})", chars, self.max_text_chars);
            run.advance(PipelineState::TooLong);
            ui.render(messages::TOO_LONG, Role::Bot);
            return finish(
                run,
                PipelineOutcome::TooLong {
                    chars,
                    limit: self.max_text_chars,
                },
                stats,
                start,
            );
        }
        run.advance(PipelineState::LengthChecked);

        // ── Summarize ────────────────────────────────────────────────────
        run.advance(PipelineState::Summarizing);
        ui.activity_started(messages::SUMMARIZING);
        let summary = self
            .summarizer
            .summarize_with_cancel(&text, ui, cancel)
            .await;
        ui.activity_finished();

        stats.attempts = summary.attempts;
        stats.input_tokens = summary.input_tokens;
        stats.output_tokens = summary.output_tokens;
        stats.summarize_duration_ms = summary.duration_ms;

        run.advance(PipelineState::Done);
        ui.render(messages::SUMMARY_HEADER, Role::Bot);
        ui.render(&summary.text, Role::Bot);

        finish(run, PipelineOutcome::Summarized(summary), stats, start)
    }
}

fn finish(
    run: PipelineRun,
    outcome: PipelineOutcome,
    mut stats: RunStats,
    start: Instant,
) -> PipelineReport {
    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    let states = run.into_states();
    info!(
        "Pipeline finished in {:?} after {}ms",
        states.last(),
        stats.total_duration_ms
    );
    PipelineReport {
        outcome,
        states,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(PipelineState::ExtractionFailed.is_terminal());
        assert!(PipelineState::TooLong.is_terminal());
        assert!(PipelineState::Done.is_terminal());
        assert!(!PipelineState::Summarizing.is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
    }

    #[test]
    fn no_backward_transitions() {
        assert!(PipelineState::Idle.can_advance_to(PipelineState::Uploaded));
        assert!(!PipelineState::Done.can_advance_to(PipelineState::Idle));
        assert!(!PipelineState::Summarizing.can_advance_to(PipelineState::Extracting));
        assert!(!PipelineState::Extracting.can_advance_to(PipelineState::Summarizing));
        assert!(!PipelineState::Extracted.can_advance_to(PipelineState::Summarizing));
    }

    #[test]
    fn run_starts_idle_and_records_path() {
        let mut run = PipelineRun::new();
        assert_eq!(run.state(), PipelineState::Idle);
        run.advance(PipelineState::Uploaded);
        run.advance(PipelineState::Extracting);
        run.advance(PipelineState::ExtractionFailed);
        assert_eq!(
            run.states(),
            &[
                PipelineState::Idle,
                PipelineState::Uploaded,
                PipelineState::Extracting,
                PipelineState::ExtractionFailed
            ]
        );
        assert!(run.state().is_terminal());
    }

    #[test]
    #[should_panic(expected = "illegal transition")]
    #[cfg(debug_assertions)]
    fn illegal_transition_panics_in_debug() {
        let mut run = PipelineRun::new();
        run.advance(PipelineState::Done);
    }
}
