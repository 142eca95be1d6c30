//! Result types for one pipeline run.

use crate::messages;
use crate::pipeline::controller::PipelineState;
use crate::pipeline::summarize::SummaryOutcome;
use serde::{Deserialize, Serialize};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// No readable text; the summarizer was never called.
    ExtractionFailed,
    /// The text exceeded the character limit; the summarizer was never called.
    TooLong { chars: usize, limit: usize },
    /// The summarizer ran; check the outcome's status for success.
    Summarized(SummaryOutcome),
}

impl PipelineOutcome {
    /// The final bot message for this outcome.
    pub fn final_message(&self) -> &str {
        match self {
            PipelineOutcome::ExtractionFailed => messages::NO_TEXT_FOUND,
            PipelineOutcome::TooLong { .. } => messages::TOO_LONG,
            PipelineOutcome::Summarized(s) => &s.text,
        }
    }

    /// The generated summary, if the model produced one.
    pub fn summary(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Summarized(s) if s.is_generated() => Some(&s.text),
            _ => None,
        }
    }
}

/// Timing and usage numbers for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub document_bytes: usize,
    /// Characters of extracted text (0 when extraction failed).
    pub extracted_chars: usize,
    /// LLM calls made (0 when the summarizer was not invoked).
    pub attempts: u32,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub extract_duration_ms: u64,
    pub summarize_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    /// State-machine path, starting at `Idle` and ending in a terminal state.
    pub states: Vec<PipelineState>,
    pub stats: RunStats,
}

impl PipelineReport {
    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn final_message(&self) -> &str {
        self.outcome.final_message()
    }

    /// Whether the user got a real summary.
    pub fn is_success(&self) -> bool {
        self.outcome.summary().is_some()
    }
}
