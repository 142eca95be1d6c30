//! User-visible chat text.
//!
//! These strings are part of the observable behaviour: tests and any
//! front-end matching on them depend on the exact wording.

use std::fmt::Display;
use std::time::Duration;

/// Shown when the PDF yielded no text (or could not be read at all).
pub const NO_TEXT_FOUND: &str = "I couldn't find any readable text in the PDF.";

/// Shown when the extracted text exceeds the character limit.
pub const TOO_LONG: &str = "The PDF is too long for me to summarize at once. Try splitting it.";

/// Returned as the summary when no summary could be produced.
pub const SUMMARY_FALLBACK: &str =
    "Unable to summarize due to repeated errors. Please try again later.";

/// Returned as the summary when the run was cancelled.
pub const SUMMARY_CANCELLED: &str = "Summarization cancelled.";

/// Acknowledgement when a document arrives.
pub const UPLOADED: &str = "PDF uploaded. Let me read it for you...";

/// Spinner label while extracting.
pub const EXTRACTING: &str = "Extracting content...";

/// Spinner label while waiting on the LLM.
pub const SUMMARIZING: &str = "Summarizing your document...";

/// Bot message preceding the summary.
pub const SUMMARY_HEADER: &str = "Here's the summary of your document:";

/// `Error reading PDF: {error}`
pub fn read_error(error: impl Display) -> String {
    format!("Error reading PDF: {error}")
}

/// `Quota exceeded. Retrying in 30 seconds... (1/3)` with the default policy.
pub fn quota_retry(delay: Duration, attempt: u32, max_attempts: u32) -> String {
    format!(
        "Quota exceeded. Retrying in {} seconds... ({attempt}/{max_attempts})",
        delay.as_secs()
    )
}

/// `API error: {error}`
pub fn api_error(error: impl Display) -> String {
    format!("API error: {error}")
}

/// `Unexpected error: {error}`
pub fn unexpected_error(error: impl Display) -> String {
    format!("Unexpected error: {error}")
}
