//! Chat-transcript trait through which the pipeline talks to the user.
//!
//! The pipeline never prints. It reports everything through an injected
//! [`ChatUi`]: bot messages for the transcript, warning/error notices, and
//! start/stop events around long operations (for a spinner). Host
//! front-ends decide how those look; the library ships a no-op
//! implementation and an in-memory [`Transcript`].
//!
//! # Example
//!
//! ```rust
//! use pdfsum::ui::{ChatUi, Role, Transcript};
//!
//! let transcript = Transcript::new();
//! transcript.render("Hello!", Role::Bot);
//! assert_eq!(transcript.bot_messages(), vec!["Hello!".to_string()]);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Who a transcript message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bot,
    User,
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Called by the pipeline as it progresses through one document.
///
/// Implementations must be `Send + Sync`: extraction runs on the blocking
/// pool and the summarizer may be driven from any runtime worker. All
/// methods default to no-ops so callers only override what they care about.
pub trait ChatUi: Send + Sync {
    /// Append a message to the visible transcript, in call order.
    fn render(&self, message: &str, role: Role) {
        let _ = (message, role);
    }

    /// Show a transient warning or error (not part of the transcript).
    fn notify(&self, level: NoticeLevel, message: &str) {
        let _ = (level, message);
    }

    /// A long operation started; show a spinner with `label`.
    fn activity_started(&self, label: &str) {
        let _ = label;
    }

    /// The current long operation finished.
    fn activity_finished(&self) {}
}

/// A no-op implementation for callers that don't need chat output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChat;

impl ChatUi for NoopChat {}

/// One recorded chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    Message { role: Role, text: String },
    Notice { level: NoticeLevel, text: String },
    ActivityStarted { label: String },
    ActivityFinished,
}

/// In-memory [`ChatUi`] that records every event in order.
///
/// Used by tests to assert on exact output, and by the CLI's `--json` mode
/// to embed the conversation in the report.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.lock().clone()
    }

    /// Text of every message rendered with [`Role::Bot`], in order.
    pub fn bot_messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                TranscriptEntry::Message {
                    role: Role::Bot,
                    text,
                } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text of every notice at `level`, in order.
    pub fn notices(&self, level: NoticeLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                TranscriptEntry::Notice { level: l, text } if *l == level => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// The last bot message, if any.
    pub fn last_bot_message(&self) -> Option<String> {
        self.bot_messages().pop()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TranscriptEntry>> {
        // A panic while holding the lock leaves the Vec intact; keep recording.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn push(&self, entry: TranscriptEntry) {
        self.lock().push(entry);
    }
}

impl ChatUi for Transcript {
    fn render(&self, message: &str, role: Role) {
        self.push(TranscriptEntry::Message {
            role,
            text: message.to_string(),
        });
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.push(TranscriptEntry::Notice {
            level,
            text: message.to_string(),
        });
    }

    fn activity_started(&self, label: &str) {
        self.push(TranscriptEntry::ActivityStarted {
            label: label.to_string(),
        });
    }

    fn activity_finished(&self) {
        self.push(TranscriptEntry::ActivityFinished);
    }
}

/// Fan out every event to two sinks, e.g. a terminal and a [`Transcript`].
pub struct Tee<'a> {
    first: &'a dyn ChatUi,
    second: &'a dyn ChatUi,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a dyn ChatUi, second: &'a dyn ChatUi) -> Self {
        Self { first, second }
    }
}

impl ChatUi for Tee<'_> {
    fn render(&self, message: &str, role: Role) {
        self.first.render(message, role);
        self.second.render(message, role);
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.first.notify(level, message);
        self.second.notify(level, message);
    }

    fn activity_started(&self, label: &str) {
        self.first.activity_started(label);
        self.second.activity_started(label);
    }

    fn activity_finished(&self) {
        self.first.activity_finished();
        self.second.activity_finished();
    }
}
