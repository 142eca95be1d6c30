//! Pipeline stages for PDF summarization.
//!
//! Each submodule implements exactly one step; the controller strings them
//! together for one upload.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (length check) ──▶ summarize
//! (bytes)   (pdfium)     (controller)       (LLM + retry)
//! ```
//!
//! 1. [`input`] reads a local file or download a URL into memory
//! 2. [`extract`] pulls page text via pdfium on the blocking pool
//! 3. [`summarize`] prompts the LLM; it is the only stage with network I/O
//! 4. [`controller`] runs the per-upload state machine and chat messages

pub mod controller;
pub mod extract;
pub mod input;
pub mod summarize;
