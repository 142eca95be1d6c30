//! Prompt text sent to the LLM.
//!
//! Callers can override the prefix via
//! [`crate::config::SummarizerConfig::prompt_prefix`]; the constant here is
//! used only when no override is provided.

/// Default text placed in front of the document.
pub const DEFAULT_PROMPT_PREFIX: &str = "Summarize the following document:\n\n";

/// Build the full prompt for `text`.
///
/// The document is appended verbatim: no escaping, truncation, or
/// whitespace normalisation.
pub fn summary_prompt(prefix: &str, text: &str) -> String {
    let mut prompt = String::with_capacity(prefix.len() + text.len());
    prompt.push_str(prefix);
    prompt.push_str(text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_wraps_text() {
        assert_eq!(
            summary_prompt(DEFAULT_PROMPT_PREFIX, "Hello"),
            "Summarize the following document:\n\nHello"
        );
    }

    #[test]
    fn text_is_not_modified() {
        let text = "  leading\n\ttabs and trailing  ";
        assert!(summary_prompt(DEFAULT_PROMPT_PREFIX, text).ends_with(text));
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(summary_prompt("TL;DR: ", "doc"), "TL;DR: doc");
    }
}
