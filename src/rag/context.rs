//! Context formatting for RAG prompts.

/// Join retrieved chunks for the `{{context}}` slot.
///
/// Returns `None` when there is nothing usable to show the model.
pub fn format_context_for_prompt<S: AsRef<str>>(chunks: &[S]) -> Option<String> {
    let parts: Vec<&str> = chunks
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
