// Output formatting — terminal display of samples and pipeline runs.

pub mod terminal;

/// Shorten a document to `max_chars` characters for prompts and previews.
///
/// Counts chars rather than bytes, so multi-byte text is never split mid-character.
/// A trailing "..." marks that something was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
