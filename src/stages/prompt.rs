// Prompt building and response parsing shared by the default stages.
//
// LLM answers to "one item per line" prompts come back with list markers,
// numbering, bold markup and the occasional duplicate. These helpers turn
// them into clean item lists.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::output::truncate_chars;

/// Longest document excerpt included in a prompt, in characters.
pub const MAX_DOCUMENT_CHARS: usize = 600;

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^(?:[-*•+]+|\d+[.):]|[a-zA-Z][.)])\s+").expect("list marker regex is valid")
    })
}

/// Strip list markers, markdown emphasis and wrapping quotes from one line.
pub fn clean_item(line: &str) -> String {
    let line = line.trim();
    let line = list_marker().replace(line, "");
    line.trim()
        .trim_matches(|c| c == '*' || c == '_' || c == '`')
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Parse a one-item-per-line answer into distinct, non-empty items.
///
/// Duplicates are detected case-insensitively; the first spelling wins.
pub fn parse_list(response: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    response
        .lines()
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// First non-empty cleaned line of an answer.
pub fn first_item(response: &str) -> Option<String> {
    response
        .lines()
        .map(clean_item)
        .find(|item| !item.is_empty())
}

/// Split a `name: description` line. Returns None without a separator.
pub fn split_labelled(line: &str) -> Option<(String, String)> {
    let (name, description) = line.split_once(':')?;
    let name = clean_item(name);
    let description = description.trim().to_string();
    if name.is_empty() || description.is_empty() {
        return None;
    }
    Some((name, description))
}

/// Render documents as a numbered list, each truncated to a prompt-sized excerpt.
pub fn numbered_documents(documents: &[String]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let flat = doc.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{}. {}", i + 1, truncate_chars(&flat, MAX_DOCUMENT_CHARS))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render items as a bulleted list.
pub fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_item_markers() {
        assert_eq!(clean_item("- Billing"), "Billing");
        assert_eq!(clean_item("  3. Shipping delays"), "Shipping delays");
        assert_eq!(clean_item("* **Refunds**"), "Refunds");
        assert_eq!(clean_item("\"Account access\""), "Account access");
        assert_eq!(clean_item("2) Returns"), "Returns");
    }

    #[test]
    fn test_clean_item_keeps_plain_text() {
        assert_eq!(clean_item("Product quality"), "Product quality");
        // A leading number that isn't a list marker stays
        assert_eq!(clean_item("24-hour support"), "24-hour support");
    }

    #[test]
    fn test_parse_list_dedupes_case_insensitively() {
        let items = parse_list("1. Billing\n2. billing\n\n3. Shipping\n");
        assert_eq!(items, vec!["Billing".to_string(), "Shipping".to_string()]);
    }

    #[test]
    fn test_parse_list_empty_response() {
        assert!(parse_list("  \n\n").is_empty());
    }

    #[test]
    fn test_first_item_skips_blank_lines() {
        assert_eq!(first_item("\n\n- Refunds\nOther"), Some("Refunds".to_string()));
        assert_eq!(first_item(""), None);
    }

    #[test]
    fn test_split_labelled() {
        assert_eq!(
            split_labelled("- Billing: Questions about invoices: and charges"),
            Some((
                "Billing".to_string(),
                "Questions about invoices: and charges".to_string()
            ))
        );
        assert_eq!(split_labelled("No separator here"), None);
        assert_eq!(split_labelled("Billing:   "), None);
    }

    #[test]
    fn test_numbered_documents_flattens_and_truncates() {
        let long = "x".repeat(MAX_DOCUMENT_CHARS + 10);
        let docs = vec!["first\n  line".to_string(), long];
        let rendered = numbered_documents(&docs);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "1. first line");
        assert!(lines[1].starts_with("2. xxx"));
        assert!(lines[1].ends_with("..."));
    }
}
