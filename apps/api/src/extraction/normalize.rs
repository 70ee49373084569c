//! Text normalization helpers shared by every extractor.

/// Lower-cases text for case-insensitive comparison.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Normalizes line endings to `\n` and strips trailing whitespace from every line.
pub fn normalize_lines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the text has no non-whitespace content.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Trims whitespace plus the separator glyphs that surround fields on a
/// resume header line (`|`, `,`, `-`, `@`, `•`, `:`).
pub fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '|' | ',' | '-' | '–' | '—' | '@' | '•' | ':' | ';' | '·')
    })
}

/// Returns the first `max_chars` characters of `text` on a char boundary.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Removes duplicates case-insensitively, keeping the first spelling seen.
pub fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(fold(item)))
        .collect()
}
