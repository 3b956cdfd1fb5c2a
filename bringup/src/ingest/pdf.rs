//! PDF hint extraction
//!
//! Keeps only the lines of a document that look relevant to bring-up.

use std::path::Path;

pub const HINT_KEYWORDS: [&str; 6] = ["Voltage", "Oscillator", "Programming", "Functional", "BIT", "Test"];
pub const MAX_HINT_LINES: usize = 200;

/// Trimmed, non-empty lines mentioning any hint keyword (case-insensitive),
/// capped at [`MAX_HINT_LINES`].
pub fn filter_pdf_hints(text: &str) -> Vec<String> {
    let keywords: Vec<String> = HINT_KEYWORDS.iter().map(|k| k.to_lowercase()).collect();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| {
            let lower = l.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .take(MAX_HINT_LINES)
        .map(str::to_string)
        .collect()
}

/// Extract hint lines from a PDF. Missing or unreadable files yield nothing.
pub fn extract_pdf_hints(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }
    let owned = path.to_path_buf();
    match std::panic::catch_unwind(move || pdf_extract::extract_text(&owned)) {
        Ok(Ok(text)) => filter_pdf_hints(&text),
        Ok(Err(e)) => {
            tracing::warn!("PDF text extraction failed for {}: {}", path.display(), e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("PDF text extraction aborted for {}", path.display());
            Vec::new()
        }
    }
}
