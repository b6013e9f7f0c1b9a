//! Text normalization for hand-authored content.
//!
//! Source files are written in an editor with hard-wrapped lines. The app
//! renders one line per paragraph, so single newlines inside a paragraph
//! become spaces while blank lines (`\n\n`) keep separating paragraphs:
//!
//! ```text
//! "Kościół z\nXIII wieku.\n\nOtwarty\ncodziennie.\n"
//!   → "Kościół z XIII wieku.\n\nOtwarty codziennie."
//! ```
//!
//! Both functions are pure and deterministic, which keeps repeated builds of
//! unchanged sources byte-identical.

use crate::text::Text;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Join hard-wrapped lines within each paragraph and drop trailing spaces.
///
/// Idempotent: `normalize_content(&normalize_content(x)) == normalize_content(x)`.
pub fn normalize_content(text: &str) -> String {
    let joined = text
        .split(PARAGRAPH_BREAK)
        .map(|paragraph| paragraph.replace('\n', " "))
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK);
    joined.trim_end_matches(' ').to_string()
}

/// Split a text block into its header (first paragraph, verbatim) and body
/// (remaining paragraphs, normalized).
pub fn split_header_body(text: &str) -> (String, String) {
    match text.split_once(PARAGRAPH_BREAK) {
        Some((header, body)) => (header.to_string(), normalize_content(body)),
        None => (text.to_string(), String::new()),
    }
}

/// [`normalize_content`] applied to every language.
pub fn normalize_text(text: &Text) -> Text {
    text.map(normalize_content)
}

/// [`split_header_body`] applied to every language.
pub fn split_text(text: &Text) -> (Text, Text) {
    let mut headers = Text::new();
    let mut bodies = Text::new();
    for (language, value) in text {
        let (header, body) = split_header_body(value);
        headers.insert(language.as_str(), header);
        bodies.insert(language.as_str(), body);
    }
    (headers, bodies)
}
