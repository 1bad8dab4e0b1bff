//! Cleanup of text decoded from PDF content streams

use once_cell::sync::Lazy;
use regex::Regex;

/// Three or more line breaks, i.e. more than one blank line in a row
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid regex"));

/// Glyphs that PDF fonts commonly emit and their plain-text spelling
const GLYPH_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{00A0}', " "),
    ('\u{2002}', " "),
    ('\u{2003}', " "),
    ('\u{2009}', " "),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{00AD}', ""),
];

/// Replace ligatures and odd spaces, drop NUL characters
pub(crate) fn normalize_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\0' {
            continue;
        }
        match GLYPH_REPLACEMENTS.iter().find(|(glyph, _)| *glyph == ch) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

/// Normalize the text of one page.
///
/// Lines lose trailing whitespace and blank-line runs collapse to a single blank
/// line. Returns `None` when nothing but whitespace is left.
pub fn clean_page_text(raw: &str) -> Option<String> {
    let normalized = normalize_glyphs(raw);
    let cleaned = normalized
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = BLANK_RUNS.replace_all(&cleaned, "\n\n");
    let cleaned = cleaned.trim_matches('\n');

    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ligatures_and_nul() {
        assert_eq!(normalize_glyphs("\u{FB01}nal\0 o\u{FB00}er"), "final offer");
        assert_eq!(normalize_glyphs("a\u{00A0}b"), "a b");
    }

    #[test]
    fn test_blank_pages_yield_none() {
        assert_eq!(clean_page_text(""), None);
        assert_eq!(clean_page_text("  \n\t\n"), None);
        assert_eq!(clean_page_text("\0\0"), None);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        assert_eq!(
            clean_page_text("\nline one   \nline two\t\n\n"),
            Some("line one\nline two".to_string())
        );
    }

    #[test]
    fn test_blank_runs_collapse() {
        assert_eq!(
            clean_page_text("first\n\n\n\n  \nsecond\n\nthird"),
            Some("first\n\nsecond\n\nthird".to_string())
        );
    }
}
