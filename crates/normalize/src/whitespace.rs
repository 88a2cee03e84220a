//! Whitespace helpers shared by both normalizers.
//!
//! PDF extraction scatters runs of spaces, tabs, and stray newlines through
//! otherwise ordinary prose. [`collapse_whitespace`] flattens all of it into
//! single ASCII spaces; [`collapse_line_whitespace`] does the same per line
//! while keeping the line structure intact.
//!
//! ```rust
//! use normalize::collapse_whitespace;
//!
//! assert_eq!(collapse_whitespace("  expected \t outcome \n"), "expected outcome");
//! ```

/// Collapses every run of Unicode whitespace into one ASCII space and trims
/// both ends.
///
/// Newlines count as whitespace here, so the result is always a single line.
/// Empty or whitespace-only input yields an empty string.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut first = true;

    for segment in text.split_whitespace() {
        if !first {
            out.push(' ');
        }
        out.push_str(segment);
        first = false;
    }

    out
}

/// Collapses whitespace inside each line while keeping the newlines.
///
/// Blank lines survive as empty lines so paragraph breaks are not lost.
pub fn collapse_line_whitespace(text: &str) -> String {
    text.split('\n')
        .map(collapse_whitespace)
        .collect::<Vec<_>>()
        .join("\n")
}
