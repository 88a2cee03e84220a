//! Text repair for funding-topic descriptions.
//!
//! Two normalizers live here, one per source of text:
//!
//! - [`normalize_pdf_text`] for text extracted from work-programme PDFs. It
//!   removes invisible code points, rejoins hyphenated line wraps, glues
//!   suffix fragments back onto their words ("Stakehold ers"), and flattens
//!   the result to one line.
//! - [`normalize_text`] for HTML-derived or pasted text. It keeps the line
//!   structure (the segmenter needs it) and only fixes line endings, hyphen
//!   code points, and spaced hyphens.
//!
//! ## Pure function guarantee
//!
//! No I/O and no shared state. Both functions are total and idempotent:
//! `f(f(x)) == f(x)` for any input, including the empty string.
//!
//! The [`title`] helpers clean headings pulled out of a table of contents.

mod config;
mod pdf;
mod text;
pub mod title;
mod whitespace;

pub use crate::config::PdfNormalizeConfig;
pub use crate::pdf::normalize_pdf_text;
pub use crate::text::normalize_text;
pub use crate::title::{clean_title, repair_broken_words, strip_dot_leader};
pub use crate::whitespace::{collapse_line_whitespace, collapse_whitespace};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_output_is_single_line() {
        let raw = "Expected Outcome:\nProject results are expected to contribute to\nStakehold ers across Europe.";
        let out = normalize_pdf_text(raw, &PdfNormalizeConfig::default());
        assert!(!out.contains('\n'));
        assert_eq!(
            out,
            "Expected Outcome: Project results are expected to contribute to Stakeholders across Europe."
        );
    }

    #[test]
    fn generic_output_keeps_lines() {
        let raw = "Scope:\r\n\r\n- first item\r\n- second item";
        assert_eq!(normalize_text(raw), "Scope:\n\n- first item\n- second item");
    }

    #[test]
    fn normalizers_are_idempotent_on_each_others_output() {
        let raw = "climate - neutral\nStakehold ers\u{00AD} and  resp on ses";
        let generic = normalize_text(raw);
        let pdf = normalize_pdf_text(&generic, &PdfNormalizeConfig::default());
        assert_eq!(normalize_pdf_text(&pdf, &PdfNormalizeConfig::default()), pdf);
        assert_eq!(normalize_text(&generic), generic);
    }
}
