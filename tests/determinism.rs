use topicdiff::{
    PdfNormalizeConfig, compare_many, compare_texts, normalize_pdf_text, normalize_text,
    segment_document,
};

const MESSY: &str = "Expected Outcome:\nStakehold ers will co-design Solut ions\nthat improve climate-\nneutral transport1.\n\
• cleaner\u{00A0}air;\n• better data [2].\n\n1 https://example.org/one\n[2] Report https://example.org/two";

#[test]
fn segmentation_is_repeatable() {
    let first = segment_document(MESSY);
    for _ in 0..5 {
        assert_eq!(segment_document(MESSY), first);
    }
}

#[test]
fn normalizers_are_idempotent() {
    let cfg = PdfNormalizeConfig::default();
    let once = normalize_pdf_text(MESSY, &cfg);
    assert_eq!(normalize_pdf_text(&once, &cfg), once);

    let once = normalize_text(MESSY);
    assert_eq!(normalize_text(&once), once);
}

#[test]
fn alignment_is_repeatable() {
    let other = "Expected Outcome: Stakeholders will co-design solutions.\n• cleaner air;";
    let first = compare_texts(MESSY, other);
    assert_eq!(compare_texts(MESSY, other), first);

    let batch = compare_many(&[(MESSY, other), (MESSY, other)]);
    assert_eq!(batch, vec![first.clone(), first]);
}
