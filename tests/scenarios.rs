use topicdiff::{
    Block, InlineToken, ItemKind, PdfNormalizeConfig, ReferenceEntry, compare_texts,
    flatten_blocks, normalize_pdf_text, segment_document,
};

#[test]
fn split_word_is_rejoined_by_pdf_normalizer() {
    let out = normalize_pdf_text("respon ses to climate change", &PdfNormalizeConfig::default());
    assert!(out.contains("responses to climate change"), "got {out:?}");
}

#[test]
fn hyphen_wrapped_word_is_rejoined_on_segmentation() {
    let blocks = segment_document("sustainabil-\nity and resilience");
    assert!(flatten_blocks(&blocks).contains("sustainability and resilience"));
}

#[test]
fn label_paragraph_then_bullet_list() {
    let blocks = segment_document("Scope:\nReduce emissions.\n• Item one\n• Item two");
    assert_eq!(
        blocks,
        vec![
            Block::Paragraph {
                tokens: vec![InlineToken::label("Scope:"), InlineToken::text("Reduce emissions.")],
            },
            Block::List {
                items: vec![vec![InlineToken::text("Item one")], vec![InlineToken::text("Item two")]],
            },
        ]
    );
}

#[test]
fn attached_footnote_resolves_to_reference_line() {
    let blocks = segment_document(
        "Projects will raise their impact34 of climate action.\n\n34 https://example.org/x",
    );

    let Block::Paragraph { tokens } = &blocks[0] else {
        panic!("expected a paragraph, got {:?}", blocks[0]);
    };
    let marker = tokens
        .iter()
        .position(|t| matches!(t, InlineToken::Reference { index: 1, .. }))
        .expect("reference token");
    assert!(matches!(&tokens[marker - 1], InlineToken::Text { text } if text.ends_with("impact")));

    assert_eq!(
        blocks.last(),
        Some(&Block::References {
            entries: vec![ReferenceEntry {
                index: 1,
                raw_id: "34".into(),
                url: Some("https://example.org/x".into()),
                text: None,
            }],
        })
    );
}

#[test]
fn reworded_paragraph_is_one_verbatim_pair() {
    let result = compare_texts("Reduce emissions by 2030.", "Reduce emissions before 2030.");
    assert_eq!(result.pairs.len(), 1);
    assert!(result.missing_in_other.is_empty());
    assert!(result.missing_in_source.is_empty());

    let pair = &result.pairs[0];
    assert_eq!(pair.kind, ItemKind::Paragraph);
    assert_eq!(pair.source_text, "Reduce emissions by 2030.");
    assert_eq!(pair.other_text, "Reduce emissions before 2030.");
    assert!(pair.similarity >= 0.78);
}

#[test]
fn short_uppercase_codes_are_not_footnotes() {
    let code = format!("{}2", "A".repeat(segment::MAX_CODE_PREFIX_LETTERS));
    let text = format!("Cut CO2 and {code} levels.");
    let blocks = segment_document(&text);
    assert_eq!(blocks.len(), 1);
    assert_eq!(flatten_blocks(&blocks), text);
}
