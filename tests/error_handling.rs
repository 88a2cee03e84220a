use std::io::Write;

use tempfile::NamedTempFile;
use topicdiff::{
    AlignConfig, AlignError, Aligner, ConfigLoadError, DocumentFamily, HttpFetcher, PortalConfig,
    PortalError, TopicDiffConfig, compare_texts, detect_document_family, parse_edf_records,
    parse_horizon_topics, segment_document, topic_portal_url,
};

#[test]
fn empty_inputs_never_fail() {
    assert!(segment_document("").is_empty());
    assert!(segment_document(" \n\t\n").is_empty());
    assert!(parse_horizon_topics("").is_empty());
    assert!(parse_edf_records("").is_empty());
    assert_eq!(detect_document_family(""), DocumentFamily::Unknown);
    assert_eq!(topic_portal_url(""), None);

    let result = compare_texts("", "");
    assert!(result.pairs.is_empty());
    assert_eq!(result.score, 100);
}

#[test]
fn invalid_align_config_is_rejected() {
    let err = Aligner::new(AlignConfig {
        match_threshold: f64::NAN,
        ..AlignConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, AlignError::InvalidConfig(_)));
    assert!(err.to_string().starts_with("invalid align config"));
}

#[test]
fn invalid_portal_config_is_rejected() {
    let err = HttpFetcher::new(&PortalConfig {
        allowed_host: "https://ec.europa.eu/".into(),
        ..PortalConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, PortalError::InvalidConfig(_)));
}

#[test]
fn config_file_errors_are_typed() {
    let err = TopicDiffConfig::from_file("/definitely/missing/topicdiff.yaml").unwrap_err();
    assert!(matches!(err, ConfigLoadError::FileRead(_)));

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"version: \"3\"\n").unwrap();
    let err = TopicDiffConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "3"));

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"version: \"1.0\"\nalign:\n  max_notable: many\n").unwrap();
    let err = TopicDiffConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigLoadError::YamlParse(_)));
}

#[test]
fn config_file_drives_alignment() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"version: \"1.0\"\nalign:\n  match_threshold: 1.0\n").unwrap();
    let config = TopicDiffConfig::from_file(file.path()).unwrap();

    let aligner = Aligner::new(config.align).unwrap();
    let result = topicdiff::compare_texts_with(
        &aligner,
        "Reduce emissions by 2030 in cities.",
        "Reduce emissions by 2030 in regions.",
    );
    assert!(result.pairs.is_empty());
    assert_eq!(result.missing_in_other.len(), 1);
}
