//! Corpus loading integration tests: gold resolution, deprecation handling,
//! ordering, idempotence.

use std::io::Write;

use stwtag::{load_documents, Error, Thesaurus};

fn stw() -> Thesaurus {
    Thesaurus::builder()
        .descriptor("14161-6", "Fishery product")
        .descriptor("10025-6", "Economy")
        .descriptor("12964-6", "Working hours")
        .descriptor("00000-0", "Obsolete thing")
        .deprecated("00000-0")
        .build()
}

fn corpus_file(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(f, "{content}").unwrap();
    f.flush().unwrap();
    f
}

// =============================================================================
// Gold label resolution (concrete scenarios 2 and 3)
// =============================================================================

#[test]
fn gold_concept_ids_become_english_labels() {
    let f = corpus_file("800000001\tfishery : an emerging market?\t14161-6");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "800000001");
    assert_eq!(docs[0].content, "fishery : an emerging market?");
    assert_eq!(docs[0].gold_labels, vec!["Fishery product".to_string()]);
}

#[test]
fn deprecated_gold_ids_are_excluded_without_failing() {
    let f = corpus_file("800000002\tsome title\t00000-0");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    assert!(docs[0].gold_labels.is_empty());
}

#[test]
fn gold_ids_are_trimmed_and_split_on_semicolons() {
    let f = corpus_file("d1\ttitle\t 10025-6 ; 12964-6 ");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    assert_eq!(
        docs[0].gold_labels,
        vec!["Economy".to_string(), "Working hours".to_string()]
    );
}

#[test]
fn empty_gold_field_means_no_labels() {
    let f = corpus_file("d1\ttitle\t");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    assert!(docs[0].gold_labels.is_empty());
}

#[test]
fn unknown_gold_ids_propagate_the_lookup_failure() {
    let f = corpus_file("d1\ttitle\t19019-5");
    let err = load_documents(&stw(), f.path(), true).unwrap_err();
    match err {
        Error::UnknownConcept(msg) => assert!(msg.contains("19019-5")),
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Record shape validation
// =============================================================================

#[test]
fn malformed_record_names_file_and_line() {
    let f = corpus_file("d1\ttitle one\t10025-6\nd2\tonly two fields");
    let err = load_documents(&stw(), f.path(), true).unwrap_err();
    match err {
        Error::MalformedRecord { file, line, .. } => {
            assert_eq!(line, 2);
            assert!(file.ends_with(".csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn extra_columns_are_tolerated() {
    let f = corpus_file("d1\ttitle\t10025-6\textra\tcolumns");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    assert_eq!(docs[0].gold_labels, vec!["Economy".to_string()]);
}

#[test]
fn directory_paths_are_rejected() {
    let dir = tempfile::Builder::new().suffix(".csv").tempdir().unwrap();
    let err = load_documents(&stw(), dir.path(), true).unwrap_err();
    assert!(matches!(err, Error::InvalidCorpus { .. }));
}

// =============================================================================
// Ordering and idempotence
// =============================================================================

#[test]
fn input_line_order_is_preserved() {
    let f = corpus_file("z\tlast alphabetically, first in file\t10025-6\na\ttitle\t12964-6\nm\ttitle\t14161-6");
    let docs = load_documents(&stw(), f.path(), true).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
}

#[test]
fn loading_twice_yields_identical_sequences() {
    let f = corpus_file("d1\ttitle one\t10025-6;12964-6\nd2\ttitle two\t14161-6");
    let stw = stw();
    let first = load_documents(&stw, f.path(), true).unwrap();
    let second = load_documents(&stw, f.path(), true).unwrap();
    assert_eq!(first, second);
}
