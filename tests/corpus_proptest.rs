//! Property-based tests for annotation spans and corpus loading.
//!
//! These verify the pipeline invariants for ALL valid inputs, not just
//! hand-picked examples.

use std::io::Write;

use proptest::prelude::*;
use stwtag::{load_documents, Annotator, CandidateMatch, MockEngine, Thesaurus};

fn char_slice(text: &str, begin: usize, end: usize) -> String {
    text.chars().skip(begin).take(end - begin).collect()
}

proptest! {
    /// For every annotation, the character slice [begin, end) of the source
    /// reproduces the matching text and the bounds are valid.
    #[test]
    fn annotation_spans_are_valid(
        prefix in "[a-zA-Zäöü ]{0,40}",
        suffix in "[a-zA-Zäöü ]{0,40}",
        needle in "[a-z]{2,12}",
    ) {
        let text = format!("{prefix}{needle}{suffix}");
        let engine = MockEngine::new().with_candidates(
            &text,
            vec![CandidateMatch::new("http://zbw.eu/stw/descriptor/1", &needle)],
        );
        let stw = Thesaurus::builder().descriptor("1", "whatever").build();
        let annos = Annotator::new(&stw, &engine).annotate(&text).unwrap();
        prop_assert_eq!(annos.len(), 1);
        let a = &annos[0];
        prop_assert!(a.begin < a.end);
        prop_assert!(a.end <= text.chars().count());
        prop_assert_eq!(char_slice(&text, a.begin, a.end), a.matching_text.clone());
    }

    /// The reported span is always the first occurrence, even when the
    /// needle repeats.
    #[test]
    fn first_occurrence_is_deterministic(
        gap in "[A-Z ]{1,20}",
        needle in "[a-z]{3,8}",
        repeats in 2..5usize,
    ) {
        let mut text = String::new();
        for _ in 0..repeats {
            text.push_str(&needle);
            text.push_str(&gap);
        }
        let engine = MockEngine::new().with_candidates(
            &text,
            vec![CandidateMatch::new("http://zbw.eu/stw/descriptor/1", &needle)],
        );
        let stw = Thesaurus::builder().descriptor("1", "whatever").build();
        let annotator = Annotator::new(&stw, &engine);
        let first = annotator.annotate(&text).unwrap();
        let second = annotator.annotate(&text).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first[0].begin, 0);
    }

    /// Loading the same corpus twice yields identical document sequences,
    /// in input order.
    #[test]
    fn corpus_loading_is_idempotent(
        records in prop::collection::vec(("[a-z0-9]{1,10}", "[a-zA-Z ]{1,30}"), 1..10),
    ) {
        let stw = Thesaurus::builder().descriptor("10025-6", "Economy").build();
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for (id, content) in &records {
            writeln!(f, "{id}\t{content}\t10025-6").unwrap();
        }
        f.flush().unwrap();
        let first = load_documents(&stw, f.path(), true).unwrap();
        let second = load_documents(&stw, f.path(), true).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), records.len());
        for (doc, (id, _)) in first.iter().zip(&records) {
            prop_assert_eq!(&doc.id, id);
        }
    }
}
