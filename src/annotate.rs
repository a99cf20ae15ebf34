//! Descriptor annotation of raw text.
//!
//! The [`Annotator`] turns the matching engine's candidate set into
//! validated, offset-located annotations: only candidates whose concept
//! resolves to a *descriptor* survive, and every annotation carries the
//! first-occurrence character span of its surface form in the original
//! input.

use serde::{Deserialize, Serialize};

use crate::matching::MatchingEngine;
use crate::offset::first_char_span;
use crate::thesaurus::{resource_cid, ConceptKind, ConceptStore};
use crate::{Error, Result};

/// A validated subject annotation.
///
/// Invariant: `0 <= begin < end <= text.chars().count()` and the character
/// slice `[begin, end)` of the source text equals `matching_text`. Offsets
/// are character-based, half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Start offset (characters, inclusive).
    pub begin: usize,
    /// End offset (characters, exclusive).
    pub end: usize,
    /// Concept id of the assigned descriptor.
    pub cid: String,
    /// Verbatim matched substring of the source text.
    #[serde(rename = "matchingText")]
    pub matching_text: String,
}

impl Annotation {
    /// Create an annotation.
    #[must_use]
    pub fn new(cid: impl Into<String>, matching_text: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            begin,
            end,
            cid: cid.into(),
            matching_text: matching_text.into(),
        }
    }
}

/// Filters candidate matches to valid descriptors and locates their spans.
///
/// Holds only shared read-only references; safe for concurrent use from
/// multiple threads.
pub struct Annotator<'a> {
    store: &'a dyn ConceptStore,
    engine: &'a dyn MatchingEngine,
}

impl<'a> Annotator<'a> {
    /// Create an annotator over a concept store and a matching engine.
    #[must_use]
    pub fn new(store: &'a dyn ConceptStore, engine: &'a dyn MatchingEngine) -> Self {
        Self { store, engine }
    }

    /// Annotate a raw text.
    ///
    /// Returns one annotation per admissible candidate, in the engine's
    /// candidate iteration order (not sorted by offset). An empty candidate
    /// set yields an empty sequence. Non-descriptor candidates are skipped
    /// at debug level; a surface form that does not literally occur in
    /// `text` is an engine contract violation and fails the whole call with
    /// [`Error::SpanResolution`].
    pub fn annotate(&self, text: &str) -> Result<Vec<Annotation>> {
        let candidates = self.engine.candidates(text)?;
        let mut annotations = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let cref = &candidate.concept_ref;
            let cid = resource_cid(cref);
            if self.store.kind(cid) != Some(ConceptKind::Descriptor) {
                log::debug!("trying to assign non-descriptor concept: {cref}");
                continue;
            }
            let surface = &candidate.surface_form;
            let (begin, end) = first_char_span(text, surface).ok_or_else(|| {
                log::error!("matched phrase '{surface}' not found in source text");
                Error::span_resolution(surface.clone())
            })?;
            annotations.push(Annotation::new(cid, surface.clone(), begin, end));
        }
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{CandidateMatch, MockEngine};
    use crate::thesaurus::Thesaurus;

    fn store() -> Thesaurus {
        Thesaurus::builder()
            .descriptor("6669", "Multinational corporation")
            .non_descriptor("17036-5", "Germany")
            .build()
    }

    #[test]
    fn descriptor_only_with_first_occurrence_span() {
        let text = "German multinationals and ethics : a case panel study";
        let engine = MockEngine::new().with_candidates(
            text,
            vec![
                CandidateMatch::new("http://zbw.eu/stw/thsys/17036-5", "German"),
                CandidateMatch::new("http://zbw.eu/stw/descriptor/6669", "multinationals"),
            ],
        );
        let stw = store();
        let annotator = Annotator::new(&stw, &engine);
        let annos = annotator.annotate(text).unwrap();
        assert_eq!(annos.len(), 1);
        assert_eq!(annos[0].cid, "6669");
        assert_eq!(annos[0].matching_text, "multinationals");
        assert_eq!(&text[annos[0].begin..annos[0].end], "multinationals");
    }

    #[test]
    fn empty_candidate_set_is_empty_result() {
        let engine = MockEngine::new();
        let stw = store();
        let annotator = Annotator::new(&stw, &engine);
        assert!(annotator.annotate("no matches here").unwrap().is_empty());
    }

    #[test]
    fn unlocatable_surface_form_is_span_resolution_error() {
        let text = "multinational firms"; // stemmed form, surface form differs
        let engine = MockEngine::new().with_candidates(
            text,
            vec![CandidateMatch::new(
                "http://zbw.eu/stw/descriptor/6669",
                "multinationals",
            )],
        );
        let stw = store();
        let annotator = Annotator::new(&stw, &engine);
        let err = annotator.annotate(text).unwrap_err();
        assert!(matches!(err, Error::SpanResolution { .. }));
    }

    #[test]
    fn unknown_concept_refs_are_skipped() {
        let text = "some text with a match";
        let engine = MockEngine::new().with_candidates(
            text,
            vec![CandidateMatch::new("http://example.org/other/1", "match")],
        );
        let stw = store();
        let annotator = Annotator::new(&stw, &engine);
        assert!(annotator.annotate(text).unwrap().is_empty());
    }

    #[test]
    fn annotation_serializes_with_wire_names() {
        let anno = Annotation::new("6669", "multinationals", 7, 21);
        let json = serde_json::to_string(&anno).unwrap();
        assert!(json.contains("\"matchingText\":\"multinationals\""));
        assert!(json.contains("\"cid\":\"6669\""));
        assert!(json.contains("\"begin\":7"));
    }
}
