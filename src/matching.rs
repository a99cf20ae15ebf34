//! Interfaces to the candidate matching engine.
//!
//! The matching engine is a collaborator: given raw text it produces
//! candidate concept matches, and once fitted on a training corpus it ranks
//! topics for unseen documents. This module defines the seam the rest of the
//! pipeline programs against ([`MatchingEngine`], [`SenseIndex`]), the data
//! types crossing it, the stemmer registry, and a programmable
//! [`MockEngine`] for tests.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::Result;

// =============================================================================
// Data types crossing the engine seam
// =============================================================================

/// A tentative association between a text span and a thesaurus concept,
/// prior to descriptor filtering.
///
/// Created and consumed within one `annotate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Concept reference as the engine knows it — usually a resource URI,
    /// not guaranteed to resolve to a concept id.
    pub concept_ref: String,
    /// The exact substring variant that triggered the match.
    pub surface_form: String,
    /// Engine confidence, if the engine produces one.
    pub score: Option<f64>,
}

impl CandidateMatch {
    /// Create a candidate match without a score.
    #[must_use]
    pub fn new(concept_ref: impl Into<String>, surface_form: impl Into<String>) -> Self {
        Self {
            concept_ref: concept_ref.into(),
            surface_form: surface_form.into(),
            score: None,
        }
    }

    /// Attach a confidence score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// A ranked topic as returned by the fitted engine: label text and
/// probability, no concept id (recovery happens downstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTopic {
    /// Predicted label text.
    pub label: String,
    /// Probability score in `[0, 1]`.
    pub probability: f64,
}

impl RankedTopic {
    /// Create a ranked topic.
    #[must_use]
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Training options handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Stemmer used for vocabulary and text normalization.
    pub stemmer: StemmerKind,
    /// Document language (ISO 639-1).
    pub language: String,
    /// Maximum phrase length, in words, for candidate matching.
    pub max_phrase_length: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            stemmer: StemmerKind::English,
            language: "en".to_string(),
            max_phrase_length: 3,
        }
    }
}

// =============================================================================
// Stemmer registry
// =============================================================================

/// Enumerated stemmer registry.
///
/// Stemmer selection by name is an explicit tagged variant, not dynamic
/// class loading: unknown names fail with a configuration error listing the
/// known ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemmerKind {
    /// Lowercasing only.
    Null,
    /// Lowercasing plus light English suffix stripping.
    #[default]
    English,
}

impl StemmerKind {
    /// Registered stemmer names.
    pub const NAMES: &'static [&'static str] = &["null", "english"];

    /// Resolve a stemmer by registered name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "null" => Ok(StemmerKind::Null),
            "english" => Ok(StemmerKind::English),
            other => Err(crate::Error::config(format!(
                "unknown stemmer '{other}', known stemmers: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// Normalize a single word.
    #[must_use]
    pub fn stem(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        match self {
            StemmerKind::Null => lower,
            StemmerKind::English => strip_english_suffix(&lower),
        }
    }

    /// Normalize a phrase word by word, collapsing whitespace.
    #[must_use]
    pub fn normalize_phrase(&self, phrase: &str) -> String {
        phrase
            .split_whitespace()
            .map(|w| self.stem(w.trim_matches(|c: char| !c.is_alphanumeric())))
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Light plural/suffix folding, enough to conflate the singular/plural label
/// variants that dominate short titles. Not a full Porter stemmer.
fn strip_english_suffix(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if word.len() > 4 && word.ends_with("es") && !word.ends_with("ss") {
        return word[..word.len() - 2].to_string();
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

// =============================================================================
// Engine traits
// =============================================================================

/// The matching engine's internal vocabulary, exposed for concept-id
/// recovery: a normalized label resolves to one or more "senses" (concept
/// references), each with its own resolved term text.
pub trait SenseIndex: Send + Sync {
    /// All concept references a label resolves to.
    fn senses(&self, label: &str) -> Vec<String>;

    /// The resolved term text of a sense, `None` if the sense is unknown.
    fn term(&self, sense: &str) -> Option<String>;
}

/// Candidate matching and topic ranking engine.
///
/// Read paths (`candidates`, `rank_topics`, `sense_index`) take `&self` and
/// must be safe for concurrent use; only fitting and model loading mutate.
pub trait MatchingEngine: Send + Sync {
    /// Candidate concept matches for a raw text, in the engine's iteration
    /// order (not guaranteed sorted by offset).
    fn candidates(&self, text: &str) -> Result<Vec<CandidateMatch>>;

    /// Fit the ranking model on a training corpus.
    fn fit(&mut self, documents: &[Document], options: &TrainOptions) -> Result<()>;

    /// Persist the fitted model artifact. The format is owned by the engine.
    fn save_model(&self, path: &Path) -> Result<()>;

    /// Load a previously persisted model artifact.
    ///
    /// Afterwards the engine must match candidates the way the model was
    /// trained; options persisted in the artifact win over the engine's
    /// construction-time ones.
    fn load_model(&mut self, path: &Path) -> Result<()>;

    /// Ranked topics for one document, best first, at most `limit` entries.
    ///
    /// Fails if no model has been fitted or loaded.
    fn rank_topics(&self, document: &Document, limit: usize) -> Result<Vec<RankedTopic>>;

    /// The engine's vocabulary, for recovering concept ids from labels.
    fn sense_index(&self) -> &dyn SenseIndex;
}

// =============================================================================
// Mock engine (for tests)
// =============================================================================

/// A programmable engine for tests: candidates per input text, topics per
/// document id, and a fixed sense index.
#[derive(Debug, Default, Clone)]
pub struct MockEngine {
    candidates: HashMap<String, Vec<CandidateMatch>>,
    topics: HashMap<String, Vec<RankedTopic>>,
    index: MockSenseIndex,
    fitted: bool,
}

/// Sense index backed by fixed maps.
#[derive(Debug, Default, Clone)]
pub struct MockSenseIndex {
    senses: HashMap<String, Vec<String>>,
    terms: HashMap<String, String>,
}

impl SenseIndex for MockSenseIndex {
    fn senses(&self, label: &str) -> Vec<String> {
        self.senses.get(label).cloned().unwrap_or_default()
    }

    fn term(&self, sense: &str) -> Option<String> {
        self.terms.get(sense).cloned()
    }
}

impl MockEngine {
    /// Create an empty mock engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Program candidate matches for an input text.
    #[must_use]
    pub fn with_candidates(mut self, text: &str, candidates: Vec<CandidateMatch>) -> Self {
        self.candidates.insert(text.to_string(), candidates);
        self
    }

    /// Program ranked topics for a document id.
    #[must_use]
    pub fn with_topics(mut self, doc_id: &str, topics: Vec<RankedTopic>) -> Self {
        self.topics.insert(doc_id.to_string(), topics);
        self
    }

    /// Register a sense for a label, with the sense's own term text.
    #[must_use]
    pub fn with_sense(mut self, label: &str, sense: &str, term: &str) -> Self {
        self.index
            .senses
            .entry(label.to_string())
            .or_default()
            .push(sense.to_string());
        self.index.terms.insert(sense.to_string(), term.to_string());
        self
    }

    /// Mark the engine as already fitted.
    #[must_use]
    pub fn fitted(mut self) -> Self {
        self.fitted = true;
        self
    }
}

impl MatchingEngine for MockEngine {
    fn candidates(&self, text: &str) -> Result<Vec<CandidateMatch>> {
        Ok(self.candidates.get(text).cloned().unwrap_or_default())
    }

    fn fit(&mut self, _documents: &[Document], _options: &TrainOptions) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn save_model(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load_model(&mut self, _path: &Path) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn rank_topics(&self, document: &Document, limit: usize) -> Result<Vec<RankedTopic>> {
        if !self.fitted {
            return Err(crate::Error::engine("model not fitted"));
        }
        let mut topics = self.topics.get(&document.id).cloned().unwrap_or_default();
        topics.truncate(limit);
        Ok(topics)
    }

    fn sense_index(&self) -> &dyn SenseIndex {
        &self.index
    }
}
