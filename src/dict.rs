//! Built-in dictionary matching engine.
//!
//! A deliberately simple [`MatchingEngine`]: the vocabulary is built from
//! the thesaurus labels (English pref and alt labels of non-deprecated
//! concepts, normalized by the configured stemmer), candidates come from
//! word n-gram lookups, and the fitted model is a table of per-label prior
//! probabilities learned from gold label frequencies. Everything a trained
//! classifier would add (phrase scoring, context features) stays behind the
//! engine seam and can replace this implementation without touching the
//! pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::Document;
use crate::matching::{CandidateMatch, MatchingEngine, RankedTopic, SenseIndex, TrainOptions};
use crate::thesaurus::{ConceptKind, ConceptStore, Thesaurus};
use crate::{Error, Result};

/// Vocabulary of the dictionary engine: normalized phrases to senses
/// (concept resource URIs), senses to their resolved term text.
#[derive(Debug, Default, Clone)]
pub struct DictVocabulary {
    phrases: HashMap<String, Vec<String>>,
    terms: HashMap<String, String>,
    stemmer: crate::matching::StemmerKind,
}

impl DictVocabulary {
    /// Build the vocabulary from a thesaurus.
    ///
    /// Indexes English pref and alt labels of all non-deprecated concepts.
    /// Descriptors get `descriptor/` resource URIs, auxiliary concepts
    /// `thsys/` ones, mirroring the STW resource layout.
    pub fn from_thesaurus(stw: &Thesaurus, options: &TrainOptions) -> Result<Self> {
        let mut vocab = DictVocabulary {
            stemmer: options.stemmer,
            ..DictVocabulary::default()
        };
        for cid in stw.concept_ids() {
            if stw.is_deprecated(cid) {
                continue;
            }
            let labels = stw.labels(cid, &options.language);
            if labels.is_empty() {
                continue;
            }
            let sense = match stw.kind(cid) {
                Some(ConceptKind::Descriptor) => {
                    format!("http://zbw.eu/stw/descriptor/{cid}")
                }
                _ => format!("http://zbw.eu/stw/thsys/{cid}"),
            };
            // the sense's own term is the preferred label
            let term = stw.preferred_label(cid, &options.language)?;
            vocab.terms.insert(sense.clone(), term);
            for label in labels {
                let normalized = options.stemmer.normalize_phrase(label);
                if normalized.is_empty() {
                    continue;
                }
                let senses = vocab.phrases.entry(normalized).or_default();
                if !senses.contains(&sense) {
                    senses.push(sense.clone());
                }
            }
        }
        log::info!(
            "dictionary vocabulary: {} phrases, {} senses",
            vocab.phrases.len(),
            vocab.terms.len()
        );
        Ok(vocab)
    }

    /// Number of indexed phrases.
    #[must_use]
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

impl SenseIndex for DictVocabulary {
    fn senses(&self, label: &str) -> Vec<String> {
        // labels arrive as display text; the index is keyed by normalized phrase
        let normalized = self.stemmer.normalize_phrase(label);
        self.phrases.get(&normalized).cloned().unwrap_or_default()
    }

    fn term(&self, sense: &str) -> Option<String> {
        self.terms.get(sense).cloned()
    }
}

/// Persisted model artifact of the dictionary engine. Opaque to the rest of
/// the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DictModel {
    options: TrainOptions,
    /// Label text to smoothed prior probability.
    priors: HashMap<String, f64>,
    /// Prior for labels never seen in training.
    default_prior: f64,
}

/// Dictionary matching engine over an STW vocabulary.
///
/// Keeps its thesaurus so that loading a persisted model can rebuild the
/// vocabulary under the options the model was trained with.
pub struct DictEngine {
    thesaurus: Thesaurus,
    options: TrainOptions,
    vocabulary: DictVocabulary,
    model: Option<DictModel>,
}

impl DictEngine {
    /// Create an engine over a thesaurus with the given options.
    pub fn new(stw: &Thesaurus, options: TrainOptions) -> Result<Self> {
        let vocabulary = DictVocabulary::from_thesaurus(stw, &options)?;
        Ok(Self {
            thesaurus: stw.clone(),
            options,
            vocabulary,
            model: None,
        })
    }

    /// Whether a model has been fitted or loaded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn fitted_model(&self) -> Result<&DictModel> {
        self.model
            .as_ref()
            .ok_or_else(|| Error::engine("no model fitted or loaded"))
    }
}

/// Word token spans (byte offsets) of alphanumeric runs.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            spans.push((s, i));
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

impl MatchingEngine for DictEngine {
    fn candidates(&self, text: &str) -> Result<Vec<CandidateMatch>> {
        let spans = word_spans(text);
        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();
        // longer phrases first so "fishery product" wins over "fishery"
        for n in (1..=self.options.max_phrase_length.max(1)).rev() {
            if n > spans.len() {
                continue;
            }
            for window in spans.windows(n) {
                let begin = window[0].0;
                let end = window[n - 1].1;
                let surface = &text[begin..end];
                let normalized = self.options.stemmer.normalize_phrase(surface);
                let Some(senses) = self.vocabulary.phrases.get(&normalized) else {
                    continue;
                };
                for sense in senses {
                    if seen.insert(sense.clone()) {
                        candidates.push(CandidateMatch::new(sense.clone(), surface.to_string()));
                    }
                }
            }
        }
        Ok(candidates)
    }

    fn fit(&mut self, documents: &[Document], options: &TrainOptions) -> Result<()> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            for label in &doc.gold_labels {
                *counts.entry(label.clone()).or_default() += 1;
            }
        }
        let n = documents.len() as f64;
        // add-one smoothing keeps unseen labels rankable
        let priors = counts
            .into_iter()
            .map(|(label, count)| (label, (count as f64 + 1.0) / (n + 2.0)))
            .collect();
        self.model = Some(DictModel {
            options: options.clone(),
            priors,
            default_prior: 1.0 / (n + 2.0),
        });
        log::info!("fitted dictionary priors on {} documents", documents.len());
        Ok(())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        let model = self.fitted_model()?;
        let json = serde_json::to_string_pretty(model)
            .map_err(|e| Error::engine(format!("cannot serialize model: {e}")))?;
        fs::write(path, json)?;
        log::info!("saved model to '{}'", path.display());
        Ok(())
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path)?;
        let model: DictModel = serde_json::from_str(&json)
            .map_err(|e| Error::engine(format!("corrupt model artifact '{}': {e}", path.display())))?;
        // the artifact's options win: candidate normalization must match how
        // the priors were trained
        if model.options != self.options {
            log::info!(
                "model artifact '{}' was trained with different options, rebuilding vocabulary",
                path.display()
            );
            self.vocabulary = DictVocabulary::from_thesaurus(&self.thesaurus, &model.options)?;
            self.options = model.options.clone();
        }
        self.model = Some(model);
        Ok(())
    }

    fn rank_topics(&self, document: &Document, limit: usize) -> Result<Vec<RankedTopic>> {
        let model = self.fitted_model()?;
        let mut labels: Vec<String> = Vec::new();
        for candidate in self.candidates(&document.content)? {
            if let Some(term) = self.vocabulary.term(&candidate.concept_ref) {
                if !labels.contains(&term) {
                    labels.push(term);
                }
            }
        }
        let mut topics: Vec<RankedTopic> = labels
            .into_iter()
            .map(|label| {
                let p = model.priors.get(&label).copied().unwrap_or(model.default_prior);
                RankedTopic::new(label, p)
            })
            .collect();
        topics.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        topics.truncate(limit);
        Ok(topics)
    }

    fn sense_index(&self) -> &dyn SenseIndex {
        &self.vocabulary
    }
}
