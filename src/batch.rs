//! Batch training and evaluation workflow.
//!
//! Orchestrates: load training corpus → fit the matching engine → apply the
//! fitted model to a test corpus → recover concept ids from predicted labels
//! → aggregate precision/recall → hand predictions to the report writer.
//!
//! Documents and their predictions are paired by document id the moment a
//! prediction list is produced ([`DocumentPredictions`]); no two
//! independently produced sequences are ever zipped by position outside of
//! [`apply`], which checks lengths and fails fast.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{load_documents, Document};
use crate::matching::{MatchingEngine, SenseIndex, TrainOptions};
use crate::thesaurus::{resource_cid, ConceptStore};
use crate::{Error, Result};

/// Default number of ranked topics requested per document.
pub const DEFAULT_TOPIC_LIMIT: usize = 15;

/// A topic prediction with its recovered concept id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPrediction {
    /// Recovered concept id.
    pub cid: String,
    /// Predicted label text.
    pub label: String,
    /// Probability score.
    pub probability: f64,
}

/// Predictions of one document, keyed by document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPredictions {
    /// Document id the predictions belong to.
    pub doc_id: String,
    /// Kept predictions, ranked best first.
    pub topics: Vec<TopicPrediction>,
}

/// Aggregate evaluation metrics: arithmetic means of per-document precision
/// and recall over gold-bearing documents, F1 from the averaged values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean per-document precision.
    pub precision: f64,
    /// Mean per-document recall.
    pub recall: f64,
    /// Harmonic mean of the averaged precision and recall.
    pub f_measure: f64,
    /// Documents in the test corpus.
    pub document_count: usize,
    /// Documents that carried gold labels and entered the averages.
    pub evaluated_count: usize,
}

/// Result of an evaluation run: the metrics plus the per-document
/// predictions that were streamed to the report.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Aggregate metrics.
    pub report: EvaluationReport,
    /// Per-document predictions, in corpus order.
    pub predictions: Vec<DocumentPredictions>,
}

/// Train the engine on a gold-labeled corpus.
///
/// Loads the training corpus (gold column required), delegates fitting to
/// the engine, and persists the artifact only when `model_path` is given.
/// The fitted artifact lives in the engine afterwards either way. Returns
/// the number of training documents.
pub fn train(
    engine: &mut dyn MatchingEngine,
    store: &dyn ConceptStore,
    train_csv: &Path,
    model_path: Option<&Path>,
    options: &TrainOptions,
) -> Result<usize> {
    let documents = load_documents(store, train_csv, true)?;
    engine.fit(&documents, options)?;
    if let Some(path) = model_path {
        engine.save_model(path)?;
    }
    Ok(documents.len())
}

/// Apply the fitted engine to a test corpus and evaluate.
///
/// With `pairs` set the corpus is loaded without a gold column and the
/// report carries no meaningful averages (`evaluated_count` is 0).
/// Predictions whose label begins with a URI scheme are internal
/// placeholders and are dropped with a warning before id recovery; a label
/// whose id cannot be recovered loses its row (logged at error level), the
/// run continues.
pub fn evaluate(
    engine: &dyn MatchingEngine,
    store: &dyn ConceptStore,
    test_csv: &Path,
    pairs: bool,
    limit: usize,
) -> Result<Evaluation> {
    let documents = load_documents(store, test_csv, !pairs)?;
    let predictions = apply(engine, &documents, limit)?;
    let report = score(&documents, &predictions);
    log::info!(
        "evaluation: precision {:.4}, recall {:.4}, f-measure {:.4} over {} documents ({} with gold labels)",
        report.precision,
        report.recall,
        report.f_measure,
        report.document_count,
        report.evaluated_count
    );
    Ok(Evaluation {
        report,
        predictions,
    })
}

/// Rank topics for every document and recover concept ids.
///
/// The nth prediction list belongs to the nth document; the pairing is made
/// explicit by document id before anything else consumes the output, and a
/// length mismatch is fatal.
pub fn apply(
    engine: &dyn MatchingEngine,
    documents: &[Document],
    limit: usize,
) -> Result<Vec<DocumentPredictions>> {
    let ranked: Vec<_> = documents
        .iter()
        .map(|doc| engine.rank_topics(doc, limit))
        .collect::<Result<_>>()?;
    if ranked.len() != documents.len() {
        return Err(Error::evaluation(format!(
            "documents and prediction lists differ in length: {} vs {}",
            documents.len(),
            ranked.len()
        )));
    }
    let index = engine.sense_index();
    let mut all = Vec::with_capacity(documents.len());
    for (doc, topics) in documents.iter().zip(ranked) {
        let mut kept = Vec::with_capacity(topics.len());
        for topic in topics {
            if has_uri_scheme(&topic.label) {
                log::warn!("ignore illegal topic : {} @ {}", topic.label, doc.id);
                continue;
            }
            match recover_concept_id(index, &topic.label, &doc.id) {
                Ok(cid) => kept.push(TopicPrediction {
                    cid,
                    label: topic.label,
                    probability: topic.probability,
                }),
                // skip the row, never write a guessed id
                Err(e) => log::error!("{e}"),
            }
        }
        all.push(DocumentPredictions {
            doc_id: doc.id.clone(),
            topics: kept,
        });
    }
    Ok(all)
}

/// Recover the concept id behind a predicted label.
///
/// The engine's vocabulary must report at least one sense for the label, and
/// the chosen sense is the one whose own resolved term equals the label
/// exactly. Zero senses, or no sense with a matching term, fail with
/// [`Error::TopicRecovery`] — never a silent guess.
pub fn recover_concept_id(index: &dyn SenseIndex, label: &str, doc_id: &str) -> Result<String> {
    let senses = index.senses(label);
    if senses.is_empty() {
        return Err(Error::topic_recovery(label, doc_id));
    }
    let mut recovered = None;
    for sense in &senses {
        if index.term(sense).as_deref() == Some(label) {
            recovered = Some(resource_cid(sense).to_string());
        }
    }
    recovered.ok_or_else(|| Error::topic_recovery(label, doc_id))
}

/// A label that still carries a URI scheme is an unresolved internal
/// placeholder, not a topic.
fn has_uri_scheme(label: &str) -> bool {
    label.starts_with("http://") || label.starts_with("https://")
}

/// Aggregate per-document precision and recall, compared on label text.
fn score(documents: &[Document], predictions: &[DocumentPredictions]) -> EvaluationReport {
    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut evaluated = 0usize;
    for doc in documents {
        if doc.gold_labels.is_empty() {
            continue;
        }
        let Some(preds) = predictions.iter().find(|p| p.doc_id == doc.id) else {
            continue;
        };
        let matched = preds
            .topics
            .iter()
            .filter(|t| doc.gold_labels.iter().any(|g| g == &t.label))
            .count() as f64;
        let precision = if preds.topics.is_empty() {
            0.0
        } else {
            matched / preds.topics.len() as f64
        };
        let recall = matched / doc.gold_labels.len() as f64;
        precision_sum += precision;
        recall_sum += recall;
        evaluated += 1;
    }
    let (precision, recall) = if evaluated == 0 {
        (0.0, 0.0)
    } else {
        (
            precision_sum / evaluated as f64,
            recall_sum / evaluated as f64,
        )
    };
    let f_measure = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    EvaluationReport {
        precision,
        recall,
        f_measure,
        document_count: documents.len(),
        evaluated_count: evaluated,
    }
}
