//! # stwtag
//!
//! Short-text subject indexing against the STW thesaurus.
//!
//! Given a title or snippet, stwtag assigns controlled-vocabulary subject
//! descriptors: a matching engine proposes candidate concepts, the
//! [`Annotator`] keeps the ones that resolve to admissible descriptors and
//! locates their exact character spans, and the batch workflow trains and
//! evaluates the engine over tab-separated corpora.
//!
//! ## Quick start — annotation
//!
//! ```rust
//! use stwtag::{Annotator, CandidateMatch, MockEngine, Thesaurus};
//!
//! let stw = Thesaurus::builder()
//!     .descriptor("6669", "Multinational corporation")
//!     .build();
//! let text = "German multinationals and ethics";
//! let engine = MockEngine::new().with_candidates(
//!     text,
//!     vec![CandidateMatch::new("http://zbw.eu/stw/descriptor/6669", "multinationals")],
//! );
//! let annotations = Annotator::new(&stw, &engine).annotate(text).unwrap();
//! assert_eq!(annotations[0].cid, "6669");
//! assert_eq!(annotations[0].matching_text, "multinationals");
//! ```
//!
//! ## Batch train/evaluate
//!
//! Corpora are UTF-8 files with one tab-separated record per line
//! (`doc_id<TAB>content[<TAB>gold_concept_ids]`). [`batch::train`] fits the
//! engine on a gold-labeled corpus, [`batch::evaluate`] applies it to a test
//! corpus, recovers concept ids from predicted labels and reports mean
//! precision/recall; [`report::write_topics_csv`] streams the rows.
//!
//! ## Thread safety
//!
//! [`Thesaurus`], [`Annotator`] and the engine read paths take `&self`, hold
//! no interior mutability, and the engine traits require `Send + Sync`, so
//! request-serving front ends may share one instance across threads. Only
//! fitting and model loading mutate.

#![warn(missing_docs)]

pub mod annotate;
pub mod batch;
pub mod corpus;
pub mod dict;
mod error;
pub mod matching;
pub mod offset;
pub mod report;
pub mod serve;
pub mod thesaurus;

pub use annotate::{Annotation, Annotator};
pub use batch::{DocumentPredictions, Evaluation, EvaluationReport, TopicPrediction};
pub use corpus::{load_documents, Document};
pub use dict::{DictEngine, DictVocabulary};
pub use error::{Error, Result};
pub use matching::{
    CandidateMatch, MatchingEngine, MockEngine, RankedTopic, SenseIndex, StemmerKind, TrainOptions,
};
pub use report::{write_topics_csv, ReportOptions};
pub use thesaurus::{ConceptKind, ConceptStore, Thesaurus, ThesaurusBuilder};
