//! Error types for stwtag.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for stwtag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stwtag operations.
///
/// Loading- and configuration-stage failures (`InvalidCorpus`,
/// `MalformedRecord`, `UnknownConcept`, `Config`) abort the whole run.
/// `TopicRecovery` is handled per prediction row during evaluation: the row
/// is skipped and logged at error level, never silently rewritten.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Corpus file missing, not a regular file, or wrong extension.
    #[error("Invalid corpus file '{path}': {reason}")]
    InvalidCorpus {
        /// Offending path.
        path: PathBuf,
        /// Why the file was rejected.
        reason: String,
    },

    /// A corpus line has fewer fields than the active mode requires.
    #[error("Malformed record at line {line} in '{file}': {reason}")]
    MalformedRecord {
        /// Corpus file name.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        reason: String,
    },

    /// A referenced concept id is unknown to the concept store.
    ///
    /// Indicates thesaurus/corpus version skew; intentionally not swallowed.
    #[error("Unknown concept: {0}")]
    UnknownConcept(String),

    /// A matched surface form cannot be located in its source text.
    ///
    /// Contract violation by the matching engine.
    #[error("Cannot locate matched phrase '{phrase}' in source text")]
    SpanResolution {
        /// The phrase the engine claimed to have matched.
        phrase: String,
    },

    /// A predicted label cannot be mapped back to exactly one concept id.
    #[error("Cannot recover concept id of topic '{label}' @ document '{doc_id}'")]
    TopicRecovery {
        /// The predicted label text.
        label: String,
        /// Document the prediction belongs to.
        doc_id: String,
    },

    /// Configuration error (thesaurus location, stemmer name, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Matching engine failure (unfitted model, corrupt artifact, ...).
    #[error("Matching engine error: {0}")]
    Engine(String),

    /// Evaluation error (sequence misalignment, ...).
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid corpus error.
    pub fn invalid_corpus(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidCorpus {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error.
    pub fn malformed_record(
        file: impl Into<String>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedRecord {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create an unknown concept error.
    pub fn unknown_concept(cid: impl Into<String>) -> Self {
        Error::UnknownConcept(cid.into())
    }

    /// Create a span resolution error.
    pub fn span_resolution(phrase: impl Into<String>) -> Self {
        Error::SpanResolution {
            phrase: phrase.into(),
        }
    }

    /// Create a topic recovery error.
    pub fn topic_recovery(label: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Error::TopicRecovery {
            label: label.into(),
            doc_id: doc_id.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a matching engine error.
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::Engine(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }
}
