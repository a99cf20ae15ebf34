//! Tab-separated corpus loading.
//!
//! One record per line: `doc_id<TAB>content[<TAB>gold_concept_ids]`, gold
//! concept ids semicolon-separated. Gold ids are resolved to English
//! preferred labels at load time; deprecated ids are skipped with a warning,
//! unknown ids abort the load (thesaurus/corpus version skew is not a
//! recoverable condition).

use std::fs;
use std::path::Path;

use crate::thesaurus::ConceptStore;
use crate::{Error, Result};

/// A corpus document: id, raw content and the gold label set derived from
/// gold concept ids at load time (empty if the corpus has no gold column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Free-form document id token.
    pub id: String,
    /// Raw text content.
    pub content: String,
    /// Gold preferred labels, in corpus order.
    pub gold_labels: Vec<String>,
}

impl Document {
    /// Create a document without gold labels.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            gold_labels: Vec::new(),
        }
    }

    /// Attach gold labels.
    #[must_use]
    pub fn with_gold_labels(mut self, labels: Vec<String>) -> Self {
        self.gold_labels = labels;
        self
    }
}

/// Load documents from a tab-separated corpus file.
///
/// When `has_gold_column` is true every line must carry at least three
/// fields; the third holds the semicolon-separated gold concept ids. In
/// either mode a line needs at least `doc_id` and content. The returned
/// sequence preserves input line order.
pub fn load_documents(
    store: &dyn ConceptStore,
    path: &Path,
    has_gold_column: bool,
) -> Result<Vec<Document>> {
    validate_corpus_path(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let data = fs::read_to_string(path)?;
    let mut documents = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            return Err(Error::malformed_record(
                &file_name,
                line_no,
                format!("expected at least 2 tab-separated fields, got {}", fields.len()),
            ));
        }
        let doc_id = fields[0];
        let content = fields[1];
        let mut gold_labels = Vec::new();
        if has_gold_column {
            if fields.len() < 3 {
                return Err(Error::malformed_record(
                    &file_name,
                    line_no,
                    format!("expected at least 3 tab-separated fields, got {}", fields.len()),
                ));
            }
            for cid in fields[2].split(';') {
                let cid = cid.trim();
                if cid.is_empty() {
                    continue;
                }
                if store.is_deprecated(cid) {
                    log::warn!("deprecated descriptor ! {cid} @ {doc_id}");
                    continue;
                }
                // unknown concepts propagate: no partial corpus is a valid result
                gold_labels.push(store.preferred_label(cid, "en")?);
            }
        }
        documents.push(Document::new(doc_id, content).with_gold_labels(gold_labels));
    }
    log::info!(
        "loaded {} documents from '{}' (gold column: {has_gold_column})",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

/// Corpus files must exist, be regular files and carry a `.csv` extension.
/// The format check is purely extension-based.
fn validate_corpus_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::invalid_corpus(path, "file not found"));
    }
    if !path.is_file() {
        return Err(Error::invalid_corpus(path, "not a regular file"));
    }
    let has_csv_ext = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !has_csv_ext {
        return Err(Error::invalid_corpus(
            path,
            "illegal format extension, expected '.csv'",
        ));
    }
    Ok(())
}
