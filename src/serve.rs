//! JSON record annotation contract.
//!
//! The request-serving front end exchanges JSON arrays of
//! `{id, content}` records; each record comes back augmented with its
//! `annotations`. This module owns the (de)serialization and the batch
//! processing; the transport wrapper around it is not part of this crate.

use serde::{Deserialize, Serialize};

use crate::annotate::{Annotation, Annotator};
use crate::thesaurus::ConceptStore;
use crate::Result;

/// One input/output record of the process-json contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-side record id, echoed back.
    pub id: String,
    /// Raw text to annotate.
    pub content: String,
    /// Filled in by [`annotate_records`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// Static service description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct About {
    /// Application name.
    pub app_name: String,
    /// Application version.
    pub app_version: String,
    /// Version of the loaded thesaurus.
    pub kb_version: String,
}

/// Application name used in the about document and version string.
pub const APP_NAME: &str = "stwtag";
/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the about document for the currently loaded thesaurus.
#[must_use]
pub fn about(store: &dyn ConceptStore) -> About {
    About {
        app_name: APP_NAME.to_string(),
        app_version: APP_VERSION.to_string(),
        kb_version: store.version().unwrap_or("unknown").to_string(),
    }
}

/// Plain-text version string.
#[must_use]
pub fn version_string() -> String {
    format!("{APP_NAME} Version: {APP_VERSION}")
}

/// Annotate every record in place.
pub fn annotate_records(annotator: &Annotator<'_>, records: &mut [Record]) -> Result<()> {
    for record in records.iter_mut() {
        record.annotations = Some(annotator.annotate(&record.content)?);
    }
    Ok(())
}

/// Parse a JSON array of records, annotate, and serialize back.
pub fn process_json(annotator: &Annotator<'_>, body: &str) -> Result<String> {
    let mut records: Vec<Record> = serde_json::from_str(body)
        .map_err(|e| crate::Error::config(format!("invalid request body: {e}")))?;
    annotate_records(annotator, &mut records)?;
    serde_json::to_string_pretty(&records)
        .map_err(|e| crate::Error::config(format!("cannot serialize response: {e}")))
}
