//! Concept store for the STW thesaurus.
//!
//! The pipeline treats the thesaurus as a lookup service: given a concept id
//! it answers with the preferred label, the deprecation flag and the concept
//! kind (descriptor vs. non-indexable concept). The backing data is loaded
//! once per run from an N-Triples export and is immutable afterwards, so the
//! read paths are safe to share across threads (`&self` everywhere, no
//! interior mutability).
//!
//! Schema URIs live in explicit constant tables ([`SkosSchema`],
//! [`StwSchema`]) that are passed into the loader by reference. There is no
//! process-wide RDF model.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

// =============================================================================
// Schema constant tables
// =============================================================================

/// SKOS property URIs used by the loader.
#[derive(Debug, Clone, Copy)]
pub struct SkosSchema {
    /// `skos:prefLabel`
    pub pref_label: &'static str,
    /// `skos:altLabel`
    pub alt_label: &'static str,
    /// `skos:Concept`
    pub concept: &'static str,
}

/// The default SKOS vocabulary.
pub const SKOS: SkosSchema = SkosSchema {
    pref_label: "http://www.w3.org/2004/02/skos/core#prefLabel",
    alt_label: "http://www.w3.org/2004/02/skos/core#altLabel",
    concept: "http://www.w3.org/2004/02/skos/core#Concept",
};

/// STW namespaces and the OWL/RDF properties the pipeline needs.
#[derive(Debug, Clone, Copy)]
pub struct StwSchema {
    /// STW namespace, concept resources live below it.
    pub ns: &'static str,
    /// Scheme resource carrying `owl:versionInfo`.
    pub scheme: &'static str,
    /// `zbwext:Descriptor` class.
    pub descriptor_class: &'static str,
    /// `rdf:type`
    pub rdf_type: &'static str,
    /// `owl:deprecated`
    pub deprecated: &'static str,
    /// `owl:versionInfo`
    pub version_info: &'static str,
}

/// The default STW schema.
pub const STW: StwSchema = StwSchema {
    ns: "http://zbw.eu/stw/",
    scheme: "http://zbw.eu/stw",
    descriptor_class: "http://zbw.eu/namespaces/zbw-extensions/Descriptor",
    rdf_type: "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
    deprecated: "http://www.w3.org/2002/07/owl#deprecated",
    version_info: "http://www.w3.org/2002/07/owl#versionInfo",
};

/// Extract the concept id from a concept reference (trailing path segment).
///
/// `http://zbw.eu/stw/descriptor/19019-5` → `19019-5`. A reference without
/// any `/` is returned unchanged.
#[must_use]
pub fn resource_cid(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(i) => &reference[i + 1..],
        None => reference,
    }
}

// =============================================================================
// Concept store interface
// =============================================================================

/// Kind of a thesaurus concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptKind {
    /// Approved for use as an assigned subject label.
    Descriptor,
    /// Auxiliary concept (e.g. a category node), never assigned.
    NonDescriptor,
}

/// Read-only concept metadata lookup.
///
/// Implementations must be safe for concurrent read-only use; all methods
/// take `&self` and the trait requires `Send + Sync`.
pub trait ConceptStore: Send + Sync {
    /// Preferred label of a concept in the given language.
    ///
    /// Fails with [`Error::UnknownConcept`] if the concept has no label in
    /// that language — a corpus referencing unknown concepts indicates a
    /// thesaurus/corpus version mismatch and is not swallowed.
    fn preferred_label(&self, cid: &str, language: &str) -> Result<String>;

    /// Whether the concept carries a deprecation marker.
    ///
    /// Unknown concepts are not deprecated (the follow-up label lookup will
    /// report them as unknown).
    fn is_deprecated(&self, cid: &str) -> bool;

    /// Kind of the concept, `None` if the id is unknown.
    fn kind(&self, cid: &str) -> Option<ConceptKind>;

    /// Version string of the loaded thesaurus, if the export carried one.
    fn version(&self) -> Option<&str>;
}

// =============================================================================
// In-memory thesaurus
// =============================================================================

#[derive(Debug, Default, Clone)]
struct ConceptEntry {
    /// (language, label) pairs, pref labels first.
    pref_labels: Vec<(String, String)>,
    alt_labels: Vec<(String, String)>,
    deprecated: bool,
    descriptor: bool,
}

/// In-memory concept store, loaded from N-Triples or built programmatically.
#[derive(Debug, Default, Clone)]
pub struct Thesaurus {
    concepts: HashMap<String, ConceptEntry>,
    version: Option<String>,
}

impl Thesaurus {
    /// Start building a thesaurus programmatically (mainly for tests).
    #[must_use]
    pub fn builder() -> ThesaurusBuilder {
        ThesaurusBuilder {
            thesaurus: Thesaurus::default(),
        }
    }

    /// Load a thesaurus from an N-Triples file.
    ///
    /// Only the statements the pipeline needs are interpreted (labels,
    /// deprecation, descriptor type, scheme version); everything else in the
    /// export is ignored.
    pub fn from_ntriples(path: &Path) -> Result<Self> {
        Self::from_ntriples_with(path, &SKOS, &STW)
    }

    /// Load with explicit schema tables.
    pub fn from_ntriples_with(path: &Path, skos: &SkosSchema, stw: &StwSchema) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut thesaurus = Thesaurus::default();
        let mut statements = 0usize;
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(stmt) = parse_triple(line) else {
                continue;
            };
            statements += 1;
            thesaurus.apply(stmt, skos, stw);
        }
        log::info!(
            "loaded thesaurus from '{}': {} concepts, {} statements, version {}",
            path.display(),
            thesaurus.concepts.len(),
            statements,
            thesaurus.version.as_deref().unwrap_or("unknown")
        );
        Ok(thesaurus)
    }

    /// Number of known concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether no concepts are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Iterate over all concept ids.
    pub fn concept_ids(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// All labels (pref and alt) of a concept in the given language.
    #[must_use]
    pub fn labels(&self, cid: &str, language: &str) -> Vec<&str> {
        let Some(entry) = self.concepts.get(cid) else {
            return Vec::new();
        };
        entry
            .pref_labels
            .iter()
            .chain(entry.alt_labels.iter())
            .filter(|(lang, _)| lang == language)
            .map(|(_, label)| label.as_str())
            .collect()
    }

    /// Labels carried by more than one concept in the given language.
    ///
    /// Diagnostic: a shared label makes downstream topic-id recovery
    /// ambiguous. Pref and alt labels are compared verbatim. Each entry is
    /// `(label, concept ids)`, both sorted for stable output.
    #[must_use]
    pub fn ambiguous_labels(&self, language: &str) -> Vec<(String, Vec<String>)> {
        let mut by_label: HashMap<&str, Vec<&str>> = HashMap::new();
        for (cid, entry) in &self.concepts {
            for (lang, label) in entry.pref_labels.iter().chain(entry.alt_labels.iter()) {
                if lang == language {
                    let cids = by_label.entry(label.as_str()).or_default();
                    if !cids.contains(&cid.as_str()) {
                        cids.push(cid.as_str());
                    }
                }
            }
        }
        let mut shared: Vec<(String, Vec<String>)> = by_label
            .into_iter()
            .filter(|(_, cids)| cids.len() > 1)
            .map(|(label, mut cids)| {
                cids.sort_unstable();
                (
                    label.to_string(),
                    cids.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();
        shared.sort_by(|a, b| a.0.cmp(&b.0));
        shared
    }

    fn apply(&mut self, stmt: Triple<'_>, skos: &SkosSchema, stw: &StwSchema) {
        if stmt.subject == stw.scheme && stmt.predicate == stw.version_info {
            if let Object::Literal { text, .. } = stmt.object {
                self.version = Some(text);
            }
            return;
        }
        if !stmt.subject.starts_with(stw.ns) {
            return;
        }
        let cid = resource_cid(stmt.subject).to_string();
        let entry = self.concepts.entry(cid).or_default();
        match stmt.object {
            Object::Iri(iri) if stmt.predicate == stw.rdf_type => {
                if iri == stw.descriptor_class {
                    entry.descriptor = true;
                }
                // skos:Concept adds nothing: every entry starts as a plain concept
            }
            Object::Literal { text, language } if stmt.predicate == skos.pref_label => {
                entry.pref_labels.push((language.unwrap_or_default(), text));
            }
            Object::Literal { text, language } if stmt.predicate == skos.alt_label => {
                entry.alt_labels.push((language.unwrap_or_default(), text));
            }
            _ if stmt.predicate == stw.deprecated => {
                // presence of the property marks deprecation, value ignored
                entry.deprecated = true;
            }
            _ => {}
        }
    }
}

impl ConceptStore for Thesaurus {
    fn preferred_label(&self, cid: &str, language: &str) -> Result<String> {
        self.concepts
            .get(cid)
            .and_then(|entry| {
                entry
                    .pref_labels
                    .iter()
                    .find(|(lang, _)| lang == language)
                    .map(|(_, label)| label.clone())
            })
            .ok_or_else(|| Error::unknown_concept(format!("{cid} @ {language}")))
    }

    fn is_deprecated(&self, cid: &str) -> bool {
        self.concepts.get(cid).is_some_and(|e| e.deprecated)
    }

    fn kind(&self, cid: &str) -> Option<ConceptKind> {
        self.concepts.get(cid).map(|e| {
            if e.descriptor {
                ConceptKind::Descriptor
            } else {
                ConceptKind::NonDescriptor
            }
        })
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Builder for an in-memory [`Thesaurus`].
#[derive(Debug, Default)]
pub struct ThesaurusBuilder {
    thesaurus: Thesaurus,
}

impl ThesaurusBuilder {
    /// Add a descriptor concept with an English preferred label.
    #[must_use]
    pub fn descriptor(mut self, cid: &str, label_en: &str) -> Self {
        let entry = self.thesaurus.concepts.entry(cid.to_string()).or_default();
        entry.descriptor = true;
        entry
            .pref_labels
            .push(("en".to_string(), label_en.to_string()));
        self
    }

    /// Add a non-descriptor concept with an English preferred label.
    #[must_use]
    pub fn non_descriptor(mut self, cid: &str, label_en: &str) -> Self {
        let entry = self.thesaurus.concepts.entry(cid.to_string()).or_default();
        entry
            .pref_labels
            .push(("en".to_string(), label_en.to_string()));
        self
    }

    /// Add an English alternative label to an existing concept.
    #[must_use]
    pub fn alt_label(mut self, cid: &str, label_en: &str) -> Self {
        let entry = self.thesaurus.concepts.entry(cid.to_string()).or_default();
        entry
            .alt_labels
            .push(("en".to_string(), label_en.to_string()));
        self
    }

    /// Mark a concept as deprecated.
    #[must_use]
    pub fn deprecated(mut self, cid: &str) -> Self {
        self.thesaurus
            .concepts
            .entry(cid.to_string())
            .or_default()
            .deprecated = true;
        self
    }

    /// Set the thesaurus version string.
    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.thesaurus.version = Some(version.to_string());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Thesaurus {
        self.thesaurus
    }
}

// =============================================================================
// Thesaurus location
// =============================================================================

/// Environment variable naming the thesaurus file directly.
pub const ENV_STW_PATH: &str = "STW_PTH";
/// Environment variable naming a directory containing `stw.nt`.
pub const ENV_STW_DIR: &str = "STW_DIR";
/// Conventional file name inside [`ENV_STW_DIR`].
pub const STW_FILE_NAME: &str = "stw.nt";

/// Resolve the thesaurus source path.
///
/// Order: explicit path, `STW_PTH`, `STW_DIR/stw.nt`. The resolved path must
/// be a regular file; everything else is a startup-fatal configuration
/// error.
pub fn stw_location(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = if let Some(p) = explicit {
        p.to_path_buf()
    } else if let Ok(p) = std::env::var(ENV_STW_PATH) {
        PathBuf::from(p)
    } else if let Ok(dir) = std::env::var(ENV_STW_DIR) {
        Path::new(&dir).join(STW_FILE_NAME)
    } else {
        return Err(Error::config(format!(
            "no thesaurus path given and neither {ENV_STW_PATH} nor {ENV_STW_DIR} is set"
        )));
    };
    if !path.is_file() {
        return Err(Error::config(format!(
            "thesaurus path '{}' is not a regular file",
            path.display()
        )));
    }
    Ok(path)
}

// =============================================================================
// Minimal N-Triples parsing
// =============================================================================

#[derive(Debug)]
struct Triple<'a> {
    subject: &'a str,
    predicate: &'a str,
    object: Object,
}

#[derive(Debug)]
enum Object {
    Iri(String),
    Literal {
        text: String,
        language: Option<String>,
    },
}

/// Parse one N-Triples statement. Returns `None` for lines this loader does
/// not understand (blank nodes, malformed input); the export is trusted to
/// be well-formed overall.
fn parse_triple(line: &str) -> Option<Triple<'_>> {
    let line = line.strip_suffix('.').map_or(line, str::trim_end);
    let (subject, rest) = parse_iri(line.trim_start())?;
    let (predicate, rest) = parse_iri(rest.trim_start())?;
    let object = parse_object(rest.trim())?;
    Some(Triple {
        subject,
        predicate,
        object,
    })
}

fn parse_iri(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix('<')?;
    let end = rest.find('>')?;
    Some((&rest[..end], &rest[end + 1..]))
}

fn parse_object(input: &str) -> Option<Object> {
    if input.starts_with('<') {
        let (iri, _) = parse_iri(input)?;
        return Some(Object::Iri(iri.to_string()));
    }
    let rest = input.strip_prefix('"')?;
    // scan to the closing unescaped quote
    let mut text = String::new();
    let mut chars = rest.char_indices();
    let mut close = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, other)) => text.push(other),
                None => return None,
            },
            '"' => {
                close = Some(i);
                break;
            }
            _ => text.push(c),
        }
    }
    let close = close?;
    let suffix = rest[close + 1..].trim();
    let language = suffix
        .strip_prefix('@')
        .map(|tag| tag.split_whitespace().next().unwrap_or(tag).to_string());
    Some(Object::Literal { text, language })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Thesaurus {
        Thesaurus::builder()
            .descriptor("14161-6", "Fishery product")
            .alt_label("14161-6", "Fish product")
            .descriptor("6669", "Multinational corporation")
            .non_descriptor("70582", "V.14 Fishery, aquatic products")
            .deprecated("00000-0")
            .version("9.04")
            .build()
    }

    #[test]
    fn label_lookup_by_language() {
        let stw = sample();
        assert_eq!(
            stw.preferred_label("14161-6", "en").unwrap(),
            "Fishery product"
        );
        assert!(matches!(
            stw.preferred_label("14161-6", "de"),
            Err(Error::UnknownConcept(_))
        ));
        assert!(matches!(
            stw.preferred_label("99999-9", "en"),
            Err(Error::UnknownConcept(_))
        ));
    }

    #[test]
    fn kind_distinguishes_descriptors() {
        let stw = sample();
        assert_eq!(stw.kind("6669"), Some(ConceptKind::Descriptor));
        assert_eq!(stw.kind("70582"), Some(ConceptKind::NonDescriptor));
        assert_eq!(stw.kind("missing"), None);
    }

    #[test]
    fn deprecation_flag() {
        let stw = sample();
        assert!(stw.is_deprecated("00000-0"));
        assert!(!stw.is_deprecated("6669"));
        assert!(!stw.is_deprecated("unknown"));
    }

    #[test]
    fn ambiguous_labels_report_concepts_sharing_a_label() {
        let stw = Thesaurus::builder()
            .descriptor("19019-5", "Tax")
            .descriptor("11507-2", "Duty")
            .alt_label("11507-2", "Tax")
            .descriptor("10025-6", "Economy")
            .build();
        let shared = stw.ambiguous_labels("en");
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, "Tax");
        assert_eq!(shared[0].1, vec!["11507-2", "19019-5"]);
        assert!(stw.ambiguous_labels("de").is_empty());
    }

    #[test]
    fn resource_cid_takes_trailing_segment() {
        assert_eq!(resource_cid("http://zbw.eu/stw/descriptor/19019-5"), "19019-5");
        assert_eq!(resource_cid("http://zbw.eu/stw/thsys/70582"), "70582");
        assert_eq!(resource_cid("19019-5"), "19019-5");
    }

    #[test]
    fn ntriples_loading() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "{}",
            concat!(
                "<http://zbw.eu/stw> <http://www.w3.org/2002/07/owl#versionInfo> \"9.04\" .\n",
                "<http://zbw.eu/stw/descriptor/14161-6> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://zbw.eu/namespaces/zbw-extensions/Descriptor> .\n",
                "<http://zbw.eu/stw/descriptor/14161-6> <http://www.w3.org/2004/02/skos/core#prefLabel> \"Fishery product\"@en .\n",
                "<http://zbw.eu/stw/descriptor/14161-6> <http://www.w3.org/2004/02/skos/core#prefLabel> \"Fischereiprodukt\"@de .\n",
                "<http://zbw.eu/stw/descriptor/14161-6> <http://www.w3.org/2004/02/skos/core#altLabel> \"Fish product\"@en .\n",
                "<http://zbw.eu/stw/thsys/70582> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2004/02/skos/core#Concept> .\n",
                "<http://zbw.eu/stw/thsys/70582> <http://www.w3.org/2004/02/skos/core#prefLabel> \"V.14 Fishery, aquatic products\"@en .\n",
                "<http://zbw.eu/stw/descriptor/00000-0> <http://www.w3.org/2002/07/owl#deprecated> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> .\n",
                "# a comment line\n",
                "<http://example.org/elsewhere> <http://example.org/p> \"ignored\" ."
            )
        )
        .unwrap();

        let stw = Thesaurus::from_ntriples(f.path()).unwrap();
        assert_eq!(stw.version(), Some("9.04"));
        assert_eq!(stw.preferred_label("14161-6", "en").unwrap(), "Fishery product");
        assert_eq!(stw.preferred_label("14161-6", "de").unwrap(), "Fischereiprodukt");
        assert_eq!(stw.kind("14161-6"), Some(ConceptKind::Descriptor));
        assert_eq!(stw.kind("70582"), Some(ConceptKind::NonDescriptor));
        assert!(stw.is_deprecated("00000-0"));
        assert_eq!(stw.kind("elsewhere"), None);
        let mut labels = stw.labels("14161-6", "en");
        labels.sort_unstable();
        assert_eq!(labels, vec!["Fish product", "Fishery product"]);
    }

    #[test]
    fn escaped_literals() {
        let t = parse_triple(
            r#"<http://zbw.eu/stw/descriptor/1> <http://www.w3.org/2004/02/skos/core#prefLabel> "a \"quoted\" label"@en ."#,
        )
        .unwrap();
        match t.object {
            Object::Literal { text, language } => {
                assert_eq!(text, "a \"quoted\" label");
                assert_eq!(language.as_deref(), Some("en"));
            }
            Object::Iri(_) => panic!("expected literal"),
        }
    }

    #[test]
    fn stw_location_requires_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            stw_location(Some(dir.path())),
            Err(Error::Config(_))
        ));
        let file = dir.path().join("stw.nt");
        std::fs::write(&file, "").unwrap();
        assert_eq!(stw_location(Some(&file)).unwrap(), file);
    }
}
