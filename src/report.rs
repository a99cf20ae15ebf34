//! Delimited prediction report writing.
//!
//! One row per kept prediction: `doc_id<TAB>cid[<TAB>score][<TAB>label]`,
//! columns conditionally present per [`ReportOptions`]. The sink is flushed
//! after each document's rows and once more at the end, so a consumer
//! tailing the file sees complete documents.

use std::io::Write;

use crate::batch::DocumentPredictions;
use crate::Result;

/// Column toggles for the prediction report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Append the probability score column.
    pub include_score: bool,
    /// Append the label text column.
    pub additional_info: bool,
}

/// Write per-document topic predictions to a sink.
///
/// The predictions already carry their document ids; the writer does no
/// re-association. An empty predictions slice writes nothing but still
/// flushes.
pub fn write_topics_csv<W: Write>(
    sink: &mut W,
    predictions: &[DocumentPredictions],
    options: &ReportOptions,
) -> Result<()> {
    for document in predictions {
        for topic in &document.topics {
            write!(sink, "{}\t{}", document.doc_id, topic.cid)?;
            if options.include_score {
                write!(sink, "\t{}", topic.probability)?;
            }
            if options.additional_info {
                write!(sink, "\t{}", topic.label)?;
            }
            writeln!(sink)?;
        }
        sink.flush()?;
    }
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TopicPrediction;

    fn predictions() -> Vec<DocumentPredictions> {
        vec![
            DocumentPredictions {
                doc_id: "800000001".to_string(),
                topics: vec![
                    TopicPrediction {
                        cid: "10025-6".to_string(),
                        label: "Economy".to_string(),
                        probability: 0.75,
                    },
                    TopicPrediction {
                        cid: "14161-6".to_string(),
                        label: "Fishery product".to_string(),
                        probability: 0.5,
                    },
                ],
            },
            DocumentPredictions {
                doc_id: "800000002".to_string(),
                topics: vec![TopicPrediction {
                    cid: "12964-6".to_string(),
                    label: "Working hours".to_string(),
                    probability: 0.25,
                }],
            },
        ]
    }

    #[test]
    fn minimal_rows() {
        let mut out = Vec::new();
        write_topics_csv(&mut out, &predictions(), &ReportOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "800000001\t10025-6\n800000001\t14161-6\n800000002\t12964-6\n"
        );
    }

    #[test]
    fn optional_columns_in_order() {
        let mut out = Vec::new();
        let options = ReportOptions {
            include_score: true,
            additional_info: true,
        };
        write_topics_csv(&mut out, &predictions(), &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "800000001\t10025-6\t0.75\tEconomy");
    }

    #[test]
    fn score_only() {
        let mut out = Vec::new();
        let options = ReportOptions {
            include_score: true,
            additional_info: false,
        };
        write_topics_csv(&mut out, &predictions(), &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().all(|l| l.split('\t').count() == 3));
    }

    #[test]
    fn empty_input_writes_nothing() {
        let mut out = Vec::new();
        write_topics_csv(&mut out, &[], &ReportOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn document_without_topics_writes_no_rows() {
        let mut out = Vec::new();
        let preds = vec![DocumentPredictions {
            doc_id: "x".to_string(),
            topics: Vec::new(),
        }];
        write_topics_csv(&mut out, &preds, &ReportOptions::default()).unwrap();
        assert!(out.is_empty());
    }
}
