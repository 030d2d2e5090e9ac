use super::peptide::Peptide;
use crate::data_sources::TableRow;
use serde::Serialize;

/// All metrics for one scored pair. Field order is the output column order.
///
/// `raw_alignment_score`, `normalized_alignment_score`, `identity` and
/// `similarity` are computed under the configured alignment mode. The
/// local/global columns are always reported, with the same gap penalties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Predicted")]
    pub predicted: Peptide,
    #[serde(rename = "Actual")]
    pub actual: Peptide,
    #[serde(rename = "Score")]
    pub tool_score: Option<f64>,
    #[serde(rename = "Similarity")]
    pub similarity: f64,
    #[serde(rename = "Identity")]
    pub identity: f64,
    #[serde(rename = "Alignment")]
    pub raw_alignment_score: f64,
    #[serde(rename = "Normalized Alignment")]
    pub normalized_alignment_score: f64,
    #[serde(rename = "Local Alignment")]
    pub local_alignment_score: f64,
    #[serde(rename = "Global Alignment")]
    pub global_alignment_score: f64,
    #[serde(rename = "Normalized Local Alignment")]
    pub normalized_local_alignment_score: f64,
    #[serde(rename = "Normalized Global Alignment")]
    pub normalized_global_alignment_score: f64,
    #[serde(rename = "Levenshtein")]
    pub levenshtein: usize,
}

impl TableRow for ScoreRecord {
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Predicted",
        "Actual",
        "Score",
        "Similarity",
        "Identity",
        "Alignment",
        "Normalized Alignment",
        "Local Alignment",
        "Global Alignment",
        "Normalized Local Alignment",
        "Normalized Global Alignment",
        "Levenshtein",
    ];
}
