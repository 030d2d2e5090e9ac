//! Per-identifier averaging.
//!
//! Tag producers report several rows per scan. Grouping collapses them into
//! one row of arithmetic means per identifier, dropping the sequence columns.

use crate::data_sources::TableRow;
use crate::models::ScoreRecord;
use serde::Serialize;
use std::collections::BTreeMap;

const NUM_METRICS: usize = 9;

/// The numeric columns of a [`ScoreRecord`] that are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Similarity,
    Identity,
    Alignment,
    NormalizedAlignment,
    LocalAlignment,
    GlobalAlignment,
    NormalizedLocalAlignment,
    NormalizedGlobalAlignment,
    Levenshtein,
}

impl Metric {
    pub const ALL: [Metric; NUM_METRICS] = [
        Metric::Similarity,
        Metric::Identity,
        Metric::Alignment,
        Metric::NormalizedAlignment,
        Metric::LocalAlignment,
        Metric::GlobalAlignment,
        Metric::NormalizedLocalAlignment,
        Metric::NormalizedGlobalAlignment,
        Metric::Levenshtein,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Metric::Similarity => "Similarity",
            Metric::Identity => "Identity",
            Metric::Alignment => "Alignment",
            Metric::NormalizedAlignment => "Normalized Alignment",
            Metric::LocalAlignment => "Local Alignment",
            Metric::GlobalAlignment => "Global Alignment",
            Metric::NormalizedLocalAlignment => "Normalized Local Alignment",
            Metric::NormalizedGlobalAlignment => "Normalized Global Alignment",
            Metric::Levenshtein => "Levenshtein",
        }
    }

    pub fn value(&self, record: &ScoreRecord) -> f64 {
        match self {
            Metric::Similarity => record.similarity,
            Metric::Identity => record.identity,
            Metric::Alignment => record.raw_alignment_score,
            Metric::NormalizedAlignment => record.normalized_alignment_score,
            Metric::LocalAlignment => record.local_alignment_score,
            Metric::GlobalAlignment => record.global_alignment_score,
            Metric::NormalizedLocalAlignment => record.normalized_local_alignment_score,
            Metric::NormalizedGlobalAlignment => record.normalized_global_alignment_score,
            Metric::Levenshtein => record.levenshtein as f64,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Column means of every record sharing one identifier.
///
/// `tool_score` is averaged over the rows that carry one and is `None` when
/// none of them does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedScores {
    #[serde(rename = "ID")]
    pub id: u64,
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
    pub levenshtein: f64,
    #[serde(rename = "Rows")]
    pub rows: usize,
}

impl TableRow for GroupedScores {
    const COLUMNS: &'static [&'static str] = &[
        "ID",
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
        "Rows",
    ];
}

impl GroupedScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Similarity => self.similarity,
            Metric::Identity => self.identity,
            Metric::Alignment => self.raw_alignment_score,
            Metric::NormalizedAlignment => self.normalized_alignment_score,
            Metric::LocalAlignment => self.local_alignment_score,
            Metric::GlobalAlignment => self.global_alignment_score,
            Metric::NormalizedLocalAlignment => self.normalized_local_alignment_score,
            Metric::NormalizedGlobalAlignment => self.normalized_global_alignment_score,
            Metric::Levenshtein => self.levenshtein,
        }
    }
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    sums: [f64; NUM_METRICS],
    tool_score_sum: f64,
    tool_score_rows: usize,
    rows: usize,
}

impl GroupAccumulator {
    fn fold(&mut self, record: &ScoreRecord) {
        for metric in Metric::ALL {
            self.sums[metric.index()] += metric.value(record);
        }
        if let Some(score) = record.tool_score {
            self.tool_score_sum += score;
            self.tool_score_rows += 1;
        }
        self.rows += 1;
    }

    fn finish(self, id: u64) -> GroupedScores {
        let n = self.rows as f64;
        let mean = |m: Metric| self.sums[m.index()] / n;
        GroupedScores {
            id,
            tool_score: (self.tool_score_rows > 0)
                .then(|| self.tool_score_sum / self.tool_score_rows as f64),
            similarity: mean(Metric::Similarity),
            identity: mean(Metric::Identity),
            raw_alignment_score: mean(Metric::Alignment),
            normalized_alignment_score: mean(Metric::NormalizedAlignment),
            local_alignment_score: mean(Metric::LocalAlignment),
            global_alignment_score: mean(Metric::GlobalAlignment),
            normalized_local_alignment_score: mean(Metric::NormalizedLocalAlignment),
            normalized_global_alignment_score: mean(Metric::NormalizedGlobalAlignment),
            levenshtein: mean(Metric::Levenshtein),
            rows: self.rows,
        }
    }
}

/// Means per identifier, ordered by identifier.
pub fn group_and_average(records: &[ScoreRecord]) -> BTreeMap<u64, GroupedScores> {
    let mut groups: BTreeMap<u64, GroupAccumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.id).or_default().fold(record);
    }
    groups
        .into_iter()
        .map(|(id, acc)| (id, acc.finish(id)))
        .collect()
}
