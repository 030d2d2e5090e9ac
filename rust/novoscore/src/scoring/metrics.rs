//! The five per-pair metrics.
//!
//! The standalone functions each take their own engine, so callers can use a
//! different mode or gap regime per metric. [`MetricSet`] computes all of them
//! for a row with one alignment per distinct configuration.

use super::timings::ScoreTimings;
use crate::alignment::{
    AlignmentConfig,
    AlignmentEngine,
    AlignmentMode,
    AlignmentResult,
};
use crate::errors::{
    AlignmentError,
    ConfigError,
    NovoScoreError,
    Result,
};
use crate::models::{
    LabeledPair,
    Peptide,
    ScoreRecord,
};
use std::time::Instant;

pub fn raw_alignment_score(
    engine: &mut AlignmentEngine,
    predicted: &Peptide,
    actual: &Peptide,
) -> std::result::Result<f64, AlignmentError> {
    Ok(engine.align(predicted.as_bytes(), actual.as_bytes())?.score)
}

pub fn normalized_alignment_score(
    engine: &mut AlignmentEngine,
    predicted: &Peptide,
    actual: &Peptide,
) -> std::result::Result<f64, AlignmentError> {
    Ok(engine
        .align(predicted.as_bytes(), actual.as_bytes())?
        .normalized_score())
}

pub fn percent_identity(
    engine: &mut AlignmentEngine,
    predicted: &Peptide,
    actual: &Peptide,
) -> std::result::Result<f64, AlignmentError> {
    Ok(engine.align(predicted.as_bytes(), actual.as_bytes())?.identity())
}

pub fn percent_similarity(
    engine: &mut AlignmentEngine,
    predicted: &Peptide,
    actual: &Peptide,
) -> std::result::Result<f64, AlignmentError> {
    Ok(engine
        .align(predicted.as_bytes(), actual.as_bytes())?
        .similarity())
}

/// Unit-cost edit distance (insertions, deletions, substitutions).
pub fn levenshtein_distance(a: &[u8], b: &[u8]) -> usize {
    // Keep the shorter sequence as the row buffer.
    let (a, b) = if a.len() < b.len() { (b, a) } else { (a, b) };
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (diag + cost).min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }
    row[b.len()]
}

/// Per-worker scorer producing a full [`ScoreRecord`] per pair.
///
/// Holds one local and one global engine with the same matrix and gap
/// scores. The configured mode picks which of the two feeds the
/// mode-dependent columns, so each row is aligned exactly twice.
#[derive(Debug)]
pub struct MetricSet {
    mode: AlignmentMode,
    local: AlignmentEngine,
    global: AlignmentEngine,
    timings: ScoreTimings,
}

impl MetricSet {
    pub fn new(config: AlignmentConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            mode: config.mode,
            local: AlignmentEngine::new(config.with_mode(AlignmentMode::Local))?,
            global: AlignmentEngine::new(config.with_mode(AlignmentMode::Global))?,
            timings: ScoreTimings::default(),
        })
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn timings(&self) -> ScoreTimings {
        self.timings
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip(self), level = "trace")
    )]
    pub fn score(&mut self, pair: &LabeledPair) -> Result<ScoreRecord> {
        let predicted = pair.predicted.as_bytes();
        let actual = pair.actual.as_bytes();

        let st = Instant::now();
        let local = self
            .local
            .align(predicted, actual)
            .map_err(|e| NovoScoreError::from(e).with_row_id(pair.id))?;
        let global = self
            .global
            .align(predicted, actual)
            .map_err(|e| NovoScoreError::from(e).with_row_id(pair.id))?;
        self.timings.alignment += st.elapsed();

        let st = Instant::now();
        let levenshtein = levenshtein_distance(predicted, actual);
        self.timings.levenshtein += st.elapsed();
        self.timings.rows += 1;

        let configured: &AlignmentResult = match self.mode {
            AlignmentMode::Local => &local,
            AlignmentMode::Global => &global,
        };

        Ok(ScoreRecord {
            id: pair.id,
            predicted: pair.predicted.clone(),
            actual: pair.actual.clone(),
            tool_score: pair.tool_score,
            similarity: configured.similarity(),
            identity: configured.identity(),
            raw_alignment_score: configured.score,
            normalized_alignment_score: configured.normalized_score(),
            local_alignment_score: local.score,
            global_alignment_score: global.score,
            normalized_local_alignment_score: local.normalized_score(),
            normalized_global_alignment_score: global.normalized_score(),
            levenshtein,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pep(s: &str) -> Peptide {
        Peptide::new(s).unwrap()
    }

    fn global_engine() -> AlignmentEngine {
        AlignmentEngine::new(AlignmentConfig::default()).unwrap()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance(b"ITHQGEVDSR", b"LTHQEVDSR"), 2);
        assert_eq!(levenshtein_distance(b"ITHQEVDSR", b"LTHQEVDSR"), 1);
        assert_eq!(levenshtein_distance(b"GSHP", b"VAMAMGSHIR"), 7);
        assert_eq!(levenshtein_distance(b"", b"PEPTIDE"), 7);
        assert_eq!(levenshtein_distance(b"PEPTIDE", b""), 7);
        assert_eq!(levenshtein_distance(b"KITTEN", b"SITTING"), 3);
    }

    #[test]
    fn test_levenshtein_identity_and_symmetry() {
        let seqs: [&[u8]; 5] = [b"PEPTIDE", b"PEPTIDEK", b"ELVISLIVES", b"A", b"WWYWW"];
        for a in seqs {
            assert_eq!(levenshtein_distance(a, a), 0);
            for b in seqs {
                assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a));
            }
        }
    }

    #[test]
    fn test_standalone_metrics() {
        let mut eng = global_engine();
        let (p, a) = (pep("FELATVTEK"), pep("FQIATVTEK"));
        let identity = percent_identity(&mut eng, &p, &a).unwrap();
        let similarity = percent_similarity(&mut eng, &p, &a).unwrap();
        // E/Q and L/I are similar but not identical
        assert!((identity - 7.0 / 9.0).abs() < 1e-12);
        assert!((similarity - 1.0).abs() < 1e-12);
        let raw = raw_alignment_score(&mut eng, &p, &a).unwrap();
        let norm = normalized_alignment_score(&mut eng, &p, &a).unwrap();
        assert!((norm - raw / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_identity_of_self_is_one() {
        let mut eng = global_engine();
        for s in ["PEPTIDE", "LTHQEVDSR", "W", "GGGGGGGGGGGG"] {
            let p = pep(s);
            assert_eq!(percent_identity(&mut eng, &p, &p).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_metric_set_record() {
        let mut metrics = MetricSet::new(AlignmentConfig::default()).unwrap();
        let pair = LabeledPair {
            id: 1,
            predicted: pep("ITHQGEVDSR"),
            actual: pep("LTHQEVDSR"),
            tool_score: Some(88.0),
        };
        let rec = metrics.score(&pair).unwrap();
        assert_eq!(rec.id, 1);
        assert_eq!(rec.levenshtein, 2);
        assert_eq!(rec.tool_score, Some(88.0));
        assert!(rec.identity > 0.5 && rec.identity < 1.0);
        assert!(rec.similarity > 0.5 && rec.similarity < 1.0);
        assert_eq!(rec.raw_alignment_score, rec.global_alignment_score);
        assert_eq!(rec.normalized_alignment_score, rec.normalized_global_alignment_score);
        assert_eq!(rec.raw_alignment_score, 42.0);
        assert!(rec.local_alignment_score >= rec.global_alignment_score);
        assert_eq!(metrics.timings().rows, 1);
    }

    #[test]
    fn test_metric_set_local_mode() {
        let config = AlignmentConfig::new(AlignmentMode::Local, -10.0, -10.0);
        let mut metrics = MetricSet::new(config).unwrap();
        let pair = LabeledPair {
            id: 3,
            predicted: pep("GSHP"),
            actual: pep("VAMAMGSHPR"),
            tool_score: None,
        };
        let rec = metrics.score(&pair).unwrap();
        assert_eq!(rec.identity, 1.0);
        assert_eq!(rec.similarity, 1.0);
        assert_eq!(rec.raw_alignment_score, 25.0);
        assert_eq!(rec.raw_alignment_score, rec.local_alignment_score);
        assert!(rec.global_alignment_score < rec.local_alignment_score);
        assert_eq!(rec.levenshtein, 6);
    }
}
