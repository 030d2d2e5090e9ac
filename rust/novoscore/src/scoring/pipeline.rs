//! Chunked parallel scoring.
//!
//! The input slice is cut into exactly `worker_count` contiguous chunks
//! (see [`chunk_ranges`]). Each chunk is scored sequentially by its own
//! [`MetricSet`] inside a pool that is built for this run only, and the chunk
//! outputs are concatenated in chunk order. Workers share nothing mutable.
//!
//! The first failing row aborts the whole run. Results of chunks that did
//! complete are discarded.

use super::metrics::MetricSet;
use super::timings::ScoreTimings;
use crate::alignment::{
    AlignmentConfig,
    AlignmentMode,
};
use crate::errors::{
    ConfigError,
    Result,
};
use crate::models::{
    LabeledPair,
    ScoreRecord,
};
use crate::utils::{
    chunk_ranges,
    worker_pool,
};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
};

pub const DEFAULT_WORKER_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub alignment: AlignmentConfig,
    pub worker_count: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl ScoringConfig {
    pub fn new(alignment: AlignmentConfig, worker_count: usize) -> Self {
        Self {
            alignment,
            worker_count,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        self.alignment.validate()
    }
}

#[derive(Debug, Clone)]
pub struct ScoringOrchestrator {
    config: ScoringConfig,
    progress: ProgressBar,
}

impl ScoringOrchestrator {
    pub fn new(config: ScoringConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            progress: ProgressBar::hidden(),
        })
    }

    /// Reports every scored row on `progress`.
    pub fn with_progress(self, progress: ProgressBar) -> Self {
        Self { progress, ..self }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores every pair, returning one record per pair in input order.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip(self, pairs), level = "debug")
    )]
    pub fn score(&self, pairs: &[LabeledPair]) -> Result<(Vec<ScoreRecord>, ScoreTimings)> {
        let num_pairs = pairs.len();
        let workers = self.config.worker_count;
        let ranges = chunk_ranges(num_pairs, workers)?;
        if num_pairs == 0 {
            return Ok((Vec::new(), ScoreTimings::default()));
        }
        debug!(
            "Scoring {} pairs in {} chunks of {} (last chunk {})",
            num_pairs,
            workers,
            num_pairs / workers,
            ranges.last().map(|r| r.len()).unwrap_or_default()
        );

        let pool = worker_pool(workers)?;
        let st = Instant::now();
        let chunks: Vec<(Vec<ScoreRecord>, ScoreTimings)> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| self.score_chunk(&pairs[range]))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut records = Vec::with_capacity(num_pairs);
        let mut timings = ScoreTimings::default();
        for (chunk_records, chunk_timings) in chunks {
            records.extend(chunk_records);
            timings += chunk_timings;
        }

        let elapsed = st.elapsed();
        let throughput = num_pairs as f64 / elapsed.as_secs_f64();
        info!(
            "Scoring {} pairs with {} workers took: {:?} throughput: {:#.1}/s",
            num_pairs, workers, elapsed, throughput
        );
        info!("{:?}", timings);

        Ok((records, timings))
    }

    fn score_chunk(&self, chunk: &[LabeledPair]) -> Result<(Vec<ScoreRecord>, ScoreTimings)> {
        let mut metrics = MetricSet::new(self.config.alignment)?;
        let mut out = Vec::with_capacity(chunk.len());
        for pair in chunk {
            out.push(metrics.score(pair)?);
            self.progress.inc(1);
        }
        Ok((out, metrics.timings()))
    }
}

/// One-shot scoring with the default substitution matrix.
pub fn score(
    pairs: &[LabeledPair],
    mode: AlignmentMode,
    gap_open_score: f64,
    gap_extend_score: f64,
    worker_count: usize,
) -> Result<Vec<ScoreRecord>> {
    let config = ScoringConfig::new(
        AlignmentConfig::new(mode, gap_open_score, gap_extend_score),
        worker_count,
    );
    let (records, _timings) = ScoringOrchestrator::new(config)?.score(pairs)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NovoScoreError;
    use crate::models::Peptide;

    fn pair(id: u64, predicted: &str, actual: &str) -> LabeledPair {
        LabeledPair {
            id,
            predicted: Peptide::new(predicted).unwrap(),
            actual: Peptide::new(actual).unwrap(),
            tool_score: None,
        }
    }

    fn sample_pairs() -> Vec<LabeledPair> {
        let seqs = [
            ("ITHQGEVDSR", "LTHQEVDSR"),
            ("PEPTIDE", "PEPTIDE"),
            ("FELATVTEK", "FQIATVTEK"),
            ("GSHP", "VAMAMGSHPR"),
            ("WWWW", "WW"),
            ("ELVISLIVES", "ELVISLIVESK"),
            ("AAAAK", "CCCCR"),
        ];
        (0..50)
            .map(|i| {
                let (p, a) = seqs[i % seqs.len()];
                pair(i as u64, p, a)
            })
            .collect()
    }

    #[test]
    fn test_order_is_independent_of_worker_count() {
        let pairs = sample_pairs();
        let single = score(&pairs, AlignmentMode::Global, -2.0, -2.0, 1).unwrap();
        for workers in [2, 3, 6, 64] {
            let multi = score(&pairs, AlignmentMode::Global, -2.0, -2.0, workers).unwrap();
            assert_eq!(single, multi, "workers = {}", workers);
        }
        for (i, rec) in single.iter().enumerate() {
            assert_eq!(rec.id, pairs[i].id);
        }
    }

    #[test]
    fn test_timings_count_every_row() {
        let pairs = sample_pairs();
        let orch = ScoringOrchestrator::new(ScoringConfig::default()).unwrap();
        let (records, timings) = orch.score(&pairs).unwrap();
        assert_eq!(records.len(), pairs.len());
        assert_eq!(timings.rows, pairs.len());
    }

    #[test]
    fn test_empty_input() {
        let out = score(&[], AlignmentMode::Local, -10.0, -10.0, 4).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            score(&sample_pairs(), AlignmentMode::Global, -2.0, -2.0, 0),
            Err(NovoScoreError::Config(ConfigError::ZeroWorkers))
        ));
        assert!(matches!(
            score(&sample_pairs(), AlignmentMode::Global, 2.0, -2.0, 2),
            Err(NovoScoreError::Config(ConfigError::InvalidGapScore { .. }))
        ));
    }

    #[test]
    fn test_progress_reaches_total() {
        let pairs = sample_pairs();
        let bar = ProgressBar::hidden();
        bar.set_length(pairs.len() as u64);
        let orch = ScoringOrchestrator::new(ScoringConfig::default())
            .unwrap()
            .with_progress(bar.clone());
        orch.score(&pairs).unwrap();
        assert_eq!(bar.position(), pairs.len() as u64);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ScoringConfig = serde_json::from_str(r#"{"worker_count": 2}"#).unwrap();
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.alignment, AlignmentConfig::default());
    }
}
