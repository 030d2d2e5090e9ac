//! Resolution of blank-label rows against an inclusion list.
//!
//! Every distinct predicted sequence is matched once per strategy. Rows are
//! then reduced to one verdict per identifier: strategies are consulted in
//! priority order and, within a strategy, the first row of the identifier
//! with a match wins. Identifiers without any match are dropped.

use super::strategy::{
    MatchSource,
    MatchStrategy,
};
use crate::alignment::AlignmentConfig;
use crate::data_sources::TableRow;
use crate::errors::{
    ConfigError,
    Result,
};
use crate::models::{
    LabeledPair,
    Peptide,
    UnlabeledPrediction,
};
use crate::producer::Producer;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::{
    HashMap,
    HashSet,
};
use std::time::Instant;
use tracing::info;

/// A distinct prediction and the inclusion sequence it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InclusionMatch {
    #[serde(rename = "Predicted")]
    pub predicted: Peptide,
    #[serde(rename = "Inclusion")]
    pub inclusion: Peptide,
    #[serde(rename = "Strategy")]
    pub source: MatchSource,
}

impl TableRow for InclusionMatch {
    const COLUMNS: &'static [&'static str] = &["Predicted", "Inclusion", "Strategy"];
}

/// The row kept for one identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionVerdict {
    pub row: UnlabeledPrediction,
    pub inclusion: Peptide,
    pub source: MatchSource,
}

#[derive(Debug, Clone, Default)]
pub struct InclusionOutcome {
    /// Per strategy, in priority order, then in first-seen prediction order.
    pub matches: Vec<InclusionMatch>,
    /// One per matched identifier, in input row order.
    pub verdicts: Vec<InclusionVerdict>,
    pub unmatched_ids: usize,
}

impl InclusionOutcome {
    /// Verdicts as scorable pairs, the inclusion sequence standing in for the label.
    pub fn labeled_pairs(&self) -> Vec<LabeledPair> {
        self.verdicts
            .iter()
            .map(|v| v.row.with_actual(v.inclusion.clone()))
            .collect()
    }
}

#[derive(Debug)]
pub struct InclusionMatcher {
    strategies: Vec<Box<dyn MatchStrategy>>,
    worker_count: usize,
    progress: ProgressBar,
}

impl InclusionMatcher {
    pub fn new(
        strategies: Vec<Box<dyn MatchStrategy>>,
        worker_count: usize,
    ) -> std::result::Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(Self {
            strategies,
            worker_count,
            progress: ProgressBar::hidden(),
        })
    }

    pub fn for_producer(
        producer: Producer,
        alignment: AlignmentConfig,
        worker_count: usize,
    ) -> std::result::Result<Self, ConfigError> {
        alignment.validate()?;
        Self::new(producer.match_strategies(alignment), worker_count)
    }

    /// Reports every matched distinct prediction, once per strategy, on `progress`.
    pub fn with_progress(self, progress: ProgressBar) -> Self {
        Self { progress, ..self }
    }

    pub fn strategies(&self) -> impl Iterator<Item = MatchSource> + '_ {
        self.strategies.iter().map(|s| s.source())
    }

    /// The first strategy, in priority order, that resolves `predicted`.
    pub fn find_match(
        &self,
        predicted: &Peptide,
        candidates: &[Peptide],
    ) -> Result<Option<(Peptide, MatchSource)>> {
        for strategy in &self.strategies {
            if let Some(found) = strategy.find_match(predicted, candidates)? {
                return Ok(Some((found, strategy.source())));
            }
        }
        Ok(None)
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "debug")
    )]
    pub fn resolve(
        &self,
        rows: &[UnlabeledPrediction],
        candidates: &[Peptide],
    ) -> Result<InclusionOutcome> {
        let st = Instant::now();
        let mut seen = HashSet::new();
        let unique: Vec<Peptide> = rows
            .iter()
            .filter(|r| seen.insert(r.predicted.clone()))
            .map(|r| r.predicted.clone())
            .collect();
        info!(
            "Matching {} distinct predictions from {} rows against {} inclusion sequences",
            unique.len(),
            rows.len(),
            candidates.len()
        );

        let mut matches = Vec::new();
        let mut per_strategy: Vec<(MatchSource, HashMap<Peptide, Peptide>)> =
            Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let found =
                strategy.match_all(&unique, candidates, self.worker_count, &self.progress)?;
            let mut lookup = HashMap::new();
            for (predicted, inclusion) in unique.iter().zip(found) {
                if let Some(inclusion) = inclusion {
                    matches.push(InclusionMatch {
                        predicted: predicted.clone(),
                        inclusion: inclusion.clone(),
                        source: strategy.source(),
                    });
                    lookup.insert(predicted.clone(), inclusion);
                }
            }
            info!(
                "{} strategy matched {} of {} distinct predictions",
                strategy.source(),
                lookup.len(),
                unique.len()
            );
            per_strategy.push((strategy.source(), lookup));
        }

        // id -> (row index, inclusion, source)
        let mut chosen: HashMap<u64, (usize, Peptide, MatchSource)> = HashMap::new();
        for (source, lookup) in &per_strategy {
            for (idx, row) in rows.iter().enumerate() {
                if chosen.contains_key(&row.id) {
                    continue;
                }
                if let Some(inclusion) = lookup.get(&row.predicted) {
                    chosen.insert(row.id, (idx, inclusion.clone(), *source));
                }
            }
        }

        let total_ids = rows.iter().map(|r| r.id).collect::<HashSet<_>>().len();
        let mut kept: Vec<(usize, Peptide, MatchSource)> = chosen.into_values().collect();
        kept.sort_unstable_by_key(|(idx, _, _)| *idx);
        let verdicts: Vec<InclusionVerdict> = kept
            .into_iter()
            .map(|(idx, inclusion, source)| InclusionVerdict {
                row: rows[idx].clone(),
                inclusion,
                source,
            })
            .collect();

        info!(
            "Resolved {} of {} identifiers in {:?}",
            verdicts.len(),
            total_ids,
            st.elapsed()
        );
        Ok(InclusionOutcome {
            matches,
            unmatched_ids: total_ids - verdicts.len(),
            verdicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentMode;

    fn pep(s: &str) -> Peptide {
        Peptide::new(s).unwrap()
    }

    fn row(id: u64, predicted: &str) -> UnlabeledPrediction {
        UnlabeledPrediction {
            id,
            predicted: pep(predicted),
            tool_score: Some(id as f64),
        }
    }

    #[test]
    fn test_find_match_prefers_alignment() {
        let matcher = InclusionMatcher::for_producer(
            Producer::DirecTag,
            Producer::DirecTag.alignment_config(),
            2,
        )
        .unwrap();
        let candidates = vec![pep("KGSHPK"), pep("GSHP")];
        let (found, source) = matcher
            .find_match(&pep("GSHP"), &candidates)
            .unwrap()
            .unwrap();
        // Local alignment already hits the first candidate.
        assert_eq!(found.as_str(), "KGSHPK");
        assert_eq!(source, MatchSource::Alignment);
    }

    #[test]
    fn test_full_length_producer_resolution() {
        let matcher =
            InclusionMatcher::for_producer(Producer::Peaks, AlignmentConfig::default(), 3)
                .unwrap();
        let candidates = vec![pep("AAAA"), pep("PEPTIDE"), pep("LTHQEVDSR")];
        let rows = vec![
            row(7, "WWWWW"),
            row(7, "PEPTLDE"),
            row(3, "LTHQEVDSR"),
            row(9, "KKKK"),
            row(7, "PEPTIDE"),
        ];
        let outcome = matcher.resolve(&rows, &candidates).unwrap();
        assert_eq!(outcome.unmatched_ids, 1);
        assert_eq!(outcome.verdicts.len(), 2);
        assert_eq!(outcome.verdicts[0].row, rows[1]);
        assert_eq!(outcome.verdicts[0].inclusion.as_str(), "PEPTIDE");
        assert_eq!(outcome.verdicts[1].row, rows[2]);

        let pairs = outcome.labeled_pairs();
        assert_eq!(pairs[0].id, 7);
        assert_eq!(pairs[0].predicted.as_str(), "PEPTLDE");
        assert_eq!(pairs[0].actual.as_str(), "PEPTIDE");
        assert_eq!(pairs[0].tool_score, Some(7.0));

        let matched: Vec<&str> = outcome.matches.iter().map(|m| m.predicted.as_str()).collect();
        assert_eq!(matched, vec!["PEPTLDE", "LTHQEVDSR", "PEPTIDE"]);
    }

    #[test]
    fn test_tag_producer_falls_back_to_substring() {
        let config = AlignmentConfig::new(AlignmentMode::Local, -10.0, -10.0);
        let matcher = InclusionMatcher::for_producer(Producer::DirecTag, config, 2).unwrap();
        let candidates = vec![pep("VAMAMGSHPR"), pep("ELVISLIVESK")];
        let rows = vec![
            // R/W is negative, no perfect local alignment, but SHP is literal
            row(1, "SHPW"),
            row(1, "SHP"),
            row(2, "WWW"),
            row(4, "VISL"),
        ];
        let outcome = matcher.resolve(&rows, &candidates).unwrap();
        let kept: Vec<(u64, &str, MatchSource)> = outcome
            .verdicts
            .iter()
            .map(|v| (v.row.id, v.row.predicted.as_str(), v.source))
            .collect();
        assert_eq!(
            kept,
            vec![
                (1, "SHP", MatchSource::Alignment),
                (4, "VISL", MatchSource::Alignment),
            ]
        );
        assert_eq!(outcome.unmatched_ids, 1);
    }

    #[test]
    fn test_substring_only_identifier() {
        let matcher = InclusionMatcher::new(
            Producer::DirecTag.match_strategies(AlignmentConfig::default()),
            1,
        )
        .unwrap();
        let candidates = vec![pep("VAMAMGSHPR")];
        // Global alignment of a short tag never reaches perfect similarity
        let rows = vec![row(5, "GSH")];
        let outcome = matcher.resolve(&rows, &candidates).unwrap();
        assert_eq!(outcome.verdicts.len(), 1);
        assert_eq!(outcome.verdicts[0].source, MatchSource::Substring);
        assert_eq!(outcome.verdicts[0].inclusion.as_str(), "VAMAMGSHPR");
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].source, MatchSource::Substring);
    }

    #[test]
    fn test_alignment_beats_earlier_substring_row() {
        let matcher = InclusionMatcher::new(
            Producer::DirecTag.match_strategies(AlignmentConfig::default()),
            1,
        )
        .unwrap();
        let candidates = vec![pep("VAMAMGSHPR")];
        // GSH only matches as a substring, K/R keeps the full-length row perfect
        let rows = vec![row(1, "GSH"), row(1, "VAMAMGSHPK")];
        let outcome = matcher.resolve(&rows, &candidates).unwrap();
        assert_eq!(outcome.verdicts.len(), 1);
        assert_eq!(outcome.verdicts[0].row, rows[1]);
        assert_eq!(outcome.verdicts[0].source, MatchSource::Alignment);
        assert_eq!(outcome.verdicts[0].inclusion.as_str(), "VAMAMGSHPR");
        assert_eq!(outcome.unmatched_ids, 0);

        let found: Vec<(&str, MatchSource)> = outcome
            .matches
            .iter()
            .map(|m| (m.predicted.as_str(), m.source))
            .collect();
        assert_eq!(
            found,
            vec![
                ("VAMAMGSHPK", MatchSource::Alignment),
                ("GSH", MatchSource::Substring),
            ]
        );
    }

    #[test]
    fn test_empty_rows() {
        let matcher =
            InclusionMatcher::for_producer(Producer::Novor, AlignmentConfig::default(), 4)
                .unwrap();
        let outcome = matcher.resolve(&[], &[pep("PEPTIDE")]).unwrap();
        assert!(outcome.verdicts.is_empty());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_ids, 0);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            InclusionMatcher::for_producer(Producer::Peaks, AlignmentConfig::default(), 0),
            Err(ConfigError::ZeroWorkers)
        ));
    }
}
