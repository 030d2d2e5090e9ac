//! Ways of pairing an unlabeled prediction with an inclusion-list sequence.
//!
//! [`AlignmentMatchStrategy`] looks for a candidate the prediction aligns to
//! with perfect similarity. [`SubstringMatchStrategy`] treats predictions as
//! short tags and looks them up literally inside the candidates. Which ones
//! run, and in which priority, is decided by the producer
//! (see [`crate::Producer::match_strategies`]).

use crate::alignment::{
    AlignmentConfig,
    AlignmentEngine,
};
use crate::errors::{
    AlignmentError,
    Result,
};
use crate::models::Peptide;
use crate::utils::{
    chunk_ranges,
    worker_pool,
};
use indicatif::ProgressBar;
use rayon::prelude::*;
use regex::{
    Regex,
    RegexBuilder,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;
use tracing::debug;

// Thousands of tags in one alternation blow past the regex defaults.
const TAG_PATTERN_SIZE_LIMIT: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Alignment,
    Substring,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Alignment => "alignment",
            MatchSource::Substring => "substring",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait MatchStrategy: Send + Sync + std::fmt::Debug {
    fn source(&self) -> MatchSource;

    /// The inclusion sequence `predicted` resolves to, if any.
    ///
    /// This looks at `predicted` alone. Strategies where predictions in one batch interact,
    /// such as substring shadowing in [`MatchStrategy::match_all`], can resolve the same
    /// prediction differently there.
    fn find_match(&self, predicted: &Peptide, candidates: &[Peptide]) -> Result<Option<Peptide>>;

    /// Resolves every prediction against the same candidate list.
    ///
    /// The output has one entry per prediction, in the same order.
    fn match_all(
        &self,
        predictions: &[Peptide],
        candidates: &[Peptide],
        worker_count: usize,
        progress: &ProgressBar,
    ) -> Result<Vec<Option<Peptide>>>;
}

/// First candidate, in list order, with a similarity of exactly 1.0.
///
/// The search stops at the first hit, so with repeated or overlapping
/// candidates the answer depends on the order of the list.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentMatchStrategy {
    config: AlignmentConfig,
}

impl AlignmentMatchStrategy {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    fn first_perfect_match(
        engine: &mut AlignmentEngine,
        predicted: &Peptide,
        candidates: &[Peptide],
    ) -> std::result::Result<Option<Peptide>, AlignmentError> {
        for candidate in candidates {
            let aln = engine.align(predicted.as_bytes(), candidate.as_bytes())?;
            if aln.similarity() == 1.0 {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }
}

impl MatchStrategy for AlignmentMatchStrategy {
    fn source(&self) -> MatchSource {
        MatchSource::Alignment
    }

    fn find_match(&self, predicted: &Peptide, candidates: &[Peptide]) -> Result<Option<Peptide>> {
        let mut engine = AlignmentEngine::new(self.config)?;
        Ok(Self::first_perfect_match(
            &mut engine,
            predicted,
            candidates,
        )?)
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "debug")
    )]
    fn match_all(
        &self,
        predictions: &[Peptide],
        candidates: &[Peptide],
        worker_count: usize,
        progress: &ProgressBar,
    ) -> Result<Vec<Option<Peptide>>> {
        let ranges = chunk_ranges(predictions.len(), worker_count)?;
        let pool = worker_pool(worker_count)?;
        let chunks: Vec<Vec<Option<Peptide>>> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| -> Result<Vec<Option<Peptide>>> {
                    let mut engine = AlignmentEngine::new(self.config)?;
                    let mut out = Vec::with_capacity(range.len());
                    for predicted in &predictions[range] {
                        out.push(Self::first_perfect_match(
                            &mut engine,
                            predicted,
                            candidates,
                        )?);
                        progress.inc(1);
                    }
                    Ok(out)
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(chunks.into_iter().flatten().collect())
    }
}

/// Literal tag lookup for producers that emit short sequence tags.
///
/// Every candidate is searched once for all tags at the same time. A
/// candidate takes the tag found at its leftmost position; when several tags
/// start there, the one listed first wins. A tag then resolves to the first
/// candidate, in list order, that took it. Tags that were shadowed in every
/// candidate stay unmatched even if they occur somewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatchStrategy;

impl SubstringMatchStrategy {
    pub fn new() -> Self {
        Self
    }

    fn tag_pattern(tags: &[Peptide]) -> Result<Option<Regex>> {
        if tags.is_empty() {
            return Ok(None);
        }
        let alternation = tags
            .iter()
            .map(|t| regex::escape(t.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        let re = RegexBuilder::new(&format!("(?:{})", alternation))
            .size_limit(TAG_PATTERN_SIZE_LIMIT)
            .dfa_size_limit(TAG_PATTERN_SIZE_LIMIT)
            .build()?;
        Ok(Some(re))
    }

    /// The tag each candidate carries, in candidate order.
    pub fn extract_tags<'a>(
        &self,
        tags: &[Peptide],
        candidates: &'a [Peptide],
    ) -> Result<Vec<(&'a Peptide, Option<String>)>> {
        let Some(re) = Self::tag_pattern(tags)? else {
            return Ok(candidates.iter().map(|c| (c, None)).collect());
        };
        Ok(candidates
            .iter()
            .map(|c| (c, re.find(c.as_str()).map(|m| m.as_str().to_string())))
            .collect())
    }
}

impl MatchStrategy for SubstringMatchStrategy {
    fn source(&self) -> MatchSource {
        MatchSource::Substring
    }

    /// First candidate containing `predicted`. With a single tag nothing can shadow it, so
    /// this can differ from [`MatchStrategy::match_all`] over a larger batch.
    fn find_match(&self, predicted: &Peptide, candidates: &[Peptide]) -> Result<Option<Peptide>> {
        Ok(self
            .extract_tags(std::slice::from_ref(predicted), candidates)?
            .into_iter()
            .find_map(|(candidate, tag)| tag.map(|_| candidate.clone())))
    }

    fn match_all(
        &self,
        predictions: &[Peptide],
        candidates: &[Peptide],
        _worker_count: usize,
        progress: &ProgressBar,
    ) -> Result<Vec<Option<Peptide>>> {
        let mut tag_to_candidate: HashMap<String, Peptide> = HashMap::new();
        for (candidate, tag) in self.extract_tags(predictions, candidates)? {
            if let Some(tag) = tag {
                tag_to_candidate
                    .entry(tag)
                    .or_insert_with(|| candidate.clone());
            }
        }
        debug!(
            "{} of {} tags found in {} candidates",
            tag_to_candidate.len(),
            predictions.len(),
            candidates.len()
        );
        progress.inc(predictions.len() as u64);
        Ok(predictions
            .iter()
            .map(|p| tag_to_candidate.get(p.as_str()).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentMode;

    fn peps(seqs: &[&str]) -> Vec<Peptide> {
        seqs.iter().map(|s| Peptide::new(*s).unwrap()).collect()
    }

    #[test]
    fn test_first_perfect_candidate_wins() {
        let strategy = AlignmentMatchStrategy::new(AlignmentConfig::default());
        let candidates = peps(&["AAAA", "PEPTIDE", "PEPTIDE"]);
        let predicted = Peptide::new("PEPTIDE").unwrap();
        let found = strategy.find_match(&predicted, &candidates).unwrap();
        assert_eq!(found, Some(candidates[1].clone()));
    }

    #[test]
    fn test_similar_but_not_identical_is_perfect() {
        // I/L and E/Q are positive in BLOSUM62
        let strategy = AlignmentMatchStrategy::new(AlignmentConfig::default());
        let candidates = peps(&["GGGGGGGGG", "FQIATVTEK"]);
        let predicted = Peptide::new("FELATVTEK").unwrap();
        let found = strategy.find_match(&predicted, &candidates).unwrap();
        assert_eq!(found.unwrap().as_str(), "FQIATVTEK");
    }

    #[test]
    fn test_no_perfect_candidate() {
        let strategy = AlignmentMatchStrategy::new(AlignmentConfig::default());
        let candidates = peps(&["AAAA", "PEPTIDEK"]);
        let predicted = Peptide::new("PEPTIDE").unwrap();
        assert_eq!(strategy.find_match(&predicted, &candidates).unwrap(), None);
    }

    #[test]
    fn test_local_mode_finds_embedded_prediction() {
        let config = AlignmentConfig::new(AlignmentMode::Local, -10.0, -10.0);
        let strategy = AlignmentMatchStrategy::new(config);
        let candidates = peps(&["KKKKKK", "VAMAMGSHPR"]);
        let predicted = Peptide::new("GSHP").unwrap();
        let found = strategy.find_match(&predicted, &candidates).unwrap();
        assert_eq!(found.unwrap().as_str(), "VAMAMGSHPR");
    }

    #[test]
    fn test_match_all_preserves_order_across_workers() {
        let strategy = AlignmentMatchStrategy::new(AlignmentConfig::default());
        let candidates = peps(&["PEPTIDE", "ELVISLIVES", "LTHQEVDSR"]);
        let predictions = peps(&[
            "ELVISLIVES",
            "KKKK",
            "PEPTIDE",
            "LTHQEVDSR",
            "ELVISIIVES",
            "WWWW",
            "PEPTLDE",
        ]);
        let bar = ProgressBar::hidden();
        let single = strategy
            .match_all(&predictions, &candidates, 1, &bar)
            .unwrap();
        let multi = strategy
            .match_all(&predictions, &candidates, 4, &bar)
            .unwrap();
        assert_eq!(single, multi);
        let got: Vec<Option<&str>> = single.iter().map(|m| m.as_ref().map(|p| p.as_str())).collect();
        assert_eq!(
            got,
            vec![
                Some("ELVISLIVES"),
                None,
                Some("PEPTIDE"),
                Some("LTHQEVDSR"),
                Some("ELVISLIVES"),
                None,
                Some("PEPTIDE"),
            ]
        );
        assert_eq!(bar.position(), 2 * predictions.len() as u64);
    }

    #[test]
    fn test_substring_find_match() {
        let strategy = SubstringMatchStrategy::new();
        let candidates = peps(&["AAAAK", "VAMAMGSHPR", "GSHPK"]);
        let tag = Peptide::new("GSH").unwrap();
        let found = strategy.find_match(&tag, &candidates).unwrap();
        assert_eq!(found.unwrap().as_str(), "VAMAMGSHPR");
    }

    #[test]
    fn test_leftmost_tag_shadows_later_tags() {
        let strategy = SubstringMatchStrategy::new();
        let tags = peps(&["SHP", "MAM", "AMG"]);
        let candidates = peps(&["VAMAMGSHPR", "GSHPK", "KKKK"]);
        let extracted: Vec<Option<String>> = strategy
            .extract_tags(&tags, &candidates)
            .unwrap()
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        // MAM starts at 2, AMG at 3, SHP at 6
        assert_eq!(
            extracted,
            vec![Some("MAM".to_string()), Some("SHP".to_string()), None]
        );

        let matched = strategy
            .match_all(&tags, &candidates, 1, &ProgressBar::hidden())
            .unwrap();
        assert_eq!(matched[0].as_ref().unwrap().as_str(), "GSHPK");
        assert_eq!(matched[1].as_ref().unwrap().as_str(), "VAMAMGSHPR");
        assert_eq!(matched[2], None);
    }

    #[test]
    fn test_single_tag_lookup_ignores_batch_shadowing() {
        let strategy = SubstringMatchStrategy::new();
        let tags = peps(&["SHP", "MAM"]);
        let candidates = peps(&["VAMAMGSHPR", "GSHPK"]);
        let alone = strategy.find_match(&tags[0], &candidates).unwrap();
        assert_eq!(alone.unwrap().as_str(), "VAMAMGSHPR");

        // MAM takes VAMAMGSHPR in the batch, leaving SHP with GSHPK
        let batch = strategy
            .match_all(&tags, &candidates, 1, &ProgressBar::hidden())
            .unwrap();
        assert_eq!(batch[0].as_ref().unwrap().as_str(), "GSHPK");
        assert_eq!(batch[1].as_ref().unwrap().as_str(), "VAMAMGSHPR");
    }

    #[test]
    fn test_same_start_prefers_first_listed_tag() {
        let strategy = SubstringMatchStrategy::new();
        let tags = peps(&["GSH", "GSHPR"]);
        let candidates = peps(&["VAMAMGSHPR"]);
        let extracted = strategy.extract_tags(&tags, &candidates).unwrap();
        assert_eq!(extracted[0].1.as_deref(), Some("GSH"));
    }

    #[test]
    fn test_no_tags() {
        let strategy = SubstringMatchStrategy::new();
        let candidates = peps(&["PEPTIDE"]);
        let out = strategy
            .match_all(&[], &candidates, 2, &ProgressBar::hidden())
            .unwrap();
        assert!(out.is_empty());
    }
}
