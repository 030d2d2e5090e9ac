//! Pairwise alignment with affine gap penalties.
//!
//! Three-matrix dynamic programming (Gotoh):
//!
//! - **H** best score of any alignment ending at `(i, j)`
//! - **E** best score ending with a gap in the predicted sequence (consumes `actual[j - 1]`)
//! - **F** best score ending with a gap in the actual sequence (consumes `predicted[i - 1]`)
//!
//! A gap of length `k` scores `gap_open + (k - 1) * gap_extend`, end gaps included.
//!
//! # Buffer reuse
//!
//! The engine keeps its DP matrices between calls, which is why [`AlignmentEngine::align`]
//! takes `&mut self`. Every worker builds its own engine; engines are never shared.

use super::matrix::{
    MatrixName,
    SubstitutionMatrix,
};
use crate::errors::{
    AlignmentError,
    ConfigError,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Gap symbol used in aligned sequences.
pub const GAP: u8 = b'-';

pub const DEFAULT_GAP_OPEN_SCORE: f64 = -2.0;
pub const DEFAULT_GAP_EXTEND_SCORE: f64 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    #[default]
    Global,
    Local,
}

/// Immutable aligner settings. A different setting means a different engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub substitution_matrix: MatrixName,
    #[serde(rename = "alignment_mode")]
    pub mode: AlignmentMode,
    pub gap_open_score: f64,
    pub gap_extend_score: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            substitution_matrix: MatrixName::Blosum62,
            mode: AlignmentMode::Global,
            gap_open_score: DEFAULT_GAP_OPEN_SCORE,
            gap_extend_score: DEFAULT_GAP_EXTEND_SCORE,
        }
    }
}

impl AlignmentConfig {
    pub fn new(mode: AlignmentMode, gap_open_score: f64, gap_extend_score: f64) -> Self {
        Self {
            substitution_matrix: MatrixName::Blosum62,
            mode,
            gap_open_score,
            gap_extend_score,
        }
    }

    pub fn with_mode(self, mode: AlignmentMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_matrix(self, substitution_matrix: MatrixName) -> Self {
        Self {
            substitution_matrix,
            ..self
        }
    }

    /// Gap scores must be finite and non-positive, and extending a gap may not cost more than
    /// opening one. A harsher extension would let the recurrences re-open a running gap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gap_open_score", self.gap_open_score),
            ("gap_extend_score", self.gap_extend_score),
        ] {
            if !value.is_finite() || value > 0.0 {
                return Err(ConfigError::InvalidGapScore { field, value });
            }
        }
        if self.gap_extend_score < self.gap_open_score {
            return Err(ConfigError::GapExtendBelowOpen {
                gap_open_score: self.gap_open_score,
                gap_extend_score: self.gap_extend_score,
            });
        }
        Ok(())
    }
}

/// The single top-scoring alignment of a `(predicted, actual)` pair.
///
/// An empty alignment (no columns, score 0) means no alignment was possible.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub score: f64,
    pub aligned_predicted: Vec<u8>,
    pub aligned_actual: Vec<u8>,
    pub mode: AlignmentMode,
    pub predicted_len: usize,
    identical_columns: usize,
    positive_columns: usize,
}

impl AlignmentResult {
    fn no_alignment(mode: AlignmentMode, predicted_len: usize) -> Self {
        Self {
            score: 0.0,
            aligned_predicted: Vec::new(),
            aligned_actual: Vec::new(),
            mode,
            predicted_len,
            identical_columns: 0,
            positive_columns: 0,
        }
    }

    /// Number of alignment columns, gaps included.
    pub fn len(&self) -> usize {
        self.aligned_predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_predicted.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.aligned_predicted
            .iter()
            .copied()
            .zip(self.aligned_actual.iter().copied())
    }

    /// Columns where both residues are the same letter.
    pub fn identical_columns(&self) -> usize {
        self.identical_columns
    }

    /// Columns with a strictly positive substitution score. Gap columns never count.
    pub fn positive_columns(&self) -> usize {
        self.positive_columns
    }

    /// Alignment length in global mode, predicted length in local mode.
    ///
    /// Local alignments can be shorter than either input, so they are
    /// normalized by the predicted sequence instead.
    pub fn normalization_length(&self) -> usize {
        match self.mode {
            AlignmentMode::Global => self.len(),
            AlignmentMode::Local => self.predicted_len,
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        match self.normalization_length() {
            0 => 0.0,
            n => value / n as f64,
        }
    }

    pub fn normalized_score(&self) -> f64 {
        self.normalize(self.score)
    }

    pub fn identity(&self) -> f64 {
        self.normalize(self.identical_columns as f64)
    }

    pub fn similarity(&self) -> f64 {
        self.normalize(self.positive_columns as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    H,
    E,
    F,
}

pub struct AlignmentEngine {
    config: AlignmentConfig,
    matrix: SubstitutionMatrix,
    h: Vec<f64>,
    e: Vec<f64>,
    f: Vec<f64>,
}

impl std::fmt::Debug for AlignmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl AlignmentEngine {
    pub fn new(config: AlignmentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            matrix: SubstitutionMatrix::load(config.substitution_matrix),
            h: Vec::new(),
            e: Vec::new(),
            f: Vec::new(),
        })
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }

    /// Aligns `predicted` (rows) against `actual` (columns).
    ///
    /// Ties between equally optimal paths are broken deterministically:
    /// diagonal first, then a gap in `predicted`, then a gap in `actual`.
    /// A local alignment starts from the first maximum in row-major order.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn align(
        &mut self,
        predicted: &[u8],
        actual: &[u8],
    ) -> Result<AlignmentResult, AlignmentError> {
        let mode = self.config.mode;
        let p = self.matrix.encode(predicted)?;
        let a = self.matrix.encode(actual)?;
        if p.is_empty() || a.is_empty() {
            return Ok(AlignmentResult::no_alignment(mode, p.len()));
        }

        let (best, end_i, end_j) = self.fill(&p, &a);
        if mode == AlignmentMode::Local && best <= 0.0 {
            return Ok(AlignmentResult::no_alignment(mode, p.len()));
        }
        Ok(self.traceback(predicted, actual, &p, &a, best, end_i, end_j))
    }

    fn fill(&mut self, p: &[usize], a: &[usize]) -> (f64, usize, usize) {
        let m = p.len();
        let n = a.len();
        let cols = n + 1;
        let size = (m + 1) * cols;
        let open = self.config.gap_open_score;
        let extend = self.config.gap_extend_score;
        let local = self.config.mode == AlignmentMode::Local;

        for buf in [&mut self.h, &mut self.e, &mut self.f] {
            buf.clear();
            buf.resize(size, f64::NEG_INFINITY);
        }
        let (h, e, f) = (&mut self.h, &mut self.e, &mut self.f);
        let idx = |i: usize, j: usize| i * cols + j;

        h[0] = 0.0;
        for i in 1..=m {
            if local {
                h[idx(i, 0)] = 0.0;
            } else {
                h[idx(i, 0)] = open + (i - 1) as f64 * extend;
                f[idx(i, 0)] = h[idx(i, 0)];
            }
        }
        for j in 1..=n {
            if local {
                h[idx(0, j)] = 0.0;
            } else {
                h[idx(0, j)] = open + (j - 1) as f64 * extend;
                e[idx(0, j)] = h[idx(0, j)];
            }
        }

        let mut best = f64::NEG_INFINITY;
        let mut best_cell = (m, n);
        for i in 1..=m {
            for j in 1..=n {
                let ev = (h[idx(i, j - 1)] + open).max(e[idx(i, j - 1)] + extend);
                let fv = (h[idx(i - 1, j)] + open).max(f[idx(i - 1, j)] + extend);
                let diag = h[idx(i - 1, j - 1)] + self.matrix.score_encoded(p[i - 1], a[j - 1]) as f64;
                let mut hv = diag.max(ev).max(fv);
                if local {
                    hv = hv.max(0.0);
                    if hv > best {
                        best = hv;
                        best_cell = (i, j);
                    }
                }
                e[idx(i, j)] = ev;
                f[idx(i, j)] = fv;
                h[idx(i, j)] = hv;
            }
        }

        if local {
            (best, best_cell.0, best_cell.1)
        } else {
            (h[idx(m, n)], m, n)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn traceback(
        &self,
        predicted: &[u8],
        actual: &[u8],
        p: &[usize],
        a: &[usize],
        score: f64,
        end_i: usize,
        end_j: usize,
    ) -> AlignmentResult {
        let cols = a.len() + 1;
        let idx = |i: usize, j: usize| i * cols + j;
        let open = self.config.gap_open_score;
        let local = self.config.mode == AlignmentMode::Local;
        let (h, e, f) = (&self.h, &self.e, &self.f);

        let mut aligned_predicted = Vec::with_capacity(p.len() + a.len());
        let mut aligned_actual = Vec::with_capacity(p.len() + a.len());
        let mut identical_columns = 0;
        let mut positive_columns = 0;

        let (mut i, mut j) = (end_i, end_j);
        let mut state = State::H;
        while i > 0 || j > 0 {
            match state {
                State::H => {
                    let here = h[idx(i, j)];
                    if local && here == 0.0 {
                        break;
                    }
                    if i > 0 && j > 0 {
                        let sub = self.matrix.score_encoded(p[i - 1], a[j - 1]);
                        if here == h[idx(i - 1, j - 1)] + sub as f64 {
                            aligned_predicted.push(predicted[i - 1]);
                            aligned_actual.push(actual[j - 1]);
                            if predicted[i - 1] == actual[j - 1] {
                                identical_columns += 1;
                            }
                            if sub > 0 {
                                positive_columns += 1;
                            }
                            i -= 1;
                            j -= 1;
                            continue;
                        }
                    }
                    state = if j > 0 && here == e[idx(i, j)] {
                        State::E
                    } else {
                        State::F
                    };
                }
                State::E => {
                    aligned_predicted.push(GAP);
                    aligned_actual.push(actual[j - 1]);
                    if e[idx(i, j)] == h[idx(i, j - 1)] + open {
                        state = State::H;
                    }
                    j -= 1;
                }
                State::F => {
                    aligned_predicted.push(predicted[i - 1]);
                    aligned_actual.push(GAP);
                    if f[idx(i, j)] == h[idx(i - 1, j)] + open {
                        state = State::H;
                    }
                    i -= 1;
                }
            }
        }

        aligned_predicted.reverse();
        aligned_actual.reverse();

        AlignmentResult {
            score,
            aligned_predicted,
            aligned_actual,
            mode: self.config.mode,
            predicted_len: p.len(),
            identical_columns,
            positive_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(mode: AlignmentMode, open: f64, extend: f64) -> AlignmentEngine {
        AlignmentEngine::new(AlignmentConfig::new(mode, open, extend)).unwrap()
    }

    #[test]
    fn test_global_with_insertion() {
        let mut eng = engine(AlignmentMode::Global, -2.0, -2.0);
        let res = eng.align(b"ITHQGEVDSR", b"LTHQEVDSR").unwrap();
        // I/L(2) T(5) H(8) Q(5) G/-(-2) E(5) V(4) D(6) S(4) R(5)
        assert_eq!(res.score, 42.0);
        assert_eq!(res.len(), 10);
        assert_eq!(res.aligned_predicted, b"ITHQGEVDSR".to_vec());
        assert_eq!(res.aligned_actual, b"LTHQ-EVDSR".to_vec());
        assert_eq!(res.identical_columns(), 8);
        assert_eq!(res.positive_columns(), 9);
        assert!((res.identity() - 0.8).abs() < 1e-12);
        assert!((res.similarity() - 0.9).abs() < 1e-12);
        assert!((res.normalized_score() - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_self_alignment() {
        let mut eng = engine(AlignmentMode::Global, -2.0, -2.0);
        let res = eng.align(b"PEPTIDEK", b"PEPTIDEK").unwrap();
        assert_eq!(res.len(), 8);
        assert_eq!(res.identity(), 1.0);
        assert_eq!(res.similarity(), 1.0);
    }

    #[test]
    fn test_affine_gap_cost() {
        let mut eng = engine(AlignmentMode::Global, -10.0, -1.0);
        let res = eng.align(b"WWWW", b"WW").unwrap();
        // 2 * W/W (11) + one gap of length 2 (-10 - 1)
        assert_eq!(res.score, 11.0);
        assert_eq!(res.len(), 4);
        assert_eq!(res.aligned_actual.iter().filter(|&&x| x == GAP).count(), 2);
        let gap_start = res.aligned_actual.iter().position(|&x| x == GAP).unwrap();
        assert_eq!(res.aligned_actual[gap_start + 1], GAP);
    }

    #[test]
    fn test_local_substring() {
        let mut eng = engine(AlignmentMode::Local, -10.0, -10.0);
        let res = eng.align(b"GSHP", b"VAMAMGSHPR").unwrap();
        assert_eq!(res.score, 25.0);
        assert_eq!(res.aligned_predicted, b"GSHP".to_vec());
        assert_eq!(res.aligned_actual, b"GSHP".to_vec());
        assert_eq!(res.identity(), 1.0);
        assert_eq!(res.similarity(), 1.0);
        assert!((res.normalized_score() - 25.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_normalizes_by_predicted_length() {
        let mut eng = engine(AlignmentMode::Local, -10.0, -10.0);
        let res = eng.align(b"WWGSHP", b"GSHPR").unwrap();
        assert_eq!(res.aligned_predicted, b"GSHP".to_vec());
        assert_eq!(res.normalization_length(), 6);
        assert!((res.identity() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_without_positive_region() {
        let mut eng = engine(AlignmentMode::Local, -10.0, -10.0);
        // G vs I scores -4 in BLOSUM62
        let res = eng.align(b"GGG", b"III").unwrap();
        assert!(res.is_empty());
        assert_eq!(res.score, 0.0);
        assert_eq!(res.identity(), 0.0);
        assert_eq!(res.similarity(), 0.0);
        assert_eq!(res.normalized_score(), 0.0);
    }

    #[test]
    fn test_empty_input_is_zero_result() {
        let mut eng = engine(AlignmentMode::Global, -2.0, -2.0);
        let res = eng.align(b"", b"PEPTIDE").unwrap();
        assert!(res.is_empty());
        assert_eq!(res.score, 0.0);
        assert_eq!(res.similarity(), 0.0);
    }

    #[test]
    fn test_unknown_residue_fails() {
        let mut eng = engine(AlignmentMode::Global, -2.0, -2.0);
        let err = eng.align(b"PEP1IDE", b"PEPTIDE").unwrap_err();
        assert_eq!(
            err,
            AlignmentError::UnknownResidue {
                residue: b'1',
                matrix: "BLOSUM62"
            }
        );
    }

    #[test]
    fn test_buffer_reuse_is_deterministic() {
        let mut eng = engine(AlignmentMode::Global, -2.0, -2.0);
        let first = eng.align(b"ELVISLIVESK", b"ELVISLIVESR").unwrap();
        eng.align(b"AAAAAAAAAAAAAAAAAAAA", b"W").unwrap();
        let second = eng.align(b"ELVISLIVESK", b"ELVISLIVESR").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_gap_scores() {
        assert!(AlignmentEngine::new(AlignmentConfig::new(AlignmentMode::Global, 1.0, -1.0)).is_err());
        assert!(
            AlignmentEngine::new(AlignmentConfig::new(AlignmentMode::Global, -1.0, f64::NAN)).is_err()
        );
    }

    #[test]
    fn test_extend_harsher_than_open_rejected() {
        // GSGGG vs AKQWHT would score -6 by re-opening the trailing gap; the affine optimum is -7
        let res = AlignmentEngine::new(AlignmentConfig::new(AlignmentMode::Global, -1.0, -3.0));
        assert!(matches!(
            res,
            Err(ConfigError::GapExtendBelowOpen {
                gap_open_score,
                gap_extend_score,
            }) if gap_open_score == -1.0 && gap_extend_score == -3.0
        ));
        assert!(
            AlignmentConfig::new(AlignmentMode::Local, -1.0, -3.0)
                .validate()
                .is_err()
        );
        assert!(AlignmentConfig::new(AlignmentMode::Global, -2.0, -2.0).validate().is_ok());
        assert!(AlignmentConfig::new(AlignmentMode::Global, -10.0, -1.0).validate().is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let conf: AlignmentConfig =
            serde_json::from_str(r#"{"alignment_mode": "local", "gap_open_score": -10}"#).unwrap();
        assert_eq!(conf.mode, AlignmentMode::Local);
        assert_eq!(conf.gap_open_score, -10.0);
        assert_eq!(conf.gap_extend_score, DEFAULT_GAP_EXTEND_SCORE);
        assert_eq!(conf.substitution_matrix, MatrixName::Blosum62);
    }
}
