//! Timing instrumentation for the scoring stages.
//!
//! Each worker keeps its own timings; they are summed after the chunks are joined.

use serde::Serialize;
use std::time::Duration;

/// Accumulated time per stage, summed over all rows and workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreTimings {
    /// Dynamic programming and traceback, both alignment modes.
    pub alignment: Duration,

    /// Edit distance.
    pub levenshtein: Duration,

    pub rows: usize,
}

impl Serialize for ScoreTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ScoreTimings", 3)?;
        state.serialize_field("alignment_ms", &self.alignment.as_millis())?;
        state.serialize_field("levenshtein_ms", &self.levenshtein.as_millis())?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}

impl std::ops::AddAssign for ScoreTimings {
    fn add_assign(&mut self, rhs: Self) {
        self.alignment += rhs.alignment;
        self.levenshtein += rhs.levenshtein;
        self.rows += rhs.rows;
    }
}

impl std::iter::Sum for ScoreTimings {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ScoreTimings::default(), |mut acc, x| {
            acc += x;
            acc
        })
    }
}
