//! The de novo tools whose output can be scored, and their presets.

use crate::alignment::{
    AlignmentConfig,
    AlignmentMode,
};
use crate::inclusion::{
    AlignmentMatchStrategy,
    MatchStrategy,
    SubstringMatchStrategy,
};
use serde::{
    Deserialize,
    Serialize,
};

const TAG_GAP_SCORE: f64 = -10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Producer {
    Peaks,
    Novor,
    DeepNovo,
    DirecTag,
}

impl Producer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Producer::Peaks => "peaks",
            Producer::Novor => "novor",
            Producer::DeepNovo => "deepnovo",
            Producer::DirecTag => "directag",
        }
    }

    /// Tag producers emit several short fragments per spectrum instead of
    /// one full-length peptide.
    pub fn is_tag_based(&self) -> bool {
        matches!(self, Producer::DirecTag)
    }

    pub fn alignment_config(&self) -> AlignmentConfig {
        if self.is_tag_based() {
            AlignmentConfig::new(AlignmentMode::Local, TAG_GAP_SCORE, TAG_GAP_SCORE)
        } else {
            AlignmentConfig::default()
        }
    }

    pub fn aggregates_by_default(&self) -> bool {
        self.is_tag_based()
    }

    /// Match strategies in priority order.
    pub fn match_strategies(&self, alignment: AlignmentConfig) -> Vec<Box<dyn MatchStrategy>> {
        let mut out: Vec<Box<dyn MatchStrategy>> =
            vec![Box::new(AlignmentMatchStrategy::new(alignment))];
        if self.is_tag_based() {
            out.push(Box::new(SubstringMatchStrategy::new()));
        }
        out
    }
}

impl std::fmt::Display for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Producer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "peaks" => Ok(Producer::Peaks),
            "novor" => Ok(Producer::Novor),
            "deepnovo" => Ok(Producer::DeepNovo),
            "directag" => Ok(Producer::DirecTag),
            _ => Err(format!(
                "Invalid producer: '{}'. Valid options: peaks, novor, deepnovo, directag",
                s
            )),
        }
    }
}
