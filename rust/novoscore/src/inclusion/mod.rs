mod matcher;
mod strategy;

pub use matcher::{
    InclusionMatch,
    InclusionMatcher,
    InclusionOutcome,
    InclusionVerdict,
};
pub use strategy::{
    AlignmentMatchStrategy,
    MatchSource,
    MatchStrategy,
    SubstringMatchStrategy,
};
