pub mod aggregate;
pub mod alignment;
pub mod data_sources;
pub mod errors;
pub mod inclusion;
pub mod models;
pub mod producer;
pub mod scoring;
pub mod utils;

pub use aggregate::{
    GroupedScores,
    Metric,
    group_and_average,
};
pub use alignment::{
    AlignmentConfig,
    AlignmentEngine,
    AlignmentMode,
    AlignmentResult,
    MatrixName,
};
pub use errors::{
    NovoScoreError,
    Result,
};
pub use inclusion::{
    InclusionMatcher,
    InclusionOutcome,
};
pub use models::{
    ActualLabel,
    LabeledPair,
    Peptide,
    ScoreRecord,
    SequencePair,
    UnlabeledPrediction,
};
pub use producer::Producer;
pub use scoring::{
    MetricSet,
    ScoringConfig,
    ScoringOrchestrator,
};
