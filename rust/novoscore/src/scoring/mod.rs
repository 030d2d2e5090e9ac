pub mod metrics;
pub mod pipeline;
pub mod timings;

pub use metrics::{
    MetricSet,
    levenshtein_distance,
    normalized_alignment_score,
    percent_identity,
    percent_similarity,
    raw_alignment_score,
};
pub use pipeline::{
    DEFAULT_WORKER_COUNT,
    ScoringConfig,
    ScoringOrchestrator,
    score,
};
pub use timings::ScoreTimings;
