mod engine;
mod matrix;

pub use engine::{
    AlignmentConfig,
    AlignmentEngine,
    AlignmentMode,
    AlignmentResult,
    DEFAULT_GAP_EXTEND_SCORE,
    DEFAULT_GAP_OPEN_SCORE,
    GAP,
};
pub use matrix::{
    MatrixName,
    SubstitutionMatrix,
};
