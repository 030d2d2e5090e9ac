mod peptide;
mod score_record;
mod sequence_pair;

pub use peptide::{
    ActualLabel,
    Peptide,
    STANDARD_AMINO_ACIDS,
};
pub use score_record::ScoreRecord;
pub use sequence_pair::{
    LabeledPair,
    SequencePair,
    UnlabeledPrediction,
    partition_labeled,
};
