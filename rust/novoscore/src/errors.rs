use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    Empty,
    InvalidResidue {
        residue: char,
        position: usize,
        sequence: String,
    },
}

impl std::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceError::Empty => write!(f, "Empty peptide sequence"),
            SequenceError::InvalidResidue {
                residue,
                position,
                sequence,
            } => write!(
                f,
                "Invalid residue {:?} at position {} in sequence {:?}",
                residue, position, sequence
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    UnknownResidue { residue: u8, matrix: &'static str },
}

impl std::fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::UnknownResidue { residue, matrix } => write!(
                f,
                "Residue {:?} is not part of the {} alphabet",
                *residue as char, matrix
            ),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ZeroWorkers,
    InvalidGapScore { field: &'static str, value: f64 },
    GapExtendBelowOpen { gap_open_score: f64, gap_extend_score: f64 },
    UnknownMatrix { name: String },
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroWorkers => write!(f, "worker_count must be at least 1"),
            ConfigError::InvalidGapScore { field, value } => write!(
                f,
                "{} must be a finite, non-positive number (got {})",
                field, value
            ),
            ConfigError::GapExtendBelowOpen {
                gap_open_score,
                gap_extend_score,
            } => write!(
                f,
                "gap_extend_score ({}) must not be lower than gap_open_score ({})",
                gap_extend_score, gap_open_score
            ),
            ConfigError::UnknownMatrix { name } => {
                write!(f, "Unknown substitution matrix {:?}", name)
            }
            ConfigError::ThreadPool(e) => write!(f, "Unable to build worker pool: {}", e),
        }
    }
}

#[derive(Debug)]
pub enum TableReadingError {
    FileReadingError {
        source: std::io::Error,
        path: PathBuf,
    },
    CsvError {
        source: csv::Error,
        path: PathBuf,
    },
    MissingColumn {
        column: &'static str,
        path: PathBuf,
    },
    InvalidSequence {
        source: SequenceError,
        row: usize,
        path: PathBuf,
    },
}

impl std::fmt::Display for TableReadingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableReadingError::FileReadingError { source, path } => {
                write!(f, "Error reading {}: {}", path.display(), source)
            }
            TableReadingError::CsvError { source, path } => {
                write!(f, "Error parsing {}: {}", path.display(), source)
            }
            TableReadingError::MissingColumn { column, path } => {
                write!(f, "Missing column {:?} in {}", column, path.display())
            }
            TableReadingError::InvalidSequence { source, row, path } => {
                write!(f, "Row {} of {}: {}", row, path.display(), source)
            }
        }
    }
}

#[derive(Debug)]
pub enum TableWritingError {
    FileWritingError {
        source: std::io::Error,
        path: PathBuf,
    },
    CsvError {
        source: csv::Error,
        path: PathBuf,
    },
}

impl std::fmt::Display for TableWritingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableWritingError::FileWritingError { source, path } => {
                write!(f, "Error writing {}: {}", path.display(), source)
            }
            TableWritingError::CsvError { source, path } => {
                write!(f, "Error serializing {}: {}", path.display(), source)
            }
        }
    }
}

#[derive(Debug)]
pub enum NovoScoreError {
    Sequence(SequenceError),
    Alignment {
        source: AlignmentError,
        row_id: Option<u64>,
    },
    Config(ConfigError),
    TableReading(TableReadingError),
    TableWriting(TableWritingError),
    TagPattern(regex::Error),
}

impl std::fmt::Display for NovoScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NovoScoreError::Sequence(e) => write!(f, "{}", e),
            NovoScoreError::Alignment {
                source,
                row_id: Some(id),
            } => write!(f, "Alignment failed for row {}: {}", id, source),
            NovoScoreError::Alignment { source, row_id: None } => {
                write!(f, "Alignment failed: {}", source)
            }
            NovoScoreError::Config(e) => write!(f, "Invalid configuration: {}", e),
            NovoScoreError::TableReading(e) => write!(f, "{}", e),
            NovoScoreError::TableWriting(e) => write!(f, "{}", e),
            NovoScoreError::TagPattern(e) => {
                write!(f, "Unable to build tag extraction pattern: {}", e)
            }
        }
    }
}

impl std::error::Error for NovoScoreError {}

pub type Result<T> = std::result::Result<T, NovoScoreError>;

impl NovoScoreError {
    /// Attaches the identifier of the row being scored, if none is set yet.
    pub fn with_row_id(self, id: u64) -> Self {
        match self {
            NovoScoreError::Alignment {
                source,
                row_id: None,
            } => NovoScoreError::Alignment {
                source,
                row_id: Some(id),
            },
            other => other,
        }
    }
}

impl From<SequenceError> for NovoScoreError {
    fn from(x: SequenceError) -> Self {
        Self::Sequence(x)
    }
}

impl From<AlignmentError> for NovoScoreError {
    fn from(x: AlignmentError) -> Self {
        Self::Alignment {
            source: x,
            row_id: None,
        }
    }
}

impl From<ConfigError> for NovoScoreError {
    fn from(x: ConfigError) -> Self {
        Self::Config(x)
    }
}

impl From<rayon::ThreadPoolBuildError> for NovoScoreError {
    fn from(x: rayon::ThreadPoolBuildError) -> Self {
        Self::Config(ConfigError::ThreadPool(x))
    }
}

impl From<TableReadingError> for NovoScoreError {
    fn from(x: TableReadingError) -> Self {
        Self::TableReading(x)
    }
}

impl From<TableWritingError> for NovoScoreError {
    fn from(x: TableWritingError) -> Self {
        Self::TableWriting(x)
    }
}

impl From<regex::Error> for NovoScoreError {
    fn from(x: regex::Error) -> Self {
        Self::TagPattern(x)
    }
}
