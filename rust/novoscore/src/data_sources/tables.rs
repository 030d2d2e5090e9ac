//! Tab-separated tables: the parsed prediction table and the inclusion list
//! on the way in, score and match tables on the way out.

use crate::errors::{
    TableReadingError,
    TableWritingError,
};
use crate::models::{
    ActualLabel,
    Peptide,
    SequencePair,
};
use csv::StringRecord;
use serde::{
    Deserialize,
    Serialize,
};
use std::fs::File;
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::Path;
use tracing::{
    debug,
    info,
};

const ID_COLUMN: &str = "ID";
const SCAN_COLUMN: &str = "Scan";
const PREDICTED_COLUMN: &str = "Predicted";
const SEQUENCE_COLUMN: &str = "Sequence";

#[derive(Debug, Deserialize)]
struct ParsedRow {
    #[serde(rename = "ID", default)]
    id: Option<u64>,
    #[serde(rename = "Scan", default)]
    scan: Option<u64>,
    #[serde(rename = "Predicted")]
    predicted: String,
    #[serde(rename = "Actual", default)]
    actual: String,
    #[serde(rename = "Score", default, deserialize_with = "csv::invalid_option")]
    tool_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InclusionRow {
    #[serde(rename = "Sequence")]
    sequence: String,
}

fn open_tsv(path: &Path) -> Result<csv::Reader<BufReader<File>>, TableReadingError> {
    let file = File::open(path).map_err(|e| TableReadingError::FileReadingError {
        source: e,
        path: path.to_path_buf(),
    })?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(BufReader::new(file)))
}

fn headers(
    reader: &mut csv::Reader<BufReader<File>>,
    path: &Path,
) -> Result<StringRecord, TableReadingError> {
    reader
        .headers()
        .cloned()
        .map_err(|e| TableReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })
}

fn require_column(
    headers: &StringRecord,
    column: &'static str,
    path: &Path,
) -> Result<(), TableReadingError> {
    if headers.iter().any(|h| h == column) {
        Ok(())
    } else {
        Err(TableReadingError::MissingColumn {
            column,
            path: path.to_path_buf(),
        })
    }
}

/// Reads a normalized prediction table.
///
/// The identifier comes from `ID`, or from `Scan` when there is no `ID`
/// column. A single space (or an empty cell, or no `Actual` column at all)
/// marks a row without ground truth. A `Score` cell that is missing or not a
/// number reads as no tool score.
pub fn read_parsed_table(path: &Path) -> Result<Vec<SequencePair>, TableReadingError> {
    let mut reader = open_tsv(path)?;
    let headers = headers(&mut reader, path)?;
    if require_column(&headers, ID_COLUMN, path).is_err() {
        require_column(&headers, SCAN_COLUMN, path).map_err(|_| {
            TableReadingError::MissingColumn {
                column: ID_COLUMN,
                path: path.to_path_buf(),
            }
        })?;
    }
    require_column(&headers, PREDICTED_COLUMN, path)?;

    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<ParsedRow>().enumerate() {
        let row_num = i + 1;
        let row = row.map_err(|e| TableReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
        let invalid = |source| TableReadingError::InvalidSequence {
            source,
            row: row_num,
            path: path.to_path_buf(),
        };
        let Some(id) = row.id.or(row.scan) else {
            return Err(TableReadingError::MissingColumn {
                column: ID_COLUMN,
                path: path.to_path_buf(),
            });
        };
        let predicted = Peptide::new(row.predicted).map_err(invalid)?;
        let actual = ActualLabel::parse(&row.actual).map_err(invalid)?;
        out.push(SequencePair {
            id,
            predicted,
            actual,
            tool_score: row.tool_score,
        });
    }
    info!("Read {} prediction rows from {}", out.len(), path.display());
    Ok(out)
}

/// Reads the `Sequence` column of an inclusion list, keeping file order and duplicates.
pub fn read_inclusion_list(path: &Path) -> Result<Vec<Peptide>, TableReadingError> {
    let mut reader = open_tsv(path)?;
    let headers = headers(&mut reader, path)?;
    require_column(&headers, SEQUENCE_COLUMN, path)?;

    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<InclusionRow>().enumerate() {
        let row = row.map_err(|e| TableReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
        let seq = Peptide::new(row.sequence).map_err(|source| {
            TableReadingError::InvalidSequence {
                source,
                row: i + 1,
                path: path.to_path_buf(),
            }
        })?;
        out.push(seq);
    }
    info!(
        "Read {} inclusion sequences from {}",
        out.len(),
        path.display()
    );
    Ok(out)
}

/// A row of an output table.
///
/// `COLUMNS` is the header line and must list the serde field names in serialization order.
pub trait TableRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl<T: TableRow + ?Sized> TableRow for &T {
    const COLUMNS: &'static [&'static str] = T::COLUMNS;
}

/// Writes `rows` as a tab-separated table. The header is always written, even with no rows.
pub fn write_tsv<T: TableRow>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<usize, TableWritingError> {
    let file = File::create(path).map_err(|e| TableWritingError::FileWritingError {
        source: e,
        path: path.to_path_buf(),
    })?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer
        .write_record(T::COLUMNS)
        .map_err(|e| TableWritingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
    let mut written = 0;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| TableWritingError::CsvError {
                source: e,
                path: path.to_path_buf(),
            })?;
        written += 1;
    }
    let mut inner = writer
        .into_inner()
        .map_err(|e| TableWritingError::FileWritingError {
            source: e.into_error(),
            path: path.to_path_buf(),
        })?;
    inner
        .flush()
        .map_err(|e| TableWritingError::FileWritingError {
            source: e,
            path: path.to_path_buf(),
        })?;
    debug!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}
