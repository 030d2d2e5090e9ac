use crate::errors::SequenceError;
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use std::sync::Arc;

/// The 20 standard amino acids, one-letter codes.
pub const STANDARD_AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// A non-empty sequence over the standard amino-acid alphabet.
///
/// Modifications are expected to be stripped before construction, so this
/// only validates the residues. Cloning is cheap (shared `Arc<str>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peptide(Arc<str>);

impl Peptide {
    pub fn new(seq: impl Into<Arc<str>>) -> Result<Self, SequenceError> {
        let seq: Arc<str> = seq.into();
        if seq.is_empty() {
            return Err(SequenceError::Empty);
        }
        if let Some((position, residue)) = seq
            .char_indices()
            .find(|(_, c)| !c.is_ascii() || !STANDARD_AMINO_ACIDS.contains(&(*c as u8)))
        {
            return Err(SequenceError::InvalidResidue {
                residue,
                position,
                sequence: seq.to_string(),
            });
        }
        Ok(Self(seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        // Construction rejects empty sequences.
        false
    }
}

impl std::fmt::Display for Peptide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Peptide {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Peptide {
    type Error = SequenceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Peptide::new(value)
    }
}

impl TryFrom<String> for Peptide {
    type Error = SequenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Peptide::new(value)
    }
}

impl Serialize for Peptide {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Peptide {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Peptide::new(s).map_err(serde::de::Error::custom)
    }
}

/// Ground-truth label of a prediction.
///
/// Input tables mark "no ground truth" with a single space. That is kept
/// distinct from a real label here so unlabeled rows cannot be scored by
/// accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActualLabel {
    Labeled(Peptide),
    Blank,
}

impl ActualLabel {
    /// Parses a raw table cell; whitespace-only (including the `" "` sentinel) is blank.
    pub fn parse(raw: &str) -> Result<Self, SequenceError> {
        if raw.trim().is_empty() {
            Ok(ActualLabel::Blank)
        } else {
            Peptide::new(raw).map(ActualLabel::Labeled)
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ActualLabel::Blank)
    }

    pub fn as_peptide(&self) -> Option<&Peptide> {
        match self {
            ActualLabel::Labeled(p) => Some(p),
            ActualLabel::Blank => None,
        }
    }
}
