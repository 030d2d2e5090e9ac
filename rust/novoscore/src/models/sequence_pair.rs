use super::peptide::{
    ActualLabel,
    Peptide,
};

/// One normalized prediction row, as produced by the per-tool parsers.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePair {
    /// Scan or spectrum identifier. Not unique: tag producers emit several rows per scan.
    pub id: u64,
    pub predicted: Peptide,
    pub actual: ActualLabel,
    /// The producer's own confidence, passed through untouched.
    pub tool_score: Option<f64>,
}

/// A prediction with a ground-truth (or inclusion-list) sequence to score against.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPair {
    pub id: u64,
    pub predicted: Peptide,
    pub actual: Peptide,
    pub tool_score: Option<f64>,
}

/// A prediction without ground truth, waiting for an inclusion-list verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlabeledPrediction {
    pub id: u64,
    pub predicted: Peptide,
    pub tool_score: Option<f64>,
}

impl SequencePair {
    pub fn new(id: u64, predicted: Peptide, actual: ActualLabel) -> Self {
        Self {
            id,
            predicted,
            actual,
            tool_score: None,
        }
    }

    pub fn with_tool_score(mut self, score: f64) -> Self {
        self.tool_score = Some(score);
        self
    }

    pub fn into_labeled(self) -> Result<LabeledPair, UnlabeledPrediction> {
        match self.actual {
            ActualLabel::Labeled(actual) => Ok(LabeledPair {
                id: self.id,
                predicted: self.predicted,
                actual,
                tool_score: self.tool_score,
            }),
            ActualLabel::Blank => Err(UnlabeledPrediction {
                id: self.id,
                predicted: self.predicted,
                tool_score: self.tool_score,
            }),
        }
    }
}

impl UnlabeledPrediction {
    /// Substitutes a matched inclusion-list sequence for the missing label.
    pub fn with_actual(&self, actual: Peptide) -> LabeledPair {
        LabeledPair {
            id: self.id,
            predicted: self.predicted.clone(),
            actual,
            tool_score: self.tool_score,
        }
    }
}

/// Splits rows into scorable pairs and blank-label rows, keeping the input order of each.
pub fn partition_labeled(
    pairs: impl IntoIterator<Item = SequencePair>,
) -> (Vec<LabeledPair>, Vec<UnlabeledPrediction>) {
    let mut labeled = Vec::new();
    let mut unlabeled = Vec::new();
    for pair in pairs {
        match pair.into_labeled() {
            Ok(x) => labeled.push(x),
            Err(x) => unlabeled.push(x),
        }
    }
    (labeled, unlabeled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pep(s: &str) -> Peptide {
        Peptide::new(s).unwrap()
    }

    #[test]
    fn test_partition_keeps_order() {
        let rows = vec![
            SequencePair::new(1, pep("PEPTIDE"), ActualLabel::Labeled(pep("PEPTIDE"))),
            SequencePair::new(2, pep("SAMPLER"), ActualLabel::Blank),
            SequencePair::new(3, pep("ELVISK"), ActualLabel::Labeled(pep("ELVISR"))),
            SequencePair::new(4, pep("AAAK"), ActualLabel::Blank).with_tool_score(0.5),
        ];
        let (labeled, unlabeled) = partition_labeled(rows);
        assert_eq!(labeled.iter().map(|x| x.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(unlabeled.iter().map(|x| x.id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(unlabeled[1].tool_score, Some(0.5));
    }

    #[test]
    fn test_with_actual() {
        let row = UnlabeledPrediction {
            id: 7,
            predicted: pep("HQEV"),
            tool_score: Some(12.0),
        };
        let labeled = row.with_actual(pep("LTHQEVDSR"));
        assert_eq!(labeled.id, 7);
        assert_eq!(labeled.actual.as_str(), "LTHQEVDSR");
        assert_eq!(labeled.tool_score, Some(12.0));
    }
}
