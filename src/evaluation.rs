/**
This module flattens the resolved gold digits and the predicted digits into two parallel label
sequences and scores them with the classification report.
*/
use crate::config::EvalConfig;
use crate::digits::Digit;
use crate::gold::{AlignmentError, GoldError, GoldMap};
use crate::metrics::{classification_report, ComputationError};
use crate::prediction::PredictionMap;
use crate::reporter::Reporter;
use crate::resolver::ResidualWildcardError;
use crate::theory::TheoryError;
use std::error::Error;
use std::fmt::Display;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The gold and predicted digits of a word do not have the same length.
pub struct LengthMismatchError {
    pub word: String,
    pub gold: usize,
    pub pred: usize,
}

impl Display for LengthMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The gold and predicted digits of the word {:?} have different lengths: {} and {}",
            self.word, self.gold, self.pred
        )
    }
}

impl Error for LengthMismatchError {}

#[derive(Debug)]
/// Every failure of the evaluation pipeline.
pub enum EvaluationError {
    Theory(TheoryError),
    Gold(GoldError),
    ResidualWildcard(ResidualWildcardError),
    LengthMismatch(LengthMismatchError),
    Computation(ComputationError),
}

impl EvaluationError {
    /// The alignment error, if the gold rule lines are not aligned with the segmentation lines.
    pub fn alignment(&self) -> Option<&AlignmentError> {
        match self {
            Self::Gold(GoldError::Alignment(err)) => Some(err),
            _ => None,
        }
    }
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Theory(err) => Display::fmt(err, f),
            Self::Gold(err) => Display::fmt(err, f),
            Self::ResidualWildcard(err) => Display::fmt(err, f),
            Self::LengthMismatch(err) => Display::fmt(err, f),
            Self::Computation(err) => Display::fmt(err, f),
        }
    }
}

/// `Display` already prints the wrapped error, so the chain starts below it.
impl Error for EvaluationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Theory(err) => err.source(),
            Self::Gold(err) => err.source(),
            Self::ResidualWildcard(err) => err.source(),
            Self::LengthMismatch(err) => err.source(),
            Self::Computation(err) => err.source(),
        }
    }
}

impl From<TheoryError> for EvaluationError {
    fn from(value: TheoryError) -> Self {
        Self::Theory(value)
    }
}
impl From<GoldError> for EvaluationError {
    fn from(value: GoldError) -> Self {
        Self::Gold(value)
    }
}
impl From<AlignmentError> for EvaluationError {
    fn from(value: AlignmentError) -> Self {
        Self::Gold(GoldError::Alignment(value))
    }
}
impl From<ResidualWildcardError> for EvaluationError {
    fn from(value: ResidualWildcardError) -> Self {
        Self::ResidualWildcard(value)
    }
}
impl From<LengthMismatchError> for EvaluationError {
    fn from(value: LengthMismatchError) -> Self {
        Self::LengthMismatch(value)
    }
}
impl From<ComputationError> for EvaluationError {
    fn from(value: ComputationError) -> Self {
        Self::Computation(value)
    }
}

/// Parallel label sequences of the words found in both the gold and the predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedLabels {
    pub y_true: Vec<Digit>,
    pub y_pred: Vec<Digit>,
    /// Number of words contributing to the labels.
    pub words: usize,
    /// Number of gold words without prediction.
    pub skipped: usize,
}

/// Flattens the digits of the words found in both maps, in sorted word order. Gold words without
/// prediction are skipped and predicted words absent from the gold are ignored.
pub fn align_labels(
    gold: &GoldMap,
    pred: &PredictionMap,
) -> Result<AlignedLabels, EvaluationError> {
    let mut words: Vec<&String> = gold.keys().collect();
    words.sort_unstable();
    let mut labels = AlignedLabels::default();
    for word in words {
        let gold_digits = &gold[word];
        let Some(pred_digits) = pred.get(word) else {
            debug!(word = %word, "gold word without prediction, skipped");
            labels.skipped += 1;
            continue;
        };
        if gold_digits.len() != pred_digits.len() {
            return Err(LengthMismatchError {
                word: word.clone(),
                gold: gold_digits.len(),
                pred: pred_digits.len(),
            }
            .into());
        }
        if gold_digits.has_unresolved() {
            warn!(word = %word, gold = %gold_digits, "'?' in gold digits");
        }
        labels.y_true.extend_from_slice(gold_digits);
        labels.y_pred.extend_from_slice(pred_digits);
        labels.words += 1;
    }
    debug!(
        words = labels.words,
        skipped = labels.skipped,
        labels = labels.y_true.len(),
        "aligned labels"
    );
    Ok(labels)
}

/// Scores the predictions against the resolved gold digits.
pub fn evaluate(
    gold: &GoldMap,
    pred: &PredictionMap,
    config: EvalConfig,
) -> Result<Reporter, EvaluationError> {
    let labels = align_labels(gold, pred)?;
    let reporter = classification_report(
        &labels.y_true,
        &labels.y_pred,
        config.zero_division,
        config.digits,
        config.parallel,
    )?;
    Ok(reporter)
}
