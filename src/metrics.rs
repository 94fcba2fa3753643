/**
This module computes the metrics (precision, recall, f-score, support) of a ground-truth sequence of
labels and a predicted sequence of labels. Every distinct label is a class; a label is a true
positive of its class when both sequences hold it at the same position.
*/
use crate::reporter::{Average, ClassMetricsInner, OverallAverage, Reporter};
use core::fmt;
use enum_iterator::all;
use itertools::multizip;
use ndarray::{prelude::*, Array, Data, ScalarOperand, Zip};
use ndarray_stats::{errors::MultiInputError, SummaryStatisticsExt};
use num::{Float, Num, NumCast};
use std::{
    collections::{BTreeMap, BTreeSet},
    error::Error,
    fmt::{Debug, Display},
    str::FromStr,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNotUniqueOrEmpty(usize);

impl Display for ArrayNotUniqueOrEmpty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "This array contains more than one element or is empty. It has length: {} Cannot call `item` on it",
            self.0
        )
    }
}
impl Error for ArrayNotUniqueOrEmpty {}

trait ItemArrayExt<Output> {
    /// Returns the element out of the Array. Can return an error if the array is empty of if the
    /// array has a length superior to 1.
    fn item(&self) -> Result<Output, ArrayNotUniqueOrEmpty>;
}

impl<F: Clone, T: Data<Elem = F>> ItemArrayExt<F> for ArrayBase<T, Dim<[usize; 1]>> {
    fn item(&self) -> Result<F, ArrayNotUniqueOrEmpty> {
        match self.len() {
            1 => Ok(self[0].clone()),
            n => Err(ArrayNotUniqueOrEmpty(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// How do we handle cases with a division by zero? Do we replace the result by 1, return an
/// error, or replace the division result with 0? The classification report uses by default the
/// `ReplaceBy0` strategy. The `ReturnError` strategy stops the computation; it can be useful if you
/// believe there should be no 0 in the denominator.
pub enum DivByZeroStrat {
    /// Returns 1 when the denominator is 0
    ReplaceBy1,
    /// Returns an error
    ReturnError,
    /// Returns 0 when the denominator is 0
    #[default]
    ReplaceBy0,
}

#[derive(Debug)]
pub struct ParsingDivisionByZeroStrategyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingDivisionByZeroStrategyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a a `DivisionByZeroStrategy`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingDivisionByZeroStrategyError<S> {}

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" | "zero" => Ok(DivByZeroStrat::ReplaceBy0),
            "replaceby1" | "replacebyone" | "one" => Ok(DivByZeroStrat::ReplaceBy1),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionByZeroError;

impl Display for DivisionByZeroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered division by zero")
    }
}

impl Error for DivisionByZeroError {}

/// Internal extension trait for Num's Float trait
pub trait FloatExt: Float + Send + Sync + Clone + ScalarOperand + Debug {}

impl<T: Float + Send + Sync + Clone + Copy + ScalarOperand + Debug> FloatExt for T {}

fn prf_divide<I: Debug + Num + Clone + Send + Sync + Copy, D: Dimension>(
    numerator: ArcArray<I, D>,
    denominator: ArrayViewMut<I, D>,
    parallel: bool,
    zero_division: DivByZeroStrat,
) -> Result<ArcArray<I, D>, DivisionByZeroError> {
    let (result, zero_mask) = if parallel {
        par_prf_divide_results_and_mask(numerator, denominator)
    } else {
        prf_divide_results_and_mask(numerator, denominator)
    };

    match zero_division {
        DivByZeroStrat::ReturnError => {
            if zero_mask.iter().any(|m| *m == I::zero()) {
                Err(DivisionByZeroError)
            } else {
                Ok(result)
            }
        }
        DivByZeroStrat::ReplaceBy1 => {
            // The numerator is always 0 where the denominator is 0.
            let ones_at_zeros = zero_mask.mapv(|m| I::one() - m);
            Ok(result + ones_at_zeros)
        }
        DivByZeroStrat::ReplaceBy0 => {
            let final_result = result * zero_mask;
            Ok(final_result)
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent when two lists or arrays are not of the
/// same length (when they should be).
pub struct InconsistentLengthError(usize, usize);

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inconsistent length between two lists. `y_true` is length {}, `y_pred` is length {}",
            self.0, self.1
        )
    }
}
impl Error for InconsistentLengthError {}

fn check_for_empty_slices<T>(y_true: &[T], y_pred: &[T]) -> Result<(), ComputationError> {
    if y_true.is_empty() {
        return Err(ComputationError::EmptyInput(String::from("y_true")));
    };
    if y_pred.is_empty() {
        return Err(ComputationError::EmptyInput(String::from("y_pred")));
    };
    Ok(())
}

fn check_consistent_length<T>(y_true: &[T], y_pred: &[T]) -> Result<(), InconsistentLengthError> {
    if y_true.len() != y_pred.len() {
        return Err(InconsistentLengthError(y_true.len(), y_pred.len()));
    }
    Ok(())
}

/// predicted sum, true positive sum and true sum
type ActualTPCorrect<T> = (Array1<T>, Array1<T>, Array1<T>);

/// Sorted union of the labels found in `y_true` and `y_pred`.
fn target_names<'a, T: Ord>(y_true: &'a [T], y_pred: &'a [T]) -> BTreeSet<&'a T> {
    y_true.iter().chain(y_pred.iter()).collect()
}

#[inline(always)]
fn extract_tp_actual_correct<'a, T: Ord>(
    y_true: &'a [T],
    y_pred: &'a [T],
    target_names: &BTreeSet<&'a T>,
) -> ActualTPCorrect<usize> {
    let index: BTreeMap<&T, usize> = target_names
        .iter()
        .enumerate()
        .map(|(i, t)| (*t, i))
        .collect();
    let mut pred_sum = Array1::<usize>::zeros(target_names.len());
    let mut tp_sum = Array1::<usize>::zeros(target_names.len());
    let mut true_sum = Array1::<usize>::zeros(target_names.len());
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let true_index = index[&t];
        true_sum[true_index] += 1;
        pred_sum[index[&p]] += 1;
        if t == p {
            tp_sum[true_index] += 1;
        }
    }
    (pred_sum, tp_sum, true_sum)
}

#[derive(Debug, Clone, PartialEq)]
/// Enum error encompassing many type of failures that could happen when computing the precison,
/// recall, f-score and the support.
pub enum ComputationError {
    BetaNotPositive,
    InconsistentLength(InconsistentLengthError),
    DivisionByZero(DivisionByZeroError),
    InputError(MultiInputError),
    EmptyArray(String),
    EmptyOrNotUnique(ArrayNotUniqueOrEmpty),
    EmptyInput(String),
}
impl Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BetaNotPositive => write!(f, "Beta value is not a positive number"),
            Self::InconsistentLength(length_err) => std::fmt::Display::fmt(length_err, f),
            Self::DivisionByZero(div_err) => std::fmt::Display::fmt(&div_err, f),
            Self::InputError(input_err) => std::fmt::Display::fmt(&input_err, f),
            Self::EmptyArray(empty_err) => write!(f, "Found an empty array in {}", empty_err),
            Self::EmptyOrNotUnique(size_err) => std::fmt::Display::fmt(size_err, f),
            Self::EmptyInput(which) => write!(f, "Received an empty input {}", which),
        }
    }
}
impl Error for ComputationError {}

impl From<InconsistentLengthError> for ComputationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::InconsistentLength(value)
    }
}
impl From<DivisionByZeroError> for ComputationError {
    fn from(value: DivisionByZeroError) -> Self {
        Self::DivisionByZero(value)
    }
}

impl From<MultiInputError> for ComputationError {
    fn from(value: MultiInputError) -> Self {
        Self::InputError(value)
    }
}

impl From<ArrayNotUniqueOrEmpty> for ComputationError {
    fn from(value: ArrayNotUniqueOrEmpty) -> Self {
        Self::EmptyOrNotUnique(value)
    }
}

/// Type alias for representing the output of the `precision_recall_fscore_support`. Each arrays
/// contain a vector of f32. The first array contains the precision, the second the recall, the
/// third the f-score and the last one the support.
pub type PrecisionRecallFScoreTrueSum = (
    Array<f32, Dim<[usize; 1]>>,
    Array<f32, Dim<[usize; 1]>>,
    Array<f32, Dim<[usize; 1]>>,
    Array<usize, Dim<[usize; 1]>>,
);

/// One of the main entrypoints of the library. This function computes the precision, recall,
/// fscore and support of the true and predicted labels. With `Average::None`, the arrays hold one
/// value per class, the classes being sorted.
///
/// * `y_true`: True labels
/// * `y_pred`: Predicted labels
/// * `beta`: Value of the `beta` parameter of the fscore. `beta=1` for F1 and `beta=0.5` for F0.5.
/// * `average`: What type of average to use.
/// * `zero_division`: What to do in case of division by zero.
/// * `parallel`: Can we use multiple cores for computations?
pub fn precision_recall_fscore_support<T: Ord, F: FloatExt>(
    y_true: &[T],
    y_pred: &[T],
    beta: F,
    average: Average,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<PrecisionRecallFScoreTrueSum, ComputationError> {
    check_consistent_length(y_true, y_pred)?;
    check_for_empty_slices(y_true, y_pred)?;
    let names = target_names(y_true, y_pred);
    let (pred_sum, tp_sum, true_sum) = extract_tp_actual_correct(y_true, y_pred, &names);
    precision_recall_fscore_support_inner(
        pred_sum,
        tp_sum,
        true_sum,
        beta,
        average,
        zero_division,
        parallel,
    )
}

fn precision_recall_fscore_support_inner<F: FloatExt>(
    mut pred_sum: Array1<usize>,
    mut tp_sum: Array1<usize>,
    mut true_sum: Array1<usize>,
    beta: F,
    average: Average,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<PrecisionRecallFScoreTrueSum, ComputationError> {
    if beta.is_sign_negative() || beta.is_nan() {
        return Err(ComputationError::BetaNotPositive);
    };
    let beta2 = beta.powi(2);
    if matches!(average, Average::Micro) {
        tp_sum = array![tp_sum.sum()];
        pred_sum = array![pred_sum.sum()];
        true_sum = array![true_sum.sum()];
    };
    let arc_tp_sum = tp_sum.mapv(|x| x as f32).to_shared();
    let precision = prf_divide(
        arc_tp_sum.clone(), // ArcArray are (often) inexpensive to clone.
        pred_sum.mapv(|x| x as f32).view_mut(),
        parallel,
        zero_division,
    )?;
    let recall = prf_divide(
        arc_tp_sum,
        true_sum.mapv(|x| x as f32).view_mut(),
        parallel,
        zero_division,
    )?;
    let f_score: ArcArray<f32, Dim<[usize; 1]>> = if beta2.is_infinite() {
        recall.clone()
    } else {
        let beta2_cast: f32 =
            <f32 as NumCast>::from(beta2).ok_or(ComputationError::BetaNotPositive)?;
        let denom = precision.mapv(|p| p * beta2_cast).to_shared() + recall.view();
        let denom_non_zero = if parallel {
            par_replace(denom, 0.0, 1.0)
        } else {
            replace(denom, 0.0, 1.0)
        };
        (1.0 + beta2_cast) * precision.clone() * recall.view() / denom_non_zero
    };
    match average {
        Average::Weighted => {
            let tmp_weights = true_sum;
            if tmp_weights.sum() == 0 {
                return match zero_division {
                    DivByZeroStrat::ReturnError => {
                        Err(ComputationError::DivisionByZero(DivisionByZeroError))
                    }
                    _ => Ok((array![0.0], array![0.0], array![0.0], array![0])),
                };
            };
            let final_tmp_weights = tmp_weights.mapv(|x| x as f32).into_shared();
            let final_precision =
                Array::from_vec(vec![precision.weighted_mean(&final_tmp_weights)?]);
            let final_recall = Array::from_vec(vec![recall.weighted_mean(&final_tmp_weights)?]);
            let final_f_score = Array::from_vec(vec![f_score.weighted_mean(&final_tmp_weights)?]);
            let final_true_sum = array![tmp_weights.sum()];
            Ok((final_precision, final_recall, final_f_score, final_true_sum))
        }
        Average::None | Average::Micro => {
            let final_precision = precision.into_owned();
            let final_recall = recall.into_owned();
            let final_f_score = f_score.into_owned();
            Ok((final_precision, final_recall, final_f_score, true_sum))
        }
        Average::Macro => {
            let final_precision = Array::from_vec(vec![precision
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("precision")))?]);
            let final_recall = Array::from_vec(vec![recall
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("recall")))?]);
            let final_f_score = Array::from_vec(vec![f_score
                .mean()
                .ok_or_else(|| ComputationError::EmptyArray(String::from("fscore")))?]);
            let final_true_sum = array![true_sum.sum()];
            Ok((final_precision, final_recall, final_f_score, final_true_sum))
        }
    }
}

/// This function computes the result in parallel. For a synchronous
/// version of this function, see `prf_divide_results_and_mask`.
///
/// * `numerator`: Numerator of the division
/// * `denominator`: Denominator of the division
fn par_prf_divide_results_and_mask<I: Debug + Num + Clone + Send + Sync, D: Dimension>(
    numerator: ArcArray<I, D>,
    mut denominator: ArrayViewMut<I, D>,
) -> (ArcArray<I, D>, Array<I, D>) {
    let zero_at_mask = Zip::from(&mut denominator).par_map_collect(|d| {
        if *d == I::zero() {
            I::zero()
        } else {
            I::one()
        }
    });
    denominator.par_mapv_inplace(|v| if v == I::zero() { I::one() } else { v });
    (numerator / denominator, zero_at_mask)
}

/// This function computes the result synchronously. For a parallel
/// version of this function, see `par_prf_divide_results_and_mask`.
///
/// * `numerator`: Numerator of the division
/// * `denominator`: Denominator of the division
fn prf_divide_results_and_mask<I: Debug + Num + Clone, D: Dimension>(
    numerator: ArcArray<I, D>,
    mut denominator: ArrayViewMut<I, D>,
) -> (ArcArray<I, D>, Array<I, D>) {
    let zero_at_mask =
        Zip::from(&mut denominator)
            .map_collect(|d| if *d == I::zero() { I::zero() } else { I::one() });
    denominator.mapv_inplace(|v| if v == I::zero() { I::one() } else { v });
    (numerator / denominator, zero_at_mask)
}

/// Helper function to replace values from an array.
fn replace<Data: PartialEq + Copy, D: Dimension>(
    mut array: ArcArray<Data, D>,
    replaced: Data,
    new_value: Data,
) -> ArcArray<Data, D> {
    array.mapv_inplace(|v| if v == replaced { new_value } else { v });
    array
}

/// Helper function to replace values from an array in parallel.
fn par_replace<Data: PartialEq + Send + Sync + Copy, D: Dimension>(
    mut array: ArcArray<Data, D>,
    replaced: Data,
    new_value: Data,
) -> ArcArray<Data, D> {
    array.par_mapv_inplace(|v| if v == replaced { new_value } else { v });
    array
}

/// Main entrypoint of the metrics. This function computes the precision, recall, fscore and
/// support of the true and predicted labels. It returns information about the individual classes
/// and different overall averages. The returned structure can be used to prettyprint the results
/// or be converted into a HashSet.
///
/// * `y_true`: True labels
/// * `y_pred`: Predicted labels
/// * `zero_division`: What to do in case of division by zero.
/// * `digits`: Number of decimals used when displaying the report.
/// * `parallel`: Can we use multiple cores for matrix computations?
pub fn classification_report<T: Ord + Display>(
    y_true: &[T],
    y_pred: &[T],
    zero_division: DivByZeroStrat,
    digits: usize,
    parallel: bool,
) -> Result<Reporter, ComputationError> {
    check_consistent_length(y_true, y_pred)?;
    check_for_empty_slices(y_true, y_pred)?;
    let names = target_names(y_true, y_pred);
    let (pred_sum, tp_sum, true_sum) = extract_tp_actual_correct(y_true, y_pred, &names);
    let (p, r, f1, s) = precision_recall_fscore_support_inner::<f32>(
        pred_sum.clone(),
        tp_sum.clone(),
        true_sum.clone(),
        1.0,
        Average::None,
        zero_division,
        parallel,
    )?;
    let mut reporter = Reporter::with_digits(digits);
    for (name, precision, recall, fscore, support) in multizip((
        names.iter(),
        p.into_iter(),
        r.into_iter(),
        f1.into_iter(),
        s.into_iter(),
    )) {
        let tmp_metrics = ClassMetricsInner {
            class: name.to_string(),
            precision,
            recall,
            fscore,
            support,
            average: Average::None,
        };
        reporter.insert(tmp_metrics);
    }
    for avg in all::<OverallAverage>() {
        let (p, r, f1, s) = precision_recall_fscore_support_inner::<f32>(
            pred_sum.clone(),
            tp_sum.clone(),
            true_sum.clone(),
            1.0,
            avg.into(),
            zero_division,
            parallel,
        )?;
        let tmp_metrics =
            ClassMetricsInner::new_overall(avg, p.item()?, r.item()?, f1.item()?, s.item()?);
        reporter.insert(tmp_metrics);
    }
    Ok(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digits::{Digit, DigitString};
    use quickcheck::{QuickCheck, TestResult};
    use rstest::rstest;

    pub trait CloseEnough {
        fn are_close(&self, other: &Self, eps: f32) -> bool;
    }

    // ClassMetricsInner does not have the default PartialEq implementation.
    impl CloseEnough for ClassMetricsInner {
        fn are_close(&self, other: &Self, eps: f32) -> bool {
            let are_equal = self == other;
            let precision_is_equal = f32::abs(self.precision - other.precision) < eps;
            let recall_is_equal = f32::abs(self.recall - other.recall) < eps;
            let fscore_is_equal = f32::abs(self.fscore - other.fscore) < eps;
            let support_is_equal = self.support == other.support;
            are_equal
                && precision_is_equal
                && recall_is_equal
                && fscore_is_equal
                && support_is_equal
        }
    }
    impl CloseEnough for Reporter {
        fn are_close(&self, other: &Self, eps: f32) -> bool {
            self.classes.len() == other.classes.len()
                && self
                    .classes
                    .iter()
                    .zip(other.classes.iter())
                    .all(|(c1, c2)| c1.are_close(c2, eps))
        }
    }

    fn labels(s: &str) -> Vec<Digit> {
        s.parse::<DigitString>().unwrap().into_inner()
    }

    #[test]
    fn test_reporter_output() {
        let y_true = labels("00110");
        let y_pred = labels("01100");
        let actual =
            classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, 5, false).unwrap();
        let expected = Reporter {
            classes: BTreeSet::from_iter(vec![
                ClassMetricsInner {
                    class: String::from("0"),
                    precision: 0.6666667,
                    recall: 0.6666667,
                    fscore: 0.6666667,
                    support: 3,
                    average: Average::None,
                },
                ClassMetricsInner {
                    class: String::from("1"),
                    precision: 0.5,
                    recall: 0.5,
                    fscore: 0.5,
                    support: 2,
                    average: Average::None,
                },
                ClassMetricsInner::new_overall(OverallAverage::Micro, 0.6, 0.6, 0.6, 5),
                ClassMetricsInner::new_overall(
                    OverallAverage::Macro,
                    0.5833333,
                    0.5833333,
                    0.5833333,
                    5,
                ),
                ClassMetricsInner::new_overall(OverallAverage::Weighted, 0.6, 0.6, 0.6, 5),
            ]),
            digits: 5,
        };
        assert!(actual.are_close(&expected, 1e-6));
    }

    #[test]
    fn test_classification_report_display() {
        let y_true = labels("00110");
        let y_pred = labels("01100");
        let reporter =
            classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, 5, true).unwrap();
        // NOTE: Do not change the indentation
        let expected = "Class, Precision, Recall, Fscore, Support
0, 0.66667, 0.66667, 0.66667, 3
1, 0.50000, 0.50000, 0.50000, 2
Overall_Micro, 0.60000, 0.60000, 0.60000, 5
Overall_Macro, 0.58333, 0.58333, 0.58333, 5
Overall_Weighted, 0.60000, 0.60000, 0.60000, 5\n";
        assert_eq!(reporter.to_string(), expected);
    }

    #[test]
    fn test_classification_report_with_string_labels() {
        let y_true = vec!["b", "a", "a"];
        let y_pred = vec!["b", "a", "b"];
        let reporter =
            classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, 2, false).unwrap();
        let expected = "Class, Precision, Recall, Fscore, Support
a, 1.00, 0.50, 0.67, 2
b, 0.50, 1.00, 0.67, 1
Overall_Micro, 0.67, 0.67, 0.67, 3
Overall_Macro, 0.75, 0.75, 0.67, 3
Overall_Weighted, 0.83, 0.67, 0.67, 3\n";
        assert_eq!(reporter.to_string(), expected);
    }

    #[rstest]
    #[case(DivByZeroStrat::ReplaceBy0, Some(0.0))]
    #[case(DivByZeroStrat::ReplaceBy1, Some(1.0))]
    #[case(DivByZeroStrat::ReturnError, None)]
    fn test_zero_division(#[case] strat: DivByZeroStrat, #[case] expected_recall: Option<f32>) {
        // The class `1` is never true: its recall divides by zero.
        let y_true = labels("00");
        let y_pred = labels("01");
        let res = precision_recall_fscore_support(
            &y_true,
            &y_pred,
            1.0,
            Average::None,
            strat,
            false,
        );
        match expected_recall {
            Some(expected) => {
                let (precision, recall, _, support) = res.unwrap();
                assert_eq!(precision.to_vec(), vec![1.0, 0.0]);
                assert_eq!(recall.to_vec(), vec![0.5, expected]);
                assert_eq!(support.to_vec(), vec![2, 0]);
            }
            None => assert_eq!(
                res,
                Err(ComputationError::DivisionByZero(DivisionByZeroError))
            ),
        }
    }

    #[test]
    fn test_return_error_without_zero_denominator() {
        let y_true = labels("0101");
        let y_pred = labels("0110");
        let res = precision_recall_fscore_support(
            &y_true,
            &y_pred,
            1.0,
            Average::Macro,
            DivByZeroStrat::ReturnError,
            false,
        );
        let (p, r, f, s) = res.unwrap();
        assert_eq!(
            (p.item().unwrap(), r.item().unwrap(), f.item().unwrap(), s.item().unwrap()),
            (0.5, 0.5, 0.5, 4)
        );
    }

    #[test]
    fn test_check_consistent_length() {
        assert_eq!(check_consistent_length(&[1, 2], &[1, 3]), Ok(()));
        assert_eq!(
            check_consistent_length(&[1, 2], &[1]),
            Err(InconsistentLengthError(2, 1))
        );
        let res = classification_report(
            &labels("01"),
            &labels("0"),
            DivByZeroStrat::ReplaceBy0,
            5,
            false,
        );
        assert_eq!(
            res,
            Err(ComputationError::InconsistentLength(InconsistentLengthError(2, 1)))
        );
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<Digit> = vec![];
        let res = precision_recall_fscore_support(
            &empty,
            &empty,
            1.0,
            Average::Macro,
            DivByZeroStrat::ReplaceBy0,
            false,
        );
        assert!(res.is_err_and(|err| err == ComputationError::EmptyInput(String::from("y_true"))));
    }

    #[test]
    fn test_extract_tp_actual_correct() {
        let y_true = labels("0011?");
        let y_pred = labels("01110");
        let names = target_names(&y_true, &y_pred);
        let (predicted_sum, true_positive_sum, true_sum) =
            extract_tp_actual_correct(&y_true, &y_pred, &names);
        assert_eq!(
            (vec![2, 3, 0], vec![1, 2, 0], vec![2, 2, 1]),
            (
                predicted_sum.to_vec(),
                true_positive_sum.to_vec(),
                true_sum.to_vec(),
            )
        );
    }

    #[test]
    fn test_f_beta() {
        let y_true = labels("0011");
        let y_pred = labels("0111");
        // Class 1: precision 2/3, recall 1.
        let (_, _, f, _) = precision_recall_fscore_support(
            &y_true,
            &y_pred,
            2.0,
            Average::None,
            DivByZeroStrat::ReplaceBy0,
            false,
        )
        .unwrap();
        let expected = 5.0 * (2.0 / 3.0) / (4.0 * (2.0 / 3.0) + 1.0);
        assert!(f32::abs(f[1] - expected) < 1e-6);
    }

    #[test]
    fn test_err_on_negative_beta() {
        let y_true = labels("01");
        let res = precision_recall_fscore_support(
            &y_true,
            &y_true,
            -1.0,
            Average::Micro,
            DivByZeroStrat::ReplaceBy0,
            false,
        );
        assert_eq!(res, Err(ComputationError::BetaNotPositive));
    }

    #[test]
    fn test_par_divide_results_and_mask() {
        let numerator = array![[1., 2., 4., 5.]].into_shared();
        let mut cloned = numerator.clone();
        let mut same_cloned = numerator.clone();
        let denominator = cloned.view_mut();
        let same_denominator = same_cloned.view_mut();
        let (div_result, zero_mask) =
            prf_divide_results_and_mask(numerator.clone(), same_denominator);
        let (par_div_result, par_zero_mask) =
            par_prf_divide_results_and_mask(numerator, denominator);
        let has_no_zero = zero_mask == ArcArray::<f64, _>::ones(div_result.raw_dim());
        let par_has_no_zero = par_zero_mask == ArcArray::<f64, _>::ones(par_div_result.raw_dim());
        assert!(has_no_zero);
        assert!(par_has_no_zero);
        assert_eq!(div_result, array![[1., 1., 1., 1.,]]);
        assert_eq!(par_div_result, array![[1., 1., 1., 1.,]]);
    }

    #[test]
    fn test_replace_0s_by_1s() {
        let to_be_replaced =
            array![[[1.0, 0.0, 0.0, -1.0, 100.0], [10., 0.0, 0.0, 5.0, 10.]]].to_shared();
        let synchronous_actual = replace(to_be_replaced.clone(), 0.0, 1.0);
        let parallel_actual = par_replace(to_be_replaced, 0.0, 1.0);
        let expected = array![[[1.0, 1.0, 1.0, -1.0, 100.0], [10., 1.0, 1.0, 5.0, 10.]]];
        assert_eq!(synchronous_actual, expected);
        assert_eq!(parallel_actual, expected);
    }

    impl quickcheck::Arbitrary for OverallAverage {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let values: Vec<OverallAverage> = all::<OverallAverage>().collect();
            *g.choose(&values).unwrap()
        }
    }

    #[test]
    fn test_propertie_metrics_are_bounded() {
        fn metrics_are_bounded(
            pairs: Vec<(bool, bool)>,
            average: OverallAverage,
            parallel: bool,
        ) -> TestResult {
            if pairs.is_empty() {
                return TestResult::discard();
            }
            let y_true: Vec<Digit> = pairs.iter().map(|(t, _)| Digit::from(*t)).collect();
            let y_pred: Vec<Digit> = pairs.iter().map(|(_, p)| Digit::from(*p)).collect();
            let res = precision_recall_fscore_support(
                &y_true,
                &y_pred,
                1.0,
                average.into(),
                DivByZeroStrat::ReplaceBy0,
                parallel,
            );
            let (p, r, f, s) = match res {
                Ok(v) => v,
                Err(_) => return TestResult::failed(),
            };
            let bounded = |a: &Array1<f32>| a.iter().all(|v| (0.0..=1.0 + 1e-6).contains(v));
            let same_dim = p.dim() == r.dim() && r.dim() == f.dim() && f.dim() == s.dim();
            TestResult::from_bool(
                same_dim && bounded(&p) && bounded(&r) && bounded(&f) && s.sum() == pairs.len(),
            )
        }
        let mut qc = QuickCheck::new().tests(1000);
        qc.quickcheck(
            metrics_are_bounded as fn(Vec<(bool, bool)>, OverallAverage, bool) -> TestResult,
        )
    }

    #[test]
    fn test_propertie_micro_is_accuracy() {
        fn micro_is_accuracy(pairs: Vec<(bool, bool)>) -> TestResult {
            if pairs.is_empty() {
                return TestResult::discard();
            }
            let y_true: Vec<Digit> = pairs.iter().map(|(t, _)| Digit::from(*t)).collect();
            let y_pred: Vec<Digit> = pairs.iter().map(|(_, p)| Digit::from(*p)).collect();
            let (p, _, _, _) = precision_recall_fscore_support(
                &y_true,
                &y_pred,
                1.0,
                Average::Micro,
                DivByZeroStrat::ReplaceBy0,
                false,
            )
            .unwrap();
            let correct = pairs.iter().filter(|(t, p)| t == p).count() as f32;
            let accuracy = correct / pairs.len() as f32;
            TestResult::from_bool(f32::abs(p.item().unwrap() - accuracy) < 1e-5)
        }
        let mut qc = QuickCheck::new().tests(1000);
        qc.quickcheck(micro_is_accuracy as fn(Vec<(bool, bool)>) -> TestResult)
    }
}
