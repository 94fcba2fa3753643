/**
This modules gives a few tools to prettyprint the output for all the classes and the overall
metrics.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

/// Number of decimals used when displaying the metrics.
pub const DEFAULT_DIGITS: usize = 5;

/// The reporter holds the metrics of every class and the overall metrics. It can be used to
/// display the results (i.e. prettyprint them) as if they were collected into a dataframe and can
/// be consumed to obtain a `HashSet` containing the metrics. The reporter can be built with the
/// `classification_report` function.
///
/// # Example
///
/// ```rust
/// use morpheval::{classification_report, DivByZeroStrat};
///
/// let y_true = vec!["0", "1", "1", "0"];
/// let y_pred = vec!["0", "1", "0", "0"];
///
/// let reporter = classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0, 2, false)
///     .unwrap();
///
/// let expected_report = "Class, Precision, Recall, Fscore, Support
/// 0, 0.67, 1.00, 0.80, 2
/// 1, 1.00, 0.50, 0.67, 2
/// Overall_Micro, 0.75, 0.75, 0.75, 4
/// Overall_Macro, 0.83, 0.75, 0.73, 4
/// Overall_Weighted, 0.83, 0.75, 0.73, 4\n";
///
/// assert_eq!(expected_report, reporter.to_string());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Reporter {
    pub(crate) classes: BTreeSet<ClassMetricsInner>,
    pub(crate) digits: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::with_digits(DEFAULT_DIGITS)
    }
}

/// By converting the reporter into a `HashSet` of `ClassMetrics`, you lose the ordering and the
/// partial equality implemented for the reporter. If you mean to consume the data without
/// prettypriting it, this is not a problem.
impl From<Reporter> for HashSet<ClassMetrics> {
    fn from(value: Reporter) -> Self {
        value.classes.into_iter().map(ClassMetrics::from).collect()
    }
}

impl Reporter {
    pub fn with_digits(digits: usize) -> Self {
        Self {
            classes: BTreeSet::new(),
            digits,
        }
    }
    pub(crate) fn insert(&mut self, metrics: ClassMetricsInner) -> bool {
        self.classes.insert(metrics)
    }
    pub fn digits(&self) -> usize {
        self.digits
    }
    /// Rows of the report, in display order.
    pub fn iter(&self) -> impl Iterator<Item = ClassMetrics> + '_ {
        self.classes.iter().cloned().map(ClassMetrics::from)
    }
    /// Metrics of a single class, or of an overall average when `average` is not `None`.
    pub fn get(&self, class: &str, average: Average) -> Option<ClassMetrics> {
        self.classes
            .iter()
            .find(|c| c.class == class && c.average == average)
            .cloned()
            .map(ClassMetrics::from)
    }
    pub fn len(&self) -> usize {
        self.classes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The Reporter struct acts as a dataframe when displayed. The classes come first, sorted, followed
/// by the overall averages.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Class, Precision, Recall, Fscore, Support")?;
        for v in self.classes.iter() {
            writeln!(f, "{:.*}", self.digits, v)?
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Datastructure holding metrics about a given class.
pub struct ClassMetrics {
    /// The class, such as "0", "1" or "Overall_Micro"
    pub class: String,
    /// The average used to compute this class' metrics
    pub average: Average,
    /// Precision metric
    pub precision: f32,
    /// Recall metric
    pub recall: f32,
    /// Fscore metric
    pub fscore: f32,
    /// Support metric
    pub support: usize,
}

impl Hash for ClassMetrics {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.average.hash(state)
    }
}

impl PartialEq for ClassMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetrics {}

impl From<ClassMetricsInner> for ClassMetrics {
    fn from(value: ClassMetricsInner) -> Self {
        Self {
            class: value.class,
            average: value.average,
            precision: value.precision,
            recall: value.recall,
            fscore: value.fscore,
            support: value.support,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// ClassMetrics hold the metrics for a single class. They can't be constructed explicitely and
/// they implement a special version of the `Display` trait, allowing them to be treated as the
/// line of a dataframe. They are ordered by average first, then by class.
pub(crate) struct ClassMetricsInner {
    pub(crate) class: String,
    pub(crate) average: Average,
    pub(crate) precision: f32,
    pub(crate) recall: f32,
    pub(crate) fscore: f32,
    pub(crate) support: usize,
}
impl PartialEq for ClassMetricsInner {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetricsInner {}

impl PartialOrd for ClassMetricsInner {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassMetricsInner {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.average
            .cmp(&other.average)
            .then_with(|| self.class.cmp(&other.class))
    }
}

impl ClassMetricsInner {
    pub(crate) fn new_overall(
        average: OverallAverage,
        precision: f32,
        recall: f32,
        fscore: f32,
        support: usize,
    ) -> Self {
        let class = average.to_string();
        ClassMetricsInner {
            class,
            average: average.into(),
            precision,
            recall,
            fscore,
            support,
        }
    }
}

/// The Classmetrics struct acts as a line in a dataframe when displayed. The precision of the
/// formatter sets the number of decimals of the metrics.
impl Display for ClassMetricsInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = f.precision().unwrap_or(DEFAULT_DIGITS);
        write!(
            f,
            "{}, {:.*}, {:.*}, {:.*}, {}",
            self.class,
            digits,
            self.precision,
            digits,
            self.recall,
            digits,
            self.fscore,
            self.support
        )
    }
}

/// Enumeration of the different types of averaging possible and supported by this crate. &str can
/// be parsed to create an `Average`. `None` sorts before every overall average.
#[derive(
    Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize,
)]
pub enum Average {
    None,
    Micro,
    Macro,
    Weighted,
}
impl Display for Average {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl FromStr for Average {
    type Err = AverageParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Average::None),
            "micro" => Ok(Average::Micro),
            "macro" => Ok(Average::Macro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(AverageParsingError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct AverageParsingError(String);
impl Display for AverageParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into an Average",
            self.0
        )
    }
}
impl std::error::Error for AverageParsingError {}

/// Averages reported after the classes, in display order.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Sequence)]
pub enum OverallAverage {
    Micro,
    Macro,
    Weighted,
}

impl Display for OverallAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str_content = match self {
            Self::Micro => "Overall_Micro",
            Self::Macro => "Overall_Macro",
            Self::Weighted => "Overall_Weighted",
        };
        write!(f, "{}", str_content)
    }
}

impl From<OverallAverage> for Average {
    fn from(value: OverallAverage) -> Self {
        match value {
            OverallAverage::Micro => Average::Micro,
            OverallAverage::Macro => Average::Macro,
            OverallAverage::Weighted => Average::Weighted,
        }
    }
}
