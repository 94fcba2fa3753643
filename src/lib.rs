//! This library scores predicted word segmentations against a gold annotation. Some gold
//! boundaries are not fixed: they depend on a theory rule, and every occurrence of a rule is
//! resolved to the outcome the predictions support the most. The boundaries are then compared
//! position by position and summarized in a classification report.
//!
//! The pipeline is:
//! 1. load the theory table (`TheoryTable`),
//! 2. parse the predictions (`parse_predictions`) and the gold (`parse_gold`),
//! 3. check the rule alignment and pick the outcome of every rule (`pick_rules`),
//! 4. fill the gold (`fill_gold`) and verify it is fully resolved (`check_resolved`),
//! 5. compute the classification report (`evaluate`).

mod config;
mod digits;
mod evaluation;
mod gold;
mod metrics;
mod prediction;
mod reporter;
mod resolver;
mod theory;

pub use config::{EvalConfig, EvalConfigBuilder};
pub use digits::{Digit, DigitParsingError, DigitString};
pub use evaluation::{
    align_labels, evaluate, AlignedLabels, EvaluationError, LengthMismatchError,
};
pub use gold::{
    parse_gold, AlignmentError, GoldAnnotation, GoldError, GoldMap, RuleIndex, WildcardGroup,
};
pub use metrics::{
    classification_report, precision_recall_fscore_support, ComputationError, DivByZeroStrat,
    DivisionByZeroError, FloatExt, InconsistentLengthError, ParsingDivisionByZeroStrategyError,
    PrecisionRecallFScoreTrueSum,
};
pub use prediction::{parse_predictions, segment_digits, PredictionMap};
pub use reporter::{
    Average, AverageParsingError, ClassMetrics, OverallAverage, Reporter, DEFAULT_DIGITS,
};
pub use resolver::{
    check_resolved, fill_gold, pick_rules, tally_rules, PickedRules, ResidualWildcardError,
    RuleTally,
};
pub use theory::{Theory, TheoryError, TheoryRecord, TheoryTable};

use tracing::info;

/// Runs the whole pipeline on the content of the gold and predictions files.
///
/// * `gold_text`: Content of the gold annotation.
/// * `pred_text`: Content of the predictions, one segmented word per line.
/// * `theories`: Theory table used to resolve the rule-dependent boundaries.
/// * `zero_division`: What to do in case of division by zero.
/// * `digits`: Number of decimals used when displaying the report.
/// * `parallel`: Can we use multiple cores for matrix computations?
///
/// # Example
///
/// ```rust
/// use morpheval::{evaluate_texts, DivByZeroStrat, TheoryTable};
///
/// let theories = TheoryTable::from_json_str(r#"[["R1", 2, 0, 1]]"#).unwrap();
/// let gold = "   R1\n1 a.b\n2 c+d\n";
/// let pred = "ab\nc d\n";
///
/// let reporter = evaluate_texts(gold, pred, &theories, DivByZeroStrat::ReplaceBy0, 2, false)
///     .unwrap();
/// let expected_report = "Class, Precision, Recall, Fscore, Support
/// 0, 1.00, 1.00, 1.00, 1
/// 1, 1.00, 1.00, 1.00, 1
/// Overall_Micro, 1.00, 1.00, 1.00, 2
/// Overall_Macro, 1.00, 1.00, 1.00, 2
/// Overall_Weighted, 1.00, 1.00, 1.00, 2\n";
///
/// assert_eq!(expected_report, reporter.to_string());
/// ```
pub fn evaluate_texts(
    gold_text: &str,
    pred_text: &str,
    theories: &TheoryTable,
    zero_division: DivByZeroStrat,
    digits: usize,
    parallel: bool,
) -> Result<Reporter, EvaluationError> {
    let predictions = parse_predictions(pred_text);
    let gold = parse_gold(gold_text, theories)?;
    info!(
        gold_words = gold.digits.len(),
        predicted_words = predictions.len(),
        unresolved = gold.unresolved_count(),
        "parsed inputs"
    );
    gold.rules.check_alignment()?;
    let picked = pick_rules(&predictions, &gold.rules, theories);
    info!(rules = picked.len(), "resolved theory rules");
    let filled = fill_gold(&gold.digits, &picked, &gold.rules);
    check_resolved(&filled)?;
    let config = EvalConfig::from((zero_division, digits, parallel));
    let reporter = evaluate(&filled, &predictions, config)?;
    info!("computed classification report");
    Ok(reporter)
}

/// Same as `evaluate_texts`, with the parameters gathered in an `EvalConfig`.
///
/// # Example
///
/// ```rust
/// use morpheval::{evaluate_conf, EvalConfig, EvalConfigBuilder, TheoryTable};
///
/// let theories = TheoryTable::from_json_str(r#"[["R1", 2, 0, 1]]"#).unwrap();
/// let config: EvalConfig = EvalConfigBuilder::default().digits(3).build();
///
/// let reporter = evaluate_conf("   R1\n1 a.b\n", "ab\n", &theories, config).unwrap();
/// assert_eq!(
///     reporter.to_string().lines().nth(1),
///     Some("0, 1.000, 1.000, 1.000, 1")
/// );
/// ```
pub fn evaluate_conf(
    gold_text: &str,
    pred_text: &str,
    theories: &TheoryTable,
    config: EvalConfig,
) -> Result<Reporter, EvaluationError> {
    let (zero_division, digits, parallel) = config.into();
    evaluate_texts(gold_text, pred_text, theories, zero_division, digits, parallel)
}
