/**
This module resolves the `?` of the gold annotation. For each rule, the predictions vote for one of
the outcomes accepted by the theory: every wildcard group of the rule reads the predicted digits
at its positions, and the outcome read the most often is picked. The picked outcome then replaces
the `?` of every group of the rule.
*/
use crate::digits::{Digit, DigitString};
use crate::gold::{GoldMap, RuleIndex, WildcardGroup};
use crate::prediction::PredictionMap;
use crate::theory::TheoryTable;
use ahash::AHashMap;
use std::error::Error;
use std::fmt::Display;
use tracing::{debug, trace};

/// Picked outcome of each rule.
pub type PickedRules = AHashMap<String, DigitString>;

/// Number of times each outcome of a rule was observed in the predictions, in the declared order
/// of the outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleTally {
    counts: Vec<(DigitString, usize)>,
}

impl RuleTally {
    pub fn new(outcomes: &[DigitString]) -> Self {
        Self {
            counts: outcomes.iter().map(|o| (o.clone(), 0)).collect(),
        }
    }

    /// Counts the candidate if it is an accepted outcome. Returns `true` if it was counted.
    pub fn observe(&mut self, candidate: &[Digit]) -> bool {
        match self
            .counts
            .iter_mut()
            .find(|(outcome, _)| outcome.as_slice() == candidate)
        {
            Some((_, count)) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Outcome with the highest count. The first declared outcome wins ties, including when
    /// nothing was observed. `None` only if the rule accepts no outcome.
    pub fn pick(&self) -> Option<&DigitString> {
        let mut best: Option<&(DigitString, usize)> = None;
        for entry in self.counts.iter() {
            match best {
                Some((_, best_count)) if *best_count >= entry.1 => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(outcome, _)| outcome)
    }

    pub fn counts(&self) -> &[(DigitString, usize)] {
        &self.counts
    }

    /// Total number of observations counted for this rule.
    pub fn observations(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

/// Predicted digits at the positions of the group. `None` if a position is out of the
/// prediction.
fn read_group(prediction: &DigitString, group: &WildcardGroup) -> Option<Vec<Digit>> {
    group.iter().map(|&i| prediction.get(i).copied()).collect()
}

/// Counts, for each rule of the theory table, the outcomes observed in the predictions. Words
/// without prediction do not vote.
pub fn tally_rules(
    predictions: &PredictionMap,
    rules: &RuleIndex,
    theories: &TheoryTable,
) -> AHashMap<String, RuleTally> {
    let mut tallies = AHashMap::with_capacity(theories.len());
    for (rule_id, theory) in theories.iter() {
        let mut tally = RuleTally::new(theory.outcomes());
        if let Some(words) = rules.get(rule_id) {
            for (word, groups) in words.iter() {
                let Some(prediction) = predictions.get(word) else {
                    continue;
                };
                for group in groups.iter() {
                    match read_group(prediction, group) {
                        Some(candidate) => {
                            tally.observe(&candidate);
                        }
                        None => trace!(
                            rule_id,
                            word = %word,
                            "wildcard group out of the predicted digits"
                        ),
                    }
                }
            }
        }
        tallies.insert(rule_id.to_string(), tally);
    }
    tallies
}

/// Picks the most supported outcome of every rule of the theory table.
pub fn pick_rules(
    predictions: &PredictionMap,
    rules: &RuleIndex,
    theories: &TheoryTable,
) -> PickedRules {
    let picked: PickedRules = tally_rules(predictions, rules, theories)
        .into_iter()
        .filter_map(|(rule_id, tally)| {
            let outcome = tally.pick()?.clone();
            trace!(
                rule_id = %rule_id,
                outcome = %outcome,
                observations = tally.observations(),
                "picked outcome"
            );
            Some((rule_id, outcome))
        })
        .collect();
    debug!(rules = picked.len(), "picked rule outcomes");
    picked
}

/// Replaces the `?` of every group by the picked outcome of its rule. Rules without a picked
/// outcome and words absent from the gold are left untouched.
pub fn fill_gold(gold: &GoldMap, picked: &PickedRules, rules: &RuleIndex) -> GoldMap {
    let mut filled = gold.clone();
    for (rule_id, words) in rules.iter() {
        let Some(outcome) = picked.get(rule_id) else {
            continue;
        };
        for (word, groups) in words.iter() {
            let Some(digits) = filled.get_mut(word) else {
                continue;
            };
            for group in groups.iter() {
                for (&position, &digit) in group.iter().zip(outcome.iter()) {
                    if let Some(slot) = digits.get_mut(position) {
                        *slot = digit;
                    }
                }
            }
        }
    }
    filled
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Some `?` survived the filling. Holds the words, sorted.
pub struct ResidualWildcardError(pub Vec<String>);

impl Display for ResidualWildcardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "There are still '?' in the filled gold dictionary, in the words: {}",
            self.0.join(", ")
        )
    }
}

impl Error for ResidualWildcardError {}

/// Verifies that no `?` is left in the gold digits.
pub fn check_resolved(gold: &GoldMap) -> Result<(), ResidualWildcardError> {
    let mut words: Vec<String> = gold
        .iter()
        .filter(|(_, digits)| digits.has_unresolved())
        .map(|(word, _)| word.clone())
        .collect();
    if words.is_empty() {
        return Ok(());
    }
    words.sort_unstable();
    Err(ResidualWildcardError(words))
}
