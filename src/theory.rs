/**
This module loads the table of theories. Each theory is identified by a rule-id and lists the
outcomes it accepts for the boundaries it governs. A raw record looks like `["a", 4, 0, 3]`: the
rule `a` governs `log2(4) = 2` boundaries and accepts the outcomes `00` and `11`.
*/
use crate::digits::{Digit, DigitString};
use ahash::AHashMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{self, Display};
use std::io::Read;
use tracing::debug;

/// Raw theory record, as found in the theories file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryRecord {
    pub rule_id: String,
    /// Number of possible outcomes. Must be a power of two: the width of the outcomes is
    /// `log2(total)`.
    pub total: u64,
    /// Accepted outcomes, as integers.
    pub values: Vec<u64>,
}

impl TheoryRecord {
    pub fn new<S: Into<String>>(rule_id: S, total: u64, values: Vec<u64>) -> Self {
        Self {
            rule_id: rule_id.into(),
            total,
            values,
        }
    }
}

/// Records are flat json arrays: `[rule_id, total, value, value, ...]`.
impl<'de> Deserialize<'de> for TheoryRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = TheoryRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an array [rule_id, total, outcome, ...]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let rule_id: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let total: u64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(value) = seq.next_element::<u64>()? {
                    values.push(value);
                }
                Ok(TheoryRecord {
                    rule_id,
                    total,
                    values,
                })
            }
        }

        deserializer.deserialize_seq(RecordVisitor)
    }
}

#[derive(Debug)]
/// Errors encountered while building the theory table.
pub enum TheoryError {
    /// The total of a record is not an exact power of two greater than one.
    NotPowerOfTwo { rule_id: String, total: u64 },
    /// An outcome does not fit in the width of the rule.
    OutcomeOutOfRange {
        rule_id: String,
        value: u64,
        width: usize,
    },
    Json(serde_json::Error),
}

impl Display for TheoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPowerOfTwo { rule_id, total } => write!(
                f,
                "The total of the rule {} ({}) is not a power of two",
                rule_id, total
            ),
            Self::OutcomeOutOfRange {
                rule_id,
                value,
                width,
            } => write!(
                f,
                "The outcome {} of the rule {} does not fit in {} bits",
                value, rule_id, width
            ),
            Self::Json(err) => write!(f, "Could not read the theories: {}", err),
        }
    }
}

impl Error for TheoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TheoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// The accepted outcomes of a single rule, in their declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theory {
    pub(crate) width: usize,
    pub(crate) outcomes: Vec<DigitString>,
}

impl Theory {
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn outcomes(&self) -> &[DigitString] {
        &self.outcomes
    }
}

impl TryFrom<&TheoryRecord> for Theory {
    type Error = TheoryError;
    fn try_from(record: &TheoryRecord) -> Result<Self, Self::Error> {
        if record.total < 2 || !record.total.is_power_of_two() {
            return Err(TheoryError::NotPowerOfTwo {
                rule_id: record.rule_id.clone(),
                total: record.total,
            });
        }
        let width = record.total.trailing_zeros() as usize;
        let outcomes = record
            .values
            .iter()
            .map(|&value| {
                if value >= record.total {
                    return Err(TheoryError::OutcomeOutOfRange {
                        rule_id: record.rule_id.clone(),
                        value,
                        width,
                    });
                }
                Ok(binary_outcome(value, width))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { width, outcomes })
    }
}

/// Binary representation of `value`, left-padded with `0` up to `width` digits.
fn binary_outcome(value: u64, width: usize) -> DigitString {
    (0..width)
        .rev()
        .map(|bit| Digit::from((value >> bit) & 1 == 1))
        .collect()
}

/// Mapping between the rule-ids and their accepted outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TheoryTable {
    theories: AHashMap<String, Theory>,
}

impl TheoryTable {
    /// Builds the table. A later record with the same rule-id replaces the earlier one.
    pub fn from_records<'a, I>(records: I) -> Result<Self, TheoryError>
    where
        I: IntoIterator<Item = &'a TheoryRecord>,
    {
        let mut theories = AHashMap::default();
        for record in records {
            let theory = Theory::try_from(record)?;
            if theories.insert(record.rule_id.clone(), theory).is_some() {
                debug!(rule_id = %record.rule_id, "theory declared twice, keeping the last one");
            }
        }
        debug!(rules = theories.len(), "loaded theory table");
        Ok(Self { theories })
    }

    pub fn from_json_str(content: &str) -> Result<Self, TheoryError> {
        let records: Vec<TheoryRecord> = serde_json::from_str(content)?;
        Self::from_records(records.iter())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TheoryError> {
        let records: Vec<TheoryRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records.iter())
    }

    pub fn get(&self, rule_id: &str) -> Option<&Theory> {
        self.theories.get(rule_id)
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.theories.contains_key(rule_id)
    }

    pub fn outcomes(&self, rule_id: &str) -> Option<&[DigitString]> {
        self.get(rule_id).map(Theory::outcomes)
    }

    pub fn width(&self, rule_id: &str) -> Option<usize> {
        self.get(rule_id).map(Theory::width)
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.theories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Theory)> {
        self.theories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.theories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theories.is_empty()
    }
}
