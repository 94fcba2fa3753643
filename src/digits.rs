/**
This module holds the boundary digits shared by the predictions and the gold annotation. A word of
`n` characters is described by `n - 1` digits: the digit at index `i` tells whether a boundary
exists right before the character `i + 1` of the word. The first character never has a digit.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// A single boundary digit. The ordering follows the character ordering (`'0' < '1' < '?'`), which
/// is the order used for the classes of the classification report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Digit {
    /// No boundary before the character (`'0'`)
    NoBoundary,
    /// A boundary before the character (`'1'`)
    Boundary,
    /// The boundary depends on a theory rule and is not resolved yet (`'?'`)
    Unresolved,
}

impl Digit {
    pub fn as_char(&self) -> char {
        match self {
            Self::NoBoundary => '0',
            Self::Boundary => '1',
            Self::Unresolved => '?',
        }
    }
}

impl Display for Digit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Could not parse a char into a `Digit`
pub struct DigitParsingError(pub char);

impl Display for DigitParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse the following char into a boundary digit: {:?}",
            self.0
        )
    }
}

impl Error for DigitParsingError {}

impl TryFrom<char> for Digit {
    type Error = DigitParsingError;
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(Self::NoBoundary),
            '1' => Ok(Self::Boundary),
            '?' => Ok(Self::Unresolved),
            c => Err(DigitParsingError(c)),
        }
    }
}

impl From<bool> for Digit {
    fn from(value: bool) -> Self {
        if value {
            Self::Boundary
        } else {
            Self::NoBoundary
        }
    }
}

/// Sequence of boundary digits of a single word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DigitString(Vec<Digit>);

impl DigitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Does this string still contain a `?`
    pub fn has_unresolved(&self) -> bool {
        self.0.contains(&Digit::Unresolved)
    }

    pub fn into_inner(self) -> Vec<Digit> {
        self.0
    }
}

impl Deref for DigitString {
    type Target = Vec<Digit>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DigitString {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Digit>> for DigitString {
    fn from(value: Vec<Digit>) -> Self {
        Self(value)
    }
}

impl FromIterator<Digit> for DigitString {
    fn from_iter<I: IntoIterator<Item = Digit>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for DigitString {
    type Err = DigitParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().map(Digit::try_from).collect()
    }
}

impl Display for DigitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for digit in self.0.iter() {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_iterator::all;
    use rstest::rstest;

    #[rstest]
    #[case('0', Ok(Digit::NoBoundary))]
    #[case('1', Ok(Digit::Boundary))]
    #[case('?', Ok(Digit::Unresolved))]
    #[case('2', Err(DigitParsingError('2')))]
    #[case('a', Err(DigitParsingError('a')))]
    fn test_digit_from_char(#[case] c: char, #[case] expected: Result<Digit, DigitParsingError>) {
        assert_eq!(Digit::try_from(c), expected)
    }

    #[test]
    fn test_digit_order_follows_chars() {
        let chars: String = all::<Digit>().map(|d| d.as_char()).collect();
        assert_eq!(chars, "01?");
    }

    #[test]
    fn test_digit_string_display() {
        let digits: DigitString = "01?0".parse().unwrap();
        assert_eq!(digits.len(), 4);
        assert_eq!(digits.to_string(), "01?0");
        assert!(digits.has_unresolved());
        let resolved: DigitString = "0110".parse().unwrap();
        assert!(!resolved.has_unresolved());
    }

    #[test]
    fn test_digit_string_rejects_unknown_chars() {
        let res = "01x".parse::<DigitString>();
        assert_eq!(res, Err(DigitParsingError('x')));
    }
}
