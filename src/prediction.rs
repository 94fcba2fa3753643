//! Parsing of the predicted segmentations. Each line holds a single word, split into segments by
//! whitespace: `un break able` is the word `unbreakable` with boundaries before `b` and `a`.
use crate::digits::{Digit, DigitString};
use ahash::AHashMap;
use tracing::debug;

/// Predicted boundary digits of each word.
pub type PredictionMap = AHashMap<String, DigitString>;

/// Computes the digits of a word from its segments. Each segment of length `n` contributes `n - 1`
/// `0`s and consecutive segments are separated by a single `1`. The resulting string is one digit
/// shorter than the word.
pub fn segment_digits<'a, I>(segments: I) -> DigitString
where
    I: IntoIterator<Item = &'a str>,
{
    let mut digits = DigitString::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            digits.push(Digit::Boundary);
        }
        let len = segment.chars().count();
        digits.extend(std::iter::repeat(Digit::NoBoundary).take(len.saturating_sub(1)));
    }
    digits
}

/// Parses the predictions. Blank lines are skipped and a word seen twice keeps its last
/// segmentation.
pub fn parse_predictions(text: &str) -> PredictionMap {
    let mut predictions = PredictionMap::default();
    for line in text.lines() {
        let segments: Vec<&str> = line.split_whitespace().collect();
        if segments.is_empty() {
            continue;
        }
        let word = segments.concat();
        let digits = segment_digits(segments.iter().copied());
        if let Some(previous) = predictions.insert(word, digits) {
            debug!(
                previous = %previous,
                "predicted word seen twice, keeping the last segmentation"
            );
        }
    }
    debug!(words = predictions.len(), "parsed predictions");
    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};
    use rstest::rstest;

    #[rstest]
    #[case("ab", "ab", "0")]
    #[case("a b", "ab", "1")]
    #[case("un break able", "unbreakable", "0100001000")]
    #[case("  talo   ssa ", "talossa", "000100")]
    #[case("a", "a", "")]
    #[case("a\tb c", "abc", "11")]
    fn test_parse_single_line(#[case] line: &str, #[case] word: &str, #[case] expected: &str) {
        let predictions = parse_predictions(line);
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions.get(word).unwrap().to_string(), expected);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let predictions = parse_predictions("ab\n\n   \nc d\n");
        assert_eq!(predictions.len(), 2);
        assert!(!predictions.contains_key(""));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let predictions = parse_predictions("a bc\nab c\n");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions.get("abc").unwrap().to_string(), "01");
    }

    #[test]
    fn test_multibyte_characters_count_once() {
        let predictions = parse_predictions("kää nnös");
        assert_eq!(predictions.get("käännös").unwrap().to_string(), "001000");
    }

    #[test]
    fn test_property_digits_are_one_shorter_than_word() {
        fn one_shorter(segments: Vec<String>) -> TestResult {
            let segments: Vec<String> = segments
                .into_iter()
                .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
                .filter(|s| !s.is_empty())
                .collect();
            if segments.is_empty() {
                return TestResult::discard();
            }
            let line = segments.join(" ");
            let predictions = parse_predictions(&line);
            let word = segments.concat();
            match predictions.get(&word) {
                Some(digits) => TestResult::from_bool(digits.len() == word.chars().count() - 1),
                None => TestResult::failed(),
            }
        }
        let mut qc = QuickCheck::new().tests(1000);
        qc.quickcheck(one_shorter as fn(Vec<String>) -> TestResult)
    }
}
