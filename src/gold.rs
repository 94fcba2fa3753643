/**
This module parses the gold annotation. The gold file is a list of line pairs: a rule line, aligned
character by character with the segmentation line that follows it. The segmentation line starts
with a numeric id and holds the annotated word:

```text
    a a
1 ta.l.o
```

* `+`, `-` and `/` mark a boundary.
* `.` marks a boundary governed by a theory. The rule-id is read on the rule line, right above the
  dot.
* Everything after a `;` is a comment.

Each dot becomes a `?` digit. The positions of the `?` are grouped by rule in the `RuleIndex`, so
that they can be resolved later on.
*/
use crate::digits::{Digit, DigitString};
use crate::theory::TheoryTable;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::ops::Deref;
use tracing::{debug, warn};

/// Gold boundary digits of each word. Unresolved boundaries are `?`.
pub type GoldMap = AHashMap<String, DigitString>;

const COMMENT: char = ';';

/// Positions, in the digit string of a word, of the boundaries governed by one occurrence of a
/// rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WildcardGroup(Vec<usize>);

impl WildcardGroup {
    pub fn new(positions: Vec<usize>) -> Self {
        Self(positions)
    }
    fn push(&mut self, position: usize) {
        self.0.push(position)
    }
}

impl Deref for WildcardGroup {
    type Target = [usize];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Groups of a single word, by rule-id, in order of first appearance.
#[derive(Debug, Default)]
struct WordRules(Vec<(String, Vec<WildcardGroup>)>);

impl WordRules {
    /// A position joins the last group of its rule while that group is shorter than the width of
    /// the rule. Otherwise, it opens a new group.
    fn register(&mut self, rule_id: String, position: usize, width: usize) {
        match self.0.iter_mut().find(|(id, _)| *id == rule_id) {
            Some((_, groups)) => match groups.last_mut() {
                Some(last) if last.len() < width => last.push(position),
                _ => groups.push(WildcardGroup::new(vec![position])),
            },
            None => self
                .0
                .push((rule_id, vec![WildcardGroup::new(vec![position])])),
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Index of the wildcard groups: rule-id -> word -> groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleIndex {
    rules: AHashMap<String, AHashMap<String, Vec<WildcardGroup>>>,
}

impl RuleIndex {
    fn from_words(words: AHashMap<String, WordRules>) -> Self {
        let mut rules: AHashMap<String, AHashMap<String, Vec<WildcardGroup>>> =
            AHashMap::default();
        for (word, word_rules) in words.into_iter() {
            for (rule_id, groups) in word_rules.0.into_iter() {
                rules.entry(rule_id).or_default().insert(word.clone(), groups);
            }
        }
        Self { rules }
    }

    /// Adds the groups of a rule for a word, replacing the previous ones.
    pub fn insert<S: Into<String>, W: Into<String>>(
        &mut self,
        rule_id: S,
        word: W,
        groups: Vec<WildcardGroup>,
    ) {
        self.rules
            .entry(rule_id.into())
            .or_default()
            .insert(word.into(), groups);
    }

    pub fn get(&self, rule_id: &str) -> Option<&AHashMap<String, Vec<WildcardGroup>>> {
        self.rules.get(rule_id)
    }

    pub fn groups(&self, rule_id: &str, word: &str) -> Option<&[WildcardGroup]> {
        self.rules
            .get(rule_id)
            .and_then(|words| words.get(word))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AHashMap<String, Vec<WildcardGroup>>)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// A blank rule-id or a blank word means the rule lines are not aligned with the segmentation
    /// lines.
    pub fn check_alignment(&self) -> Result<(), AlignmentError> {
        let mut misaligned: BTreeMap<String, BTreeMap<String, Vec<Vec<usize>>>> = BTreeMap::new();
        for (rule_id, words) in self.rules.iter() {
            let blank_rule = rule_id.trim().is_empty();
            for (word, groups) in words.iter() {
                if blank_rule || word.trim().is_empty() {
                    misaligned
                        .entry(rule_id.clone())
                        .or_default()
                        .insert(word.clone(), groups.iter().map(|g| g.to_vec()).collect());
                }
            }
        }
        if misaligned.is_empty() {
            Ok(())
        } else {
            Err(AlignmentError::BlankKey(misaligned))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The rule line and the segmentation line are not aligned.
pub enum AlignmentError {
    /// A `.` sits below a blank character of the rule line.
    BlankRule {
        rule_code: char,
        word: String,
        segment: String,
        line: usize,
    },
    /// The rule index holds a blank rule-id or a blank word. Holds the offending entries.
    BlankKey(BTreeMap<String, BTreeMap<String, Vec<Vec<usize>>>>),
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankRule {
                rule_code,
                word,
                segment,
                line,
            } => write!(
                f,
                "Theory rule not aligned with gold text (line {}): {:?} - {} in {}",
                line, rule_code, word, segment
            ),
            Self::BlankKey(entries) => {
                writeln!(f, "Labels not aligned with words, please check the gold file.")?;
                for (rule_id, words) in entries.iter() {
                    for (word, groups) in words.iter() {
                        writeln!(f, "{:?} -> {:?}: {:?}", rule_id, word, groups)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Error for AlignmentError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoldError {
    Alignment(AlignmentError),
    /// A segmentation line must contain exactly an id and a segmentation.
    MalformedLine { line: usize, content: String },
}

impl Display for GoldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alignment(err) => Display::fmt(err, f),
            Self::MalformedLine { line, content } => write!(
                f,
                "Line {} is not of the form `<id> <segmentation>`: {:?}",
                line, content
            ),
        }
    }
}

impl Error for GoldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alignment(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AlignmentError> for GoldError {
    fn from(value: AlignmentError) -> Self {
        Self::Alignment(value)
    }
}

/// Result of the parsing of the gold file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoldAnnotation {
    pub digits: GoldMap,
    pub rules: RuleIndex,
}

impl GoldAnnotation {
    /// Number of `?` across all the words.
    pub fn unresolved_count(&self) -> usize {
        self.digits
            .values()
            .map(|d| d.iter().filter(|d| **d == Digit::Unresolved).count())
            .sum()
    }
}

/// State of the scan of a segmentation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// The previous char is a word char. The next word char gets a `0`.
    MidRun,
    /// The previous char is a boundary marker, which already emitted the digit of the next word
    /// char.
    AfterBoundary,
}

fn strip_comment(line: &str) -> &str {
    match line.split_once(COMMENT) {
        Some((content, _)) => content.trim_end(),
        None => line.trim_end(),
    }
}

fn is_segmentation_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Finds the rule-id governing the position `index` of the aligned rule line. The char at `index`
/// must not be blank.
fn rule_code_at(rule_chars: &[char], index: usize, theories: &TheoryTable) -> String {
    let start = rule_chars[..index]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |p| p + 1);
    let end = rule_chars[index..]
        .iter()
        .position(|c| c.is_whitespace())
        .map_or(rule_chars.len(), |p| index + p);
    let run: String = rule_chars[start..end].iter().collect();
    if theories.contains(&run) {
        return run;
    }
    let single = rule_chars[index].to_string();
    if theories.contains(&single) {
        single
    } else {
        run
    }
}

/// Parser of the gold file. Keeps track of the unknown rules, so they are reported once.
struct GoldParser<'t> {
    theories: &'t TheoryTable,
    unknown_rules: AHashSet<String>,
}

impl<'t> GoldParser<'t> {
    fn new(theories: &'t TheoryTable) -> Self {
        Self {
            theories,
            unknown_rules: AHashSet::default(),
        }
    }

    fn width(&mut self, rule_id: &str) -> usize {
        match self.theories.width(rule_id) {
            Some(width) => width,
            None => {
                if self.unknown_rules.insert(rule_id.to_string()) {
                    warn!(rule_id, "rule has no theory, its boundaries cannot be resolved");
                }
                1
            }
        }
    }

    /// Scans a single segmentation line.
    fn parse_entry(
        &mut self,
        seg_id: &str,
        segment: &str,
        rule_line: &str,
        line: usize,
    ) -> Result<(String, DigitString, WordRules), AlignmentError> {
        let segment_chars: Vec<char> = segment.chars().collect();
        let mut rule_chars: Vec<char> = rule_line
            .chars()
            .skip(seg_id.chars().count() + 1)
            .collect();
        if rule_chars.len() < segment_chars.len() {
            rule_chars.resize(segment_chars.len(), ' ');
        }

        let mut word = String::with_capacity(segment.len());
        let mut digits = DigitString::with_capacity(segment_chars.len());
        let mut word_rules = WordRules::default();
        let mut state = ScanState::MidRun;
        if let Some(first) = segment_chars.first() {
            word.push(*first);
        }
        for (index, (&c, &rule_char)) in segment_chars
            .iter()
            .zip(rule_chars.iter())
            .enumerate()
            .skip(1)
        {
            match c {
                '+' | '-' | '/' => {
                    digits.push(Digit::Boundary);
                    state = ScanState::AfterBoundary;
                }
                '.' => {
                    if rule_char.is_whitespace() {
                        return Err(AlignmentError::BlankRule {
                            rule_code: rule_char,
                            word,
                            segment: segment.to_string(),
                            line,
                        });
                    }
                    let rule_id = rule_code_at(&rule_chars, index, self.theories);
                    let width = self.width(&rule_id);
                    digits.push(Digit::Unresolved);
                    word_rules.register(rule_id, digits.len() - 1, width);
                    state = ScanState::AfterBoundary;
                }
                c => {
                    if state == ScanState::MidRun {
                        digits.push(Digit::NoBoundary);
                    }
                    word.push(c);
                    state = ScanState::MidRun;
                }
            }
        }
        Ok((word, digits, word_rules))
    }
}

/// Parses the gold file. A segmentation line without a rule line above it (first line of the file,
/// or right after another segmentation line) is paired with an empty rule line. A word seen twice
/// keeps its last annotation.
pub fn parse_gold(text: &str, theories: &TheoryTable) -> Result<GoldAnnotation, GoldError> {
    let mut parser = GoldParser::new(theories);
    let mut digits = GoldMap::default();
    let mut words: AHashMap<String, WordRules> = AHashMap::default();
    let mut rule_line = "";
    for (i, raw_line) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = strip_comment(raw_line);
        if !is_segmentation_line(line) {
            rule_line = line;
            continue;
        }
        let mut fields = line.split_whitespace();
        let (seg_id, segment) = match (fields.next(), fields.next(), fields.next()) {
            (Some(seg_id), Some(segment), None) => (seg_id, segment),
            _ => {
                return Err(GoldError::MalformedLine {
                    line: line_number,
                    content: line.to_string(),
                })
            }
        };
        let (word, word_digits, word_rules) =
            parser.parse_entry(seg_id, segment, rule_line, line_number)?;
        rule_line = "";
        if digits.insert(word.clone(), word_digits).is_some() {
            debug!(
                word = %word,
                line = line_number,
                "gold word seen twice, keeping the last annotation"
            );
        }
        if word_rules.is_empty() {
            words.remove(&word);
        } else {
            words.insert(word, word_rules);
        }
    }
    let rules = RuleIndex::from_words(words);
    debug!(words = digits.len(), rules = rules.len(), "parsed gold annotation");
    Ok(GoldAnnotation { digits, rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::TheoryRecord;
    use rstest::rstest;

    fn theories() -> TheoryTable {
        TheoryTable::from_records(
            [
                TheoryRecord::new("a", 4, vec![0, 3]),
                TheoryRecord::new("b", 2, vec![1, 0]),
                TheoryRecord::new("R1", 2, vec![0, 1]),
                TheoryRecord::new("R2", 2, vec![0, 1]),
            ]
            .iter(),
        )
        .unwrap()
    }

    fn groups(annotation: &GoldAnnotation, rule_id: &str, word: &str) -> Vec<Vec<usize>> {
        annotation
            .rules
            .groups(rule_id, word)
            .unwrap()
            .iter()
            .map(|g| g.to_vec())
            .collect()
    }

    #[rstest]
    #[case("1 ab", "ab", "0")]
    #[case("1 a+b", "ab", "1")]
    #[case("1 talo-ssa", "talossa", "000100")]
    #[case("1 un/break+able", "unbreakable", "0100001000")]
    #[case("1 a", "a", "")]
    #[case("12 kää+nnös", "käännös", "001000")]
    fn test_parse_without_rules(#[case] text: &str, #[case] word: &str, #[case] expected: &str) {
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.len(), 1);
        assert_eq!(annotation.digits.get(word).unwrap().to_string(), expected);
        assert!(annotation.rules.is_empty());
    }

    #[test]
    fn test_single_rule_occurrence() {
        let text = "   R1\n1 a.b";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.get("ab").unwrap().to_string(), "?");
        assert_eq!(groups(&annotation, "R1", "ab"), vec![vec![0]]);
        assert_eq!(annotation.unresolved_count(), 1);
    }

    #[test]
    fn test_wide_rule_groups_positions() {
        let text = "    a a\n1 ta.l.o";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.get("talo").unwrap().to_string(), "0??");
        assert_eq!(groups(&annotation, "a", "talo"), vec![vec![1, 2]]);
    }

    #[test]
    fn test_wide_rule_opens_new_group_when_full() {
        let text = "   a a a\n1 a.b.c.d";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.get("abcd").unwrap().to_string(), "???");
        assert_eq!(groups(&annotation, "a", "abcd"), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_repeated_narrow_rule_gives_independent_groups() {
        let text = "  R2 R2\n1 a.b.c";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.get("abc").unwrap().to_string(), "??");
        assert_eq!(groups(&annotation, "R2", "abc"), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_adjacent_single_char_rules() {
        let text = "   ab\n1 x..y";
        let annotation = parse_gold(text, &theories()).unwrap();
        // Two markers in a row emit two digits for the same char.
        assert_eq!(annotation.digits.get("xy").unwrap().to_string(), "??");
        assert_eq!(groups(&annotation, "a", "xy"), vec![vec![0]]);
        assert_eq!(groups(&annotation, "b", "xy"), vec![vec![1]]);
    }

    #[test]
    fn test_mixed_markers() {
        let text = "       b\n1 ta+lo.ssa";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(
            annotation.digits.get("talossa").unwrap().to_string(),
            "010?00"
        );
        assert_eq!(groups(&annotation, "b", "talossa"), vec![vec![3]]);
    }

    #[test]
    fn test_blank_rule_below_dot() {
        let text = "        \n1 a.b";
        let res = parse_gold(text, &theories());
        assert_eq!(
            res,
            Err(GoldError::Alignment(AlignmentError::BlankRule {
                rule_code: ' ',
                word: String::from("a"),
                segment: String::from("a.b"),
                line: 2,
            }))
        );
    }

    #[test]
    fn test_misaligned_rule_line() {
        let text = "     R1  \n1 a.b";
        let res = parse_gold(text, &theories());
        assert!(matches!(
            res,
            Err(GoldError::Alignment(AlignmentError::BlankRule { .. }))
        ));
    }

    #[test]
    fn test_first_line_without_rule_line() {
        let text = "1 a.b\n";
        let res = parse_gold(text, &theories());
        assert!(matches!(
            res,
            Err(GoldError::Alignment(AlignmentError::BlankRule { line: 1, .. }))
        ));
        let annotation = parse_gold("1 a+b\n   R1\n2 c.d", &theories()).unwrap();
        assert_eq!(annotation.digits.get("ab").unwrap().to_string(), "1");
        assert_eq!(groups(&annotation, "R1", "cd"), vec![vec![0]]);
    }

    #[test]
    fn test_consecutive_segmentation_lines_do_not_share_rules() {
        let text = "   R1\n1 a.b\n2 c.d";
        let res = parse_gold(text, &theories());
        assert!(matches!(
            res,
            Err(GoldError::Alignment(AlignmentError::BlankRule { line: 3, .. }))
        ));
    }

    #[test]
    fn test_comments_are_stripped() {
        let text = "; a header\n   R1 ; the rule\n1 a.b ; first word\n\n2 c+d;second";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.len(), 2);
        assert_eq!(annotation.digits.get("ab").unwrap().to_string(), "?");
        assert_eq!(annotation.digits.get("cd").unwrap().to_string(), "1");
    }

    #[rstest]
    #[case("1 ab cd", 1)]
    #[case("x\n2", 2)]
    fn test_malformed_line(#[case] text: &str, #[case] line: usize) {
        let res = parse_gold(text, &theories());
        assert!(matches!(res, Err(GoldError::MalformedLine { line: l, .. }) if l == line));
    }

    #[test]
    fn test_unknown_rule_opens_groups_of_one() {
        let text = "   z z\n1 a.b.c";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(groups(&annotation, "z", "abc"), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_reoccurring_word_replaces_groups() {
        let text = "   R1\n1 a.b\n2 a+b";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.digits.get("ab").unwrap().to_string(), "1");
        assert!(annotation.rules.get("R1").is_none());
    }

    #[test]
    fn test_check_alignment() {
        let text = "   R1\n1 a.b";
        let annotation = parse_gold(text, &theories()).unwrap();
        assert_eq!(annotation.rules.check_alignment(), Ok(()));

        let mut index = RuleIndex::default();
        index.insert(" ", "ab", vec![WildcardGroup::new(vec![0])]);
        index.insert("R1", "cd", vec![WildcardGroup::new(vec![0])]);
        let err = index.check_alignment().unwrap_err();
        match err {
            AlignmentError::BlankKey(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[" "]["ab"], vec![vec![0]]);
            }
            _ => panic!("expected a blank key"),
        }
    }

    #[test]
    fn test_property_digits_are_one_shorter_than_word() {
        let text = "    a a\n1 ta.l.o\n2 un/break+able\n       b\n3 ta+lo.ssa\n4 x";
        let annotation = parse_gold(text, &theories()).unwrap();
        for (word, digits) in annotation.digits.iter() {
            assert_eq!(digits.len(), word.chars().count() - 1, "{}", word);
        }
    }
}
