//! Draw sequence generation and custom sequence validation

use crate::errors::SequenceError;
use crate::games::types::{parse_leading_int, DrawItem, BALL_COUNT};
use rand::Rng;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// The 75 balls in draw order.
///
/// Only constructed from the standard set or from validated custom input,
/// so it always holds every number 1..=75 exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    items: Vec<DrawItem>,
}

impl Sequence {
    /// Balls 1..=75 in ascending order
    pub fn standard() -> Self {
        let items = (1..=BALL_COUNT as u8).filter_map(DrawItem::new).collect();
        Self { items }
    }

    /// Sequence from an explicit ordering of the 75 numbers
    pub fn from_numbers(numbers: &[i64]) -> Result<Self, SequenceError> {
        let numbers = validate_numbers(numbers)?;
        let items = numbers.into_iter().filter_map(DrawItem::new).collect();
        Ok(Self { items })
    }

    /// Fisher-Yates: walk `i` from the end down to 1, swapping with a
    /// uniformly chosen index in `[0, i]`.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.items.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.items.swap(i, j);
        }
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.items.iter().map(DrawItem::number).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds the draw order for a game
pub struct SequenceBuilder<R: Rng> {
    rng: R,
}

impl<R: Rng> SequenceBuilder<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Custom order when `custom` is a valid permutation of 1..=75,
    /// otherwise a freshly shuffled standard sequence.
    pub fn build(&mut self, custom: Option<&str>) -> Sequence {
        let Some(raw) = custom.filter(|raw| !raw.is_empty()) else {
            return self.shuffled();
        };

        match Sequence::from_numbers(&parse_custom(raw)) {
            Ok(sequence) => {
                info!("Using custom numbering supplied by the caller");
                sequence
            }
            Err(e) => {
                warn!("Invalid custom numbering: {}", e);
                warn!("Using a shuffled standard sequence instead");
                self.shuffled()
            }
        }
    }

    fn shuffled(&mut self) -> Sequence {
        let mut sequence = Sequence::standard();
        sequence.shuffle(&mut self.rng);
        sequence
    }
}

/// Check a raw comma-separated sequence without building it
pub fn validate_custom(raw: &str) -> Result<Vec<u8>, SequenceError> {
    validate_numbers(&parse_custom(raw))
}

/// Comma-separated integers; tokens without a leading integer are dropped
fn parse_custom(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter_map(parse_leading_int)
        .collect()
}

/// Count, then range, then uniqueness
fn validate_numbers(numbers: &[i64]) -> Result<Vec<u8>, SequenceError> {
    if numbers.len() != BALL_COUNT {
        return Err(SequenceError::WrongCount {
            found: numbers.len(),
        });
    }

    let out_of_range: Vec<i64> = numbers
        .iter()
        .copied()
        .filter(|n| !(1..=BALL_COUNT as i64).contains(n))
        .collect();
    if !out_of_range.is_empty() {
        return Err(SequenceError::OutOfRange {
            values: out_of_range,
        });
    }

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<i64> = numbers
        .iter()
        .copied()
        .filter(|n| !seen.insert(*n))
        .collect();
    if !duplicates.is_empty() {
        return Err(SequenceError::Duplicates {
            values: duplicates.into_iter().collect(),
        });
    }

    Ok(numbers.iter().map(|&n| n as u8).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::BingoLetter;
    use rand::{rngs::StdRng, SeedableRng};

    fn ascending_csv() -> String {
        (1..=75).map(|n| n.to_string()).collect::<Vec<_>>().join(",")
    }

    fn assert_full_sequence(sequence: &Sequence) {
        assert_eq!(sequence.len(), BALL_COUNT);
        let mut numbers = sequence.numbers();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=75).collect::<Vec<u8>>());
        for item in sequence.items() {
            assert_eq!(Some(item.letter()), BingoLetter::for_number(item.number()));
            assert_eq!(item.label(), format!("{}{}", item.letter(), item.number()));
        }
    }

    #[test]
    fn test_generated_sequence_is_complete() {
        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(1));
        let sequence = builder.build(None);

        assert_full_sequence(&sequence);
        assert_ne!(sequence, Sequence::standard());
    }

    #[test]
    fn test_valid_custom_order_is_kept() {
        let numbers: Vec<i64> = (1..=75).rev().collect();
        let raw = numbers
            .iter()
            .map(|n| format!(" {} ", n))
            .collect::<Vec<_>>()
            .join(",");
        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(2));
        let sequence = builder.build(Some(raw.as_str()));

        assert_eq!(sequence.numbers(), (1..=75).rev().collect::<Vec<u8>>());
        assert_eq!(sequence.items()[0].label(), "O75");
        assert_eq!(sequence.items()[74].label(), "B1");
    }

    #[test]
    fn test_custom_build_is_repeatable() {
        let raw = ascending_csv();
        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(3));

        assert_eq!(builder.build(Some(raw.as_str())), builder.build(Some(raw.as_str())));
    }

    #[test]
    fn test_generated_builds_differ() {
        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(4));

        assert_ne!(builder.build(None), builder.build(None));
    }

    #[test]
    fn test_non_numeric_tokens_are_dropped() {
        let raw = format!("{},foo,,bar", ascending_csv());
        assert_eq!(validate_custom(&raw).map(|n| n.len()), Ok(75));
    }

    #[test]
    fn test_wrong_count_falls_back() {
        assert_eq!(
            validate_custom("1,2,3"),
            Err(SequenceError::WrongCount { found: 3 })
        );

        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(5));
        assert_full_sequence(&builder.build(Some("1,2,3")));
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let raw = ascending_csv().replacen("1,", "0,", 1).replace(",75", ",76");
        assert_eq!(
            validate_custom(&raw),
            Err(SequenceError::OutOfRange { values: vec![0, 76] })
        );

        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(6));
        assert_full_sequence(&builder.build(Some(raw.as_str())));
    }

    #[test]
    fn test_duplicates_fall_back() {
        let raw = ascending_csv().replace(",75", ",74");
        assert_eq!(
            validate_custom(&raw),
            Err(SequenceError::Duplicates { values: vec![74] })
        );

        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(7));
        assert_full_sequence(&builder.build(Some(raw.as_str())));
    }

    #[test]
    fn test_unparseable_falls_back() {
        let mut builder = SequenceBuilder::new(StdRng::seed_from_u64(8));
        assert_full_sequence(&builder.build(Some("not,a,sequence")));
    }

    #[test]
    fn test_range_checked_before_duplicates() {
        // 75 entries with both a duplicate and an out-of-range value
        let raw = ascending_csv().replace(",75", ",99").replacen("2,", "1,", 1);
        assert!(matches!(
            validate_custom(&raw),
            Err(SequenceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_shuffle_permutes_in_place() {
        let mut sequence = Sequence::standard();
        sequence.shuffle(&mut StdRng::seed_from_u64(9));
        assert_full_sequence(&sequence);
    }
}
