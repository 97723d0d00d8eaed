//! Reading metadata derived from clip content.
//!
//! Used on the write path and by the migration backfill, so both must agree
//! on exactly one definition of a "word".

use serde::{Deserialize, Serialize};

/// Assumed reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: u32 = 200;

/// Derived reading metadata for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingMetadata {
    /// Number of whitespace-delimited, non-empty tokens.
    pub word_count: u32,
    /// Estimated reading time in whole minutes, rounded up.
    pub reading_time: u32,
}

/// Derive word count and reading time from raw text content.
///
/// Empty or whitespace-only content yields zero for both fields.
pub fn derive(content: &str) -> ReadingMetadata {
    let word_count = u32::try_from(content.split_whitespace().count()).unwrap_or(u32::MAX);
    ReadingMetadata {
        word_count,
        reading_time: word_count.div_ceil(WORDS_PER_MINUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_content() {
        assert_eq!(derive(""), ReadingMetadata::default());
        assert_eq!(derive(" \t\n  "), ReadingMetadata::default());
    }

    #[test]
    fn test_short_content_rounds_up_to_one_minute() {
        let meta = derive("one two three");
        assert_eq!(meta.word_count, 3);
        assert_eq!(meta.reading_time, 1);
    }

    #[test]
    fn test_runs_of_whitespace_collapse() {
        let meta = derive("  one\t\ttwo \n\n three  ");
        assert_eq!(meta.word_count, 3);
    }

    #[test]
    fn test_reading_time_boundaries() {
        let words = |n: usize| vec!["w"; n].join(" ");

        assert_eq!(derive(&words(200)).reading_time, 1);
        assert_eq!(derive(&words(201)).reading_time, 2);
        assert_eq!(derive(&words(400)).reading_time, 2);

        let meta = derive(&words(450));
        assert_eq!(meta.word_count, 450);
        assert_eq!(meta.reading_time, 3);
    }

    proptest! {
        #[test]
        fn prop_reading_time_is_ceiling_of_words(content in "\\PC{0,2000}") {
            let meta = derive(&content);
            let expected = (f64::from(meta.word_count) / f64::from(WORDS_PER_MINUTE)).ceil();
            prop_assert_eq!(f64::from(meta.reading_time), expected);
        }

        #[test]
        fn prop_derive_is_deterministic(content in "[a-z \\t\\n]{0,500}") {
            prop_assert_eq!(derive(&content), derive(&content));
        }

        #[test]
        fn prop_word_count_matches_token_count(words in proptest::collection::vec("[a-z]{1,8}", 0..300)) {
            let content = words.join("  ");
            prop_assert_eq!(derive(&content).word_count as usize, words.len());
        }
    }
}
