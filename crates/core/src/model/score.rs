use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be between 0 and 100, got {0}")]
    OutOfRange(u8),

    #[error("cannot compute a percentage of zero items")]
    EmptyWhole,

    #[error("part ({part}) exceeds whole ({whole})")]
    PartExceedsWhole { part: usize, whole: usize },
}

/// Percentage in `0..=100`, used for quiz results and passing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const PERFECT: Score = Score(100);

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` if `value` is above 100.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > 100 {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Percentage of `part` out of `whole`, rounded half-up.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::EmptyWhole` when `whole` is zero and
    /// `ScoreError::PartExceedsWhole` when `part > whole`.
    pub fn from_ratio(part: usize, whole: usize) -> Result<Self, ScoreError> {
        if whole == 0 {
            return Err(ScoreError::EmptyWhole);
        }
        if part > whole {
            return Err(ScoreError::PartExceedsWhole { part, whole });
        }
        Ok(Self(rounded_percent(part, whole)))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// True when this score meets or beats `threshold`.
    #[must_use]
    pub fn passes(self, threshold: Score) -> bool {
        self >= threshold
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Completion percentage for `part` of `whole` items; an empty whole is 0%.
#[must_use]
pub fn completion_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    rounded_percent(part.min(whole), whole)
}

// Integer round-half-up of 100 * part / whole. Caller guarantees part <= whole, whole > 0.
fn rounded_percent(part: usize, whole: usize) -> u8 {
    let part = part as u128;
    let whole = whole as u128;
    let pct = (200 * part + whole) / (2 * whole);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_scores_above_hundred() {
        assert_eq!(Score::new(101), Err(ScoreError::OutOfRange(101)));
        assert_eq!(Score::new(100).unwrap(), Score::PERFECT);
    }

    #[test]
    fn ratio_rounds_half_up() {
        assert_eq!(Score::from_ratio(4, 5).unwrap().value(), 80);
        assert_eq!(Score::from_ratio(1, 8).unwrap().value(), 13);
        assert_eq!(Score::from_ratio(2, 3).unwrap().value(), 67);
        assert_eq!(Score::from_ratio(1, 3).unwrap().value(), 33);
        assert_eq!(Score::from_ratio(0, 7).unwrap(), Score::ZERO);
    }

    #[test]
    fn ratio_rejects_bad_inputs() {
        assert_eq!(Score::from_ratio(1, 0), Err(ScoreError::EmptyWhole));
        assert_eq!(
            Score::from_ratio(6, 5),
            Err(ScoreError::PartExceedsWhole { part: 6, whole: 5 })
        );
    }

    #[test]
    fn completion_of_empty_course_is_zero() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(2, 5), 40);
        assert_eq!(completion_percent(5, 5), 100);
    }

    #[test]
    fn passing_is_inclusive() {
        let threshold = Score::new(70).unwrap();
        assert!(Score::new(70).unwrap().passes(threshold));
        assert!(!Score::new(69).unwrap().passes(threshold));
    }

    #[test]
    fn serde_enforces_range() {
        assert!(serde_json::from_str::<Score>("120").is_err());
        let score: Score = serde_json::from_str("80").unwrap();
        assert_eq!(serde_json::to_string(&score).unwrap(), "80");
    }
}
