//! Caller-side field checks.
//!
//! The store only guarantees title uniqueness. Everything else about a
//! well-formed quest is checked here, before a save is attempted.

use crate::quest::QuestFields;

pub const MAX_TITLE_CHARS: usize = 50;
pub const MIN_REWARD: i64 = 10;
pub const MAX_REWARD: i64 = 10_000;
pub const DEFAULT_MIN_DESCRIPTION_WORDS: usize = 50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title is {len} characters long (max {max})", max = MAX_TITLE_CHARS)]
    TitleTooLong { len: usize },

    #[error("reward {0} is outside {min}..={max}", min = MIN_REWARD, max = MAX_REWARD)]
    RewardOutOfRange(i64),

    #[error("deadline '{0}' is not an ISO-8601 timestamp")]
    InvalidDeadline(String),

    #[error("description has {words} words (at least {min} required)")]
    DescriptionTooShort { words: usize, min: usize },

    #[error("marker position ({x}, {y}) is not a finite point")]
    InvalidCoordinate { x: f64, y: f64 },
}

/// Title rule enforced by the editor's input validator
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 || title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong { len });
    }
    Ok(())
}

pub fn validate_reward(reward: i64) -> Result<(), ValidationError> {
    if !(MIN_REWARD..=MAX_REWARD).contains(&reward) {
        return Err(ValidationError::RewardOutOfRange(reward));
    }
    Ok(())
}

/// Map markers must sit on a real point; NaN would be stored as NULL
pub fn validate_coordinates(x: f64, y: f64) -> Result<(), ValidationError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ValidationError::InvalidCoordinate { x, y });
    }
    Ok(())
}

/// Accepts RFC 3339 (`2025-01-01T00:00:00+02:00`) as well as naive local
/// timestamps with or without seconds.
pub fn validate_deadline(deadline: &str) -> Result<(), ValidationError> {
    let deadline = deadline.trim();
    if chrono::DateTime::parse_from_rfc3339(deadline).is_ok() {
        return Ok(());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if chrono::NaiveDateTime::parse_from_str(deadline, format).is_ok() {
            return Ok(());
        }
    }
    Err(ValidationError::InvalidDeadline(deadline.to_string()))
}

impl QuestFields {
    /// The checks every save must pass, autosave included.
    pub fn validate_for_store(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_reward(self.reward)?;
        validate_deadline(&self.deadline)
    }

    /// Full check run on an explicit "create" action.
    pub fn validate(&self, min_description_words: usize) -> Result<(), ValidationError> {
        self.validate_for_store()?;
        let words = self.word_count();
        if words < min_description_words {
            return Err(ValidationError::DescriptionTooShort {
                words,
                min: min_description_words,
            });
        }
        Ok(())
    }
}
