//! Task title validation.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Minimum number of characters in a trimmed title.
pub const MIN_TITLE_CHARS: usize = 3;

/// Why a title was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TitleRejection {
    /// Nothing but whitespace.
    ///
    /// Reported with the same message as [`TitleRejection::TooShort`], so
    /// clients see one wording for every title that is too short.
    #[error("Title must be at least {} characters.", MIN_TITLE_CHARS)]
    Empty,
    /// Fewer than [`MIN_TITLE_CHARS`] characters after trimming.
    #[error("Title must be at least {min} characters.")]
    TooShort {
        /// Required minimum.
        min: usize,
        /// Characters actually present.
        actual: usize,
    },
}

/// A title that passed validation, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Trims surrounding whitespace and checks the minimum length.
    ///
    /// Length is counted in Unicode scalar values, so `"über"` has four.
    ///
    /// # Errors
    ///
    /// Returns [`TitleRejection::Empty`] for blank input and
    /// [`TitleRejection::TooShort`] when fewer than [`MIN_TITLE_CHARS`]
    /// characters remain.
    pub fn parse(raw: &str) -> Result<Self, TitleRejection> {
        let trimmed = raw.trim();
        let actual = trimmed.chars().count();
        if actual == 0 {
            return Err(TitleRejection::Empty);
        }
        if actual < MIN_TITLE_CHARS {
            return Err(TitleRejection::TooShort {
                min: MIN_TITLE_CHARS,
                actual,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
