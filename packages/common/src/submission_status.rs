use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a submission during the judging lifecycle.
///
/// A submission is created as `Processing` and transitions exactly once to
/// one of the terminal statuses; terminal rows are never mutated again.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sea_orm::DeriveActiveEnum,
    sea_orm::EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Queued or currently being judged.
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    /// All test cases passed.
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    /// Output did not match the expected output for some test case.
    #[sea_orm(string_value = "WRONG_ANSWER")]
    WrongAnswer,
    /// Build failed, or the submission could not be judged at all.
    #[sea_orm(string_value = "COMPILATION_ERROR")]
    CompilationError,
}

impl SubmissionStatus {
    /// Returns true once judging is complete; terminal rows are immutable.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// All possible status values.
    pub const ALL: &'static [SubmissionStatus] = &[
        Self::Processing,
        Self::Accepted,
        Self::WrongAnswer,
        Self::CompilationError,
    ];

    /// Returns the persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Accepted => "ACCEPTED",
            Self::WrongAnswer => "WRONG_ANSWER",
            Self::CompilationError => "COMPILATION_ERROR",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Processing
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            SubmissionStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for SubmissionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(Self::Processing),
            "ACCEPTED" => Ok(Self::Accepted),
            "WRONG_ANSWER" => Ok(Self::WrongAnswer),
            "COMPILATION_ERROR" => Ok(Self::CompilationError),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
