//! Error types for DogMove

use thiserror::Error;

/// Errors raised while reading and preparing the dataset
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Row {row}: empty behavior label in column {column}")]
    MissingLabel { row: usize, column: &'static str },

    #[error("Row {row}: non-finite value in column {column}")]
    NonFiniteValue { row: usize, column: &'static str },

    #[error("Row {row}: DogID {dog_id} and TestNum {test_num} do not fit a SubjectTrialID")]
    SubjectTrialOverflow { row: usize, dog_id: u32, test_num: u32 },

    #[error(
        "SubjectTrialID {id} is ambiguous: (DogID {first_dog}, TestNum {first_test}) and (DogID {second_dog}, TestNum {second_test})"
    )]
    AmbiguousSubjectTrial {
        id: u64,
        first_dog: u32,
        first_test: u32,
        second_dog: u32,
        second_test: u32,
    },
}

/// Raised when step counting is asked for a behavior that is not a gait
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Behavior is not a gait: {label}")]
pub struct InvalidBehaviorError {
    pub label: String,
}

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    InvalidBehavior(#[from] InvalidBehaviorError),

    #[error("Unknown SubjectTrialID: {0}")]
    UnknownSubjectTrial(u64),

    #[error("Unknown signal column: {0}")]
    UnknownColumn(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
