//! DogMove column layout
//!
//! Fifteen numeric columns (identifiers, timestamp and two three-axis sensors
//! at two body locations) plus three behavior label columns are required.
//! `Task` and `PointEvent` are carried through when present.

use csv::StringRecord;

use crate::error::DataLoadError;

/// Schema name reported by the CLI
pub const SCHEMA_NAME: &str = "dogmove.csv.v1";

/// Columns every input file must provide
pub const REQUIRED_COLUMNS: [&str; 18] = [
    "DogID",
    "TestNum",
    "t_sec",
    "ABack_x",
    "ABack_y",
    "ABack_z",
    "ANeck_x",
    "ANeck_y",
    "ANeck_z",
    "GBack_x",
    "GBack_y",
    "GBack_z",
    "GNeck_x",
    "GNeck_y",
    "GNeck_z",
    "Behavior_1",
    "Behavior_2",
    "Behavior_3",
];

/// Columns read when present
pub const OPTIONAL_COLUMNS: [&str; 2] = ["Task", "PointEvent"];

/// Behavior label columns, in the order they are joined
pub const BEHAVIOR_COLUMNS: [&str; 3] = ["Behavior_1", "Behavior_2", "Behavior_3"];

/// Sampling rate of the DogMove recordings
pub const SAMPLE_RATE_HZ: f64 = 100.0;

/// Return the required columns missing from `headers`, in schema order
pub fn missing_columns(headers: &StringRecord) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.trim() == **required))
        .map(|c| c.to_string())
        .collect()
}

/// Check that `headers` contains every required column
pub fn check_headers(headers: &StringRecord) -> Result<(), DataLoadError> {
    let missing = missing_columns(headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataLoadError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_header_passes() {
        let mut columns: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        columns.extend(OPTIONAL_COLUMNS);
        let headers = StringRecord::from(columns);

        assert!(check_headers(&headers).is_ok());
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let columns: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "ANeck_y" && *c != "Behavior_3")
            .collect();
        let headers = StringRecord::from(columns);

        match check_headers(&headers) {
            Err(DataLoadError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["ANeck_y".to_string(), "Behavior_3".to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_header_whitespace_is_ignored() {
        let columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| format!(" {c} ")).collect();
        let headers = StringRecord::from(columns);

        assert!(missing_columns(&headers).is_empty());
    }
}
