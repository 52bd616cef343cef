//! Adapter for reading DogMove rows into typed records
//!
//! Headers are checked up front so a file lacking a required column fails
//! before any row is read. Rows are then deserialized with serde and checked
//! for non-finite sensor values and empty behavior labels. Only the header
//! row is trimmed; label cells keep their whitespace.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde::Serialize;

use crate::error::DataLoadError;
use crate::features::{FeatureDeriver, SubjectTrialOwners};
use crate::schema::columns::{check_headers, BEHAVIOR_COLUMNS};
use crate::types::RawRecord;

/// Reads delimited DogMove data
#[derive(Debug, Clone, Copy)]
pub struct RecordAdapter {
    delimiter: u8,
}

impl Default for RecordAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordAdapter {
    /// Comma-delimited adapter
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn reader<R: Read>(&self, rdr: R) -> csv::Reader<R> {
        ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(Trim::Headers)
            .from_reader(rdr)
    }

    /// Parse every row, stopping at the first bad one
    pub fn parse<R: Read>(&self, rdr: R) -> Result<Vec<RawRecord>, DataLoadError> {
        let mut reader = self.reader(rdr);
        check_headers(reader.headers()?)?;

        let mut records = Vec::new();
        for (idx, result) in reader.deserialize::<RawRecord>().enumerate() {
            let row = idx + 1;
            let record = result.map_err(|e| DataLoadError::InvalidRow {
                row,
                message: e.to_string(),
            })?;
            validate_record(&record, row)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Check every row and collect the problems instead of failing fast.
    ///
    /// Runs the same SubjectTrialID checks as loading, so a file that passes
    /// here also loads. A header error is still returned as `Err`, since no
    /// row can be read.
    pub fn validate<R: Read>(&self, rdr: R) -> Result<ValidationSummary, DataLoadError> {
        let mut reader = self.reader(rdr);
        check_headers(reader.headers()?)?;

        let mut summary = ValidationSummary::default();
        let mut owners = SubjectTrialOwners::new();
        for (idx, result) in reader.deserialize::<RawRecord>().enumerate() {
            let row = idx + 1;
            summary.total_rows += 1;

            let outcome = result
                .map_err(|e| DataLoadError::InvalidRow {
                    row,
                    message: e.to_string(),
                })
                .and_then(|record| {
                    validate_record(&record, row)?;
                    let id = FeatureDeriver::subject_trial_id(&record, row)?;
                    owners.claim(id, record.dog_id, record.test_num)
                });

            match outcome {
                Ok(()) => summary.valid_rows += 1,
                Err(e) => summary.issues.push(RowIssue {
                    row,
                    message: e.to_string(),
                }),
            }
        }

        Ok(summary)
    }
}

/// Check a deserialized record for values the pipeline cannot use
pub fn validate_record(record: &RawRecord, row: usize) -> Result<(), DataLoadError> {
    let numeric: [(&'static str, f64); 13] = [
        ("t_sec", record.t_sec),
        ("ABack_x", record.aback_x),
        ("ABack_y", record.aback_y),
        ("ABack_z", record.aback_z),
        ("ANeck_x", record.aneck_x),
        ("ANeck_y", record.aneck_y),
        ("ANeck_z", record.aneck_z),
        ("GBack_x", record.gback_x),
        ("GBack_y", record.gback_y),
        ("GBack_z", record.gback_z),
        ("GNeck_x", record.gneck_x),
        ("GNeck_y", record.gneck_y),
        ("GNeck_z", record.gneck_z),
    ];
    if let Some(&(column, _)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
        return Err(DataLoadError::NonFiniteValue { row, column });
    }

    for (column, label) in BEHAVIOR_COLUMNS.into_iter().zip(record.behavior_labels()) {
        if label.trim().is_empty() {
            return Err(DataLoadError::MissingLabel { row, column });
        }
    }

    Ok(())
}

/// One row that failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    /// 1-based data row number (the header is row 0)
    pub row: usize,
    pub message: String,
}

/// Result of validating a whole file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub issues: Vec<RowIssue>,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}
