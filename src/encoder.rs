//! Report encoding
//!
//! This module turns step segments into JSON step reports carrying producer
//! and provenance metadata, and writes signal series as CSV.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ComputeError;
use crate::types::{
    ReportProducer, ReportProvenance, SignalSeries, StepEvent, StepReport, StepSegment,
};
use crate::{DOGMOVE_VERSION, PRODUCER_NAME};

/// Encoder for step reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the report for a counted segment
    pub fn encode(
        &self,
        segment: &StepSegment,
        source_path: Option<&Path>,
        sample_rate_hz: f64,
    ) -> StepReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: DOGMOVE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source_path: source_path.map(|p| p.display().to_string()),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let steps = segment
            .peaks
            .iter()
            .map(|&index| StepEvent {
                index,
                t_sec: segment.t_sec[index],
                value: segment.signal[index],
            })
            .collect();

        let threshold = segment.prominence_threshold;

        StepReport {
            producer,
            provenance,
            subject_trial_id: segment.subject_trial_id,
            behavior: segment.behavior.clone(),
            distance: segment.distance,
            prominence_threshold: threshold.is_finite().then_some(threshold),
            sample_rate_hz,
            samples: segment.signal.len(),
            step_count: segment.step_count(),
            cadence_hz: segment.cadence_hz(),
            steps,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        segment: &StepSegment,
        source_path: Option<&Path>,
        sample_rate_hz: f64,
    ) -> Result<String, ComputeError> {
        let report = self.encode(segment, source_path, sample_rate_hz);
        serde_json::to_string(&report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// One-line textual step count
    pub fn summary_line(step_count: usize) -> String {
        format!("steps identified in this signal: {step_count}")
    }
}

/// Write `series` as CSV: `t_sec` followed by the selected columns
pub fn write_series_csv<W: Write>(series: &SignalSeries, writer: W) -> Result<(), ComputeError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let encoding = |e: csv::Error| ComputeError::EncodingError(e.to_string());

    let mut header = vec!["t_sec".to_string()];
    header.extend(series.columns.iter().map(|(c, _)| c.as_str().to_string()));
    wtr.write_record(&header).map_err(encoding)?;

    for (row, t) in series.t_sec.iter().enumerate() {
        let mut record = Vec::with_capacity(series.columns.len() + 1);
        record.push(t.to_string());
        record.extend(series.columns.iter().map(|(_, values)| values[row].to_string()));
        wtr.write_record(&record).map_err(encoding)?;
    }

    wtr.flush()
        .map_err(|e| ComputeError::EncodingError(e.to_string()))?;
    Ok(())
}
