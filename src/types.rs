//! Core types for the DogMove pipeline
//!
//! This module defines the data structures that flow through each stage:
//! raw records, prepared records with derived fields, isolated step segments,
//! signal series and the encoded step report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// Subject and trial key: the decimal concatenation of DogID and TestNum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectTrialId(pub u64);

impl SubjectTrialId {
    /// Concatenate the decimal forms of `dog_id` and `test_num` into one key.
    ///
    /// Returns `None` when the concatenation does not fit in a `u64`.
    pub fn compose(dog_id: u32, test_num: u32) -> Option<Self> {
        format!("{dog_id}{test_num}").parse::<u64>().ok().map(Self)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubjectTrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectTrialId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Three-axis sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Axes {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Root of the sum of squares of the three axes
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One sample row as it appears in the DogMove file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "DogID")]
    pub dog_id: u32,
    #[serde(rename = "TestNum")]
    pub test_num: u32,
    /// Seconds since the start of the trial
    pub t_sec: f64,
    #[serde(rename = "ABack_x")]
    pub aback_x: f64,
    #[serde(rename = "ABack_y")]
    pub aback_y: f64,
    #[serde(rename = "ABack_z")]
    pub aback_z: f64,
    #[serde(rename = "ANeck_x")]
    pub aneck_x: f64,
    #[serde(rename = "ANeck_y")]
    pub aneck_y: f64,
    #[serde(rename = "ANeck_z")]
    pub aneck_z: f64,
    #[serde(rename = "GBack_x")]
    pub gback_x: f64,
    #[serde(rename = "GBack_y")]
    pub gback_y: f64,
    #[serde(rename = "GBack_z")]
    pub gback_z: f64,
    #[serde(rename = "GNeck_x")]
    pub gneck_x: f64,
    #[serde(rename = "GNeck_y")]
    pub gneck_y: f64,
    #[serde(rename = "GNeck_z")]
    pub gneck_z: f64,
    #[serde(rename = "Task", default)]
    pub task: Option<String>,
    #[serde(rename = "Behavior_1")]
    pub behavior_1: String,
    #[serde(rename = "Behavior_2")]
    pub behavior_2: String,
    #[serde(rename = "Behavior_3")]
    pub behavior_3: String,
    #[serde(rename = "PointEvent", default)]
    pub point_event: Option<String>,
}

impl RawRecord {
    pub fn back_accel(&self) -> Axes {
        Axes::new(self.aback_x, self.aback_y, self.aback_z)
    }

    pub fn neck_accel(&self) -> Axes {
        Axes::new(self.aneck_x, self.aneck_y, self.aneck_z)
    }

    pub fn back_gyro(&self) -> Axes {
        Axes::new(self.gback_x, self.gback_y, self.gback_z)
    }

    pub fn neck_gyro(&self) -> Axes {
        Axes::new(self.gneck_x, self.gneck_y, self.gneck_z)
    }

    /// The three behavior label columns in file order
    pub fn behavior_labels(&self) -> [&str; 3] {
        [&self.behavior_1, &self.behavior_2, &self.behavior_3]
    }
}

/// A raw record plus the fields derived at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRecord {
    /// Source row
    pub raw: RawRecord,
    /// DogID and TestNum concatenated
    pub subject_trial_id: SubjectTrialId,
    /// Behavior_1, Behavior_2 and Behavior_3 joined with underscores
    pub behavior: String,
    /// Neck accelerometer magnitude (always >= 0)
    pub aneck_rms: f64,
    /// Neck gyroscope magnitude (always >= 0)
    pub gneck_rms: f64,
}

impl PreparedRecord {
    pub fn t_sec(&self) -> f64 {
        self.raw.t_sec
    }
}

/// Columns that can be plotted against time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalColumn {
    #[serde(rename = "ABack_x")]
    ABackX,
    #[serde(rename = "ABack_y")]
    ABackY,
    #[serde(rename = "ABack_z")]
    ABackZ,
    #[serde(rename = "ANeck_x")]
    ANeckX,
    #[serde(rename = "ANeck_y")]
    ANeckY,
    #[serde(rename = "ANeck_z")]
    ANeckZ,
    #[serde(rename = "GBack_x")]
    GBackX,
    #[serde(rename = "GBack_y")]
    GBackY,
    #[serde(rename = "GBack_z")]
    GBackZ,
    #[serde(rename = "GNeck_x")]
    GNeckX,
    #[serde(rename = "GNeck_y")]
    GNeckY,
    #[serde(rename = "GNeck_z")]
    GNeckZ,
    #[serde(rename = "ANeck_RMS")]
    ANeckRms,
    #[serde(rename = "GNeck_RMS")]
    GNeckRms,
}

impl SignalColumn {
    pub const ALL: [SignalColumn; 14] = [
        SignalColumn::ABackX,
        SignalColumn::ABackY,
        SignalColumn::ABackZ,
        SignalColumn::ANeckX,
        SignalColumn::ANeckY,
        SignalColumn::ANeckZ,
        SignalColumn::GBackX,
        SignalColumn::GBackY,
        SignalColumn::GBackZ,
        SignalColumn::GNeckX,
        SignalColumn::GNeckY,
        SignalColumn::GNeckZ,
        SignalColumn::ANeckRms,
        SignalColumn::GNeckRms,
    ];

    /// Columns shown when the caller does not choose any
    pub const DEFAULT_SELECTION: [SignalColumn; 4] = [
        SignalColumn::ANeckRms,
        SignalColumn::ANeckX,
        SignalColumn::ANeckY,
        SignalColumn::ANeckZ,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalColumn::ABackX => "ABack_x",
            SignalColumn::ABackY => "ABack_y",
            SignalColumn::ABackZ => "ABack_z",
            SignalColumn::ANeckX => "ANeck_x",
            SignalColumn::ANeckY => "ANeck_y",
            SignalColumn::ANeckZ => "ANeck_z",
            SignalColumn::GBackX => "GBack_x",
            SignalColumn::GBackY => "GBack_y",
            SignalColumn::GBackZ => "GBack_z",
            SignalColumn::GNeckX => "GNeck_x",
            SignalColumn::GNeckY => "GNeck_y",
            SignalColumn::GNeckZ => "GNeck_z",
            SignalColumn::ANeckRms => "ANeck_RMS",
            SignalColumn::GNeckRms => "GNeck_RMS",
        }
    }

    /// Read this column's value from a prepared record
    pub fn value(&self, record: &PreparedRecord) -> f64 {
        let raw = &record.raw;
        match self {
            SignalColumn::ABackX => raw.back_accel().x,
            SignalColumn::ABackY => raw.back_accel().y,
            SignalColumn::ABackZ => raw.back_accel().z,
            SignalColumn::ANeckX => raw.neck_accel().x,
            SignalColumn::ANeckY => raw.neck_accel().y,
            SignalColumn::ANeckZ => raw.neck_accel().z,
            SignalColumn::GBackX => raw.back_gyro().x,
            SignalColumn::GBackY => raw.back_gyro().y,
            SignalColumn::GBackZ => raw.back_gyro().z,
            SignalColumn::GNeckX => raw.neck_gyro().x,
            SignalColumn::GNeckY => raw.neck_gyro().y,
            SignalColumn::GNeckZ => raw.neck_gyro().z,
            SignalColumn::ANeckRms => record.aneck_rms,
            SignalColumn::GNeckRms => record.gneck_rms,
        }
    }
}

impl fmt::Display for SignalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalColumn {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        SignalColumn::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| ComputeError::UnknownColumn(name.to_string()))
    }
}

/// Time series of selected columns for one subject/trial and behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub subject_trial_id: SubjectTrialId,
    pub behavior: String,
    pub t_sec: Vec<f64>,
    /// One entry per selected column, values aligned with `t_sec`
    pub columns: Vec<(SignalColumn, Vec<f64>)>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.t_sec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_sec.is_empty()
    }
}

/// Isolated gait segment with the detected step positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSegment {
    pub subject_trial_id: SubjectTrialId,
    pub behavior: String,
    /// Minimum peak separation in samples
    pub distance: usize,
    /// Minimum prominence (sample standard deviation of `signal`, NaN when undefined)
    pub prominence_threshold: f64,
    /// Isolated timestamps, 0-based
    pub t_sec: Vec<f64>,
    /// Isolated ANeck_RMS values, aligned with `t_sec`
    pub signal: Vec<f64>,
    /// Strictly ascending indices into `t_sec` / `signal`
    pub peaks: Vec<usize>,
}

impl StepSegment {
    pub fn step_count(&self) -> usize {
        self.peaks.len()
    }

    pub fn step_times(&self) -> Vec<f64> {
        self.peaks.iter().map(|&i| self.t_sec[i]).collect()
    }

    pub fn step_values(&self) -> Vec<f64> {
        self.peaks.iter().map(|&i| self.signal[i]).collect()
    }

    pub fn duration_sec(&self) -> f64 {
        match (self.t_sec.first(), self.t_sec.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Steps per second over the segment, if it spans a positive duration
    pub fn cadence_hz(&self) -> Option<f64> {
        let duration = self.duration_sec();
        if duration > 0.0 {
            Some(self.step_count() as f64 / duration)
        } else {
            None
        }
    }
}

/// Dataset-level counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub subject_trials: usize,
    pub behaviors: usize,
    pub gait_behaviors: usize,
    pub t_sec_min: Option<f64>,
    pub t_sec_max: Option<f64>,
}

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source_path: Option<String>,
    pub computed_at_utc: String,
}

/// One detected step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub index: usize,
    pub t_sec: f64,
    pub value: f64,
}

/// Encoded step counting result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub subject_trial_id: SubjectTrialId,
    pub behavior: String,
    pub distance: usize,
    /// `None` when the segment is too short for a standard deviation
    pub prominence_threshold: Option<f64>,
    pub sample_rate_hz: f64,
    pub samples: usize,
    pub step_count: usize,
    pub cadence_hz: Option<f64>,
    pub steps: Vec<StepEvent>,
}
