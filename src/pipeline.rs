//! Pipeline orchestration
//!
//! This module provides the public API for DogMove. `Explorer` owns the
//! immutable dataset snapshot and answers every query the dashboard makes:
//! subject/trial listing, behavior listing, signal series and step counts.

use std::path::Path;
use std::sync::Arc;

use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::gait::gait_behaviors;
use crate::loader::{Dataset, DatasetLoader};
use crate::schema::SAMPLE_RATE_HZ;
use crate::step_counter::StepCounter;
use crate::types::{SignalColumn, SignalSeries, StepReport, StepSegment, SubjectTrialId};

/// Count steps in a DogMove file and return the JSON step report (one-shot).
///
/// # Arguments
/// * `path` - DogMove CSV file
/// * `id` - SubjectTrialID to isolate
/// * `behavior` - gait behavior label, matched exactly
/// * `distance` - minimum separation between steps, in samples
///
/// # Example
/// ```ignore
/// let report = count_steps_in_file(Path::new("DogMoveData.csv"), SubjectTrialId(161), "Trotting_Sniffing_<undefined>", 15)?;
/// ```
pub fn count_steps_in_file(
    path: &Path,
    id: SubjectTrialId,
    behavior: &str,
    distance: usize,
) -> Result<String, ComputeError> {
    let explorer = Explorer::from_loader(&DatasetLoader::new(path))?;
    explorer.step_report_json(id, behavior, distance)
}

/// Query front end over a loaded dataset
pub struct Explorer {
    dataset: Arc<Dataset>,
    encoder: ReportEncoder,
    sample_rate_hz: f64,
}

impl Explorer {
    /// Create an explorer over a loaded dataset
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_sample_rate(dataset, SAMPLE_RATE_HZ)
    }

    pub fn with_sample_rate(dataset: Arc<Dataset>, sample_rate_hz: f64) -> Self {
        Self {
            dataset,
            encoder: ReportEncoder::new(),
            sample_rate_hz,
        }
    }

    /// Load (or reuse) the loader's snapshot
    pub fn from_loader(loader: &DatasetLoader) -> Result<Self, ComputeError> {
        Ok(Self::new(loader.load()?))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn subject_trial_ids(&self) -> Vec<SubjectTrialId> {
        self.dataset.subject_trial_ids()
    }

    /// Sorted behavior labels observed for `id`
    pub fn behaviors(&self, id: SubjectTrialId) -> Result<Vec<String>, ComputeError> {
        self.ensure_known(id)?;
        Ok(self.dataset.behaviors_for(id))
    }

    /// Sorted gait labels observed for `id`
    pub fn gait_behaviors(&self, id: SubjectTrialId) -> Result<Vec<String>, ComputeError> {
        Ok(gait_behaviors(&self.behaviors(id)?))
    }

    /// Time series of `columns` for `id` and `behavior`.
    ///
    /// An empty `columns` selects `SignalColumn::DEFAULT_SELECTION`. Any
    /// behavior label is accepted; an unmatched one gives an empty series.
    pub fn signal_series(
        &self,
        id: SubjectTrialId,
        behavior: &str,
        columns: &[SignalColumn],
    ) -> SignalSeries {
        let columns: Vec<SignalColumn> = if columns.is_empty() {
            SignalColumn::DEFAULT_SELECTION.to_vec()
        } else {
            columns.to_vec()
        };

        let rows: Vec<_> = self.dataset.segment(id, behavior).collect();
        let t_sec = rows.iter().map(|r| r.t_sec()).collect();
        let columns = columns
            .into_iter()
            .map(|column| (column, rows.iter().map(|r| column.value(r)).collect()))
            .collect();

        SignalSeries {
            subject_trial_id: id,
            behavior: behavior.to_string(),
            t_sec,
            columns,
        }
    }

    /// Isolate the gait segment and detect its steps
    pub fn count_steps(
        &self,
        id: SubjectTrialId,
        behavior: &str,
        distance: usize,
    ) -> Result<StepSegment, ComputeError> {
        Ok(StepCounter::new(&self.dataset).count(id, behavior, distance)?)
    }

    pub fn step_report(
        &self,
        id: SubjectTrialId,
        behavior: &str,
        distance: usize,
    ) -> Result<StepReport, ComputeError> {
        let segment = self.count_steps(id, behavior, distance)?;
        Ok(self
            .encoder
            .encode(&segment, self.dataset.source_path(), self.sample_rate_hz))
    }

    pub fn step_report_json(
        &self,
        id: SubjectTrialId,
        behavior: &str,
        distance: usize,
    ) -> Result<String, ComputeError> {
        let segment = self.count_steps(id, behavior, distance)?;
        self.encoder
            .encode_to_json(&segment, self.dataset.source_path(), self.sample_rate_hz)
    }

    fn ensure_known(&self, id: SubjectTrialId) -> Result<(), ComputeError> {
        if self.dataset.contains_subject_trial(id) {
            Ok(())
        } else {
            Err(ComputeError::UnknownSubjectTrial(id.value()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dataset, SampleRow};
    use pretty_assertions::assert_eq;

    fn sample_explorer() -> Explorer {
        let mut rows = Vec::new();
        for (i, v) in [1.0, 3.0, 1.0, 3.0, 1.0].into_iter().enumerate() {
            rows.push(
                SampleRow::new(16, 1, i as f64)
                    .labels(["Trotting", "Sniffing", "Leash"])
                    .neck_accel(v, 0.0, 0.0)
                    .neck_gyro(0.0, 0.0, 2.0),
            );
        }
        rows.push(SampleRow::new(16, 1, 5.0).labels(["Lying chest", "Idle", "Leash"]));
        rows.push(SampleRow::new(16, 2, 0.0).labels(["Walking", "A", "B"]));
        Explorer::new(Arc::new(dataset(&rows)))
    }

    #[test]
    fn test_listing_queries() {
        let explorer = sample_explorer();

        assert_eq!(
            explorer.subject_trial_ids(),
            vec![SubjectTrialId(161), SubjectTrialId(162)]
        );
        assert_eq!(
            explorer.behaviors(SubjectTrialId(161)).unwrap(),
            vec![
                "Lying chest_Idle_Leash".to_string(),
                "Trotting_Sniffing_Leash".to_string()
            ]
        );
        assert_eq!(
            explorer.gait_behaviors(SubjectTrialId(161)).unwrap(),
            vec!["Trotting_Sniffing_Leash".to_string()]
        );
    }

    #[test]
    fn test_unknown_subject_trial() {
        let explorer = sample_explorer();

        assert!(matches!(
            explorer.behaviors(SubjectTrialId(7)),
            Err(ComputeError::UnknownSubjectTrial(7))
        ));
    }

    #[test]
    fn test_signal_series_selected_columns() {
        let explorer = sample_explorer();

        let series = explorer.signal_series(
            SubjectTrialId(161),
            "Trotting_Sniffing_Leash",
            &[SignalColumn::ANeckRms, SignalColumn::GNeckRms],
        );

        assert_eq!(series.t_sec, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.columns[0].1, vec![1.0, 3.0, 1.0, 3.0, 1.0]);
        assert_eq!(series.columns[1].1, vec![2.0; 5]);
    }

    #[test]
    fn test_signal_series_default_columns() {
        let explorer = sample_explorer();

        let series = explorer.signal_series(SubjectTrialId(161), "Lying chest_Idle_Leash", &[]);

        let names: Vec<&str> = series.columns.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["ANeck_RMS", "ANeck_x", "ANeck_y", "ANeck_z"]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_count_steps_and_report() {
        let explorer = sample_explorer();

        let segment = explorer
            .count_steps(SubjectTrialId(161), "Trotting_Sniffing_Leash", 1)
            .unwrap();
        assert_eq!(segment.peaks, vec![1, 3]);

        let report = explorer
            .step_report(SubjectTrialId(161), "Trotting_Sniffing_Leash", 1)
            .unwrap();
        assert_eq!(report.step_count, 2);
        assert_eq!(report.sample_rate_hz, explorer.sample_rate_hz());
        assert_eq!(report.cadence_hz, Some(0.5));
    }

    #[test]
    fn test_signal_series_back_sensor() {
        let rows = vec![SampleRow::new(3, 4, 0.0).back_accel(0.5, -1.5, 9.8)];
        let explorer = Explorer::with_sample_rate(Arc::new(dataset(&rows)), 50.0);

        let series = explorer.signal_series(
            SubjectTrialId(34),
            "Walking_<undefined>_<undefined>",
            &[SignalColumn::ABackX, SignalColumn::ABackZ, SignalColumn::GBackY],
        );

        assert_eq!(explorer.sample_rate_hz(), 50.0);
        assert_eq!(series.columns[0].1, vec![0.5]);
        assert_eq!(series.columns[1].1, vec![9.8]);
        assert_eq!(series.columns[2].1, vec![0.0]);
    }

    #[test]
    fn test_count_steps_rejects_non_gait() {
        let explorer = sample_explorer();

        let err = explorer
            .count_steps(SubjectTrialId(161), "Lying chest_Idle_Leash", 25)
            .unwrap_err();

        assert!(matches!(err, ComputeError::InvalidBehavior(_)));
    }

    #[test]
    fn test_count_steps_in_missing_file() {
        let err = count_steps_in_file(
            Path::new("/nonexistent/DogMoveData.csv"),
            SubjectTrialId(161),
            "Walking_A_B",
            25,
        )
        .unwrap_err();

        assert!(matches!(err, ComputeError::DataLoad(_)));
    }
}
