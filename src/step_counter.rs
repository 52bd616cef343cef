//! Step counting over an isolated gait segment
//!
//! The segment is the run of rows for one SubjectTrialID whose Behavior
//! equals the requested gait label. Steps are peaks of the segment's
//! ANeck_RMS signal at least `distance` samples apart whose prominence
//! reaches the segment's own sample standard deviation.

use statrs::statistics::Statistics;

use crate::error::InvalidBehaviorError;
use crate::gait::require_gait;
use crate::loader::Dataset;
use crate::peaks::{find_peaks, PeakOptions};
use crate::types::{StepSegment, SubjectTrialId};

/// Timestamps and ANeck_RMS values of a segment, re-indexed from 0
pub fn isolate_segment(
    dataset: &Dataset,
    id: SubjectTrialId,
    behavior: &str,
) -> (Vec<f64>, Vec<f64>) {
    dataset
        .segment(id, behavior)
        .map(|r| (r.t_sec(), r.aneck_rms))
        .unzip()
}

/// Sample standard deviation of `signal`; NaN with fewer than two samples
pub fn prominence_threshold(signal: &[f64]) -> f64 {
    signal.iter().std_dev()
}

/// Counts steps for one subject/trial and gait behavior
pub struct StepCounter<'a> {
    dataset: &'a Dataset,
}

impl<'a> StepCounter<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Isolate the segment and detect its steps.
    ///
    /// Fails only when `behavior` is not a gait label. A segment with no rows,
    /// or too few for a standard deviation, yields zero steps.
    pub fn count(
        &self,
        id: SubjectTrialId,
        behavior: &str,
        distance: usize,
    ) -> Result<StepSegment, InvalidBehaviorError> {
        require_gait(behavior)?;

        let (t_sec, signal) = isolate_segment(self.dataset, id, behavior);
        let threshold = prominence_threshold(&signal);

        if signal.len() < 2 {
            tracing::warn!(
                subject_trial_id = %id,
                behavior,
                samples = signal.len(),
                "segment too short for step detection"
            );
        }

        let peaks = find_peaks(
            &signal,
            &PeakOptions {
                distance,
                prominence: Some(threshold),
            },
        );

        tracing::debug!(
            subject_trial_id = %id,
            behavior,
            samples = signal.len(),
            distance,
            threshold,
            steps = peaks.len(),
            "counted steps"
        );

        Ok(StepSegment {
            subject_trial_id: id,
            behavior: behavior.to_string(),
            distance,
            prominence_threshold: threshold,
            t_sec,
            signal,
            peaks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dataset, SampleRow};
    use pretty_assertions::assert_eq;

    const WALK: [&str; 3] = ["Walking", "X", "Y"];

    /// Neck magnitude follows `values`; all rows belong to (1, 1)
    fn rows_with_signal(values: &[f64], labels: [&str; 3]) -> Vec<SampleRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                SampleRow::new(1, 1, i as f64 / 100.0)
                    .labels(labels)
                    .neck_accel(v, 0.0, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_non_gait_behavior_is_rejected() {
        let data = dataset(&rows_with_signal(&[0.0, 1.0, 0.0], ["Standing", "X", "Y"]));

        let err = StepCounter::new(&data)
            .count(SubjectTrialId(11), "Standing_X_Y", 25)
            .unwrap_err();

        assert_eq!(err.label, "Standing_X_Y");
    }

    #[test]
    fn test_empty_segment_yields_no_steps() {
        let data = dataset(&rows_with_signal(&[0.0, 1.0, 0.0], WALK));

        let segment = StepCounter::new(&data)
            .count(SubjectTrialId(99), "Walking_X_Y", 25)
            .unwrap();

        assert!(segment.t_sec.is_empty());
        assert!(segment.signal.is_empty());
        assert!(segment.peaks.is_empty());
        assert!(segment.prominence_threshold.is_nan());
    }

    #[test]
    fn test_single_sample_yields_no_steps() {
        let data = dataset(&rows_with_signal(&[3.0], WALK));

        let segment = StepCounter::new(&data)
            .count(SubjectTrialId(11), "Walking_X_Y", 0)
            .unwrap();

        assert_eq!(segment.signal, vec![3.0]);
        assert!(segment.peaks.is_empty());
    }

    #[test]
    fn test_isolation_skips_other_behaviors_and_reindexes() {
        let mut rows = rows_with_signal(&[0.0, 1.0, 0.0], ["Standing", "X", "Y"]);
        let times = [1.0, 1.01, 1.02, 1.03, 1.04];
        let values = [0.0, 4.0, 0.0, 4.0, 0.0];
        rows.extend(times.iter().zip(values).map(|(&t, v)| {
            SampleRow::new(1, 1, t).labels(WALK).neck_accel(0.0, v, 0.0)
        }));
        rows.push(SampleRow::new(2, 1, 0.0).labels(WALK).neck_accel(9.0, 0.0, 0.0));
        let data = dataset(&rows);

        let segment = StepCounter::new(&data)
            .count(SubjectTrialId(11), "Walking_X_Y", 1)
            .unwrap();

        assert_eq!(segment.t_sec, vec![1.0, 1.01, 1.02, 1.03, 1.04]);
        assert_eq!(segment.signal, vec![0.0, 4.0, 0.0, 4.0, 0.0]);
        assert_eq!(segment.peaks, vec![1, 3]);
        assert_eq!(segment.step_times(), vec![1.01, 1.03]);
    }

    #[test]
    fn test_distance_suppresses_close_steps() {
        let data = dataset(&rows_with_signal(&[0.0, 4.0, 0.0, 5.0, 0.0, 4.0, 0.0], WALK));

        let segment = StepCounter::new(&data)
            .count(SubjectTrialId(11), "Walking_X_Y", 3)
            .unwrap();

        assert_eq!(segment.peaks, vec![3]);
    }

    #[test]
    fn test_small_bumps_fall_below_threshold() {
        let data = dataset(&rows_with_signal(
            &[0.0, 5.0, 0.0, 0.1, 0.0, 5.0, 0.0],
            WALK,
        ));

        let segment = StepCounter::new(&data)
            .count(SubjectTrialId(11), "Walking_X_Y", 1)
            .unwrap();

        assert!(segment.prominence_threshold > 0.1);
        assert_eq!(segment.peaks, vec![1, 5]);
    }

    #[test]
    fn test_prominence_threshold_is_sample_std() {
        let threshold = prominence_threshold(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // Sum of squared deviations is 32 over 7 degrees of freedom
        assert!((threshold - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(prominence_threshold(&[1.0]).is_nan());
        assert!(prominence_threshold(&[]).is_nan());
    }
}
