//! Feature derivation
//!
//! This module derives the per-row fields the explorer works with:
//! - SubjectTrialID from DogID and TestNum
//! - the composite Behavior label
//! - accelerometer and gyroscope magnitudes at the neck

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::DataLoadError;
use crate::types::{PreparedRecord, RawRecord, SubjectTrialId};

/// Separator placed between the three behavior labels
pub const BEHAVIOR_SEPARATOR: &str = "_";

/// Feature deriver for prepared records
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive the composite fields of one row.
    ///
    /// `row` is the 1-based data row number used in error messages.
    pub fn derive(raw: RawRecord, row: usize) -> Result<PreparedRecord, DataLoadError> {
        let subject_trial_id = Self::subject_trial_id(&raw, row)?;
        let behavior = compose_behavior(&raw);
        let aneck_rms = raw.neck_accel().magnitude();
        let gneck_rms = raw.neck_gyro().magnitude();

        Ok(PreparedRecord {
            raw,
            subject_trial_id,
            behavior,
            aneck_rms,
            gneck_rms,
        })
    }

    /// SubjectTrialID of one row, or `SubjectTrialOverflow` if it does not fit
    pub fn subject_trial_id(raw: &RawRecord, row: usize) -> Result<SubjectTrialId, DataLoadError> {
        SubjectTrialId::compose(raw.dog_id, raw.test_num).ok_or(
            DataLoadError::SubjectTrialOverflow {
                row,
                dog_id: raw.dog_id,
                test_num: raw.test_num,
            },
        )
    }
}

/// Tracks which (DogID, TestNum) pair first produced each SubjectTrialID
#[derive(Debug, Default)]
pub struct SubjectTrialOwners {
    owners: HashMap<SubjectTrialId, (u32, u32)>,
}

impl SubjectTrialOwners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` came from `(dog_id, test_num)`.
    ///
    /// Fails with `AmbiguousSubjectTrial` when an earlier row produced the
    /// same ID from a different pair.
    pub fn claim(
        &mut self,
        id: SubjectTrialId,
        dog_id: u32,
        test_num: u32,
    ) -> Result<(), DataLoadError> {
        match self.owners.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert((dog_id, test_num));
                Ok(())
            }
            Entry::Occupied(slot) if *slot.get() != (dog_id, test_num) => {
                let (first_dog, first_test) = *slot.get();
                Err(DataLoadError::AmbiguousSubjectTrial {
                    id: id.value(),
                    first_dog,
                    first_test,
                    second_dog: dog_id,
                    second_test: test_num,
                })
            }
            Entry::Occupied(_) => Ok(()),
        }
    }
}

/// Join Behavior_1, Behavior_2 and Behavior_3 in that order
pub fn compose_behavior(raw: &RawRecord) -> String {
    raw.behavior_labels().join(BEHAVIOR_SEPARATOR)
}
