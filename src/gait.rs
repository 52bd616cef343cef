//! Gait classification
//!
//! A behavior label is a gait when it contains one of a closed set of gait
//! names. Only gait segments are eligible for step counting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidBehaviorError;

/// Minimum peak separation used when a label carries no gait-specific hint
pub const DEFAULT_DISTANCE: usize = 25;

/// Gaits recognized in behavior labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gait {
    Walking,
    Trotting,
    Pacing,
    Galloping,
}

impl Gait {
    pub const ALL: [Gait; 4] = [Gait::Walking, Gait::Trotting, Gait::Pacing, Gait::Galloping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gait::Walking => "Walking",
            Gait::Trotting => "Trotting",
            Gait::Pacing => "Pacing",
            Gait::Galloping => "Galloping",
        }
    }

    /// First gait (in `Gait::ALL` order) named in `label`
    pub fn classify(label: &str) -> Option<Gait> {
        Gait::ALL.into_iter().find(|g| label.contains(g.as_str()))
    }

    /// Starting point for the minimum peak separation, in samples at 100 Hz.
    ///
    /// Trotting steps come roughly every 0.15 s, walking steps every 0.25 s.
    pub fn suggested_distance(&self) -> usize {
        match self {
            Gait::Trotting => 15,
            Gait::Walking => 25,
            Gait::Pacing | Gait::Galloping => DEFAULT_DISTANCE,
        }
    }
}

impl fmt::Display for Gait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_gait(label: &str) -> bool {
    Gait::classify(label).is_some()
}

/// Ensure `label` names a gait
pub fn require_gait(label: &str) -> Result<Gait, InvalidBehaviorError> {
    Gait::classify(label).ok_or_else(|| InvalidBehaviorError {
        label: label.to_string(),
    })
}

/// Keep the gait labels of `labels`, sorted ascending
pub fn gait_behaviors<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut gaits: Vec<String> = labels
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| is_gait(label))
        .map(str::to_string)
        .collect();
    gaits.sort();
    gaits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gait_behaviors_filters_and_sorts() {
        let labels = ["Walking_Sniffing_X", "Standing_Idle_Y", "Trotting_Z"];

        assert_eq!(
            gait_behaviors(&labels),
            vec!["Trotting_Z".to_string(), "Walking_Sniffing_X".to_string()]
        );
    }

    #[test]
    fn test_substring_match_anywhere_in_label() {
        assert_eq!(Gait::classify("Sniffing_Pacing_X"), Some(Gait::Pacing));
        assert_eq!(Gait::classify("<undefined>_Galloping_X"), Some(Gait::Galloping));
        assert_eq!(Gait::classify("walking_lowercase"), None);
        assert!(!is_gait("Standing_Sitting_Lying"));
    }

    #[test]
    fn test_require_gait() {
        assert_eq!(require_gait("Trotting_A_B"), Ok(Gait::Trotting));
        assert_eq!(
            require_gait("Standing_A_B"),
            Err(InvalidBehaviorError {
                label: "Standing_A_B".to_string()
            })
        );
    }

    #[test]
    fn test_suggested_distance() {
        assert_eq!(Gait::Trotting.suggested_distance(), 15);
        assert_eq!(Gait::Walking.suggested_distance(), 25);
        assert_eq!(Gait::Galloping.suggested_distance(), DEFAULT_DISTANCE);
    }

    #[test]
    fn test_empty_input() {
        let labels: [&str; 0] = [];
        assert!(gait_behaviors(&labels).is_empty());
    }
}
