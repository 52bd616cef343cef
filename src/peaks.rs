//! Local maxima detection with distance and prominence constraints
//!
//! Stages run in this order:
//! 1. local maxima (flat plateaus report their midpoint, rounded down)
//! 2. distance filter, highest peaks first
//! 3. prominence filter
//!
//! The first and last samples can never be peaks.

/// Constraints applied to the detected maxima
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakOptions {
    /// Minimum separation between kept peaks, in samples. 0 and 1 impose no constraint.
    pub distance: usize,
    /// Minimum prominence. A NaN threshold rejects every peak.
    pub prominence: Option<f64>,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            distance: 1,
            prominence: None,
        }
    }
}

/// Detect peaks in `x`, returning strictly ascending indices
pub fn find_peaks(x: &[f64], options: &PeakOptions) -> Vec<usize> {
    let mut peaks = local_maxima(x);
    let candidates = peaks.len();

    if options.distance > 1 && peaks.len() > 1 {
        peaks = select_by_distance(x, &peaks, options.distance);
    }
    let after_distance = peaks.len();

    if let Some(min_prominence) = options.prominence {
        let prominences = peak_prominences(x, &peaks);
        peaks = peaks
            .into_iter()
            .zip(prominences)
            .filter(|(_, p)| *p >= min_prominence)
            .map(|(peak, _)| peak)
            .collect();
    }

    tracing::debug!(
        samples = x.len(),
        candidates,
        after_distance,
        kept = peaks.len(),
        "peak detection"
    );

    peaks
}

/// Indices of samples strictly higher than their left neighbour whose plateau
/// ends in a strictly lower sample
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }

            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                // Skip the plateau; x[i_ahead] is lower so it cannot start a peak
                i = i_ahead;
            }
        }
        i += 1;
    }

    peaks
}

/// Drop peaks closer than `distance` samples to a higher kept peak.
///
/// `peaks` must be ascending; the result stays ascending.
pub fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];

    // Lowest first; ties keep their positional order
    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter(|(_, kept)| *kept)
        .map(|(&peak, _)| peak)
        .collect()
}

/// Prominence of each peak: its height above the higher of the two lowest
/// points reached walking left and right until a strictly higher sample or
/// the edge of the signal
pub fn peak_prominences(x: &[f64], peaks: &[usize]) -> Vec<f64> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];

            let mut left_min = height;
            for &value in x[..=peak].iter().rev() {
                if value > height {
                    break;
                }
                left_min = left_min.min(value);
            }

            let mut right_min = height;
            for &value in &x[peak..] {
                if value > height {
                    break;
                }
                right_min = right_min.min(value);
            }

            height - left_min.max(right_min)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_maxima() {
        let x = [0.0, 1.0, 0.0, 2.0, 0.0, 1.5, 0.0];
        assert_eq!(local_maxima(&x), vec![1, 3, 5]);
    }

    #[test]
    fn test_edges_are_never_peaks() {
        let x = [5.0, 1.0, 0.0, 1.0, 5.0];
        assert!(local_maxima(&x).is_empty());
    }

    #[test]
    fn test_plateau_reports_midpoint() {
        // Plateau of width 4 at indices 2..=5 -> midpoint 3
        let x = [0.0, 1.0, 3.0, 3.0, 3.0, 3.0, 1.0, 0.0];
        assert_eq!(local_maxima(&x), vec![3]);

        // Plateau running into the last sample is not a peak
        let x = [0.0, 1.0, 3.0, 3.0];
        assert!(local_maxima(&x).is_empty());
    }

    #[test]
    fn test_short_inputs() {
        assert!(local_maxima(&[]).is_empty());
        assert!(local_maxima(&[1.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
        assert!(find_peaks(
            &[],
            &PeakOptions {
                distance: 25,
                prominence: Some(f64::NAN)
            }
        )
        .is_empty());
    }

    #[test]
    fn test_distance_keeps_highest() {
        let x = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let peaks = local_maxima(&x);
        assert_eq!(peaks, vec![1, 3, 5, 9]);

        assert_eq!(select_by_distance(&x, &peaks, 3), vec![3, 9]);
        assert_eq!(select_by_distance(&x, &peaks, 2), peaks);
    }

    #[test]
    fn test_distance_result_is_separated() {
        let x: Vec<f64> = (0..200)
            .map(|i| ((i as f64) * 0.7).sin() + ((i as f64) * 0.13).cos())
            .collect();
        let peaks = find_peaks(
            &x,
            &PeakOptions {
                distance: 10,
                prominence: None,
            },
        );

        assert!(!peaks.is_empty());
        for pair in peaks.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] >= 10);
        }
    }

    #[test]
    fn test_prominences() {
        let x = [0.0, 2.0, 1.0, 3.0, 0.5, 1.5, 0.0];
        let peaks = local_maxima(&x);
        assert_eq!(peaks, vec![1, 3, 5]);

        let prominences = peak_prominences(&x, &peaks);
        // peak 1: left min 0, right walk stops at 3 with min 1 -> 2 - 1
        // peak 3: both sides reach the edges, mins 0 and 0 -> 3
        // peak 5: left walk stops at 3 with min 0.5, right min 0 -> 1.5 - 0.5
        assert_eq!(prominences, vec![1.0, 3.0, 1.0]);
    }

    #[test]
    fn test_prominence_filter() {
        let x = [0.0, 2.0, 1.0, 3.0, 0.5, 1.5, 0.0];
        let options = PeakOptions {
            distance: 1,
            prominence: Some(1.5),
        };
        assert_eq!(find_peaks(&x, &options), vec![3]);
    }

    #[test]
    fn test_nan_prominence_rejects_all() {
        let x = [0.0, 2.0, 0.0];
        let options = PeakOptions {
            distance: 0,
            prominence: Some(f64::NAN),
        };
        assert!(find_peaks(&x, &options).is_empty());
    }

    #[test]
    fn test_zero_distance_is_unconstrained() {
        let x = [0.0, 1.0, 0.0, 1.0, 0.0];
        let options = PeakOptions {
            distance: 0,
            prominence: None,
        };
        assert_eq!(find_peaks(&x, &options), vec![1, 3]);
    }
}
