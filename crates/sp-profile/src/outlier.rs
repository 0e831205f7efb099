use crate::ProfileError;

/// Baseline reference row used to convert mask rows into heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Baseline {
    /// One row below the image: `height`.
    ImageHeight,
    /// The image's last row: `height - 1`.
    BottomRow,
    /// Explicit reference row.
    Row(u32),
}

impl Baseline {
    pub fn resolve(self, image_height: usize) -> f64 {
        match self {
            Self::ImageHeight => image_height as f64,
            Self::BottomRow => image_height.saturating_sub(1) as f64,
            Self::Row(row) => row as f64,
        }
    }
}

/// Converts edge rows to heights above the baseline (`z = baseline - y`),
/// then zero-references by subtracting the global minimum.
pub fn baseline_heights(y_vals: &[u32], baseline: f64) -> Vec<f64> {
    let mut z: Vec<f64> = y_vals.iter().map(|&y| baseline - y as f64).collect();

    let min = z.iter().copied().fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        for v in &mut z {
            *v -= min;
        }
    }
    z
}

/// Sliding-window median with an odd window. The window truncates at the
/// sequence ends (median of the in-range values).
pub fn median_filter(z: &[f64], window: usize) -> Vec<f64> {
    assert!(window % 2 == 1, "median window must be odd");
    if window <= 1 {
        return z.to_vec();
    }

    let half = window / 2;
    let mut out = Vec::with_capacity(z.len());
    let mut vals: Vec<f64> = Vec::with_capacity(window);

    for i in 0..z.len() {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(z.len() - 1);

        vals.clear();
        vals.extend_from_slice(&z[lo..=hi]);
        vals.sort_by(|a, b| a.partial_cmp(b).expect("finite compare"));
        out.push(vals[vals.len() / 2]);
    }

    out
}

/// Flags spike samples. The local gradient magnitude of a sample is the
/// smaller of its two adjacent differences (one-sided at the sequence ends);
/// a sample is rejected when that magnitude exceeds `threshold`. Returns a
/// validity mask where `false` marks a rejected sample.
pub fn flag_spikes(z: &[f64], threshold: f64) -> Vec<bool> {
    let n = z.len();
    let mut valid = vec![true; n];

    for i in 0..n {
        let back = (i > 0).then(|| (z[i] - z[i - 1]).abs());
        let fwd = (i + 1 < n).then(|| (z[i + 1] - z[i]).abs());
        let grad = match (back, fwd) {
            (Some(b), Some(f)) => b.min(f),
            (Some(b), None) => b,
            (None, Some(f)) => f,
            (None, None) => 0.0,
        };
        if grad > threshold {
            valid[i] = false;
        }
    }

    valid
}

/// Replaces rejected samples by linear interpolation between the nearest
/// valid neighbors. Runs touching a sequence end have a neighbor on one side
/// only and are flat-extended from it.
pub fn interpolate_invalid(z: &[f64], valid: &[bool]) -> Result<Vec<f64>, ProfileError> {
    assert_eq!(z.len(), valid.len(), "validity mask length mismatch");

    if !valid.iter().any(|&v| v) {
        return Err(ProfileError::DegenerateProfile);
    }

    let mut out = z.to_vec();
    let mut i = 0usize;
    while i < z.len() {
        if valid[i] {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < z.len() && !valid[i] {
            i += 1;
        }
        let run_end = i;

        let left = run_start.checked_sub(1).map(|j| z[j]);
        let right = (run_end < z.len()).then(|| z[run_end]);
        match (left, right) {
            (Some(l), Some(r)) => {
                let x0 = (run_start - 1) as f64;
                let x1 = run_end as f64;
                for (j, v) in out.iter_mut().enumerate().take(run_end).skip(run_start) {
                    let t = (j as f64 - x0) / (x1 - x0);
                    *v = l + t * (r - l);
                }
            }
            (Some(l), None) => out[run_start..run_end].fill(l),
            (None, Some(r)) => out[run_start..run_end].fill(r),
            (None, None) => unreachable!("a valid sample exists on some side of every run"),
        }
    }

    Ok(out)
}

/// Full cleaning stage: baseline conversion, median pre-filter, gradient
/// spike rejection, and gap interpolation.
pub fn clean_heights(
    y_vals: &[u32],
    baseline: f64,
    median_window: usize,
    spike_threshold: f64,
) -> Result<Vec<f64>, ProfileError> {
    let z = baseline_heights(y_vals, baseline);
    let z = median_filter(&z, median_window);
    let valid = flag_spikes(&z, spike_threshold);
    interpolate_invalid(&z, &valid)
}

#[cfg(test)]
mod tests {
    use crate::ProfileError;

    use super::{
        Baseline, baseline_heights, clean_heights, flag_spikes, interpolate_invalid, median_filter,
    };

    #[test]
    fn baseline_resolution() {
        assert_eq!(Baseline::ImageHeight.resolve(210), 210.0);
        assert_eq!(Baseline::BottomRow.resolve(210), 209.0);
        assert_eq!(Baseline::Row(42).resolve(210), 42.0);
    }

    #[test]
    fn heights_are_flipped_and_zero_referenced() {
        // y = {10, 10, 200, 10, 10} against baseline 210.
        let z = baseline_heights(&[10, 10, 200, 10, 10], 210.0);
        assert_eq!(z, vec![190.0, 190.0, 0.0, 190.0, 190.0]);

        let z = baseline_heights(&[100, 150, 50], 200.0);
        assert_eq!(z, vec![50.0, 0.0, 100.0]);
    }

    #[test]
    fn median_suppresses_single_spike() {
        let z = vec![200.0, 200.0, 10.0, 200.0, 200.0];
        let filtered = median_filter(&z, 5);
        assert_eq!(filtered, vec![200.0; 5]);
    }

    #[test]
    fn median_truncates_at_ends() {
        let z = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let filtered = median_filter(&z, 3);
        // First window is {1, 2}, upper median 2; last window is {4, 5}.
        assert_eq!(filtered, vec![2.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn window_one_is_identity() {
        let z = vec![3.0, 1.0, 2.0];
        assert_eq!(median_filter(&z, 1), z);
    }

    #[test]
    fn spike_is_flagged_and_interpolated_back() {
        // Heights from y = {10, 10, 200, 10, 10}, baseline 210, no median.
        let z = vec![200.0, 200.0, 10.0, 200.0, 200.0];

        let valid = flag_spikes(&z, 100.0);
        assert_eq!(valid, vec![true, true, false, true, true]);

        let filled = interpolate_invalid(&z, &valid).expect("valid neighbors exist");
        assert_eq!(filled, vec![200.0, 200.0, 200.0, 200.0, 200.0]);
    }

    #[test]
    fn shoulders_of_a_step_survive() {
        // A genuine step: both sides of each sample agree, nothing is a spike.
        let z = vec![0.0, 0.0, 300.0, 300.0, 300.0];
        let valid = flag_spikes(&z, 100.0);
        assert_eq!(valid, vec![true, true, true, true, true]);
    }

    #[test]
    fn boundary_spikes_use_one_sided_gradient() {
        let z = vec![500.0, 10.0, 12.0, 11.0, 400.0];
        let valid = flag_spikes(&z, 100.0);
        assert_eq!(valid, vec![false, true, true, true, false]);

        let filled = interpolate_invalid(&z, &valid).expect("interior is valid");
        // No neighbor outside the sequence: flat extension.
        assert_eq!(filled, vec![10.0, 10.0, 12.0, 11.0, 11.0]);
    }

    #[test]
    fn interior_gap_is_linearly_interpolated() {
        let z = vec![0.0, f64::NAN, f64::NAN, 30.0];
        let valid = vec![true, false, false, true];
        let filled = interpolate_invalid(&z, &valid).expect("endpoints valid");
        assert_eq!(filled, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn all_rejected_is_degenerate() {
        let z = vec![0.0, 1000.0];
        let valid = flag_spikes(&z, 100.0);
        assert_eq!(valid, vec![false, false]);
        assert_eq!(
            interpolate_invalid(&z, &valid),
            Err(ProfileError::DegenerateProfile)
        );
    }

    #[test]
    fn clean_heights_is_total_over_its_domain() {
        let y = vec![50, 51, 52, 200, 53, 54, 55, 56, 57, 58];
        let z = clean_heights(&y, 100.0, 5, 30.0).expect("profile survives cleaning");

        assert_eq!(z.len(), y.len());
        assert!(z.iter().all(|v| v.is_finite()));
    }
}
