use sp_core::ImageView;

use crate::edge::bottom_edge;
use crate::outlier::{Baseline, clean_heights};
use crate::savgol::savgol_filter;
use crate::ProfileError;

/// Ordered surface curve: strictly increasing column positions paired with
/// baseline-relative heights.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HeightProfile {
    pub x: Vec<u32>,
    pub z: Vec<f64>,
}

impl HeightProfile {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.x.iter().copied().zip(self.z.iter().copied())
    }
}

/// Per-image extraction parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfileConfig {
    /// Minimum usable edge-point count; images below the floor are skipped.
    pub min_points: usize,
    /// Odd sliding-median window applied before spike rejection.
    pub median_window: usize,
    /// Local gradient magnitude (height units per column) above which a
    /// sample is rejected as a spike.
    pub spike_threshold: f64,
    /// Requested Savitzky-Golay window; shrinks adaptively on short profiles.
    pub smooth_window: usize,
    /// Savitzky-Golay polynomial degree.
    pub poly_degree: usize,
    /// Reference row for height conversion.
    pub baseline: Baseline,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            median_window: 5,
            spike_threshold: 100.0,
            smooth_window: 31,
            poly_degree: 3,
            baseline: Baseline::ImageHeight,
        }
    }
}

/// Smooths the height sequence of a profile, leaving positions untouched.
pub fn smooth_profile(
    profile: &HeightProfile,
    window: usize,
    degree: usize,
) -> Result<HeightProfile, ProfileError> {
    Ok(HeightProfile {
        x: profile.x.clone(),
        z: savgol_filter(&profile.z, window, degree)?,
    })
}

/// Runs the full per-image pipeline on a foreground mask: bottom-edge
/// reduction, height cleaning, and smoothing.
pub fn extract_profile(
    mask: &ImageView<'_, u8>,
    cfg: &ProfileConfig,
) -> Result<HeightProfile, ProfileError> {
    let points = bottom_edge(mask);
    if points.len() < cfg.min_points {
        return Err(ProfileError::InsufficientPoints {
            found: points.len(),
            min_required: cfg.min_points,
        });
    }

    let (x, y) = points.into_sorted();
    let baseline = cfg.baseline.resolve(mask.height());
    let z = clean_heights(&y, baseline, cfg.median_window, cfg.spike_threshold)?;
    let cleaned = HeightProfile { x, z };

    smooth_profile(&cleaned, cfg.smooth_window, cfg.poly_degree)
}

#[cfg(test)]
mod tests {
    use sp_core::Image;

    use crate::ProfileError;

    use super::{HeightProfile, ProfileConfig, extract_profile, smooth_profile};

    /// Mask whose bottom edge follows `edge_row` per column, with foreground
    /// filling upward from the edge.
    fn mask_with_edge(width: usize, height: usize, edge_row: impl Fn(usize) -> usize) -> Image<u8> {
        let mut data = vec![0u8; width * height];
        for x in 0..width {
            let bottom = edge_row(x).min(height - 1);
            for y in 0..=bottom {
                data[y * width + x] = 255;
            }
        }
        Image::from_vec(width, height, data).expect("valid mask")
    }

    #[test]
    fn single_column_mask_is_insufficient() {
        let mut data = vec![0u8; 8 * 8];
        data[3 * 8 + 4] = 255;
        let mask = Image::from_vec(8, 8, data).expect("valid mask");

        let err = extract_profile(&mask.as_view(), &ProfileConfig::default())
            .expect_err("one point is below the default floor");
        assert_eq!(
            err,
            ProfileError::InsufficientPoints {
                found: 1,
                min_required: 10
            }
        );
    }

    #[test]
    fn gentle_slope_survives_the_full_pipeline() {
        let width = 48usize;
        let height = 80usize;
        let mask = mask_with_edge(width, height, |x| 40 + x / 4);

        let profile =
            extract_profile(&mask.as_view(), &ProfileConfig::default()).expect("pipeline succeeds");

        assert_eq!(profile.len(), width);
        let expected_x: Vec<u32> = (0..width as u32).collect();
        assert_eq!(profile.x, expected_x);
        assert!(profile.z.iter().all(|v| v.is_finite()));

        // Heights are zero-referenced: the deepest edge column sits near z = 0.
        let z_min = profile.z.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(z_min.abs() < 2.0);
    }

    #[test]
    fn positions_are_never_modified_downstream() {
        let profile = HeightProfile {
            x: vec![4, 7, 9, 10, 11],
            z: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        };

        let smoothed = smooth_profile(&profile, 31, 3).expect("window adapts");
        assert_eq!(smoothed.x, profile.x);
        assert_eq!(smoothed.len(), profile.len());
    }

    #[test]
    fn sparse_columns_keep_their_positions() {
        // Foreground only in even columns; odd columns contribute no entry.
        let width = 40usize;
        let height = 30usize;
        let mut data = vec![0u8; width * height];
        for x in (0..width).step_by(2) {
            data[15 * width + x] = 255;
        }
        let mask = Image::from_vec(width, height, data).expect("valid mask");

        let profile =
            extract_profile(&mask.as_view(), &ProfileConfig::default()).expect("20 points suffice");
        let expected_x: Vec<u32> = (0..width as u32).step_by(2).collect();
        assert_eq!(profile.x, expected_x);
    }

    #[test]
    fn spiky_column_is_recovered() {
        let width = 30usize;
        let height = 220usize;
        // Flat bottom edge at row 10, except one column plunging to row 200.
        let mask = mask_with_edge(width, height, |x| if x == 15 { 200 } else { 10 });

        let cfg = ProfileConfig {
            smooth_window: 15,
            ..ProfileConfig::default()
        };
        let profile = extract_profile(&mask.as_view(), &cfg).expect("spike is cleaned");

        // The spike column ends up near its neighbors instead of 190 below.
        let spike_z = profile.z[15];
        let neighbor_z = profile.z[5];
        assert!((spike_z - neighbor_z).abs() < 10.0);
    }
}
