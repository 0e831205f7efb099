use sp_core::{Image, ImageView};

use crate::{close3x3, open3x3};

/// Binary mask post-processing applied after thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaskCleanup {
    /// Keep the thresholded mask as-is.
    None,
    /// 3x3 opening: removes isolated foreground specks.
    Open3x3,
    /// 3x3 closing: fills single-pixel holes in the foreground.
    Close3x3,
}

/// Segmentation thresholds and mask cleanup.
///
/// `color_low`/`color_high` are inclusive per-channel RGB bounds used by
/// [`mask_rgb`]; `intensity_cutoff` is the strict lower bound used by
/// [`mask_gray`]. Both sets of thresholds are always present so a single
/// config value can drive either input kind.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SegmentConfig {
    pub color_low: [u8; 3],
    pub color_high: [u8; 3],
    pub intensity_cutoff: u8,
    pub cleanup: MaskCleanup,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        // Yellow-orange surface region under workshop lighting.
        Self {
            color_low: [150, 100, 0],
            color_high: [255, 255, 120],
            intensity_cutoff: 0,
            cleanup: MaskCleanup::None,
        }
    }
}

/// Builds a mask from an RGB image: a pixel is foreground iff every channel
/// lies within the inclusive `[low, high]` range.
pub fn color_range_mask(img: &ImageView<'_, [u8; 3]>, low: [u8; 3], high: [u8; 3]) -> Image<u8> {
    let mut data = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for px in img.row(y) {
            let inside = (0..3).all(|c| px[c] >= low[c] && px[c] <= high[c]);
            data.push(if inside { 255 } else { 0 });
        }
    }
    Image::from_vec(img.width(), img.height(), data).expect("mask matches source dimensions")
}

/// Builds a mask from a single-channel image: a pixel is foreground iff its
/// value is strictly greater than `cutoff`.
pub fn intensity_mask(img: &ImageView<'_, u8>, cutoff: u8) -> Image<u8> {
    let mut data = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        for &px in img.row(y) {
            data.push(if px > cutoff { 255 } else { 0 });
        }
    }
    Image::from_vec(img.width(), img.height(), data).expect("mask matches source dimensions")
}

pub fn mask_rgb(img: &ImageView<'_, [u8; 3]>, cfg: &SegmentConfig) -> Image<u8> {
    let mask = color_range_mask(img, cfg.color_low, cfg.color_high);
    apply_cleanup(mask, cfg.cleanup)
}

pub fn mask_gray(img: &ImageView<'_, u8>, cfg: &SegmentConfig) -> Image<u8> {
    let mask = intensity_mask(img, cfg.intensity_cutoff);
    apply_cleanup(mask, cfg.cleanup)
}

fn apply_cleanup(mask: Image<u8>, cleanup: MaskCleanup) -> Image<u8> {
    match cleanup {
        MaskCleanup::None => mask,
        MaskCleanup::Open3x3 => open3x3(&mask.as_view()),
        MaskCleanup::Close3x3 => close3x3(&mask.as_view()),
    }
}

#[cfg(test)]
mod tests {
    use sp_core::Image;

    use super::{MaskCleanup, SegmentConfig, color_range_mask, intensity_mask, mask_gray, mask_rgb};

    #[test]
    fn color_range_is_inclusive_per_channel() {
        let img = Image::from_vec(
            4,
            1,
            vec![
                [150u8, 100, 0],  // exactly on the lower bound
                [255, 255, 120],  // exactly on the upper bound
                [149, 200, 50],   // one channel below range
                [200, 200, 121],  // one channel above range
            ],
        )
        .expect("valid image");

        let mask = color_range_mask(&img.as_view(), [150, 100, 0], [255, 255, 120]);
        assert_eq!(mask.data(), &[255, 255, 0, 0]);
    }

    #[test]
    fn intensity_cutoff_is_strict() {
        let img = Image::from_vec(3, 1, vec![0u8, 1, 200]).expect("valid image");

        let mask = intensity_mask(&img.as_view(), 0);
        assert_eq!(mask.data(), &[0, 255, 255]);

        let mask = intensity_mask(&img.as_view(), 1);
        assert_eq!(mask.data(), &[0, 0, 255]);
    }

    #[test]
    fn rgb_cleanup_removes_speck() {
        let mut pixels = vec![[0u8, 0, 0]; 25];
        pixels[12] = [200, 180, 40];
        let img = Image::from_vec(5, 5, pixels).expect("valid image");

        let cfg = SegmentConfig {
            cleanup: MaskCleanup::Open3x3,
            ..SegmentConfig::default()
        };
        let mask = mask_rgb(&img.as_view(), &cfg);
        assert!(mask.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn gray_cleanup_fills_pinhole() {
        let mut pixels = vec![200u8; 25];
        pixels[12] = 0;
        let img = Image::from_vec(5, 5, pixels).expect("valid image");

        let cfg = SegmentConfig {
            cleanup: MaskCleanup::Close3x3,
            ..SegmentConfig::default()
        };
        let mask = mask_gray(&img.as_view(), &cfg);
        assert_eq!(mask.data()[12], 255);
    }
}
