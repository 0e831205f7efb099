//! Surface-region segmentation: thresholding a raw image into a binary
//! foreground mask.
//!
//! Masks are `u8` grids where a pixel is set iff its value is `> 0`; outputs
//! are written as `0` or `255`. Two threshold rules are supported:
//!
//! - per-channel inclusive color range over RGB triples, and
//! - strict minimum-intensity cutoff over single-channel images.
//!
//! Optional 3x3 binary morphology (opening/closing) can be applied to the
//! mask to remove specks or close pinholes before edge extraction.

mod morph;
mod threshold;

pub use morph::{close3x3, dilate3x3, erode3x3, open3x3};
pub use threshold::{
    MaskCleanup, SegmentConfig, color_range_mask, intensity_mask, mask_gray, mask_rgb,
};
