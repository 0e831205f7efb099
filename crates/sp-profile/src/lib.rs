//! Bottom-edge height-profile extraction from binary foreground masks.
//!
//! Core strategy:
//! - Reduce the mask to one edge row per column (per-column arg-max over
//!   foreground pixels, keeping the lowest-in-image row).
//! - Convert rows to baseline-relative heights and zero-reference them.
//! - Suppress single-sample spikes with a sliding median, reject what
//!   survives by local gradient, and re-fill rejected samples by linear
//!   interpolation (flat extension at the sequence ends).
//! - Smooth with a Savitzky-Golay filter whose window adapts to short
//!   profiles.
//!
//! Column positions are established once by the mask scan and never change
//! downstream: cleaning and smoothing only replace height values.

mod edge;
mod error;
mod outlier;
mod pipeline;
mod savgol;

pub use edge::{EdgePoints, bottom_edge};
pub use error::ProfileError;
pub use outlier::{
    Baseline, baseline_heights, clean_heights, flag_spikes, interpolate_invalid, median_filter,
};
pub use pipeline::{HeightProfile, ProfileConfig, extract_profile, smooth_profile};
pub use savgol::{effective_window, savgol_filter};
