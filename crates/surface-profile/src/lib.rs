//! Umbrella crate for the `surface-profile` workspace.
//!
//! Re-exports the image primitives, segmentation, and profile-extraction
//! crates behind a single dependency. The per-image flow is:
//!
//! 1. **Segment** — threshold the raw image into a binary foreground mask
//!    ([`mask_rgb`] / [`mask_gray`], optional morphology cleanup).
//! 2. **Extract** — reduce the mask to one bottom-edge row per column,
//!    convert to baseline-relative heights, reject spikes, interpolate, and
//!    smooth ([`extract_profile`]).

pub use sp_core::*;
pub use sp_profile::*;
pub use sp_segment::*;
