//! Closed-form initialization for planar intrinsics calibration.
//!
//! The linear stage turns per-view 2D-2D correspondences into a full seed for
//! nonlinear refinement: DLT homographies, Zhang's intrinsics, a linear
//! distortion fit, and per-view planar poses.

mod distortion_fit;
mod homography;
mod planar_pose;
mod zhang;

pub use distortion_fit::*;
pub use homography::*;
pub use planar_pose::*;
pub use zhang::*;
