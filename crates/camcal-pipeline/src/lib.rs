//! End-to-end planar intrinsics calibration.
//!
//! [`calibrate_camera`] chains the linear initialization from
//! `camcal-linear` with the nonlinear refinement from `camcal-optim` and
//! produces a serializable [`CalibrationReport`]. The `render` module writes
//! detection overlays for visual inspection.

mod calibrate;
pub mod render;

pub use calibrate::*;
