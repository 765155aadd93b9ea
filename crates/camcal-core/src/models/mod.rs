//! Camera model building blocks.
//!
//! A camera is composed of two stages:
//!
//! 1. [`DistortionModel`]: apply radial/tangential distortion in normalized
//!    image coordinates.
//! 2. [`CameraIntrinsics`]: map normalized coordinates to pixels (K matrix).
//!
//! Parameter structs are provided for JSON serialization and for constructing
//! concrete camera models with f64 precision.

mod camera;
mod distortion;
mod intrinsics;
mod params;

pub use camera::*;
pub use distortion::*;
pub use intrinsics::*;
pub use params::*;
