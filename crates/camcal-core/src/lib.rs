//! Core math and geometry primitives for `camcal`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...),
//! - the pinhole camera model with radial-tangential distortion,
//! - the planar chessboard target,
//! - observation containers for 2D-3D corner correspondences,
//! - synthetic dataset generation through a virtual camera.
//!
//! Camera pipeline:
//! `pixel = K ∘ distortion ∘ normalize(point in camera frame)`

/// Planar chessboard target.
pub mod board;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Camera and distortion models.
pub mod models;
/// Corner detections and reprojection statistics.
pub mod observation;
/// Virtual camera and synthetic dataset generation.
pub mod synthetic;

pub use board::*;
pub use math::*;
pub use models::*;
pub use observation::*;
