//! High-level entry crate for the `camcal` toolbox.
//!
//! Most users only need [`pipeline::calibrate_camera`]:
//!
//! ```no_run
//! use camcal::pipeline::{calibrate_camera, CalibrationConfig};
//! use camcal::core::DetectionView;
//!
//! # fn main() -> anyhow::Result<()> {
//! let views: Vec<DetectionView> = /* corner detections per image */
//! # vec![];
//! let report = calibrate_camera(&views, &CalibrationConfig::default())?;
//! println!("mean reprojection error: {:.3} px", report.reprojection.mean);
//! # Ok(())
//! # }
//! ```
//!
//! For custom workflows the lower layers are re-exported:
//!
//! - [`core`]: math types, camera models, targets, synthetic datasets
//! - [`linear`]: closed-form initialization (homographies, Zhang, poses)
//! - [`optim`]: nonlinear least-squares refinement
//! - [`pipeline`]: all-in-one calibration plus detection rendering

/// Math types, camera models, targets and synthetic datasets.
pub mod core {
    pub use camcal_core::*;
}

/// Closed-form initialization algorithms.
pub mod linear {
    pub use camcal_linear::*;
}

/// Nonlinear least-squares optimization.
pub mod optim {
    pub use camcal_optim::*;
}

/// All-in-one calibration pipeline and rendering.
pub mod pipeline {
    pub use camcal_pipeline::*;
}

/// Convenient re-exports for common use cases.
pub mod prelude {
    pub use crate::core::{
        BrownConrady5, CameraIntrinsics, CameraParams, Checkerboard, DetectionView, Iso3,
        NoDistortion, PinholeCamera, Pt2, Pt3, RadTanCamera, Real, ReprojectionStats, Vec2, Vec3,
    };
    pub use crate::linear::{dlt_homography, estimate_intrinsics_from_homographies};
    pub use crate::optim::{RobustKernel, SolveOptions};
    pub use crate::pipeline::{calibrate_camera, CalibrationConfig, CalibrationReport};
}
