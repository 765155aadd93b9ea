use serde::{Deserialize, Serialize};

use super::{BrownConrady5, CameraIntrinsics, DistortionModel, NoDistortion, PinholeCamera};
use crate::math::Real;

/// Serializable distortion model parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistortionParams {
    /// No distortion.
    None,
    /// Brown-Conrady 5-parameter radial-tangential model.
    BrownConrady5 {
        #[serde(flatten)]
        params: BrownConrady5<Real>,
    },
}

/// Serializable camera parameters for building a runtime model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraParams {
    pub intrinsics: CameraIntrinsics<Real>,
    pub distortion: DistortionParams,
}

/// Concrete camera type built from parameters (f64).
pub type CameraModel = PinholeCamera<AnyDistortion>;

impl CameraParams {
    /// Build a concrete camera model from this parameter set.
    pub fn build(&self) -> CameraModel {
        let dist = match self.distortion {
            DistortionParams::None => AnyDistortion::None(NoDistortion),
            DistortionParams::BrownConrady5 { params } => AnyDistortion::BrownConrady5(params),
        };
        PinholeCamera::new(self.intrinsics, dist)
    }

    /// Parameter mirror of a concrete rad-tan camera.
    pub fn from_radtan(camera: &super::RadTanCamera) -> Self {
        Self {
            intrinsics: camera.k,
            distortion: DistortionParams::BrownConrady5 {
                params: camera.dist,
            },
        }
    }
}

// Type-erased distortion wrapper producing a single concrete camera type.
#[derive(Clone, Copy, Debug)]
#[doc(hidden)]
pub enum AnyDistortion {
    None(NoDistortion),
    BrownConrady5(BrownConrady5<Real>),
}

impl DistortionModel<Real> for AnyDistortion {
    fn distort(&self, n: &nalgebra::Vector2<Real>) -> nalgebra::Vector2<Real> {
        match self {
            AnyDistortion::None(m) => m.distort(n),
            AnyDistortion::BrownConrady5(m) => m.distort(n),
        }
    }

    fn undistort(&self, n: &nalgebra::Vector2<Real>) -> nalgebra::Vector2<Real> {
        match self {
            AnyDistortion::None(m) => m.undistort(n),
            AnyDistortion::BrownConrady5(m) => m.undistort(n),
        }
    }
}
