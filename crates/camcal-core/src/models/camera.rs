use nalgebra::Vector2;

use super::{BrownConrady5, CameraIntrinsics, DistortionModel};
use crate::math::{Pt3, Real, Vec3};

/// Pinhole camera: intrinsics plus a distortion stage.
#[derive(Clone, Copy, Debug)]
pub struct PinholeCamera<D> {
    pub k: CameraIntrinsics<Real>,
    pub dist: D,
}

/// Camera with the Brown-Conrady radial-tangential distortion model.
pub type RadTanCamera = PinholeCamera<BrownConrady5<Real>>;

impl<D: DistortionModel<Real>> PinholeCamera<D> {
    pub fn new(k: CameraIntrinsics<Real>, dist: D) -> Self {
        Self { k, dist }
    }

    /// Project a point given in the camera frame to pixel coordinates.
    ///
    /// Returns `None` when the point is not in front of the camera.
    pub fn project_point(&self, p_c: &Pt3) -> Option<Vector2<Real>> {
        if p_c.z <= 0.0 {
            return None;
        }
        let n_u = Vector2::new(p_c.x / p_c.z, p_c.y / p_c.z);
        let n_d = self.dist.distort(&n_u);
        Some(self.k.to_pixel(&n_d))
    }

    /// Back-project a pixel to a unit-norm ray direction in the camera frame.
    pub fn backproject_pixel(&self, px: &Vector2<Real>) -> Vec3 {
        let n_d = self.k.from_pixel(px);
        let n_u = self.dist.undistort(&n_d);
        let dir = Vec3::new(n_u.x, n_u.y, 1.0);
        dir / dir.norm()
    }
}
