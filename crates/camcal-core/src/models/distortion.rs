use nalgebra::{RealField, Vector2};
use serde::{Deserialize, Serialize};

/// Lens distortion applied in normalized image coordinates.
pub trait DistortionModel<S: RealField + Copy> {
    fn distort(&self, n_undist: &Vector2<S>) -> Vector2<S>;
    fn undistort(&self, n_dist: &Vector2<S>) -> Vector2<S>;
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct NoDistortion;

impl<S: RealField + Copy> DistortionModel<S> for NoDistortion {
    fn distort(&self, n_undist: &Vector2<S>) -> Vector2<S> {
        *n_undist
    }

    fn undistort(&self, n_dist: &Vector2<S>) -> Vector2<S> {
        *n_dist
    }
}

/// Brown-Conrady radial-tangential distortion.
///
/// Coefficients are stored in OpenCV order `(k1, k2, p1, p2, k3)`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BrownConrady5<S: RealField> {
    pub k1: S,
    pub k2: S,
    pub p1: S,
    pub p2: S,
    pub k3: S,
    /// Fixed-point iterations used by [`DistortionModel::undistort`].
    pub iters: u32,
}

impl<S: RealField + Copy> BrownConrady5<S> {
    /// Two-coefficient radial model with tangential terms fixed to zero.
    pub fn radial(k1: S, k2: S) -> Self {
        Self {
            k1,
            k2,
            p1: S::zero(),
            p2: S::zero(),
            k3: S::zero(),
            iters: 8,
        }
    }

    /// Coefficients as `[k1, k2, p1, p2, k3]`.
    pub fn coefficients(&self) -> [S; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }

    fn distort_impl(&self, x: S, y: S) -> (S, S) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = S::one() + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let two = S::one() + S::one();
        let x2 = x * x;
        let y2 = y * y;
        let xy = x * y;

        let x_tan = two * self.p1 * xy + self.p2 * (r2 + two * x2);
        let y_tan = self.p1 * (r2 + two * y2) + two * self.p2 * xy;

        (x * radial + x_tan, y * radial + y_tan)
    }
}

impl<S: RealField + Copy> DistortionModel<S> for BrownConrady5<S> {
    fn distort(&self, n_undist: &Vector2<S>) -> Vector2<S> {
        let (xd, yd) = self.distort_impl(n_undist.x, n_undist.y);
        Vector2::new(xd, yd)
    }

    fn undistort(&self, n_dist: &Vector2<S>) -> Vector2<S> {
        let mut x = n_dist.x;
        let mut y = n_dist.y;

        let iters = if self.iters == 0 { 8 } else { self.iters };
        for _ in 0..iters {
            let (xd, yd) = self.distort_impl(x, y);
            x = x - (xd - n_dist.x);
            y = y - (yd - n_dist.y);
        }
        Vector2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Real;

    #[test]
    fn distort_keeps_point_count_semantics() {
        // One normalized point per input point, same layout.
        let dist = BrownConrady5::<Real> {
            k1: 0.5,
            k2: 0.2,
            p1: 0.0,
            p2: 0.0,
            k3: 0.0,
            iters: 8,
        };
        let pts = [
            Vector2::new(0.3, -0.1),
            Vector2::new(-0.4, 0.5),
            Vector2::new(0.15, 0.05),
        ];
        let out: Vec<_> = pts.iter().map(|p| dist.distort(p)).collect();
        assert_eq!(out.len(), pts.len());
    }

    #[test]
    fn radial_constructor_zeroes_tangential() {
        let dist = BrownConrady5::<Real>::radial(0.5, 0.2);
        assert_eq!(dist.p1, 0.0);
        assert_eq!(dist.p2, 0.0);
        assert_eq!(dist.k3, 0.0);

        // Pure radial distortion moves points along the radius only.
        let n = Vector2::new(0.2, 0.1);
        let d = dist.distort(&n);
        let cross = n.x * d.y - n.y * d.x;
        assert!(cross.abs() < 1e-12);
    }

    #[test]
    fn undistort_inverts_distort() {
        let dist = BrownConrady5::<Real> {
            k1: -0.2,
            k2: 0.03,
            p1: 0.002,
            p2: -0.001,
            k3: 0.0,
            iters: 20,
        };
        let n = Vector2::new(0.25, -0.15);
        let back = dist.undistort(&dist.distort(&n));
        assert!((back - n).norm() < 1e-9);
    }

    #[test]
    fn zero_coefficients_are_identity() {
        let dist = BrownConrady5::<Real>::default();
        let n = Vector2::new(0.4, 0.3);
        assert_eq!(dist.distort(&n), n);
    }
}
