//! Scalar-generic projection shared by residual evaluation and autodiff.
//!
//! The same code path produces f64 residuals and dual-number residuals, so
//! the Jacobian always matches the cost function exactly.

use camcal_core::Pt3;
use nalgebra::{convert, RealField, Vector2, Vector3};

/// Intrinsic parameter count: `(fx, fy, skew, cx, cy, k1, k2, p1, p2, k3)`.
pub const INTRINSICS_DIM: usize = 10;
/// Extrinsic parameter count per view: axis-angle rotation + translation.
pub const POSE_DIM: usize = 6;
/// Parameters seen by a single view: shared intrinsics + its own pose.
pub const LOCAL_DIM: usize = INTRINSICS_DIM + POSE_DIM;

/// Epsilon added to depth for numerical stability.
pub const PROJECTION_EPS: f64 = 1.0e-9;

/// Rotate `p` by the axis-angle vector `w` (Rodrigues' formula).
///
/// Falls back to the first-order expansion near zero, which also carries the
/// correct derivative at `w = 0`.
pub fn rotate_axis_angle<S: RealField>(w: &Vector3<S>, p: &Vector3<S>) -> Vector3<S> {
    let theta2 = w.norm_squared();
    let thresh: S = convert(1.0e-14);
    if theta2 > thresh {
        let theta = theta2.sqrt();
        let axis = w / theta.clone();
        let cos_t = theta.clone().cos();
        let sin_t = theta.sin();
        let axis_cross_p = axis.cross(p);
        let axis_dot_p = axis.dot(p);
        p * cos_t.clone() + axis_cross_p * sin_t + axis * (axis_dot_p * (S::one() - cos_t))
    } else {
        p + w.cross(p)
    }
}

/// Project a board point through the full rad-tan camera model.
///
/// `intr` holds `[fx, fy, skew, cx, cy, k1, k2, p1, p2, k3]`; `pose` holds
/// `[wx, wy, wz, tx, ty, tz]` mapping board coordinates into the camera
/// frame.
pub fn project_radtan<S: RealField>(intr: &[S], pose: &[S], pw: &Pt3) -> Vector2<S> {
    debug_assert_eq!(intr.len(), INTRINSICS_DIM);
    debug_assert_eq!(pose.len(), POSE_DIM);

    let w = Vector3::new(pose[0].clone(), pose[1].clone(), pose[2].clone());
    let t = Vector3::new(pose[3].clone(), pose[4].clone(), pose[5].clone());
    let pw_s = Vector3::new(
        convert::<f64, S>(pw.x),
        convert::<f64, S>(pw.y),
        convert::<f64, S>(pw.z),
    );
    let pc = rotate_axis_angle(&w, &pw_s) + t;

    let eps: S = convert(PROJECTION_EPS);
    let z = pc.z.clone() + eps;
    let x = pc.x.clone() / z.clone();
    let y = pc.y.clone() / z;

    // Brown-Conrady distortion in normalized coordinates.
    let k1 = intr[5].clone();
    let k2 = intr[6].clone();
    let p1 = intr[7].clone();
    let p2 = intr[8].clone();
    let k3 = intr[9].clone();

    let r2 = x.clone() * x.clone() + y.clone() * y.clone();
    let r4 = r2.clone() * r2.clone();
    let r6 = r4.clone() * r2.clone();
    let radial = S::one() + k1 * r2.clone() + k2 * r4 + k3 * r6;

    let two = S::one() + S::one();
    let xy = x.clone() * y.clone();
    let x_tan = two.clone() * p1.clone() * xy.clone()
        + p2.clone() * (r2.clone() + two.clone() * x.clone() * x.clone());
    let y_tan = p1 * (r2 + two.clone() * y.clone() * y.clone()) + two * p2 * xy;

    let xd = x * radial.clone() + x_tan;
    let yd = y * radial + y_tan;

    let fx = intr[0].clone();
    let fy = intr[1].clone();
    let skew = intr[2].clone();
    let cx = intr[3].clone();
    let cy = intr[4].clone();

    let u = fx * xd.clone() + skew * yd.clone() + cx;
    let v = fy * yd + cy;
    Vector2::new(u, v)
}
