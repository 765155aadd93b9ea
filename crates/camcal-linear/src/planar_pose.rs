//! Planar pose recovery from a homography.
//!
//! Decomposes a plane-induced homography into rotation and translation,
//! assuming the target lies on the plane `Z = 0` in its own coordinates.

use camcal_core::{Iso3, Mat3, Real};
use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("intrinsics matrix is not invertible")]
    SingularIntrinsics,
    #[error("homography columns have degenerate scale")]
    DegenerateScale,
    #[error("svd failed")]
    SvdFailed,
}

/// Estimate the pose of a planar board (Z=0) relative to the camera, given
/// intrinsics `K` and the homography `H` (board plane -> image).
///
/// Returns an [`Iso3`] mapping board coordinates into camera coordinates.
pub fn pose_from_homography(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3, PoseError> {
    let k_inv = kmtx.try_inverse().ok_or(PoseError::SingularIntrinsics)?;

    let h1 = hmtx.column(0);
    let h2 = hmtx.column(1);
    let h3 = hmtx.column(2).into_owned();

    let k_inv_h1 = k_inv * h1;
    let k_inv_h2 = k_inv * h2;

    // Scale factor λ: average of the first two column norms for robustness.
    let norm1 = k_inv_h1.norm();
    let norm2 = k_inv_h2.norm();
    let mean_norm = (norm1 + norm2) * 0.5;
    if mean_norm <= f64::EPSILON {
        return Err(PoseError::DegenerateScale);
    }
    let lambda = 1.0 / mean_norm;

    let r1 = (lambda * k_inv_h1).into_owned();
    let r2 = (lambda * k_inv_h2).into_owned();
    let r3 = r1.cross(&r2);

    let mut r_mat = Matrix3::<Real>::zeros();
    r_mat.set_column(0, &r1);
    r_mat.set_column(1, &r2);
    r_mat.set_column(2, &r3);

    // Project onto SO(3) (polar decomposition via SVD).
    let svd = r_mat.svd(true, true);
    let u = svd.u.ok_or(PoseError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PoseError::SvdFailed)?;
    let mut r_orth = u * v_t;

    // Ensure det(R) > 0.
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let t_vec: Vector3<Real> = lambda * (k_inv * h3);
    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));

    Ok(Iso3::from_parts(Translation3::from(t_vec), rot))
}
