//! Linear least-squares distortion seed from homography residuals.
//!
//! With intrinsics K and a per-view homography H, the residual between the
//! homography-predicted position and the observed pixel, expressed in
//! normalized coordinates, is (to first order) a linear function of the
//! Brown-Conrady coefficients. Solving the stacked system gives a distortion
//! seed for nonlinear refinement; it is not meant to be a final estimate.

use camcal_core::{BrownConrady5, DetectionView, Mat3, Pt2, Real, Vec2, Vec3};
use log::debug;
use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy)]
pub enum DistortionFitError {
    #[error("need at least {0} points for distortion estimation, got {1}")]
    NotEnoughPoints(usize, usize),
    #[error("view count ({0}) must match homography count ({1})")]
    ViewCountMismatch(usize, usize),
    #[error("svd failed during distortion estimation")]
    SvdFailed,
    #[error("intrinsics matrix is not invertible")]
    SingularIntrinsics,
    #[error("degenerate configuration: all points near image center")]
    Degenerate,
}

/// Options controlling the linear distortion fit.
#[derive(Debug, Clone, Copy)]
pub struct DistortionFitOptions {
    /// Fix tangential coefficients (p1, p2) to zero.
    pub fix_tangential: bool,
    /// Fix the third radial coefficient (k3) to zero.
    ///
    /// The r⁶ term overfits with typical calibration data; keep it fixed
    /// unless the lens is wide-angle and the views are diverse.
    pub fix_k3: bool,
    /// Undistortion iterations stored in the returned model.
    pub iters: u32,
}

impl Default for DistortionFitOptions {
    fn default() -> Self {
        Self {
            fix_tangential: false,
            fix_k3: true,
            iters: 8,
        }
    }
}

fn normalized(k_inv: &Mat3, p: &Pt2) -> Vec2 {
    let v = k_inv * Vec3::new(p.x, p.y, 1.0);
    Vec2::new(v.x / v.z, v.y / v.z)
}

fn homography_pixel(hmtx: &Mat3, board: &Pt2) -> Pt2 {
    let v = hmtx * Vec3::new(board.x, board.y, 1.0);
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Estimate Brown-Conrady coefficients from homography residuals.
///
/// `views[i]` must correspond to `homographies[i]`, and the homographies must
/// have been computed from the raw (distorted) pixel observations so that the
/// residuals still contain the distortion signal.
pub fn fit_distortion(
    kmtx: &Mat3,
    views: &[DetectionView],
    homographies: &[Mat3],
    opts: DistortionFitOptions,
) -> Result<BrownConrady5<Real>, DistortionFitError> {
    if views.len() != homographies.len() {
        return Err(DistortionFitError::ViewCountMismatch(
            views.len(),
            homographies.len(),
        ));
    }

    let total_points: usize = views.iter().map(|v| v.len()).sum();
    let n_params: usize = match (opts.fix_tangential, opts.fix_k3) {
        (true, true) => 2,
        (true, false) => 3,
        (false, true) => 4,
        (false, false) => 5,
    };
    let min_points = n_params.div_ceil(2) + 2;
    if total_points < min_points {
        return Err(DistortionFitError::NotEnoughPoints(min_points, total_points));
    }

    let k_inv = kmtx
        .try_inverse()
        .ok_or(DistortionFitError::SingularIntrinsics)?;

    // Each point contributes two rows (x and y residuals).
    let mut a = DMatrix::<Real>::zeros(2 * total_points, n_params);
    let mut b = nalgebra::DVector::<Real>::zeros(2 * total_points);
    let mut max_r2 = 0.0_f64;

    let mut row = 0;
    for (view, hmtx) in views.iter().zip(homographies.iter()) {
        for (board_pt, pixel_obs) in view.board_points_2d().iter().zip(&view.pixel_points) {
            let pixel_ideal = homography_pixel(hmtx, board_pt);
            let n_ideal = normalized(&k_inv, &pixel_ideal);
            let n_obs = normalized(&k_inv, pixel_obs);
            let residual = n_obs - n_ideal;

            let x = n_ideal.x;
            let y = n_ideal.y;
            let r2 = x * x + y * y;
            let r4 = r2 * r2;
            let r6 = r4 * r2;
            max_r2 = max_r2.max(r2);

            // Radial: d = n * (k1 r² + k2 r⁴ + k3 r⁶)
            // Tangential: dx += 2 p1 xy + p2 (r² + 2x²), dy += p1 (r² + 2y²) + 2 p2 xy
            let mut col = 0;

            a[(row, col)] = x * r2;
            a[(row + 1, col)] = y * r2;
            col += 1;

            a[(row, col)] = x * r4;
            a[(row + 1, col)] = y * r4;
            col += 1;

            if !opts.fix_k3 {
                a[(row, col)] = x * r6;
                a[(row + 1, col)] = y * r6;
                col += 1;
            }

            if !opts.fix_tangential {
                let xy = x * y;
                a[(row, col)] = 2.0 * xy;
                a[(row + 1, col)] = r2 + 2.0 * y * y;
                col += 1;

                a[(row, col)] = r2 + 2.0 * x * x;
                a[(row + 1, col)] = 2.0 * xy;
            }

            b[row] = residual.x;
            b[row + 1] = residual.y;
            row += 2;
        }
    }

    if max_r2 < 1e-6 {
        return Err(DistortionFitError::Degenerate);
    }

    let svd = a.svd(true, true);
    let x = svd
        .solve(&b, 1e-10)
        .map_err(|_| DistortionFitError::SvdFailed)?;

    let mut col = 0;
    let k1 = x[col];
    col += 1;
    let k2 = x[col];
    col += 1;
    let k3 = if opts.fix_k3 {
        0.0
    } else {
        let val = x[col];
        col += 1;
        val
    };
    let (p1, p2) = if opts.fix_tangential {
        (0.0, 0.0)
    } else {
        (x[col], x[col + 1])
    };

    debug!("distortion seed: k1={k1:.4} k2={k2:.4} p1={p1:.5} p2={p2:.5} k3={k3:.4}");

    Ok(BrownConrady5 {
        k1,
        k2,
        p1,
        p2,
        k3,
        iters: opts.iters,
    })
}
