//! Joint refinement of intrinsics, distortion and per-view board poses.
//!
//! The parameter vector is `10 + 6 * n_views` long:
//! `(fx, fy, skew, cx, cy, k1, k2, p1, p2, k3)` followed by one axis-angle
//! rotation and translation per view. Residuals are `measured - projected`,
//! interleaved `(u, v)` per corner with views in input order.

use crate::jacobian::jacobian_unweighted_ad;
use crate::projection::{project_radtan, INTRINSICS_DIM, POSE_DIM};
use crate::robust::RobustKernel;
use crate::traits::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
use anyhow::{ensure, Result};
use camcal_core::{
    BrownConrady5, CameraIntrinsics, DetectionView, Iso3, PinholeCamera, RadTanCamera, Real,
};
use nalgebra::{convert, DMatrix, DVector, RealField, UnitQuaternion, Vector3};

/// Nonlinear refinement problem for planar intrinsics and per-view poses.
#[derive(Debug, Clone)]
pub struct PlanarIntrinsicsProblem {
    pub views: Vec<DetectionView>,
    pub robust: RobustKernel,
}

impl PlanarIntrinsicsProblem {
    pub fn new(views: Vec<DetectionView>, robust: RobustKernel) -> Result<Self> {
        ensure!(!views.is_empty(), "need at least one view for calibration");
        for (i, view) in views.iter().enumerate() {
            ensure!(view.len() >= 4, "view {} has too few points (need >=4)", i);
        }
        Ok(Self { views, robust })
    }

    pub fn num_views(&self) -> usize {
        self.views.len()
    }

    pub fn param_dim(&self) -> usize {
        INTRINSICS_DIM + POSE_DIM * self.num_views()
    }

    pub fn residual_dim(&self) -> usize {
        self.views.iter().map(|v| 2 * v.len()).sum()
    }
}

/// Residuals of one view against the local `[intrinsics, pose]` parameters.
///
/// Generic over the scalar so dual numbers flow through for the Jacobian.
pub(crate) fn residuals_view_unweighted<S: RealField>(
    intr: &[S],
    pose: &[S],
    view: &DetectionView,
) -> DVector<S> {
    let mut r = DVector::from_element(2 * view.len(), S::zero());
    for (i, (pw, uv)) in view.iter().enumerate() {
        let proj = project_radtan(intr, pose, pw);
        r[2 * i] = convert::<f64, S>(uv.x) - proj.x.clone();
        r[2 * i + 1] = convert::<f64, S>(uv.y) - proj.y.clone();
    }
    r
}

/// Pack a camera and per-view poses into the optimization vector.
pub fn pack_params(camera: &RadTanCamera, poses_cam_from_board: &[Iso3]) -> DVector<Real> {
    let n_views = poses_cam_from_board.len();
    let mut x = DVector::zeros(INTRINSICS_DIM + POSE_DIM * n_views);

    let k = &camera.k;
    x[0] = k.fx;
    x[1] = k.fy;
    x[2] = k.skew;
    x[3] = k.cx;
    x[4] = k.cy;

    let dist = &camera.dist;
    x[5] = dist.k1;
    x[6] = dist.k2;
    x[7] = dist.p1;
    x[8] = dist.p2;
    x[9] = dist.k3;

    for (i, pose) in poses_cam_from_board.iter().enumerate() {
        let idx = INTRINSICS_DIM + POSE_DIM * i;
        let axis_angle = pose.rotation.scaled_axis();
        let t = pose.translation.vector;
        x[idx] = axis_angle.x;
        x[idx + 1] = axis_angle.y;
        x[idx + 2] = axis_angle.z;
        x[idx + 3] = t.x;
        x[idx + 4] = t.y;
        x[idx + 5] = t.z;
    }

    x
}

/// Decode the optimization vector into a camera and per-view poses.
pub fn decode_params(x: &DVector<Real>, n_views: usize) -> (RadTanCamera, Vec<Iso3>) {
    debug_assert_eq!(x.len(), INTRINSICS_DIM + POSE_DIM * n_views);

    let k = CameraIntrinsics {
        fx: x[0],
        fy: x[1],
        skew: x[2],
        cx: x[3],
        cy: x[4],
    };
    let dist = BrownConrady5 {
        k1: x[5],
        k2: x[6],
        p1: x[7],
        p2: x[8],
        k3: x[9],
        iters: 8,
    };

    let mut poses = Vec::with_capacity(n_views);
    for i in 0..n_views {
        let idx = INTRINSICS_DIM + POSE_DIM * i;
        let axis_angle = Vector3::new(x[idx], x[idx + 1], x[idx + 2]);
        let trans = Vector3::new(x[idx + 3], x[idx + 4], x[idx + 5]);
        poses.push(Iso3::from_parts(
            trans.into(),
            UnitQuaternion::from_scaled_axis(axis_angle),
        ));
    }

    (PinholeCamera::new(k, dist), poses)
}

impl NllsProblem for PlanarIntrinsicsProblem {
    fn num_params(&self) -> usize {
        self.param_dim()
    }

    fn num_residuals(&self) -> usize {
        self.residual_dim()
    }

    fn residuals_unweighted(&self, x: &DVector<Real>) -> DVector<Real> {
        let intr = &x.as_slice()[..INTRINSICS_DIM];
        let mut r = DVector::zeros(self.residual_dim());

        let mut offset = 0;
        for (view_idx, view) in self.views.iter().enumerate() {
            let pose_off = INTRINSICS_DIM + POSE_DIM * view_idx;
            let pose = &x.as_slice()[pose_off..pose_off + POSE_DIM];
            let rv = residuals_view_unweighted(intr, pose, view);
            r.rows_mut(offset, rv.len()).copy_from(&rv);
            offset += rv.len();
        }
        r
    }

    fn jacobian_unweighted(&self, x: &DVector<Real>) -> DMatrix<Real> {
        jacobian_unweighted_ad(self, x)
    }

    fn robust_row_scales(&self, r_unweighted: &DVector<Real>) -> DVector<Real> {
        let mut scales = DVector::from_element(r_unweighted.len(), 1.0);
        let mut row = 0;
        for view in &self.views {
            for idx in 0..view.len() {
                let ru = r_unweighted[row];
                let rv = r_unweighted[row + 1];
                let (_, w_robust) = self.robust.rho_and_weight(ru * ru + rv * rv);
                let scale = (view.weight(idx) * w_robust).sqrt();
                scales[row] = scale;
                scales[row + 1] = scale;
                row += 2;
            }
        }
        scales
    }
}

/// Refine camera intrinsics, distortion and per-view poses.
///
/// Returns the refined camera, poses and the solver report.
pub fn refine_planar_intrinsics<B: NllsSolverBackend>(
    backend: &B,
    problem: &PlanarIntrinsicsProblem,
    x0: DVector<Real>,
    opts: &SolveOptions,
) -> Result<(RadTanCamera, Vec<Iso3>, SolveReport)> {
    ensure!(
        x0.len() == problem.param_dim(),
        "initial parameter vector has dimension {}, expected {}",
        x0.len(),
        problem.param_dim()
    );

    let (x_opt, report) = backend.solve(problem, x0, opts);
    let (camera, poses) = decode_params(&x_opt, problem.num_views());
    Ok((camera, poses, report))
}
