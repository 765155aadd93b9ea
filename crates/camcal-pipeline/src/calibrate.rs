use anyhow::{ensure, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use camcal_core::{
    BrownConrady5, CameraParams, DetectionView, Iso3, Mat3, PinholeCamera, RadTanCamera, Real,
    ReprojectionStats,
};
use camcal_linear::{
    dlt_homography, estimate_intrinsics_from_homographies, fit_distortion, pose_from_homography,
    DistortionFitOptions,
};
use camcal_optim::{
    pack_params, refine_planar_intrinsics, LmBackend, PlanarIntrinsicsProblem, RobustKernel,
    SolveOptions,
};

/// Options for the linear distortion seed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionSeedConfig {
    /// Skip the linear fit and seed distortion with zeros.
    pub disable: bool,
    /// Fix tangential coefficients (p1, p2) to zero in the seed.
    pub fix_tangential: bool,
    /// Fix the third radial coefficient (k3) to zero in the seed.
    pub fix_k3: bool,
}

impl Default for DistortionSeedConfig {
    fn default() -> Self {
        Self {
            disable: false,
            fix_tangential: false,
            fix_k3: true,
        }
    }
}

impl DistortionSeedConfig {
    fn fit_options(&self) -> DistortionFitOptions {
        DistortionFitOptions {
            fix_tangential: self.fix_tangential,
            fix_k3: self.fix_k3,
            iters: 8,
        }
    }
}

/// Full calibration configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub distortion_seed: DistortionSeedConfig,
    pub robust: RobustKernel,
    pub solve: SolveOptions,
}

/// Result of a calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Refined camera parameters.
    pub camera: CameraParams,
    /// Refined board poses in the camera frame, one per view.
    pub poses: Vec<Iso3>,
    /// Final solver cost (half the sum of squared residuals).
    pub final_cost: Real,
    /// Per-corner reprojection error statistics in pixels.
    pub reprojection: ReprojectionStats,
    /// Solver evaluations used.
    pub iterations: usize,
    /// Whether the solver reported convergence.
    pub converged: bool,
}

/// Linear initialization seed: intrinsics, distortion and per-view poses.
#[derive(Debug, Clone)]
pub struct CalibrationSeed {
    pub camera: RadTanCamera,
    pub poses: Vec<Iso3>,
    pub homographies: Vec<Mat3>,
}

/// Compute the linear initialization for a set of detection views.
///
/// Requires at least 3 views with at least 4 corners each.
pub fn linear_calibration_seed(
    views: &[DetectionView],
    seed_cfg: &DistortionSeedConfig,
) -> Result<CalibrationSeed> {
    ensure!(
        views.len() >= 3,
        "need at least 3 views for initialization (got {})",
        views.len()
    );

    let mut homographies = Vec::with_capacity(views.len());
    for (idx, view) in views.iter().enumerate() {
        let h = dlt_homography(&view.board_points_2d(), &view.pixel_points)
            .with_context(|| format!("failed to compute homography for view {idx}"))?;
        homographies.push(h);
    }

    let intrinsics = estimate_intrinsics_from_homographies(&homographies)
        .context("closed-form intrinsics initialization failed")?;
    info!(
        "linear init: fx={:.1} fy={:.1} cx={:.1} cy={:.1} skew={:.3}",
        intrinsics.fx, intrinsics.fy, intrinsics.cx, intrinsics.cy, intrinsics.skew
    );

    let kmtx = intrinsics.k_matrix();
    let distortion = if seed_cfg.disable {
        BrownConrady5::default()
    } else {
        match fit_distortion(&kmtx, views, &homographies, seed_cfg.fit_options()) {
            Ok(dist) => dist,
            Err(err) => {
                warn!("distortion seed failed ({err}); starting from zero distortion");
                BrownConrady5::default()
            }
        }
    };

    let poses = homographies
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            pose_from_homography(&kmtx, h)
                .with_context(|| format!("failed to recover pose for view {idx}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CalibrationSeed {
        camera: PinholeCamera::new(intrinsics, distortion),
        poses,
        homographies,
    })
}

/// Reprojection error norms of every corner across all views.
pub fn reprojection_errors(
    camera: &RadTanCamera,
    poses: &[Iso3],
    views: &[DetectionView],
) -> Result<Vec<Real>> {
    ensure!(
        poses.len() == views.len(),
        "pose count ({}) must match view count ({})",
        poses.len(),
        views.len()
    );

    let mut errors = Vec::new();
    for (pose, view) in poses.iter().zip(views.iter()) {
        for (pw, uv) in view.iter() {
            let p_cam = pose.transform_point(pw);
            let Some(proj) = camera.project_point(&p_cam) else {
                anyhow::bail!("corner behind camera during reprojection");
            };
            errors.push((proj - uv.coords).norm());
        }
    }
    Ok(errors)
}

/// Calibrate a camera from planar target detections.
///
/// Runs the linear initialization and the nonlinear refinement, returning the
/// refined camera, per-view board poses and reprojection statistics.
pub fn calibrate_camera(
    views: &[DetectionView],
    config: &CalibrationConfig,
) -> Result<CalibrationReport> {
    let seed = linear_calibration_seed(views, &config.distortion_seed)?;

    let problem = PlanarIntrinsicsProblem::new(views.to_vec(), config.robust)?;
    let x0 = pack_params(&seed.camera, &seed.poses);

    let backend = LmBackend;
    let (camera, poses, report) =
        refine_planar_intrinsics(&backend, &problem, x0, &config.solve)?;

    let errors = reprojection_errors(&camera, &poses, views)?;
    let reprojection = ReprojectionStats::from_errors(&errors);
    info!(
        "calibration finished: cost={:.3e} mean_err={:.4}px ({} corners)",
        report.final_cost, reprojection.mean, reprojection.count
    );

    Ok(CalibrationReport {
        camera: CameraParams::from_radtan(&camera),
        poses,
        final_cost: report.final_cost,
        reprojection,
        iterations: report.iterations,
        converged: report.converged,
    })
}
