//! Synthetic dataset generation.
//!
//! A [`VirtualCamera`] projects a [`Checkerboard`] into a ground-truth camera
//! model and keeps only the corners landing inside the sensor bounds. The
//! resulting [`DetectionView`]s feed the calibration pipeline in tests and
//! benchmarks exactly like real detections would.

pub mod noise;

pub use noise::PixelNoise;

use crate::{
    board::Checkerboard,
    math::{Iso3, Pt2, Real, Vec3},
    models::{BrownConrady5, CameraIntrinsics, PinholeCamera, RadTanCamera},
    observation::DetectionView,
};
use anyhow::{ensure, Result};
use nalgebra::{Translation3, UnitQuaternion};

/// Ground-truth camera with known sensor bounds.
#[derive(Clone, Copy, Debug)]
pub struct VirtualCamera {
    pub camera: RadTanCamera,
    pub image_width: u32,
    pub image_height: u32,
}

impl VirtualCamera {
    pub fn new(
        intrinsics: CameraIntrinsics<Real>,
        distortion: BrownConrady5<Real>,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        Self {
            camera: PinholeCamera::new(intrinsics, distortion),
            image_width,
            image_height,
        }
    }

    /// Project the board corners for one pose and keep only corners that land
    /// strictly inside the sensor bounds.
    ///
    /// `cam_from_board` maps board-frame points into the camera frame. The
    /// returned view's 3D and 2D lists are filtered consistently.
    pub fn observe_board(
        &self,
        board: &Checkerboard,
        cam_from_board: &Iso3,
        noise: Option<&PixelNoise>,
        view_idx: usize,
    ) -> DetectionView {
        let w = self.image_width as Real;
        let h = self.image_height as Real;

        let mut board_points = Vec::new();
        let mut pixel_points = Vec::new();

        for (corner_idx, pw) in board.corner_positions().into_iter().enumerate() {
            let pc = cam_from_board.transform_point(&pw);
            let Some(mut uv) = self.camera.project_point(&pc) else {
                continue;
            };
            if let Some(noise) = noise {
                uv = noise.perturb(view_idx, corner_idx, uv);
            }
            if uv.x <= 0.0 || uv.x >= w || uv.y <= 0.0 || uv.y >= h {
                continue;
            }
            board_points.push(pw);
            pixel_points.push(Pt2::new(uv.x, uv.y));
        }

        DetectionView {
            board_points,
            pixel_points,
            weights: None,
        }
    }
}

/// Poses that keep the board centered in front of the camera.
///
/// Each view tilts the board around its own center by a distinct combination
/// of X and Y rotations and steps the depth, giving the orientation diversity
/// Zhang's closed form needs.
pub fn facing_board_poses(
    board: &Checkerboard,
    n_views: usize,
    tilt_step_rad: Real,
    z_start: Real,
    z_step: Real,
) -> Vec<Iso3> {
    let center = Vec3::new(
        (board.cols.saturating_sub(1)) as Real * board.spacing * 0.5,
        (board.rows.saturating_sub(1)) as Real * board.spacing * 0.5,
        0.0,
    );

    (0..n_views)
        .map(|i| {
            let tilt_x = tilt_step_rad * ((i % 3) as Real - 1.0);
            let tilt_y = tilt_step_rad * (((i / 3) % 3) as Real - 1.0);
            let rot = UnitQuaternion::from_euler_angles(tilt_x, tilt_y, 0.0);

            // Place the rotated board center on the optical axis at depth z.
            let z = z_start + z_step * i as Real;
            let t = Vec3::new(0.0, 0.0, z) - rot * center;
            Iso3::from_parts(Translation3::from(t), rot)
        })
        .collect()
}

/// Synthetic planar calibration dataset with known ground truth.
#[derive(Clone, Debug)]
pub struct SyntheticDataset {
    pub camera: VirtualCamera,
    pub board: Checkerboard,
    poses: Vec<Iso3>,
    views: Vec<DetectionView>,
}

impl SyntheticDataset {
    /// Generate a dataset for a rad-tan ground-truth camera.
    ///
    /// # Errors
    ///
    /// Fails when any pose leaves no corner visible in the sensor bounds.
    pub fn radtan(
        camera: VirtualCamera,
        board: Checkerboard,
        poses: Vec<Iso3>,
        noise: Option<PixelNoise>,
    ) -> Result<Self> {
        ensure!(!poses.is_empty(), "need at least one board pose");

        let mut views = Vec::with_capacity(poses.len());
        for (view_idx, pose) in poses.iter().enumerate() {
            let view = camera.observe_board(&board, pose, noise.as_ref(), view_idx);
            ensure!(
                !view.is_empty(),
                "view {} has no visible corners; board is off-sensor",
                view_idx
            );
            views.push(view);
        }

        Ok(Self {
            camera,
            board,
            poses,
            views,
        })
    }

    /// Ground-truth board poses in the camera frame, one per view.
    pub fn board_poses_in_camera(&self) -> &[Iso3] {
        &self.poses
    }

    /// Corner detections in sensor coordinates, one view per pose.
    pub fn detections(&self) -> &[DetectionView] {
        &self.views
    }

    pub fn num_views(&self) -> usize {
        self.views.len()
    }
}
