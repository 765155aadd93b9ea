//! Observation containers for calibration data.
//!
//! A [`DetectionView`] stores the 2D-3D corner correspondences of one image
//! of the planar target and is the canonical input to both the linear
//! initialization and the nonlinear refinement.

use crate::math::{Pt2, Pt3};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Corner detections of a single view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionView {
    /// Corner positions in board coordinates (Z = 0 for a planar target).
    pub board_points: Vec<Pt3>,
    /// Corresponding detected pixel coordinates.
    pub pixel_points: Vec<Pt2>,
    /// Optional per-corner weights (default: 1.0 for all corners).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

impl DetectionView {
    /// Construct detections without per-corner weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the 3D and 2D point counts don't match.
    pub fn new(board_points: Vec<Pt3>, pixel_points: Vec<Pt2>) -> Result<Self> {
        ensure!(
            board_points.len() == pixel_points.len(),
            "3D / 2D point counts must match: {} vs {}",
            board_points.len(),
            pixel_points.len()
        );
        Ok(Self {
            board_points,
            pixel_points,
            weights: None,
        })
    }

    /// Construct detections with per-corner weights.
    ///
    /// # Errors
    ///
    /// Returns an error if counts don't match or weights are negative.
    pub fn new_with_weights(
        board_points: Vec<Pt3>,
        pixel_points: Vec<Pt2>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        ensure!(
            board_points.len() == pixel_points.len(),
            "3D / 2D point counts must match: {} vs {}",
            board_points.len(),
            pixel_points.len()
        );
        ensure!(
            weights.len() == board_points.len(),
            "weight count must match point count: {} vs {}",
            weights.len(),
            board_points.len()
        );
        ensure!(
            weights.iter().all(|w| *w >= 0.0),
            "weights must be non-negative"
        );
        Ok(Self {
            board_points,
            pixel_points,
            weights: Some(weights),
        })
    }

    /// Board points projected onto the target plane (drops Z).
    pub fn board_points_2d(&self) -> Vec<Pt2> {
        self.board_points
            .iter()
            .map(|p| Pt2::new(p.x, p.y))
            .collect()
    }

    /// Number of corner correspondences in this view.
    #[inline]
    pub fn len(&self) -> usize {
        self.board_points.len()
    }

    /// Returns true if this view has no correspondences.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.board_points.is_empty()
    }

    /// Weight for a specific corner index (1.0 if no weights were provided).
    #[inline]
    pub fn weight(&self, idx: usize) -> f64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(idx))
            .copied()
            .unwrap_or(1.0)
    }

    /// Iterate over (board point, pixel point) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Pt3, &Pt2)> {
        self.board_points.iter().zip(self.pixel_points.iter())
    }
}

/// Summary statistics for reprojection errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReprojectionStats {
    /// Mean reprojection error in pixels.
    pub mean: f64,
    /// Root mean square error in pixels.
    pub rms: f64,
    /// Maximum reprojection error in pixels.
    pub max: f64,
    /// Number of points evaluated.
    pub count: usize,
}

impl ReprojectionStats {
    /// Compute statistics from a collection of per-point error norms.
    pub fn from_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self {
                mean: 0.0,
                rms: 0.0,
                max: 0.0,
                count: 0,
            };
        }

        let sum: f64 = errors.iter().sum();
        let sum_sq: f64 = errors.iter().map(|e| e * e).sum();
        let max = errors.iter().cloned().fold(0.0_f64, f64::max);
        let n = errors.len() as f64;

        Self {
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
            max,
            count: errors.len(),
        }
    }
}
