//! Planar chessboard calibration target.

use crate::math::{Pt2, Pt3, Real};

/// Inner-corner grid of a chessboard lying on the plane `Z = 0`.
///
/// Corners are ordered deterministically in row-major order (Y major):
/// `(x = 0..cols-1, y = 0..rows-1)`, scaled by `spacing`.
#[derive(Clone, Copy, Debug)]
pub struct Checkerboard {
    /// Number of inner corners along X.
    pub cols: usize,
    /// Number of inner corners along Y.
    pub rows: usize,
    /// Corner-to-corner spacing in board units (typically meters).
    pub spacing: Real,
}

impl Checkerboard {
    pub fn new(cols: usize, rows: usize, spacing: Real) -> Self {
        Self {
            cols,
            rows,
            spacing,
        }
    }

    /// Total number of inner corners.
    pub fn num_corners(&self) -> usize {
        self.cols * self.rows
    }

    /// Corner positions in board coordinates (Z = 0).
    pub fn corner_positions(&self) -> Vec<Pt3> {
        let mut corners = Vec::with_capacity(self.num_corners());
        for j in 0..self.rows {
            for i in 0..self.cols {
                corners.push(Pt3::new(
                    i as Real * self.spacing,
                    j as Real * self.spacing,
                    0.0,
                ));
            }
        }
        corners
    }

    /// Corner positions as 2D board-plane points.
    pub fn corner_positions_2d(&self) -> Vec<Pt2> {
        self.corner_positions()
            .into_iter()
            .map(|p| Pt2::new(p.x, p.y))
            .collect()
    }
}
