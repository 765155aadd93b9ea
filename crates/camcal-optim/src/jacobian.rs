//! Per-view Jacobian assembly using forward-mode autodiff.
//!
//! Each view's residuals depend only on the shared intrinsics block and that
//! view's pose block, so the global Jacobian is assembled from per-view
//! `2N x 16` blocks: differentiating the small local vector keeps the dual
//! numbers static-sized, and the block columns are scattered into the
//! intrinsic columns `0..10` and the view's pose columns `10 + 6i ..`.
//!
//! Robust IRLS weights are applied elsewhere and are never differentiated.

use crate::planar_intrinsics::{residuals_view_unweighted, PlanarIntrinsicsProblem};
use crate::projection::{INTRINSICS_DIM, LOCAL_DIM, POSE_DIM};
use nalgebra::{Const, DMatrix, DVector, Dyn, OMatrix, SVector};
use num_dual::{jacobian, DualSVec64};

fn local_params(x: &DVector<f64>, view_idx: usize) -> SVector<f64, LOCAL_DIM> {
    let mut local = SVector::<f64, LOCAL_DIM>::zeros();
    for i in 0..INTRINSICS_DIM {
        local[i] = x[i];
    }
    let pose_off = INTRINSICS_DIM + POSE_DIM * view_idx;
    for k in 0..POSE_DIM {
        local[INTRINSICS_DIM + k] = x[pose_off + k];
    }
    local
}

fn scatter_block(
    j_global: &mut DMatrix<f64>,
    j_view: &OMatrix<f64, Dyn, Const<LOCAL_DIM>>,
    row_offset: usize,
    view_idx: usize,
) {
    let pose_off = INTRINSICS_DIM + POSE_DIM * view_idx;
    for r in 0..j_view.nrows() {
        for c in 0..INTRINSICS_DIM {
            j_global[(row_offset + r, c)] = j_view[(r, c)];
        }
        for k in 0..POSE_DIM {
            j_global[(row_offset + r, pose_off + k)] = j_view[(r, INTRINSICS_DIM + k)];
        }
    }
}

/// Compute the global unweighted Jacobian via per-view autodiff.
pub(crate) fn jacobian_unweighted_ad(
    problem: &PlanarIntrinsicsProblem,
    x: &DVector<f64>,
) -> DMatrix<f64> {
    let m = problem.residual_dim();
    let n = problem.param_dim();
    debug_assert_eq!(x.len(), n);

    let mut j_global = DMatrix::zeros(m, n);
    let mut row_offset = 0;

    for (view_idx, view) in problem.views.iter().enumerate() {
        let p0 = local_params(x, view_idx);
        let (r_view, j_view) = jacobian(
            |p: SVector<DualSVec64<LOCAL_DIM>, LOCAL_DIM>| {
                let p_slice = p.as_slice();
                residuals_view_unweighted(
                    &p_slice[..INTRINSICS_DIM],
                    &p_slice[INTRINSICS_DIM..],
                    view,
                )
            },
            p0,
        );

        debug_assert_eq!(r_view.len(), 2 * view.len());
        scatter_block(&mut j_global, &j_view, row_offset, view_idx);
        row_offset += r_view.len();
    }

    debug_assert_eq!(row_offset, m);
    j_global
}
