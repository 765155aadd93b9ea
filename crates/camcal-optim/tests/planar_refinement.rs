//! Refinement of a synthetic planar dataset back to its ground truth.

use camcal_core::synthetic::{facing_board_poses, SyntheticDataset, VirtualCamera};
use camcal_core::{
    BrownConrady5, CameraIntrinsics, Checkerboard, PinholeCamera, RadTanCamera,
};
use camcal_optim::{
    pack_params, refine_planar_intrinsics, LmBackend, PlanarIntrinsicsProblem, RobustKernel,
    SolveOptions,
};

fn ground_truth_camera() -> RadTanCamera {
    PinholeCamera::new(
        CameraIntrinsics {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        },
        BrownConrady5 {
            k1: -0.1,
            k2: 0.01,
            p1: 0.001,
            p2: -0.001,
            k3: 0.0,
            iters: 8,
        },
    )
}

#[test]
fn refinement_recovers_ground_truth_from_perturbed_init() {
    let cam_gt = ground_truth_camera();
    let board = Checkerboard::new(9, 6, 0.03);
    let poses_gt = facing_board_poses(&board, 6, 0.12, 0.7, 0.05);

    let virtual_cam = VirtualCamera {
        camera: cam_gt,
        image_width: 1280,
        image_height: 720,
    };
    let dataset = SyntheticDataset::radtan(virtual_cam, board, poses_gt.clone(), None).unwrap();

    let problem =
        PlanarIntrinsicsProblem::new(dataset.detections().to_vec(), RobustKernel::None).unwrap();

    // Initial guess: biased intrinsics, no distortion, ground-truth poses.
    let cam_init = PinholeCamera::new(
        CameraIntrinsics {
            fx: 770.0,
            fy: 755.0,
            cx: 630.0,
            cy: 350.0,
            skew: 0.0,
        },
        BrownConrady5::default(),
    );
    let x0 = pack_params(&cam_init, &poses_gt);

    let backend = LmBackend;
    let opts = SolveOptions::default();
    let (cam_refined, poses_refined, report) =
        refine_planar_intrinsics(&backend, &problem, x0, &opts).unwrap();

    assert!(report.converged, "no convergence: {report:?}");
    assert!(
        report.final_cost < 1e-6,
        "final cost too high: {}",
        report.final_cost
    );

    assert!((cam_refined.k.fx - cam_gt.k.fx).abs() < 1.0);
    assert!((cam_refined.k.fy - cam_gt.k.fy).abs() < 1.0);
    assert!((cam_refined.k.cx - cam_gt.k.cx).abs() < 1.0);
    assert!((cam_refined.k.cy - cam_gt.k.cy).abs() < 1.0);
    assert!((cam_refined.dist.k1 - cam_gt.dist.k1).abs() < 0.01);
    assert!((cam_refined.dist.k2 - cam_gt.dist.k2).abs() < 0.02);

    assert_eq!(poses_refined.len(), poses_gt.len());
    for (est, gt) in poses_refined.iter().zip(poses_gt.iter()) {
        assert!((est.translation.vector - gt.translation.vector).norm() < 1e-3);
        assert!(est.rotation.angle_to(&gt.rotation) < 1e-3);
    }
}

#[test]
fn huber_refinement_resists_outliers() {
    let cam_gt = ground_truth_camera();
    let board = Checkerboard::new(9, 6, 0.03);
    let poses_gt = facing_board_poses(&board, 6, 0.12, 0.7, 0.05);

    let virtual_cam = VirtualCamera {
        camera: cam_gt,
        image_width: 1280,
        image_height: 720,
    };
    let dataset = SyntheticDataset::radtan(virtual_cam, board, poses_gt.clone(), None).unwrap();

    // Corrupt a handful of detections.
    let mut views = dataset.detections().to_vec();
    for view in views.iter_mut() {
        for idx in (0..view.len()).step_by(17) {
            view.pixel_points[idx].x += 25.0;
            view.pixel_points[idx].y -= 25.0;
        }
    }

    let x0 = pack_params(&cam_gt, &poses_gt);
    let backend = LmBackend;
    let opts = SolveOptions::default();

    let l2_problem =
        PlanarIntrinsicsProblem::new(views.clone(), RobustKernel::None).unwrap();
    let (cam_l2, _, _) =
        refine_planar_intrinsics(&backend, &l2_problem, x0.clone(), &opts).unwrap();

    let huber_problem =
        PlanarIntrinsicsProblem::new(views, RobustKernel::Huber { delta: 2.0 }).unwrap();
    let (cam_huber, _, _) = refine_planar_intrinsics(&backend, &huber_problem, x0, &opts).unwrap();

    let err = |cam: &RadTanCamera| -> f64 {
        (cam.k.fx - cam_gt.k.fx).abs()
            + (cam.k.fy - cam_gt.k.fy).abs()
            + (cam.k.cx - cam_gt.k.cx).abs()
            + (cam.k.cy - cam_gt.k.cy).abs()
    };

    assert!(
        err(&cam_huber) < err(&cam_l2),
        "huber error {} should beat l2 error {}",
        err(&cam_huber),
        err(&cam_l2)
    );
}
