//! Full pipeline on synthetic datasets: detections in, refined camera out.

use camcal_core::synthetic::{facing_board_poses, PixelNoise, SyntheticDataset, VirtualCamera};
use camcal_core::{
    BrownConrady5, CameraIntrinsics, Checkerboard, DistortionParams, PinholeCamera,
};
use camcal_pipeline::{calibrate_camera, CalibrationConfig};

fn synthetic_dataset(noise: Option<PixelNoise>) -> SyntheticDataset {
    let cam_gt = PinholeCamera::new(
        CameraIntrinsics {
            fx: 400.0,
            fy: 400.0,
            cx: 320.0,
            cy: 240.0,
            skew: 0.0,
        },
        BrownConrady5 {
            k1: -0.2,
            k2: 0.05,
            p1: 0.002,
            p2: -0.001,
            k3: 0.0,
            iters: 8,
        },
    );
    let board = Checkerboard::new(9, 6, 0.025);
    let poses = facing_board_poses(&board, 7, 0.14, 0.55, 0.04);

    SyntheticDataset::radtan(
        VirtualCamera {
            camera: cam_gt,
            image_width: 640,
            image_height: 480,
        },
        board,
        poses,
        noise,
    )
    .unwrap()
}

fn unpack_distortion(params: &DistortionParams) -> BrownConrady5<f64> {
    match params {
        DistortionParams::BrownConrady5 { params } => *params,
        DistortionParams::None => panic!("expected rad-tan distortion in report"),
    }
}

#[test]
fn calibrates_noise_free_dataset_to_ground_truth() {
    let dataset = synthetic_dataset(None);
    let cam_gt = dataset.camera.camera;
    let poses_gt = dataset.board_poses_in_camera().to_vec();

    let config = CalibrationConfig::default();
    let report = calibrate_camera(dataset.detections(), &config).unwrap();

    assert!(report.converged, "solver did not converge");
    assert!(
        report.final_cost < 1e-6,
        "final cost too high: {}",
        report.final_cost
    );
    assert!(
        report.reprojection.mean < 1e-3,
        "mean reprojection error too high: {}",
        report.reprojection.mean
    );

    let k = report.camera.intrinsics;
    assert!((k.fx - cam_gt.k.fx).abs() < 0.5, "fx {}", k.fx);
    assert!((k.fy - cam_gt.k.fy).abs() < 0.5, "fy {}", k.fy);
    assert!((k.cx - cam_gt.k.cx).abs() < 0.5, "cx {}", k.cx);
    assert!((k.cy - cam_gt.k.cy).abs() < 0.5, "cy {}", k.cy);
    assert!(k.skew.abs() < 0.1, "skew {}", k.skew);

    let dist = unpack_distortion(&report.camera.distortion);
    assert!((dist.k1 - cam_gt.dist.k1).abs() < 0.01, "k1 {}", dist.k1);
    assert!((dist.k2 - cam_gt.dist.k2).abs() < 0.02, "k2 {}", dist.k2);
    assert!((dist.p1 - cam_gt.dist.p1).abs() < 0.002, "p1 {}", dist.p1);
    assert!((dist.p2 - cam_gt.dist.p2).abs() < 0.002, "p2 {}", dist.p2);

    assert_eq!(report.poses.len(), poses_gt.len());
    for (est, gt) in report.poses.iter().zip(poses_gt.iter()) {
        assert!(
            (est.translation.vector - gt.translation.vector).norm() < 1e-3,
            "pose translation off by {}",
            (est.translation.vector - gt.translation.vector).norm()
        );
        assert!(est.rotation.angle_to(&gt.rotation) < 1e-3);
    }
}

#[test]
fn calibrates_noisy_dataset_close_to_ground_truth() {
    let dataset = synthetic_dataset(Some(PixelNoise {
        seed: 42,
        amplitude_px: 0.2,
    }));
    let cam_gt = dataset.camera.camera;

    let config = CalibrationConfig::default();
    let report = calibrate_camera(dataset.detections(), &config).unwrap();

    assert!(report.converged);
    // Mean error should be on the order of the injected noise.
    assert!(
        report.reprojection.mean < 0.5,
        "mean reprojection error too high: {}",
        report.reprojection.mean
    );

    let k = report.camera.intrinsics;
    assert!((k.fx - cam_gt.k.fx).abs() < 5.0);
    assert!((k.fy - cam_gt.k.fy).abs() < 5.0);
    assert!((k.cx - cam_gt.k.cx).abs() < 5.0);
    assert!((k.cy - cam_gt.k.cy).abs() < 5.0);
}

#[test]
fn report_json_roundtrip() {
    let dataset = synthetic_dataset(None);
    let report = calibrate_camera(dataset.detections(), &CalibrationConfig::default()).unwrap();

    let json = serde_json::to_string_pretty(&report).unwrap();
    let de: camcal_pipeline::CalibrationReport = serde_json::from_str(&json).unwrap();

    assert!((de.final_cost - report.final_cost).abs() < 1e-15);
    assert_eq!(de.poses.len(), report.poses.len());
    assert!((de.camera.intrinsics.fx - report.camera.intrinsics.fx).abs() < 1e-9);
    let dist_a = unpack_distortion(&de.camera.distortion);
    let dist_b = unpack_distortion(&report.camera.distortion);
    assert!((dist_a.k1 - dist_b.k1).abs() < 1e-12);
}
