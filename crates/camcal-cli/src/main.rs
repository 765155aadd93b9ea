use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use camcal_core::DetectionView;
use camcal_pipeline::{calibrate_camera, render, CalibrationConfig, CalibrationReport};
use clap::Parser;
use log::info;

/// Planar camera intrinsics calibration.
#[derive(Debug, Parser)]
#[command(author, version, about = "Planar intrinsics calibration pipeline")]
struct Args {
    /// Path to a JSON file containing a list of detection views.
    #[arg(long)]
    input: PathBuf,

    /// Optional path to a JSON calibration config. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional directory to write per-view detection images into.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Sensor size as WIDTHxHEIGHT, required with --render-dir.
    #[arg(long)]
    image_size: Option<String>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_image_size(arg: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = arg.split_once('x') else {
        bail!("image size must be WIDTHxHEIGHT, got {arg:?}");
    };
    let width = w.parse().with_context(|| format!("bad width in {arg:?}"))?;
    let height = h.parse().with_context(|| format!("bad height in {arg:?}"))?;
    Ok((width, height))
}

fn render_views(views: &[DetectionView], dir: &Path, width: u32, height: u32) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for (idx, view) in views.iter().enumerate() {
        let path = dir.join(format!("view_{idx:03}.png"));
        render::write_detections_image(&path, &view.pixel_points, width, height)?;
    }
    info!("wrote {} detection images to {}", views.len(), dir.display());
    Ok(())
}

fn run(args: &Args) -> Result<CalibrationReport> {
    let views: Vec<DetectionView> = load_json_file(&args.input)?;

    let config = match &args.config {
        Some(path) => load_json_file::<CalibrationConfig>(path)?,
        None => CalibrationConfig::default(),
    };

    if let Some(dir) = &args.render_dir {
        let Some(size) = &args.image_size else {
            bail!("--render-dir requires --image-size WIDTHxHEIGHT");
        };
        let (width, height) = parse_image_size(size)?;
        render_views(&views, dir, width, height)?;
    }

    calibrate_camera(&views, &config)
}

fn try_main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
