//! Detection overlays for visual inspection.
//!
//! Renders detected corner positions as crosses on a blank image so a
//! calibration dataset can be eyeballed without a GUI.

use anyhow::{Context, Result};
use camcal_core::Pt2;
use image::{Rgb, RgbImage};
use std::path::Path;

const CROSS_LENGTH: i64 = 9;
const CROSS_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// Render detections as crosses on a black image.
pub fn detections_image(pixels: &[Pt2], width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for p in pixels {
        draw_cross(&mut img, p, CROSS_LENGTH, CROSS_COLOR);
    }
    img
}

/// Render detections and write the image to `path` (format from extension).
pub fn write_detections_image(
    path: &Path,
    pixels: &[Pt2],
    width: u32,
    height: u32,
) -> Result<()> {
    detections_image(pixels, width, height)
        .save(path)
        .with_context(|| format!("failed to write detections image to {}", path.display()))
}

fn draw_cross(img: &mut RgbImage, center: &Pt2, length: i64, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let u = center.x.round() as i64;
    let v = center.y.round() as i64;
    if u < 0 || u >= w || v < 0 || v >= h {
        return;
    }

    let half = length / 2;
    for du in -half..=half {
        let x = (u + du).clamp(0, w - 1);
        img.put_pixel(x as u32, v as u32, color);
    }
    for dv in -half..=half {
        let y = (v + dv).clamp(0, h - 1);
        img.put_pixel(u as u32, y as u32, color);
    }
}
