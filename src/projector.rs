use crate::all::*;

use image::imageops::{self, FilterType};
use image::RgbaImage;

// Each pass shrinks the largest dimension to the limit. A second pass only
// absorbs rounding, so three is plenty.
const MAX_DOWNSCALE_PASSES: usize = 3;

pub struct ProjectedTrack {
  pub points: Vec<PixelXY>,
  pub bounds: RenderBounds,
}

pub fn project_track(track: &Track, transform: &CalibrationTransform) -> ProjectedTrack {
  let mut bounds = RenderBounds::from_image(transform.width, transform.height);
  let points: Vec<PixelXY> = track.points.iter()
    .map(|p| transform.to_pixel(&p.lon_lat()))
    .collect();
  for p in &points {
    if p.x.is_finite() && p.y.is_finite() {
      bounds.extend(p);
    }
  }
  ProjectedTrack { points, bounds }
}

// Everything the renderer needs, at a scale where the canvas fits the limit.
pub struct FittedMap {
  pub raster: RgbaImage,
  pub transform: CalibrationTransform,
  pub projected: ProjectedTrack,
  pub scale: f64,
}

// Solves the calibration and projects the track, downscaling the raster
// and control points while the bounds exceed `max_size`.
pub fn fit_to_canvas(
  mut raster: RgbaImage,
  mut control_points: Vec<ControlPoint>,
  track: &Track,
  max_size: u32,
) -> Result<FittedMap> {
  let mut scale = 1.;
  for pass in 0..MAX_DOWNSCALE_PASSES {
    let transform = CalibrationTransform::solve(&control_points, raster.width(), raster.height())?;
    let projected = project_track(track, &transform);
    let size = projected.bounds.max_dimension();
    if size <= max_size as i64 {
      return Ok(FittedMap { raster, transform, projected, scale });
    }

    let ratio = max_size as f64 / size as f64;
    let width = ((raster.width() as f64 * ratio).floor() as u32).max(1);
    let height = ((raster.height() as f64 * ratio).floor() as u32).max(1);
    info!(
      "Canvas of {}x{} exceeds {} pixels, downscaling by {:.4} (pass {}).",
      projected.bounds.width(), projected.bounds.height(), max_size, ratio, pass + 1,
    );
    raster = imageops::resize(&raster, width, height, FilterType::Triangle);
    for point in &mut control_points {
      point.pixel = point.pixel.scaled(ratio);
    }
    scale *= ratio;
  }
  bail!("Canvas still exceeds {} pixels after {} downscale passes.", max_size, MAX_DOWNSCALE_PASSES);
}
