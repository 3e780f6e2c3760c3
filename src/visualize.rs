use crate::all::*;

use image::imageops;
use image::{Rgba, RgbaImage};

const RED: Rgb = [255, 0, 0];
const YELLOW: Rgb = [255, 255, 0];
const GREEN: Rgb = [0, 255, 0];
const OUTLINE: Rgb = [0, 0, 0];
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

// Segments shorter than this (in pixels) get no color stroke.
const MIN_SEGMENT_LENGTH: f64 = 1.;

pub struct RenderOptions {
  pub header: bool,
  pub route: bool,
  pub timezone: Tz,
}

// Slow is red, average yellow and fast green. `t` is in [0, 1].
pub fn speed_color(t: f64) -> Rgb {
  if t < 0.5 {
    lerp_color(RED, YELLOW, t * 2.)
  }
  else {
    lerp_color(YELLOW, GREEN, (t - 0.5) * 2.)
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
  pub position: Vector2d,
  // Unit vector perpendicular to the direction of travel.
  pub normal: Vector2d,
  pub emphasized: bool,
}

// A tick every `interval_ms` of track time, interpolated along the segment
// where that time falls. Within a segment, ticks closer than `min_spacing`
// pixels to the previous one are dropped, so the work is bounded by the
// segment's length rather than by its duration.
pub fn compute_ticks(
  track: &Track,
  points: &[Vector2d],
  interval_ms: i64,
  emphasis_every: usize,
  min_spacing: f64,
) -> Vec<Tick> {
  let mut ticks = vec![];
  if track.is_short() || interval_ms <= 0 { return ticks }
  let times: Vec<i64> = track.points.iter().map(|p| p.timestamp_ms).collect();
  let mut count: i64 = 1;
  let mut next = times[0] + interval_ms;
  for i in 1..points.len() {
    if next > times[i] { continue }
    // Since `next > times[i - 1]`, any tick here means `dt > 0`.
    let dt = times[i] - times[i - 1];
    let in_segment = (times[i] - next) / interval_ms + 1;
    let direction = points[i] - points[i - 1];
    let length = direction.norm();
    if length > 1e-9 && length.is_finite() {
      let spacing = length * interval_ms as f64 / dt as f64;
      let stride = if spacing >= min_spacing { 1 } else { (min_spacing / spacing).ceil() as i64 };
      let mut j = 0;
      while j < in_segment {
        let index = count + j;
        let fraction = (next + j * interval_ms - times[i - 1]) as f64 / dt as f64;
        ticks.push(Tick {
          position: points[i - 1] + fraction * direction,
          normal: Vector2d::new(-direction[1], direction[0]) / length,
          emphasized: emphasis_every > 0 && index % emphasis_every as i64 == 0,
        });
        j = j.saturating_add(stride.max(1));
      }
    }
    count += in_segment;
    next += in_segment * interval_ms;
  }
  ticks
}

// Stroke sizes in pixels for the map's resolution.
struct Strokes {
  route: f64,
  outline: f64,
  tick_length: f64,
  tick_width: f64,
}

impl Strokes {
  fn new(p: &ParameterSet, meters_per_pixel: f64) -> Strokes {
    let px = |meters: f64| (meters / meters_per_pixel).max(p.min_stroke);
    let route = px(p.route_width);
    Strokes {
      route,
      outline: px(p.outline_width).max(route + 2.),
      tick_length: px(p.tick_length),
      tick_width: px(p.tick_width),
    }
  }
}

// Full pipeline from a raster image, its control points and a track to the
// composited picture.
pub fn render(
  raster: RgbaImage,
  control_points: Vec<ControlPoint>,
  track: &Track,
  options: &RenderOptions,
  p: &ParameterSet,
) -> Result<RgbaImage> {
  let header_height = if options.header { p.header_height } else { 0 };
  let max_size = p.max_canvas_size.checked_sub(header_height)
    .filter(|x| *x > 0)
    .ok_or(anyhow!("Header height {} leaves no room for the map.", header_height))?;
  let fitted = fit_to_canvas(raster, control_points, track, max_size)?;
  let bounds = fitted.projected.bounds;
  let width = bounds.width() as u32;
  let height = bounds.height() as u32;
  info!(
    "Rendering {}x{} canvas at scale {:.4}, {:.2} m/px.",
    width, height + header_height, fitted.scale, fitted.transform.meters_per_pixel,
  );

  let mut canvas = RgbaImage::from_pixel(width, height + header_height, WHITE);
  imageops::overlay(&mut canvas, &fitted.raster, -bounds.min_x, header_height as i64 - bounds.min_y);

  let speeds = estimate_speeds(track, p.speed_window);
  let scale = SpeedScale::new(&speeds);
  debug!("Speed {:.2} ± {:.2} km/h.", scale.mean, scale.stdev);
  if options.route {
    if track.is_short() {
      warn!("Track has {} points, nothing to draw.", track.len());
    }
    else {
      let offset = Vector2d::new(bounds.min_x as f64, bounds.min_y as f64);
      let points: Vec<Vector2d> = fitted.projected.points.iter().map(|x| x.vector() - offset).collect();
      let strokes = Strokes::new(p, fitted.transform.meters_per_pixel);
      let outline = draw_outline(track, &points, &strokes, width, height, p);
      outline.composite_onto(&mut canvas, 0, header_height as i64, p.outline_opacity);
      let route = draw_route(&points, &speeds, &scale, &strokes, width, height);
      route.composite_onto(&mut canvas, 0, header_height as i64, p.route_opacity);
    }
  }

  if options.header {
    let info = HeaderInfo::new(track, Some(&scale), &options.timezone);
    draw_header(&mut canvas, header_height, &info, &TextFont::new()?);
  }
  Ok(canvas)
}

// Black band along the whole path with its center cut out, plus ticks.
fn draw_outline(
  track: &Track,
  points: &[Vector2d],
  strokes: &Strokes,
  width: u32,
  height: u32,
  p: &ParameterSet,
) -> Layer {
  let mut layer = Layer::new(width, height);
  let segments = || points.windows(2).filter(|w| is_finite(&w[0]) && is_finite(&w[1]));
  for w in segments() {
    layer.draw_segment(w[0], w[1], strokes.outline, |_| OUTLINE);
  }
  for w in segments() {
    layer.erase_segment(w[0], w[1], strokes.route);
  }
  let ticks = compute_ticks(track, points, p.tick_interval * 1000, p.tick_emphasis_every, strokes.tick_width);
  debug!("Drawing {} direction ticks.", ticks.len());
  for tick in ticks {
    let (length, tick_width) = if tick.emphasized {
      (strokes.tick_length * 1.5, strokes.tick_width * 2.)
    }
    else {
      (strokes.tick_length, strokes.tick_width)
    };
    let half = tick.normal * length / 2.;
    layer.draw_segment(tick.position - half, tick.position + half, tick_width, |_| OUTLINE);
  }
  layer
}

// Speed colored segments, each a gradient between its endpoint colors.
fn draw_route(
  points: &[Vector2d],
  speeds: &[f64],
  scale: &SpeedScale,
  strokes: &Strokes,
  width: u32,
  height: u32,
) -> Layer {
  let mut layer = Layer::new(width, height);
  let mut skipped = 0;
  for i in 1..points.len() {
    let (a, b) = (points[i - 1], points[i]);
    if !is_finite(&a) || !is_finite(&b) { continue }
    if (b - a).norm() < MIN_SEGMENT_LENGTH {
      skipped += 1;
      continue;
    }
    let c0 = speed_color(scale.normalize(speeds[i - 1]));
    let c1 = speed_color(scale.normalize(speeds[i]));
    layer.draw_segment(a, b, strokes.route, |t| lerp_color(c0, c1, t));
  }
  if skipped > 0 {
    debug!("Skipped {} sub-pixel route segments.", skipped);
  }
  layer
}

fn is_finite(p: &Vector2d) -> bool {
  p[0].is_finite() && p[1].is_finite()
}
