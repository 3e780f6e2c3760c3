use crate::all::*;

use image::{Rgba, RgbaImage};

pub type Rgb = [u8; 3];

// Transparent RGBA drawing surface with straight (non-premultiplied) alpha.
// Layers are drawn at full strength and composited with an opacity, so
// overlapping strokes within one layer do not darken each other.
pub struct Layer {
  pub image: RgbaImage,
}

impl Layer {
  pub fn new(width: u32, height: u32) -> Layer {
    Layer {
      image: RgbaImage::new(width, height),
    }
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  #[inline(always)]
  fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut Rgba<u8>> {
    if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 { return None }
    Some(self.image.get_pixel_mut(x as u32, y as u32))
  }

  // Source-over with `coverage` in [0, 1].
  #[inline(always)]
  pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, coverage: f64) {
    let Some(pixel) = self.pixel_mut(x, y) else { return };
    let sa = coverage.clamp(0., 1.);
    let da = pixel[3] as f64 / 255.;
    let a = sa + da * (1. - sa);
    if a <= 0. { return }
    for i in 0..3 {
      let c = (color[i] as f64 * sa + pixel[i] as f64 * da * (1. - sa)) / a;
      pixel[i] = c.round() as u8;
    }
    pixel[3] = (a * 255.).round() as u8;
  }

  // Destination-out: removes `coverage` of whatever is already drawn.
  #[inline(always)]
  pub fn erase_pixel(&mut self, x: i64, y: i64, coverage: f64) {
    let Some(pixel) = self.pixel_mut(x, y) else { return };
    let keep = 1. - coverage.clamp(0., 1.);
    pixel[3] = (pixel[3] as f64 * keep).round() as u8;
  }

  // Round-capped thick segment. `paint` receives the position along the
  // segment in [0, 1] to allow gradients.
  pub fn draw_segment<F: Fn(f64) -> Rgb>(&mut self, a: Vector2d, b: Vector2d, width: f64, paint: F) {
    for_segment_pixels(a, b, width, self.width(), self.height(), |x, y, t, coverage| {
      self.blend_pixel(x, y, paint(t), coverage);
    });
  }

  pub fn erase_segment(&mut self, a: Vector2d, b: Vector2d, width: f64) {
    for_segment_pixels(a, b, width, self.width(), self.height(), |x, y, _, coverage| {
      self.erase_pixel(x, y, coverage);
    });
  }

  // Composites onto an opaque canvas at offset (`ax`, `ay`).
  pub fn composite_onto(&self, canvas: &mut RgbaImage, ax: i64, ay: i64, opacity: f64) {
    for (x, y, pixel) in self.image.enumerate_pixels() {
      if pixel[3] == 0 { continue }
      let cx = x as i64 + ax;
      let cy = y as i64 + ay;
      if cx < 0 || cy < 0 || cx >= canvas.width() as i64 || cy >= canvas.height() as i64 { continue }
      let sa = pixel[3] as f64 / 255. * opacity;
      let target = canvas.get_pixel_mut(cx as u32, cy as u32);
      for i in 0..3 {
        target[i] = (pixel[i] as f64 * sa + target[i] as f64 * (1. - sa)).round() as u8;
      }
      target[3] = 255;
    }
  }
}

// Visits pixels within `width / 2` of segment `ab` with an anti-aliased
// coverage estimate and the projection parameter along the segment.
fn for_segment_pixels<F: FnMut(i64, i64, f64, f64)>(
  a: Vector2d,
  b: Vector2d,
  width: f64,
  image_w: u32,
  image_h: u32,
  mut f: F,
) {
  let r = width / 2.;
  let reach = r + 1.;
  let min_x = ((a[0].min(b[0]) - reach).floor() as i64).max(0);
  let max_x = ((a[0].max(b[0]) + reach).ceil() as i64).min(image_w as i64 - 1);
  let min_y = ((a[1].min(b[1]) - reach).floor() as i64).max(0);
  let max_y = ((a[1].max(b[1]) + reach).ceil() as i64).min(image_h as i64 - 1);
  for y in min_y..=max_y {
    let (x0, x1) = row_span(a, b, reach, y as f64 + 0.5);
    let x0 = (x0.floor() as i64).max(min_x);
    let x1 = (x1.ceil() as i64).min(max_x);
    for x in x0..=x1 {
      let (t, coverage) = pixel_coverage(a, b, r, x, y);
      if coverage <= 0. { continue }
      f(x, y, t, coverage);
    }
  }
}

// Range of x on the horizontal line `py` that can lie within `reach` of
// segment `ab`. Conservative: the part of the segment within `reach`
// vertically, widened by `reach`.
fn row_span(a: Vector2d, b: Vector2d, reach: f64, py: f64) -> (f64, f64) {
  let dy = b[1] - a[1];
  let (xa, xb) = if dy.abs() > 1e-12 {
    let s0 = ((py - reach - a[1]) / dy).clamp(0., 1.);
    let s1 = ((py + reach - a[1]) / dy).clamp(0., 1.);
    (a[0] + s0 * (b[0] - a[0]), a[0] + s1 * (b[0] - a[0]))
  }
  else {
    (a[0], b[0])
  };
  (xa.min(xb) - reach, xa.max(xb) + reach)
}

// Projection parameter and coverage of the pixel centered at (x + 0.5, y + 0.5).
fn pixel_coverage(a: Vector2d, b: Vector2d, r: f64, x: i64, y: i64) -> (f64, f64) {
  let ab = b - a;
  let length2 = ab.norm_squared();
  let p = Vector2d::new(x as f64 + 0.5, y as f64 + 0.5);
  let t = if length2 > 0. { ((p - a).dot(&ab) / length2).clamp(0., 1.) } else { 0. };
  let distance = (p - (a + t * ab)).norm();
  (t, (r + 0.5 - distance).min(1.))
}

pub fn lerp_color(c0: Rgb, c1: Rgb, t: f64) -> Rgb {
  let mut c = [0; 3];
  for i in 0..3 {
    c[i] = (c0[i] as f64 + (c1[i] as f64 - c0[i] as f64) * t).round() as u8;
  }
  c
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{Rng, SeedableRng};

  #[test]
  fn test_draw_and_erase_segment() {
    let mut layer = Layer::new(40, 20);
    let black = |_: f64| [0u8, 0, 0];
    layer.draw_segment(Vector2d::new(5., 10.), Vector2d::new(35., 10.), 8., black);
    assert_eq!(layer.image.get_pixel(20, 10)[3], 255);
    assert_eq!(layer.image.get_pixel(20, 13)[3], 255);
    assert_eq!(layer.image.get_pixel(20, 1)[3], 0);
    // Round caps reach past the endpoints.
    assert_eq!(layer.image.get_pixel(2, 10)[3], 255);

    layer.erase_segment(Vector2d::new(5., 10.), Vector2d::new(35., 10.), 4.);
    assert_eq!(layer.image.get_pixel(20, 10)[3], 0);
    assert_eq!(layer.image.get_pixel(20, 13)[3], 255);
    assert_eq!(layer.image.get_pixel(20, 6)[3], 255);
  }

  #[test]
  fn test_gradient_segment() {
    let mut layer = Layer::new(100, 10);
    layer.draw_segment(Vector2d::new(0., 5.), Vector2d::new(100., 5.), 4., |t| lerp_color([255, 0, 0], [0, 0, 255], t));
    let left = layer.image.get_pixel(2, 5);
    let right = layer.image.get_pixel(97, 5);
    assert!(left[0] > 240 && left[2] < 15);
    assert!(right[2] > 240 && right[0] < 15);
  }

  #[test]
  fn test_clipped_drawing() {
    let mut layer = Layer::new(10, 10);
    layer.draw_segment(Vector2d::new(-50., -50.), Vector2d::new(50., 50.), 3., |_| [1, 2, 3]);
    assert_eq!(layer.image.get_pixel(5, 5)[3], 255);
    layer.blend_pixel(-1, 3, [0, 0, 0], 1.);
    layer.erase_pixel(10, 3, 1.);
  }

  #[test]
  fn test_row_span_matches_full_scan() {
    let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(11);
    for _ in 0..20 {
      let a = Vector2d::new(rng.gen_range(-10. ..70.), rng.gen_range(-10. ..70.));
      let b = Vector2d::new(rng.gen_range(-10. ..70.), rng.gen_range(-10. ..70.));
      let width = rng.gen_range(1. ..9.);
      let mut visited = vec![];
      for_segment_pixels(a, b, width, 60, 60, |x, y, _, _| visited.push((x, y)));
      let mut expected = vec![];
      for y in 0..60 {
        for x in 0..60 {
          if pixel_coverage(a, b, width / 2., x, y).1 > 0. {
            expected.push((x, y));
          }
        }
      }
      assert_eq!(visited, expected);
    }
  }

  #[test]
  fn test_long_diagonal_scans_a_band() {
    let (a, b) = (Vector2d::new(0., 0.), Vector2d::new(10000., 10000.));
    let (x0, x1) = row_span(a, b, 3., 5000.5);
    assert!(x0 > 4990. && x1 < 5010.);
    let mut visited = 0;
    let mut layer = Layer::new(2000, 2000);
    for_segment_pixels(a, b, 4., 2000, 2000, |_, _, _, _| visited += 1);
    assert!(visited < 2000 * 10);
    layer.draw_segment(a, b, 4., |_| [0, 0, 0]);
    assert_eq!(layer.image.get_pixel(1000, 1000)[3], 255);
    assert_eq!(layer.image.get_pixel(1000, 1010)[3], 0);
  }

  #[test]
  fn test_composite_opacity() {
    let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let mut layer = Layer::new(2, 2);
    layer.blend_pixel(0, 0, [0, 0, 0], 1.);
    layer.composite_onto(&mut canvas, 1, 1, 0.5);
    assert_eq!(*canvas.get_pixel(1, 1), Rgba([128, 128, 128, 255]));
    assert_eq!(*canvas.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
    assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
  }

  #[test]
  fn test_lerp_color() {
    assert_eq!(lerp_color([255, 0, 0], [255, 255, 0], 0.5), [255, 128, 0]);
    assert_eq!(lerp_color([0, 0, 0], [10, 20, 30], 1.), [10, 20, 30]);
  }
}
