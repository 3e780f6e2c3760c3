use crate::all::*;

// Eigen-like aliases.
pub type Vector2d = nalgebra::Vector2::<f64>;
pub type Vector3d = nalgebra::Vector3::<f64>;
pub type Matrix3d = nalgebra::Matrix3::<f64>;

// WGS84 geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLat {
  pub lat: f64,
  pub lon: f64,
}

impl LonLat {
  pub fn new(lat: f64, lon: f64) -> LonLat {
    LonLat { lat, lon }
  }
}

// Spherical pseudo-Mercator meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetersXY {
  pub x: f64,
  pub y: f64,
}

impl MetersXY {
  pub fn new(x: f64, y: f64) -> MetersXY {
    MetersXY { x, y }
  }

  pub fn vector(&self) -> Vector2d {
    Vector2d::new(self.x, self.y)
  }
}

// Image pixel coordinates, origin top-left, y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelXY {
  pub x: f64,
  pub y: f64,
}

impl PixelXY {
  pub fn new(x: f64, y: f64) -> PixelXY {
    PixelXY { x, y }
  }

  pub fn vector(&self) -> Vector2d {
    Vector2d::new(self.x, self.y)
  }

  pub fn scaled(&self, ratio: f64) -> PixelXY {
    PixelXY::new(self.x * ratio, self.y * ratio)
  }
}

impl From<Vector2d> for PixelXY {
  fn from(v: Vector2d) -> PixelXY {
    PixelXY::new(v[0], v[1])
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
  pub pixel: PixelXY,
  pub lon_lat: LonLat,
}

impl ControlPoint {
  pub fn new(pixel: PixelXY, lon_lat: LonLat) -> ControlPoint {
    ControlPoint { pixel, lon_lat }
  }
}

// The `[x, y, lat, lon]` entries of a control point file.
impl<'de> Deserialize<'de> for ControlPoint {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let [x, y, lat, lon] = <[f64; 4]>::deserialize(deserializer)?;
    Ok(ControlPoint::new(PixelXY::new(x, y), LonLat::new(lat, lon)))
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
  pub timestamp_ms: i64,
  pub lat: f64,
  pub lon: f64,
}

impl TrackPoint {
  pub fn new(timestamp_ms: i64, lat: f64, lon: f64) -> TrackPoint {
    TrackPoint { timestamp_ms, lat, lon }
  }

  pub fn lon_lat(&self) -> LonLat {
    LonLat::new(self.lat, self.lon)
  }
}

// Track files store `[epochSeconds, lat, lon]` triples. Seconds may be fractional.
impl<'de> Deserialize<'de> for TrackPoint {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let [seconds, lat, lon] = <[f64; 3]>::deserialize(deserializer)?;
    Ok(TrackPoint::new((seconds * 1000.).round() as i64, lat, lon))
  }
}

// Integer pixel box. May extend past the raster image, including negative origins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderBounds {
  pub min_x: i64,
  pub max_x: i64,
  pub min_y: i64,
  pub max_y: i64,
}

impl RenderBounds {
  pub fn from_image(width: u32, height: u32) -> RenderBounds {
    RenderBounds {
      min_x: 0,
      max_x: width as i64,
      min_y: 0,
      max_y: height as i64,
    }
  }

  pub fn extend(&mut self, p: &PixelXY) {
    self.min_x = self.min_x.min(p.x.floor() as i64);
    self.max_x = self.max_x.max(p.x.ceil() as i64);
    self.min_y = self.min_y.min(p.y.floor() as i64);
    self.max_y = self.max_y.max(p.y.ceil() as i64);
  }

  pub fn width(&self) -> i64 {
    self.max_x - self.min_x
  }

  pub fn height(&self) -> i64 {
    self.max_y - self.min_y
  }

  pub fn max_dimension(&self) -> i64 {
    self.width().max(self.height())
  }
}
