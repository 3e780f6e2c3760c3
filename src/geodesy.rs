// Spherical pseudo-Mercator (EPSG:3857) conversions and web map tile math.

use crate::all::*;

use std::f64::consts::PI;

// Equatorial radius, Earth treated as a sphere.
pub const EARTH_RADIUS: f64 = 6378137.;
pub const TILE_SIZE: f64 = 256.;
const MAX_ZOOM: i32 = 30;

pub fn to_meters(p: &LonLat) -> MetersXY {
  MetersXY {
    x: p.lon * EARTH_RADIUS * PI / 180.,
    y: ((90. + p.lat) * PI / 360.).tan().ln() * EARTH_RADIUS,
  }
}

pub fn to_lon_lat(m: &MetersXY) -> LonLat {
  LonLat {
    lat: (2. * (m.y / EARTH_RADIUS).exp().atan() - PI / 2.) * 180. / PI,
    lon: m.x / EARTH_RADIUS * 180. / PI,
  }
}

// Meters per pixel at the equator.
pub fn resolution(zoom: i32) -> f64 {
  2. * PI * EARTH_RADIUS / (TILE_SIZE * 2f64.powi(zoom))
}

// Largest zoom whose resolution is still at least `pixel_size`, the way
// gdal2tiles picks it (one level above the first finer zoom).
pub fn zoom_for_pixel_size(pixel_size: f64) -> i32 {
  for zoom in 0..MAX_ZOOM {
    if pixel_size > resolution(zoom) {
      return (zoom - 1).max(0);
    }
  }
  MAX_ZOOM - 1
}

// Haversine distance in meters.
pub fn distance(a: &LonLat, b: &LonLat) -> f64 {
  let lat_a = a.lat.to_radians();
  let lat_b = b.lat.to_radians();
  let dlat = lat_b - lat_a;
  let dlon = (b.lon - a.lon).to_radians();
  let h = (dlat / 2.).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.).sin().powi(2);
  2. * EARTH_RADIUS * h.sqrt().atan2((1. - h).sqrt())
}

pub fn to_tile(p: &LonLat, zoom: i32) -> (i64, i64) {
  let n = 2f64.powi(zoom);
  let x = (p.lon + 180.) / 360. * n;
  let y = (1. - p.lat.to_radians().tan().asinh() / PI) / 2. * n;
  (x.floor() as i64, y.floor() as i64)
}

pub fn tile_north_west(x: i64, y: i64, zoom: i32) -> LonLat {
  let n = 2f64.powi(zoom);
  let lat = (PI * (1. - 2. * y as f64 / n)).sinh().atan().to_degrees();
  LonLat::new(lat, x as f64 / n * 360. - 180.)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_meters_round_trip() {
    for (lat, lon) in [(0., 0.), (60.1, 24.9), (-33.9, 151.2), (84., -179.)] {
      let p = LonLat::new(lat, lon);
      let q = to_lon_lat(&to_meters(&p));
      assert!((p.lat - q.lat).abs() < 1e-9);
      assert!((p.lon - q.lon).abs() < 1e-9);
    }
    let m = to_meters(&LonLat::new(0., 180.));
    assert!((m.x - 20037508.342789244).abs() < 1e-6);
    assert!(to_meters(&LonLat::new(0., 0.)).y.abs() < 1e-6);
  }

  #[test]
  fn test_resolution_halves() {
    assert!((resolution(0) - 156543.03392804097).abs() < 1e-6);
    for zoom in 0..29 {
      assert!((resolution(zoom + 1) - resolution(zoom) / 2.).abs() < 1e-12);
    }
  }

  #[test]
  fn test_zoom_for_pixel_size() {
    assert_eq!(zoom_for_pixel_size(1e9), 0);
    assert_eq!(zoom_for_pixel_size(resolution(18)), 18);
    assert_eq!(zoom_for_pixel_size(resolution(18) * 1.5), 17);
    assert_eq!(zoom_for_pixel_size(1e-9), 29);
  }

  #[test]
  fn test_distance() {
    let a = LonLat::new(60., 25.);
    assert_eq!(distance(&a, &a), 0.);
    // One degree of latitude on this sphere.
    let d = distance(&a, &LonLat::new(61., 25.));
    assert!((d - EARTH_RADIUS * PI / 180.).abs() < 1e-6);
    let b = LonLat::new(60.1, 24.9);
    assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-9);
  }

  #[test]
  fn test_tiles() {
    assert_eq!(to_tile(&LonLat::new(0., 0.), 1), (1, 1));
    assert_eq!(to_tile(&LonLat::new(60.17, 24.94), 10), (582, 296));
    let nw = tile_north_west(0, 0, 0);
    assert!((nw.lon + 180.).abs() < 1e-9);
    assert!((nw.lat - 85.0511287798).abs() < 1e-6);
    let nw = tile_north_west(582, 296, 10);
    assert_eq!(to_tile(&LonLat::new(nw.lat - 1e-9, nw.lon + 1e-9), 10), (582, 296));
  }
}
