// Pixel <-> WGS84 transform derived from 3 (affine) or 4 (projective)
// control point correspondences. Solved in spherical Mercator meters.

use crate::all::*;

// Minimum `triangle_flatness` of any three control points.
const MIN_FLATNESS: f64 = 1e-9;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CalibrationError {
  #[error("Invalid calibration format: {0}")]
  InvalidFormat(String),
  #[error("Degenerate calibration: control points are collinear or the solve is singular.")]
  Degenerate,
  #[error("Calibration needs 3 or 4 control points, got {0}.")]
  PointCount(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationKind {
  Affine,
  Projective,
}

#[derive(Clone, Debug)]
pub struct CalibrationTransform {
  pub kind: CalibrationKind,
  pub width: u32,
  pub height: u32,
  pub meters_per_pixel: f64,
  // The matrices work in meters relative to `origin`, which keeps their
  // entries small enough for the adjugate to stay accurate.
  origin: Vector2d,
  pixel_to_meters: Matrix3d,
  meters_to_pixel: Matrix3d,
}

impl CalibrationTransform {
  pub fn solve(
    points: &[ControlPoint],
    width: u32,
    height: u32,
  ) -> std::result::Result<CalibrationTransform, CalibrationError> {
    let pixels: Vec<Vector2d> = points.iter().map(|p| p.pixel.vector()).collect();
    let meters: Vec<Vector2d> = points.iter()
      .map(|p| geodesy::to_meters(&p.lon_lat).vector())
      .collect();
    check_control_points(&pixels)?;
    check_control_points(&meters)?;
    let origin = meters[0];
    let meters: Vec<Vector2d> = meters.iter().map(|m| m - origin).collect();

    let (kind, pixel_to_meters) = match points.len() {
      3 => (CalibrationKind::Affine, solve_affine(&pixels, &meters)?),
      4 => {
        let from = [pixels[0], pixels[1], pixels[2], pixels[3]];
        let to = [meters[0], meters[1], meters[2], meters[3]];
        let m = general_2d_projection(&from, &to);
        (CalibrationKind::Projective, m / m.norm())
      },
      n => return Err(CalibrationError::PointCount(n)),
    };
    let meters_to_pixel = adjugate(&pixel_to_meters);
    let mut transform = CalibrationTransform {
      kind,
      width,
      height,
      meters_per_pixel: 0.,
      origin,
      pixel_to_meters,
      meters_to_pixel,
    };
    transform.meters_per_pixel = transform.compute_meters_per_pixel();
    transform.validate(points)?;
    Ok(transform)
  }

  // Four-point calibration with the corners at the image corners.
  pub fn from_corners(
    corners: &Corners,
    width: u32,
    height: u32,
  ) -> std::result::Result<CalibrationTransform, CalibrationError> {
    CalibrationTransform::solve(&corners.control_points(width, height), width, height)
  }

  pub fn to_lon_lat(&self, p: &PixelXY) -> LonLat {
    let m = project(&self.pixel_to_meters, &p.vector()) + self.origin;
    geodesy::to_lon_lat(&MetersXY::new(m[0], m[1]))
  }

  pub fn to_pixel(&self, p: &LonLat) -> PixelXY {
    project(&self.meters_to_pixel, &(geodesy::to_meters(p).vector() - self.origin)).into()
  }

  pub fn center(&self) -> LonLat {
    self.to_lon_lat(&PixelXY::new(self.width as f64 / 2., self.height as f64 / 2.))
  }

  // Deepest web map zoom level that still has coarser pixels than the raster.
  pub fn max_zoom(&self) -> i32 {
    let tile_resolution = geodesy::resolution(18) * self.center().lat.to_radians().cos();
    (tile_resolution / self.meters_per_pixel).log2().floor() as i32 + 18
  }

  // Average of the two diagonals' ground distance over pixel distance.
  fn compute_meters_per_pixel(&self) -> f64 {
    let w = self.width as f64;
    let h = self.height as f64;
    let pixel_diagonal = (w * w + h * h).sqrt();
    let tl = self.to_lon_lat(&PixelXY::new(0., 0.));
    let tr = self.to_lon_lat(&PixelXY::new(w, 0.));
    let br = self.to_lon_lat(&PixelXY::new(w, h));
    let bl = self.to_lon_lat(&PixelXY::new(0., h));
    (geodesy::distance(&tl, &br) + geodesy::distance(&tr, &bl)) / 2. / pixel_diagonal
  }

  fn validate(&self, points: &[ControlPoint]) -> std::result::Result<(), CalibrationError> {
    let finite = self.pixel_to_meters.iter().chain(self.meters_to_pixel.iter()).all(|x| x.is_finite());
    if !finite || self.pixel_to_meters.determinant() == 0. {
      return Err(CalibrationError::Degenerate);
    }
    if !self.meters_per_pixel.is_finite() || self.meters_per_pixel <= 0. {
      return Err(CalibrationError::Degenerate);
    }
    for point in points {
      let p = self.to_pixel(&point.lon_lat);
      if !p.x.is_finite() || !p.y.is_finite() {
        return Err(CalibrationError::Degenerate);
      }
    }
    Ok(())
  }
}

fn check_control_points(points: &[Vector2d]) -> std::result::Result<(), CalibrationError> {
  if points.len() != 3 && points.len() != 4 {
    return Err(CalibrationError::PointCount(points.len()));
  }
  if points.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
    return Err(CalibrationError::Degenerate);
  }
  for i in 0..points.len() {
    for j in (i + 1)..points.len() {
      for k in (j + 1)..points.len() {
        if triangle_flatness(&points[i], &points[j], &points[k]) < MIN_FLATNESS {
          return Err(CalibrationError::Degenerate);
        }
      }
    }
  }
  Ok(())
}

// Affine map as a 3x3 matrix with last row (0, 0, 1).
#[allow(non_snake_case)]
fn solve_affine(pixels: &[Vector2d], meters: &[Vector2d]) -> std::result::Result<Matrix3d, CalibrationError> {
  let P = Matrix3d::new(
    pixels[0][0], pixels[1][0], pixels[2][0],
    pixels[0][1], pixels[1][1], pixels[2][1],
    1., 1., 1.,
  );
  let Q = Matrix3d::new(
    meters[0][0], meters[1][0], meters[2][0],
    meters[0][1], meters[1][1], meters[2][1],
    1., 1., 1.,
  );
  let det = P.determinant();
  if det == 0. || !det.is_finite() {
    return Err(CalibrationError::Degenerate);
  }
  let mut M = Q * adjugate(&P) / det;
  // Exact zeros instead of rounding residue.
  M[(2, 0)] = 0.;
  M[(2, 1)] = 0.;
  M[(2, 2)] = 1.;
  Ok(M)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{Rng, SeedableRng};

  fn helsinki_corners() -> Corners {
    Corners::parse("60.10000,24.90000,60.10000,25.00000,60.00000,25.00000,60.00000,24.90000").unwrap()
  }

  #[test]
  fn test_corner_calibration() {
    let transform = CalibrationTransform::from_corners(&helsinki_corners(), 1000, 800).unwrap();
    assert_eq!(transform.kind, CalibrationKind::Projective);
    let tl = transform.to_lon_lat(&PixelXY::new(0., 0.));
    assert!((tl.lat - 60.1).abs() < 1e-4);
    assert!((tl.lon - 24.9).abs() < 1e-4);
    let br = transform.to_lon_lat(&PixelXY::new(1000., 800.));
    assert!((br.lat - 60.).abs() < 1e-4);
    assert!((br.lon - 25.).abs() < 1e-4);
    // About 5.6 km by 11.1 km on 1000 by 800 pixels.
    assert!(transform.meters_per_pixel > 5. && transform.meters_per_pixel < 15.);
  }

  #[test]
  fn test_projective_reproduces_control_points() {
    let points = vec![
      ControlPoint::new(PixelXY::new(12., 30.), LonLat::new(60.10, 24.90)),
      ControlPoint::new(PixelXY::new(980., 5.), LonLat::new(60.11, 25.01)),
      ControlPoint::new(PixelXY::new(1020., 790.), LonLat::new(60.00, 25.02)),
      ControlPoint::new(PixelXY::new(-3., 760.), LonLat::new(59.99, 24.88)),
    ];
    let transform = CalibrationTransform::solve(&points, 1000, 800).unwrap();
    for point in &points {
      let p = transform.to_pixel(&point.lon_lat);
      assert!((p.vector() - point.pixel.vector()).norm() < 1e-6);
      let q = transform.to_lon_lat(&point.pixel);
      assert!((q.lat - point.lon_lat.lat).abs() < 1e-9);
      assert!((q.lon - point.lon_lat.lon).abs() < 1e-9);
    }
  }

  #[test]
  fn test_affine_reproduces_control_points() {
    let points = vec![
      ControlPoint::new(PixelXY::new(100., 100.), LonLat::new(60.09, 24.91)),
      ControlPoint::new(PixelXY::new(900., 100.), LonLat::new(60.09, 24.99)),
      ControlPoint::new(PixelXY::new(100., 700.), LonLat::new(60.01, 24.91)),
    ];
    let transform = CalibrationTransform::solve(&points, 1000, 800).unwrap();
    assert_eq!(transform.kind, CalibrationKind::Affine);
    for point in &points {
      assert!((transform.to_pixel(&point.lon_lat).vector() - point.pixel.vector()).norm() < 1e-6);
    }
    // Shared pixel rows and columns are fine without any coordinate nudging.
    let corner = transform.to_lon_lat(&PixelXY::new(900., 700.));
    assert!((corner.lon - 24.99).abs() < 1e-6);
  }

  #[test]
  fn test_round_trip_inside_image() {
    let transform = CalibrationTransform::from_corners(&helsinki_corners(), 1000, 800).unwrap();
    let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(7);
    for _ in 0..200 {
      let p = PixelXY::new(rng.gen_range(0. ..1000.), rng.gen_range(0. ..800.));
      let q = transform.to_pixel(&transform.to_lon_lat(&p));
      assert!((p.vector() - q.vector()).norm() < 1e-6);
    }
  }

  #[test]
  fn test_collinear_points_are_degenerate() {
    let points = vec![
      ControlPoint::new(PixelXY::new(0., 0.), LonLat::new(60.0, 24.9)),
      ControlPoint::new(PixelXY::new(50., 50.), LonLat::new(60.0, 24.95)),
      ControlPoint::new(PixelXY::new(100., 100.), LonLat::new(60.0, 25.0)),
    ];
    assert_eq!(CalibrationTransform::solve(&points, 100, 100).unwrap_err(), CalibrationError::Degenerate);

    // Collinear along a parallel, which stays a straight line in Mercator.
    let mut points = points;
    points[1].pixel = PixelXY::new(80., 10.);
    assert_eq!(CalibrationTransform::solve(&points, 100, 100).unwrap_err(), CalibrationError::Degenerate);
  }

  #[test]
  fn test_point_count() {
    let p = ControlPoint::new(PixelXY::new(0., 0.), LonLat::new(60., 25.));
    assert_eq!(CalibrationTransform::solve(&[p, p], 10, 10).unwrap_err(), CalibrationError::PointCount(2));
    assert_eq!(CalibrationTransform::solve(&[p; 5], 10, 10).unwrap_err(), CalibrationError::PointCount(5));
  }

  #[test]
  fn test_max_zoom() {
    let transform = CalibrationTransform::from_corners(&helsinki_corners(), 1000, 800).unwrap();
    let zoom = transform.max_zoom();
    let tile_resolution = geodesy::resolution(zoom) * transform.center().lat.to_radians().cos();
    assert!(tile_resolution >= transform.meters_per_pixel);
    assert!(tile_resolution / 2. < transform.meters_per_pixel);
  }
}
