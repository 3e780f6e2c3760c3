// The four geographic corners of a raster image, in pixel order top-left,
// top-right, bottom-right, bottom-left. This is the form calibrations are
// stored and exchanged in.

use crate::all::*;

const IMAGE_EXTENSIONS: [&str; 5] = ["gif", "png", "jpg", "jpeg", "webp"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
  pub top_left: LonLat,
  pub top_right: LonLat,
  pub bottom_right: LonLat,
  pub bottom_left: LonLat,
}

impl Corners {
  pub fn new(corners: [LonLat; 4]) -> Corners {
    Corners {
      top_left: corners[0],
      top_right: corners[1],
      bottom_right: corners[2],
      bottom_left: corners[3],
    }
  }

  pub fn as_array(&self) -> [LonLat; 4] {
    [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
  }

  // Parses `lat1,lon1,...,lat4,lon4`.
  pub fn parse(s: &str) -> std::result::Result<Corners, CalibrationError> {
    let values: Vec<&str> = s.split(',').collect();
    if values.len() != 8 || !values.iter().all(|v| is_decimal(v)) {
      return Err(CalibrationError::InvalidFormat(s.to_string()));
    }
    let values = values.iter()
      .map(|v| v.parse::<f64>())
      .collect::<std::result::Result<Vec<f64>, _>>()
      .map_err(|_| CalibrationError::InvalidFormat(s.to_string()))?;
    Ok(Corners::new([
      LonLat::new(values[0], values[1]),
      LonLat::new(values[2], values[3]),
      LonLat::new(values[4], values[5]),
      LonLat::new(values[6], values[7]),
    ]))
  }

  pub fn to_calibration_string(&self) -> String {
    self.as_array().iter()
      .map(|c| format!("{:.5},{:.5}", c.lat, c.lon))
      .collect::<Vec<_>>()
      .join(",")
  }

  // Image file names may carry their calibration, for example
  // `forest_60.1_24.9_60.1_25_60_25_60_24.9.jpg`.
  pub fn from_file_name(name: &str) -> Option<Corners> {
    let (stem, extension) = name.rsplit_once('.')?;
    if !IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
      return None;
    }
    let tokens: Vec<&str> = stem.split('_').collect();
    // The numbers must follow some prefix and an underscore.
    if tokens.len() < 9 { return None }
    let numbers = &tokens[tokens.len() - 8..];
    Corners::parse(&numbers.join(",")).ok()
  }

  // Corners of a KML `LatLonBox`. The rotation is counterclockwise in degrees.
  pub fn from_lat_lon_box(north: f64, east: f64, south: f64, west: f64, rotation: f64) -> Corners {
    let center_lon = (east + west) / 2.;
    let center_lat = (north + south) / 2.;
    let squish = center_lat.to_radians().cos();
    let x = squish * (east - west) / 2.;
    let y = (north - south) / 2.;
    let (sin, cos) = rotation.to_radians().sin_cos();
    let corner = |sx: f64, sy: f64| {
      let dx = sx * x * cos - sy * y * sin;
      let dy = sx * x * sin + sy * y * cos;
      LonLat::new(center_lat + dy, center_lon + dx / squish)
    };
    Corners::new([
      corner(-1., 1.),
      corner(1., 1.),
      corner(1., -1.),
      corner(-1., -1.),
    ])
  }

  // Parses `north,east,south,west,rotation`, the fields of a KML `LatLonBox`.
  pub fn parse_lat_lon_box(s: &str) -> std::result::Result<Corners, CalibrationError> {
    let values: Vec<&str> = s.split(',').collect();
    if values.len() != 5 || !values.iter().all(|v| is_decimal(v)) {
      return Err(CalibrationError::InvalidFormat(s.to_string()));
    }
    let values = values.iter()
      .map(|v| v.parse::<f64>())
      .collect::<std::result::Result<Vec<f64>, _>>()
      .map_err(|_| CalibrationError::InvalidFormat(s.to_string()))?;
    Ok(Corners::from_lat_lon_box(values[0], values[1], values[2], values[3], values[4]))
  }

  pub fn from_transform(transform: &CalibrationTransform) -> Corners {
    let w = transform.width as f64;
    let h = transform.height as f64;
    Corners::new([
      transform.to_lon_lat(&PixelXY::new(0., 0.)),
      transform.to_lon_lat(&PixelXY::new(w, 0.)),
      transform.to_lon_lat(&PixelXY::new(w, h)),
      transform.to_lon_lat(&PixelXY::new(0., h)),
    ])
  }

  pub fn control_points(&self, width: u32, height: u32) -> Vec<ControlPoint> {
    let w = width as f64;
    let h = height as f64;
    let pixels = [
      PixelXY::new(0., 0.),
      PixelXY::new(w, 0.),
      PixelXY::new(w, h),
      PixelXY::new(0., h),
    ];
    pixels.iter().zip(self.as_array())
      .map(|(pixel, lon_lat)| ControlPoint::new(*pixel, lon_lat))
      .collect()
  }

  // Clockwise angle in degrees from true north to the image's up direction,
  // averaged over the four edges.
  pub fn rotation(&self) -> f64 {
    let [tl, tr, br, bl] = self.as_array().map(|c| geodesy::to_meters(&c).vector());
    let up = |v: Vector2d| v[0].atan2(v[1]);
    let right = |v: Vector2d| (-v[1]).atan2(v[0]);
    let angles = [up(tl - bl), up(tr - br), right(tr - tl), right(br - bl)];
    let sin = angles.iter().map(|a| a.sin()).sum::<f64>();
    let cos = angles.iter().map(|a| a.cos()).sum::<f64>();
    (sin.atan2(cos).to_degrees() * 100.).round() / 100.
  }

  // Rotation folded into [-45, 45), ignoring which image edge faces north.
  pub fn north_declination(&self) -> f64 {
    (self.rotation() + 45.).rem_euclid(90.) - 45.
  }
}

// `-?\d+(\.\d+)?`
fn is_decimal(s: &str) -> bool {
  let s = s.strip_prefix('-').unwrap_or(s);
  let (integer, fraction) = match s.split_once('.') {
    Some((integer, fraction)) => (integer, Some(fraction)),
    None => (s, None),
  };
  let digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
  digits(integer) && fraction.map_or(true, digits)
}
