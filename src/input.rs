use crate::all::*;

use image::RgbaImage;

// Where raster maps come from. The CLI reads local files; other sources
// (say, an HTTP fetcher) only need to produce decoded pixels.
pub trait ImageSource {
  fn load(&self, locator: &str) -> Result<RgbaImage>;
}

pub struct FileImageSource;

impl ImageSource for FileImageSource {
  fn load(&self, locator: &str) -> Result<RgbaImage> {
    let image = image::open(locator)
      .context(format!("Failed to decode image {}", locator))?;
    let image = image.to_rgba8();
    info!("Loaded {}x{} image from {}.", image.width(), image.height(), locator);
    Ok(image)
  }
}

// Array of `[epochSeconds, lat, lon]`.
pub fn load_track(path: &Path) -> Result<Track> {
  let file = File::open(path).context(format!("Failed to open track file {}", path.display()))?;
  let points: Vec<TrackPoint> = serde_json::from_reader(BufReader::new(file))
    .context(format!("Track JSON deserialization failed for {}", path.display()))?;
  let track = Track::new(points);
  if track.is_short() {
    warn!("Track {} has only {} points.", path.display(), track.len());
  }
  Ok(track)
}

// Array of `[x, y, lat, lon]`, 3 or 4 entries.
pub fn load_control_points(path: &Path) -> Result<Vec<ControlPoint>> {
  let file = File::open(path).context(format!("Failed to open control point file {}", path.display()))?;
  let points: Vec<ControlPoint> = serde_json::from_reader(BufReader::new(file))
    .context(format!("Control point JSON deserialization failed for {}", path.display()))?;
  if points.len() != 3 && points.len() != 4 {
    return Err(CalibrationError::PointCount(points.len()).into());
  }
  Ok(points)
}
