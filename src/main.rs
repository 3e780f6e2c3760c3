mod all;
mod calibration;
mod corners;
mod font;
mod geodesy;
mod header;
mod input;
mod layer;
mod math;
mod output;
mod parameters;
mod projector;
mod speed;
mod track;
mod types;
mod util;
mod visualize;

use all::*;

use clap::Parser;

#[derive(Parser)]
#[clap(about = "Draws a GPS track on a calibrated map image and prints it as a JPEG data URI.")]
struct Args {
  // Raster map image.
  image: String,
  // `lat,lon` of the top-left, top-right, bottom-right and bottom-left
  // corners, `auto` to read them from the image file name, or `-` with
  // `--control-points` or `--lat-lon-box`.
  corners: String,
  // JSON array of `[epochSeconds, lat, lon]`.
  track: PathBuf,
  // IANA name, for example `Europe/Helsinki`.
  #[clap(parse(try_from_str = parse_timezone))]
  timezone: Tz,
  // `1` to draw the header band.
  header: Switch,
  // `1` to draw the route.
  route: Switch,

  // JSON array of 3 or 4 `[x, y, lat, lon]` entries.
  #[clap(long)]
  control_points: Option<PathBuf>,
  // `north,east,south,west,rotation` of a KML ground overlay.
  #[clap(long)]
  lat_lon_box: Option<String>,
  #[clap(long, default_value = "info")]
  log_level: LevelFilter,

  #[clap(flatten)]
  parameters: ParameterSet,
}

fn handle_error(err: &anyhow::Error) {
  for (i, e) in err.chain().enumerate() {
    eprintln!("  {}: {}", i + 1, e);
  }
}

fn main() {
  if let Err(err) = run() {
    handle_error(&err);
    std::process::exit(1);
  }
}

#[derive(Debug)]
enum Calibration {
  Corners(Corners),
  Points(Vec<ControlPoint>),
}

impl Calibration {
  fn from_args(args: &Args) -> Result<Calibration> {
    if args.control_points.is_some() && args.lat_lon_box.is_some() {
      bail!("Give only one of --control-points and --lat-lon-box.");
    }
    let explicit = args.control_points.is_some() || args.lat_lon_box.is_some();
    if explicit && args.corners != "-" {
      bail!("Corners must be `-` with --control-points or --lat-lon-box, got `{}`.", args.corners);
    }
    if let Some(path) = &args.control_points {
      return Ok(Calibration::Points(load_control_points(path)?));
    }
    if let Some(lat_lon_box) = &args.lat_lon_box {
      return Ok(Calibration::Corners(Corners::parse_lat_lon_box(lat_lon_box)?));
    }
    let corners = match args.corners.as_str() {
      "auto" => {
        let name = Path::new(&args.image).file_name()
          .and_then(|x| x.to_str())
          .unwrap_or(&args.image);
        Corners::from_file_name(name)
          .ok_or(anyhow!("No calibration found in image file name {}.", name))?
      },
      "-" => bail!("Corners `-` requires --control-points or --lat-lon-box."),
      s => Corners::parse(s)?,
    };
    Ok(Calibration::Corners(corners))
  }

  fn solve(&self, width: u32, height: u32) -> std::result::Result<CalibrationTransform, CalibrationError> {
    match self {
      Calibration::Corners(corners) => CalibrationTransform::from_corners(corners, width, height),
      Calibration::Points(points) => CalibrationTransform::solve(points, width, height),
    }
  }

  fn into_control_points(self, width: u32, height: u32) -> Vec<ControlPoint> {
    match self {
      Calibration::Corners(corners) => corners.control_points(width, height),
      Calibration::Points(points) => points,
    }
  }
}

fn run() -> Result<()> {
  let args = Args::parse();
  env_logger::Builder::new()
    .filter_level(args.log_level)
    .format(util::format_log)
    .target(env_logger::Target::Stderr)
    .init();

  let raster = FileImageSource.load(&args.image)?;
  let (width, height) = raster.dimensions();
  let calibration = Calibration::from_args(&args)?;
  let track = load_track(&args.track)?;

  let transform = calibration.solve(width, height).context("Calibration failed")?;
  let corners = Corners::from_transform(&transform);
  let max_zoom = transform.max_zoom();
  info!(
    "{:?} calibration, {:.2} m/px, native zoom {}, max zoom {}.",
    transform.kind, transform.meters_per_pixel,
    geodesy::zoom_for_pixel_size(transform.meters_per_pixel), max_zoom,
  );
  let center = transform.center();
  let (tile_x, tile_y) = geodesy::to_tile(&center, max_zoom);
  let north_west = geodesy::tile_north_west(tile_x, tile_y, max_zoom);
  info!(
    "Center {:.5},{:.5} in tile {}/{}/{} with north-west corner {:.5},{:.5}.",
    center.lat, center.lon, max_zoom, tile_x, tile_y, north_west.lat, north_west.lon,
  );
  info!("Calibration string: {}", corners.to_calibration_string());
  info!("Map rotation {:.2} degrees, north declination {:.2}.", corners.rotation(), corners.north_declination());
  if !track.is_short() {
    info!(
      "Track of {} points, {:.2} km in {}.",
      track.len(), track.distance() / 1000., format_duration(track.duration_ms()),
    );
  }

  let options = RenderOptions {
    header: args.header.0,
    route: args.route.0,
    timezone: args.timezone,
  };
  let control_points = calibration.into_control_points(width, height);
  let canvas = render(raster, control_points, &track, &options, &args.parameters)?;
  let uri = to_data_uri(&canvas, args.parameters.jpeg_quality)?;
  let mut stdout = std::io::stdout().lock();
  writeln!(stdout, "{}", uri).context("Failed to write to stdout")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_args() {
    let args = Args::parse_from([
      "trackmap", "map.jpg", "60.1,24.9,60.1,25.0,60.0,25.0,60.0,24.9", "track.json",
      "Europe/Helsinki", "1", "0", "--route-width", "6",
    ]);
    assert_eq!((args.header, args.route), (Switch(true), Switch(false)));
    assert_eq!(args.timezone, chrono_tz::Europe::Helsinki);
    assert_eq!(args.parameters.route_width, 6.);
    assert_eq!(args.log_level, LevelFilter::Info);
    let points = Calibration::from_args(&args).unwrap().into_control_points(100, 80);
    assert_eq!(points[2].pixel, PixelXY::new(100., 80.));

    assert!(Args::try_parse_from(["trackmap", "map.jpg", "x", "t.json", "UTC", "yes", "0"]).is_err());
    assert!(Args::try_parse_from(["trackmap", "map.jpg", "x", "t.json", "Mars/Olympus", "1", "0"]).is_err());
  }

  #[test]
  fn test_corner_sources() {
    let auto = Args::parse_from([
      "trackmap", "/tmp/forest_60.1_24.9_60.1_25.0_60.0_25.0_60.0_24.9.png", "auto",
      "track.json", "UTC", "0", "1",
    ]);
    let calibration = Calibration::from_args(&auto).unwrap();
    assert_eq!(calibration.solve(10, 10).unwrap().kind, CalibrationKind::Projective);
    assert_eq!(calibration.into_control_points(10, 10).len(), 4);

    let lat_lon_box = Args::parse_from([
      "trackmap", "map.png", "-", "track.json", "UTC", "0", "1", "--lat-lon-box", "60.1,25,60,24.9,15",
    ]);
    let transform = Calibration::from_args(&lat_lon_box).unwrap().solve(100, 80).unwrap();
    let rotation = Corners::from_transform(&transform).rotation();
    assert!((rotation + 15.).abs() < 0.5);

    let dash = Args::parse_from(["trackmap", "map.png", "-", "track.json", "UTC", "0", "1"]);
    assert!(Calibration::from_args(&dash).is_err());
    let both = Args::parse_from([
      "trackmap", "map.png", "60.1,24.9,60.1,25,60,25,60,24.9", "track.json", "UTC", "0", "1",
      "--lat-lon-box", "60.1,25,60,24.9,0",
    ]);
    assert!(Calibration::from_args(&both).is_err());
    let bad = Args::parse_from(["trackmap", "map.png", "1,2,3", "track.json", "UTC", "0", "1"]);
    let err = Calibration::from_args(&bad).unwrap_err();
    assert!(matches!(err.downcast_ref::<CalibrationError>(), Some(CalibrationError::InvalidFormat(_))));
  }
}
