#[derive(Clone, Debug)]
#[derive(clap::Parser)]
pub struct ParameterSet {
  // Rasterizer limit for either canvas dimension.
  #[clap(long, default_value = "32767")]
  pub max_canvas_size: u32,

  // Speed estimation.
  #[clap(long, default_value = "10")]
  pub speed_window: usize,

  // Direction ticks, in seconds of track time.
  #[clap(long, default_value = "10")]
  pub tick_interval: i64,
  #[clap(long, default_value = "6")]
  pub tick_emphasis_every: usize,

  // Route layers. Widths and lengths are in ground meters.
  #[clap(long, default_value = "0.45")]
  pub route_opacity: f64,
  #[clap(long, default_value = "0.7")]
  pub outline_opacity: f64,
  #[clap(long, default_value = "8")]
  pub route_width: f64,
  #[clap(long, default_value = "12")]
  pub outline_width: f64,
  #[clap(long, default_value = "20")]
  pub tick_length: f64,
  #[clap(long, default_value = "2")]
  pub tick_width: f64,
  // Lower bound for any stroke, in pixels.
  #[clap(long, default_value = "2")]
  pub min_stroke: f64,

  // Header band.
  #[clap(long, default_value = "60")]
  pub header_height: u32,

  #[clap(long, default_value = "90")]
  pub jpeg_quality: u8,
}

impl Default for ParameterSet {
  fn default() -> ParameterSet {
    use clap::Parser;
    ParameterSet::parse_from(["trackmap"])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn test_defaults() {
    let p = ParameterSet::default();
    assert_eq!(p.max_canvas_size, 32767);
    assert_eq!(p.speed_window, 10);
    assert_eq!(p.tick_interval, 10);
    assert_eq!(p.tick_emphasis_every, 6);
    assert_eq!(p.route_opacity, 0.45);
    assert_eq!(p.outline_opacity, 0.7);
    assert_eq!(p.jpeg_quality, 90);
  }

  #[test]
  fn test_override() {
    let p = ParameterSet::parse_from(["trackmap", "--header-height", "80", "--route-opacity", "0.5"]);
    assert_eq!(p.header_height, 80);
    assert_eq!(p.route_opacity, 0.5);
  }
}
