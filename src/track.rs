use crate::all::*;

#[derive(Clone, Debug, Default)]
pub struct Track {
  pub points: Vec<TrackPoint>,
}

impl Track {
  pub fn new(points: Vec<TrackPoint>) -> Track {
    Track { points }
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  // Too short for distance, speed and direction.
  pub fn is_short(&self) -> bool {
    self.points.len() < 2
  }

  // Sum of great-circle legs in meters.
  pub fn distance(&self) -> f64 {
    self.points.windows(2)
      .map(|w| geodesy::distance(&w[0].lon_lat(), &w[1].lon_lat()))
      .sum()
  }

  pub fn duration_ms(&self) -> i64 {
    match (self.points.first(), self.points.last()) {
      (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
      _ => 0,
    }
  }

  pub fn start_time(&self) -> Option<DateTime<Utc>> {
    let first = self.points.first()?;
    Utc.timestamp_millis_opt(first.timestamp_ms).single()
  }
}

// Compact elapsed time such as `1h23m45s`, `5m07s` or `42s`.
pub fn format_duration(ms: i64) -> String {
  let total = ms.max(0) / 1000;
  let hours = total / 3600;
  let minutes = total / 60 % 60;
  let seconds = total % 60;
  if hours > 0 {
    format!("{}h{:02}m{:02}s", hours, minutes, seconds)
  }
  else if minutes > 0 {
    format!("{}m{:02}s", minutes, seconds)
  }
  else {
    format!("{}s", seconds)
  }
}

pub fn format_start_time(time: &DateTime<Utc>, timezone: &Tz) -> String {
  time.with_timezone(timezone).format("%Y-%m-%d %H:%M:%S %Z").to_string()
}
