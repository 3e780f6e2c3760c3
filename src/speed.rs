// Smoothed per-point speeds in km/h and their mapping onto the color scale.

use crate::all::*;

// Speed assumed for the first point when its window spans no time.
const SEED_SPEED: f64 = 1.;

// One value per track point, aligned with the track.
pub fn estimate_speeds(track: &Track, window: usize) -> Vec<f64> {
  let points = &track.points;
  if track.is_short() {
    return vec![0.; points.len()];
  }
  let window = window.max(1);
  let mut speeds = Vec::with_capacity(points.len());
  let mut previous = SEED_SPEED;
  for i in 0..points.len() {
    let start = i.saturating_sub(window);
    let end = (start + window).min(points.len() - 1);
    let meters: f64 = points[start..=end].windows(2)
      .map(|w| geodesy::distance(&w[0].lon_lat(), &w[1].lon_lat()))
      .sum();
    let hours = (points[end].timestamp_ms - points[start].timestamp_ms) as f64 / 3_600_000.;
    let speed = (meters / 1000.) / hours;
    if speed.is_finite() && speed >= 0. {
      previous = speed;
    }
    else {
      debug!("No elapsed time around track point {}, reusing {:.2} km/h.", i, previous);
    }
    speeds.push(previous);
  }
  speeds
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedScale {
  pub mean: f64,
  pub stdev: f64,
  pub min: f64,
  pub max: f64,
}

impl SpeedScale {
  // One standard deviation either side of the mean.
  pub fn new(speeds: &[f64]) -> SpeedScale {
    if speeds.is_empty() {
      return SpeedScale { mean: 0., stdev: 0., min: 0., max: 0. };
    }
    let n = speeds.len() as f64;
    let mean = speeds.iter().sum::<f64>() / n;
    let stdev = (speeds.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    SpeedScale {
      mean,
      stdev,
      min: mean - stdev,
      max: mean + stdev,
    }
  }

  // Position on the palette in [0, 1). Constant speeds sit in the middle.
  pub fn normalize(&self, speed: f64) -> f64 {
    let range = self.max - self.min;
    if !(range > 0.) || !range.is_finite() {
      return 0.5;
    }
    ((speed - self.min) / range).max(0.).min(0.999)
  }

  // Legend values for the left, middle and right palette stops.
  pub fn legend(&self) -> [f64; 3] {
    [self.min.max(0.), (self.min + self.max) / 2., self.max]
  }
}
