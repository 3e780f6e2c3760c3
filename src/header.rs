// Band above the map with the speed legend and track summary.

use crate::all::*;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub const WATERMARK: &str = "trackmap";
const PLACEHOLDER: &str = "-";

const BACKGROUND: Rgba<u8> = Rgba([250, 250, 250, 255]);
const BORDER: Rgba<u8> = Rgba([160, 160, 160, 255]);
const TEXT: Rgba<u8> = Rgba([20, 20, 20, 255]);
const FAINT_TEXT: Rgba<u8> = Rgba([120, 120, 120, 255]);

// Missing values are shown as placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderInfo {
  pub legend: Option<[f64; 3]>,
  pub distance_km: Option<f64>,
  pub duration: Option<String>,
  pub start_time: Option<String>,
}

impl HeaderInfo {
  pub fn new(track: &Track, scale: Option<&SpeedScale>, timezone: &Tz) -> HeaderInfo {
    if track.is_short() {
      return HeaderInfo {
        start_time: track.start_time().map(|t| format_start_time(&t, timezone)),
        ..HeaderInfo::default()
      };
    }
    HeaderInfo {
      legend: scale.map(|s| s.legend()),
      distance_km: Some(track.distance() / 1000.),
      duration: Some(format_duration(track.duration_ms())),
      start_time: track.start_time().map(|t| format_start_time(&t, timezone)),
    }
  }

  pub fn legend_labels(&self) -> [String; 3] {
    match self.legend {
      Some([min, mid, max]) => [
        format!("{:.1}", min),
        format!("{:.1}", mid),
        format!("{:.1} km/h", max),
      ],
      None => [PLACEHOLDER.to_string(), String::new(), String::new()],
    }
  }

  pub fn distance_text(&self) -> String {
    match self.distance_km {
      Some(km) => format!("{:.1} km", km),
      None => format!("{} km", PLACEHOLDER),
    }
  }
}

// Draws into rows `0..height` of `canvas`.
pub fn draw_header(canvas: &mut RgbaImage, height: u32, info: &HeaderInfo, font: &TextFont) {
  let width = canvas.width();
  if width == 0 || height == 0 { return }
  draw_filled_rect_mut(canvas, Rect::at(0, 0).of_size(width, height), BACKGROUND);
  draw_filled_rect_mut(canvas, Rect::at(0, height as i32 - 1).of_size(width, 1), BORDER);

  let pad = (height / 10).max(1) as i32;
  let size = height as f32 * 0.3;
  let line = (size as u32).max(1);
  let second_row = pad + line as i32 + pad / 2;

  // Legend bar with labels under its stops.
  let legend_w = (width / 3).min(5 * height).max(1);
  for x in 0..legend_w {
    let t = x as f64 / legend_w as f64 * 0.999;
    let [r, g, b] = speed_color(t);
    let rect = Rect::at(pad + x as i32, pad).of_size(1, line);
    draw_filled_rect_mut(canvas, rect, Rgba([r, g, b, 255]));
  }
  let [left, middle, right] = info.legend_labels();
  font.draw(canvas, &left, pad, second_row, size, TEXT);
  let middle_w = font.width(&middle, size);
  let middle_x = pad + legend_w as i32 / 2 - middle_w / 2;
  font.draw(canvas, &middle, middle_x, second_row, size, TEXT);
  let right_x = pad + legend_w as i32 - font.width(&right, size);
  font.draw(canvas, &right, right_x.max(middle_x + middle_w + pad), second_row, size, TEXT);

  // Distance and elapsed time.
  let stats_x = 3 * pad + legend_w as i32;
  font.draw(canvas, &info.distance_text(), stats_x, pad, size, TEXT);
  let duration = info.duration.as_deref().unwrap_or(PLACEHOLDER);
  font.draw(canvas, duration, stats_x, second_row, size, TEXT);

  // Start time and attribution, right aligned.
  let start_time = info.start_time.as_deref().unwrap_or(PLACEHOLDER);
  font.draw(canvas, start_time, width as i32 - pad - font.width(start_time, size), pad, size, TEXT);
  let watermark_x = width as i32 - pad - font.width(WATERMARK, size);
  font.draw(canvas, WATERMARK, watermark_x, second_row, size, FAINT_TEXT);
}
