// Header text, drawn with imageproc from an embedded DejaVu Sans.

use crate::all::*;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub struct TextFont {
  font: Font<'static>,
}

impl TextFont {
  pub fn new() -> Result<TextFont> {
    let font = Font::try_from_bytes(FONT_DATA)
      .ok_or(anyhow!("Embedded font data is not a valid TrueType font."))?;
    Ok(TextFont { font })
  }

  // Width in pixels of `text` at a line height of `size` pixels.
  pub fn width(&self, text: &str, size: f32) -> i32 {
    if text.is_empty() { return 0 }
    text_size(Scale::uniform(size), &self.font, text).0
  }

  // `y` is the top of the line. Anything outside the canvas is clipped.
  pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Rgba<u8>) {
    draw_text_mut(canvas, color, x, y, Scale::uniform(size), &self.font, text);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_width() {
    let font = TextFont::new().unwrap();
    assert_eq!(font.width("", 18.), 0);
    let short = font.width("km", 18.);
    let long = font.width("12.3 km/h", 18.);
    assert!(short > 0 && long > short);
    assert!(font.width("12.3 km/h", 36.) > long);
    // Case is kept.
    assert_ne!(font.width("km/h", 18.), font.width("KM/H", 18.));
  }

  #[test]
  fn test_draw() {
    let white = Rgba([255, 255, 255, 255]);
    let mut canvas = RgbaImage::from_pixel(60, 30, white);
    let font = TextFont::new().unwrap();
    font.draw(&mut canvas, "km/h", 2, 2, 20., Rgba([0, 0, 0, 255]));
    let dark = canvas.pixels().filter(|p| p[0] < 128).count();
    assert!(dark > 20);
    assert!((0..30).all(|y| *canvas.get_pixel(59, y) == white));
    // Clipped text is fine.
    font.draw(&mut canvas, "trackmap", 50, 25, 30., Rgba([0, 0, 0, 255]));
    font.draw(&mut canvas, "trackmap", -100, -10, 30., Rgba([0, 0, 0, 255]));
  }
}
