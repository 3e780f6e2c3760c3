use crate::all::*;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, RgbaImage};

pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
  // JPEG has no alpha. The canvas is opaque anyway.
  let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
  let mut bytes = vec![];
  JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
    .context("JPEG encoding failed")?;
  Ok(bytes)
}

pub fn to_data_uri(canvas: &RgbaImage, quality: u8) -> Result<String> {
  let bytes = encode_jpeg(canvas, quality)?;
  debug!("Encoded {} JPEG bytes.", bytes.len());
  Ok(format!("{}{}", DATA_URI_PREFIX, base64::engine::general_purpose::STANDARD.encode(bytes)))
}
