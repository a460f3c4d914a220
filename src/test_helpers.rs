//! Shared test utilities: synthetic images and raw format maps.

use crate::format::FormatMap;
use image::{ImageEncoder, RgbImage};
use serde_json::Value;
use std::path::Path;

/// Write a `width`×`height` gradient JPEG to `path`.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Unwrap a `json!({...})` literal into a [`FormatMap`].
pub fn format_map(value: Value) -> FormatMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
