//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate decoders, format sniffed from content |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop to fit | `DynamicImage::resize_to_fill` with `Lanczos3` filter |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG / TIFF | `PngEncoder` / `TiffEncoder` (lossless, quality ignored) |
//! | Encode → WebP | `WebPEncoder::new_lossless` (quality ignored) |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |
//!
//! Sources are sniffed from their leading bytes rather than trusted by
//! extension, so uploads stored under opaque names still decode.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CropParams, Quality, ResizeParams};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

/// Output encodings this backend can write, by file extension.
const OUTPUT_FORMATS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp", "avif"];

/// Returns the output extensions this backend can encode.
pub fn supported_output_formats() -> &'static [&'static str] {
    OUTPUT_FORMATS
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputCodec {
    Jpeg,
    Png,
    Tiff,
    WebP,
    Avif,
}

impl OutputCodec {
    fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" => Ok(OutputCodec::Jpeg),
            "png" => Ok(OutputCodec::Png),
            "tif" | "tiff" => Ok(OutputCodec::Tiff),
            "webp" => Ok(OutputCodec::WebP),
            "avif" => Ok(OutputCodec::Avif),
            _ => Err(BackendError::UnsupportedFormat(ext)),
        }
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn encode_error(path: &Path, reason: impl ToString) -> BackendError {
    BackendError::Encode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(path, e))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Encode and save a DynamicImage, choosing the codec from the extension.
///
/// The image is encoded in memory and written only once encoding succeeded,
/// so neither an unsupported extension nor an encoder failure leaves a file
/// behind.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let codec = OutputCodec::from_path(path)?;
    let mut buffer = Cursor::new(Vec::new());

    let result = match codec {
        // JPEG has no alpha channel
        OutputCodec::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(
            JpegEncoder::new_with_quality(&mut buffer, quality.encoder_value()),
        ),
        OutputCodec::Png => img.write_with_encoder(PngEncoder::new(&mut buffer)),
        OutputCodec::Tiff => img.write_with_encoder(TiffEncoder::new(&mut buffer)),
        // The WebP encoder only takes 8-bit RGB(A)
        OutputCodec::WebP => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut buffer)),
        OutputCodec::Avif => img.write_with_encoder(AvifEncoder::new_with_speed_quality(
            &mut buffer,
            6,
            quality.encoder_value(),
        )),
    };
    result.map_err(|e| encode_error(path, e))?;

    fs::write(path, buffer.into_inner()).map_err(|e| encode_error(path, e))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, params.quality)
    }

    fn crop_to_fit(&self, params: &CropParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        // Fill-resize then center-crop to exact dimensions
        let filled = img.resize_to_fill(params.width, params.height, FilterType::Lanczos3);
        save_image(&filled, &params.output, params.quality)
    }
}
