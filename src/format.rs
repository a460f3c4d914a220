//! Format definitions: named descriptions of one output rendition.
//!
//! An [`ImageFormat`] says *what* a rendition looks like (box size, resize mode,
//! encoding, quality). It is validated once, on construction, and never mutated
//! afterwards, so every `ImageFormat` that exists is internally consistent.
//!
//! ## Resize modes
//!
//! | Mode | Dimensions | Result |
//! |---|---|---|
//! | `stretch` | width **and** height | forced to the exact box, aspect ratio ignored |
//! | `proportional` | width **or** height | missing side follows the source aspect ratio |
//! | `crop` | width **and** height | scaled to cover the box, overflow cropped |
//!
//! ## Raw maps
//!
//! Formats usually arrive from configuration as plain key/value maps. A
//! [`FormatMap`] must carry all six keys (`name`, `width`, `height`,
//! `resizeMode`, `outputFormat`, `quality`); a `null` value means "unset" for
//! dimensions and "use the default" for everything else.
//!
//! ```
//! use image_resizer::format::{ImageFormat, ResizeMode};
//!
//! let mode = Some(ResizeMode::Proportional);
//! let big = ImageFormat::new("big", Some(800), None, mode, None, None).unwrap();
//! assert_eq!(big.target_dimensions((1600, 1200)), (800, 600));
//! assert_eq!(big.output_format(), "jpg");
//! assert_eq!(big.quality(), 100);
//! ```

use crate::imaging::Quality;
use crate::imaging::calculations::proportional_dimension;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Encoding used when a definition does not name one.
pub const DEFAULT_OUTPUT_FORMAT: &str = "jpg";

/// Keys every [`FormatMap`] must contain.
pub const REQUIRED_KEYS: [&str; 6] = [
    "name",
    "width",
    "height",
    "resizeMode",
    "outputFormat",
    "quality",
];

/// A raw format definition, as produced by configuration or JSON input.
pub type FormatMap = serde_json::Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid format spec: {0}")]
    InvalidFormatSpec(String),
    #[error("Missing field \"{0}\" in format definition")]
    MissingField(String),
}

fn invalid(message: impl Into<String>) -> FormatError {
    FormatError::InvalidFormatSpec(message.into())
}

/// Geometric strategy used to fit a source image into a format's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    #[default]
    Stretch,
    Proportional,
    Crop,
}

impl ResizeMode {
    pub const ALL: [ResizeMode; 3] = [
        ResizeMode::Stretch,
        ResizeMode::Proportional,
        ResizeMode::Crop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeMode::Stretch => "stretch",
            ResizeMode::Proportional => "proportional",
            ResizeMode::Crop => "crop",
        }
    }

    /// Compute the output box for a source of `source` (width, height).
    ///
    /// Proportional mode derives the unset side from the source aspect ratio,
    /// so the same format yields different boxes for different sources. The
    /// other modes use the configured box as-is.
    pub fn target_box(
        self,
        width: Option<u32>,
        height: Option<u32>,
        source: (u32, u32),
    ) -> (u32, u32) {
        let (src_w, src_h) = source;
        match self {
            ResizeMode::Proportional => match (width, height) {
                (Some(w), None) => (w, proportional_dimension(w, src_h, src_w)),
                (None, Some(h)) => (proportional_dimension(h, src_w, src_h), h),
                (Some(w), Some(h)) => (w, h),
                (None, None) => source,
            },
            ResizeMode::Stretch | ResizeMode::Crop => {
                (width.unwrap_or(src_w), height.unwrap_or(src_h))
            }
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                invalid(format!(
                    "invalid resize mode \"{s}\" (expected stretch, proportional or crop)"
                ))
            })
    }
}

/// One named output rendition. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFormat {
    name: String,
    width: Option<u32>,
    height: Option<u32>,
    resize_mode: ResizeMode,
    output_format: String,
    quality: Quality,
}

impl ImageFormat {
    /// Build a format, applying every validation rule in order.
    ///
    /// `None` for `resize_mode`, `output_format` or `quality` selects the
    /// defaults (`stretch`, `"jpg"`, `100`). `None` for a dimension means the
    /// dimension is unset, which only `proportional` mode allows (for exactly
    /// one of the two).
    pub fn new(
        name: impl Into<String>,
        width: Option<u32>,
        height: Option<u32>,
        resize_mode: Option<ResizeMode>,
        output_format: Option<&str>,
        quality: Option<u32>,
    ) -> Result<Self, FormatError> {
        let resize_mode = resize_mode.unwrap_or_default();

        for (dimension, size) in [("width", width), ("height", height)] {
            if size == Some(0) {
                return Err(invalid(format!(
                    "{dimension} must be unset or a positive integer"
                )));
            }
        }

        check_geometry(resize_mode, width, height)?;

        let quality = match quality {
            Some(value) => Quality::new(value).ok_or_else(quality_error)?,
            None => Quality::default(),
        };

        let name = name.into();
        check_name(&name)?;

        let output_format = output_format
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
            .to_ascii_lowercase();
        check_output_format(&output_format)?;

        Ok(Self {
            name,
            width,
            height,
            resize_mode,
            output_format,
            quality,
        })
    }

    /// Stretch to exactly `width`×`height`.
    pub fn stretch(name: impl Into<String>, width: u32, height: u32) -> Result<Self, FormatError> {
        Self::new(name, Some(width), Some(height), Some(ResizeMode::Stretch), None, None)
    }

    /// Scale to cover `width`×`height`, then crop the overflow.
    pub fn crop(name: impl Into<String>, width: u32, height: u32) -> Result<Self, FormatError> {
        Self::new(name, Some(width), Some(height), Some(ResizeMode::Crop), None, None)
    }

    /// Proportional resize to a fixed width.
    pub fn fit_width(name: impl Into<String>, width: u32) -> Result<Self, FormatError> {
        Self::new(name, Some(width), None, Some(ResizeMode::Proportional), None, None)
    }

    /// Proportional resize to a fixed height.
    pub fn fit_height(name: impl Into<String>, height: u32) -> Result<Self, FormatError> {
        Self::new(name, None, Some(height), Some(ResizeMode::Proportional), None, None)
    }

    /// Build a format from a raw map.
    ///
    /// All of [`REQUIRED_KEYS`] must be present (values may be `null`);
    /// the first absent key is reported as [`FormatError::MissingField`].
    pub fn from_map(map: &FormatMap) -> Result<Self, FormatError> {
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(FormatError::MissingField((*missing).to_string()));
        }
        let field = |key: &str| map.get(key).unwrap_or(&Value::Null);

        let resize_mode = match field("resizeMode") {
            Value::Null => None,
            Value::String(mode) => Some(mode.parse::<ResizeMode>()?),
            other => return Err(invalid(format!("invalid resize mode {other}"))),
        };

        let width = dimension_value("width", field("width"))?;
        let height = dimension_value("height", field("height"))?;
        check_geometry(resize_mode.unwrap_or_default(), width, height)?;

        let quality = match field("quality") {
            Value::Null => None,
            value => Some(
                value
                    .as_u64()
                    .and_then(|q| u32::try_from(q).ok())
                    .ok_or_else(quality_error)?,
            ),
        };

        let name = match field("name") {
            Value::String(name) => name.as_str(),
            Value::Null => "",
            other => return Err(invalid(format!("name must be a string, got {other}"))),
        };

        let output_format = match field("outputFormat") {
            Value::Null => None,
            Value::String(format) => Some(format.as_str()),
            other => {
                return Err(invalid(format!(
                    "outputFormat must be a string, got {other}"
                )));
            }
        };

        Self::new(name, width, height, resize_mode, output_format, quality)
    }

    /// Render the format back into a raw map with every required key.
    pub fn to_map(&self) -> FormatMap {
        let mut map = FormatMap::new();
        map.insert("name".into(), Value::from(self.name.as_str()));
        map.insert("width".into(), Value::from(self.width));
        map.insert("height".into(), Value::from(self.height));
        map.insert("resizeMode".into(), Value::from(self.resize_mode.as_str()));
        map.insert("outputFormat".into(), Value::from(self.output_format.as_str()));
        map.insert("quality".into(), Value::from(self.quality.value()));
        map
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    /// Output encoding, also used as the generated file's extension.
    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn quality(&self) -> u32 {
        self.quality.value()
    }

    pub(crate) fn encoding_quality(&self) -> Quality {
        self.quality
    }

    /// Output box for a source of the given (width, height).
    pub fn target_dimensions(&self, source: (u32, u32)) -> (u32, u32) {
        self.resize_mode.target_box(self.width, self.height, source)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Check the required-keys rule of [`ImageFormat::from_map`] without building.
pub fn validate_format_map(map: &FormatMap) -> bool {
    REQUIRED_KEYS.iter().all(|key| map.contains_key(*key))
}

/// Either a built format or a raw map still to be validated.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatDefinition {
    Format(ImageFormat),
    Map(FormatMap),
}

impl FormatDefinition {
    pub fn resolve(self) -> Result<ImageFormat, FormatError> {
        match self {
            FormatDefinition::Format(format) => Ok(format),
            FormatDefinition::Map(map) => ImageFormat::from_map(&map),
        }
    }
}

impl From<ImageFormat> for FormatDefinition {
    fn from(format: ImageFormat) -> Self {
        FormatDefinition::Format(format)
    }
}

impl From<&ImageFormat> for FormatDefinition {
    fn from(format: &ImageFormat) -> Self {
        FormatDefinition::Format(format.clone())
    }
}

impl From<FormatMap> for FormatDefinition {
    fn from(map: FormatMap) -> Self {
        FormatDefinition::Map(map)
    }
}

fn quality_error() -> FormatError {
    invalid("quality must be an integer between 0 and 100")
}

fn dimension_value(dimension: &str, value: &Value) -> Result<Option<u32>, FormatError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_u64()
        .filter(|size| *size > 0)
        .and_then(|size| u32::try_from(size).ok())
        .map(Some)
        .ok_or_else(|| invalid(format!("{dimension} must be unset or a positive integer")))
}

fn check_geometry(
    mode: ResizeMode,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(), FormatError> {
    match mode {
        ResizeMode::Proportional if width.is_some() == height.is_some() => Err(invalid(
            "proportional resize mode must specify only one dimension (width or height)",
        )),
        ResizeMode::Stretch | ResizeMode::Crop if width.is_none() || height.is_none() => {
            Err(invalid(format!(
                "{mode} resize mode must specify both width and height"
            )))
        }
        _ => Ok(()),
    }
}

fn check_name(name: &str) -> Result<(), FormatError> {
    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid(format!(
            "name \"{name}\" must not contain path separators"
        )));
    }
    Ok(())
}

fn check_output_format(format: &str) -> Result<(), FormatError> {
    if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(format!(
            "output format \"{format}\" must be a non-empty alphanumeric extension"
        )));
    }
    Ok(())
}
