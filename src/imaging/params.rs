//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`resizer`](crate::resizer) (which decides which
//! renditions to create and where) and the [`backend`](super::backend) (which
//! does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (0–100, default 100). Out-of-range values are rejected.
//! - [`ResizeParams`]: Resize the whole image to an exact box (stretch and proportional modes).
//! - [`CropParams`]: Scale to cover a box and crop the overflow (crop mode).
//!
//! The output encoding is carried by the output path's extension.

use std::path::PathBuf;

/// Quality setting for image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(u8);

impl Quality {
    /// Returns `None` for values above 100.
    pub fn new(value: u32) -> Option<Self> {
        u8::try_from(value).ok().filter(|v| *v <= 100).map(Self)
    }

    pub fn value(self) -> u32 {
        u32::from(self.0)
    }

    /// Quality as lossy encoders accept it. Encoders treat 0 as invalid, so
    /// it is raised to 1.
    pub fn encoder_value(self) -> u8 {
        self.0.max(1)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Parameters for a whole-image resize to an exact box.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Parameters for a fit-and-crop operation (scale to cover, center crop).
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Final crop dimensions.
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_rejects_out_of_range() {
        assert_eq!(Quality::new(0).map(Quality::value), Some(0));
        assert_eq!(Quality::new(50).map(Quality::value), Some(50));
        assert_eq!(Quality::new(100).map(Quality::value), Some(100));
        assert_eq!(Quality::new(101), None);
        assert_eq!(Quality::new(300), None);
    }

    #[test]
    fn quality_default_is_100() {
        assert_eq!(Quality::default().value(), 100);
    }

    #[test]
    fn encoder_value_raises_zero() {
        assert_eq!(Quality::new(0).unwrap().encoder_value(), 1);
        assert_eq!(Quality::new(85).unwrap().encoder_value(), 85);
    }
}
