//! Image processing: the pixel side of the resizer.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Crop to fit** | `resize_to_fill` with Lanczos3 |
//! | **Encode** | JPEG, PNG, TIFF, WebP, AVIF encoders from `image` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{exceeds_source, proportional_dimension};
pub use params::{CropParams, Quality, ResizeParams};
pub use rust_backend::RustBackend;
