//! # Image Resizer
//!
//! Generates named renditions of an uploaded image (thumbnails, previews,
//! banners) from declarative format definitions.
//!
//! A **format** says how big a rendition is and how it is produced:
//!
//! | Mode | Needs | Result |
//! |------|-------|--------|
//! | `stretch` | width and height | exactly that box, aspect ratio ignored |
//! | `proportional` | width *or* height | the other side follows the source ratio |
//! | `crop` | width and height | scaled to cover the box, overflow cut from the center |
//!
//! Formats are registered in named **groups** (usually from configuration),
//! attached to a session, and rendered in one batch per source image:
//!
//! ```text
//! config / maps  →  format groups  →  active formats  →  resize(source)
//!                                                          ↓
//!                                     temp_dir/<hash>_<name>.<ext>
//! ```
//!
//! Output names are deterministic: resizing the same source path with the
//! same format always targets the same file. Every written file is tracked
//! until [`ImageResizer::delete_generated_files`] removes it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | `ImageFormat` model, raw format maps, validation rules |
//! | [`resizer`] | `ImageResizer` session: groups, batch resize, generated-file cleanup |
//! | [`naming`] | Deterministic output file names |
//! | [`imaging`] | Dimension math, `ImageBackend` trait, `image`-crate backend |
//! | [`config`] | TOML configuration: temp dir, skip policy, format groups |
//! | [`output`] | CLI output formatting |

pub mod config;
pub mod format;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod resizer;

pub use format::{FormatDefinition, FormatError, FormatMap, ImageFormat, ResizeMode};
pub use resizer::{CleanupFailure, ImageResizer, Renditions, ResizeError};

#[cfg(test)]
pub(crate) mod test_helpers;
