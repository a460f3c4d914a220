//! Deterministic names for generated files.
//!
//! Every rendition is written as `<hash>_<format name>.<output format>`,
//! where `<hash>` is the SHA-256 of the source path as given by the caller
//! (not canonicalized, not the file contents). Resizing the same path with
//! the same format twice therefore targets the same file, and two formats of
//! one source never collide.
//!
//! ```text
//! 3f0c…9a1e_big.jpg
//! 3f0c…9a1e_small.png
//! ```
//!
//! The `<hash>_<format name>` part doubles as the key under which the
//! resizer tracks the file in its generated-files index.

use crate::format::ImageFormat;
use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of the source path, returned as a hex string.
pub fn source_hash(source: &Path) -> String {
    let digest = Sha256::digest(source.as_os_str().as_encoded_bytes());
    format!("{:x}", digest)
}

/// Tracking key for one rendition of one source: `<hash>_<format name>`.
pub fn generated_key(source: &Path, format_name: &str) -> String {
    format!("{}_{}", source_hash(source), format_name)
}

/// File name (without directory) for one rendition of one source.
pub fn output_filename(source: &Path, format: &ImageFormat) -> String {
    format!(
        "{}.{}",
        generated_key(source, format.name()),
        format.output_format()
    )
}
