//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>` or a
//! `String`) for testability and a `print_*` wrapper that writes to stdout.
//! Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! ==> Resized uploads/photo.jpg
//! big → .image-resizer/3f0c…9a1e_big.jpg
//! small → .image-resizer/3f0c…9a1e_small.png
//! Generated 2 of 3 formats (1 skipped)
//! ```
//!
//! ## Check
//!
//! ```text
//! Temp dir: .image-resizer
//! Skip bigger formats: no
//!
//! Groups
//! default (2 formats)
//!     001 big 800×auto proportional → jpg (q100)
//!     002 small 100×100 crop → png (q80)
//! ```

use crate::format::ImageFormat;
use crate::imaging::ImageBackend;
use crate::resizer::{ImageResizer, Renditions};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dimension(size: Option<u32>) -> String {
    size.map_or_else(|| "auto".to_string(), |s| s.to_string())
}

/// One-line summary of a format.
///
/// ```text
/// big 800×auto proportional → jpg (q100)
/// ```
pub fn describe_format(format: &ImageFormat) -> String {
    format!(
        "{} {}×{} {} → {} (q{})",
        format.name(),
        dimension(format.width()),
        dimension(format.height()),
        format.resize_mode(),
        format.output_format(),
        format.quality()
    )
}

/// Lines for one resize batch: one per rendition, then a summary.
///
/// `attached` is the number of formats that were active for the batch;
/// the difference to the rendition count is reported as skipped.
pub fn format_resize_output(
    source: &Path,
    renditions: &Renditions,
    attached: usize,
) -> Vec<String> {
    let mut lines = vec![format!("==> Resized {}", source.display())];
    for (name, path) in renditions {
        lines.push(format!("{} → {}", name, path.display()));
    }

    let skipped = attached.saturating_sub(renditions.len());
    let summary = if skipped > 0 {
        format!(
            "Generated {} of {} formats ({} skipped)",
            renditions.len(),
            attached,
            skipped
        )
    } else {
        format!("Generated {} of {} formats", renditions.len(), attached)
    };
    lines.push(summary);
    lines
}

/// The rendition map as a pretty-printed JSON object.
pub fn format_resize_json(renditions: &Renditions) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(renditions)
}

/// Lines describing a configured session: settings, then every group.
pub fn format_check_output<B: ImageBackend>(resizer: &ImageResizer<B>) -> Vec<String> {
    let mut lines = vec![
        format!("Temp dir: {}", resizer.temp_dir().display()),
        format!(
            "Skip bigger formats: {}",
            if resizer.is_skipping_bigger_formats() { "yes" } else { "no" }
        ),
        String::new(),
        "Groups".to_string(),
    ];

    let mut any = false;
    for name in resizer.group_names() {
        any = true;
        let formats = resizer.format_group(name).unwrap_or_default();
        let noun = if formats.len() == 1 { "format" } else { "formats" };
        lines.push(format!("{} ({} {})", name, formats.len(), noun));
        for (i, format) in formats.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(i + 1),
                describe_format(format)
            ));
        }
    }
    if !any {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines
}

pub fn print_resize_output(source: &Path, renditions: &Renditions, attached: usize) {
    for line in format_resize_output(source, renditions, attached) {
        println!("{}", line);
    }
}

pub fn print_resize_json(renditions: &Renditions) -> Result<(), serde_json::Error> {
    println!("{}", format_resize_json(renditions)?);
    Ok(())
}

pub fn print_check_output<B: ImageBackend>(resizer: &ImageResizer<B>) {
    for line in format_check_output(resizer) {
        println!("{}", line);
    }
}
