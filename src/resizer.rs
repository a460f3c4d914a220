//! The resizing session: format groups, attached formats, batch resize, cleanup.
//!
//! An [`ImageResizer`] owns two independent collections of formats:
//!
//! - **Format groups**: named, ordered, reusable sets registered once
//!   (usually from configuration) and never consumed.
//! - **Active formats**: the formats the next [`resize`](ImageResizer::resize)
//!   will render, in attachment order. Groups, single formats and lists are
//!   appended to it; [`detach_all_formats`](ImageResizer::detach_all_formats)
//!   empties it.
//!
//! Each rendered file is recorded in the session's generated-files index,
//! which only [`delete_generated_files`](ImageResizer::delete_generated_files)
//! clears.
//!
//! ```no_run
//! use image_resizer::{ImageFormat, ImageResizer};
//!
//! let mut resizer = ImageResizer::new("/tmp/renditions");
//! resizer
//!     .use_format(ImageFormat::fit_width("big", 800)?)?
//!     .use_format(ImageFormat::crop("small", 100, 100)?)?;
//!
//! let generated = resizer.resize("upload.jpg")?;
//! for (name, path) in &generated {
//!     println!("{name}: {}", path.display());
//! }
//! resizer.delete_generated_files()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failure model
//!
//! A batch is not transactional. If a format fails, the batch stops with an
//! error, and files already written for earlier formats stay on disk and in
//! the generated-files index, ready for cleanup.
//!
//! Two sessions resizing the same source with the same format at the same
//! time race on one output path; nothing here locks it.

use crate::config::ResizerConfig;
use crate::format::{FormatDefinition, FormatError, ImageFormat, ResizeMode};
use crate::imaging::{
    BackendError, CropParams, Dimensions, ImageBackend, ResizeParams, RustBackend, exceeds_source,
};
use crate::naming;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error(transparent)]
    InvalidFormat(#[from] FormatError),
    #[error("Unknown formats group \"{0}\"")]
    UnknownGroup(String),
    #[error("Temporary directory {} is unavailable: {reason}", .path.display())]
    TempDirUnavailable { path: PathBuf, reason: String },
    #[error("Cannot read source image {}: {source}", .path.display())]
    SourceImageUnreadable {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Cannot write {}: {source}", .path.display())]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(
        "Cannot delete {} generated file(s): {}",
        .failures.len(),
        describe_failures(.failures)
    )]
    CleanupFailed { failures: Vec<CleanupFailure> },
}

/// One generated file that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub key: String,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({}): {}", self.key, self.path.display(), self.reason)
    }
}

fn describe_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of one batch: format name → output path.
pub type Renditions = BTreeMap<String, PathBuf>;

/// A resizing session. See the [module docs](self).
pub struct ImageResizer<B = RustBackend> {
    backend: B,
    temp_dir: PathBuf,
    format_groups: BTreeMap<String, Vec<ImageFormat>>,
    active_formats: Vec<ImageFormat>,
    generated_files: BTreeMap<String, PathBuf>,
    skip_bigger_formats: bool,
}

impl ImageResizer<RustBackend> {
    /// Session writing into `temp_dir` with the `image`-crate backend.
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self::with_backend(RustBackend::new(), temp_dir)
    }

    /// Session configured from a loaded [`ResizerConfig`].
    pub fn from_config(config: &ResizerConfig) -> Result<Self, ResizeError> {
        Self::from_config_with_backend(RustBackend::new(), config)
    }
}

impl<B: ImageBackend> ImageResizer<B> {
    /// Session using a specific backend (allows testing with a mock).
    pub fn with_backend(backend: B, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            temp_dir: temp_dir.into(),
            format_groups: BTreeMap::new(),
            active_formats: Vec::new(),
            generated_files: BTreeMap::new(),
            skip_bigger_formats: false,
        }
    }

    /// Register every configured group and apply the configured flags.
    pub fn from_config_with_backend(
        backend: B,
        config: &ResizerConfig,
    ) -> Result<Self, ResizeError> {
        let mut resizer = Self::with_backend(backend, &config.temp_dir);
        resizer.skip_bigger_formats(config.skip_bigger_formats);
        for (name, entries) in &config.formats {
            resizer.add_formats_group(name, entries.iter().map(|entry| entry.to_format_map()))?;
        }
        Ok(resizer)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn set_temp_dir(&mut self, temp_dir: impl Into<PathBuf>) -> &mut Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// When enabled, formats whose box exceeds the source on either side are
    /// skipped instead of upscaled.
    pub fn skip_bigger_formats(&mut self, enabled: bool) -> &mut Self {
        self.skip_bigger_formats = enabled;
        self
    }

    pub fn is_skipping_bigger_formats(&self) -> bool {
        self.skip_bigger_formats
    }

    // =========================================================================
    // Format groups
    // =========================================================================

    /// Register (or replace) a named group.
    ///
    /// Every member is validated now; if any fails, the group is not stored.
    pub fn add_formats_group<I>(
        &mut self,
        name: impl Into<String>,
        formats: I,
    ) -> Result<&mut Self, ResizeError>
    where
        I: IntoIterator,
        I::Item: Into<FormatDefinition>,
    {
        let formats = resolve_all(formats)?;
        self.format_groups.insert(name.into(), formats);
        Ok(self)
    }

    /// Members of a registered group, in registration order.
    pub fn format_group(&self, name: &str) -> Option<&[ImageFormat]> {
        self.format_groups.get(name).map(Vec::as_slice)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.format_groups.keys().map(String::as_str)
    }

    /// Append every member of a registered group to the active formats.
    pub fn use_formats_group(&mut self, name: &str) -> Result<&mut Self, ResizeError> {
        let group = self
            .format_groups
            .get(name)
            .ok_or_else(|| ResizeError::UnknownGroup(name.to_string()))?;
        self.active_formats.extend(group.iter().cloned());
        Ok(self)
    }

    // =========================================================================
    // Active formats
    // =========================================================================

    /// Append one format (built or raw map) to the active formats.
    pub fn use_format(
        &mut self,
        format: impl Into<FormatDefinition>,
    ) -> Result<&mut Self, ResizeError> {
        let format = format.into().resolve()?;
        self.active_formats.push(format);
        Ok(self)
    }

    /// Append several formats. All are validated before any is attached.
    pub fn use_formats<I>(&mut self, formats: I) -> Result<&mut Self, ResizeError>
    where
        I: IntoIterator,
        I::Item: Into<FormatDefinition>,
    {
        let formats = resolve_all(formats)?;
        self.active_formats.extend(formats);
        Ok(self)
    }

    /// Replace the active formats wholesale.
    pub fn set_formats(&mut self, formats: Vec<ImageFormat>) -> &mut Self {
        self.active_formats = formats;
        self
    }

    pub fn active_formats(&self) -> &[ImageFormat] {
        &self.active_formats
    }

    /// Empty the active formats. Groups and generated files are untouched.
    pub fn detach_all_formats(&mut self) -> &mut Self {
        self.active_formats.clear();
        self
    }

    // =========================================================================
    // Resizing
    // =========================================================================

    /// Render every active format from `source` into the temp directory.
    ///
    /// Returns format name → output path. Skipped formats have no entry; if
    /// two active formats share a name, the later one wins.
    pub fn resize(&mut self, source: impl AsRef<Path>) -> Result<Renditions, ResizeError> {
        let source = source.as_ref();
        self.ensure_temp_dir()?;

        let mut renditions = Renditions::new();
        if self.active_formats.is_empty() {
            return Ok(renditions);
        }

        let source_dims = self.read_dimensions(source)?;
        for format in &self.active_formats {
            if let Some((key, output)) = self.render(source, source_dims, format)? {
                track_output(&self.backend, &mut self.generated_files, key, output.clone())?;
                renditions.insert(format.name().to_string(), output);
            }
        }

        info!(
            source = %source.display(),
            generated = renditions.len(),
            formats = self.active_formats.len(),
            "resized image"
        );
        Ok(renditions)
    }

    /// Render a single format, whether or not it is attached.
    ///
    /// Returns `None` when the format was skipped as bigger than the source.
    pub fn resize_format(
        &mut self,
        source: impl AsRef<Path>,
        format: &ImageFormat,
    ) -> Result<Option<PathBuf>, ResizeError> {
        let source = source.as_ref();
        self.ensure_temp_dir()?;

        let source_dims = self.read_dimensions(source)?;
        match self.render(source, source_dims, format)? {
            Some((key, output)) => {
                track_output(&self.backend, &mut self.generated_files, key, output.clone())?;
                Ok(Some(output))
            }
            None => Ok(None),
        }
    }

    fn ensure_temp_dir(&self) -> Result<(), ResizeError> {
        let unavailable = |reason: String| ResizeError::TempDirUnavailable {
            path: self.temp_dir.clone(),
            reason,
        };

        match std::fs::metadata(&self.temp_dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(unavailable("exists but is not a directory".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.temp_dir.display(), "creating temporary directory");
                std::fs::create_dir_all(&self.temp_dir).map_err(|e| unavailable(e.to_string()))
            }
            Err(e) => Err(unavailable(e.to_string())),
        }
    }

    fn read_dimensions(&self, source: &Path) -> Result<Dimensions, ResizeError> {
        self.backend
            .identify(source)
            .map_err(|e| ResizeError::SourceImageUnreadable {
                path: source.to_path_buf(),
                source: e,
            })
    }

    /// Compute the box, apply the skip policy, transform, and save.
    ///
    /// Returns the tracking key and output path, or `None` when skipped.
    fn render(
        &self,
        source: &Path,
        source_dims: Dimensions,
        format: &ImageFormat,
    ) -> Result<Option<(String, PathBuf)>, ResizeError> {
        let source_box: (u32, u32) = source_dims.into();
        let (width, height) = format.target_dimensions(source_box);

        if self.skip_bigger_formats && exceeds_source((width, height), source_box) {
            debug!(
                format = %format,
                width,
                height,
                source_width = source_dims.width,
                source_height = source_dims.height,
                "skipping format bigger than source"
            );
            return Ok(None);
        }

        let key = naming::generated_key(source, format.name());
        let output = self.temp_dir.join(naming::output_filename(source, format));
        let quality = format.encoding_quality();

        let result = match format.resize_mode() {
            ResizeMode::Stretch | ResizeMode::Proportional => self.backend.resize(&ResizeParams {
                source: source.to_path_buf(),
                output: output.clone(),
                width,
                height,
                quality,
            }),
            ResizeMode::Crop => self.backend.crop_to_fit(&CropParams {
                source: source.to_path_buf(),
                output: output.clone(),
                width,
                height,
                quality,
            }),
        };
        result.map_err(|e| classify_backend_error(source, &output, e))?;

        debug!(
            format = %format,
            mode = %format.resize_mode(),
            width,
            height,
            output = %output.display(),
            "wrote rendition"
        );
        Ok(Some((key, output)))
    }

    // =========================================================================
    // Generated files
    // =========================================================================

    /// Every file written by this session and not yet deleted: key → path.
    pub fn generated_files(&self) -> &BTreeMap<String, PathBuf> {
        &self.generated_files
    }

    /// Delete every tracked file that still exists as a regular file.
    ///
    /// All deletions are attempted. Entries are dropped once their file is
    /// confirmed gone; entries whose deletion failed are kept for a retry and
    /// reported together in [`ResizeError::CleanupFailed`]. Returns the
    /// number of files deleted.
    pub fn delete_generated_files(&mut self) -> Result<usize, ResizeError> {
        let mut deleted = 0;
        let mut failures = Vec::new();

        let backend = &self.backend;
        self.generated_files.retain(|key, path| {
            let path: &Path = path;
            if !path.is_file() {
                return false;
            }
            match backend.remove_output(path) {
                Ok(()) => {
                    deleted += 1;
                    false
                }
                Err(e) => {
                    warn!(
                        key = %key,
                        path = %path.display(),
                        error = %e,
                        "failed to delete generated file"
                    );
                    failures.push(CleanupFailure {
                        key: key.clone(),
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                    true
                }
            }
        });

        if failures.is_empty() {
            debug!(deleted, "deleted generated files");
            Ok(deleted)
        } else {
            Err(ResizeError::CleanupFailed { failures })
        }
    }
}

/// Record `output` under `key`.
///
/// When the key already points at a different file (same source and format
/// name, different extension or temp dir), that file is removed so the index
/// never loses track of something on disk. If the removal fails, the new
/// output is still tracked and the stale file is reported.
fn track_output<B: ImageBackend>(
    backend: &B,
    generated_files: &mut BTreeMap<String, PathBuf>,
    key: String,
    output: PathBuf,
) -> Result<(), ResizeError> {
    let Some(previous) = generated_files.insert(key.clone(), output.clone()) else {
        return Ok(());
    };
    if previous == output || !previous.is_file() {
        return Ok(());
    }

    debug!(key = %key, path = %previous.display(), "removing superseded rendition");
    backend.remove_output(&previous).map_err(|e| {
        warn!(
            key = %key,
            path = %previous.display(),
            error = %e,
            "failed to delete superseded file"
        );
        ResizeError::CleanupFailed {
            failures: vec![CleanupFailure {
                key,
                path: previous,
                reason: e.to_string(),
            }],
        }
    })
}

fn resolve_all<I>(formats: I) -> Result<Vec<ImageFormat>, FormatError>
where
    I: IntoIterator,
    I::Item: Into<FormatDefinition>,
{
    formats
        .into_iter()
        .map(|format| format.into().resolve())
        .collect()
}

/// Decode failures point at the source; everything else at the output.
fn classify_backend_error(source: &Path, output: &Path, error: BackendError) -> ResizeError {
    match error {
        BackendError::Decode { .. } => ResizeError::SourceImageUnreadable {
            path: source.to_path_buf(),
            source: error,
        },
        BackendError::Encode { .. } | BackendError::UnsupportedFormat(_) => {
            ResizeError::ImageWriteFailed {
                path: output.to_path_buf(),
                source: error,
            }
        }
    }
}
