//! Resizer configuration module.
//!
//! Handles loading and validating the TOML configuration file. Every key is
//! optional; anything left out keeps its stock default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! temp_dir = ".image-resizer"   # Where renditions are written
//! skip_bigger_formats = false   # Skip formats larger than the source
//!
//! # One array of tables per format group
//! [[formats.default]]
//! name = "big"
//! width = 800
//! resizeMode = "proportional"
//!
//! [[formats.default]]
//! name = "small"
//! width = 100
//! height = 100
//! resizeMode = "crop"
//! outputFormat = "png"
//! quality = 80
//! ```
//!
//! Format entries use the same keys as raw format maps. Any key left out is
//! treated as `null` (unset / default) and the entry is validated exactly
//! like a map passed to the resizer.
//!
//! Unknown keys are rejected to catch typos early.

use crate::format::{FormatMap, ImageFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from the TOML file.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Directory renditions are written to. Created on first resize.
    pub temp_dir: PathBuf,
    /// Skip formats whose box is larger than the source on either side.
    pub skip_bigger_formats: bool,
    /// Named format groups, each an ordered list of entries.
    pub formats: BTreeMap<String, Vec<FormatEntry>>,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from(".image-resizer"),
            skip_bigger_formats: false,
            formats: BTreeMap::new(),
        }
    }
}

/// One format as written in the config file.
///
/// Dimensions and quality are kept as raw integers so that out-of-range
/// values reach format validation and get its error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FormatEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<String>,
    #[serde(alias = "format", skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
}

impl FormatEntry {
    /// Raw format map with every key present; omitted values are `null`.
    pub fn to_format_map(&self) -> FormatMap {
        fn opt<T: Into<Value>>(value: Option<T>) -> Value {
            value.map_or(Value::Null, Into::into)
        }

        let mut map = FormatMap::new();
        map.insert("name".into(), opt(self.name.clone()));
        map.insert("width".into(), opt(self.width));
        map.insert("height".into(), opt(self.height));
        map.insert("resizeMode".into(), opt(self.resize_mode.clone()));
        map.insert("outputFormat".into(), opt(self.output_format.clone()));
        map.insert("quality".into(), opt(self.quality));
        map
    }
}

impl ResizerConfig {
    /// Validate the temp dir and every format entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temp_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("temp_dir must not be empty".into()));
        }

        for (group, entries) in &self.formats {
            let mut seen = HashSet::new();
            for (index, entry) in entries.iter().enumerate() {
                let format = ImageFormat::from_map(&entry.to_format_map()).map_err(|e| {
                    ConfigError::Validation(format!("formats.{group}[{index}]: {e}"))
                })?;
                if !seen.insert(format.name().to_string()) {
                    return Err(ConfigError::Validation(format!(
                        "formats.{group}[{index}]: duplicate format name \"{}\"",
                        format.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse config text, rejecting unknown keys, then validate it.
///
/// Keys left out keep their defaults.
pub fn parse_config(content: &str) -> Result<ResizerConfig, ConfigError> {
    let config: ResizerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it is
/// missing.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ResizerConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Resizer Configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory renditions are written to. Created on first use.
temp_dir = ".image-resizer"

# Skip (instead of upscale) formats whose target box is wider or taller
# than the source image.
skip_bigger_formats = false

# ---------------------------------------------------------------------------
# Format groups
# ---------------------------------------------------------------------------
# Each group is an ordered list of formats, declared as an array of tables
# under [[formats.<group name>]]. Keys left out are unset:
#
#   name          Required. Unique within the group; names the output file.
#   width         Target width in pixels.
#   height        Target height in pixels.
#   resizeMode    "stretch" (default), "proportional", or "crop".
#                 stretch and crop need both width and height;
#                 proportional needs exactly one of them.
#   outputFormat  File extension to encode as (default "jpg").
#   quality       Encoder quality, 0-100 (default 100).
#
# [[formats.default]]
# name = "big"
# width = 800
# resizeMode = "proportional"
#
# [[formats.default]]
# name = "small"
# width = 100
# height = 100
# resizeMode = "crop"
# outputFormat = "png"
# quality = 80
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, width: Option<i64>, height: Option<i64>, mode: &str) -> FormatEntry {
        FormatEntry {
            name: Some(name.to_string()),
            width,
            height,
            resize_mode: Some(mode.to_string()),
            ..FormatEntry::default()
        }
    }

    // =========================================================================
    // Defaults and parsing
    // =========================================================================

    #[test]
    fn default_config_values() {
        let config = ResizerConfig::default();
        assert_eq!(config.temp_dir, PathBuf::from(".image-resizer"));
        assert!(!config.skip_bigger_formats);
        assert!(config.formats.is_empty());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(ResizerConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, ResizerConfig::default());
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), ResizerConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = parse_config("skip_bigger_formats = true").unwrap();
        assert!(config.skip_bigger_formats);
        assert_eq!(config.temp_dir, PathBuf::from(".image-resizer"));
    }

    #[test]
    fn parse_config_validates() {
        let result = parse_config("temp_dir = \"\"");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn parse_format_groups() {
        let toml_str = r#"
skip_bigger_formats = true

[[formats.gallery]]
name = "big"
width = 800
resizeMode = "proportional"

[[formats.gallery]]
name = "small"
width = 100
height = 100
resizeMode = "crop"
outputFormat = "png"
quality = 80

[[formats.avatar]]
name = "face"
width = 64
height = 64
"#;
        let config: ResizerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.skip_bigger_formats);
        assert_eq!(config.formats.len(), 2);

        let gallery = &config.formats["gallery"];
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[0], entry("big", Some(800), None, "proportional"));
        assert_eq!(gallery[1].output_format.as_deref(), Some("png"));
        assert_eq!(gallery[1].quality, Some(80));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn format_key_is_an_alias_for_output_format() {
        let toml_str = r#"
[[formats.web]]
name = "thumb"
width = 10
height = 10
format = "webp"
"#;
        let config: ResizerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.formats["web"][0].output_format.as_deref(), Some("webp"));
    }

    // =========================================================================
    // Format entries
    // =========================================================================

    #[test]
    fn to_format_map_fills_missing_keys_with_null() {
        let map = entry("big", Some(800), None, "proportional").to_format_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map["name"], Value::from("big"));
        assert_eq!(map["width"], Value::from(800));
        assert_eq!(map["height"], Value::Null);
        assert_eq!(map["outputFormat"], Value::Null);
        assert_eq!(map["quality"], Value::Null);
    }

    #[test]
    fn entry_map_builds_valid_format() {
        let map = entry("big", Some(800), None, "proportional").to_format_map();
        let format = ImageFormat::from_map(&map).unwrap();
        assert_eq!(format.name(), "big");
        assert_eq!(format.width(), Some(800));
        assert_eq!(format.output_format(), "jpg");
        assert_eq!(format.quality(), 100);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_empty_temp_dir() {
        let config = ResizerConfig {
            temp_dir: PathBuf::new(),
            ..ResizerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("temp_dir"));
    }

    #[test]
    fn validate_reports_entry_location() {
        let mut config = ResizerConfig::default();
        config.formats.insert(
            "gallery".to_string(),
            vec![
                entry("big", Some(800), None, "proportional"),
                entry("broken", Some(100), Some(100), "proportional"),
            ],
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("formats.gallery[1]"), "{err}");
    }

    #[test]
    fn validate_rejects_missing_name() {
        let mut config = ResizerConfig::default();
        config.formats.insert(
            "gallery".to_string(),
            vec![FormatEntry {
                width: Some(10),
                height: Some(10),
                ..FormatEntry::default()
            }],
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_negative_dimension() {
        let mut config = ResizerConfig::default();
        config.formats.insert(
            "gallery".to_string(),
            vec![entry("neg", Some(-5), Some(10), "stretch")],
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_duplicate_names_in_group() {
        let mut config = ResizerConfig::default();
        config.formats.insert(
            "gallery".to_string(),
            vec![
                entry("big", Some(800), None, "proportional"),
                entry("big", Some(10), Some(10), "crop"),
            ],
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate"), "{err}");
    }

    #[test]
    fn validate_allows_same_name_across_groups() {
        let mut config = ResizerConfig::default();
        config.formats.insert(
            "a".to_string(),
            vec![entry("thumb", Some(10), Some(10), "crop")],
        );
        config.formats.insert(
            "b".to_string(),
            vec![entry("thumb", Some(20), Some(20), "crop")],
        );
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(config, ResizerConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resizer.toml");
        fs::write(
            &path,
            r#"
temp_dir = "/var/cache/renditions"

[[formats.default]]
name = "big"
width = 800
resizeMode = "proportional"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.temp_dir, PathBuf::from("/var/cache/renditions"));
        // Unspecified values should be defaults
        assert!(!config.skip_bigger_formats);
        assert_eq!(config.formats["default"].len(), 1);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resizer.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_invalid_entry_is_validation_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resizer.toml");
        fs::write(
            &path,
            r#"
[[formats.default]]
name = "big"
width = 800
height = 600
resizeMode = "proportional"
"#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ResizerConfig, _> = toml::from_str(r#"skip_biger = true"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_entry_key_rejected() {
        let toml_str = r#"
[[formats.default]]
name = "big"
widht = 800
"#;
        let result: Result<ResizerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn snake_case_entry_key_rejected() {
        let toml_str = r#"
[[formats.default]]
name = "big"
resize_mode = "crop"
"#;
        let result: Result<ResizerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resizer.toml");
        fs::write(&path, "tmp_dir = \"/tmp\"\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
