//! Config file → session → renditions, through the public API.

mod common;

use common::write_test_jpeg;
use image_resizer::ImageResizer;
use image_resizer::config::{ConfigError, load_config};
use tempfile::TempDir;

const CONFIG: &str = r#"
skip_bigger_formats = true

[[formats.gallery]]
name = "big"
width = 300
resizeMode = "proportional"

[[formats.gallery]]
name = "small"
width = 40
height = 40
resizeMode = "crop"
outputFormat = "png"
quality = 80

[[formats.print]]
name = "poster"
width = 5000
height = 4000
"#;

#[test]
fn configured_groups_drive_a_batch() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("image-resizer.toml");
    std::fs::write(&config_path, CONFIG).unwrap();

    let mut config = load_config(&config_path).unwrap();
    config.temp_dir = tmp.path().join("out");
    let mut resizer = ImageResizer::from_config(&config).unwrap();

    assert_eq!(resizer.group_names().collect::<Vec<_>>(), vec!["gallery", "print"]);
    resizer.use_formats_group("gallery").unwrap();
    resizer.use_formats_group("print").unwrap();
    assert_eq!(resizer.active_formats().len(), 3);

    let source = tmp.path().join("photo.jpg");
    write_test_jpeg(&source, 600, 400);
    let result = resizer.resize(&source).unwrap();

    assert_eq!(image::image_dimensions(&result["big"]).unwrap(), (300, 200));
    assert_eq!(image::image_dimensions(&result["small"]).unwrap(), (40, 40));
    assert!(result["small"].extension().is_some_and(|ext| ext == "png"));
    // 5000x4000 exceeds the 600x400 source
    assert!(!result.contains_key("poster"));
}

#[test]
fn invalid_group_entry_fails_to_load() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("image-resizer.toml");
    std::fs::write(
        &config_path,
        r#"
[[formats.gallery]]
name = "thumb"
width = 100
resizeMode = "crop"
"#,
    )
    .unwrap();

    let err = load_config(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("formats.gallery[0]"), "{err}");
}
