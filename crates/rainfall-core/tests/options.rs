use std::fs;

use rainfall_core::{BucketLabel, ResampleError, ResampleOptions, Resolution};

#[test]
fn empty_toml_gives_defaults() {
    let options = ResampleOptions::from_toml_str("").unwrap();
    assert_eq!(options, ResampleOptions::default());
    assert_eq!(options.resolution, Resolution::Daily);
    assert!(options.geo_output);
    assert!(options.destination.is_none());
    assert_eq!(options.label, BucketLabel::Start);
}

#[test]
fn toml_fields_override_defaults() {
    let options = ResampleOptions::from_toml_str(
        r#"
            resolution = "M"
            destination = "monthly.csv"
            geo_output = false
            label = "end"
        "#,
    )
    .unwrap();

    assert_eq!(options.resolution, Resolution::Monthly);
    assert_eq!(options.destination.as_deref(), Some(std::path::Path::new("monthly.csv")));
    assert!(!options.geo_output);
    assert_eq!(options.label, BucketLabel::End);
}

#[test]
fn unknown_resolution_or_field_is_config_error() {
    let err = ResampleOptions::from_toml_str(r#"resolution = "W""#).unwrap_err();
    assert!(matches!(err, ResampleError::Config(_)));

    let err = ResampleOptions::from_toml_str("geoout = true").unwrap_err();
    assert!(matches!(err, ResampleError::Config(_)));
}

#[test]
fn load_reads_file_and_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rainfall.toml");
    fs::write(&path, "resolution = \"Y\"\n").unwrap();

    let options = ResampleOptions::load(&path).unwrap();
    assert_eq!(options.resolution, Resolution::Yearly);

    let err = ResampleOptions::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ResampleError::FileAccess { .. }));
}
