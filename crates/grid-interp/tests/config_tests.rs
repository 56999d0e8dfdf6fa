//! Tests for loading and validating interpolation options.

use std::io::Write;

use diag_common::{DiagError, FieldType, GridPoint, TimeIndex};
use grid_interp::{InterpOptions, LineSpec};

// ============================================================================
// YAML / JSON loading
// ============================================================================

#[test]
fn test_yaml_options() {
    let yaml = r#"
use_pivot: true
angle: 45.0
pivot_point: [10.0, 12.5]
extrapolate: true
field_type: height
log_p: true
time_index: all
"#;
    let options = InterpOptions::from_yaml_str(yaml).unwrap();
    assert!(options.use_pivot);
    assert_eq!(options.field_type, Some(FieldType::Height));
    assert_eq!(options.time_index, TimeIndex::All);
    assert_eq!(options.autolevels, 100);
    assert_eq!(
        options.line_spec().unwrap(),
        Some(LineSpec::Pivot {
            pivot: GridPoint::new(10.0, 12.5),
            angle: 45.0
        })
    );
}

#[test]
fn test_yaml_file_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "start_point: [0.0, 0.0]").unwrap();
    writeln!(file, "end_point: [5.0, 5.0]").unwrap();
    writeln!(file, "num_points: 11").unwrap();
    writeln!(file, "time_index: 3").unwrap();

    let options = InterpOptions::from_yaml_file(file.path()).unwrap();
    assert_eq!(options.num_points, Some(11));
    assert_eq!(options.time_index, TimeIndex::Single(3));
}

#[test]
fn test_missing_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = InterpOptions::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, DiagError::ConfigurationConflict(_)));
}

#[test]
fn test_json_options() {
    let options = InterpOptions::from_json_str(
        r#"{"latlon": true, "start_point": [40.0, -105.0], "end_point": [41.0, -100.0], "linecoords": true}"#,
    )
    .unwrap();
    assert!(options.latlon);
    assert!(options.linecoords);
}

#[test]
fn test_unknown_keys_are_rejected() {
    let err = InterpOptions::from_yaml_str("use_pivot: false\nmissing_value: -999\n").unwrap_err();
    assert!(matches!(err, DiagError::ConfigurationConflict(_)));
    assert!(InterpOptions::from_json_str(r#"{"logp": true}"#).is_err());
}

#[test]
fn test_unknown_field_type_is_rejected() {
    assert!(InterpOptions::from_yaml_str("field_type: vorticity\n").is_err());
}

// ============================================================================
// Conflicting options
// ============================================================================

#[test]
fn test_pivot_and_latlon_conflict() {
    let yaml = "use_pivot: true\nlatlon: true\nangle: 90.0\npivot_point: [1.0, 1.0]\n";
    let err = InterpOptions::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, DiagError::ConfigurationConflict(_)));
}

#[test]
fn test_zero_autolevels_rejected() {
    assert!(InterpOptions::from_yaml_str("autolevels: 0\n").is_err());
}

#[test]
fn test_non_finite_angle_rejected() {
    let options = InterpOptions {
        use_pivot: true,
        angle: Some(f64::NAN),
        pivot_point: Some([1.0, 1.0]),
        ..Default::default()
    };
    assert!(options.validate().is_err());
}

// ============================================================================
// Environment
// ============================================================================

#[test]
fn test_env_options() {
    std::env::set_var("INTERP_LOG_P", "true");
    std::env::set_var("INTERP_AUTOLEVELS", "25");
    std::env::set_var("INTERP_FIELD_TYPE", "tk");
    std::env::set_var("INTERP_TIME_INDEX", "ALL");

    let options = InterpOptions::from_env().unwrap();
    assert!(options.log_p);
    assert_eq!(options.autolevels, 25);
    assert_eq!(options.field_type, Some(FieldType::TemperatureK));
    assert_eq!(options.time_index, TimeIndex::All);

    std::env::set_var("INTERP_AUTOLEVELS", "many");
    assert!(InterpOptions::from_env().is_err());

    for key in [
        "INTERP_LOG_P",
        "INTERP_AUTOLEVELS",
        "INTERP_FIELD_TYPE",
        "INTERP_TIME_INDEX",
    ] {
        std::env::remove_var(key);
    }
}
