use rstest::rstest;
use scale_config::{OverweightMode, load_file, load_toml};
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_document_yields_documented_defaults() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.sensor.zero_samples, 100);
    assert_eq!(cfg.sensor.resolution, 16_384);
    assert!((cfg.sensor.vref_volts - 2.048).abs() < f32::EPSILON);
    assert_eq!(cfg.scale.overweight_mode, OverweightMode::Realtime);
    assert_eq!(cfg.scale.inactivity_timeout_ms, 60_000);
    assert_eq!(cfg.scale.refresh_ms, 100);
    assert_eq!(cfg.timer.period_us, 62_500);
    assert_eq!(cfg.tones.ignored_ms, 20);
    assert_eq!(
        (cfg.keys.tare, cfg.keys.calib, cfg.keys.measure, cfg.keys.power),
        (0, 1, 2, 3)
    );
}

#[test]
fn parses_keycheck_mode_and_partial_sections() {
    let toml = r#"
[scale]
overweight_limit_g = 500.0
overweight_mode = "keycheck"

[tones]
confirm_ms = 60
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.scale.overweight_mode, OverweightMode::Keycheck);
    assert_eq!(cfg.scale.overweight_limit_g, 500.0);
    // untouched keys in a present section still default
    assert_eq!(cfg.scale.activity_threshold_g, 5.0);
    assert_eq!(cfg.tones.confirm_ms, 60);
    assert_eq!(cfg.tones.stop_ms, 30);
}

#[test]
fn rejects_unknown_overweight_mode() {
    let toml = r#"
[scale]
overweight_mode = "sometimes"
"#;
    assert!(load_toml(toml).is_err());
}

#[rstest]
#[case("[sensor]\nzero_samples = 0", "sensor.zero_samples must be >= 1")]
#[case("[sensor]\nvref_volts = 0.0", "sensor.vref_volts must be > 0")]
#[case("[sensor]\nresolution = 0", "sensor.resolution must be >= 1")]
#[case("[scale]\noverweight_limit_g = -1.0", "scale.overweight_limit_g must be > 0")]
#[case("[scale]\noverweight_check_ms = 0", "scale.overweight_check_ms must be >= 1")]
#[case("[scale]\nrefresh_ms = 0", "scale.refresh_ms must be >= 1")]
#[case("[scale]\nactivity_threshold_g = -0.5", "scale.activity_threshold_g must be >= 0")]
#[case("[scale]\ninactivity_timeout_ms = 0", "scale.inactivity_timeout_ms must be >= 1")]
#[case("[timer]\nperiod_us = 0", "timer.period_us must be >= 1")]
#[case("[tones]\nstart_ms = 9000", "tones.start_ms is unreasonably long")]
#[case("[keys]\ntare = 2", "keys: channel 2 is assigned to more than one key")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] expected: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(expected),
        "unexpected message: {err}"
    );
}

#[test]
fn load_file_parses_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, "[scale]\noverweight_limit_g = 750.0\n").unwrap();
    let cfg = load_file(&good).expect("load good config");
    assert_eq!(cfg.scale.overweight_limit_g, 750.0);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[timer]\nperiod_us = 0\n").unwrap();
    let err = load_file(&bad).expect_err("invalid config");
    assert!(format!("{err}").contains("timer.period_us"));

    let missing = dir.path().join("missing.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
