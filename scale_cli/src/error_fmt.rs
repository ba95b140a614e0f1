//! Human-readable error descriptions and structured JSON error formatting.

use scale_core::error::{BuildError, ScaleError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No sample source was provided to the scale.\nLikely causes: The converter failed to initialize or was not wired into the builder.\nHow to fix: Ensure the ADC is created successfully and passed via with_source(...).".to_string()
            }
            BuildError::MissingBuzzer => {
                "What happened: No buzzer was provided to the scale.\nLikely causes: The PWM output failed to initialize or was not wired into the builder.\nHow to fix: Ensure the buzzer is created successfully and passed via with_buzzer(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/scale_config.toml for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::ZeroReferenceWeight => {
                "What happened: Calibration needs a reference weight above 0 g.\nLikely causes: --known-grams was 0.\nHow to fix: Pass the mass of the calibration weight, e.g. `scale calibrate --known-grams 500`.".to_string()
            }
            ScaleError::NoLoadApplied { count, zero_point } => format!(
                "What happened: Calibration saw no load (count {count}, zero point {zero_point}).\nLikely causes: The reference weight was not on the platform, or zeroing ran with a load on it.\nHow to fix: Empty the platform, zero again, then place the reference weight and retry."
            ),
            ScaleError::Peripheral(msg) | ScaleError::PeripheralFault(msg) => format!(
                "What happened: Peripheral error ({msg}).\nLikely causes: Buzzer or converter not responding.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }

    if lower.starts_with("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this scale.\nLikely causes: A typo, a wrong value type, or an unknown overweight_mode.\nHow to fix: Compare with etc/scale_config.toml. Original: {msg}"
        );
    }

    if lower.starts_with("calibration:") {
        return format!(
            "What happened: The reference weight is outside the converter's range.\nLikely causes: --known-grams heavier than the platform's full scale.\nHow to fix: Calibrate with a lighter reference weight. Original: {msg}"
        );
    }

    if ["sensor.", "scale.", "timer.", "tones.", "keys:", "logging."]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values or duplicate key channels.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 calibration rejected, 4 peripheral, 5 build, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::ZeroReferenceWeight | ScaleError::NoLoadApplied { .. } => 3,
            ScaleError::Peripheral(_) | ScaleError::PeripheralFault(_) => 4,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 5;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::ZeroReferenceWeight => "ZeroReferenceWeight",
            ScaleError::NoLoadApplied { .. } => "NoLoadApplied",
            ScaleError::Peripheral(_) => "Peripheral",
            ScaleError::PeripheralFault(_) => "PeripheralFault",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(ScaleError::NoLoadApplied { count, zero_point }) = err.downcast_ref::<ScaleError>()
    {
        return json!({
            "reason": reason_name(err),
            "details": { "count": count, "zero_point": zero_point },
            "message": humanize(err),
        })
        .to_string();
    }

    json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
