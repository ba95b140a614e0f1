//! Configuration types for the scale engine.
//!
//! These are the runtime configuration structs used by `ScaleCore`.
//! They are separate from the TOML-deserialized config in `scale_config`.

use crate::state::OverweightMode;
use std::time::Duration;

/// Converter and zero-calibration parameters.
#[derive(Debug, Clone)]
pub struct SensorCfg {
    /// Reference voltage (V) used by `voltage()`.
    pub vref_volts: f32,
    /// Converter code span (14-bit: 16384).
    pub resolution: u32,
    /// Raw samples averaged by `calibrate_zero`.
    pub zero_samples: u16,
    /// Run zero calibration once when the scale starts.
    pub auto_zero: bool,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            vref_volts: 2.048,
            resolution: 16_384,
            zero_samples: 100,
            auto_zero: true,
        }
    }
}

/// Limits and cadences of the scale state machine.
#[derive(Debug, Clone)]
pub struct ScaleCfg {
    /// Weight above which the scale is overweight (g).
    pub overweight_limit_g: f32,
    pub overweight_mode: OverweightMode,
    /// Real-time overweight polling period (ms).
    pub overweight_check_ms: u32,
    /// Display refresh, activity and inactivity cadence (ms).
    pub refresh_ms: u32,
    /// Weight change (g) treated as user activity. Default: 5 g.
    pub activity_threshold_g: f32,
    /// Idle time before standby (ms). Default: 60 s.
    pub inactivity_timeout_ms: u32,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            overweight_limit_g: 1000.0,
            overweight_mode: OverweightMode::RealTime,
            overweight_check_ms: 1000,
            refresh_ms: 100,
            activity_threshold_g: 5.0,
            inactivity_timeout_ms: 60_000,
        }
    }
}

/// Audible cue emitted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Tare accepted.
    Confirm,
    /// Key ignored or rejected (not measuring, overweight).
    Ignored,
    /// Measuring started (long).
    MeasureStart,
    /// Measuring stopped (short).
    MeasureStop,
    Calib,
    Power,
    Boot,
}

/// Tone durations (ms).
#[derive(Debug, Clone)]
pub struct ToneCfg {
    pub confirm_ms: u32,
    pub ignored_ms: u32,
    pub start_ms: u32,
    pub stop_ms: u32,
    pub calib_ms: u32,
    pub power_ms: u32,
    pub boot_ms: u32,
}

impl Default for ToneCfg {
    fn default() -> Self {
        Self {
            confirm_ms: 50,
            ignored_ms: 20,
            start_ms: 100,
            stop_ms: 30,
            calib_ms: 100,
            power_ms: 80,
            boot_ms: 100,
        }
    }
}

impl ToneCfg {
    pub fn duration(&self, tone: Tone) -> Duration {
        let ms = match tone {
            Tone::Confirm => self.confirm_ms,
            Tone::Ignored => self.ignored_ms,
            Tone::MeasureStart => self.start_ms,
            Tone::MeasureStop => self.stop_ms,
            Tone::Calib => self.calib_ms,
            Tone::Power => self.power_ms,
            Tone::Boot => self.boot_ms,
        };
        Duration::from_millis(u64::from(ms))
    }
}
