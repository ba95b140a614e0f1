#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the weighing scale.
//!
//! - `Config` and its sections are deserialized from TOML; every section
//!   and every key falls back to the documented default when absent.
//! - `Config::validate` rejects values the core cannot run with.
//!
//! Calibration values are deliberately absent: they are volatile and reset
//! to factory defaults on every start.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorCfg {
    /// Converter reference voltage (V).
    pub vref_volts: f32,
    /// Converter code span (2^bits).
    pub resolution: u32,
    /// Raw samples averaged by zero calibration.
    pub zero_samples: u16,
    /// Run zero calibration once at startup.
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

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverweightMode {
    /// Poll the weight on a fixed cadence and sound the alarm while over the limit.
    #[default]
    Realtime,
    /// Only check when Tare/Measure is pressed; block the key when over the limit.
    Keycheck,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScaleCfg {
    pub overweight_limit_g: f32,
    pub overweight_mode: OverweightMode,
    /// Real-time overweight polling period (ms).
    pub overweight_check_ms: u32,
    /// Display refresh / activity detection period (ms).
    pub refresh_ms: u32,
    /// Weight change (g) that counts as user activity.
    pub activity_threshold_g: f32,
    /// Idle time (ms) before the screen drops to standby.
    pub inactivity_timeout_ms: u32,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            overweight_limit_g: 1000.0,
            overweight_mode: OverweightMode::Realtime,
            overweight_check_ms: 1000,
            refresh_ms: 100,
            activity_threshold_g: 5.0,
            inactivity_timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimerCfg {
    /// Period of the millisecond-advance interrupt in microseconds.
    pub period_us: u32,
}

impl Default for TimerCfg {
    fn default() -> Self {
        Self { period_us: 62_500 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
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
    fn entries(&self) -> [(&'static str, u32); 7] {
        [
            ("confirm_ms", self.confirm_ms),
            ("ignored_ms", self.ignored_ms),
            ("start_ms", self.start_ms),
            ("stop_ms", self.stop_ms),
            ("calib_ms", self.calib_ms),
            ("power_ms", self.power_ms),
            ("boot_ms", self.boot_ms),
        ]
    }
}

/// Physical key channel assigned to each function.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KeysCfg {
    pub tare: u8,
    pub calib: u8,
    pub measure: u8,
    pub power: u8,
}

impl Default for KeysCfg {
    fn default() -> Self {
        Self {
            tare: 0,
            calib: 1,
            measure: 2,
            power: 3,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub scale: ScaleCfg,
    pub timer: TimerCfg,
    pub tones: ToneCfg,
    pub keys: KeysCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if !(self.sensor.vref_volts.is_finite() && self.sensor.vref_volts > 0.0) {
            eyre::bail!("sensor.vref_volts must be > 0");
        }
        if self.sensor.resolution == 0 {
            eyre::bail!("sensor.resolution must be >= 1");
        }
        if self.sensor.zero_samples == 0 {
            eyre::bail!("sensor.zero_samples must be >= 1");
        }

        // Scale
        if !(self.scale.overweight_limit_g.is_finite() && self.scale.overweight_limit_g > 0.0) {
            eyre::bail!("scale.overweight_limit_g must be > 0");
        }
        if self.scale.overweight_check_ms == 0 {
            eyre::bail!("scale.overweight_check_ms must be >= 1");
        }
        if self.scale.refresh_ms == 0 {
            eyre::bail!("scale.refresh_ms must be >= 1");
        }
        if !self.scale.activity_threshold_g.is_finite()
            || self.scale.activity_threshold_g.is_sign_negative()
        {
            eyre::bail!("scale.activity_threshold_g must be >= 0");
        }
        if self.scale.inactivity_timeout_ms == 0 {
            eyre::bail!("scale.inactivity_timeout_ms must be >= 1");
        }

        // Timer
        if self.timer.period_us == 0 {
            eyre::bail!("timer.period_us must be >= 1");
        }

        // Tones
        for (name, ms) in self.tones.entries() {
            if ms > 5_000 {
                eyre::bail!("tones.{name} is unreasonably long (>5s)");
            }
        }

        // Keys
        let channels = [
            self.keys.tare,
            self.keys.calib,
            self.keys.measure,
            self.keys.power,
        ];
        for (i, a) in channels.iter().enumerate() {
            if channels[i + 1..].contains(a) {
                eyre::bail!("keys: channel {a} is assigned to more than one key");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}
