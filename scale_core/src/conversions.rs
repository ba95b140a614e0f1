//! `From` implementations bridging `scale_config` types to `scale_core` types.

use crate::config::{ScaleCfg, SensorCfg, ToneCfg};
use crate::router::KeyMap;
use crate::state::OverweightMode;

// ── SensorCfg ────────────────────────────────────────────────────────────────

impl From<&scale_config::SensorCfg> for SensorCfg {
    fn from(c: &scale_config::SensorCfg) -> Self {
        Self {
            vref_volts: c.vref_volts,
            resolution: c.resolution,
            zero_samples: c.zero_samples,
            auto_zero: c.auto_zero,
        }
    }
}

// ── ScaleCfg ─────────────────────────────────────────────────────────────────

impl From<scale_config::OverweightMode> for OverweightMode {
    fn from(m: scale_config::OverweightMode) -> Self {
        match m {
            scale_config::OverweightMode::Realtime => OverweightMode::RealTime,
            scale_config::OverweightMode::Keycheck => OverweightMode::KeyCheck,
        }
    }
}

impl From<&scale_config::ScaleCfg> for ScaleCfg {
    fn from(c: &scale_config::ScaleCfg) -> Self {
        Self {
            overweight_limit_g: c.overweight_limit_g,
            overweight_mode: c.overweight_mode.into(),
            overweight_check_ms: c.overweight_check_ms,
            refresh_ms: c.refresh_ms,
            activity_threshold_g: c.activity_threshold_g,
            inactivity_timeout_ms: c.inactivity_timeout_ms,
        }
    }
}

// ── ToneCfg ──────────────────────────────────────────────────────────────────

impl From<&scale_config::ToneCfg> for ToneCfg {
    fn from(c: &scale_config::ToneCfg) -> Self {
        Self {
            confirm_ms: c.confirm_ms,
            ignored_ms: c.ignored_ms,
            start_ms: c.start_ms,
            stop_ms: c.stop_ms,
            calib_ms: c.calib_ms,
            power_ms: c.power_ms,
            boot_ms: c.boot_ms,
        }
    }
}

// ── KeyMap ───────────────────────────────────────────────────────────────────

impl From<&scale_config::KeysCfg> for KeyMap {
    fn from(c: &scale_config::KeysCfg) -> Self {
        Self {
            tare: c.tare,
            calib: c.calib,
            measure: c.measure,
            power: c.power,
        }
    }
}
