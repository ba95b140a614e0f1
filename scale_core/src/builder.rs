//! Builder for `ScaleCore`.
//!
//! Collaborators are required; every configuration section falls back to
//! its default. All validation happens in one place, `validate_and_build`.

use std::sync::Arc;

use scale_traits::{Buzzer, Clock, SampleSource};

use crate::calibration::CalibrationRecord;
use crate::clock::{Interval, SystemTimer};
use crate::config::{ScaleCfg, SensorCfg, ToneCfg};
use crate::core::ScaleCore;
use crate::error::{BuildError, Result};
use crate::sensor::WeightSensor;
use crate::state::ScaleState;
use crate::window::DEFAULT_WINDOW;

/// Builder for `ScaleCore`. All fields are validated on `try_build()`.
pub struct ScaleBuilder<S, B, const N: usize = DEFAULT_WINDOW> {
    source: Option<S>,
    buzzer: Option<B>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    sensor: Option<SensorCfg>,
    scale: Option<ScaleCfg>,
    tones: Option<ToneCfg>,
    calibration: Option<CalibrationRecord>,
}

impl<S, B> Default for ScaleBuilder<S, B, DEFAULT_WINDOW> {
    fn default() -> Self {
        Self {
            source: None,
            buzzer: None,
            clock: None,
            sensor: None,
            scale: None,
            tones: None,
            calibration: None,
        }
    }
}

impl<S, B> ScaleBuilder<S, B, DEFAULT_WINDOW> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: SampleSource, B: Buzzer> ScaleCore<S, B, DEFAULT_WINDOW> {
    /// Start building a scale.
    pub fn builder() -> ScaleBuilder<S, B, DEFAULT_WINDOW> {
        ScaleBuilder::default()
    }
}

impl<S, B, const N: usize> ScaleBuilder<S, B, N> {
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }
    pub fn with_buzzer(mut self, buzzer: B) -> Self {
        self.buzzer = Some(buzzer);
        self
    }
    /// Share a time base with the timer source; defaults to a fresh `SystemTimer`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    pub fn with_sensor_cfg(mut self, sensor: SensorCfg) -> Self {
        self.sensor = Some(sensor);
        self
    }
    pub fn with_scale_cfg(mut self, scale: ScaleCfg) -> Self {
        self.scale = Some(scale);
        self
    }
    pub fn with_tones(mut self, tones: ToneCfg) -> Self {
        self.tones = Some(tones);
        self
    }
    pub fn with_calibration(mut self, calibration: CalibrationRecord) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Apply the sensor, scale and tone sections of a loaded config file.
    pub fn with_config(self, cfg: &scale_config::Config) -> Self {
        self.with_sensor_cfg((&cfg.sensor).into())
            .with_scale_cfg((&cfg.scale).into())
            .with_tones((&cfg.tones).into())
    }

    /// Change the moving-average window length.
    pub fn with_window<const M: usize>(self) -> ScaleBuilder<S, B, M> {
        ScaleBuilder {
            source: self.source,
            buzzer: self.buzzer,
            clock: self.clock,
            sensor: self.sensor,
            scale: self.scale,
            tones: self.tones,
            calibration: self.calibration,
        }
    }
}

impl<S: SampleSource, B: Buzzer, const N: usize> ScaleBuilder<S, B, N> {
    /// Fallible build; returns a `BuildError` for missing or invalid pieces.
    pub fn try_build(self) -> Result<ScaleCore<S, B, N>> {
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        let buzzer = self
            .buzzer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBuzzer))?;
        validate_and_build(
            source,
            buzzer,
            self.clock,
            self.sensor.unwrap_or_default(),
            self.scale.unwrap_or_default(),
            self.tones.unwrap_or_default(),
            self.calibration.unwrap_or_default(),
        )
    }
}

/// Build a statically-dispatched `ScaleCore` from concrete collaborators.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_scale<S, B, const N: usize>(
    source: S,
    buzzer: B,
    clock: Arc<dyn Clock + Send + Sync>,
    sensor: SensorCfg,
    scale: ScaleCfg,
    tones: ToneCfg,
) -> Result<ScaleCore<S, B, N>>
where
    S: SampleSource,
    B: Buzzer,
{
    validate_and_build(
        source,
        buzzer,
        Some(clock),
        sensor,
        scale,
        tones,
        CalibrationRecord::default(),
    )
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_and_build<S: SampleSource, B: Buzzer, const N: usize>(
    source: S,
    buzzer: B,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    sensor: SensorCfg,
    scale: ScaleCfg,
    tones: ToneCfg,
    calibration: CalibrationRecord,
) -> Result<ScaleCore<S, B, N>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if !(sensor.vref_volts.is_finite() && sensor.vref_volts > 0.0) {
        return Err(invalid("vref_volts must be > 0"));
    }
    if sensor.resolution == 0 {
        return Err(invalid("resolution must be >= 1"));
    }
    if sensor.zero_samples == 0 {
        return Err(invalid("zero_samples must be >= 1"));
    }
    if !(scale.overweight_limit_g.is_finite() && scale.overweight_limit_g > 0.0) {
        return Err(invalid("overweight_limit_g must be > 0"));
    }
    if scale.overweight_check_ms == 0 {
        return Err(invalid("overweight_check_ms must be >= 1"));
    }
    if scale.refresh_ms == 0 {
        return Err(invalid("refresh_ms must be >= 1"));
    }
    if !scale.activity_threshold_g.is_finite() || scale.activity_threshold_g.is_sign_negative() {
        return Err(invalid("activity_threshold_g must be >= 0"));
    }
    if scale.inactivity_timeout_ms == 0 {
        return Err(invalid("inactivity_timeout_ms must be >= 1"));
    }
    if !calibration.scale_factor.is_finite() || calibration.scale_factor.is_sign_negative() {
        return Err(invalid("scale_factor must be finite and >= 0"));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => c,
        None => Arc::new(SystemTimer::default()),
    };
    let now = clock.now_ms();

    Ok(ScaleCore {
        sensor: WeightSensor::with_calibration(source, sensor, calibration),
        buzzer,
        state: ScaleState::new(scale.overweight_mode, now),
        refresh: Interval::new(scale.refresh_ms, now),
        clock,
        cfg: scale,
        tones,
        stable_weight_g: 0.0,
    })
}
