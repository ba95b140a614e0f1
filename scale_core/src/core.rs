//! The scale state machine.
//!
//! `ScaleCore` owns the weight sensor, the buzzer and the operating state,
//! and shares the clock with the timer source. Two event sources drive it:
//! `poll()` from the main loop and `on_key()` from the key router.

use std::sync::Arc;

use scale_traits::{Buzzer, Clock, Key, KeyHandler, SampleSource};
use tracing::{debug, info, trace, warn};

use crate::clock::Interval;
use crate::config::{ScaleCfg, Tone, ToneCfg};
use crate::hw_error::map_peripheral_error;
use crate::sensor::WeightSensor;
use crate::state::{OverweightMode, ScaleState, ScreenState};
use crate::window::DEFAULT_WINDOW;

pub struct ScaleCore<S: SampleSource, B: Buzzer, const N: usize = DEFAULT_WINDOW> {
    pub(crate) sensor: WeightSensor<S, N>,
    pub(crate) buzzer: B,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) cfg: ScaleCfg,
    pub(crate) tones: ToneCfg,
    pub(crate) state: ScaleState,
    // Display refresh / activity cadence
    pub(crate) refresh: Interval,
    // Baseline for activity detection (g)
    pub(crate) stable_weight_g: f32,
}

impl<S: SampleSource, B: Buzzer, const N: usize> core::fmt::Debug for ScaleCore<S, B, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScaleCore")
            .field("state", &self.state)
            .field("now_ms", &self.clock.now_ms())
            .field("sensor", &self.sensor)
            .finish()
    }
}

impl<S: SampleSource, B: Buzzer, const N: usize> ScaleCore<S, B, N> {
    pub fn state(&self) -> &ScaleState {
        &self.state
    }

    pub fn cfg(&self) -> &ScaleCfg {
        &self.cfg
    }

    pub fn sensor(&self) -> &WeightSensor<S, N> {
        &self.sensor
    }

    /// Direct access to the pipeline, e.g. for a calibration procedure.
    pub fn sensor_mut(&mut self) -> &mut WeightSensor<S, N> {
        &mut self.sensor
    }

    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Bring the scale up: optional auto-zero, fresh timers, boot tone.
    pub fn start(&mut self) {
        if self.sensor.cfg().auto_zero {
            self.sensor.calibrate_zero();
        }
        let now = self.clock.now_ms();
        self.state.last_activity_ms = now;
        self.state.last_overweight_check_ms = now;
        self.refresh = Interval::new(self.cfg.refresh_ms, now);
        info!(
            mode = ?self.state.overweight_mode,
            limit_g = self.cfg.overweight_limit_g,
            "scale started"
        );
        self.emit(Tone::Boot);
    }

    pub fn set_overweight_mode(&mut self, mode: OverweightMode) {
        if self.state.overweight_mode != mode {
            debug!(?mode, "overweight mode changed");
        }
        self.state.overweight_mode = mode;
    }

    pub fn reset_inactivity_timer(&mut self) {
        self.state.last_activity_ms = self.clock.now_ms();
    }

    /// Milliseconds since the last key press or significant weight change.
    pub fn inactivity_ms(&self) -> u32 {
        self.clock.elapsed_ms(self.state.last_activity_ms)
    }

    pub fn is_inactive(&self) -> bool {
        self.inactivity_ms() > self.cfg.inactivity_timeout_ms
    }

    /// One main-loop iteration.
    ///
    /// Advances the tick counter; on the refresh cadence updates the shown
    /// weight, activity and screen state; then runs the real-time overweight
    /// poll (which keeps its own cadence).
    pub fn poll(&mut self) {
        self.clock.tick();
        if self.refresh.poll(&*self.clock) {
            self.update_weight_display();
            self.check_weight_activity();
            self.check_inactivity_timeout();
        }
        self.overweight_check_real_time();
    }

    /// Refresh `current_weight_g`: live weight while measuring, else 0.
    pub fn update_weight_display(&mut self) {
        self.state.current_weight_g = if self.state.is_measuring {
            self.sensor.weight_grams()
        } else {
            0.0
        };
        trace!(weight_g = self.state.current_weight_g, "display refresh");
    }

    /// Sound the continuous overweight alarm (idempotent).
    pub fn trigger_alarm(&mut self) {
        if !self.state.alarm_active {
            warn!(limit_g = self.cfg.overweight_limit_g, "overweight alarm on");
        }
        self.state.alarm_active = true;
        if let Err(e) = self.buzzer.start() {
            warn!(error = %map_peripheral_error(&*e), "buzzer start failed");
        }
    }

    pub fn stop_alarm(&mut self) {
        if self.state.alarm_active {
            info!("overweight alarm off");
        }
        self.state.alarm_active = false;
        if let Err(e) = self.buzzer.stop() {
            warn!(error = %map_peripheral_error(&*e), "buzzer stop failed");
        }
    }

    /// Periodic overweight poll; does nothing until the check interval elapsed.
    ///
    /// Only compares weight in real-time mode while measuring, but the check
    /// timestamp advances every elapsed interval regardless.
    pub fn overweight_check_real_time(&mut self) {
        if self.clock.elapsed_ms(self.state.last_overweight_check_ms) < self.cfg.overweight_check_ms
        {
            return;
        }
        if self.state.overweight_mode == OverweightMode::RealTime && self.state.is_measuring {
            let weight = self.sensor.weight_grams();
            trace!(weight_g = weight, "overweight poll");
            if weight > self.cfg.overweight_limit_g {
                self.trigger_alarm();
            } else {
                self.stop_alarm();
            }
        }
        self.state.last_overweight_check_ms = self.clock.now_ms();
    }

    /// Key-press overweight check. Returns true (blocked) when over the limit.
    ///
    /// Starts the alarm when blocked, stops it otherwise.
    pub fn overweight_check_on_key_press(&mut self) -> bool {
        let weight = self.sensor.weight_grams();
        if weight > self.cfg.overweight_limit_g {
            self.trigger_alarm();
            return true;
        }
        self.stop_alarm();
        false
    }

    /// Treat a weight swing beyond the activity threshold as user activity.
    pub fn check_weight_activity(&mut self) {
        let weight = self.sensor.weight_grams();
        if (weight - self.stable_weight_g).abs() > self.cfg.activity_threshold_g {
            trace!(
                from_g = self.stable_weight_g,
                to_g = weight,
                "weight activity"
            );
            self.reset_inactivity_timer();
            self.stable_weight_g = weight;
        }
    }

    /// Standby once idle longer than the timeout, active otherwise.
    pub fn check_inactivity_timeout(&mut self) {
        let screen = if self.is_inactive() {
            ScreenState::Standby
        } else {
            ScreenState::Active
        };
        if screen != self.state.screen {
            debug!(?screen, idle_ms = self.inactivity_ms(), "screen state changed");
        }
        self.state.screen = screen;
    }

    /// React to a front-panel key. Every key counts as activity.
    pub fn handle_key(&mut self, key: Key) {
        self.reset_inactivity_timer();
        debug!(key = key.name(), "key");
        match key {
            Key::Tare => self.on_tare(),
            Key::Calib => self.emit(Tone::Calib),
            Key::Measure => self.on_measure(),
            // reserved: acknowledge only
            Key::Power => self.emit(Tone::Power),
        }
    }

    fn key_check_blocks(&mut self) -> bool {
        self.state.overweight_mode == OverweightMode::KeyCheck
            && self.overweight_check_on_key_press()
    }

    fn on_tare(&mut self) {
        if !self.state.is_measuring {
            debug!("tare ignored: not measuring");
            self.emit(Tone::Ignored);
            return;
        }
        if self.key_check_blocks() {
            debug!("tare rejected: overweight");
            self.emit(Tone::Ignored);
            return;
        }
        self.sensor.tare();
        self.emit(Tone::Confirm);
    }

    fn on_measure(&mut self) {
        if self.key_check_blocks() {
            debug!("measure toggle rejected: overweight");
            self.emit(Tone::Ignored);
            return;
        }
        self.state.is_measuring = !self.state.is_measuring;
        if self.state.is_measuring {
            info!("measuring started");
            self.emit(Tone::MeasureStart);
        } else {
            info!("measuring stopped");
            self.state.current_weight_g = 0.0;
            self.emit(Tone::MeasureStop);
            self.stop_alarm();
        }
    }

    fn emit(&mut self, tone: Tone) {
        let duration = self.tones.duration(tone);
        if let Err(e) = self.buzzer.beep(duration) {
            warn!(error = %map_peripheral_error(&*e), ?tone, "beep failed");
        }
    }
}

impl<S: SampleSource, B: Buzzer, const N: usize> KeyHandler for ScaleCore<S, B, N> {
    fn on_key(&mut self, key: Key) {
        self.handle_key(key);
    }

    fn on_activity(&mut self) {
        self.reset_inactivity_timer();
    }
}
