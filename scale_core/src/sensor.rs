//! Acquisition and filter pipeline: raw conversions → moving average →
//! calibrated grams.
//!
//! The pipeline is not reentrant and must only be driven from the main
//! loop. `read_raw_sample` busy-waits on the converter, so no method here
//! may be called from an interrupt handler.

use scale_traits::SampleSource;
use tracing::{debug, info, trace, warn};

use crate::calibration::CalibrationRecord;
use crate::config::SensorCfg;
use crate::error::ScaleError;
use crate::window::{DEFAULT_WINDOW, SampleWindow};

pub struct WeightSensor<S: SampleSource, const N: usize = DEFAULT_WINDOW> {
    source: S,
    window: SampleWindow<N>,
    calibration: CalibrationRecord,
    cfg: SensorCfg,
}

impl<S: SampleSource, const N: usize> core::fmt::Debug for WeightSensor<S, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeightSensor")
            .field("window", &N)
            .field("samples", &self.window.len())
            .field("calibration", &self.calibration)
            .finish()
    }
}

impl<S: SampleSource, const N: usize> WeightSensor<S, N> {
    /// Wrap a converter with an empty window and factory calibration.
    pub fn new(source: S, cfg: SensorCfg) -> Self {
        Self::with_calibration(source, cfg, CalibrationRecord::default())
    }

    pub fn with_calibration(source: S, cfg: SensorCfg, calibration: CalibrationRecord) -> Self {
        Self {
            source,
            window: SampleWindow::new(),
            calibration,
            cfg,
        }
    }

    pub fn calibration(&self) -> &CalibrationRecord {
        &self.calibration
    }

    pub fn cfg(&self) -> &SensorCfg {
        &self.cfg
    }

    pub fn window(&self) -> &SampleWindow<N> {
        &self.window
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Clear the moving-average window.
    pub fn reset_window(&mut self) {
        self.window.reset();
    }

    pub fn start_conversion(&mut self) {
        self.source.start_conversion();
    }

    pub fn is_data_ready(&mut self) -> bool {
        self.source.is_ready()
    }

    /// One conversion: start, spin until ready, fetch.
    pub fn read_raw_sample(&mut self) -> u16 {
        self.source.start_conversion();
        while !self.source.is_ready() {
            std::hint::spin_loop();
        }
        let raw = self.source.read_result();
        trace!(raw, "adc raw read");
        raw
    }

    /// Read one sample, fold it into the window, return the window mean.
    pub fn filtered_count(&mut self) -> u32 {
        let raw = self.read_raw_sample();
        self.window.push(raw)
    }

    /// Filtered count; same as `filtered_count`.
    pub fn weight_count(&mut self) -> u32 {
        self.filtered_count()
    }

    /// Filtered count expressed in volts at the converter input.
    pub fn voltage(&mut self) -> f32 {
        let count = self.filtered_count();
        count as f32 * self.cfg.vref_volts / self.cfg.resolution.max(1) as f32
    }

    /// Net weight in grams; never negative.
    pub fn weight_grams(&mut self) -> f32 {
        let count = self.filtered_count();
        self.calibration.net_grams(count)
    }

    /// Use the current filtered count as the new zero reference.
    pub fn tare(&mut self) {
        let count = self.filtered_count();
        self.calibration.tare_value = count;
        debug!(tare = count, "tare captured");
    }

    /// Average `zero_samples` raw conversions into the zero point (and tare).
    ///
    /// Costs `zero_samples` blocking conversions.
    pub fn calibrate_zero(&mut self) {
        let samples = self.cfg.zero_samples.max(1);
        let mut sum: u64 = 0;
        for _ in 0..samples {
            sum += u64::from(self.read_raw_sample());
        }
        let zero = (sum / u64::from(samples)) as u32;
        self.calibration.zero_point = zero;
        self.calibration.tare_value = zero;
        info!(zero_point = zero, samples, "zero calibration complete");
    }

    /// Derive grams-per-count from `known_grams` currently on the platform.
    ///
    /// A zero reference weight is rejected before any sample is taken; a
    /// reading at or below the zero point is rejected after it. Either way
    /// the calibration record is left as it was.
    pub fn calibrate_full_scale(&mut self, known_grams: u32) -> Result<(), ScaleError> {
        if known_grams == 0 {
            warn!("full-scale calibration ignored: zero reference weight");
            return Err(ScaleError::ZeroReferenceWeight);
        }
        let count = self.filtered_count();
        match self.calibration.apply_full_scale(count, known_grams) {
            Ok(()) => {
                info!(
                    known_grams,
                    full_scale_count = count,
                    scale_factor = self.calibration.scale_factor,
                    "full-scale calibration complete"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "full-scale calibration rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedAdc;

    fn sensor<const N: usize>(adc: ScriptedAdc) -> WeightSensor<ScriptedAdc, N> {
        WeightSensor::new(adc, SensorCfg::default())
    }

    #[test]
    fn read_raw_sample_waits_for_ready() {
        let adc = ScriptedAdc::new(1234).busy_polls(4);
        let stats = adc.stats();
        let mut s = sensor::<4>(adc);
        assert_eq!(s.read_raw_sample(), 1234);
        assert_eq!(stats.conversions(), 1);
        assert_eq!(stats.busy_polls(), 4);
    }

    #[test]
    fn voltage_scales_by_reference() {
        let mut s = sensor::<1>(ScriptedAdc::new(8192));
        assert!((s.voltage() - 1.024).abs() < 1e-6);
    }

    #[test]
    fn zero_calibration_averages_raw_samples() {
        let adc = ScriptedAdc::with_script([100, 102, 104, 106], 0);
        let cfg = SensorCfg {
            zero_samples: 4,
            ..SensorCfg::default()
        };
        let mut s: WeightSensor<_, 8> = WeightSensor::new(adc, cfg);
        s.calibrate_zero();
        assert_eq!(s.calibration().zero_point, 103);
        assert_eq!(s.calibration().tare_value, 103);
        // raw reads bypass the window
        assert!(s.window().is_empty());
    }

    #[test]
    fn zero_reference_takes_no_sample() {
        let adc = ScriptedAdc::new(5000);
        let stats = adc.stats();
        let mut s = sensor::<1>(adc);
        assert_eq!(s.calibrate_full_scale(0), Err(ScaleError::ZeroReferenceWeight));
        assert_eq!(stats.conversions(), 0);
    }
}
