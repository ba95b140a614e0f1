use crate::error::ScaleError;

/// Zero point, tare and count-to-grams factor of the load cell.
///
/// grams = scale_factor * (count - tare_value), clamped at 0.
///
/// Values are volatile: every start begins from `CalibrationRecord::default()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    /// No-load baseline count from zero calibration.
    pub zero_point: u32,
    /// Filtered count observed at the last full-scale calibration.
    pub full_scale_count: u32,
    /// Grams per count; only full-scale calibration changes it, never negative.
    pub scale_factor: f32,
    /// Count subtracted before scaling (tare reference).
    pub tare_value: u32,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        // Factory values: 14-bit span mapped onto ~1 kg
        Self {
            zero_point: 0,
            full_scale_count: 16_383,
            scale_factor: 0.061,
            tare_value: 0,
        }
    }
}

impl CalibrationRecord {
    /// Net weight for a filtered count. Counts at or below tare read 0 g.
    pub fn net_grams(&self, count: u32) -> f32 {
        let net = i64::from(count) - i64::from(self.tare_value);
        if net <= 0 {
            return 0.0;
        }
        net as f32 * self.scale_factor
    }

    /// Derive the scale factor from a count taken with `known_grams` applied.
    ///
    /// Leaves the record untouched on error.
    pub fn apply_full_scale(&mut self, count: u32, known_grams: u32) -> Result<(), ScaleError> {
        if known_grams == 0 {
            return Err(ScaleError::ZeroReferenceWeight);
        }
        let effective = i64::from(count) - i64::from(self.zero_point);
        if effective <= 0 {
            return Err(ScaleError::NoLoadApplied {
                count,
                zero_point: self.zero_point,
            });
        }
        self.full_scale_count = count;
        self.scale_factor = known_grams as f32 / effective as f32;
        Ok(())
    }
}
