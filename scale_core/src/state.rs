//! Operating state of the scale, read by display and alarm collaborators.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    /// Showing weight and status.
    #[default]
    Active,
    /// Blank or minimal standby screen after the inactivity timeout.
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverweightMode {
    /// Poll weight on a fixed cadence and alarm while over the limit.
    #[default]
    RealTime,
    /// Check only when Tare or Measure is pressed and block the key if over.
    KeyCheck,
}

/// Single shared view of the scale's mode.
///
/// `current_weight_g` is 0 whenever `is_measuring` is false.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaleState {
    pub is_measuring: bool,
    pub current_weight_g: f32,
    pub screen: ScreenState,
    pub overweight_mode: OverweightMode,
    /// Whether the continuous overweight alarm is sounding.
    pub alarm_active: bool,
    /// Millisecond timestamp of the last key press or significant weight change.
    pub last_activity_ms: u32,
    /// Millisecond timestamp of the last real-time overweight poll.
    pub last_overweight_check_ms: u32,
}

impl ScaleState {
    pub fn new(overweight_mode: OverweightMode, now_ms: u32) -> Self {
        Self {
            overweight_mode,
            last_activity_ms: now_ms,
            last_overweight_check_ms: now_ms,
            ..Self::default()
        }
    }
}
