pub mod clock;

pub use clock::{Clock, elapsed_since};

/// Analog-to-digital converter feeding the load cell amplifier output.
///
/// Mirrors the converter's register protocol: kick off a conversion, poll
/// the completion flag, then fetch the result (which also clears the flag).
pub trait SampleSource {
    fn start_conversion(&mut self);
    fn is_ready(&mut self) -> bool;
    fn read_result(&mut self) -> u16;
}

/// Audible tone output.
pub trait Buzzer {
    /// Sound for `duration`, then fall silent.
    fn beep(
        &mut self,
        duration: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Sound continuously until `stop` is called.
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Semantic identity of a front-panel key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tare,
    Calib,
    Measure,
    Power,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Tare, Key::Calib, Key::Measure, Key::Power];

    pub fn name(self) -> &'static str {
        match self {
            Key::Tare => "tare",
            Key::Calib => "calib",
            Key::Measure => "measure",
            Key::Power => "power",
        }
    }
}

/// Receiver of key presses, registered once at startup.
pub trait KeyHandler {
    fn on_key(&mut self, key: Key);

    /// Any press, including one on a channel with no key assigned.
    fn on_activity(&mut self) {}
}
