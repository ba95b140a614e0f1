//! Peripheral backends for the scale core.
//!
//! Only simulated peripherals live here; register-level drivers for a
//! specific MCU plug in through the same `scale_traits` seams.
pub mod error;
pub mod sim;

pub use sim::{SimAdcCfg, SimulatedAdc, SimulatedBuzzer, SimulatedLoad};
