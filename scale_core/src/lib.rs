#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core weighing logic (hardware-agnostic).
//!
//! All peripheral access goes through the `scale_traits::SampleSource` and
//! `scale_traits::Buzzer` traits; time comes from a shared `Clock`.
//!
//! ## Architecture
//!
//! - **Time base**: wrap-safe millisecond counter and interval helper (`clock`)
//! - **Filtering**: fixed-size moving average over raw counts (`window`)
//! - **Calibration**: zero point, tare and grams-per-count (`calibration`)
//! - **Pipeline**: converter → window → grams (`sensor`)
//! - **State machine**: measuring, overweight alarm, standby (`core`)
//! - **Keys**: channel map and dispatch to a `KeyHandler` (`router`)

pub mod builder;
pub mod calibration;
pub mod clock;
pub mod config;
pub mod conversions;
pub mod core;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod router;
pub mod sensor;
pub mod state;
pub mod window;

pub use builder::{ScaleBuilder, build_scale};
pub use calibration::CalibrationRecord;
pub use clock::{DEFAULT_TIMER_PERIOD_US, Interval, SystemTimer};
pub use config::{ScaleCfg, SensorCfg, Tone, ToneCfg};
pub use crate::core::ScaleCore;
pub use error::{BuildError, Report, Result, ScaleError};
pub use router::{KeyMap, KeyRouter};
pub use sensor::WeightSensor;
pub use state::{OverweightMode, ScaleState, ScreenState};
pub use window::{DEFAULT_WINDOW, SampleWindow};
