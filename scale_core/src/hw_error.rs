//! Maps `Box<dyn Error>` from trait boundaries to typed `ScaleError`.
//!
//! The traits in `scale_traits` use `Box<dyn Error + Send + Sync>` at the
//! tone boundary; this module converts those to our typed error enum, with an
//! optional feature-gated path for `scale_hardware::HwError` downcasting.

use crate::error::ScaleError;

/// Map a trait-boundary error to a typed `ScaleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to the error's display text.
pub fn map_peripheral_error(e: &(dyn std::error::Error + 'static)) -> ScaleError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<scale_hardware::error::HwError>() {
            return match hw {
                scale_hardware::error::HwError::Pwm(msg) => ScaleError::PeripheralFault(msg.clone()),
                other => ScaleError::Peripheral(other.to_string()),
            };
        }
    }

    ScaleError::Peripheral(e.to_string())
}
