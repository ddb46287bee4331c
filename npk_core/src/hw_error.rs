//! Maps `Box<dyn Error>` from trait boundaries to typed `NpkError`.
//!
//! The traits in `npk_traits` use `Box<dyn Error + Send + Sync>`; this module
//! converts those to our typed error enum, with an optional feature-gated path
//! for `npk_hardware::HwError` downcasting.

use crate::error::NpkError;

/// Map a GPIO trait-boundary error to a typed `NpkError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> NpkError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<npk_hardware::error::HwError>() {
            return NpkError::HardwareFault(hw.to_string());
        }
    }

    NpkError::Hardware(e.to_string())
}

/// Map a publisher trait-boundary error to a typed `NpkError`.
pub fn map_publish_error(e: &(dyn std::error::Error + 'static)) -> NpkError {
    NpkError::Publish(e.to_string())
}
