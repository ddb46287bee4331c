use rppal::gpio::{Gpio, OutputPin};
use tracing::trace;

use crate::error::{HwError, Result};

/// Raspberry Pi output pin. Starts low.
pub struct GpioOutput {
    pin: OutputPin,
    label: String,
}

impl GpioOutput {
    pub fn open(pin: u8, label: &str) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|_| HwError::PinUnavailable(pin))?
            .into_output_low();
        // Keep the level we drove when the process exits so a pump that was
        // switched off stays off.
        pin.set_reset_on_drop(false);
        Ok(Self {
            pin,
            label: label.to_string(),
        })
    }
}

impl npk_traits::DigitalOutput for GpioOutput {
    fn set_high(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_high();
        trace!(output = %self.label, pin = self.pin.pin(), "gpio high");
        Ok(())
    }

    fn set_low(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_low();
        trace!(output = %self.label, pin = self.pin.pin(), "gpio low");
        Ok(())
    }
}
