//! Pump output driver.

use crate::error::NpkError;
use crate::hw_error::map_hw_error;
use npk_traits::DigitalOutput;

/// Owns one pump's output line and remembers what was last written to it.
pub struct Actuator {
    pin: Box<dyn DigitalOutput>,
    energized: bool,
}

impl core::fmt::Debug for Actuator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Actuator")
            .field("energized", &self.energized)
            .finish_non_exhaustive()
    }
}

impl Actuator {
    pub fn new(pin: Box<dyn DigitalOutput>) -> Self {
        Self {
            pin,
            energized: false,
        }
    }

    /// Drive the pump output high.
    pub fn activate(&mut self) -> Result<(), NpkError> {
        self.pin.set_high().map_err(|e| map_hw_error(&*e))?;
        self.energized = true;
        Ok(())
    }

    /// Drive the pump output low.
    pub fn deactivate(&mut self) -> Result<(), NpkError> {
        self.pin.set_low().map_err(|e| map_hw_error(&*e))?;
        self.energized = false;
        Ok(())
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }
}
