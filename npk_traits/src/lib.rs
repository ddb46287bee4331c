//! Seams between the pump controller and the outside world.
//!
//! The core only ever talks to GPIO through [`DigitalOutput`], to the message
//! broker through [`Publisher`] and to time through [`Clock`].

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// A single GPIO output line (pump driver, relay or status LED).
pub trait DigitalOutput {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Drive the line to `high` (true) or low (false).
    fn set_level(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if high { self.set_high() } else { self.set_low() }
    }
}

/// Outbound half of the property channel.
pub trait Publisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_high()
    }
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_low()
    }
}

impl<T: Publisher + ?Sized> Publisher for Box<T> {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).publish(topic, payload, retained)
    }
}
