//! Shared "dosing in progress" status output.

use crate::error::NpkError;
use crate::hw_error::map_hw_error;
use npk_traits::DigitalOutput;

/// Status LED shared by all channels. Lit while at least one channel is
/// dosing; the controller recomputes that after every transition, so one
/// channel finishing never darkens the LED while the other still runs.
pub struct Indicator {
    pin: Option<Box<dyn DigitalOutput>>,
    active_low: bool,
    lit: bool,
}

impl core::fmt::Debug for Indicator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Indicator")
            .field("wired", &self.pin.is_some())
            .field("active_low", &self.active_low)
            .field("lit", &self.lit)
            .finish()
    }
}

impl Indicator {
    pub fn new(pin: Box<dyn DigitalOutput>, active_low: bool) -> Self {
        Self {
            pin: Some(pin),
            active_low,
            lit: false,
        }
    }

    /// Indicator with no output attached; only tracks state.
    pub fn disconnected() -> Self {
        Self {
            pin: None,
            active_low: true,
            lit: false,
        }
    }

    /// Light the indicator when `any_dosing`, release it otherwise.
    pub fn show(&mut self, any_dosing: bool) -> Result<(), NpkError> {
        if let Some(pin) = self.pin.as_mut() {
            // active-low: lit == low
            let high = any_dosing != self.active_low;
            pin.set_level(high).map_err(|e| map_hw_error(&*e))?;
        }
        self.lit = any_dosing;
        Ok(())
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::SpyOutput;

    #[test]
    fn active_low_inverts_level() {
        let spy = SpyOutput::new();
        let mut ind = Indicator::new(Box::new(spy.clone()), true);
        ind.show(true).unwrap();
        assert!(!spy.is_high());
        assert!(ind.is_lit());
        ind.show(false).unwrap();
        assert!(spy.is_high());
        assert!(!ind.is_lit());
    }

    #[test]
    fn active_high_follows_state() {
        let spy = SpyOutput::new();
        let mut ind = Indicator::new(Box::new(spy.clone()), false);
        ind.show(true).unwrap();
        assert!(spy.is_high());
    }

    #[test]
    fn disconnected_only_tracks() {
        let mut ind = Indicator::disconnected();
        ind.show(true).unwrap();
        assert!(ind.is_lit());
    }
}
