//! GPIO outputs for the pump controller.
//!
//! [`SimulatedOutput`] is always available and only records its level.
//! With the `hardware` feature, [`open_output`] hands out real Raspberry Pi
//! pins through `rppal`.
pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use npk_traits::DigitalOutput;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Output line that keeps its level in memory.
///
/// Clones share the level, so a caller can keep a probe while the controller
/// owns the output.
#[derive(Debug, Clone)]
pub struct SimulatedOutput {
    label: String,
    high: Arc<AtomicBool>,
}

impl SimulatedOutput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            high: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Relaxed)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl DigitalOutput for SimulatedOutput {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.high.store(true, Ordering::Relaxed);
        tracing::debug!(output = %self.label, level = "high", "gpio write (simulated)");
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.high.store(false, Ordering::Relaxed);
        tracing::debug!(output = %self.label, level = "low", "gpio write (simulated)");
        Ok(())
    }
}

/// Open `pin` as an output. Real GPIO with the `hardware` feature on Linux,
/// a [`SimulatedOutput`] otherwise.
pub fn open_output(pin: u8, label: &str) -> error::Result<Box<dyn DigitalOutput>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let out = gpio::GpioOutput::open(pin, label)?;
        Ok(Box::new(out))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        tracing::debug!(pin, output = label, "using simulated output");
        Ok(Box::new(SimulatedOutput::new(format!("{label}@{pin}"))))
    }
}
