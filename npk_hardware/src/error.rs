use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("gpio pin {0} is unavailable")]
    PinUnavailable(u8),
}

pub type Result<T> = std::result::Result<T, HwError>;
