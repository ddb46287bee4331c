#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Timed pump actuation (hardware-agnostic).
//!
//! Each pump channel takes a free-text command, energizes its output and
//! schedules its own deactivation. All GPIO goes through
//! `npk_traits::DigitalOutput`, all outbound state through
//! `npk_traits::Publisher`, and all time through `npk_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Command**: payload classification (`command` module)
//! - **Actuator**: one pump output line (`actuator` module)
//! - **Timer**: absolute deactivation deadline per channel (`timer` module)
//! - **Channel**: Idle/Dosing state machine (`channel`, `status` modules)
//! - **Indicator**: shared "dosing" LED (`indicator` module)
//! - **Reporter / Homie**: state topics and device advertisement
//! - **Controller**: the registry owning both channels, driven by `tick()`
//!
//! ## Scheduling
//!
//! Nothing here spawns threads or sleeps. The caller runs one loop that feeds
//! inbound commands to [`PumpController::handle_command`] and calls
//! [`PumpController::tick`] periodically; deadlines fire on the first tick at
//! or after them. Pending deadlines live in memory only and are gone after a
//! restart, leaving the pump outputs wherever the GPIO driver left them until
//! the next command.

pub mod actuator;
pub mod channel;
pub mod command;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod homie;
pub mod hw_error;
pub mod indicator;
pub mod mocks;
pub mod reporter;
pub mod status;
pub mod timer;

pub use channel::PumpChannel;
pub use command::Command;
pub use controller::{PumpController, PumpControllerBuilder};
pub use error::{BuildError, NpkError};
pub use homie::{FirmwareIdentity, HomieTopics};
pub use npk_config::CHANNEL_COUNT;
pub use status::{ChannelState, Transition};
