//! One pump channel: parser, actuator and deadline composed into a two-state
//! machine (Idle / Dosing).

use crate::actuator::Actuator;
use crate::command::Command;
use crate::error::NpkError;
use crate::status::{ChannelState, Transition};
use crate::timer::DeactivationTimer;
use npk_traits::DigitalOutput;
use std::time::Instant;

pub struct PumpChannel {
    id: String,
    name: String,
    actuator: Actuator,
    timer: DeactivationTimer,
    last_seconds: Option<u32>,
}

impl core::fmt::Debug for PumpChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PumpChannel")
            .field("id", &self.id)
            .field("on", &self.actuator.is_energized())
            .field("deadline", &self.timer.deadline())
            .field("last_seconds", &self.last_seconds)
            .finish()
    }
}

impl PumpChannel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pin: Box<dyn DigitalOutput>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            actuator: Actuator::new(pin),
            timer: DeactivationTimer::new(),
            last_seconds: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Advertised property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChannelState {
        if self.timer.is_armed() {
            ChannelState::Dosing
        } else {
            ChannelState::Idle
        }
    }

    pub fn is_on(&self) -> bool {
        self.actuator.is_energized()
    }

    /// Last accepted dose duration.
    pub fn last_commanded_seconds(&self) -> Option<u32> {
        self.last_seconds
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Parse and apply a raw `on/set` payload.
    pub fn handle(&mut self, raw: &str, now: Instant) -> Result<Transition, NpkError> {
        match Command::parse(raw) {
            Command::Invalid => Err(self.reject(raw)),
            cmd => self.apply(cmd, now),
        }
    }

    /// Apply an already parsed command. The raw payload is gone by now, so a
    /// rejected `Invalid` carries an empty one.
    pub fn apply(&mut self, cmd: Command, now: Instant) -> Result<Transition, NpkError> {
        match cmd {
            Command::Invalid => Err(self.reject("")),
            Command::ForceOff => self.force_off(),
            Command::Dose { seconds } => self.dose(seconds, now),
        }
    }

    fn reject(&self, raw: &str) -> NpkError {
        tracing::warn!(channel = %self.id, payload = raw, "invalid pump instruction received");
        NpkError::InvalidCommand(raw.to_string())
    }

    fn dose(&mut self, seconds: u32, now: Instant) -> Result<Transition, NpkError> {
        tracing::info!(channel = %self.id, seconds, "will pump for {seconds} seconds");
        let discarded = self.timer.remaining(now);
        self.actuator.activate()?;
        self.timer.arm(now, seconds);
        self.last_seconds = Some(seconds);
        tracing::info!(channel = %self.id, "pump is on");
        Ok(match discarded {
            Some(discarded) => Transition::Rearmed { seconds, discarded },
            None => Transition::Started { seconds },
        })
    }

    fn force_off(&mut self) -> Result<Transition, NpkError> {
        let was_dosing = self.state() == ChannelState::Dosing;
        // Deadline stays pending if the write fails so expiry retries it.
        self.actuator.deactivate()?;
        self.timer.cancel();
        tracing::info!(channel = %self.id, was_dosing, "pump forced off");
        Ok(Transition::ForcedOff { was_dosing })
    }

    /// Deactivate once the deadline has passed. `None` while nothing is due.
    /// Only the controller's tick calls this.
    pub(crate) fn expire_if_due(&mut self, now: Instant) -> Option<Result<Transition, NpkError>> {
        if !self.timer.is_due(now) {
            return None;
        }
        if let Err(e) = self.actuator.deactivate() {
            return Some(Err(e));
        }
        self.timer.cancel();
        tracing::info!(channel = %self.id, "pump is off");
        Some(Ok(Transition::Expired))
    }
}
