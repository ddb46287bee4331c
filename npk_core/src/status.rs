//! Channel states and the transitions a command or expiry produces.

use std::time::Duration;

/// Whether a pump is currently running a dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    /// Output energized and a deactivation deadline pending.
    Dosing,
}

/// Outcome of one accepted command or of a deadline firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Dosing.
    Started { seconds: u32 },
    /// Dosing -> Dosing; the previous countdown was discarded with
    /// `discarded` still left on it.
    Rearmed { seconds: u32, discarded: Duration },
    /// Any -> Idle on a `0` command. Any pending deadline was cancelled.
    ForcedOff { was_dosing: bool },
    /// Dosing -> Idle when the deadline passed.
    Expired,
}

impl Transition {
    /// State the channel is in after this transition.
    pub fn resulting_state(&self) -> ChannelState {
        match self {
            Transition::Started { .. } | Transition::Rearmed { .. } => ChannelState::Dosing,
            Transition::ForcedOff { .. } | Transition::Expired => ChannelState::Idle,
        }
    }

    /// Payload for the `on` state property.
    pub fn state_payload(&self) -> String {
        match self {
            Transition::Started { seconds } | Transition::Rearmed { seconds, .. } => {
                seconds.to_string()
            }
            Transition::ForcedOff { .. } | Transition::Expired => "false".to_string(),
        }
    }
}
