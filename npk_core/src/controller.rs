//! The process-wide pump registry: both channels, the shared indicator, the
//! relay line and the outbound publisher, owned in one place and driven from
//! a single cooperative loop.

use crate::channel::PumpChannel;
use crate::error::{BuildError, NpkError, Result};
use crate::homie::{FirmwareIdentity, HomieTopics, NodeInfo};
use crate::hw_error::{map_hw_error, map_publish_error};
use crate::indicator::Indicator;
use crate::reporter::StateReporter;
use crate::status::{ChannelState, Transition};
use npk_traits::clock::{Clock, MonotonicClock};
use npk_traits::{DigitalOutput, Publisher};
use std::time::Instant;

pub struct PumpController {
    channels: Vec<PumpChannel>,
    indicator: Indicator,
    relay: Option<Box<dyn DigitalOutput>>,
    reporter: StateReporter,
    publisher: Box<dyn Publisher>,
    clock: Box<dyn Clock>,
    device_name: String,
    firmware: FirmwareIdentity,
}

impl core::fmt::Debug for PumpController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PumpController")
            .field("channels", &self.channels)
            .field("indicator", &self.indicator)
            .field("topics", self.reporter.topics())
            .finish_non_exhaustive()
    }
}

impl PumpController {
    pub fn builder() -> PumpControllerBuilder {
        PumpControllerBuilder::default()
    }

    /// Handle an inbound payload for `channel`. Returns whether the command
    /// was accepted; rejected commands change nothing.
    pub fn handle_command(&mut self, channel: &str, raw: &str) -> bool {
        match self.try_handle_command(channel, raw) {
            Ok(_) => true,
            // already logged by the channel
            Err(NpkError::InvalidCommand(_)) => false,
            Err(e) => {
                tracing::error!(channel, payload = raw, error = %e, "command rejected");
                false
            }
        }
    }

    /// Typed variant of [`PumpController::handle_command`].
    pub fn try_handle_command(
        &mut self,
        channel: &str,
        raw: &str,
    ) -> core::result::Result<Transition, NpkError> {
        let now = self.clock.now();
        let ch = self
            .channels
            .iter_mut()
            .find(|c| c.id() == channel)
            .ok_or_else(|| NpkError::UnknownChannel(channel.to_string()))?;
        let transition = ch.handle(raw, now)?;
        self.after_transition(channel, &transition);
        Ok(transition)
    }

    /// Route a message from the broker. `None` when `topic` is not one of our
    /// command topics.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) -> Option<bool> {
        let node = self.reporter.topics().node_of_set_topic(topic)?;
        let text = String::from_utf8_lossy(payload);
        Some(self.handle_command(node, &text))
    }

    /// One scheduler iteration: fire every deadline that has passed.
    /// Returns how many channels were switched off.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut expired = Vec::new();
        for ch in &mut self.channels {
            match ch.expire_if_due(now) {
                None => {}
                Some(Ok(transition)) => expired.push((ch.id().to_string(), transition)),
                Some(Err(e)) => {
                    tracing::error!(channel = %ch.id(), error = %e, "deactivation failed, retrying next tick");
                }
            }
        }
        for (id, transition) in &expired {
            self.after_transition(id, transition);
        }
        expired.len()
    }

    /// Publish the Homie advertisement followed by every channel's state.
    pub fn advertise(&mut self) -> Result<()> {
        let nodes: Vec<NodeInfo> = self
            .channels
            .iter()
            .map(|c| NodeInfo {
                id: c.id().to_string(),
                property_name: c.name().to_string(),
            })
            .collect();
        let messages =
            self.reporter
                .topics()
                .advertisement(&self.device_name, &self.firmware, &nodes);
        for m in &messages {
            self.publisher
                .publish(&m.topic, &m.payload, true)
                .map_err(|e| map_publish_error(&*e))?;
        }
        for ch in &self.channels {
            let payload = match (ch.state(), ch.last_commanded_seconds()) {
                (ChannelState::Dosing, Some(s)) => s.to_string(),
                _ => "false".to_string(),
            };
            let topic = self.reporter.topics().state_topic(ch.id());
            self.publisher
                .publish(&topic, &payload, true)
                .map_err(|e| map_publish_error(&*e))?;
        }
        tracing::info!(
            nodes = nodes.len(),
            firmware = %self.firmware.name,
            version = %self.firmware.version,
            "device advertised"
        );
        Ok(())
    }

    /// Force every channel off and release the indicator and relay.
    pub fn shutdown(&mut self) {
        let ids: Vec<String> = self
            .channels
            .iter()
            .filter(|c| c.is_on() || c.state() == ChannelState::Dosing)
            .map(|c| c.id().to_string())
            .collect();
        for id in ids {
            if let Err(e) = self.try_handle_command(&id, "0") {
                tracing::error!(channel = %id, error = %e, "failed to switch pump off on shutdown");
            }
        }
        if let Err(e) = self.indicator.show(false) {
            tracing::warn!(error = %e, "failed to release indicator");
        }
        if let Some(relay) = self.relay.as_mut()
            && let Err(e) = relay.set_low()
        {
            tracing::warn!(error = %map_hw_error(&*e), "failed to drive relay low");
        }
        tracing::info!("all pumps off");
    }

    pub fn channel(&self, id: &str) -> Option<&PumpChannel> {
        self.channels.iter().find(|c| c.id() == id)
    }

    pub fn channels(&self) -> &[PumpChannel] {
        &self.channels
    }

    pub fn any_dosing(&self) -> bool {
        self.channels
            .iter()
            .any(|c| c.state() == ChannelState::Dosing)
    }

    pub fn indicator_lit(&self) -> bool {
        self.indicator.is_lit()
    }

    /// Earliest pending deactivation across channels.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.channels.iter().filter_map(PumpChannel::deadline).min()
    }

    pub fn topics(&self) -> &HomieTopics {
        self.reporter.topics()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn after_transition(&mut self, channel: &str, transition: &Transition) {
        let any = self.any_dosing();
        if let Err(e) = self.indicator.show(any) {
            tracing::warn!(error = %e, "indicator write failed");
        }
        if let Err(e) = self
            .reporter
            .report(self.publisher.as_mut(), channel, transition)
        {
            tracing::warn!(channel, error = %e, "state publish failed");
        }
    }
}

/// Builder for [`PumpController`]. Validated on `build()`.
pub struct PumpControllerBuilder {
    channels: Vec<PumpChannel>,
    indicator: Option<(Box<dyn DigitalOutput>, bool)>,
    relay: Option<Box<dyn DigitalOutput>>,
    topics: HomieTopics,
    publisher: Option<Box<dyn Publisher>>,
    clock: Option<Box<dyn Clock>>,
    device_name: String,
    firmware: FirmwareIdentity,
}

impl Default for PumpControllerBuilder {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            indicator: None,
            relay: None,
            topics: HomieTopics::new("homie", "aquarium"),
            publisher: None,
            clock: None,
            device_name: "Aquarium NPK pumps".to_string(),
            firmware: FirmwareIdentity {
                name: "aquariumNPKpumps".to_string(),
                version: "1.3.0".to_string(),
            },
        }
    }
}

impl PumpControllerBuilder {
    /// Take topics, identity and names from a loaded config. Outputs still
    /// have to be supplied with the `with_*` pin setters.
    pub fn with_config(mut self, cfg: &npk_config::Config) -> Self {
        self.topics = HomieTopics::from(cfg);
        self.firmware = FirmwareIdentity::from(&cfg.firmware);
        self.device_name = cfg.device.name.clone();
        self
    }

    pub fn with_channel(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        pin: impl DigitalOutput + 'static,
    ) -> Self {
        self.channels.push(PumpChannel::new(id, name, Box::new(pin)));
        self
    }

    pub fn with_indicator(mut self, pin: impl DigitalOutput + 'static, active_low: bool) -> Self {
        self.indicator = Some((Box::new(pin), active_low));
        self
    }

    pub fn with_relay(mut self, pin: impl DigitalOutput + 'static) -> Self {
        self.relay = Some(Box::new(pin));
        self
    }

    pub fn with_topics(mut self, topics: HomieTopics) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_publisher(mut self, publisher: impl Publisher + 'static) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_firmware(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.firmware = FirmwareIdentity {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    /// Validate and assemble. Drives the relay low and the indicator off.
    pub fn build(self) -> Result<PumpController> {
        let PumpControllerBuilder {
            channels,
            indicator,
            relay,
            topics,
            publisher,
            clock,
            device_name,
            firmware,
        } = self;

        let publisher = publisher.ok_or(BuildError::MissingPublisher)?;
        if channels.len() != crate::CHANNEL_COUNT {
            return Err(BuildError::ChannelCount {
                expected: crate::CHANNEL_COUNT,
                got: channels.len(),
            }
            .into());
        }
        for (i, ch) in channels.iter().enumerate() {
            if channels[..i].iter().any(|other| other.id() == ch.id()) {
                return Err(BuildError::DuplicateChannel(ch.id().to_string()).into());
            }
        }

        let mut relay = relay;
        if let Some(r) = relay.as_mut() {
            r.set_low().map_err(|e| map_hw_error(&*e))?;
        }
        let mut indicator = match indicator {
            Some((pin, active_low)) => Indicator::new(pin, active_low),
            None => Indicator::disconnected(),
        };
        indicator.show(false)?;

        let clock = clock.unwrap_or_else(|| Box::new(MonotonicClock::new()));

        tracing::debug!(
            channels = channels.len(),
            device = %topics.device_root(),
            "pump controller assembled"
        );
        Ok(PumpController {
            channels,
            indicator,
            relay,
            reporter: StateReporter::new(topics),
            publisher,
            clock,
            device_name,
            firmware,
        })
    }
}
