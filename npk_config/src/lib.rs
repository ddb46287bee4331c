#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the NPK pump controller.
//!
//! `Config` and its sections are deserialized from TOML and checked by
//! [`Config::validate`]. Every section except `[[channels]]` has defaults, so
//! the smallest useful file only lists the two pumps.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Number of pump channels the controller drives.
pub const CHANNEL_COUNT: usize = 2;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Device {
    /// Homie device id; second topic level (`homie/<id>/...`).
    pub id: String,
    /// Human readable device name advertised as `$name`.
    pub name: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            id: "aquarium".to_string(),
            name: "Aquarium NPK pumps".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Firmware {
    pub name: String,
    pub version: String,
}

impl Default for Firmware {
    fn default() -> Self {
        Self {
            name: "aquariumNPKpumps".to_string(),
            version: "1.3.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Mqtt {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    /// Topic root, `homie` for Homie v3.
    pub base_topic: String,
    pub keep_alive_s: u64,
    /// Pause after a transport error before polling the connection again.
    /// The scheduler keeps ticking while waiting.
    pub reconnect_delay_ms: u64,
}

impl Default for Mqtt {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1883,
            client_id: "aquarium-npk".to_string(),
            base_topic: "homie".to_string(),
            keep_alive_s: 30,
            reconnect_delay_ms: 1000,
        }
    }
}

/// One pump: its node id, the advertised property name and its output pin.
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelCfg {
    pub id: String,
    /// Advertised property name; falls back to the id when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// BCM GPIO number driving the pump.
    pub pin: u8,
}

impl ChannelCfg {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    /// Shared relay/enable output, held low.
    pub relay: Option<u8>,
    /// Status LED lit while any pump is dosing.
    pub indicator: Option<u8>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct IndicatorCfg {
    /// Treat a low level as "on" (on-board LEDs are usually wired this way).
    pub active_low: bool,
}

impl Default for IndicatorCfg {
    fn default() -> Self {
        Self { active_low: true }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Scheduler {
    /// Period of the cooperative tick that checks deactivation deadlines.
    pub tick_ms: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: Device,
    #[serde(default)]
    pub firmware: Firmware,
    #[serde(default)]
    pub mqtt: Mqtt,
    pub channels: Vec<ChannelCfg>,
    #[serde(default)]
    pub pins: Pins,
    #[serde(default)]
    pub indicator: IndicatorCfg,
    #[serde(default)]
    pub scheduler: Scheduler,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    cfg.validate().map_err(|e| e.wrap_err("invalid configuration"))?;
    Ok(cfg)
}

/// Ids end up as topic levels; wildcard and separator characters would change
/// the meaning of the topic.
fn is_topic_safe(s: &str) -> bool {
    !s.is_empty() && !s.contains(['/', '+', '#']) && !s.chars().any(char::is_whitespace)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device / MQTT
        if !is_topic_safe(&self.device.id) {
            eyre::bail!("device.id must be non-empty and free of '/', '+', '#' and whitespace");
        }
        if !is_topic_safe(&self.mqtt.base_topic) {
            eyre::bail!("mqtt.base_topic must be non-empty and free of '/', '+', '#' and whitespace");
        }
        if self.mqtt.host.trim().is_empty() {
            eyre::bail!("mqtt.host must not be empty");
        }
        if self.mqtt.port == 0 {
            eyre::bail!("mqtt.port must be > 0");
        }
        if self.mqtt.client_id.is_empty() {
            eyre::bail!("mqtt.client_id must not be empty");
        }
        if self.mqtt.keep_alive_s < 5 {
            eyre::bail!("mqtt.keep_alive_s must be >= 5");
        }
        if self.mqtt.reconnect_delay_ms > 10 * 60 * 1000 {
            eyre::bail!("mqtt.reconnect_delay_ms is unreasonably large (>10min)");
        }

        // Channels
        if self.channels.len() != CHANNEL_COUNT {
            eyre::bail!(
                "channels must list exactly {} pumps, got {}",
                CHANNEL_COUNT,
                self.channels.len()
            );
        }
        let mut ids = HashSet::new();
        for ch in &self.channels {
            if !is_topic_safe(&ch.id) {
                eyre::bail!(
                    "channels.id {:?} must be non-empty and free of '/', '+', '#' and whitespace",
                    ch.id
                );
            }
            if !ids.insert(ch.id.as_str()) {
                eyre::bail!("channels.id {:?} is listed twice", ch.id);
            }
        }

        // Pins: every output is owned by exactly one user
        let mut pins = HashSet::new();
        let named = self
            .channels
            .iter()
            .map(|c| (c.id.as_str(), Some(c.pin)))
            .chain([
                ("pins.relay", self.pins.relay),
                ("pins.indicator", self.pins.indicator),
            ]);
        for (owner, pin) in named {
            if let Some(pin) = pin
                && !pins.insert(pin)
            {
                eyre::bail!("pin {pin} ({owner}) is already assigned to another output");
            }
        }

        // Scheduler
        if self.scheduler.tick_ms == 0 || self.scheduler.tick_ms > 1000 {
            eyre::bail!("scheduler.tick_ms must be in [1, 1000]");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[[channels]]
id = "NPK_1"
pin = 5

[[channels]]
id = "NPK_2"
pin = 4
"#;

    #[test]
    fn minimal_config_takes_defaults() {
        let cfg = load_toml(MINIMAL).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.device.id, "aquarium");
        assert_eq!(cfg.firmware.name, "aquariumNPKpumps");
        assert_eq!(cfg.firmware.version, "1.3.0");
        assert_eq!(cfg.mqtt.base_topic, "homie");
        assert_eq!(cfg.mqtt.port, 1883);
        assert_eq!(cfg.scheduler.tick_ms, 100);
        assert!(cfg.indicator.active_low);
        assert_eq!(cfg.channels[0].display_name(), "NPK_1");
    }

    #[test]
    fn channels_are_required() {
        assert!(load_toml("[device]\nid = \"aquarium\"\n").is_err());
    }

    #[test]
    fn topic_safety() {
        assert!(is_topic_safe("NPK_1"));
        assert!(!is_topic_safe(""));
        assert!(!is_topic_safe("a/b"));
        assert!(!is_topic_safe("+"));
        assert!(!is_topic_safe("#"));
        assert!(!is_topic_safe("npk 1"));
    }
}
