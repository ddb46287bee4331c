//! `From` implementations bridging `npk_config` types to `npk_core` types.

use crate::homie::{FirmwareIdentity, HomieTopics};

impl From<&npk_config::Config> for HomieTopics {
    fn from(c: &npk_config::Config) -> Self {
        HomieTopics::new(c.mqtt.base_topic.clone(), c.device.id.clone())
    }
}

impl From<&npk_config::Firmware> for FirmwareIdentity {
    fn from(f: &npk_config::Firmware) -> Self {
        Self {
            name: f.name.clone(),
            version: f.version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_follow_config() {
        let cfg = npk_config::load_toml(
            r#"
[device]
id = "tank2"

[mqtt]
base_topic = "devices"

[[channels]]
id = "NPK_1"
name = "NPK1Pump"
pin = 5

[[channels]]
id = "NPK_2"
pin = 4
"#,
        )
        .unwrap();
        let topics = HomieTopics::from(&cfg);
        assert_eq!(topics.state_topic("NPK_1"), "devices/tank2/NPK_1/on");
        assert_eq!(cfg.channels[0].display_name(), "NPK1Pump");
        assert_eq!(cfg.channels[1].display_name(), "NPK_2");
        assert_eq!(FirmwareIdentity::from(&cfg.firmware).version, "1.3.0");
    }
}
