//! rumqttc glue: connection options and a non-blocking [`Publisher`].

use npk_config::Config;
use npk_core::HomieTopics;
use npk_core::homie::DeviceState;
use npk_traits::Publisher;
use rumqttc::{Client, LastWill, MqttOptions, QoS};
use std::time::Duration;

/// Request queue depth; the full advertisement must fit before the first poll.
pub const REQUEST_CAPACITY: usize = 64;

pub fn options(cfg: &Config, topics: &HomieTopics) -> MqttOptions {
    let mut opts = MqttOptions::new(&cfg.mqtt.client_id, &cfg.mqtt.host, cfg.mqtt.port);
    opts.set_keep_alive(Duration::from_secs(cfg.mqtt.keep_alive_s));
    opts.set_clean_session(true);
    opts.set_last_will(LastWill::new(
        topics.attribute("$state"),
        DeviceState::Lost.as_str(),
        QoS::AtLeastOnce,
        true,
    ));
    opts
}

/// Queues messages on the client without waiting for the event loop.
pub struct MqttPublisher {
    client: Client,
}

impl MqttPublisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Publisher for MqttPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retained, payload.as_bytes().to_vec())
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
