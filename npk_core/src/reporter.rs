//! Publishes channel state to the `on` property.

use crate::error::NpkError;
use crate::homie::HomieTopics;
use crate::hw_error::map_publish_error;
use crate::status::Transition;
use npk_traits::Publisher;

#[derive(Debug, Clone)]
pub struct StateReporter {
    topics: HomieTopics,
}

impl StateReporter {
    pub fn new(topics: HomieTopics) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &HomieTopics {
        &self.topics
    }

    /// Publish the state that `transition` left `channel` in (retained).
    pub fn report(
        &self,
        publisher: &mut dyn Publisher,
        channel: &str,
        transition: &Transition,
    ) -> Result<(), NpkError> {
        let topic = self.topics.state_topic(channel);
        let payload = transition.state_payload();
        publisher
            .publish(&topic, &payload, true)
            .map_err(|e| map_publish_error(&*e))?;
        tracing::debug!(%topic, %payload, "state published");
        Ok(())
    }
}
