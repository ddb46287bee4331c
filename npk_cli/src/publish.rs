//! Publishers used when no broker is involved.

use npk_traits::Publisher;
use std::io::Write;

/// Prints every message to stdout, one per line: `topic payload` or a JSON object.
pub struct StdoutPublisher {
    json: bool,
}

impl StdoutPublisher {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Publisher for StdoutPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = serde_json::json!({
                "topic": topic,
                "payload": payload,
                "retained": retained,
            });
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{topic} {payload}")?;
        }
        Ok(())
    }
}

/// Sends every message to the debug log only.
#[derive(Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(topic, payload, retained, "publish");
        Ok(())
    }
}
