//! Test and helper mocks for npk_core

use npk_traits::{DigitalOutput, Publisher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Output that records every level written to it. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct SpyOutput {
    writes: Arc<Mutex<Vec<bool>>>,
    fail: Arc<AtomicBool>,
}

impl SpyOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last written level; low before the first write.
    pub fn is_high(&self) -> bool {
        lock(&self.writes).last().copied().unwrap_or(false)
    }

    pub fn writes(&self) -> Vec<bool> {
        lock(&self.writes).clone()
    }

    /// Make subsequent writes fail (true) or succeed again (false).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    fn write(&self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("spy output write failed")));
        }
        lock(&self.writes).push(high);
        Ok(())
    }
}

impl DigitalOutput for SpyOutput {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(true)
    }
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(false)
    }
}

/// A message handed to a [`Publisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

/// Publisher that keeps everything it was asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<Published>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Published> {
        lock(&self.sent).clone()
    }

    /// Payloads published on `topic`, oldest first.
    pub fn payloads_on(&self, topic: &str) -> Vec<String> {
        lock(&self.sent)
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.sent).clear();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }
}

impl Publisher for RecordingPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        retained: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("broker unreachable")));
        }
        lock(&self.sent).push(Published {
            topic: topic.to_string(),
            payload: payload.to_string(),
            retained,
        });
        Ok(())
    }
}
