//! Broker-connected service loop.
//!
//! A single thread alternates between waiting up to one tick for an MQTT
//! event and letting the controller expire due deadlines, so a busy or dead
//! connection never delays switching a pump off.

use crate::mqtt::{self, MqttPublisher};
use crate::wiring::build_controller;
use eyre::{WrapErr, bail};
use npk_config::Config;
use npk_core::homie::DeviceState;
use npk_core::{HomieTopics, PumpController};
use npk_traits::{Clock, MonotonicClock, Publisher};
use rumqttc::{Client, Event, Packet, QoS, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long to keep flushing queued messages after shutdown.
const FLUSH_WINDOW: Duration = Duration::from_secs(1);

pub fn run(cfg: &Config, shutdown: Arc<AtomicBool>) -> eyre::Result<()> {
    let topics = HomieTopics::from(cfg);
    let (client, mut connection) =
        Client::new(mqtt::options(cfg, &topics), mqtt::REQUEST_CAPACITY);
    let clock = MonotonicClock::new();
    let mut ctl = build_controller(cfg, MqttPublisher::new(client.clone()), clock)
        .wrap_err("build pump controller")?;

    let tick = Duration::from_millis(cfg.scheduler.tick_ms);
    let reconnect_delay = Duration::from_millis(cfg.mqtt.reconnect_delay_ms);
    let filter = topics.command_filter();
    info!(
        host = %cfg.mqtt.host,
        port = cfg.mqtt.port,
        device = %cfg.device.id,
        tick_ms = cfg.scheduler.tick_ms,
        "connecting to broker"
    );

    while !shutdown.load(Ordering::Relaxed) {
        match connection.recv_timeout(tick) {
            Ok(Ok(Event::Incoming(Packet::Publish(p)))) => {
                match ctl.handle_message(&p.topic, &p.payload) {
                    Some(accepted) => debug!(topic = %p.topic, accepted, "command handled"),
                    None => warn!(topic = %p.topic, "message on unrelated topic ignored"),
                }
            }
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                info!("connected to broker");
                if let Err(e) = client.try_subscribe(filter.as_str(), QoS::AtLeastOnce) {
                    error!(error = %e, filter = %filter, "subscribe failed");
                }
                if let Err(e) = ctl.advertise() {
                    warn!(error = %e, "advertisement incomplete");
                }
            }
            Ok(Ok(Event::Incoming(Packet::Disconnect))) => warn!("broker closed the session"),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!(error = %e, "mqtt connection error, retrying");
                idle_ticks(&mut ctl, &clock, reconnect_delay, tick, &shutdown);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                ctl.shutdown();
                bail!("mqtt event loop stopped");
            }
        }
        ctl.tick();
    }

    info!("shutting down");
    finish(&mut ctl, &topics, &mut MqttPublisher::new(client.clone()));
    let _ = client.try_disconnect();
    flush(&mut connection, &clock);
    Ok(())
}

/// Keep expiring deadlines while the connection is down.
fn idle_ticks(
    ctl: &mut PumpController,
    clock: &dyn Clock,
    total: Duration,
    tick: Duration,
    shutdown: &AtomicBool,
) {
    let until = clock.now() + total;
    while clock.now() < until && !shutdown.load(Ordering::Relaxed) {
        clock.sleep(tick);
        ctl.tick();
    }
}

/// Switch every pump off, then announce `$state=disconnected`.
fn finish(ctl: &mut PumpController, topics: &HomieTopics, announce: &mut dyn Publisher) {
    ctl.shutdown();
    if let Err(e) = announce.publish(
        &topics.attribute("$state"),
        DeviceState::Disconnected.as_str(),
        true,
    ) {
        warn!(error = %e, "could not announce disconnect");
    }
}

fn flush(connection: &mut rumqttc::Connection, clock: &dyn Clock) {
    let until = clock.now() + FLUSH_WINDOW;
    while clock.now() < until {
        match connection.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect))) | Ok(Err(_)) => break,
            Err(RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npk_core::mocks::{RecordingPublisher, SpyOutput};
    use npk_traits::clock::test_clock::TestClock;

    const NPK1_STATE: &str = "homie/aquarium/NPK_1/on";
    const NPK2_STATE: &str = "homie/aquarium/NPK_2/on";
    const TICK: Duration = Duration::from_millis(100);

    struct Rig {
        ctl: PumpController,
        clock: TestClock,
        npk1: SpyOutput,
        npk2: SpyOutput,
        published: RecordingPublisher,
    }

    fn rig() -> Rig {
        let clock = TestClock::new();
        let npk1 = SpyOutput::new();
        let npk2 = SpyOutput::new();
        let published = RecordingPublisher::new();
        let ctl = PumpController::builder()
            .with_channel("NPK_1", "NPK_1", npk1.clone())
            .with_channel("NPK_2", "NPK_2", npk2.clone())
            .with_publisher(published.clone())
            .with_clock(clock.clone())
            .build()
            .unwrap();
        Rig {
            ctl,
            clock,
            npk1,
            npk2,
            published,
        }
    }

    #[test]
    fn deadlines_fire_while_waiting_to_reconnect() {
        let mut r = rig();
        assert!(r.ctl.handle_command("NPK_1", "1"));
        assert!(r.npk1.is_high());

        let running = AtomicBool::new(false);
        idle_ticks(&mut r.ctl, &r.clock, Duration::from_secs(2), TICK, &running);

        assert!(!r.npk1.is_high());
        assert_eq!(r.published.payloads_on(NPK1_STATE), vec!["1", "false"]);
    }

    #[test]
    fn idle_ticks_stop_on_shutdown() {
        let mut r = rig();
        assert!(r.ctl.handle_command("NPK_1", "5"));
        let t0 = r.clock.now();

        let stop = AtomicBool::new(true);
        idle_ticks(&mut r.ctl, &r.clock, Duration::from_secs(10), TICK, &stop);

        assert_eq!(r.clock.now(), t0);
        assert!(r.npk1.is_high());
    }

    #[test]
    fn finish_switches_off_before_announcing_disconnect() {
        let mut r = rig();
        assert!(r.ctl.handle_command("NPK_2", "30"));
        let topics = HomieTopics::new("homie", "aquarium");
        let mut announce = r.published.clone();

        finish(&mut r.ctl, &topics, &mut announce);

        assert!(!r.npk2.is_high());
        assert!(!r.ctl.indicator_lit());
        let sent = r.published.sent();
        let last = sent.last().unwrap();
        assert_eq!(last.topic, "homie/aquarium/$state");
        assert_eq!(last.payload, "disconnected");
        assert!(last.retained);
        assert_eq!(r.published.payloads_on(NPK2_STATE), vec!["30", "false"]);
    }
}
