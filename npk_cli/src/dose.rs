//! Broker-less commands: one-shot dose and the output self-check.

use crate::publish::{LogPublisher, StdoutPublisher};
use crate::wiring::build_controller;
use npk_config::Config;
use npk_core::{ChannelState, NpkError, PumpController};
use npk_traits::{Clock, MonotonicClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Apply `payload` to `channel` exactly as an `on/set` message would, then
/// tick until the channel is idle again. State updates go to stdout.
pub fn run_dose(
    cfg: &Config,
    channel: &str,
    payload: &str,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    let clock = MonotonicClock::new();
    let mut ctl = build_controller(cfg, StdoutPublisher::new(json), clock)?;
    let tick = Duration::from_millis(cfg.scheduler.tick_ms);
    dose_until_idle(&mut ctl, &clock, channel, payload, tick, &shutdown)?;
    Ok(())
}

/// Returns the milliseconds spent until the channel went idle.
fn dose_until_idle(
    ctl: &mut PumpController,
    clock: &dyn Clock,
    channel: &str,
    payload: &str,
    tick: Duration,
    shutdown: &AtomicBool,
) -> eyre::Result<u64> {
    let start = clock.now();
    let transition = ctl.try_handle_command(channel, payload)?;
    tracing::info!(channel, payload, ?transition, "command applied");

    while is_dosing(ctl, channel)? {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!(channel, "interrupted, switching off");
            ctl.shutdown();
            return Ok(clock.ms_since(start));
        }
        clock.sleep(tick);
        ctl.tick();
    }
    let elapsed_ms = clock.ms_since(start);
    tracing::info!(channel, elapsed_ms, "dose complete");
    Ok(elapsed_ms)
}

fn is_dosing(ctl: &PumpController, channel: &str) -> eyre::Result<bool> {
    let ch = ctl
        .channel(channel)
        .ok_or_else(|| NpkError::UnknownChannel(channel.to_string()))?;
    Ok(ch.state() == ChannelState::Dosing)
}

/// Open every output, force each pump off and release the indicator.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let mut ctl = build_controller(cfg, LogPublisher, MonotonicClock::new())?;
    let ids: Vec<String> = ctl.channels().iter().map(|c| c.id().to_string()).collect();
    for id in &ids {
        ctl.try_handle_command(id, "0")?;
    }
    ctl.shutdown();

    if json {
        let out = serde_json::json!({
            "status": "ok",
            "device": cfg.device.id,
            "channels": ids,
            "indicator_lit": ctl.indicator_lit(),
        });
        println!("{out}");
    } else {
        println!("ok");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use npk_core::mocks::{RecordingPublisher, SpyOutput};
    use npk_traits::clock::test_clock::TestClock;

    fn controller(
        clock: &TestClock,
        pin: &SpyOutput,
        published: &RecordingPublisher,
    ) -> PumpController {
        PumpController::builder()
            .with_channel("NPK_1", "NPK_1", pin.clone())
            .with_channel("NPK_2", "NPK_2", SpyOutput::new())
            .with_publisher(published.clone())
            .with_clock(clock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn dose_runs_on_the_controller_clock() {
        let clock = TestClock::new();
        let pin = SpyOutput::new();
        let published = RecordingPublisher::new();
        let mut ctl = controller(&clock, &pin, &published);

        let stop = AtomicBool::new(false);
        let elapsed = dose_until_idle(
            &mut ctl,
            &clock,
            "NPK_1",
            "3",
            Duration::from_millis(100),
            &stop,
        )
        .unwrap();

        assert_eq!(elapsed, 3000);
        assert_eq!(pin.writes(), vec![true, false]);
        assert_eq!(
            published.payloads_on("homie/aquarium/NPK_1/on"),
            vec!["3", "false"]
        );
    }

    #[test]
    fn interrupted_dose_switches_off() {
        let clock = TestClock::new();
        let pin = SpyOutput::new();
        let published = RecordingPublisher::new();
        let mut ctl = controller(&clock, &pin, &published);

        let stop = AtomicBool::new(true);
        let elapsed = dose_until_idle(
            &mut ctl,
            &clock,
            "NPK_1",
            "60",
            Duration::from_millis(100),
            &stop,
        )
        .unwrap();

        assert_eq!(elapsed, 0);
        assert!(!pin.is_high());
    }
}
