//! Turn a validated config into a ready controller.

use eyre::WrapErr;
use npk_config::Config;
use npk_core::PumpController;
use npk_traits::{Clock, Publisher};

/// Open every configured output and hand them to the builder.
///
/// The builder drives the relay low and the indicator off before returning.
pub fn build_controller(
    cfg: &Config,
    publisher: impl Publisher + 'static,
    clock: impl Clock + 'static,
) -> eyre::Result<PumpController> {
    let mut builder = PumpController::builder()
        .with_config(cfg)
        .with_publisher(publisher)
        .with_clock(clock);

    for ch in &cfg.channels {
        let pin = npk_hardware::open_output(ch.pin, &ch.id)
            .wrap_err_with(|| format!("open pump pin {} for {}", ch.pin, ch.id))?;
        builder = builder.with_channel(ch.id.clone(), ch.display_name().to_string(), pin);
    }
    if let Some(pin) = cfg.pins.relay {
        let relay = npk_hardware::open_output(pin, "relay")
            .wrap_err_with(|| format!("open relay pin {pin}"))?;
        builder = builder.with_relay(relay);
    }
    if let Some(pin) = cfg.pins.indicator {
        let led = npk_hardware::open_output(pin, "indicator")
            .wrap_err_with(|| format!("open indicator pin {pin}"))?;
        builder = builder.with_indicator(led, cfg.indicator.active_low);
    }

    builder.build()
}
