//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use npk_core::error::{BuildError, NpkError};

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPublisher => {
                "What happened: No publisher was provided to the pump controller.\nLikely causes: The transport was not wired into the builder.\nHow to fix: Pass a publisher via with_publisher(...).".to_string()
            }
            BuildError::ChannelCount { expected, got } => format!(
                "What happened: The controller needs exactly {expected} pump channels, got {got}.\nLikely causes: Missing or extra [[channels]] entries.\nHow to fix: List NPK_1 and NPK_2 under [[channels]] in the config."
            ),
            BuildError::DuplicateChannel(id) => format!(
                "What happened: Channel {id:?} is configured twice.\nLikely causes: Copy-pasted [[channels]] entry.\nHow to fix: Give every channel a distinct id."
            ),
        };
    }

    if let Some(ne) = err.downcast_ref::<NpkError>() {
        return match ne {
            NpkError::InvalidCommand(raw) => format!(
                "What happened: The pump instruction {raw:?} contains no digits and was ignored.\nLikely causes: A non-numeric payload such as \"on\" or \"true\".\nHow to fix: Send a number of seconds to dose, or 0 to switch the pump off."
            ),
            NpkError::UnknownChannel(id) => format!(
                "What happened: There is no pump channel called {id:?}.\nLikely causes: Typo in --channel or in the config.\nHow to fix: Use one of the ids listed under [[channels]] (e.g. NPK_1, NPK_2)."
            ),
            NpkError::Hardware(_) | NpkError::HardwareFault(_) => format!(
                "What happened: {ne}.\nLikely causes: Wrong pin number, missing GPIO permissions, or a wiring fault.\nHow to fix: Check [pins] and [[channels]] in the config and that the process may access GPIO."
            ),
            NpkError::Publish(_) => format!(
                "What happened: {ne}.\nLikely causes: Broker unreachable or the outgoing queue is full.\nHow to fix: Check the [mqtt] settings and broker availability."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing read permissions.\nHow to fix: Pass --config with the path to your TOML file (a sample lives in etc/npk_config.toml)."
        );
    }

    if lower.contains("invalid configuration") {
        let cause = err
            .chain()
            .last()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or incomplete{cause}.\nLikely causes: Missing [[channels]], repeated pins, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("open pump pin")
        || lower.contains("open relay pin")
        || lower.contains("open indicator pin")
    {
        return format!(
            "What happened: Failed to initialize hardware pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the pin values in the config; ensure the process has permission to access GPIO."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 invalid instruction, 4 unknown channel, 1 otherwise.
/// clap reports usage errors itself with 2.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use npk_core::error::NpkError;
    match err.downcast_ref::<NpkError>() {
        Some(NpkError::InvalidCommand(_)) => 3,
        Some(NpkError::UnknownChannel(_)) => 4,
        _ => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    use npk_core::error::{BuildError, NpkError};
    if let Some(ne) = err.downcast_ref::<NpkError>() {
        return match ne {
            NpkError::InvalidCommand(_) => "InvalidCommand",
            NpkError::UnknownChannel(_) => "UnknownChannel",
            NpkError::Hardware(_) | NpkError::HardwareFault(_) => "Hardware",
            NpkError::Publish(_) => "Publish",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}
