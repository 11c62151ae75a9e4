//! Human-readable error descriptions and structured JSON error formatting.

use scale_core::{BuildError, ScaleError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No weight sensor was provided to the controller.\nLikely causes: The HX711 failed to initialize or was not wired into the builder.\nHow to fix: Ensure the sensor is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingKeypad => {
                "What happened: No keypad was provided to the controller.\nLikely causes: Keypad pins failed to open or were not wired into the builder.\nHow to fix: Ensure the keypad is created successfully and passed via with_keypad(...).".to_string()
            }
            BuildError::MissingPowerLine => {
                "What happened: No power cutoff line was provided to the controller.\nLikely causes: The cutoff pin failed to open or was not wired into the builder.\nHow to fix: Ensure the power line is created successfully and passed via with_power_line(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/scale_config.toml for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::Unspeakable(n) => format!(
                "What happened: {n} cannot be spoken.\nLikely causes: The clip set covers -999999..=999999 only.\nHow to fix: Pick a number inside that range."
            ),
            ScaleError::PowerCutoff(detail) => format!(
                "What happened: The power cutoff line could not be asserted ({detail}).\nLikely causes: Cutoff pin not wired, wrong pin number, or GPIO permissions.\nHow to fix: Check pins.power_cutoff and the latch circuit; the device is still powered."
            ),
            ScaleError::SensorUnavailable(detail) => format!(
                "What happened: The weight sensor did not return a reading ({detail}).\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing sensor.read_timeout_ms in the config."
            ),
            ScaleError::AudioDeviceUnavailable(detail) => format!(
                "What happened: The audio module did not respond ({detail}).\nLikely causes: Wrong UART path, baud rate, or missing SD card.\nHow to fix: Check [audio] uart/baud and the module's wiring."
            ),
            ScaleError::Hardware(detail) if detail.contains("`hardware` feature") => {
                "What happened: This build has no GPIO drivers.\nLikely causes: The binary was built without the `hardware` feature.\nHow to fix: Rerun with --sim, or rebuild with `--features hardware` on the device.".to_string()
            }
            ScaleError::Timeout => {
                "What happened: A device read timed out.\nLikely causes: Loose wiring or a timeout configured too low.\nHow to fix: Check the wiring and raise sensor.read_timeout_ms.".to_string()
            }
            // Fallback to generic for other domain errors
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    let chain = format!("{err:#}").to_ascii_lowercase();

    if chain.contains("data-ready timeout") {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise sensor.read_timeout_ms.".to_string();
    }

    if lower.starts_with("open ") {
        return format!(
            "What happened: Failed to initialize hardware ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO/UART permissions.\nHow to fix: Fix the [pins] and [audio] values in the config; ensure the process may access GPIO and the serial port."
        );
    }

    if lower.starts_with("read config") {
        return format!(
            "What happened: The config file could not be read ({}).\nLikely causes: Wrong --config path.\nHow to fix: Pass --config pointing at a TOML file; see etc/scale_config.toml.",
            err.root_cause()
        );
    }

    if lower.starts_with("parse config") || lower.starts_with("invalid config") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({}).\nLikely causes: Missing [pins] entries or out-of-range values.\nHow to fix: Edit the TOML config and try again.",
            err.root_cause()
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for the JSON `reason` field.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "InvalidConfig",
            _ => "MissingDevice",
        };
    }
    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::Hardware(_) | ScaleError::HardwareFault(_) => "Hardware",
            ScaleError::Timeout => "Timeout",
            ScaleError::SensorUnavailable(_) => "SensorUnavailable",
            ScaleError::AudioDeviceUnavailable(_) => "AudioDeviceUnavailable",
            ScaleError::InputOverflow { .. } => "InputOverflow",
            ScaleError::Unspeakable(_) => "Unspeakable",
            ScaleError::PowerCutoff(_) => "PowerCutoff",
        };
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.starts_with("read config") || lower.starts_with("parse config") || lower.starts_with("invalid config") {
        return "InvalidConfig";
    }
    "Error"
}

/// Exit codes: 2 config, 3 hardware, 4 power cutoff, 5 unspeakable, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "InvalidConfig" | "MissingDevice" => 2,
        "Hardware" | "Timeout" | "SensorUnavailable" | "AudioDeviceUnavailable" => 3,
        "PowerCutoff" => 4,
        "Unspeakable" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let obj = match err.downcast_ref::<ScaleError>() {
        Some(ScaleError::Unspeakable(n)) => {
            json!({ "reason": reason, "details": { "n": n }, "message": humanize(err) })
        }
        _ => json!({ "reason": reason, "message": humanize(err) }),
    };
    obj.to_string()
}
