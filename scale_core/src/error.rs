use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for device")]
    Timeout,
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),
    #[error("audio device unavailable: {0}")]
    AudioDeviceUnavailable(String),
    #[error("input overflow: at most {max_digits} digits")]
    InputOverflow { max_digits: u8 },
    #[error("cannot speak {0}: outside -999999..=999999")]
    Unspeakable(i32),
    #[error("power cutoff failed: {0}")]
    PowerCutoff(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing weight sensor")]
    MissingSensor,
    #[error("missing keypad")]
    MissingKeypad,
    #[error("missing power cutoff line")]
    MissingPowerLine,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
