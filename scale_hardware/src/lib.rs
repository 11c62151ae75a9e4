//! Collaborators for the talking scale: simulated devices (always built)
//! and Raspberry Pi drivers behind the `hardware` feature.

pub mod error;
pub mod fallback;
pub mod protocol;
pub mod sim;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware;

pub use fallback::UnavailableAudio;
pub use sim::{LogAudio, LogBuzzer, LogDisplay, ScriptedKeypad, SimButton, SimPowerLine, SimulatedSensor};
