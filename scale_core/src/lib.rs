#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Interaction and guidance logic for the talking scale (hardware-agnostic).
//!
//! All hardware interactions go through the collaborator traits in
//! `scale_traits`. The pieces, leaves first:
//!
//! - **Debouncer**: settles the integer reading and reports each stable
//!   value once (`debounce`)
//! - **Speech**: integer to spoken-token sequences, phrases, and the
//!   track-numbered vocabulary (`speech`)
//! - **Target input**: keypad entry state machine (`input`)
//! - **Guidance**: zone classification and buzzer patterns (`guidance`)
//! - **Activity**: idle timeout for auto power-off (`activity`)
//! - **Voice**: bounded playback that degrades to muted (`voice`)
//! - **Controller**: the per-tick dispatch loop (`controller`), built with
//!   `ControllerBuilder` and driven by `runner::run`
//!
//! Weights are whole grams (`i32`) everywhere past the sensor boundary.

pub mod activity;
pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod debounce;
pub mod error;
pub mod guidance;
pub mod hw_error;
pub mod input;
pub mod mocks;
pub mod quantize;
pub mod runner;
pub mod speech;
pub mod status;
pub mod util;
pub mod voice;

pub use activity::ActivityMonitor;
pub use builder::{ControllerBuilder, Missing, Set};
pub use config::{AudioCfg, DisplayCfg, GuidanceCfg, InputCfg, TimingCfg};
pub use controller::Controller;
pub use debounce::Debouncer;
pub use error::{BuildError, Result, ScaleError};
pub use guidance::{ToneStep, Zone, classify};
pub use input::{InputEvent, InputState, TargetInput};
pub use runner::{RunOutcome, StopReason, run};
pub use speech::{Token, Utterance, compose, decode};
pub use status::TickStatus;
pub use voice::{PlayOutcome, Voice};
