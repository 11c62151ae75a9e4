//! Type-state builder for `Controller`.
//!
//! The builder enforces at compile time that the sensor, keypad and power
//! cutoff line are provided before `build()` is available. `try_build()` is
//! always available for dynamic checks. Everything else (display, audio,
//! buzzer, buttons, clock, configuration) falls back to a null device or
//! the default.

use std::marker::PhantomData;
use std::sync::Arc;

use scale_traits::{
    AudioPlayer, Button, Buzzer, Clock, DigitDisplay, Keypad, MonotonicClock, PowerLine,
    WeightSensor,
};

use crate::activity::ActivityMonitor;
use crate::config::*;
use crate::controller::Controller;
use crate::debounce::Debouncer;
use crate::error::{BuildError, Result};
use crate::guidance::Zone;
use crate::input::TargetInput;
use crate::mocks::{NullAudio, NullButton, NullBuzzer, NullDisplay};
use crate::voice::Voice;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Controller`. Configuration is validated on `build()`.
pub struct ControllerBuilder<S, K, P> {
    sensor: Option<Box<dyn WeightSensor>>,
    keypad: Option<Box<dyn Keypad>>,
    power: Option<Box<dyn PowerLine>>,
    display: Option<Box<dyn DigitDisplay>>,
    audio: Option<Box<dyn AudioPlayer>>,
    buzzer: Option<Box<dyn Buzzer>>,
    tare_button: Option<Box<dyn Button>>,
    readout_button: Option<Box<dyn Button>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    timing: Option<TimingCfg>,
    audio_cfg: Option<AudioCfg>,
    guidance: Option<GuidanceCfg>,
    input: Option<InputCfg>,
    display_cfg: Option<DisplayCfg>,
    _s: PhantomData<S>,
    _k: PhantomData<K>,
    _p: PhantomData<P>,
}

impl Default for ControllerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            keypad: None,
            power: None,
            display: None,
            audio: None,
            buzzer: None,
            tare_button: None,
            readout_button: None,
            clock: None,
            timing: None,
            audio_cfg: None,
            guidance: None,
            input: None,
            display_cfg: None,
            _s: PhantomData,
            _k: PhantomData,
            _p: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(
    timing: &TimingCfg,
    audio: &AudioCfg,
    guidance: &GuidanceCfg,
    input: &InputCfg,
    display: &DisplayCfg,
) -> Result<()> {
    if timing.tick_ms == 0 {
        return Err(invalid("tick_ms must be >= 1"));
    }
    if timing.idle_timeout_ms == 0 {
        return Err(invalid("idle_timeout_ms must be >= 1"));
    }
    if audio.poll_ms == 0 {
        return Err(invalid("audio poll_ms must be >= 1"));
    }
    if audio.max_wait_ms < audio.poll_ms {
        return Err(invalid("audio max_wait_ms must be >= poll_ms"));
    }
    if audio.max_consecutive_timeouts == 0 {
        return Err(invalid("max_consecutive_timeouts must be >= 1"));
    }
    if guidance.small_target_g < 0
        || guidance.small_overshoot_g < 0
        || guidance.overshoot_g < 0
        || guidance.hit_below_g < 0
        || guidance.approach_cap_g < 0
    {
        return Err(invalid("guidance margins must be >= 0"));
    }
    if guidance.approach_pct > 100 {
        return Err(invalid("approach_pct must be in [0, 100]"));
    }
    if !(1..=6).contains(&input.max_digits) {
        return Err(invalid("max_digits must be in [1, 6]"));
    }
    if !(1..=6).contains(&display.digits) {
        return Err(invalid("display digits must be in [1, 6]"));
    }
    Ok(())
}

impl<S, K, P> ControllerBuilder<S, K, P> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Controller> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let keypad = self
            .keypad
            .ok_or_else(|| eyre::Report::new(BuildError::MissingKeypad))?;
        let power = self
            .power
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPowerLine))?;

        let timing = self.timing.unwrap_or_default();
        let audio_cfg = self.audio_cfg.unwrap_or_default();
        let guidance = self.guidance.unwrap_or_default();
        let input = self.input.unwrap_or_default();
        let display_cfg = self.display_cfg.unwrap_or_default();
        validate(&timing, &audio_cfg, &guidance, &input, &display_cfg)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let epoch = clock.now();
        let audio = self.audio.unwrap_or_else(|| Box::new(NullAudio));

        Ok(Controller {
            sensor,
            keypad,
            display: self.display.unwrap_or_else(|| Box::new(NullDisplay)),
            buzzer: self.buzzer.unwrap_or_else(|| Box::new(NullBuzzer)),
            power,
            tare_button: self.tare_button.unwrap_or_else(|| Box::new(NullButton)),
            readout_button: self.readout_button.unwrap_or_else(|| Box::new(NullButton)),
            voice: Voice::new(audio, Arc::clone(&clock), audio_cfg),
            clock,
            epoch,
            debouncer: Debouncer::new(timing.stable_ms),
            input: TargetInput::new(input.max_digits),
            target: None,
            zone: Zone::Silent,
            activity: ActivityMonitor::new(timing.idle_timeout_ms, 0),
            sensor_fault: false,
            tare_held: false,
            readout_held: false,
            powered_off: false,
            timing,
            guidance,
            display_cfg,
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<S, K, P> ControllerBuilder<S, K, P> {
    pub fn with_display(mut self, display: impl DigitDisplay + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }
    pub fn with_audio(mut self, audio: impl AudioPlayer + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }
    pub fn with_buzzer(mut self, buzzer: impl Buzzer + 'static) -> Self {
        self.buzzer = Some(Box::new(buzzer));
        self
    }
    pub fn with_tare_button(mut self, button: impl Button + 'static) -> Self {
        self.tare_button = Some(Box::new(button));
        self
    }
    pub fn with_readout_button(mut self, button: impl Button + 'static) -> Self {
        self.readout_button = Some(Box::new(button));
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_audio_cfg(mut self, audio: AudioCfg) -> Self {
        self.audio_cfg = Some(audio);
        self
    }
    pub fn with_guidance(mut self, guidance: GuidanceCfg) -> Self {
        self.guidance = Some(guidance);
        self
    }
    pub fn with_input(mut self, input: InputCfg) -> Self {
        self.input = Some(input);
        self
    }
    pub fn with_display_cfg(mut self, display: DisplayCfg) -> Self {
        self.display_cfg = Some(display);
        self
    }
    /// Apply every runtime section of a loaded config file.
    pub fn with_config(self, cfg: &scale_config::Config) -> Self {
        self.with_timing((&cfg.timing).into())
            .with_audio_cfg((&cfg.audio).into())
            .with_guidance((&cfg.guidance).into())
            .with_input((&cfg.input).into())
            .with_display_cfg((&cfg.display).into())
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<K, P> ControllerBuilder<Missing, K, P> {
    pub fn with_sensor(
        self,
        sensor: impl WeightSensor + 'static,
    ) -> ControllerBuilder<Set, K, P> {
        ControllerBuilder {
            sensor: Some(Box::new(sensor)),
            keypad: self.keypad,
            power: self.power,
            display: self.display,
            audio: self.audio,
            buzzer: self.buzzer,
            tare_button: self.tare_button,
            readout_button: self.readout_button,
            clock: self.clock,
            timing: self.timing,
            audio_cfg: self.audio_cfg,
            guidance: self.guidance,
            input: self.input,
            display_cfg: self.display_cfg,
            _s: PhantomData,
            _k: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S, P> ControllerBuilder<S, Missing, P> {
    pub fn with_keypad(self, keypad: impl Keypad + 'static) -> ControllerBuilder<S, Set, P> {
        ControllerBuilder {
            sensor: self.sensor,
            keypad: Some(Box::new(keypad)),
            power: self.power,
            display: self.display,
            audio: self.audio,
            buzzer: self.buzzer,
            tare_button: self.tare_button,
            readout_button: self.readout_button,
            clock: self.clock,
            timing: self.timing,
            audio_cfg: self.audio_cfg,
            guidance: self.guidance,
            input: self.input,
            display_cfg: self.display_cfg,
            _s: PhantomData,
            _k: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S, K> ControllerBuilder<S, K, Missing> {
    pub fn with_power_line(self, power: impl PowerLine + 'static) -> ControllerBuilder<S, K, Set> {
        ControllerBuilder {
            sensor: self.sensor,
            keypad: self.keypad,
            power: Some(Box::new(power)),
            display: self.display,
            audio: self.audio,
            buzzer: self.buzzer,
            tare_button: self.tare_button,
            readout_button: self.readout_button,
            clock: self.clock,
            timing: self.timing,
            audio_cfg: self.audio_cfg,
            guidance: self.guidance,
            input: self.input,
            display_cfg: self.display_cfg,
            _s: PhantomData,
            _k: PhantomData,
            _p: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set, Set> {
    /// Validate and build the Controller. Only available when the sensor,
    /// keypad and power line are set.
    pub fn build(self) -> Result<Controller> {
        self.try_build()
    }
}
