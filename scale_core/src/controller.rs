//! The dispatch loop (`Controller`).
//!
//! Owns every piece of interaction state (reading, target, input session,
//! zone, activity timer) and the collaborators. Each [`Controller::tick`]
//! runs the same fixed sequence:
//!
//! 1. sample the sensor and update the debounced reading
//! 2. refresh the display
//! 3. service the tare button
//! 4. service the readout button
//! 5. service the keypad
//! 6. evaluate the guidance zone (only with a target)
//! 7. evaluate the idle timeout
//!
//! Only the content of a step is conditional; no step is skipped.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use scale_traits::{Button, Buzzer, Clock, DigitDisplay, Key, Keypad, PowerLine, WeightSensor};

use crate::activity::ActivityMonitor;
use crate::config::*;
use crate::debounce::Debouncer;
use crate::error::{Result, ScaleError};
use crate::guidance::{Zone, classify};
use crate::hw_error::map_hw_error;
use crate::input::{InputEvent, InputState, TargetInput};
use crate::quantize::{clamp_to_display, quantize_grams};
use crate::speech::{Utterance, phrase};
use crate::status::TickStatus;
use crate::util::{ms, secs_floor};
use crate::voice::{PlayOutcome, Voice};

pub struct Controller {
    pub(crate) sensor: Box<dyn WeightSensor>,
    pub(crate) keypad: Box<dyn Keypad>,
    pub(crate) display: Box<dyn DigitDisplay>,
    pub(crate) buzzer: Box<dyn Buzzer>,
    pub(crate) power: Box<dyn PowerLine>,
    pub(crate) tare_button: Box<dyn Button>,
    pub(crate) readout_button: Box<dyn Button>,
    pub(crate) voice: Voice,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) timing: TimingCfg,
    pub(crate) guidance: GuidanceCfg,
    pub(crate) display_cfg: DisplayCfg,

    pub(crate) debouncer: Debouncer,
    pub(crate) input: TargetInput,
    pub(crate) target: Option<i32>,
    pub(crate) zone: Zone,
    pub(crate) activity: ActivityMonitor,
    pub(crate) sensor_fault: bool,
    pub(crate) tare_held: bool,
    pub(crate) readout_held: bool,
    pub(crate) powered_off: bool,
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("reading_g", &self.debouncer.reading())
            .field("target_g", &self.target)
            .field("input", &self.input.state())
            .field("zone", &self.zone)
            .field("sensor_fault", &self.sensor_fault)
            .field("powered_off", &self.powered_off)
            .finish()
    }
}

impl Controller {
    /// Start building a Controller.
    pub fn builder() -> crate::builder::ControllerBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::ControllerBuilder::default()
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Current whole-gram reading; `None` before the first good sample.
    pub fn reading(&self) -> Option<i32> {
        self.debouncer.reading()
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    /// Zone evaluated on the last tick.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn input_state(&self) -> InputState {
        self.input.state()
    }

    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    pub fn voice_muted(&self) -> bool {
        self.voice.is_muted()
    }

    pub fn is_powered_off(&self) -> bool {
        self.powered_off
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    /// Milliseconds since `begin()` (or construction).
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    // ── Boot ─────────────────────────────────────────────────────────────────

    /// Power-up sequence: bring up audio, announce, tare, announce ready,
    /// and start the idle timer. Audio and sensor failures are logged and
    /// the device carries on.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        if let Err(e) = self.voice.init() {
            tracing::warn!(error = %e, "audio init failed; continuing without voice");
        }
        self.say(phrase::power_up());
        self.say(phrase::calibrating());
        self.tare();
        self.say(phrase::ready());
        self.activity = ActivityMonitor::new(self.timing.idle_timeout_ms, self.now_ms());
        tracing::info!(
            idle_timeout_s = secs_floor(self.timing.idle_timeout_ms),
            "ready"
        );
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// One pass of the dispatch loop.
    ///
    /// The only error is a failed power cutoff; everything else degrades
    /// and is logged.
    pub fn tick(&mut self) -> Result<TickStatus> {
        if self.powered_off {
            return Ok(TickStatus::ShutDown);
        }

        let now = self.now_ms();
        self.sample(now);
        self.refresh_display();
        // Activity is stamped after each reply so speech and tones never
        // eat into the idle period.
        if self.tare_button_pressed() {
            self.tare();
            self.activity.touch(self.now_ms());
        }
        if self.readout_button_pressed() {
            self.readout();
            self.activity.touch(self.now_ms());
        }
        self.service_keypad();
        self.evaluate_guidance();

        if self.activity.check_expired(self.now_ms()) {
            self.shut_down()?;
            return Ok(TickStatus::ShutDown);
        }
        Ok(TickStatus::Running)
    }

    fn sample(&mut self, now: u64) {
        match self.sensor.sample() {
            Ok(g) => {
                if self.sensor_fault {
                    tracing::info!("sensor recovered");
                }
                self.sensor_fault = false;
                let grams = quantize_grams(g);
                if self.debouncer.update(grams, now) {
                    tracing::debug!(reading_g = grams, "reading changed");
                }
                if let Some(stable) = self.debouncer.take_stable(now) {
                    tracing::debug!(reading_g = stable, "stable reading");
                    self.say_number(phrase::reading(stable));
                }
            }
            Err(e) => {
                if !self.sensor_fault {
                    let err = ScaleError::SensorUnavailable(map_hw_error(&*e).to_string());
                    tracing::warn!(error = %err, "sensor sample failed");
                }
                self.sensor_fault = true;
            }
        }
    }

    fn refresh_display(&mut self) {
        let res = if let Some(buffer) = self.input.buffer() {
            let value = i32::try_from(buffer).unwrap_or(i32::MAX);
            self.display
                .show(clamp_to_display(value, self.display_cfg.digits), self.display_cfg.digits)
        } else if self.sensor_fault {
            self.display.show_fault()
        } else {
            let value = self.debouncer.reading().unwrap_or(0);
            self.display
                .show(clamp_to_display(value, self.display_cfg.digits), self.display_cfg.digits)
        };
        if let Err(e) = res {
            tracing::debug!(error = %map_hw_error(&*e), "display update failed");
        }
    }

    fn tare_button_pressed(&mut self) -> bool {
        let now = poll_button(&mut *self.tare_button, "tare");
        let edge = now && !self.tare_held;
        self.tare_held = now;
        edge
    }

    fn readout_button_pressed(&mut self) -> bool {
        let now = poll_button(&mut *self.readout_button, "readout");
        let edge = now && !self.readout_held;
        self.readout_held = now;
        edge
    }

    fn tare(&mut self) {
        match self.sensor.zero() {
            Ok(()) => {
                tracing::info!("tared");
                self.debouncer.mark_announced(0);
                self.say(phrase::zero());
            }
            Err(e) => {
                let err = ScaleError::SensorUnavailable(map_hw_error(&*e).to_string());
                tracing::warn!(error = %err, "tare failed");
            }
        }
    }

    fn readout(&mut self) {
        if self.sensor_fault {
            tracing::debug!("readout skipped: sensor fault");
            return;
        }
        let grams = self.debouncer.reading().unwrap_or(0);
        self.say_number(phrase::current_reading(grams));
    }

    fn service_keypad(&mut self) {
        let key = match self.keypad.poll_key() {
            Ok(Some(k)) => k,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(error = %map_hw_error(&*e), "keypad poll failed");
                return;
            }
        };
        self.handle_key(key);
        self.activity.touch(self.now_ms());
    }

    fn handle_key(&mut self, key: Key) {
        tracing::debug!(key = %key, "key");
        match self.input.press(key) {
            InputEvent::Entering { buffer } => {
                self.refresh_display();
                self.say_number(phrase::entry(buffer));
            }
            InputEvent::Overflow { buffer } => {
                let err = ScaleError::InputOverflow {
                    max_digits: self.input.max_digits(),
                };
                tracing::warn!(buffer, error = %err, "digit rejected");
                self.say(phrase::overflow());
            }
            InputEvent::Cancelled => {
                tracing::info!(target_g = ?self.target, "entry cancelled");
                self.refresh_display();
                self.say(phrase::entry_cancelled());
            }
            InputEvent::Committed { target } => {
                let target = i32::try_from(target).unwrap_or(i32::MAX);
                tracing::info!(target_g = target, "target set");
                self.target = Some(target);
                self.zone = Zone::Silent;
                self.refresh_display();
                self.say_number(phrase::target_set(target));
            }
            InputEvent::ReportTarget => {
                self.say_number(phrase::target_report(self.target));
            }
            InputEvent::ClearTarget => {
                if self.target.take().is_some() {
                    tracing::info!("target removed");
                }
                self.zone = Zone::Silent;
                self.say(phrase::target_removed());
            }
        }
    }

    fn evaluate_guidance(&mut self) {
        let zone = match (self.target, self.debouncer.reading()) {
            (Some(target), Some(reading)) if !self.sensor_fault => {
                classify(&self.guidance, target, reading)
            }
            _ => Zone::Silent,
        };
        let entered = zone != self.zone;
        if entered {
            tracing::debug!(
                zone = zone.as_str(),
                target_g = ?self.target,
                reading_g = ?self.debouncer.reading(),
                "zone changed"
            );
        }
        self.zone = zone;
        if !zone.is_active() {
            return;
        }
        self.play_pattern(zone);
        if entered && let Some(u) = zone.announcement() {
            self.say(u);
        }
        self.activity.touch(self.now_ms());
    }

    fn play_pattern(&mut self, zone: Zone) {
        for step in zone.pattern() {
            let res = if step.frequency_hz == 0 {
                self.buzzer.silence()
            } else {
                self.buzzer.tone(step.frequency_hz, step.duration_ms)
            };
            if let Err(e) = res {
                tracing::debug!(error = %map_hw_error(&*e), "buzzer failed");
                break;
            }
            self.clock.sleep(ms(u64::from(step.duration_ms)));
        }
        if let Err(e) = self.buzzer.silence() {
            tracing::debug!(error = %map_hw_error(&*e), "buzzer silence failed");
        }
    }

    // ── Shutdown ─────────────────────────────────────────────────────────────

    fn shut_down(&mut self) -> Result<()> {
        tracing::info!(
            idle_s = secs_floor(self.activity.idle_ms(self.now_ms())),
            "idle timeout; powering off"
        );
        self.powered_off = true;
        if let Err(e) = self.buzzer.silence() {
            tracing::debug!(error = %map_hw_error(&*e), "buzzer silence failed");
        }
        self.say(phrase::shutting_down());
        self.power
            .assert_shutdown()
            .map_err(|e| {
                let err = ScaleError::PowerCutoff(map_hw_error(&*e).to_string());
                tracing::error!(error = %err, "power cutoff failed");
                eyre::Report::new(err)
            })
            .wrap_err("asserting power cutoff")
    }

    fn say(&mut self, utterance: Utterance) {
        if self.voice.say(utterance) == PlayOutcome::TimedOut {
            tracing::debug!("utterance cut short");
        }
    }

    fn say_number(&mut self, utterance: std::result::Result<Utterance, ScaleError>) {
        match utterance {
            Ok(u) => self.say(u),
            Err(e) => tracing::warn!(error = %e, "announcement skipped"),
        }
    }
}

fn poll_button(button: &mut dyn Button, name: &'static str) -> bool {
    match button.is_pressed() {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(button = name, error = %map_hw_error(&*e), "button poll failed");
            false
        }
    }
}
