use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::error::Error;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use rstest::rstest;
use scale_core::error::ScaleError;
use scale_core::speech::Token::{self, *};
use scale_core::{
    Controller, InputState, StopReason, TickStatus, TimingCfg, Zone, run,
};
use scale_traits::clock::test_clock::TestClock;
use scale_traits::{
    AudioPlayer, Button, Buzzer, DigitDisplay, Key, Keypad, PowerLine, WeightSensor,
};

type HwResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SensorState {
    raw: f32,
    offset: f32,
    fail: bool,
    zeros: u32,
}

struct FakeSensor(Rc<RefCell<SensorState>>);
impl WeightSensor for FakeSensor {
    fn sample(&mut self) -> HwResult<f32> {
        let s = self.0.borrow();
        if s.fail {
            return Err("hx711 not ready".into());
        }
        Ok(s.raw - s.offset)
    }
    fn zero(&mut self) -> HwResult<()> {
        let mut s = self.0.borrow_mut();
        s.offset = s.raw;
        s.zeros += 1;
        Ok(())
    }
}

struct QueueKeypad(Rc<RefCell<VecDeque<Key>>>);
impl Keypad for QueueKeypad {
    fn poll_key(&mut self) -> HwResult<Option<Key>> {
        Ok(self.0.borrow_mut().pop_front())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shown {
    Value(i32),
    Fault,
}

struct RecDisplay(Rc<RefCell<Vec<Shown>>>);
impl DigitDisplay for RecDisplay {
    fn show(&mut self, value: i32, _digits: u8) -> HwResult<()> {
        self.0.borrow_mut().push(Shown::Value(value));
        Ok(())
    }
    fn show_fault(&mut self) -> HwResult<()> {
        self.0.borrow_mut().push(Shown::Fault);
        Ok(())
    }
}

struct RecAudio {
    tracks: Rc<RefCell<Vec<u16>>>,
    fail_init: bool,
}
impl AudioPlayer for RecAudio {
    fn init(&mut self) -> HwResult<()> {
        if self.fail_init {
            return Err("no sd card".into());
        }
        Ok(())
    }
    fn play(&mut self, track: u16) -> HwResult<()> {
        self.tracks.borrow_mut().push(track);
        Ok(())
    }
    fn is_busy(&mut self) -> HwResult<bool> {
        Ok(false)
    }
}

struct RecBuzzer(Rc<RefCell<Vec<(u32, u32)>>>);
impl Buzzer for RecBuzzer {
    fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> HwResult<()> {
        self.0.borrow_mut().push((frequency_hz, duration_ms));
        Ok(())
    }
    fn silence(&mut self) -> HwResult<()> {
        Ok(())
    }
}

struct RecPower {
    asserted: Rc<Cell<u32>>,
    fail: bool,
}
impl PowerLine for RecPower {
    fn assert_shutdown(&mut self) -> HwResult<()> {
        self.asserted.set(self.asserted.get() + 1);
        if self.fail {
            return Err("gpio write failed".into());
        }
        Ok(())
    }
}

struct HoldButton(Rc<Cell<bool>>);
impl Button for HoldButton {
    fn is_pressed(&mut self) -> HwResult<bool> {
        Ok(self.0.get())
    }
}

// ── Rig ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Opts {
    fail_audio_init: bool,
    fail_power: bool,
    idle_timeout_ms: Option<u64>,
}

struct Rig {
    clock: TestClock,
    sensor: Rc<RefCell<SensorState>>,
    keys: Rc<RefCell<VecDeque<Key>>>,
    shown: Rc<RefCell<Vec<Shown>>>,
    tracks: Rc<RefCell<Vec<u16>>>,
    tones: Rc<RefCell<Vec<(u32, u32)>>>,
    power: Rc<Cell<u32>>,
    tare: Rc<Cell<bool>>,
    readout: Rc<Cell<bool>>,
    ctl: Controller,
}

impl Rig {
    fn new() -> Self {
        Self::with(Opts::default())
    }

    fn with(opts: Opts) -> Self {
        let clock = TestClock::new();
        let sensor = Rc::new(RefCell::new(SensorState::default()));
        let keys = Rc::new(RefCell::new(VecDeque::new()));
        let shown = Rc::new(RefCell::new(Vec::new()));
        let tracks = Rc::new(RefCell::new(Vec::new()));
        let tones = Rc::new(RefCell::new(Vec::new()));
        let power = Rc::new(Cell::new(0));
        let tare = Rc::new(Cell::new(false));
        let readout = Rc::new(Cell::new(false));

        let ctl = Controller::builder()
            .with_sensor(FakeSensor(sensor.clone()))
            .with_keypad(QueueKeypad(keys.clone()))
            .with_power_line(RecPower {
                asserted: power.clone(),
                fail: opts.fail_power,
            })
            .with_display(RecDisplay(shown.clone()))
            .with_audio(RecAudio {
                tracks: tracks.clone(),
                fail_init: opts.fail_audio_init,
            })
            .with_buzzer(RecBuzzer(tones.clone()))
            .with_tare_button(HoldButton(tare.clone()))
            .with_readout_button(HoldButton(readout.clone()))
            .with_timing(TimingCfg {
                tick_ms: 500,
                stable_ms: 1000,
                idle_timeout_ms: opts.idle_timeout_ms.unwrap_or(120_000),
            })
            .with_clock(Box::new(clock.clone()))
            .build()
            .expect("controller build");

        Self {
            clock,
            sensor,
            keys,
            shown,
            tracks,
            tones,
            power,
            tare,
            readout,
            ctl,
        }
    }

    fn set_raw(&self, g: f32) {
        self.sensor.borrow_mut().raw = g;
    }

    fn press(&self, s: &str) {
        self.keys
            .borrow_mut()
            .extend(s.chars().filter_map(Key::from_char));
    }

    fn tick(&mut self) -> TickStatus {
        self.ctl.tick().expect("tick")
    }

    fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    fn spoken(&self) -> Vec<Token> {
        self.tracks
            .borrow()
            .iter()
            .filter_map(|t| Token::from_track(*t))
            .collect()
    }

    fn clear_spoken(&self) {
        self.tracks.borrow_mut().clear();
    }

    fn says(&self, words: &[Token]) -> bool {
        self.spoken().windows(words.len()).any(|w| w == words)
    }

    fn count(&self, word: Token) -> usize {
        self.spoken().iter().filter(|t| **t == word).count()
    }
}

// ── Boot and readings ────────────────────────────────────────────────────────

#[rstest]
fn boot_announces_and_tares() {
    let mut rig = Rig::new();
    rig.set_raw(12.0);
    rig.ctl.begin();
    assert_eq!(rig.spoken(), vec![PowerUp, Calibrating, Zero, Ready]);
    assert_eq!(rig.sensor.borrow().zeros, 1);

    // the tared zero is not announced again once stable
    rig.clear_spoken();
    rig.tick();
    rig.clock.advance_ms(1000);
    rig.tick();
    assert!(rig.spoken().is_empty());
    assert_eq!(rig.ctl.reading(), Some(0));
}

#[rstest]
fn stable_reading_is_announced_once() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.clear_spoken();

    rig.set_raw(250.4);
    rig.tick();
    rig.clock.advance_ms(999);
    rig.tick();
    assert!(rig.spoken().is_empty());

    rig.clock.advance_ms(1);
    rig.tick();
    assert_eq!(rig.spoken(), vec![TwoHundred, Fifty]);

    rig.clock.advance_ms(5000);
    rig.tick_n(3);
    assert_eq!(rig.spoken(), vec![TwoHundred, Fifty]);
}

#[rstest]
fn display_follows_reading_and_clamps() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.set_raw(42.0);
    rig.tick();
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Value(42)));
    rig.set_raw(12_345.0);
    rig.tick();
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Value(9999)));
    rig.set_raw(-5000.0);
    rig.tick();
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Value(-999)));
}

// ── Buttons ──────────────────────────────────────────────────────────────────

#[rstest]
fn held_tare_button_acts_once() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.set_raw(80.0);
    rig.tick();
    rig.clear_spoken();

    rig.tare.set(true);
    rig.tick_n(3);
    assert_eq!(rig.sensor.borrow().zeros, 2);
    assert_eq!(rig.spoken(), vec![Zero]);

    rig.tare.set(false);
    rig.tick();
    rig.tare.set(true);
    rig.tick();
    assert_eq!(rig.sensor.borrow().zeros, 3);
}

#[rstest]
fn readout_button_speaks_current_reading() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.set_raw(13.0);
    rig.tick();
    rig.clear_spoken();

    rig.readout.set(true);
    rig.tick();
    assert_eq!(rig.spoken(), vec![Current, Reading, Thirteen]);
}

// ── Keypad ───────────────────────────────────────────────────────────────────

#[rstest]
fn entry_commits_target_and_echoes() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.clear_spoken();

    rig.press("5#");
    rig.tick();
    assert_eq!(rig.ctl.input_state(), InputState::Entering { buffer: 5 });
    assert!(rig.says(&[New, Target, Weight, Five]));
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Value(5)));

    rig.tick();
    assert_eq!(rig.ctl.target(), Some(5));
    assert_eq!(rig.ctl.input_state(), InputState::Idle);
    assert!(rig.says(&[Setting, Target, Weight, Five]));
}

#[rstest]
fn fourth_digit_is_rejected_and_announced() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("1234");
    rig.tick_n(4);
    assert_eq!(rig.ctl.input_state(), InputState::Entering { buffer: 123 });
    assert_eq!(rig.spoken().last(), Some(&ExceededMaximumInput));
}

#[rstest]
fn cancel_keeps_previous_target() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("42#7*");
    rig.tick_n(5);
    assert_eq!(rig.ctl.target(), Some(42));
    assert!(rig.says(&[InputCancelled, TargetUnchanged]));
}

#[rstest]
fn idle_hash_reports_and_star_clears() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.clear_spoken();

    rig.press("#");
    rig.tick();
    assert_eq!(rig.spoken(), vec![No, Target, Weight]);

    rig.press("9#*");
    rig.tick_n(3);
    assert_eq!(rig.ctl.target(), None);
    assert!(rig.says(&[Target, Weight, Removed]));
}

// ── Guidance ─────────────────────────────────────────────────────────────────

#[rstest]
fn hit_plays_every_tick_but_speaks_once() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("100#");
    rig.tick_n(4);
    assert_eq!(rig.ctl.target(), Some(100));

    rig.set_raw(100.0);
    rig.tick();
    assert_eq!(rig.ctl.zone(), Zone::Hit);
    rig.tick();
    assert_eq!(rig.count(TargetReached), 1);
    let sustained = rig
        .tones
        .borrow()
        .iter()
        .filter(|t| **t == (440, 1000))
        .count();
    assert_eq!(sustained, 2);
}

#[rstest]
fn overshoot_warbles_and_speaks() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("50#");
    rig.tick_n(3);

    rig.set_raw(60.0);
    rig.tick();
    assert_eq!(rig.ctl.zone(), Zone::Overshot);
    assert_eq!(rig.count(Overshot), 1);
    let tones = rig.tones.borrow();
    assert!(tones.windows(2).any(|w| w == [(440, 50), (350, 50)]));
}

#[rstest]
fn no_target_means_silence() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.set_raw(100.0);
    rig.tick_n(3);
    assert_eq!(rig.ctl.zone(), Zone::Silent);
    assert!(rig.tones.borrow().is_empty());
}

// ── Sensor faults ────────────────────────────────────────────────────────────

#[rstest]
fn sensor_fault_shows_indicator_and_skips_guidance() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("20#");
    rig.tick_n(3);
    rig.set_raw(20.0);
    rig.tick();
    assert_eq!(rig.ctl.zone(), Zone::Hit);

    rig.sensor.borrow_mut().fail = true;
    rig.tick();
    assert!(rig.ctl.sensor_fault());
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Fault));
    assert_eq!(rig.ctl.zone(), Zone::Silent);

    rig.sensor.borrow_mut().fail = false;
    rig.tick();
    assert!(!rig.ctl.sensor_fault());
    assert_eq!(rig.ctl.zone(), Zone::Hit);
}

// ── Audio degradation ────────────────────────────────────────────────────────

#[rstest]
fn audio_init_failure_mutes_but_keeps_running() {
    let mut rig = Rig::with(Opts {
        fail_audio_init: true,
        ..Opts::default()
    });
    rig.ctl.begin();
    assert!(rig.ctl.voice_muted());
    assert!(rig.spoken().is_empty());

    rig.set_raw(30.0);
    rig.tick();
    assert_eq!(rig.shown.borrow().last(), Some(&Shown::Value(30)));
}

// ── Idle timeout ─────────────────────────────────────────────────────────────

#[rstest]
fn times_out_strictly_after_idle_period() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.clear_spoken();

    rig.clock.advance_ms(120_000);
    assert_eq!(rig.tick(), TickStatus::Running);
    rig.clock.advance_ms(1);
    assert_eq!(rig.tick(), TickStatus::ShutDown);
    assert_eq!(rig.power.get(), 1);
    assert_eq!(rig.spoken(), vec![TimingOut, TurningOff]);

    // terminal
    rig.press("5");
    assert_eq!(rig.tick(), TickStatus::ShutDown);
    assert_eq!(rig.power.get(), 1);
    assert_eq!(rig.ctl.input_state(), InputState::Idle);
}

#[rstest]
#[case::keypress("key")]
#[case::tare("tare")]
#[case::readout("readout")]
fn activity_postpones_timeout(#[case] what: &str) {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.clock.advance_ms(100_000);
    match what {
        "key" => rig.press("#"),
        "tare" => rig.tare.set(true),
        _ => rig.readout.set(true),
    }
    rig.tick();
    rig.clock.advance_ms(100_000);
    assert_eq!(rig.tick(), TickStatus::Running);
    rig.clock.advance_ms(20_001);
    assert_eq!(rig.tick(), TickStatus::ShutDown);
}

#[rstest]
fn sensor_polling_alone_is_not_activity() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    for g in [1.0, 2.0, 3.0] {
        rig.set_raw(g);
        rig.clock.advance_ms(40_001);
        rig.tick();
    }
    assert!(rig.ctl.is_powered_off());
}

#[rstest]
fn guidance_counts_as_activity() {
    let mut rig = Rig::new();
    rig.ctl.begin();
    rig.press("200#");
    rig.tick_n(4);
    rig.set_raw(190.0);
    for _ in 0..5 {
        rig.clock.advance_ms(60_000);
        assert_eq!(rig.tick(), TickStatus::Running);
        assert_eq!(rig.ctl.zone(), Zone::Approaching);
    }
}

#[rstest]
#[case::approaching(46.0, Zone::Approaching)]
#[case::hit(50.0, Zone::Hit)]
#[case::overshot(60.0, Zone::Overshot)]
fn active_zone_outlasts_a_timeout_shorter_than_its_pattern(
    #[case] raw: f32,
    #[case] zone: Zone,
) {
    let mut rig = Rig::with(Opts {
        idle_timeout_ms: Some(200),
        ..Opts::default()
    });
    rig.ctl.begin();
    rig.press("50#");
    rig.tick_n(3);
    assert_eq!(rig.ctl.target(), Some(50));
    rig.set_raw(raw);
    for _ in 0..10 {
        assert_eq!(rig.tick(), TickStatus::Running);
        assert_eq!(rig.ctl.zone(), zone);
    }
    assert_eq!(rig.power.get(), 0);

    // once guidance stops, the short timeout applies again
    rig.set_raw(0.0);
    rig.tick();
    rig.clock.advance_ms(201);
    assert_eq!(rig.tick(), TickStatus::ShutDown);
}

#[rstest]
fn failed_power_cutoff_is_an_error() {
    let mut rig = Rig::with(Opts {
        fail_power: true,
        ..Opts::default()
    });
    rig.ctl.begin();
    rig.clock.advance_ms(120_001);
    let err = rig.ctl.tick().expect_err("cutoff fails");
    assert!(matches!(
        err.downcast_ref::<ScaleError>(),
        Some(ScaleError::PowerCutoff(_))
    ));
    assert!(rig.ctl.is_powered_off());
    assert_eq!(rig.ctl.tick().expect("terminal"), TickStatus::ShutDown);
    assert_eq!(rig.power.get(), 1);
}

// ── Runner ───────────────────────────────────────────────────────────────────

#[rstest]
fn runner_stops_at_tick_limit() {
    let mut rig = Rig::new();
    let stop = AtomicBool::new(false);
    let out = run(&mut rig.ctl, &stop, Some(3)).expect("run");
    assert_eq!(out.reason, StopReason::TickLimit);
    assert_eq!(out.ticks, 3);
    assert_eq!(rig.clock.elapsed_ms(), 1500);
}

#[rstest]
fn runner_honours_interrupt() {
    let mut rig = Rig::new();
    let stop = AtomicBool::new(true);
    let out = run(&mut rig.ctl, &stop, None).expect("run");
    assert_eq!(out.reason, StopReason::Interrupted);
    assert_eq!(out.ticks, 0);
}

#[rstest]
fn runner_ends_at_power_off() {
    let mut rig = Rig::new();
    let stop = AtomicBool::new(false);
    let out = run(&mut rig.ctl, &stop, None).expect("run");
    assert_eq!(out.reason, StopReason::PoweredOff);
    // 120 s of 500 ms ticks, then the first tick past the timeout
    assert_eq!(out.ticks, 242);
    assert_eq!(rig.power.get(), 1);
}
