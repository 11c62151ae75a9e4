//! Device assembly and the `run` / `self-check` commands.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use scale_core::{Controller, RunOutcome, ScaleError, StopReason, Token, Zone};
use scale_hardware::{
    LogAudio, LogBuzzer, LogDisplay, ScriptedKeypad, SimButton, SimPowerLine, SimulatedSensor,
    UnavailableAudio,
};
use scale_traits::AudioPlayer;
use scale_traits::clock::test_clock::TestClock;

pub struct RunArgs {
    pub sim: bool,
    pub keys: String,
    pub ramp_g: f32,
    pub ramp_to: Option<f32>,
    pub max_ticks: Option<u64>,
    pub idle_timeout_s: Option<u64>,
}

/// What a finished run looked like, for printing.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub target_g: Option<i32>,
    pub reading_g: Option<i32>,
    pub zone: Zone,
    pub voice_muted: bool,
    pub sensor_fault: bool,
    /// Clips played, in order. Only known for simulated runs.
    pub spoken: Option<Vec<Token>>,
    pub power_cut: Option<bool>,
}

pub fn stop_reason_name(r: StopReason) -> &'static str {
    match r {
        StopReason::PoweredOff => "powered-off",
        StopReason::Interrupted => "interrupted",
        StopReason::TickLimit => "tick-limit",
    }
}

/// Handles into a simulated device set, kept after the controller takes
/// ownership of the devices.
struct SimProbe {
    played: Rc<RefCell<Vec<u16>>>,
    power_cut: Rc<Cell<bool>>,
}

impl SimProbe {
    fn spoken(&self) -> Vec<Token> {
        self.played
            .borrow()
            .iter()
            .filter_map(|t| Token::from_track(*t))
            .collect()
    }
}

fn build_sim(cfg: &scale_config::Config, args: &RunArgs) -> eyre::Result<(Controller, SimProbe)> {
    let sensor = SimulatedSensor::new().with_ramp(args.ramp_g, args.ramp_to);
    let audio = LogAudio::new();
    let power = SimPowerLine::new();
    let probe = SimProbe {
        played: audio.played_handle(),
        power_cut: power.asserted_handle(),
    };

    // Virtual time: tick pauses, tones and idle timeouts cost nothing.
    let controller = Controller::builder()
        .with_config(cfg)
        .with_clock(Box::new(TestClock::new()))
        .with_sensor(sensor)
        .with_keypad(ScriptedKeypad::new(&args.keys))
        .with_power_line(power)
        .with_display(LogDisplay::new())
        .with_audio(audio)
        .with_buzzer(LogBuzzer::new())
        .with_tare_button(SimButton::new())
        .with_readout_button(SimButton::new())
        .build()
        .wrap_err("assembling simulated scale")?;
    Ok((controller, probe))
}

/// A missing audio module is not fatal: the scale runs silently with the
/// display and buzzer still working.
#[cfg_attr(not(all(feature = "hardware", target_os = "linux")), allow(dead_code))]
pub fn audio_or_muted<A, E>(opened: Result<A, E>) -> Box<dyn AudioPlayer>
where
    A: AudioPlayer + 'static,
    E: std::fmt::Display,
{
    match opened {
        Ok(a) => Box::new(a),
        Err(e) => {
            let err = ScaleError::AudioDeviceUnavailable(e.to_string());
            tracing::warn!(error = %err, "audio module unavailable; running silent");
            Box::new(UnavailableAudio::new(e.to_string()))
        }
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
const DISPLAY_BRIGHTNESS: u8 = 7;

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn build_hardware(cfg: &scale_config::Config) -> eyre::Result<Controller> {
    use scale_hardware::hardware::{
        DfPlayer, Gpio, GpioButton, GpioBuzzer, GpioPowerLine, Hx711Sensor, MatrixKeypad, Tm1637,
    };

    let pins = &cfg.pins;
    let gpio = Gpio::new().wrap_err("open gpio")?;
    let sensor = Hx711Sensor::try_new(
        pins.hx711_dt,
        pins.hx711_sck,
        cfg.sensor.scale_factor,
        cfg.sensor.samples,
        cfg.sensor.read_timeout_ms,
    )
    .wrap_err("open hx711")?;
    let keypad = MatrixKeypad::try_new(&gpio, &pins.keypad_rows, &pins.keypad_cols)
        .wrap_err("open keypad pins")?;
    let power = GpioPowerLine::try_new(&gpio, pins.power_cutoff).wrap_err("open power cutoff pin")?;
    let display = Tm1637::try_new(&gpio, pins.display_clk, pins.display_dio, DISPLAY_BRIGHTNESS)
        .wrap_err("open display pins")?;
    let audio = audio_or_muted(DfPlayer::try_new(
        &gpio,
        &cfg.audio.uart,
        cfg.audio.baud,
        cfg.audio.volume,
        pins.audio_busy,
    ));
    let buzzer = GpioBuzzer::try_new(&gpio, pins.buzzer).wrap_err("open buzzer pin")?;
    let tare = GpioButton::try_new(&gpio, pins.tare_button).wrap_err("open tare button pin")?;
    let readout =
        GpioButton::try_new(&gpio, pins.readout_button).wrap_err("open readout button pin")?;

    Controller::builder()
        .with_config(cfg)
        .with_sensor(sensor)
        .with_keypad(keypad)
        .with_power_line(power)
        .with_display(display)
        .with_audio(audio)
        .with_buzzer(buzzer)
        .with_tare_button(tare)
        .with_readout_button(readout)
        .build()
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn build_hardware(_cfg: &scale_config::Config) -> eyre::Result<Controller> {
    Err(eyre::Report::new(ScaleError::Hardware(
        "built without the `hardware` feature; pass --sim".into(),
    )))
}

fn report(controller: &Controller, outcome: RunOutcome, probe: Option<&SimProbe>) -> RunReport {
    RunReport {
        outcome,
        target_g: controller.target(),
        reading_g: controller.reading(),
        zone: controller.zone(),
        voice_muted: controller.voice_muted(),
        sensor_fault: controller.sensor_fault(),
        spoken: probe.map(SimProbe::spoken),
        power_cut: probe.map(|p| p.power_cut.get()),
    }
}

pub fn run_scale(
    cfg: &scale_config::Config,
    args: &RunArgs,
    interrupt: &AtomicBool,
) -> eyre::Result<RunReport> {
    let mut cfg = cfg.clone();
    if let Some(s) = args.idle_timeout_s {
        cfg.timing.idle_timeout_s = s;
        cfg.validate().wrap_err("--idle-timeout-s")?;
    }

    if args.sim {
        let (mut controller, probe) = build_sim(&cfg, args)?;
        let outcome = scale_core::run(&mut controller, interrupt, args.max_ticks)?;
        Ok(report(&controller, outcome, Some(&probe)))
    } else {
        let mut controller = build_hardware(&cfg)?;
        tracing::info!("hardware scale assembled");
        let outcome = scale_core::run(&mut controller, interrupt, args.max_ticks)?;
        Ok(report(&controller, outcome, None))
    }
}

/// Boot the device set and run one tick; fails if the sensor cannot be read.
pub fn self_check(cfg: &scale_config::Config, sim: bool) -> eyre::Result<()> {
    let mut controller = if sim {
        let args = RunArgs {
            sim: true,
            keys: String::new(),
            ramp_g: 0.0,
            ramp_to: None,
            max_ticks: Some(1),
            idle_timeout_s: None,
        };
        build_sim(cfg, &args)?.0
    } else {
        build_hardware(cfg)?
    };
    controller.begin();
    controller.tick().wrap_err("self-check tick")?;
    if controller.sensor_fault() {
        return Err(eyre::Report::new(ScaleError::SensorUnavailable(
            "no reading during self-check".into(),
        )));
    }
    Ok(())
}
