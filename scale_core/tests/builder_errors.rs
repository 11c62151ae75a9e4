use std::error::Error;

use rstest::rstest;
use scale_core::error::BuildError;
use scale_core::{AudioCfg, Controller, GuidanceCfg, InputCfg, TimingCfg};
use scale_traits::{Key, Keypad, PowerLine, WeightSensor};

struct ConstSensor;
impl WeightSensor for ConstSensor {
    fn sample(&mut self) -> Result<f32, Box<dyn Error + Send + Sync>> {
        Ok(0.0)
    }
    fn zero(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

struct NoKeys;
impl Keypad for NoKeys {
    fn poll_key(&mut self) -> Result<Option<Key>, Box<dyn Error + Send + Sync>> {
        Ok(None)
    }
}

struct NoopPower;
impl PowerLine for NoopPower {
    fn assert_shutdown(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[rstest]
fn missing_sensor_yields_typed_build_error() {
    let err = Controller::builder()
        .with_keypad(NoKeys)
        .with_power_line(NoopPower)
        .try_build()
        .expect_err("should fail with MissingSensor");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingSensor) => {}
        other => panic!("expected MissingSensor, got: {other:?}"),
    }
}

#[rstest]
fn missing_keypad_yields_typed_build_error() {
    let err = Controller::builder()
        .with_sensor(ConstSensor)
        .with_power_line(NoopPower)
        .try_build()
        .expect_err("should fail with MissingKeypad");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingKeypad)
    ));
}

#[rstest]
fn missing_power_line_yields_typed_build_error() {
    let err = Controller::builder()
        .with_sensor(ConstSensor)
        .with_keypad(NoKeys)
        .try_build()
        .expect_err("should fail with MissingPowerLine");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingPowerLine)
    ));
}

#[rstest]
fn defaults_build() {
    let ctl = Controller::builder()
        .with_sensor(ConstSensor)
        .with_keypad(NoKeys)
        .with_power_line(NoopPower)
        .build()
        .expect("defaults are valid");
    assert_eq!(ctl.target(), None);
    assert_eq!(ctl.timing().idle_timeout_ms, 120_000);
}

fn build_with(
    timing: TimingCfg,
    audio: AudioCfg,
    guidance: GuidanceCfg,
    input: InputCfg,
) -> eyre::Result<Controller> {
    Controller::builder()
        .with_sensor(ConstSensor)
        .with_keypad(NoKeys)
        .with_power_line(NoopPower)
        .with_timing(timing)
        .with_audio_cfg(audio)
        .with_guidance(guidance)
        .with_input(input)
        .build()
}

#[rstest]
#[case::zero_tick(TimingCfg { tick_ms: 0, ..TimingCfg::default() }, AudioCfg::default(), GuidanceCfg::default(), InputCfg::default(), "tick_ms")]
#[case::zero_timeout(TimingCfg { idle_timeout_ms: 0, ..TimingCfg::default() }, AudioCfg::default(), GuidanceCfg::default(), InputCfg::default(), "idle_timeout_ms")]
#[case::zero_poll(TimingCfg::default(), AudioCfg { poll_ms: 0, ..AudioCfg::default() }, GuidanceCfg::default(), InputCfg::default(), "poll_ms")]
#[case::wait_below_poll(TimingCfg::default(), AudioCfg { max_wait_ms: 5, poll_ms: 20, ..AudioCfg::default() }, GuidanceCfg::default(), InputCfg::default(), "max_wait_ms")]
#[case::negative_margin(TimingCfg::default(), AudioCfg::default(), GuidanceCfg { overshoot_g: -1, ..GuidanceCfg::default() }, InputCfg::default(), "margins")]
#[case::pct(TimingCfg::default(), AudioCfg::default(), GuidanceCfg { approach_pct: 101, ..GuidanceCfg::default() }, InputCfg::default(), "approach_pct")]
#[case::digits(TimingCfg::default(), AudioCfg::default(), GuidanceCfg::default(), InputCfg { max_digits: 7 }, "max_digits")]
fn invalid_config_is_rejected(
    #[case] timing: TimingCfg,
    #[case] audio: AudioCfg,
    #[case] guidance: GuidanceCfg,
    #[case] input: InputCfg,
    #[case] needle: &str,
) {
    let err = build_with(timing, audio, guidance, input).expect_err("invalid config");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}
