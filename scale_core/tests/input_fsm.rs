use proptest::prelude::*;
use rstest::rstest;
use scale_core::{InputEvent, InputState, TargetInput};
use scale_traits::Key;

fn keys(s: &str) -> Vec<Key> {
    s.chars().filter_map(Key::from_char).collect()
}

/// Feed keys and fold committed/cleared targets the way the controller does.
fn drive(s: &str, mut target: Option<u32>) -> (Option<u32>, InputState, Vec<InputEvent>) {
    let mut fsm = TargetInput::new(3);
    let mut events = Vec::new();
    for k in keys(s) {
        let ev = fsm.press(k);
        match ev {
            InputEvent::Committed { target: t } => target = Some(t),
            InputEvent::ClearTarget => target = None,
            _ => {}
        }
        events.push(ev);
    }
    (target, fsm.state(), events)
}

#[rstest]
#[case("5#", None, Some(5))]
#[case("53*#", None, Some(5))]
#[case("7*", Some(42), Some(42))]
#[case("120#", Some(3), Some(120))]
#[case("*", Some(42), None)]
#[case("#", Some(42), Some(42))]
#[case("9*8*", Some(1), Some(1))]
fn resulting_target(#[case] input: &str, #[case] before: Option<u32>, #[case] after: Option<u32>) {
    let (target, state, _) = drive(input, before);
    assert_eq!(target, after);
    assert_eq!(state, InputState::Idle);
}

#[rstest]
fn fourth_digit_overflows() {
    let (target, state, events) = drive("1234", None);
    assert_eq!(target, None);
    assert_eq!(state, InputState::Entering { buffer: 123 });
    assert_eq!(events.last(), Some(&InputEvent::Overflow { buffer: 123 }));
}

#[rstest]
fn cancel_leaves_target_untouched() {
    let (target, _, events) = drive("7*", Some(42));
    assert_eq!(target, Some(42));
    assert_eq!(events, vec![InputEvent::Entering { buffer: 7 }, InputEvent::Cancelled]);
}

#[rstest]
fn idle_keys_report_and_clear() {
    let (_, _, events) = drive("#*", None);
    assert_eq!(events, vec![InputEvent::ReportTarget, InputEvent::ClearTarget]);
}

#[rstest]
fn leading_zero_commits_small_value() {
    let (target, _, _) = drive("05#", None);
    assert_eq!(target, Some(5));
}

proptest! {
    #[test]
    fn buffer_never_exceeds_three_digits(s in "[0-9*#]{0,40}") {
        let mut fsm = TargetInput::new(3);
        for k in keys(&s) {
            if let InputEvent::Committed { target } = fsm.press(k) {
                prop_assert!(target <= 999);
            }
            if let Some(b) = fsm.buffer() {
                prop_assert!(b <= 999);
            }
        }
    }
}
