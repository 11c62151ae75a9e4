use proptest::prelude::*;
use rstest::rstest;
use scale_core::error::ScaleError;
use scale_core::speech::{Token::*, compose, decode, phrase};
use scale_core::Token;

#[rstest]
#[case(0, vec![Zero])]
#[case(-5, vec![Negative, Five])]
#[case(13, vec![Thirteen])]
#[case(19, vec![Nineteen])]
#[case(20, vec![Twenty])]
#[case(120, vec![OneHundred, Twenty])]
#[case(999, vec![NineHundred, Ninety, Nine])]
#[case(1050, vec![OneThousand, Fifty])]
#[case(9001, vec![NineThousand, One])]
#[case(10_000, vec![Ten, Thousand])]
#[case(25_017, vec![Twenty, Five, Thousand, Seventeen])]
#[case(-999_999, vec![Negative, NineHundred, Ninety, Nine, Thousand, NineHundred, Ninety, Nine])]
fn composes_place_values(#[case] n: i32, #[case] expected: Vec<Token>) {
    assert_eq!(compose(n).expect("in range"), expected);
}

#[rstest]
#[case(1_000_000)]
#[case(-1_000_000)]
#[case(i32::MIN)]
fn refuses_out_of_range(#[case] n: i32) {
    assert_eq!(compose(n), Err(ScaleError::Unspeakable(n)));
}

#[rstest]
fn teens_are_single_tokens() {
    for n in 10..=19 {
        assert_eq!(compose(n).expect("in range").len(), 1, "n = {n}");
    }
}

#[rstest]
fn firmware_phrases() {
    let words: Vec<Token> = phrase::target_set(250).expect("speakable").collect();
    assert_eq!(words, vec![Setting, Target, Weight, TwoHundred, Fifty]);

    let words: Vec<Token> = phrase::target_report(None).expect("speakable").collect();
    assert_eq!(words, vec![No, Target, Weight]);

    let words: Vec<Token> = phrase::entry(7).expect("speakable").collect();
    assert_eq!(words, vec![New, Target, Weight, Seven]);
}

proptest! {
    #[test]
    fn decode_inverts_compose(n in -999_999i32..=999_999) {
        let tokens = compose(n).expect("in range");
        prop_assert_eq!(decode(&tokens), Some(n));
    }

    #[test]
    fn groups_never_repeat_a_place(n in 1i32..=9_999) {
        // below ten thousand every group emits at most one token
        let tokens = compose(n).expect("in range");
        prop_assert!(tokens.len() <= 4);
        prop_assert!(!tokens.contains(&Thousand));
    }
}
