//! Spoken numbers and phrases.
//!
//! Every word or phrase the device can say is a [`Token`], one pre-recorded
//! clip on the audio module. Numbers are composed from place-value tokens by
//! [`compose`]; sequences are wrapped in an [`Utterance`] and handed to the
//! voice, which plays them strictly in order.

use crate::error::ScaleError;

/// Smallest number [`compose`] accepts.
pub const MIN_SPEAKABLE: i32 = -999_999;
/// Largest number [`compose`] accepts.
pub const MAX_SPEAKABLE: i32 = 999_999;

macro_rules! tokens {
    ($($variant:ident => $name:literal, $text:literal,)+) => {
        /// Identifier of one recorded clip.
        ///
        /// The declaration order is the clip numbering on the audio module:
        /// the first variant is track 1. Only append new variants.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum Token {
            $($variant,)+
        }

        impl Token {
            /// Every token, in track order.
            pub const ALL: &'static [Token] = &[$(Token::$variant,)+];

            /// Stable identifier, e.g. `ONE_HUNDRED`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Token::$variant => $name,)+
                }
            }

            /// What the clip says.
            pub fn text(self) -> &'static str {
                match self {
                    $(Token::$variant => $text,)+
                }
            }
        }
    };
}

tokens! {
    Zero => "ZERO", "zero",
    One => "ONE", "one",
    Two => "TWO", "two",
    Three => "THREE", "three",
    Four => "FOUR", "four",
    Five => "FIVE", "five",
    Six => "SIX", "six",
    Seven => "SEVEN", "seven",
    Eight => "EIGHT", "eight",
    Nine => "NINE", "nine",
    Ten => "TEN", "ten",
    Eleven => "ELEVEN", "eleven",
    Twelve => "TWELVE", "twelve",
    Thirteen => "THIRTEEN", "thirteen",
    Fourteen => "FOURTEEN", "fourteen",
    Fifteen => "FIFTEEN", "fifteen",
    Sixteen => "SIXTEEN", "sixteen",
    Seventeen => "SEVENTEEN", "seventeen",
    Eighteen => "EIGHTEEN", "eighteen",
    Nineteen => "NINETEEN", "nineteen",
    Twenty => "TWENTY", "twenty",
    Thirty => "THIRTY", "thirty",
    Forty => "FORTY", "forty",
    Fifty => "FIFTY", "fifty",
    Sixty => "SIXTY", "sixty",
    Seventy => "SEVENTY", "seventy",
    Eighty => "EIGHTY", "eighty",
    Ninety => "NINETY", "ninety",
    OneHundred => "ONE_HUNDRED", "one hundred",
    TwoHundred => "TWO_HUNDRED", "two hundred",
    ThreeHundred => "THREE_HUNDRED", "three hundred",
    FourHundred => "FOUR_HUNDRED", "four hundred",
    FiveHundred => "FIVE_HUNDRED", "five hundred",
    SixHundred => "SIX_HUNDRED", "six hundred",
    SevenHundred => "SEVEN_HUNDRED", "seven hundred",
    EightHundred => "EIGHT_HUNDRED", "eight hundred",
    NineHundred => "NINE_HUNDRED", "nine hundred",
    OneThousand => "ONE_THOUSAND", "one thousand",
    TwoThousand => "TWO_THOUSAND", "two thousand",
    ThreeThousand => "THREE_THOUSAND", "three thousand",
    FourThousand => "FOUR_THOUSAND", "four thousand",
    FiveThousand => "FIVE_THOUSAND", "five thousand",
    SixThousand => "SIX_THOUSAND", "six thousand",
    SevenThousand => "SEVEN_THOUSAND", "seven thousand",
    EightThousand => "EIGHT_THOUSAND", "eight thousand",
    NineThousand => "NINE_THOUSAND", "nine thousand",
    Thousand => "THOUSAND", "thousand",
    Negative => "NEGATIVE", "negative",
    PowerUp => "POWER_UP", "power up",
    Calibrating => "CALIBRATING", "calibrating",
    Ready => "READY", "ready",
    Current => "CURRENT", "current",
    Reading => "READING", "reading",
    No => "NO", "no",
    New => "NEW", "new",
    Target => "TARGET", "target",
    Weight => "WEIGHT", "weight",
    Setting => "SETTING", "setting",
    Removed => "REMOVED", "removed",
    InputCancelled => "INPUT_CANCELLED", "input cancelled",
    TargetUnchanged => "TARGET_UNCHANGED", "target unchanged",
    ExceededMaximumInput => "EXCEEDED_MAXIMUM_INPUT", "exceeded maximum input",
    TargetReached => "TARGET_REACHED", "target reached",
    Overshot => "OVERSHOT", "overshot",
    TimingOut => "TIMING_OUT", "timing out",
    TurningOff => "TURNING_OFF", "turning off",
}

const UNITS: [Token; 19] = [
    Token::One,
    Token::Two,
    Token::Three,
    Token::Four,
    Token::Five,
    Token::Six,
    Token::Seven,
    Token::Eight,
    Token::Nine,
    Token::Ten,
    Token::Eleven,
    Token::Twelve,
    Token::Thirteen,
    Token::Fourteen,
    Token::Fifteen,
    Token::Sixteen,
    Token::Seventeen,
    Token::Eighteen,
    Token::Nineteen,
];

const TENS: [Token; 8] = [
    Token::Twenty,
    Token::Thirty,
    Token::Forty,
    Token::Fifty,
    Token::Sixty,
    Token::Seventy,
    Token::Eighty,
    Token::Ninety,
];

const HUNDREDS: [Token; 9] = [
    Token::OneHundred,
    Token::TwoHundred,
    Token::ThreeHundred,
    Token::FourHundred,
    Token::FiveHundred,
    Token::SixHundred,
    Token::SevenHundred,
    Token::EightHundred,
    Token::NineHundred,
];

const THOUSANDS: [Token; 9] = [
    Token::OneThousand,
    Token::TwoThousand,
    Token::ThreeThousand,
    Token::FourThousand,
    Token::FiveThousand,
    Token::SixThousand,
    Token::SevenThousand,
    Token::EightThousand,
    Token::NineThousand,
];

/// Numeric meaning of a token when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    /// Adds to the current group.
    Add(u32),
    /// Multiplies the current group by one thousand.
    Thousand,
    /// Sign prefix.
    Negate,
}

impl Token {
    /// Clip number on the audio module (1-based).
    #[inline]
    pub fn track(self) -> u16 {
        self as u16 + 1
    }

    pub fn from_track(track: u16) -> Option<Self> {
        Self::ALL.get(usize::from(track.checked_sub(1)?)).copied()
    }

    pub fn numeric(self) -> Option<Numeric> {
        let pos = |table: &[Token]| table.iter().position(|t| *t == self);
        match self {
            Token::Zero => Some(Numeric::Add(0)),
            Token::Thousand => Some(Numeric::Thousand),
            Token::Negative => Some(Numeric::Negate),
            _ => {
                if let Some(i) = pos(&UNITS) {
                    Some(Numeric::Add(i as u32 + 1))
                } else if let Some(i) = pos(&TENS) {
                    Some(Numeric::Add((i as u32 + 2) * 10))
                } else if let Some(i) = pos(&HUNDREDS) {
                    Some(Numeric::Add((i as u32 + 1) * 100))
                } else {
                    pos(&THOUSANDS).map(|i| Numeric::Add((i as u32 + 1) * 1000))
                }
            }
        }
    }
}

/// Tokens for `n`, in speaking order.
///
/// Place values are visited thousands → hundreds → tens → units, each
/// non-zero group emitting one token. Thousands counts of ten or more are
/// spoken as a sub-thousand number followed by [`Token::Thousand`], so
/// `25_000` is `[TWENTY, FIVE, THOUSAND]` while `5_000` is `[FIVE_THOUSAND]`.
pub fn compose(n: i32) -> Result<Vec<Token>, ScaleError> {
    if !(MIN_SPEAKABLE..=MAX_SPEAKABLE).contains(&n) {
        return Err(ScaleError::Unspeakable(n));
    }
    let mut out = Vec::with_capacity(8);
    if n < 0 {
        out.push(Token::Negative);
    }
    let mut rest = n.unsigned_abs();
    if rest == 0 {
        out.push(Token::Zero);
        return Ok(out);
    }

    let thousands = rest / 1000;
    if thousands > 0 {
        if thousands < 10 {
            out.push(THOUSANDS[thousands as usize - 1]);
        } else {
            push_below_thousand(thousands, &mut out);
            out.push(Token::Thousand);
        }
        rest %= 1000;
    }
    push_below_thousand(rest, &mut out);
    Ok(out)
}

/// `n` must be below 1000.
fn push_below_thousand(mut n: u32, out: &mut Vec<Token>) {
    debug_assert!(n < 1000);
    if n >= 100 {
        out.push(HUNDREDS[(n / 100) as usize - 1]);
        n %= 100;
    }
    // 11..=19 have their own clips; only 20 and up split into tens + units.
    if n >= 20 {
        out.push(TENS[(n / 10) as usize - 2]);
        n %= 10;
    }
    if n > 0 {
        out.push(UNITS[n as usize - 1]);
    }
}

/// Inverse of [`compose`]; `None` for sequences it never produces.
pub fn decode(tokens: &[Token]) -> Option<i32> {
    let mut iter = tokens.iter().copied().peekable();
    let negative = iter.next_if_eq(&Token::Negative).is_some();

    let mut total: i64 = 0;
    let mut group: i64 = 0;
    let mut any = false;
    for t in iter {
        match t.numeric()? {
            Numeric::Add(v) => {
                group += i64::from(v);
                any = true;
            }
            Numeric::Thousand => {
                if group == 0 {
                    return None;
                }
                total += group * 1000;
                group = 0;
            }
            Numeric::Negate => return None,
        }
    }
    if !any {
        return None;
    }
    let v = total + group;
    i32::try_from(if negative { -v } else { v }).ok()
}

/// An ordered, play-once sequence of tokens.
///
/// Consumed by iteration; there is no way to rewind it.
#[derive(Debug)]
pub struct Utterance {
    tokens: std::vec::IntoIter<Token>,
}

impl Utterance {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
        }
    }

    pub fn phrase(words: &[Token]) -> Self {
        Self::new(words.to_vec())
    }

    /// `words` followed by the spoken form of `n`.
    pub fn with_number(words: &[Token], n: i32) -> Result<Self, ScaleError> {
        let number = compose(n)?;
        let mut tokens = Vec::with_capacity(words.len() + number.len());
        tokens.extend_from_slice(words);
        tokens.extend(number);
        Ok(Self::new(tokens))
    }
}

impl Iterator for Utterance {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tokens.size_hint()
    }
}

impl ExactSizeIterator for Utterance {}

/// The device's fixed announcements.
pub mod phrase {
    use super::{Token, Utterance};
    use crate::error::ScaleError;

    pub fn power_up() -> Utterance {
        Utterance::phrase(&[Token::PowerUp])
    }

    pub fn calibrating() -> Utterance {
        Utterance::phrase(&[Token::Calibrating])
    }

    pub fn ready() -> Utterance {
        Utterance::phrase(&[Token::Ready])
    }

    pub fn zero() -> Utterance {
        Utterance::phrase(&[Token::Zero])
    }

    /// Stable reading: just the number.
    pub fn reading(grams: i32) -> Result<Utterance, ScaleError> {
        Utterance::with_number(&[], grams)
    }

    /// Readout button.
    pub fn current_reading(grams: i32) -> Result<Utterance, ScaleError> {
        Utterance::with_number(&[Token::Current, Token::Reading], grams)
    }

    /// `#` with no entry open.
    pub fn target_report(target: Option<i32>) -> Result<Utterance, ScaleError> {
        match target {
            Some(g) => Utterance::with_number(&[Token::Target, Token::Weight], g),
            None => Ok(Utterance::phrase(&[Token::No, Token::Target, Token::Weight])),
        }
    }

    pub fn target_removed() -> Utterance {
        Utterance::phrase(&[Token::Target, Token::Weight, Token::Removed])
    }

    /// Echo of the digit buffer while typing.
    pub fn entry(buffer: u32) -> Result<Utterance, ScaleError> {
        let n = i32::try_from(buffer).map_err(|_| ScaleError::Unspeakable(i32::MAX))?;
        Utterance::with_number(&[Token::New, Token::Target, Token::Weight], n)
    }

    pub fn overflow() -> Utterance {
        Utterance::phrase(&[Token::ExceededMaximumInput])
    }

    pub fn entry_cancelled() -> Utterance {
        Utterance::phrase(&[Token::InputCancelled, Token::TargetUnchanged])
    }

    pub fn target_set(target: i32) -> Result<Utterance, ScaleError> {
        Utterance::with_number(&[Token::Setting, Token::Target, Token::Weight], target)
    }

    pub fn target_reached() -> Utterance {
        Utterance::phrase(&[Token::TargetReached])
    }

    pub fn overshot() -> Utterance {
        Utterance::phrase(&[Token::Overshot])
    }

    pub fn shutting_down() -> Utterance {
        Utterance::phrase(&[Token::TimingOut, Token::TurningOff])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    #[test]
    fn tracks_are_one_based_and_dense() {
        assert_eq!(Zero.track(), 1);
        assert_eq!(Token::ALL.len(), 66);
        for (i, t) in Token::ALL.iter().enumerate() {
            assert_eq!(usize::from(t.track()), i + 1);
            assert_eq!(Token::from_track(t.track()), Some(*t));
        }
        assert_eq!(Token::from_track(0), None);
        assert_eq!(Token::from_track(67), None);
    }

    #[test]
    fn names_are_screaming_snake_case() {
        assert_eq!(OneHundred.name(), "ONE_HUNDRED");
        assert_eq!(ExceededMaximumInput.name(), "EXCEEDED_MAXIMUM_INPUT");
        assert_eq!(Zero.name(), "ZERO");
    }

    #[test]
    fn utterance_is_consumed_in_order() {
        let mut u = phrase::current_reading(42).expect("speakable");
        assert_eq!(u.len(), 4);
        assert_eq!(u.next(), Some(Current));
        assert_eq!(u.next(), Some(Reading));
        assert_eq!(u.next(), Some(Forty));
        assert_eq!(u.next(), Some(Two));
        assert_eq!(u.next(), None);
        assert_eq!(u.next(), None);
    }

    #[test]
    fn decode_rejects_malformed_sequences() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[Negative]), None);
        assert_eq!(decode(&[Thousand]), None);
        assert_eq!(decode(&[Five, Negative]), None);
        assert_eq!(decode(&[Target, Five]), None);
    }
}
