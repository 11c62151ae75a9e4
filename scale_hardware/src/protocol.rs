//! Byte-level encodings shared by the GPIO/UART drivers.
//!
//! Kept free of `rppal` so they build and test on any host.

use scale_traits::Key;

// ── DFPlayer Mini serial frames ──────────────────────────────────────────────

pub mod dfplayer {
    pub const START: u8 = 0x7E;
    pub const VERSION: u8 = 0xFF;
    pub const LEN: u8 = 0x06;
    pub const END: u8 = 0xEF;

    /// Play the n-th file on the card (1-based, card order).
    pub const CMD_PLAY: u8 = 0x03;
    /// Volume 0..=30.
    pub const CMD_VOLUME: u8 = 0x06;
    /// Equalizer preset (0 = normal).
    pub const CMD_EQ: u8 = 0x07;
    /// Select playback device (2 = SD card).
    pub const CMD_SOURCE: u8 = 0x09;
    pub const CMD_RESET: u8 = 0x0C;

    pub const SOURCE_SD: u16 = 2;
    pub const MAX_VOLUME: u8 = 30;

    /// One 10-byte command frame, no feedback requested.
    pub fn frame(cmd: u8, param: u16) -> [u8; 10] {
        let [hi, lo] = param.to_be_bytes();
        let sum = [VERSION, LEN, cmd, 0x00, hi, lo]
            .iter()
            .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
        let [ck_hi, ck_lo] = 0u16.wrapping_sub(sum).to_be_bytes();
        [START, VERSION, LEN, cmd, 0x00, hi, lo, ck_hi, ck_lo, END]
    }

    pub fn play(track: u16) -> [u8; 10] {
        frame(CMD_PLAY, track)
    }

    pub fn volume(level: u8) -> [u8; 10] {
        frame(CMD_VOLUME, u16::from(level.min(MAX_VOLUME)))
    }
}

// ── TM1637 seven-segment ─────────────────────────────────────────────────────

pub mod tm1637 {
    /// Auto-increment data write.
    pub const CMD_DATA: u8 = 0x40;
    /// First digit register.
    pub const CMD_ADDR: u8 = 0xC0;
    /// Display on, brightness in the low three bits.
    pub const CMD_DISPLAY_ON: u8 = 0x88;

    pub const MAX_DIGITS: usize = 6;

    const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];
    pub const MINUS: u8 = 0x40;
    pub const BLANK: u8 = 0x00;
    const E: u8 = 0x79;
    const R: u8 = 0x50;

    /// Right-aligned segments for `value` on `digits` positions, with a
    /// leading minus for negatives. Values that do not fit show dashes.
    pub fn encode(value: i32, digits: usize) -> Vec<u8> {
        let digits = digits.clamp(1, MAX_DIGITS);
        let text = value.to_string();
        if text.len() > digits {
            return vec![MINUS; digits];
        }
        let mut segs = vec![BLANK; digits - text.len()];
        segs.extend(text.bytes().map(|b| match b {
            b'-' => MINUS,
            d => DIGITS[usize::from(d - b'0')],
        }));
        segs
    }

    /// "Err" left-aligned.
    pub fn fault(digits: usize) -> Vec<u8> {
        let mut segs = vec![BLANK; digits.clamp(1, MAX_DIGITS)];
        for (slot, seg) in segs.iter_mut().zip([E, R, R]) {
            *slot = seg;
        }
        segs
    }
}

// ── 4x3 matrix keypad ────────────────────────────────────────────────────────

/// Key at `[row][col]`.
pub const KEYMAP: [[char; 3]; 4] = [
    ['1', '2', '3'],
    ['4', '5', '6'],
    ['7', '8', '9'],
    ['*', '0', '#'],
];

pub fn key_at(row: usize, col: usize) -> Option<Key> {
    KEYMAP
        .get(row)
        .and_then(|r| r.get(col))
        .and_then(|c| Key::from_char(*c))
}
