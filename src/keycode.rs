//! Keyboard usage codes as emitted by numeric-keypad style code scanners.

use crate::constants::KEYCODE_INDEX;

/// Enter key, ends a scan.
pub const ENTER: u8 = 0x28;

/// First keycode of the digit row (the "1" key).
pub const FIRST_DIGIT: u8 = 0x1D;

/// First keycode that maps to a printable non-digit character.
pub const FIRST_PRINTABLE: u8 = 0x03;

/// Outcome of translating a single keycode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Keystroke {
    Character(char),
    Terminator,
    Ignore,
}

/// Classifies a keycode. Every byte value has a translation.
pub fn translate(code: u8) -> Keystroke {
    if code == ENTER {
        Keystroke::Terminator
    } else if code >= FIRST_DIGIT {
        Keystroke::Character(char::from((code - FIRST_DIGIT) % 10 + b'0'))
    } else if code >= FIRST_PRINTABLE {
        Keystroke::Character(char::from(code + 0x5D))
    } else {
        Keystroke::Ignore
    }
}

/// The keycode carried by a raw input report, if the report is long enough to hold one.
pub fn keycode_of(report: &[u8]) -> Option<u8> {
    report.get(KEYCODE_INDEX).copied()
}
