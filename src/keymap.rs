//! Keycode table - external key identifiers to USB HID usages.
//!
//! The sender transmits Qt-style key codes (`0x41` for `A`,
//! `0x01000020` for Shift, ...).  Each code maps to one HID usage on the
//! Keyboard/Keypad page plus the modifier bits that must be held for the
//! character to come out (e.g. `!` is `1` with Left Shift).
//!
//! A code that is listed with [`usage::NONE`] is *known* but has no HID
//! equivalent; it is distinct from a code that is missing entirely.

/// Modifier bits of byte 0 in the keyboard report.
pub mod modifier {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_META: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_META: u8 = 0x80;
}

/// HID usage IDs, Keyboard/Keypad page (0x07).
pub mod usage {
    pub const NONE: u8 = 0x00;

    pub const A: u8 = 0x04;
    pub const B: u8 = 0x05;
    pub const C: u8 = 0x06;
    pub const D: u8 = 0x07;
    pub const E: u8 = 0x08;
    pub const F: u8 = 0x09;
    pub const G: u8 = 0x0a;
    pub const H: u8 = 0x0b;
    pub const I: u8 = 0x0c;
    pub const J: u8 = 0x0d;
    pub const K: u8 = 0x0e;
    pub const L: u8 = 0x0f;
    pub const M: u8 = 0x10;
    pub const N: u8 = 0x11;
    pub const O: u8 = 0x12;
    pub const P: u8 = 0x13;
    pub const Q: u8 = 0x14;
    pub const R: u8 = 0x15;
    pub const S: u8 = 0x16;
    pub const T: u8 = 0x17;
    pub const U: u8 = 0x18;
    pub const V: u8 = 0x19;
    pub const W: u8 = 0x1a;
    pub const X: u8 = 0x1b;
    pub const Y: u8 = 0x1c;
    pub const Z: u8 = 0x1d;

    pub const N1: u8 = 0x1e;
    pub const N2: u8 = 0x1f;
    pub const N3: u8 = 0x20;
    pub const N4: u8 = 0x21;
    pub const N5: u8 = 0x22;
    pub const N6: u8 = 0x23;
    pub const N7: u8 = 0x24;
    pub const N8: u8 = 0x25;
    pub const N9: u8 = 0x26;
    pub const N0: u8 = 0x27;

    pub const ENTER: u8 = 0x28;
    pub const ESC: u8 = 0x29;
    pub const BACKSPACE: u8 = 0x2a;
    pub const TAB: u8 = 0x2b;
    pub const SPACE: u8 = 0x2c;
    pub const MINUS: u8 = 0x2d;
    pub const EQUAL: u8 = 0x2e;
    pub const LEFT_BRACE: u8 = 0x2f;
    pub const RIGHT_BRACE: u8 = 0x30;
    pub const BACKSLASH: u8 = 0x31;
    pub const SEMICOLON: u8 = 0x33;
    pub const APOSTROPHE: u8 = 0x34;
    pub const GRAVE: u8 = 0x35;
    pub const COMMA: u8 = 0x36;
    pub const DOT: u8 = 0x37;
    pub const SLASH: u8 = 0x38;
    pub const CAPS_LOCK: u8 = 0x39;

    pub const F1: u8 = 0x3a;
    pub const F2: u8 = 0x3b;
    pub const F3: u8 = 0x3c;
    pub const F4: u8 = 0x3d;
    pub const F5: u8 = 0x3e;
    pub const F6: u8 = 0x3f;
    pub const F7: u8 = 0x40;
    pub const F8: u8 = 0x41;
    pub const F9: u8 = 0x42;
    pub const F10: u8 = 0x43;
    pub const F11: u8 = 0x44;
    pub const F12: u8 = 0x45;

    pub const SYSRQ: u8 = 0x46;
    pub const SCROLL_LOCK: u8 = 0x47;
    pub const PAUSE: u8 = 0x48;
    pub const INSERT: u8 = 0x49;
    pub const HOME: u8 = 0x4a;
    pub const PAGE_UP: u8 = 0x4b;
    pub const DELETE: u8 = 0x4c;
    pub const END: u8 = 0x4d;
    pub const PAGE_DOWN: u8 = 0x4e;
    pub const RIGHT: u8 = 0x4f;
    pub const LEFT: u8 = 0x50;
    pub const DOWN: u8 = 0x51;
    pub const UP: u8 = 0x52;
    pub const NUM_LOCK: u8 = 0x53;
    pub const KP_ASTERISK: u8 = 0x55;
    pub const KP_MINUS: u8 = 0x56;
    pub const KP_ENTER: u8 = 0x58;

    pub const F13: u8 = 0x68;
    pub const F14: u8 = 0x69;
    pub const F15: u8 = 0x6a;
    pub const F16: u8 = 0x6b;
    pub const F17: u8 = 0x6c;
    pub const F18: u8 = 0x6d;
    pub const F19: u8 = 0x6e;
    pub const F20: u8 = 0x6f;
    pub const F21: u8 = 0x70;
    pub const F22: u8 = 0x71;
    pub const F23: u8 = 0x72;
    pub const F24: u8 = 0x73;

    pub const HELP: u8 = 0x75;
    pub const MENU: u8 = 0x76;
    pub const YEN: u8 = 0x89;

    pub const LEFT_META: u8 = 0xe3;
    pub const RIGHT_META: u8 = 0xe7;
}

use modifier::*;

/// One row of the keycode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMapEntry {
    /// Key identifier used by the sending side.
    pub external_code: u32,
    /// HID usage, or [`usage::NONE`] when the key has no HID equivalent.
    pub hid_usage: u8,
    /// Modifier bits held together with the usage.
    pub modifier_mask: u8,
}

impl KeyMapEntry {
    /// `true` when the entry carries a usage byte for the key slots.
    pub const fn has_usage(&self) -> bool {
        self.hid_usage != usage::NONE
    }

    /// `true` when the entry drives modifier bits.
    pub const fn is_modifier(&self) -> bool {
        self.modifier_mask != 0
    }
}

const fn key(external_code: u32, hid_usage: u8, modifier_mask: u8) -> KeyMapEntry {
    KeyMapEntry {
        external_code,
        hid_usage,
        modifier_mask,
    }
}

/// Look up an external key code.
///
/// Returns `None` on a miss; a listed key without HID equivalent is a hit
/// with `hid_usage == 0`.  If the table ever holds duplicates the first
/// matching row wins.
pub fn lookup(external_code: u32) -> Option<&'static KeyMapEntry> {
    KEYMAP.iter().find(|e| e.external_code == external_code)
}

/// The keycode table (US layout).
#[rustfmt::skip]
pub static KEYMAP: &[KeyMapEntry] = &[
    // - Printable ASCII -----------------------------------
    key(0x20, usage::SPACE, 0),
    key(0x21, usage::N1, LEFT_SHIFT),           // !
    key(0x22, usage::APOSTROPHE, LEFT_SHIFT),   // "
    key(0x23, usage::N3, LEFT_SHIFT),           // #
    key(0x24, usage::N4, LEFT_SHIFT),           // $
    key(0x25, usage::N5, LEFT_SHIFT),           // %
    key(0x26, usage::N7, LEFT_SHIFT),           // &
    key(0x27, usage::APOSTROPHE, 0),            // '
    key(0x28, usage::N9, LEFT_SHIFT),           // (
    key(0x29, usage::N0, LEFT_SHIFT),           // )
    key(0x2a, usage::KP_ASTERISK, 0),           // *
    key(0x2b, usage::EQUAL, LEFT_SHIFT),        // +
    key(0x2c, usage::COMMA, 0),
    key(0x2d, usage::MINUS, 0),
    key(0x2e, usage::DOT, 0),
    key(0x2f, usage::SLASH, 0),

    key(0x30, usage::N0, 0),
    key(0x31, usage::N1, 0),
    key(0x32, usage::N2, 0),
    key(0x33, usage::N3, 0),
    key(0x34, usage::N4, 0),
    key(0x35, usage::N5, 0),
    key(0x36, usage::N6, 0),
    key(0x37, usage::N7, 0),
    key(0x38, usage::N8, 0),
    key(0x39, usage::N9, 0),

    key(0x3a, usage::SEMICOLON, LEFT_SHIFT),    // :
    key(0x3b, usage::SEMICOLON, 0),
    key(0x3c, usage::COMMA, LEFT_SHIFT),        // <
    key(0x3d, usage::EQUAL, 0),
    key(0x3e, usage::DOT, LEFT_SHIFT),          // >
    key(0x3f, usage::SLASH, LEFT_SHIFT),        // ?
    key(0x40, usage::N2, LEFT_SHIFT),           // @

    key(0x41, usage::A, 0),
    key(0x42, usage::B, 0),
    key(0x43, usage::C, 0),
    key(0x44, usage::D, 0),
    key(0x45, usage::E, 0),
    key(0x46, usage::F, 0),
    key(0x47, usage::G, 0),
    key(0x48, usage::H, 0),
    key(0x49, usage::I, 0),
    key(0x4a, usage::J, 0),
    key(0x4b, usage::K, 0),
    key(0x4c, usage::L, 0),
    key(0x4d, usage::M, 0),
    key(0x4e, usage::N, 0),
    key(0x4f, usage::O, 0),
    key(0x50, usage::P, 0),
    key(0x51, usage::Q, 0),
    key(0x52, usage::R, 0),
    key(0x53, usage::S, 0),
    key(0x54, usage::T, 0),
    key(0x55, usage::U, 0),
    key(0x56, usage::V, 0),
    key(0x57, usage::W, 0),
    key(0x58, usage::X, 0),
    key(0x59, usage::Y, 0),
    key(0x5a, usage::Z, 0),

    key(0x5b, usage::LEFT_BRACE, 0),
    key(0x5c, usage::BACKSLASH, 0),
    key(0x5d, usage::RIGHT_BRACE, 0),
    key(0x5e, usage::GRAVE, LEFT_SHIFT),        // ^
    key(0x5f, usage::MINUS, LEFT_SHIFT),        // _
    key(0x60, usage::GRAVE, 0),                 // `
    key(0x7b, usage::LEFT_BRACE, LEFT_SHIFT),   // {
    key(0x7c, usage::BACKSLASH, LEFT_SHIFT),    // |
    key(0x7d, usage::RIGHT_BRACE, LEFT_SHIFT),  // }
    key(0x7e, usage::GRAVE, LEFT_SHIFT),        // ~

    // - Function keys -------------------------------------
    key(0x0100_0030, usage::F1, 0),
    key(0x0100_0031, usage::F2, 0),
    key(0x0100_0032, usage::F3, 0),
    key(0x0100_0033, usage::F4, 0),
    key(0x0100_0034, usage::F5, 0),
    key(0x0100_0035, usage::F6, 0),
    key(0x0100_0036, usage::F7, 0),
    key(0x0100_0037, usage::F8, 0),
    key(0x0100_0038, usage::F9, 0),
    key(0x0100_0039, usage::F10, 0),
    key(0x0100_003a, usage::F11, 0),
    key(0x0100_003b, usage::F12, 0),
    key(0x0100_003c, usage::F13, 0),
    key(0x0100_003d, usage::F14, 0),
    key(0x0100_003e, usage::F15, 0),
    key(0x0100_003f, usage::F16, 0),
    key(0x0100_0040, usage::F17, 0),
    key(0x0100_0041, usage::F18, 0),
    key(0x0100_0042, usage::F19, 0),
    key(0x0100_0043, usage::F20, 0),
    key(0x0100_0044, usage::F21, 0),
    key(0x0100_0045, usage::F22, 0),
    key(0x0100_0046, usage::F23, 0),
    key(0x0100_0047, usage::F24, 0),
    // F25..F35 exist on the sender but not on the HID page
    key(0x0100_0048, usage::NONE, 0),
    key(0x0100_0049, usage::NONE, 0),
    key(0x0100_004a, usage::NONE, 0),
    key(0x0100_004b, usage::NONE, 0),
    key(0x0100_004c, usage::NONE, 0),
    key(0x0100_004d, usage::NONE, 0),
    key(0x0100_004e, usage::NONE, 0),
    key(0x0100_004f, usage::NONE, 0),
    key(0x0100_0050, usage::NONE, 0),
    key(0x0100_0051, usage::NONE, 0),
    key(0x0100_0052, usage::NONE, 0),

    // - Modifiers -----------------------------------------
    key(0x0100_0020, usage::NONE, LEFT_SHIFT),
    key(0x0100_0021, usage::NONE, LEFT_CTRL),
    key(0x0100_0022, usage::NONE, LEFT_META),
    key(0x0100_0023, usage::NONE, LEFT_ALT),
    key(0x0100_1103, usage::NONE, RIGHT_ALT),   // AltGr
    // Super keys drive both the bit and a usage slot
    key(0x0100_0053, usage::LEFT_META, LEFT_META),
    key(0x0100_0054, usage::RIGHT_META, RIGHT_META),

    // - Locks ---------------------------------------------
    key(0x0100_0024, usage::CAPS_LOCK, 0),
    key(0x0100_0025, usage::NUM_LOCK, 0),
    key(0x0100_0026, usage::SCROLL_LOCK, 0),

    // - Editing and navigation ----------------------------
    key(0x0100_0000, usage::ESC, 0),
    key(0x0100_0001, usage::TAB, 0),
    key(0x0100_0002, usage::BACKSPACE, 0),      // Backtab
    key(0x0100_0003, usage::BACKSPACE, 0),
    key(0x0100_0004, usage::ENTER, 0),          // Return
    key(0x0100_0005, usage::KP_ENTER, 0),       // Enter
    key(0x0100_0006, usage::INSERT, 0),
    key(0x0100_0007, usage::DELETE, 0),
    key(0x0100_0008, usage::PAUSE, 0),
    key(0x0100_0009, usage::SYSRQ, 0),          // Print
    key(0x0100_000a, usage::SYSRQ, 0),          // SysReq
    key(0x0100_0010, usage::HOME, 0),
    key(0x0100_0011, usage::END, 0),
    key(0x0100_0012, usage::LEFT, 0),
    key(0x0100_0013, usage::UP, 0),
    key(0x0100_0014, usage::RIGHT, 0),
    key(0x0100_0015, usage::DOWN, 0),
    key(0x0100_0016, usage::PAGE_UP, 0),
    key(0x0100_0017, usage::PAGE_DOWN, 0),
    key(0x0100_0055, usage::MENU, 0),
    key(0x0100_0056, usage::NONE, 0),           // Hyper_L
    key(0x0100_0057, usage::NONE, 0),           // Hyper_R
    key(0x0100_0058, usage::HELP, 0),
    key(0x0100_0059, usage::NONE, 0),           // Direction_L
    key(0x0100_0060, usage::NONE, 0),           // Direction_R

    // - Latin-1 -------------------------------------------
    key(0xa0, usage::NONE, 0),
    key(0xa1, usage::NONE, 0),
    key(0xa2, usage::NONE, 0),
    key(0xa3, usage::NONE, 0),
    key(0xa4, usage::NONE, 0),
    key(0xa5, usage::YEN, 0),
    key(0xa6, usage::NONE, 0),
    key(0xa7, usage::NONE, 0),
    key(0xa8, usage::NONE, 0),
    key(0xa9, usage::NONE, 0),
    key(0xaa, usage::NONE, 0),
    key(0xab, usage::NONE, 0),
    key(0xac, usage::NONE, 0),
    key(0xad, usage::NONE, 0),
    key(0xae, usage::NONE, 0),
    key(0xaf, usage::NONE, 0),
    key(0xb0, usage::NONE, 0),
    key(0xb1, usage::NONE, 0),
    key(0xb2, usage::NONE, 0),
    key(0xb3, usage::NONE, 0),
    key(0xb4, usage::NONE, 0),
    key(0xb5, usage::NONE, 0),
    key(0xb6, usage::NONE, 0),
    key(0xb7, usage::NONE, 0),
    key(0xb8, usage::NONE, 0),
    key(0xb9, usage::NONE, 0),
    key(0xba, usage::NONE, 0),
    key(0xbb, usage::NONE, 0),
    key(0xbc, usage::NONE, 0),
    key(0xbd, usage::NONE, 0),
    key(0xbe, usage::NONE, 0),
    key(0xbf, usage::NONE, 0),
    key(0xc0, usage::NONE, 0),
    key(0xc1, usage::NONE, 0),
    key(0xc2, usage::NONE, 0),
    key(0xc3, usage::NONE, 0),
    key(0xc4, usage::NONE, 0),
    key(0xc5, usage::NONE, 0),
    key(0xc6, usage::NONE, 0),
    key(0xc7, usage::NONE, 0),
    key(0xc8, usage::NONE, 0),
    key(0xc9, usage::NONE, 0),
    key(0xca, usage::NONE, 0),
    key(0xcb, usage::NONE, 0),
    key(0xcc, usage::NONE, 0),
    key(0xcd, usage::NONE, 0),
    key(0xce, usage::NONE, 0),
    key(0xcf, usage::NONE, 0),
    key(0xd0, usage::NONE, 0),
    key(0xd1, usage::NONE, 0),
    key(0xd2, usage::NONE, 0),
    key(0xd3, usage::NONE, 0),
    key(0xd4, usage::NONE, 0),
    key(0xd5, usage::NONE, 0),
    key(0xd6, usage::O, 0),                     // Ö
    key(0xd7, usage::KP_MINUS, 0),              // ×
    key(0xd9, usage::U, 0),                     // Ù
    key(0xda, usage::U, 0),                     // Ú
    key(0xdb, usage::U, 0),                     // Û
    key(0xdc, usage::U, 0),                     // Ü
    key(0xdd, usage::Y, 0),                     // Ý
    key(0xde, usage::NONE, 0),
    key(0xdf, usage::NONE, 0),
    key(0xff, usage::NONE, 0),
];
