//! HID report types for the two USB interfaces.

pub mod keyboard;
pub mod pointer;

#[cfg(test)]
mod tests;

use keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE};
use pointer::{PointerReport, POINTER_REPORT_SIZE};

/// Largest report of any interface.
pub const MAX_REPORT_SIZE: usize = if KEYBOARD_REPORT_SIZE > POINTER_REPORT_SIZE {
    KEYBOARD_REPORT_SIZE
} else {
    POINTER_REPORT_SIZE
};

/// USB HID interface a report is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Keyboard,
    Pointer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Pointer(PointerReport),
}

impl HidReport {
    pub fn interface(&self) -> Interface {
        match self {
            HidReport::Keyboard(_) => Interface::Keyboard,
            HidReport::Pointer(_) => Interface::Pointer,
        }
    }

    pub fn is_keyboard(&self) -> bool {
        self.interface() == Interface::Keyboard
    }

    pub fn is_pointer(&self) -> bool {
        self.interface() == Interface::Pointer
    }

    /// Serialise the wire bytes; returns the count written (0 if `buf` is short).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(r) => r.serialize(buf),
            HidReport::Pointer(r) => r.serialize(buf),
        }
    }
}

impl From<KeyboardReport> for HidReport {
    fn from(r: KeyboardReport) -> Self {
        HidReport::Keyboard(r)
    }
}

impl From<PointerReport> for HidReport {
    fn from(r: PointerReport) -> Self {
        HidReport::Pointer(r)
    }
}
