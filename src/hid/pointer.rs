//! USB HID absolute pointer report.
//!
//! Layout (6 bytes):
//! ```text
//! Byte 0:   Button bitfield
//!           Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle, bits 3-7 padding
//! Byte 1-2: X position, little-endian (0..32767)
//! Byte 3-4: Y position, little-endian (0..32767)
//! Byte 5:   Scroll wheel (signed, relative)
//! ```

/// Pointer report size in bytes.
pub const POINTER_REPORT_SIZE: usize = 6;

/// Logical maximum of both axes.
pub const AXIS_MAX: u16 = 32767;

/// Button bits.
pub mod button {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;

    /// Bits the descriptor actually declares.
    pub const MASK: u8 = LEFT | RIGHT | MIDDLE;
}

/// Absolute-position pointer report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Absolute X.
    pub x: u16,
    /// Absolute Y.
    pub y: u16,
    /// Scroll wheel delta (signed).
    pub wheel: i8,
}

impl PointerReport {
    /// Build a report; button bits beyond the three declared ones are dropped.
    pub const fn new(buttons: u8, x: u16, y: u16, wheel: i8) -> Self {
        Self {
            buttons: buttons & button::MASK,
            x,
            y,
            wheel,
        }
    }

    /// No buttons, origin, no scroll.
    pub const fn neutral() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (always 6), or 0 if `buf` is short.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < POINTER_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1..3].copy_from_slice(&self.x.to_le_bytes());
        buf[3..5].copy_from_slice(&self.y.to_le_bytes());
        buf[5] = self.wheel as u8;
        POINTER_REPORT_SIZE
    }

    /// The 6 wire bytes.
    pub fn to_bytes(&self) -> [u8; POINTER_REPORT_SIZE] {
        let mut buf = [0u8; POINTER_REPORT_SIZE];
        self.serialize(&mut buf);
        buf
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

/// USB HID Report Descriptor for a 3-button absolute pointer with wheel.
pub const POINTER_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    //   - Buttons (3 bits + 5 padding) -
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    //
    //   - X, Y position -
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x00, //     Logical Minimum (0)
    0x26, 0xFF, 0x7F, // Logical Maximum (32767)
    0x75, 0x10, //     Report Size (16)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    //
    //   - Scroll wheel -
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    //
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];
