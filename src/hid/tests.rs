//! Unit tests for HID report serialization.
//!
//! These tests run on the host (not embedded) and check the exact wire
//! layout of both interfaces.

use super::keyboard::{KeyboardReport, KEYBOARD_REPORT_DESCRIPTOR};
use super::pointer::{button, PointerReport, AXIS_MAX, POINTER_REPORT_DESCRIPTOR};
use super::{HidReport, Interface, MAX_REPORT_SIZE};

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_report_empty() {
    let report = KeyboardReport::empty();
    assert!(report.is_empty());
    assert_eq!(report.modifier, 0);
    assert_eq!(report.keycodes, [0; 6]);
    assert_eq!(report, KeyboardReport::default());
}

#[test]
fn keyboard_report_serialize_layout() {
    let report = KeyboardReport::new(0x05, [0x04, 0x05, 0x06, 0x00, 0x00, 0x00]);

    let mut buf = [0u8; 8];
    let written = report.serialize(&mut buf);

    assert_eq!(written, 8);
    assert_eq!(buf, [0x05, 0x00, 0x04, 0x05, 0x06, 0x00, 0x00, 0x00]);
    assert_eq!(report.to_bytes(), buf);
}

#[test]
fn keyboard_report_keeps_slot_order() {
    // Gaps stay where they are; slots are not compacted.
    let report = KeyboardReport::new(0, [0x00, 0x05, 0x00, 0x04, 0x00, 0x00]);
    assert_eq!(report.to_bytes(), [0, 0, 0x00, 0x05, 0x00, 0x04, 0, 0]);
    assert!(!report.is_empty());
}

#[test]
fn keyboard_report_modifier_only_is_not_empty() {
    let report = KeyboardReport::new(0x02, [0; 6]);
    assert!(!report.is_empty());
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyboardReport::empty();
    let mut small_buf = [0u8; 4];
    let written = report.serialize(&mut small_buf);
    assert_eq!(written, 0); // Should fail gracefully
}

#[test]
fn keyboard_descriptor_is_balanced() {
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.first(), Some(&0x05));
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.last(), Some(&0xC0));
}

// ═══════════════════════════════════════════════════════════════════════════
// Pointer Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn pointer_report_neutral() {
    let report = PointerReport::neutral();
    assert!(report.is_neutral());
    assert_eq!(PointerReport::new(0, 0, 0, 0), report);
    assert_eq!(report.to_bytes(), [0; 6]);
}

#[test]
fn pointer_report_serialize_little_endian() {
    let report = PointerReport::new(button::LEFT | button::MIDDLE, 0x1234, AXIS_MAX, -2);

    let mut buf = [0u8; 6];
    let written = report.serialize(&mut buf);

    assert_eq!(written, 6);
    assert_eq!(buf, [0x05, 0x34, 0x12, 0xFF, 0x7F, 0xFE]);
}

#[test]
fn pointer_report_masks_undeclared_buttons() {
    let report = PointerReport::new(0xFF, 10, 20, 0);
    assert_eq!(report.buttons, button::MASK);
}

#[test]
fn pointer_report_is_not_neutral_when_positioned() {
    let report = PointerReport::new(0, 1, 0, 0);
    assert!(!report.is_neutral());
}

#[test]
fn pointer_report_serialize_buffer_too_small() {
    let mut buf = [0u8; 5];
    assert_eq!(PointerReport::neutral().serialize(&mut buf), 0);
}

#[test]
fn pointer_descriptor_declares_absolute_axes() {
    // Input (Data, Variable, Absolute) right after the 16-bit X/Y items.
    let xy = POINTER_REPORT_DESCRIPTOR
        .windows(2)
        .position(|w| w == [0x75, 0x10])
        .expect("16-bit report size");
    assert_eq!(&POINTER_REPORT_DESCRIPTOR[xy + 2..xy + 6], &[0x95, 0x02, 0x81, 0x02]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Report Routing Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn report_interface_routing() {
    let kb: HidReport = KeyboardReport::empty().into();
    let ptr: HidReport = PointerReport::neutral().into();

    assert_eq!(kb.interface(), Interface::Keyboard);
    assert!(kb.is_keyboard() && !kb.is_pointer());
    assert_eq!(ptr.interface(), Interface::Pointer);
    assert!(ptr.is_pointer() && !ptr.is_keyboard());
}

#[test]
fn report_serialize_dispatches_by_kind() {
    let mut buf = [0xAAu8; MAX_REPORT_SIZE];
    assert_eq!(HidReport::Keyboard(KeyboardReport::empty()).serialize(&mut buf), 8);
    assert_eq!(buf, [0; 8]);

    let mut buf = [0xAAu8; MAX_REPORT_SIZE];
    assert_eq!(HidReport::Pointer(PointerReport::neutral()).serialize(&mut buf), 6);
    assert_eq!(&buf[..6], &[0; 6]);
}
