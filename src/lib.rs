//! Host-testable core of hidrelay.
//!
//! Everything that does not touch the radio, the USB peripheral or a GPIO
//! lives here: keymap, command parser, keyboard state machine, report
//! formats, transport gating, event queue and dispatcher.
//!
//! Usage: `cargo test` (host) / `cargo run --release --features embedded`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links against this library for all of the logic below.

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod hid;
pub mod keymap;
pub mod keys;
pub mod relay;
pub mod status_logic;
pub mod transport;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal_async::delay::DelayNs;

    use super::command::{self, Command, KeyEvent, PointerEvent};
    use super::config::{LINK_BREATH_STEPS, MAX_MESSAGE_LEN};
    use super::error::Error;
    use super::event::{AppEvent, EventQueue, Posted};
    use super::hid::keyboard::KeyboardReport;
    use super::hid::pointer::PointerReport;
    use super::hid::{HidReport, Interface};
    use super::keymap::{self, modifier, usage, KEYMAP};
    use super::keys::{KeyOutcome, KeyboardState, PressedKeySet, ROLLOVER};
    use super::status_logic::{link_led_duty, next_step};
    use super::transport::{Gates, ReportSink, Transport};

    fn keys(message: &[u8]) -> heapless::Vec<KeyEvent, 16> {
        command::parse_keys(message).collect()
    }

    fn commands(message: &[u8]) -> heapless::Vec<Command, 16> {
        command::parse(message).collect()
    }

    /// Delay that never waits, so any contended gate times out at once.
    struct NoWait;

    impl DelayNs for NoWait {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Sink that counts submissions and never completes them.
    struct Stalled {
        submitted: Cell<usize>,
    }

    impl ReportSink for Stalled {
        fn submit(&self, _report: HidReport) -> Result<(), Error> {
            self.submitted.set(self.submitted.get() + 1);
            Ok(())
        }
    }

    /// Sink that rejects every report.
    struct Refusing;

    impl ReportSink for Refusing {
        fn submit(&self, _report: HidReport) -> Result<(), Error> {
            Err(Error::ChannelBusy)
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Keymap Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn keymap_letter_maps_to_usage() {
        let entry = keymap::lookup(0x41).unwrap();
        assert_eq!(entry.hid_usage, usage::A);
        assert_eq!(entry.modifier_mask, 0);
        assert!(entry.has_usage());
        assert!(!entry.is_modifier());
    }

    #[test]
    fn keymap_shifted_symbol_carries_modifier() {
        let bang = keymap::lookup(0x21).unwrap();
        assert_eq!(bang.hid_usage, usage::N1);
        assert_eq!(bang.modifier_mask, modifier::LEFT_SHIFT);
    }

    #[test]
    fn keymap_pure_modifier_has_no_usage() {
        let shift = keymap::lookup(0x0100_0020).unwrap();
        assert!(!shift.has_usage());
        assert_eq!(shift.modifier_mask, modifier::LEFT_SHIFT);
    }

    #[test]
    fn keymap_super_key_is_modifier_and_usage() {
        let super_l = keymap::lookup(0x0100_0053).unwrap();
        assert_eq!(super_l.hid_usage, usage::LEFT_META);
        assert_eq!(super_l.modifier_mask, modifier::LEFT_META);
    }

    #[test]
    fn keymap_known_without_equivalent_is_a_hit() {
        // F25 exists on the sender but has no HID usage.
        let f25 = keymap::lookup(0x0100_0048).unwrap();
        assert_eq!(f25.hid_usage, usage::NONE);
    }

    #[test]
    fn keymap_unknown_code_misses() {
        assert!(keymap::lookup(0xDEAD_BEEF).is_none());
        assert!(keymap::lookup(0x61).is_none()); // lowercase is never sent
    }

    #[test]
    fn keymap_codes_are_unique() {
        for (i, entry) in KEYMAP.iter().enumerate() {
            assert!(
                KEYMAP[i + 1..]
                    .iter()
                    .all(|other| other.external_code != entry.external_code),
                "duplicate code {:#x}",
                entry.external_code
            );
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Command Parser Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn parser_press_and_release() {
        let events = keys(b"P:0x41\nR:0x41\n");
        assert_eq!(&events[..], &[KeyEvent::press(0x41), KeyEvent::release(0x41)]);
    }

    #[test]
    fn parser_any_other_action_is_release() {
        for action in [b'R', b'x', b'p', b'0', b' '] {
            let line = [action, b':', b'0', b'x', b'4', b'1'];
            let events = keys(&line);
            assert_eq!(&events[..], &[KeyEvent::release(0x41)], "action {action}");
        }
    }

    #[test]
    fn parser_accepts_every_hex_case() {
        let events = keys(b"P:0x0100001a\nP:0x0100001A\n");
        assert_eq!(events[0].external_code, 0x0100_001A);
        assert_eq!(events[1].external_code, 0x0100_001A);
    }

    #[test]
    fn parser_last_line_needs_no_terminator() {
        assert_eq!(&keys(b"P:0x41")[..], &[KeyEvent::press(0x41)]);
    }

    #[test]
    fn parser_skips_malformed_lines() {
        let events = keys(b"garbage\nP:41\nP0x41\nP:0x\nP:0xZZ\n\nP:0x42\nP:0x41 junk\n");
        assert_eq!(&events[..], &[KeyEvent::press(0x42)]);
    }

    #[test]
    fn parser_allows_trailing_whitespace() {
        let events = keys(b"P:0x41\r\nR:0x41 \t\n");
        assert_eq!(&events[..], &[KeyEvent::press(0x41), KeyEvent::release(0x41)]);
    }

    #[test]
    fn parser_rejects_u32_overflow() {
        assert!(keys(b"P:0x100000000\n").is_empty());
        assert_eq!(&keys(b"P:0xFFFFFFFF\n")[..], &[KeyEvent::press(u32::MAX)]);
    }

    #[test]
    fn parser_stops_at_nul() {
        assert_eq!(&keys(b"P:0x41\n\0P:0x42\n")[..], &[KeyEvent::press(0x41)]);
    }

    #[test]
    fn parser_drops_line_cut_by_length_bound() {
        let mut message = [b'\n'; MAX_MESSAGE_LEN + 8];
        message[..6].copy_from_slice(b"P:0x41");
        // "P:0x4243" straddles the bound; only "P:0x42" would survive the cut.
        let start = MAX_MESSAGE_LEN - 6;
        message[start..start + 8].copy_from_slice(b"P:0x4243");

        assert_eq!(&keys(&message)[..], &[KeyEvent::press(0x41)]);
    }

    #[test]
    fn parser_keeps_line_ending_exactly_at_bound() {
        let mut message = [b'\n'; MAX_MESSAGE_LEN + 1];
        message[MAX_MESSAGE_LEN - 6..MAX_MESSAGE_LEN].copy_from_slice(b"P:0x41");

        assert_eq!(&keys(&message)[..], &[KeyEvent::press(0x41)]);
    }

    #[test]
    fn parser_pointer_line() {
        let parsed = commands(b"M:1,100,200\nM:4,32767,0,-3\n");
        assert_eq!(
            &parsed[..],
            &[
                Command::Pointer(PointerEvent { buttons: 1, x: 100, y: 200, wheel: 0 }),
                Command::Pointer(PointerEvent { buttons: 4, x: 32767, y: 0, wheel: -3 }),
            ]
        );
    }

    #[test]
    fn parser_pointer_rejects_out_of_range_fields() {
        assert!(commands(b"M:256,0,0\n").is_empty());
        assert!(commands(b"M:0,65536,0\n").is_empty());
        assert!(commands(b"M:0,0,0,128\n").is_empty());
        assert!(commands(b"M:0,0\n").is_empty());
        assert!(commands(b"M:0,0,0,0,0\n").is_empty());
        assert!(commands(b"M:0,-1,0\n").is_empty());
    }

    #[test]
    fn parser_pointer_wheel_matches_descriptor_range() {
        assert!(commands(b"M:0,0,0,-128\n").is_empty());
        let parsed = commands(b"M:0,0,0,-127\nM:0,0,0,127\n");
        assert_eq!(
            &parsed[..],
            &[
                Command::Pointer(PointerEvent { buttons: 0, x: 0, y: 0, wheel: -127 }),
                Command::Pointer(PointerEvent { buttons: 0, x: 0, y: 0, wheel: 127 }),
            ]
        );
    }

    #[test]
    fn parser_m_prefixed_hex_is_still_a_key() {
        let parsed = commands(b"M:0x41\n");
        assert_eq!(&parsed[..], &[Command::Key(KeyEvent::release(0x41))]);
    }

    #[test]
    fn parse_keys_filters_pointer_lines() {
        let events = keys(b"M:1,2,3\nP:0x41\n");
        assert_eq!(&events[..], &[KeyEvent::press(0x41)]);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Pressed Key Set Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn key_set_fills_first_empty_slot() {
        let mut set = PressedKeySet::new();
        assert!(set.insert(usage::A));
        assert!(set.insert(usage::B));
        assert!(set.remove(usage::A));
        assert!(set.insert(usage::C));
        assert_eq!(set.slots(), [usage::C, usage::B, 0, 0, 0, 0]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn key_set_rejects_duplicates_and_zero() {
        let mut set = PressedKeySet::new();
        assert!(set.insert(usage::A));
        assert!(!set.insert(usage::A));
        assert!(!set.insert(0));
        assert_eq!(set.len(), 1);
        assert!(!set.contains(0));
    }

    #[test]
    fn key_set_capacity_is_rollover() {
        let mut set = PressedKeySet::new();
        for u in usage::A..usage::A + ROLLOVER as u8 {
            assert!(set.insert(u));
        }
        assert!(set.is_full());
        assert!(!set.insert(usage::Z));
        assert!(!set.contains(usage::Z));
    }

    #[test]
    fn key_set_remove_untracked_is_noop() {
        let mut set = PressedKeySet::new();
        set.insert(usage::A);
        let before = set;
        assert!(!set.remove(usage::B));
        assert_eq!(set, before);
        set.clear();
        assert!(set.is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Keyboard State Machine Tests
    // ════════════════════════════════════════════════════════════════════════

    fn report_of(outcome: KeyOutcome) -> KeyboardReport {
        match outcome {
            KeyOutcome::Report(r) => r,
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[test]
    fn state_press_release_letter() {
        let mut state = KeyboardState::new();
        let down = report_of(state.apply(KeyEvent::press(0x41)));
        assert_eq!(down.to_bytes(), [0, 0, 0x04, 0, 0, 0, 0, 0]);
        let up = report_of(state.apply(KeyEvent::release(0x41)));
        assert_eq!(up.to_bytes(), [0; 8]);
    }

    #[test]
    fn state_shift_alone_sets_bit_only() {
        let mut state = KeyboardState::new();
        let r = report_of(state.apply(KeyEvent::press(0x0100_0020)));
        assert_eq!(r.to_bytes(), [0x02, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn state_modifiers_combine() {
        let mut state = KeyboardState::new();
        state.apply(KeyEvent::press(0x0100_0021)); // Ctrl
        state.apply(KeyEvent::press(0x0100_0023)); // Alt
        assert_eq!(state.modifiers(), modifier::LEFT_CTRL | modifier::LEFT_ALT);
        state.apply(KeyEvent::release(0x0100_0021));
        assert_eq!(state.modifiers(), modifier::LEFT_ALT);
    }

    #[test]
    fn state_super_key_sets_bit_and_slot() {
        let mut state = KeyboardState::new();
        let r = report_of(state.apply(KeyEvent::press(0x0100_0053)));
        assert_eq!(r.modifier, modifier::LEFT_META);
        assert_eq!(r.keycodes[0], usage::LEFT_META);
        let r = report_of(state.apply(KeyEvent::release(0x0100_0053)));
        assert!(r.is_empty());
    }

    #[test]
    fn state_seventh_key_leaves_report_unchanged() {
        let mut state = KeyboardState::new();
        let mut last = KeyboardReport::empty();
        for code in 0x41..0x47 {
            last = report_of(state.apply(KeyEvent::press(code)));
        }
        assert_eq!(last.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);

        let seventh = report_of(state.apply(KeyEvent::press(0x47)));
        assert_eq!(seventh, last);
    }

    #[test]
    fn state_stale_release_changes_nothing() {
        let mut state = KeyboardState::new();
        state.apply(KeyEvent::press(0x41));
        let before = state;
        let r = report_of(state.apply(KeyEvent::release(0x42)));
        assert_eq!(state, before);
        assert_eq!(r, before.report());
    }

    #[test]
    fn state_unknown_release_is_unrecognized() {
        let mut state = KeyboardState::new();
        assert_eq!(
            state.apply(KeyEvent::release(0xDEAD_BEEF)),
            KeyOutcome::Unrecognized(0xDEAD_BEEF)
        );
        assert_eq!(state.apply(KeyEvent::press(0xDEAD_BEEF)), KeyOutcome::Ignored);
        assert_eq!(state, KeyboardState::new());
    }

    #[test]
    fn state_reset_clears_everything() {
        let mut state = KeyboardState::new();
        state.apply(KeyEvent::press(0x0100_0020));
        state.apply(KeyEvent::press(0x41));
        state.reset();
        assert!(state.report().is_empty());
        assert!(state.keys().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Transport Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn transport_second_report_times_out_until_complete() {
        let gates = Gates::new();
        let sink = Stalled { submitted: Cell::new(0) };
        let transport = Transport::new(&gates, &sink, 100);
        let report = HidReport::Keyboard(KeyboardReport::empty());

        block_on(async {
            assert_eq!(transport.send(report, &mut NoWait).await, Ok(()));
            assert_eq!(transport.send(report, &mut NoWait).await, Err(Error::Timeout));

            gates.transmit_complete(Interface::Keyboard);
            assert_eq!(transport.send(report, &mut NoWait).await, Ok(()));
        });
        assert_eq!(sink.submitted.get(), 2);
    }

    #[test]
    fn transport_interfaces_have_separate_slots() {
        let gates = Gates::new();
        let sink = Stalled { submitted: Cell::new(0) };
        let transport = Transport::new(&gates, &sink, 100);

        block_on(async {
            let kb = HidReport::Keyboard(KeyboardReport::empty());
            let ptr = HidReport::Pointer(PointerReport::neutral());
            assert_eq!(transport.send(kb, &mut NoWait).await, Ok(()));
            assert_eq!(transport.send(ptr, &mut NoWait).await, Ok(()));
        });
        assert!(!gates.gate(Interface::Keyboard).is_available());
        assert!(!gates.gate(Interface::Pointer).is_available());
    }

    #[test]
    fn transport_failed_submit_returns_slot() {
        let gates = Gates::new();
        let transport = Transport::new(&gates, Refusing, 100);
        let report = HidReport::Pointer(PointerReport::neutral());

        let result = block_on(transport.send(report, &mut NoWait));
        assert_eq!(result, Err(Error::ChannelBusy));
        assert!(gates.gate(Interface::Pointer).is_available());
    }

    #[test]
    fn ready_gate_is_binary() {
        let gates = Gates::new();
        let gate = gates.gate(Interface::Keyboard);
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        gate.release();
        gate.release();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Event Queue Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn queue_is_fifo() {
        let queue: EventQueue<NoopRawMutex, 4> = EventQueue::new();
        queue.post(AppEvent::StatusBlink).unwrap();
        queue.post(AppEvent::MalformedKeyRecovery).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_next(), Some(AppEvent::StatusBlink));
        assert_eq!(block_on(queue.next()), AppEvent::MalformedKeyRecovery);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_flushes_when_full() {
        let queue: EventQueue<NoopRawMutex, 3> = EventQueue::new();
        for _ in 0..3 {
            assert_eq!(queue.post(AppEvent::StatusBlink), Ok(Posted::Queued));
        }
        assert_eq!(
            queue.post(AppEvent::RemoteResetRequested),
            Ok(Posted::QueuedAfterFlush { dropped: 3 })
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_next(), Some(AppEvent::RemoteResetRequested));
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn queue_exhaustion_is_fatal() {
        assert!(Error::EventQueueExhausted.is_fatal());
        assert!(!Error::Timeout.is_fatal());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Link LED Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn link_led_solid_when_subscribed() {
        for step in [0, 1, 250, 999] {
            assert_eq!(link_led_duty(true, step, 1000), 1000);
        }
    }

    #[test]
    fn link_led_breathes_as_triangle() {
        let half = LINK_BREATH_STEPS / 2;
        assert_eq!(link_led_duty(false, 0, 1000), 0);
        assert_eq!(link_led_duty(false, half / 2, 1000), 500);
        assert_eq!(link_led_duty(false, half, 1000), 1000);
        assert_eq!(link_led_duty(false, half + half / 2, 1000), 500);
        assert_eq!(
            link_led_duty(false, 10, 1000),
            link_led_duty(false, LINK_BREATH_STEPS - 10, 1000)
        );
    }

    #[test]
    fn link_led_step_wraps() {
        assert_eq!(next_step(LINK_BREATH_STEPS - 1), 0);
        assert_eq!(next_step(0), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Error Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn ble_error_converts() {
        let e: Error = super::error::BleError::NotifyFailed.into();
        assert_eq!(e, Error::Ble(super::error::BleError::NotifyFailed));
        assert!(!e.is_fatal());
        assert!(Error::UsbNotAvailable.is_fatal());
    }

    #[test]
    fn endpoint_write_failure_is_absorbed() {
        assert!(!Error::Usb.is_fatal());
        assert!(!Error::ChannelBusy.is_fatal());
    }
}
