//! Keyboard state machine.
//!
//! Owns the modifier bitmask and the 6-slot pressed-key set and turns
//! [`KeyEvent`]s into full [`KeyboardReport`]s.  Nothing outside this
//! module touches the state except through [`KeyboardState::apply`] and
//! [`KeyboardState::reset`].

use crate::command::KeyEvent;
use crate::hid::keyboard::KeyboardReport;
use crate::keymap;

/// Number of simultaneous regular keys a report can carry.
pub const ROLLOVER: usize = 6;

/// Fixed-capacity set of pressed HID usages.
///
/// Slots are stable: a key keeps its slot until released and a freed slot
/// is reused by the next press.  `0` marks an empty slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressedKeySet {
    slots: [u8; ROLLOVER],
    len: u8,
}

impl PressedKeySet {
    pub const fn new() -> Self {
        Self {
            slots: [0; ROLLOVER],
            len: 0,
        }
    }

    /// Put `usage` in the first empty slot.
    ///
    /// Returns `false` when nothing changed: `usage` is 0, already held, or
    /// every slot is taken.
    pub fn insert(&mut self, usage: u8) -> bool {
        if usage == 0 || self.contains(usage) {
            return false;
        }
        match self.slots.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = usage;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    /// Clear every slot holding `usage`. Returns `true` if any was cleared.
    pub fn remove(&mut self, usage: u8) -> bool {
        if usage == 0 {
            return false;
        }
        let mut removed = false;
        for slot in self.slots.iter_mut().filter(|slot| **slot == usage) {
            *slot = 0;
            self.len -= 1;
            removed = true;
        }
        removed
    }

    pub fn contains(&self, usage: u8) -> bool {
        usage != 0 && self.slots.contains(&usage)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == ROLLOVER
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Raw slots in report order.
    pub fn slots(&self) -> [u8; ROLLOVER] {
        self.slots
    }
}

/// What applying one key event produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyOutcome {
    /// The code was in the table; this report reflects the new state and
    /// must be sent.
    Report(KeyboardReport),
    /// Release of a code the table does not know.
    Unrecognized(u32),
    /// Press of a code the table does not know.
    Ignored,
}

/// Modifier bitmask plus pressed-key set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardState {
    modifiers: u8,
    keys: PressedKeySet,
}

impl KeyboardState {
    pub const fn new() -> Self {
        Self {
            modifiers: 0,
            keys: PressedKeySet::new(),
        }
    }

    /// Apply one event and report the result.
    ///
    /// Every table hit yields a report, even when the state did not change
    /// (7th key, stale release), so the host always gets the latest intent.
    pub fn apply(&mut self, event: KeyEvent) -> KeyOutcome {
        let Some(entry) = keymap::lookup(event.external_code) else {
            return if event.pressed {
                KeyOutcome::Ignored
            } else {
                KeyOutcome::Unrecognized(event.external_code)
            };
        };

        if entry.is_modifier() {
            if event.pressed {
                self.modifiers |= entry.modifier_mask;
            } else {
                self.modifiers &= !entry.modifier_mask;
            }
        }

        if entry.has_usage() {
            if event.pressed {
                self.keys.insert(entry.hid_usage);
            } else {
                self.keys.remove(entry.hid_usage);
            }
        }

        KeyOutcome::Report(self.report())
    }

    /// Report for the current state.
    pub fn report(&self) -> KeyboardReport {
        KeyboardReport::new(self.modifiers, self.keys.slots())
    }

    /// Back to the power-up state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    pub fn keys(&self) -> &PressedKeySet {
        &self.keys
    }
}
