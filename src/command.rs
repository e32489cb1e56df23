//! Command parser - newline-delimited text commands from the BLE sender.
//!
//! Grammar, one command per line:
//! ```text
//! <action>:0x<hex>                  key event; action 'P' = press, anything else = release
//! M:<buttons>,<x>,<y>[,<wheel>]     absolute pointer event, decimal fields
//! ```
//!
//! The key grammar is tried first, so `M:0x..` is still a key release.
//! Lines matching neither grammar are skipped without any signal.  The
//! parser holds no state between messages.

use crate::config::MAX_MESSAGE_LEN;

/// Line terminator between commands.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Action byte that marks a press; every other action byte is a release.
pub const PRESS_ACTION: u8 = b'P';

/// Leading bytes of a pointer line.
const POINTER_PREFIX: &[u8] = b"M:";

/// A key press or release, as sent by the remote side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub pressed: bool,
    pub external_code: u32,
}

impl KeyEvent {
    pub const fn press(external_code: u32) -> Self {
        Self {
            pressed: true,
            external_code,
        }
    }

    pub const fn release(external_code: u32) -> Self {
        Self {
            pressed: false,
            external_code,
        }
    }
}

/// Absolute pointer parameters, passed straight to the pointer report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerEvent {
    pub buttons: u8,
    pub x: u16,
    pub y: u16,
    pub wheel: i8,
}

/// One decoded line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

/// Lazy iterator over the commands of one message.
pub struct Commands<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Commands<'a> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        while !self.rest.is_empty() {
            let (line, rest) = match self.rest.iter().position(|&b| b == LINE_TERMINATOR) {
                Some(i) => (&self.rest[..i], &self.rest[i + 1..]),
                None => (self.rest, &[][..]),
            };
            self.rest = rest;
            if let Some(command) = parse_line(line) {
                return Some(command);
            }
        }
        None
    }
}

/// Decode a whole message.
///
/// The message is bounded to [`MAX_MESSAGE_LEN`] bytes and ends at the
/// first NUL.  When the bound cuts through a line, that partial line is
/// discarded rather than parsed.
pub fn parse(message: &[u8]) -> Commands<'_> {
    Commands {
        rest: bounded(message, MAX_MESSAGE_LEN),
    }
}

/// Only the key events of a message, in order.
pub fn parse_keys(message: &[u8]) -> impl Iterator<Item = KeyEvent> + '_ {
    parse(message).filter_map(|command| match command {
        Command::Key(event) => Some(event),
        Command::Pointer(_) => None,
    })
}

/// Decode a single line (without its terminator).
pub fn parse_line(line: &[u8]) -> Option<Command> {
    parse_key(line)
        .map(Command::Key)
        .or_else(|| parse_pointer(line).map(Command::Pointer))
}

fn bounded(message: &[u8], max_len: usize) -> &[u8] {
    let truncated = message.len() > max_len;
    let kept = &message[..message.len().min(max_len)];

    if let Some(nul) = kept.iter().position(|&b| b == 0) {
        return &kept[..nul];
    }

    // The cut line is complete only if its terminator was the first byte
    // beyond the bound.
    let cut_mid_line = truncated
        && kept.last() != Some(&LINE_TERMINATOR)
        && message[max_len] != LINE_TERMINATOR;
    if cut_mid_line {
        match kept.iter().rposition(|&b| b == LINE_TERMINATOR) {
            Some(i) => &kept[..=i],
            None => &[],
        }
    } else {
        kept
    }
}

fn parse_key(line: &[u8]) -> Option<KeyEvent> {
    let (&action, rest) = line.split_first()?;
    let digits = rest.strip_prefix(b":0x")?;
    let (external_code, tail) = parse_hex_u32(digits)?;
    // Trailing text other than whitespace makes the line malformed; senders
    // terminate each command with the line terminator.
    if !is_blank(tail) {
        return None;
    }
    Some(KeyEvent {
        pressed: action == PRESS_ACTION,
        external_code,
    })
}

fn parse_pointer(line: &[u8]) -> Option<PointerEvent> {
    let body = trim_end(line.strip_prefix(POINTER_PREFIX)?);
    let mut fields = body.split(|&b| b == b',');

    let buttons = parse_dec(fields.next()?)?;
    let x = parse_dec(fields.next()?)?;
    let y = parse_dec(fields.next()?)?;
    let wheel = match fields.next() {
        Some(field) => parse_signed(field)?,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }

    Some(PointerEvent {
        buttons: u8::try_from(buttons).ok()?,
        x: u16::try_from(x).ok()?,
        y: u16::try_from(y).ok()?,
        wheel: wheel_delta(wheel)?,
    })
}

/// The wheel descriptor declares -127..=127, so -128 is out of range.
fn wheel_delta(value: i32) -> Option<i8> {
    i8::try_from(value).ok().filter(|&w| w != i8::MIN)
}

/// Leading hex digits as a `u32`, plus whatever follows them.
fn parse_hex_u32(input: &[u8]) -> Option<(u32, &[u8])> {
    let len = input.iter().take_while(|b| b.is_ascii_hexdigit()).count();
    if len == 0 {
        return None;
    }
    let mut value: u32 = 0;
    for &b in &input[..len] {
        let digit = (b as char).to_digit(16)?;
        value = value.checked_mul(16)?.checked_add(digit)?;
    }
    Some((value, &input[len..]))
}

fn parse_dec(field: &[u8]) -> Option<u32> {
    if field.is_empty() {
        return None;
    }
    field.iter().try_fold(0u32, |acc, &b| {
        let digit = (b as char).to_digit(10)?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}

fn parse_signed(field: &[u8]) -> Option<i32> {
    match field.split_first() {
        Some((b'-', digits)) => parse_dec(digits).and_then(|v| i32::try_from(v).ok()).map(|v| -v),
        _ => parse_dec(field).and_then(|v| i32::try_from(v).ok()),
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| matches!(b, b'\r' | b' ' | b'\t'))
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let len = bytes.len()
        - bytes
            .iter()
            .rev()
            .take_while(|b| matches!(b, b'\r' | b' ' | b'\t'))
            .count();
    &bytes[..len]
}
