//! Event dispatcher - the single consumer of the [`AppEvent`] queue.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::error::Error;
use crate::event::AppEvent;
use crate::hid::keyboard::KeyboardReport;
use crate::keymap::usage;
use crate::relay::Relay;
use crate::transport::ReportSink;

/// Typed to the host when a released key is not in the keymap: "er", "ro".
pub const RECOVERY_MACRO: [KeyboardReport; 4] = [
    KeyboardReport::new(0, [usage::E, usage::R, 0, 0, 0, 0]),
    KeyboardReport::empty(),
    KeyboardReport::new(0, [usage::R, usage::O, 0, 0, 0, 0]),
    KeyboardReport::empty(),
];

/// Clear screen, cursor home.
pub const CONSOLE_CLEAR: &str = "\x1b[2J\x1b[H";

/// Short visible pulse on a status output.
#[allow(async_fn_in_trait)]
pub trait StatusIndicator {
    async fn pulse(&mut self);
}

/// Human-readable diagnostic output.
#[allow(async_fn_in_trait)]
pub trait Console {
    async fn write_str(&mut self, text: &str);
}

/// Result of a [`Dispatcher::drain`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Drained {
    pub handled: usize,
    pub failed: usize,
    pub last_error: Option<Error>,
}

pub struct Dispatcher<'r, 'a, M: RawMutex, S, I, C, D, const N: usize> {
    relay: &'r Relay<'a, M, S, N>,
    indicator: I,
    console: C,
    delay: D,
}

impl<'r, 'a, M, S, I, C, D, const N: usize> Dispatcher<'r, 'a, M, S, I, C, D, N>
where
    M: RawMutex,
    S: ReportSink,
    I: StatusIndicator,
    C: Console,
    D: DelayNs,
{
    pub fn new(relay: &'r Relay<'a, M, S, N>, indicator: I, console: C, delay: D) -> Self {
        Self {
            relay,
            indicator,
            console,
            delay,
        }
    }

    /// Wait for one event, then dispatch it and everything queued behind it.
    pub async fn run_once(&mut self) -> Drained {
        let first = self.relay.next_event().await;
        let mut drained = Drained::default();
        self.record(first, &mut drained).await;
        let rest = self.drain().await;
        Drained {
            handled: drained.handled + rest.handled,
            failed: drained.failed + rest.failed,
            last_error: rest.last_error.or(drained.last_error),
        }
    }

    /// Dispatch queued events until the queue is empty.
    pub async fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();
        while let Some(event) = self.relay.try_next_event() {
            self.record(event, &mut drained).await;
        }
        drained
    }

    async fn record(&mut self, event: AppEvent, drained: &mut Drained) {
        drained.handled += 1;
        if let Err(e) = self.dispatch(event).await {
            drained.failed += 1;
            drained.last_error = Some(e);
        }
    }

    /// Execute one event's side effect.
    pub async fn dispatch(&mut self, event: AppEvent) -> Result<(), Error> {
        match event {
            AppEvent::StatusBlink => {
                self.indicator.pulse().await;
                Ok(())
            }
            AppEvent::RemoteResetRequested => {
                let sent = self.relay.reset_keyboard(&mut self.delay).await;
                self.console.write_str(CONSOLE_CLEAR).await;
                self.console.write_str("Remote reset\r\n").await;
                sent
            }
            AppEvent::MalformedKeyRecovery => {
                self.console.write_str("Unrecognized key\r\n").await;
                self.relay
                    .send_keyboard_sequence(&RECOVERY_MACRO, &mut self.delay)
                    .await
            }
            AppEvent::KeyboardClearRequested => self.relay.reset_keyboard(&mut self.delay).await,
            AppEvent::PointerClearRequested => self.relay.clear_pointer(&mut self.delay).await,
        }
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn console(&self) -> &C {
        &self.console
    }
}
