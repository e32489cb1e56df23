//! Input pipeline: messages in, reports out.
//!
//! [`Relay`] ties the keyboard state, the transport and the event queue
//! together.  The keyboard state sits behind an async mutex that stays
//! locked across report submission, so the receive path and the dispatcher
//! never interleave a state change with each other's send.  Pointer reports
//! get their own mutex so only one task at a time waits on the pointer gate.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

use crate::command::{self, Command, KeyEvent, PointerEvent};
use crate::error::Error;
use crate::event::{AppEvent, EventQueue, Posted};
use crate::hid::keyboard::KeyboardReport;
use crate::hid::pointer::PointerReport;
use crate::keys::{KeyOutcome, KeyboardState};
use crate::transport::{ReportSink, Transport};

/// Result of one key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyStatus {
    /// Report delivered to the interface.
    Sent(KeyboardReport),
    /// State updated but the report was not delivered.
    Dropped(Error),
    /// Release of an unknown code; recovery has been queued.
    Unrecognized(u32),
    /// Press of an unknown code.
    Ignored,
}

/// Tally of one inbound message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageOutcome {
    pub key_reports: usize,
    pub pointer_reports: usize,
    pub dropped: usize,
    pub unrecognized: usize,
    pub ignored: usize,
    /// Most recent reason a report was dropped.
    pub last_drop: Option<Error>,
    /// Events discarded by forced queue flushes while handling the message.
    pub flushed_events: usize,
}

impl MessageOutcome {
    fn record_drop(&mut self, e: Error) {
        self.dropped += 1;
        self.last_drop = Some(e);
    }
}

/// What the BLE link reports to the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// TX notifications switched on or off.
    Subscription(bool),
    /// The sender's link went away, subscribed or not.
    Disconnected,
}

pub struct Relay<'a, M: RawMutex, S, const N: usize> {
    keyboard: Mutex<M, KeyboardState>,
    /// Last pointer report handed to the transport.
    pointer: Mutex<M, PointerReport>,
    transport: Transport<'a, S>,
    events: EventQueue<M, N>,
    subscribed: AtomicBool,
}

impl<'a, M: RawMutex, S: ReportSink, const N: usize> Relay<'a, M, S, N> {
    pub const fn new(transport: Transport<'a, S>) -> Self {
        Self {
            keyboard: Mutex::new(KeyboardState::new()),
            pointer: Mutex::new(PointerReport::neutral()),
            transport,
            events: EventQueue::new(),
            subscribed: AtomicBool::new(false),
        }
    }

    /// Parse `message` and relay every command in it, in order.
    ///
    /// Only a fatal queue fault comes back as `Err`; everything else is
    /// counted in the outcome.
    pub async fn handle_message<D: DelayNs>(
        &self,
        message: &[u8],
        delay: &mut D,
    ) -> Result<MessageOutcome, Error> {
        let mut outcome = MessageOutcome::default();

        for command in command::parse(message) {
            match command {
                Command::Key(event) => {
                    let (status, posted) = self.apply_key_inner(event, delay).await?;
                    if let Some(Posted::QueuedAfterFlush { dropped }) = posted {
                        outcome.flushed_events += dropped;
                    }
                    match status {
                        KeyStatus::Sent(_) => outcome.key_reports += 1,
                        KeyStatus::Dropped(e) => outcome.record_drop(e),
                        KeyStatus::Unrecognized(_) => outcome.unrecognized += 1,
                        KeyStatus::Ignored => outcome.ignored += 1,
                    }
                }
                Command::Pointer(event) => match self.send_pointer(event, delay).await {
                    Ok(()) => outcome.pointer_reports += 1,
                    Err(e) => outcome.record_drop(e),
                },
            }
        }

        Ok(outcome)
    }

    /// Apply one key event and send the resulting report.
    pub async fn apply_key<D: DelayNs>(
        &self,
        event: KeyEvent,
        delay: &mut D,
    ) -> Result<KeyStatus, Error> {
        self.apply_key_inner(event, delay).await.map(|(status, _)| status)
    }

    async fn apply_key_inner<D: DelayNs>(
        &self,
        event: KeyEvent,
        delay: &mut D,
    ) -> Result<(KeyStatus, Option<Posted>), Error> {
        let mut keyboard = self.keyboard.lock().await;

        match keyboard.apply(event) {
            KeyOutcome::Report(report) => {
                let status = match self.transport.send(report.into(), delay).await {
                    Ok(()) => KeyStatus::Sent(report),
                    Err(e) => KeyStatus::Dropped(e),
                };
                drop(keyboard);
                let posted = self.events.post(AppEvent::StatusBlink)?;
                Ok((status, Some(posted)))
            }
            KeyOutcome::Unrecognized(code) => {
                drop(keyboard);
                let posted = self.events.post(AppEvent::MalformedKeyRecovery)?;
                Ok((KeyStatus::Unrecognized(code), Some(posted)))
            }
            KeyOutcome::Ignored => Ok((KeyStatus::Ignored, None)),
        }
    }

    /// Format and send an absolute pointer report.
    pub async fn send_pointer<D: DelayNs>(
        &self,
        event: PointerEvent,
        delay: &mut D,
    ) -> Result<(), Error> {
        let report = PointerReport::new(event.buttons, event.x, event.y, event.wheel);
        self.send_pointer_report(report, delay).await
    }

    /// Send the neutral pointer report.
    pub async fn clear_pointer<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error> {
        self.send_pointer_report(PointerReport::neutral(), delay).await
    }

    async fn send_pointer_report<D: DelayNs>(
        &self,
        report: PointerReport,
        delay: &mut D,
    ) -> Result<(), Error> {
        let mut last = self.pointer.lock().await;
        self.transport.send(report.into(), delay).await?;
        *last = report;
        Ok(())
    }

    /// Zero the keyboard state and send the empty report.
    pub async fn reset_keyboard<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error> {
        let mut keyboard = self.keyboard.lock().await;
        keyboard.reset();
        self.transport
            .send(KeyboardReport::empty().into(), delay)
            .await
    }

    /// Send a fixed run of keyboard reports without touching the state.
    ///
    /// The keyboard lock is held for the whole run.  Every report is
    /// attempted; the first failure is returned.
    pub async fn send_keyboard_sequence<D: DelayNs>(
        &self,
        reports: &[KeyboardReport],
        delay: &mut D,
    ) -> Result<(), Error> {
        let _keyboard = self.keyboard.lock().await;
        let mut result = Ok(());
        for report in reports {
            let sent = self.transport.send((*report).into(), delay).await;
            if result.is_ok() {
                result = sent;
            }
        }
        result
    }

    /// Current keyboard state.
    pub async fn keyboard_state(&self) -> KeyboardState {
        *self.keyboard.lock().await
    }

    /// Last pointer report the host accepted.
    pub async fn pointer_report(&self) -> PointerReport {
        *self.pointer.lock().await
    }

    /// Subscription observer.  Losing the subscriber queues a keyboard and a
    /// pointer clear so nothing stays latched on the host.
    pub fn connection_state_changed(&self, subscribed: bool) -> Result<(), Error> {
        let was_subscribed = self.subscribed.swap(subscribed, Ordering::AcqRel);
        if was_subscribed && !subscribed {
            self.queue_clears()?;
        }
        Ok(())
    }

    /// Link loss.  Clears are queued even if the sender never subscribed.
    pub fn link_lost(&self) -> Result<(), Error> {
        self.subscribed.store(false, Ordering::Release);
        self.queue_clears()
    }

    pub fn link_changed(&self, event: LinkEvent) -> Result<(), Error> {
        match event {
            LinkEvent::Subscription(subscribed) => self.connection_state_changed(subscribed),
            LinkEvent::Disconnected => self.link_lost(),
        }
    }

    fn queue_clears(&self) -> Result<(), Error> {
        self.events.post(AppEvent::KeyboardClearRequested)?;
        self.events.post(AppEvent::PointerClearRequested)?;
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    pub fn post(&self, event: AppEvent) -> Result<Posted, Error> {
        self.events.post(event)
    }

    pub async fn next_event(&self) -> AppEvent {
        self.events.next().await
    }

    pub fn try_next_event(&self) -> Option<AppEvent> {
        self.events.try_next()
    }

    pub fn events(&self) -> &EventQueue<M, N> {
        &self.events
    }

    pub fn transport(&self) -> &Transport<'a, S> {
        &self.transport
    }
}
