//! Application event queue.
//!
//! Bounded FIFO of [`AppEvent`]s with many producers and one consumer (the
//! dispatcher).  When the queue is full a producer flushes every queued
//! event and retries once; a second failure is [`Error::EventQueueExhausted`],
//! which callers treat as fatal.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::error::Error;

/// Side-channel work for the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppEvent {
    /// Pulse the status indicator once.
    StatusBlink,
    /// Physical or remote reset: clear state and the console.
    RemoteResetRequested,
    /// Type the "key not recognized" macro to the host.
    MalformedKeyRecovery,
    /// Release every key and modifier on the host.
    KeyboardClearRequested,
    /// Release every pointer button on the host.
    PointerClearRequested,
}

/// How a post went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Posted {
    Queued,
    /// The queue was full; `dropped` older events were discarded first.
    QueuedAfterFlush { dropped: usize },
}

pub struct EventQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, AppEvent, N>,
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue `event`, flushing the queue once if it is full.
    pub fn post(&self, event: AppEvent) -> Result<Posted, Error> {
        match self.channel.try_send(event) {
            Ok(()) => Ok(Posted::Queued),
            Err(TrySendError::Full(event)) => {
                let dropped = self.flush();
                self.channel
                    .try_send(event)
                    .map(|()| Posted::QueuedAfterFlush { dropped })
                    .map_err(|_| Error::EventQueueExhausted)
            }
        }
    }

    /// Discard every queued event; returns how many were dropped.
    pub fn flush(&self) -> usize {
        let mut dropped = 0;
        while self.channel.try_receive().is_ok() {
            dropped += 1;
        }
        dropped
    }

    pub fn try_next(&self) -> Option<AppEvent> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event.
    pub async fn next(&self) -> AppEvent {
        self.channel.receive().await
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
