//! Report transport synchronisation.
//!
//! Every HID interface has exactly one outstanding-report slot.  A
//! [`ReadyGate`] represents that slot: it is taken before a report is
//! submitted and given back by the interface's "transmit complete"
//! notification.  Taking it is bounded by a timeout so a host that stops
//! polling cannot freeze the input path; a report that misses its slot is
//! simply dropped and the next state change carries the newer state.

use core::future::poll_fn;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::waitqueue::AtomicWaker;
use embedded_hal_async::delay::DelayNs;

use crate::error::Error;
use crate::hid::{HidReport, Interface};

/// Binary availability signal for one interface.
pub struct ReadyGate {
    available: AtomicBool,
    waker: AtomicWaker,
}

impl ReadyGate {
    /// A gate starts available: nothing is in flight after enumeration.
    pub const fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            waker: AtomicWaker::new(),
        }
    }

    /// Take the slot if it is free.
    pub fn try_acquire(&self) -> bool {
        self.available
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Wait until the slot is free, then take it.
    pub async fn acquire(&self) {
        poll_fn(|cx| {
            if self.try_acquire() {
                return Poll::Ready(());
            }
            self.waker.register(cx.waker());
            // A release may have landed between the check and the register.
            if self.try_acquire() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }

    /// Give the slot back and wake the waiter, if any.
    pub fn release(&self) {
        self.available.store(true, Ordering::Release);
        self.waker.wake();
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

/// One gate per HID interface.
pub struct Gates {
    keyboard: ReadyGate,
    pointer: ReadyGate,
}

impl Gates {
    pub const fn new() -> Self {
        Self {
            keyboard: ReadyGate::new(),
            pointer: ReadyGate::new(),
        }
    }

    pub fn gate(&self, interface: Interface) -> &ReadyGate {
        match interface {
            Interface::Keyboard => &self.keyboard,
            Interface::Pointer => &self.pointer,
        }
    }

    /// Transmit-complete notification from the USB side.
    pub fn transmit_complete(&self, interface: Interface) {
        self.gate(interface).release();
    }
}

impl Default for Gates {
    fn default() -> Self {
        Self::new()
    }
}

/// Where reports go once their slot is held.
///
/// `submit` must not block.  The implementation owns the slot from then on
/// and calls [`Gates::transmit_complete`] when the host has taken the
/// report.
pub trait ReportSink {
    fn submit(&self, report: HidReport) -> Result<(), Error>;
}

impl<S: ReportSink + ?Sized> ReportSink for &S {
    fn submit(&self, report: HidReport) -> Result<(), Error> {
        (**self).submit(report)
    }
}

/// Gated, bounded-wait report submission.
pub struct Transport<'a, S> {
    gates: &'a Gates,
    sink: S,
    timeout_ms: u32,
}

impl<'a, S: ReportSink> Transport<'a, S> {
    pub const fn new(gates: &'a Gates, sink: S, timeout_ms: u32) -> Self {
        Self {
            gates,
            sink,
            timeout_ms,
        }
    }

    /// Send one report on its interface.
    ///
    /// Fails with [`Error::Timeout`] when the previous report on the same
    /// interface is not acknowledged within the timeout.  No retry.
    pub async fn send<D: DelayNs>(&self, report: HidReport, delay: &mut D) -> Result<(), Error> {
        let gate = self.gates.gate(report.interface());

        match select(gate.acquire(), delay.delay_ms(self.timeout_ms)).await {
            Either::First(()) => {}
            Either::Second(()) => return Err(Error::Timeout),
        }

        if let Err(e) = self.sink.submit(report) {
            gate.release();
            return Err(e);
        }
        Ok(())
    }

    pub fn gates(&self) -> &'a Gates {
        self.gates
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
