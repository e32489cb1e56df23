//! Unified error type for hidrelay.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    // USB
    /// USB stack returned an error while writing an endpoint.
    Usb,

    /// The USB peripheral could not be initialised.
    UsbNotAvailable,

    // Transport
    /// The interface's previous report was not acknowledged in time.
    Timeout,

    /// The interface accepted the slot but refused the report.
    ChannelBusy,

    // Event queue
    /// The event queue was still full after a forced flush.
    EventQueueExhausted,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// The GATT server could not be registered.
    RegisterFailed,
    /// Advertising could not start.
    AdvertiseFailed,
    /// TX characteristic notify failed.
    NotifyFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl Error {
    /// Whether the condition must halt the device rather than be absorbed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::EventQueueExhausted | Error::UsbNotAvailable
        )
    }
}
