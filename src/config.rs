//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// BLE

/// Advertised device name.
pub const BLE_DEVICE_NAME: &str = "HIDRelay";

/// Relay service UUID (597f1290-5b99-477d-9261-f0ed801fc566).
///
/// The RX (write) and TX (notify) characteristics use the same base with
/// 0x1291 / 0x1292 in the first group; their literals are spelled out in
/// `ble::relay_service` because the GATT macros need string literals.
pub const RELAY_SERVICE_UUID: u128 = 0x597f1290_5b99_477d_9261_f0ed801fc566;

/// Negotiated ATT MTU we ask the SoftDevice for.
pub const BLE_ATT_MTU: u16 = 247;

/// Largest command message accepted in one write (ATT MTU minus the
/// 3-byte write header). Longer input is truncated to this bound.
pub const MAX_MESSAGE_LEN: usize = 244;

/// Number of received messages buffered between the BLE write callback
/// and the input task.
pub const INBOX_DEPTH: usize = 4;

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "hidrelay";
pub const USB_PRODUCT: &str = "BLE HID Relay";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

/// Upper bound on waiting for an interface's previous report to complete.
/// A stalled host must never freeze the input pipeline.
pub const REPORT_SEND_TIMEOUT_MS: u32 = 100;

// Events

/// Capacity of the application event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 255;

/// Length of one status LED pulse (on, then off for the same time).
pub const STATUS_BLINK_MS: u64 = 50;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Reset button   → P0.11 (SW1)
//   Status LED     → P0.13 (LED1)
//   Link LED (PWM) → P0.16 (LED4)

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// One link LED breathing cycle, in steps.
pub const LINK_BREATH_STEPS: u32 = 1000;

/// Duration of one breathing step (ms).
pub const LINK_BREATH_STEP_MS: u64 = 1;

/// PWM top value for the link LED.
pub const LINK_LED_MAX_DUTY: u16 = 1000;
