//! USB Device subsystem - presents a composite device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with three
//! interfaces:
//!
//! - Keyboard        (boot protocol, 8-byte report)
//! - Pointer         (absolute X/Y, 6-byte report)
//! - CDC-ACM console (diagnostic text only)
//!
//! Each HID interface has one single-slot report channel and one writer
//! task.  The writer releases the interface's ready gate once the
//! endpoint write has finished.

pub mod hid_device;
