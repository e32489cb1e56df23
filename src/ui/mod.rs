//! User-facing hardware - one reset button and two LEDs.
//!
//! ## Components
//!
//! - **Reset button**: debounced, posts a remote reset event
//! - **Status LED**: one short pulse per relayed key report
//! - **Link LED** (PWM): breathes until a sender subscribes

pub mod buttons;
pub mod status_led;
