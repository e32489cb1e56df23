//! Pure link-indicator logic, kept apart from the PWM driver so it can be
//! tested on the host.

use crate::config::LINK_BREATH_STEPS;

/// Link LED duty for breathing step `step`.
///
/// Held at `max_duty` while a sender is subscribed; otherwise a triangle
/// fade that rises for half of [`LINK_BREATH_STEPS`] and falls for the
/// other half.
pub fn link_led_duty(subscribed: bool, step: u32, max_duty: u16) -> u16 {
    if subscribed {
        return max_duty;
    }
    let half = LINK_BREATH_STEPS / 2;
    let phase = step % LINK_BREATH_STEPS;
    let level = if phase < half {
        phase
    } else {
        LINK_BREATH_STEPS - phase
    };
    (level as u64 * max_duty as u64 / half as u64) as u16
}

/// Next breathing step, wrapping at the end of a cycle.
pub fn next_step(step: u32) -> u32 {
    (step + 1) % LINK_BREATH_STEPS
}
