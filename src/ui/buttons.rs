//! GPIO reset button with async debouncing.
//!
//! One active-low push-button with internal pull-up.  A debounced press
//! posts [`AppEvent::RemoteResetRequested`] to the event queue.

use defmt::{info, warn};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

use hidrelay::config::BUTTON_DEBOUNCE_MS;
use hidrelay::event::{AppEvent, Posted};

/// Run the reset button loop.
///
/// Waits for the pin to go low (pressed), debounces, hands the event to
/// `post`, then waits for release before repeating.
pub async fn reset_button_task<F>(pin: AnyPin, mut post: F) -> !
where
    F: FnMut(AppEvent) -> Result<Posted, hidrelay::Error>,
{
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Reset button pressed");
            match post(AppEvent::RemoteResetRequested) {
                Ok(Posted::Queued) => {}
                Ok(Posted::QueuedAfterFlush { dropped }) => {
                    warn!("Event queue full, dropped {} events", dropped)
                }
                Err(e) => defmt::panic!("Event queue fault: {}", e),
            }

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
