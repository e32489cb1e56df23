//! Status and link LEDs.

use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::SimplePwm;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;

use hidrelay::config::{LINK_BREATH_STEP_MS, LINK_LED_MAX_DUTY, STATUS_BLINK_MS};
use hidrelay::dispatch::StatusIndicator;
use hidrelay::status_logic::{link_led_duty, next_step};

/// Active-low status LED, pulsed once per relayed key.
pub struct StatusLed<P> {
    pin: P,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_high();
        Self { pin }
    }
}

impl<P: OutputPin> StatusIndicator for StatusLed<P> {
    async fn pulse(&mut self) {
        let _ = self.pin.set_low();
        Timer::after(Duration::from_millis(STATUS_BLINK_MS)).await;
        let _ = self.pin.set_high();
        Timer::after(Duration::from_millis(STATUS_BLINK_MS)).await;
    }
}

/// Drive the link LED forever: breathing while nobody is subscribed,
/// solid once a sender has enabled notifications.
pub async fn link_led_task(
    mut pwm: SimplePwm<'static, PWM0>,
    is_subscribed: impl Fn() -> bool,
) -> ! {
    pwm.set_max_duty(LINK_LED_MAX_DUTY);
    let mut step = 0;

    loop {
        pwm.set_duty(0, link_led_duty(is_subscribed(), step, LINK_LED_MAX_DUTY));
        step = next_step(step);
        Timer::after(Duration::from_millis(LINK_BREATH_STEP_MS)).await;
    }
}
