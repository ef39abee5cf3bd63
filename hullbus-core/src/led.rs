//! RGB status LED

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::config::StatusLedConfig;
use crate::traits::{Color, Indicator};

/// Status LED on three GPIO outputs
pub struct RgbLed<R, G, B, D> {
    red: R,
    green: G,
    blue: B,
    delay: D,
    config: StatusLedConfig,
}

impl<R, G, B, D> RgbLed<R, G, B, D>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
    D: DelayNs,
{
    /// Take the pins and switch the LED off
    pub fn new(red: R, green: G, blue: B, delay: D, config: StatusLedConfig) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            delay,
            config,
        };
        led.off();
        led
    }

    /// Light a color until the next call
    pub fn show(&mut self, color: Color) {
        let (r, g, b) = color.channels();
        self.set(r, g, b);
    }

    pub fn off(&mut self) {
        self.set(false, false, false);
    }

    fn set(&mut self, r: bool, g: bool, b: bool) {
        let active_low = self.config.active_low;
        let level = |lit: bool| PinState::from(lit != active_low);

        // Pin errors are ignored; the LED is informational only
        let _ = self.red.set_state(level(r));
        let _ = self.green.set_state(level(g));
        let _ = self.blue.set_state(level(b));
    }
}

impl<R, G, B, D> Indicator for RgbLed<R, G, B, D>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
    D: DelayNs,
{
    async fn blink(&mut self, color: Color, count: u8) {
        let blink_ms = self.config.blink_ms;
        for _ in 0..count {
            self.show(color);
            self.delay.delay_ms(blink_ms).await;
            self.off();
            self.delay.delay_ms(blink_ms).await;
        }
    }
}
