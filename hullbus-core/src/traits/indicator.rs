//! Diagnostic indicator trait

/// Colors an RGB status LED can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl Color {
    /// Which of the red, green and blue channels are lit
    pub fn channels(self) -> (bool, bool, bool) {
        match self {
            Color::Red => (true, false, false),
            Color::Green => (false, true, false),
            Color::Blue => (false, false, true),
            Color::Yellow => (true, true, false),
            Color::Cyan => (false, true, true),
            Color::Magenta => (true, false, true),
            Color::White => (true, true, true),
        }
    }
}

/// Something that can flash a color at the operator
///
/// Blinking is purely observational; implementations swallow output errors.
#[allow(async_fn_in_trait)]
pub trait Indicator {
    /// Flash `color` `count` times, ending dark
    async fn blink(&mut self, color: Color, count: u8);
}
