//! Debounced push buttons
//!
//! Five buttons, one GPIO input each. A press must still be present
//! after the debounce delay before it is reported.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use gpsnav_core::traits::{Button, ButtonSource};

/// One input pin per button
pub struct ButtonPins<P> {
    pub select: P,
    pub up: P,
    pub down: P,
    pub left: P,
    pub right: P,
}

/// Button source over digital inputs
///
/// Buttons are scanned in priority order (Select, Up, Down, Left,
/// Right); the first pressed one wins. A pin read error counts as
/// not pressed.
pub struct PinButtons<P, D> {
    pins: ButtonPins<P>,
    delay: D,
    /// If true, pressed = pin LOW
    active_low: bool,
    debounce_ms: u32,
}

impl<P: InputPin, D: DelayNs> PinButtons<P, D> {
    /// Create a button source
    ///
    /// # Arguments
    /// - `pins`: One input per button
    /// - `delay`: Delay provider for the debounce wait
    /// - `active_low`: Pressed buttons pull the pin LOW
    /// - `debounce_ms`: Wait before confirming a press
    pub fn new(pins: ButtonPins<P>, delay: D, active_low: bool, debounce_ms: u32) -> Self {
        Self {
            pins,
            delay,
            active_low,
            debounce_ms,
        }
    }

    fn pin(&mut self, button: Button) -> &mut P {
        match button {
            Button::Select => &mut self.pins.select,
            Button::Up => &mut self.pins.up,
            Button::Down => &mut self.pins.down,
            Button::Left => &mut self.pins.left,
            Button::Right => &mut self.pins.right,
        }
    }

    fn is_pressed(&mut self, button: Button) -> bool {
        let active_low = self.active_low;
        let pin = self.pin(button);
        let level = if active_low { pin.is_low() } else { pin.is_high() };
        level.unwrap_or(false)
    }
}

impl<P: InputPin, D: DelayNs> ButtonSource for PinButtons<P, D> {
    fn poll(&mut self) -> Option<Button> {
        const ORDER: [Button; 5] = [
            Button::Select,
            Button::Up,
            Button::Down,
            Button::Left,
            Button::Right,
        ];

        let button = ORDER.into_iter().find(|&button| self.is_pressed(button))?;
        self.delay.delay_ms(self.debounce_ms);
        self.is_pressed(button).then_some(button)
    }
}
