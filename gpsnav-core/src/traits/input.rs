//! Push-button input

/// Front panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// Numeric code printed by the button self-test
    pub fn code(self) -> u8 {
        match self {
            Button::Select => 0,
            Button::Up => 1,
            Button::Down => 2,
            Button::Left => 3,
            Button::Right => 4,
        }
    }
}

/// Trait for button input
///
/// `poll` never blocks for long; an implementation may spend its
/// debounce interval confirming a press before reporting it.
pub trait ButtonSource {
    /// Return the pressed button, or `None` if nothing is pressed
    fn poll(&mut self) -> Option<Button>;
}
