//! Main menu selection

use crate::traits::Button;

/// Main menu entries, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    Map,
    GpsData,
    Logger,
    Shutdown,
}

impl MenuItem {
    /// All entries in display order
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Map,
        MenuItem::GpsData,
        MenuItem::Logger,
        MenuItem::Shutdown,
    ];

    /// Fixed-width label so the highlight bar has one length
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Map => " Map        ",
            MenuItem::GpsData => " GPS Data   ",
            MenuItem::Logger => " GPS Logger ",
            MenuItem::Shutdown => " Shutdown   ",
        }
    }
}

/// What a button press did to the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Nothing changed
    None,
    /// Highlight moved; redraw
    Moved,
    /// Entry chosen with Select
    Chosen(MenuItem),
}

/// Highlight position in the main menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MainMenu {
    index: usize,
}

impl MainMenu {
    /// Menu with the first entry highlighted
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.index]
    }

    /// Apply one button press; Up/Down wrap at both ends
    pub fn handle(&mut self, button: Button) -> MenuAction {
        let count = MenuItem::ALL.len();
        match button {
            Button::Select => MenuAction::Chosen(self.selected()),
            Button::Up => {
                self.index = (self.index + count - 1) % count;
                MenuAction::Moved
            }
            Button::Down => {
                self.index = (self.index + 1) % count;
                MenuAction::Moved
            }
            Button::Left | Button::Right => MenuAction::None,
        }
    }
}
