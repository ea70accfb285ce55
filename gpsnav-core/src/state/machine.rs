//! State machine definition
//!
//! Every screen the navigator shows is a function of the current state.

use super::events::NavEvent;
use super::menu::MenuItem;

/// Navigator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavState {
    /// Startup: acquire hardware, load the map catalog
    Init,
    /// Main menu visible
    MainMenu,
    /// Live fix readout
    GpsData,
    /// Rotating map view
    MapNav,
    /// Live fix readout plus CSV track logging
    Logger,
    /// Shut down; the loop ends here
    Exit,
}

impl NavState {
    /// Check if this state reads the GPS stream
    pub fn reads_gps(&self) -> bool {
        matches!(self, NavState::GpsData | NavState::MapNav | NavState::Logger)
    }

    /// Check if this state writes the track log
    pub fn logs_track(&self) -> bool {
        matches!(self, NavState::Logger)
    }

    /// Check if the navigator loop should stop
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavState::Exit)
    }

    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: NavEvent) -> Self {
        use NavEvent::*;
        use NavState::*;

        match (self, event) {
            (Init, InitComplete) => MainMenu,

            (MainMenu, MenuSelect(MenuItem::Map)) => MapNav,
            (MainMenu, MenuSelect(MenuItem::GpsData)) => GpsData,
            (MainMenu, MenuSelect(MenuItem::Logger)) => Logger,
            (MainMenu, MenuSelect(MenuItem::Shutdown)) => Exit,

            (GpsData, Back) | (MapNav, Back) | (Logger, Back) => MainMenu,

            // Exit is terminal
            (Exit, _) => Exit,

            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_to_menu() {
        assert_eq!(NavState::Init.transition(NavEvent::InitComplete), NavState::MainMenu);
        assert_eq!(NavState::Init.transition(NavEvent::Back), NavState::Init);
    }

    #[test]
    fn test_menu_selections() {
        let menu = NavState::MainMenu;
        assert_eq!(menu.transition(NavEvent::MenuSelect(MenuItem::Map)), NavState::MapNav);
        assert_eq!(menu.transition(NavEvent::MenuSelect(MenuItem::GpsData)), NavState::GpsData);
        assert_eq!(menu.transition(NavEvent::MenuSelect(MenuItem::Logger)), NavState::Logger);
        assert_eq!(menu.transition(NavEvent::MenuSelect(MenuItem::Shutdown)), NavState::Exit);
        assert_eq!(menu.transition(NavEvent::Back), NavState::MainMenu);
    }

    #[test]
    fn test_activities_return_to_menu() {
        for state in [NavState::GpsData, NavState::MapNav, NavState::Logger] {
            assert!(state.reads_gps());
            assert_eq!(state.transition(NavEvent::Back), NavState::MainMenu);
            assert_eq!(state.transition(NavEvent::MenuSelect(MenuItem::Map)), state);
        }
    }

    #[test]
    fn test_exit_is_terminal() {
        assert!(NavState::Exit.is_terminal());
        assert_eq!(NavState::Exit.transition(NavEvent::InitComplete), NavState::Exit);
        assert!(NavState::Logger.logs_track());
        assert!(!NavState::GpsData.logs_track());
    }
}
