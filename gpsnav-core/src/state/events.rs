//! Events that trigger state transitions

use super::menu::MenuItem;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavEvent {
    /// Capabilities acquired and catalog loaded
    InitComplete,
    /// Select pressed on a main menu entry
    MenuSelect(MenuItem),
    /// Left pressed inside an activity
    Back,
}
