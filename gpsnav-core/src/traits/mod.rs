//! Hardware abstraction traits
//!
//! These traits define the interface between the navigator logic and
//! the board. The display side lives in `gpsnav_display::DisplaySurface`.

pub mod input;
pub mod serial;
pub mod storage;

pub use input::{Button, ButtonSource};
pub use serial::{ByteStream, LineBuffer};
pub use storage::MapSource;
