//! Hardware self-tests (`gpsnav -t N`)
//!
//! Each test exercises one capability and reports pass or fail; the
//! binary turns the result into its exit code.

use std::thread;
use std::time::{Duration, Instant};

use gpsnav_core::config::DisplayConfig;
use gpsnav_core::traits::{Button, ButtonSource, ByteStream, LineBuffer};
use gpsnav_display::{Canvas, DisplayError, DisplaySurface, FrameBuffer, Rgb565, Terminal};
use gpsnav_protocol::Sentence;
use log::{error, info};

/// Test selected by `-t`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTest {
    Display,
    Buttons,
    Gps,
}

impl SelfTest {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Display),
            1 => Some(Self::Buttons),
            2 => Some(Self::Gps),
            _ => None,
        }
    }
}

/// How long to show each full-screen color
pub const COLOR_HOLD: Duration = Duration::from_secs(1);
/// Time allowed to press LEFT
pub const BUTTON_TIMEOUT: Duration = Duration::from_secs(30);
/// Time allowed to receive one good sentence
pub const GPS_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

const COLOR_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// Cycle red, green and blue over the panel, then draw a color bar
pub fn display_test<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    display: &DisplayConfig,
    hold: Duration,
) -> Result<(), DisplayError> {
    let (width, height) = surface.pixel_dimensions();
    let background = display.background.rgb565();
    let mut frame = FrameBuffer::new(width, height, background);
    let mut canvas = Canvas::buffered(surface, &mut frame);

    for color in [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE] {
        canvas.fill(color)?;
        canvas.present()?;
        thread::sleep(hold);
    }

    let mut term = Terminal::new(display.terminal());
    canvas.fill(background)?;
    term.write_str(&mut canvas, "\x1b[0;0f\x1b[37;40mDisplay test")?;
    for (index, name) in COLOR_NAMES.iter().enumerate() {
        term.print(
            &mut canvas,
            format_args!("\x1b[{};0f\x1b[30;4{}m   \x1b[37;40m {}", index + 2, index, name),
        )?;
    }
    canvas.present()
}

/// Echo button codes until LEFT is pressed
///
/// Returns false if `timeout` passes first.
pub fn button_test<B: ButtonSource + ?Sized>(buttons: &mut B, timeout: Duration) -> bool {
    info!("Press buttons, LEFT to finish");
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        match buttons.poll() {
            Some(button) => {
                println!("button {} ({:?})", button.code(), button);
                if button == Button::Left {
                    return true;
                }
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
    false
}

/// Print received lines until one passes checksum
///
/// Returns false on timeout or on a transport error.
pub fn gps_test<G: ByteStream + ?Sized>(gps: &mut G, timeout: Duration) -> bool {
    let mut line = LineBuffer::new();
    let deadline = Instant::now() + timeout;
    loop {
        match gps.read_line(&mut line) {
            Ok(_) => {
                println!("{}", line);
                if Sentence::parse(&line).is_ok() {
                    return true;
                }
            }
            Err(nb::Error::WouldBlock) => thread::sleep(POLL_INTERVAL),
            Err(nb::Error::Other(err)) => {
                error!("GPS read failed: {:?}", err);
                return false;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
    }
}
