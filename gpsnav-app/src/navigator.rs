//! Navigation supervisor
//!
//! Owns the position, the map catalog and the one loaded raster, and runs
//! the state machine against button presses and received NMEA lines.
//! Each loop iteration polls the buttons once and the receiver once; all
//! drawing goes into the off-screen frame and is pushed in one piece.

use std::fs::File;
use std::path::PathBuf;

use gpsnav_core::config::NavConfig;
use gpsnav_core::map::{decode_raster, project, LoadedMap, MapCatalog};
use gpsnav_core::state::{MainMenu, MenuAction, NavEvent, NavState};
use gpsnav_core::traits::{Button, ButtonSource, ByteStream, LineBuffer, MapSource};
use gpsnav_core::{parse_sentence, Position};
use gpsnav_display::{Canvas, DisplayError, DisplaySurface, FrameBuffer, Rgb565, Terminal};
use log::{debug, info, warn};
use thiserror::Error;

use crate::logger::TrackLog;
use crate::screens::{self, Style};

/// Supervisor errors; only display failures stop the loop
#[derive(Debug, Error)]
pub enum NavError {
    #[error("display: {0}")]
    Display(DisplayError),
}

impl From<DisplayError> for NavError {
    fn from(err: DisplayError) -> Self {
        NavError::Display(err)
    }
}

/// Outcome of one receiver poll
enum Received {
    Nothing,
    Line,
    Failed,
}

/// What the map view put under the overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapView {
    Projected,
    NoMapHere,
    LoadFailed,
    NoFix { advise: bool },
    ReadError,
}

/// Activity state, reset on every state entry
#[derive(Default)]
struct Session {
    /// Received lines since the last valid fix
    invalid_fixes: u32,
    heartbeat: bool,
    track: Option<TrackLog<File>>,
    /// Last receiver poll failed; set until a line arrives
    read_failed: bool,
}

/// The navigator
pub struct Navigator<S, B, G, M> {
    config: NavConfig,
    style: Style,
    surface: S,
    buttons: B,
    gps: G,
    maps: M,
    state: NavState,
    terminal: Terminal,
    frame: FrameBuffer,
    position: Position,
    catalog: MapCatalog,
    loaded: Option<LoadedMap>,
    /// Marker file found on the USB stick at startup
    storage_present: bool,
    menu: MainMenu,
    session: Session,
    line: LineBuffer,
}

impl<S, B, G, M> Navigator<S, B, G, M>
where
    S: DisplaySurface,
    B: ButtonSource,
    G: ByteStream,
    M: MapSource,
{
    /// Create a navigator over acquired hardware
    pub fn new(config: NavConfig, surface: S, buttons: B, gps: G, maps: M) -> Self {
        let (width, height) = surface.pixel_dimensions();
        let frame = FrameBuffer::new(width, height, config.display.background.rgb565());

        Self {
            style: Style::new(&config.display),
            terminal: Terminal::new(config.display.terminal()),
            config,
            surface,
            buttons,
            gps,
            maps,
            state: NavState::Init,
            frame,
            position: Position::new(),
            catalog: MapCatalog::new(),
            loaded: None,
            storage_present: false,
            menu: MainMenu::new(),
            session: Session::default(),
            line: LineBuffer::new(),
        }
    }

    /// Run until Shutdown is chosen
    pub fn run(&mut self) -> Result<(), NavError> {
        self.start()?;
        while !self.state.is_terminal() {
            self.step()?;
        }
        info!("Navigator stopped");
        Ok(())
    }

    /// Load the catalog and show the main menu
    pub fn start(&mut self) -> Result<(), NavError> {
        self.initialize();
        self.dispatch(NavEvent::InitComplete)
    }

    /// One loop iteration
    pub fn step(&mut self) -> Result<(), NavError> {
        let button = self.buttons.poll();
        if let Some(button) = button {
            debug!("button {:?}", button);
        }

        match self.state {
            NavState::MainMenu => self.menu_step(button),
            state if state.reads_gps() && button == Some(Button::Left) => {
                self.dispatch(NavEvent::Back)
            }
            NavState::GpsData | NavState::Logger => self.data_step(),
            NavState::MapNav => self.map_step(),
            NavState::Init | NavState::Exit => Ok(()),
        }
    }

    fn initialize(&mut self) {
        let marker = self.storage_path(self.config.storage.marker.as_str());
        self.storage_present = marker.exists();
        info!(
            "USB storage {}",
            if self.storage_present {
                "present"
            } else {
                "not present"
            }
        );

        self.catalog = MapCatalog::new();
        match self.maps.descriptors() {
            Ok(maps) => {
                for map in maps {
                    let file = map.file.clone();
                    if let Err(err) = self.catalog.try_push(map) {
                        warn!("Skipping map {}: {}", file, err);
                    }
                }
            }
            Err(err) => warn!("Map catalog unavailable: {:?}", err),
        }
        info!("{} maps in catalog", self.catalog.len());
        for map in self.catalog.iter() {
            debug!(
                "  {} {}x{} ({}, {}) - ({}, {})",
                map.file,
                map.width,
                map.height,
                map.top_left.latitude,
                map.top_left.longitude,
                map.bottom_right.latitude,
                map.bottom_right.longitude
            );
        }

        self.position = Position::new();
        self.loaded = None;
    }

    fn storage_path(&self, name: &str) -> PathBuf {
        PathBuf::from(self.config.storage.usb_dir.as_str()).join(name)
    }

    fn background(&self) -> Rgb565 {
        self.config.display.background.rgb565()
    }

    /// Apply an event, running exit and entry actions on a state change
    fn dispatch(&mut self, event: NavEvent) -> Result<(), NavError> {
        let next = self.state.transition(event);
        if next == self.state {
            return Ok(());
        }

        self.leave();
        info!("State {:?} -> {:?}", self.state, next);
        self.state = next;
        self.enter()
    }

    fn leave(&mut self) {
        match self.state {
            NavState::MapNav => {
                if let Some(map) = self.loaded.take() {
                    info!("Released map {}", map.index);
                }
            }
            NavState::Logger => {
                if let Some(track) = self.session.track.take() {
                    info!("Logger session closed, {} points", track.logged());
                }
            }
            _ => {}
        }
    }

    fn enter(&mut self) -> Result<(), NavError> {
        self.session = Session::default();
        if self.state.logs_track() {
            self.session.track = self.open_track();
        }

        let background = self.background();
        let transparent = self.state == NavState::MapNav;
        let mut canvas =
            Canvas::buffered(&mut self.surface, &mut self.frame).with_transparency(transparent);
        let term = &mut self.terminal;
        let style = &self.style;
        canvas.fill(background)?;

        match self.state {
            NavState::MainMenu => {
                self.menu = MainMenu::new();
                screens::greeting(term, &mut canvas, style)?;
                screens::menu(term, &mut canvas, style, &self.menu)?;
            }
            NavState::GpsData | NavState::Logger => {
                screens::exit_hint(term, &mut canvas)?;
                if self.state.logs_track() && self.session.track.is_none() {
                    screens::alert(
                        term,
                        &mut canvas,
                        style,
                        screens::LOGGER_ROW,
                        format_args!("** Cannot open logger **"),
                    )?;
                }
                self.gps.discard_input();
            }
            NavState::MapNav => {
                if self.catalog.is_empty() {
                    screens::alert(
                        term,
                        &mut canvas,
                        style,
                        screens::NO_MAPS_ROW,
                        format_args!("** No maps **"),
                    )?;
                }
                self.gps.discard_input();
            }
            NavState::Init | NavState::Exit => {}
        }

        canvas.present()?;
        Ok(())
    }

    fn open_track(&self) -> Option<TrackLog<File>> {
        if !self.storage_present {
            warn!("Logger disabled, USB storage not present");
            return None;
        }

        let path = self.storage_path(self.config.storage.log_file.as_str());
        match TrackLog::open(&path) {
            Ok(track) => {
                info!("Logging to {}", path.display());
                Some(track)
            }
            Err(err) => {
                warn!("Cannot open {}: {}", path.display(), err);
                None
            }
        }
    }

    fn menu_step(&mut self, button: Option<Button>) -> Result<(), NavError> {
        let Some(button) = button else {
            return Ok(());
        };

        match self.menu.handle(button) {
            MenuAction::None => Ok(()),
            MenuAction::Moved => {
                let mut canvas = Canvas::buffered(&mut self.surface, &mut self.frame);
                screens::menu(&mut self.terminal, &mut canvas, &self.style, &self.menu)?;
                canvas.present()?;
                Ok(())
            }
            MenuAction::Chosen(item) => self.dispatch(NavEvent::MenuSelect(item)),
        }
    }

    /// Poll the receiver once
    ///
    /// A run of read errors reports `Failed` once, on the first of them.
    fn receive(&mut self) -> Received {
        match self.gps.read_line(&mut self.line) {
            Ok(0) | Err(nb::Error::WouldBlock) => Received::Nothing,
            Ok(_) => {
                self.session.read_failed = false;
                Received::Line
            }
            Err(nb::Error::Other(_)) if self.session.read_failed => Received::Nothing,
            Err(nb::Error::Other(err)) => {
                warn!("{}: read error {:?}", self.config.serial.device, err);
                self.session.read_failed = true;
                Received::Failed
            }
        }
    }

    /// GPS data and logger screens
    fn data_step(&mut self) -> Result<(), NavError> {
        let received = self.receive();
        if let Received::Nothing = received {
            return Ok(());
        }

        let limit = self.config.navigation.invalid_fix_limit;
        let mut canvas = Canvas::buffered(&mut self.surface, &mut self.frame);
        let term = &mut self.terminal;
        let style = &self.style;

        match received {
            Received::Nothing => {}
            Received::Failed => screens::alert(
                term,
                &mut canvas,
                style,
                screens::ADVISORY_ROW,
                format_args!("Error on {}", self.config.serial.device),
            )?,
            Received::Line => {
                self.session.heartbeat = !self.session.heartbeat;
                screens::heartbeat(term, &mut canvas, self.session.heartbeat)?;

                let result = parse_sentence(&self.line, &mut self.position);
                if result.is_update() {
                    self.session.invalid_fixes = 0;
                    screens::fix_fields(term, &mut canvas, &self.position)?;
                    screens::clear_row(term, &mut canvas, screens::ADVISORY_ROW)?;

                    if self.state.logs_track() && self.position.is_fused() {
                        if let Some(track) = self.session.track.as_mut() {
                            match track.append(&self.position) {
                                Ok(count) => screens::logged_points(term, &mut canvas, count)?,
                                Err(err) => {
                                    warn!("Track log write failed: {}", err);
                                    self.session.track = None;
                                    screens::alert(
                                        term,
                                        &mut canvas,
                                        style,
                                        screens::LOGGER_ROW,
                                        format_args!("** Logger write error **"),
                                    )?;
                                }
                            }
                        }
                    }
                } else {
                    debug!("{:?}: {}", result, self.line);
                    self.session.invalid_fixes = self.session.invalid_fixes.saturating_add(1);
                    if self.session.invalid_fixes >= limit {
                        screens::alert(
                            term,
                            &mut canvas,
                            style,
                            screens::ADVISORY_ROW,
                            format_args!("** Fix not valid **"),
                        )?;
                    }
                }
            }
        }

        canvas.present()?;
        Ok(())
    }

    /// Rotating map screen
    fn map_step(&mut self) -> Result<(), NavError> {
        let view = match self.receive() {
            Received::Nothing => return Ok(()),
            Received::Failed => MapView::ReadError,
            Received::Line => self.update_map(),
        };

        let background = self.background();
        let (marker_x, marker_y) = self.marker_origin();
        let marker = u8::try_from(self.config.navigation.marker_glyph)
            .ok()
            .filter(u8::is_ascii_graphic)
            .unwrap_or(b'+');
        let scale = self.config.display.scale;

        let mut canvas =
            Canvas::buffered(&mut self.surface, &mut self.frame).with_transparency(true);
        let term = &mut self.terminal;
        let style = &self.style;

        match view {
            MapView::ReadError => screens::alert(
                term,
                &mut canvas,
                style,
                screens::ADVISORY_ROW,
                format_args!("Error on {}", self.config.serial.device),
            )?,
            MapView::NoFix { advise: true } => screens::alert(
                term,
                &mut canvas,
                style,
                screens::NO_FIX_ROW,
                format_args!("** Fix not valid **"),
            )?,
            MapView::NoMapHere => screens::alert(
                term,
                &mut canvas,
                style,
                screens::NO_MAP_HERE_ROW,
                format_args!("** No map for location **"),
            )?,
            MapView::LoadFailed => screens::alert(
                term,
                &mut canvas,
                style,
                screens::NO_MAP_HERE_ROW,
                format_args!("** Map load error **"),
            )?,
            MapView::Projected | MapView::NoFix { advise: false } => {}
        }

        if matches!(
            view,
            MapView::Projected | MapView::NoMapHere | MapView::LoadFailed
        ) {
            canvas.glyph(marker_x, marker_y, marker, Rgb565::BLUE, background, scale)?;
        }

        self.session.heartbeat = !self.session.heartbeat;
        screens::map_footer(term, &mut canvas, style, self.session.heartbeat)?;
        canvas.present()?;
        Ok(())
    }

    /// Parse the received line and redraw the map under the overlays
    fn update_map(&mut self) -> MapView {
        let result = parse_sentence(&self.line, &mut self.position);
        if !result.is_update() {
            self.session.invalid_fixes = self.session.invalid_fixes.saturating_add(1);
            return MapView::NoFix {
                advise: self.session.invalid_fixes >= self.config.navigation.invalid_fix_limit,
            };
        }
        self.session.invalid_fixes = 0;

        let latitude = self.position.latitude;
        let longitude = self.position.longitude;
        let background = self.background();

        let still_inside = self
            .loaded
            .as_ref()
            .and_then(|map| self.catalog.get(map.index))
            .is_some_and(|map| map.contains(latitude, longitude));

        if !still_inside {
            if let Some(map) = self.loaded.take() {
                info!("Left map {}", map.index);
            }
            let Some(index) = self.catalog.find(latitude, longitude) else {
                self.frame.fill(background);
                return MapView::NoMapHere;
            };
            match self.load_map(index) {
                Some(map) => self.loaded = Some(map),
                None => {
                    self.frame.fill(background);
                    return MapView::LoadFailed;
                }
            }
        }

        if let Some(map) = self.loaded.as_ref() {
            if let Some(descriptor) = self.catalog.get(map.index) {
                project(
                    &self.position,
                    descriptor,
                    &map.pixels,
                    &mut self.frame,
                    background,
                );
            }
        }
        MapView::Projected
    }

    fn load_map(&mut self, index: usize) -> Option<LoadedMap> {
        let map = self.catalog.get(index)?;
        let bytes = match self.maps.read_raster(map) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Cannot read map {}: {:?}", map.file, err);
                return None;
            }
        };

        match decode_raster(map, &bytes) {
            Ok(pixels) => {
                info!("Loaded map {} ({}x{})", map.file, map.width, map.height);
                Some(LoadedMap { index, pixels })
            }
            Err(err) => {
                warn!("Map {}: {}", map.file, err);
                None
            }
        }
    }

    /// Top-left corner of the glyph cell centered on the frame
    fn marker_origin(&self) -> (u16, u16) {
        let display = &self.config.display;
        let scale = display.scale.max(1) as u16;
        let cell_width = display.glyph_width.saturating_mul(scale);
        let cell_height = display.glyph_height.saturating_mul(scale);
        (
            self.frame.width().saturating_sub(cell_width) / 2,
            self.frame.height().saturating_sub(cell_height) / 2,
        )
    }
}

#[cfg(test)]
impl<S, B, G, M> Navigator<S, B, G, M> {
    fn state(&self) -> NavState {
        self.state
    }

    fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    fn loaded_map(&self) -> Option<usize> {
        self.loaded.as_ref().map(|map| map.index)
    }

    fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}
