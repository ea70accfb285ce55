//! gpsnav - Handheld GPS Navigator
//!
//! Appliance binary for a Raspberry Pi class board with a small TFT
//! panel, five push buttons and an NMEA receiver on the UART.
//!
//! Without arguments the navigator runs until Shutdown is chosen from
//! the main menu. `-t N` runs one hardware self-test instead.

mod config;
mod logger;
mod navigator;
mod platform;
mod screens;
mod selftest;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use gpsnav_core::config::NavConfig;
use log::{error, info};

use crate::config::{load_config, FileMapSource, DEFAULT_CONFIG_PATH};
use crate::navigator::Navigator;
use crate::platform::FramebufferSurface;
use crate::selftest::SelfTest;

#[derive(Debug, Parser)]
#[command(name = "gpsnav", version, about = "Handheld GPS navigator")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run one self-test and exit: 0 display, 1 buttons, 2 GPS
    #[arg(short = 't', long = "test", value_parser = clap::value_parser!(u8).range(0..=2))]
    test: Option<u8>,
}

fn main() -> Result<ExitCode> {
    // Stdout belongs to the self-tests, the panel to the navigator
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.test.and_then(SelfTest::from_index) {
        Some(test) => run_self_test(test, &config),
        None => {
            run_navigator(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_navigator(config: NavConfig) -> Result<()> {
    let surface = open_display(&config)?;
    let buttons = platform::open_buttons(&config.buttons).context("acquiring buttons")?;
    let gps = platform::open_gps(&config.serial)
        .with_context(|| format!("opening {}", config.serial.device))?;
    let maps = FileMapSource::new(config.storage.usb_dir.as_str(), config.storage.catalog.as_str());

    let mut navigator = Navigator::new(config, surface, buttons, gps, maps);
    navigator.run()?;
    Ok(())
}

fn run_self_test(test: SelfTest, config: &NavConfig) -> Result<ExitCode> {
    info!("Running {:?} self-test", test);
    let passed = match test {
        SelfTest::Display => {
            let mut surface = open_display(config)?;
            selftest::display_test(&mut surface, &config.display, selftest::COLOR_HOLD)
                .map_err(|err| error!("display test: {}", err))
                .is_ok()
        }
        SelfTest::Buttons => {
            let mut buttons =
                platform::open_buttons(&config.buttons).context("acquiring buttons")?;
            selftest::button_test(&mut buttons, selftest::BUTTON_TIMEOUT)
        }
        SelfTest::Gps => {
            let mut gps = platform::open_gps(&config.serial)
                .with_context(|| format!("opening {}", config.serial.device))?;
            selftest::gps_test(&mut gps, selftest::GPS_TIMEOUT)
        }
    };

    if passed {
        println!("PASS");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAIL");
        Ok(ExitCode::FAILURE)
    }
}

fn open_display(config: &NavConfig) -> Result<FramebufferSurface> {
    let surface = FramebufferSurface::open(&config.display)
        .with_context(|| format!("opening display {}", config.display.device))?;
    info!(
        "Display {} ready, {}x{}",
        config.display.device, config.display.width, config.display.height
    );
    Ok(surface)
}
