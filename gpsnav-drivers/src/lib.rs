//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in gpsnav-core on top of the embedded-hal / embedded-io interfaces:
//!
//! - Debounced push buttons on digital input pins
//! - NMEA line reader on a non-blocking byte reader (UART)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buttons;
pub mod serial;

pub use buttons::{ButtonPins, PinButtons};
pub use serial::LineReader;
