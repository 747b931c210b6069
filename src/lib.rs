//! Driver for the Pervasive Displays TC(M)-P series of e-ink panels and
//! their TCon timing controllers, for use with embedded-hal v1.0.
//!
//! The controllers speak a framed command/response protocol over SPI
//! (mode 3, MSB first) with a busy line for synchronisation. This crate
//! implements that protocol, the packed one-bit pixel format, and the
//! model registry that adapts the driver to the detected panel.
//!
//! Supported:
//! * TC(M)-P441 (4.41 inch panel)
//!
//! Untested:
//! * TC(M)-P102
//!
//! Unsupported:
//! * TC(M)-P74 (initialisation fails fast)
//!
//! ## Example
//!
//! ```rust,ignore
//! use tcmp::{Bitmap, Interface, Tcmp};
//!
//! let interface = Interface::new(spi_device, busy_pin);
//! let mut display = Tcmp::new(interface, [0u8; 15000]);
//!
//! let profile = display.begin(&mut delay)?;
//! log::info!("panel: {}", profile.model.name());
//!
//! display.set_image(&Bitmap::new(400, 300, &samples))?;
//! display.display(&mut delay)?;
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod command;
mod display;
mod error;
mod format;
mod interface;
mod models;
mod protocol;

#[cfg(feature = "graphics")]
mod graphics;

#[cfg(test)]
mod mock;

pub use display::{Bitmap, Tcmp};
pub use error::{Error, ProtocolError};
pub use format::PixelFormat;
pub use interface::{Interface, InterfaceError, TconInterface};
pub use models::{Model, Profile, identify};
pub use protocol::{MAX_DATA_LEN, Protocol, STRING_WINDOW};
