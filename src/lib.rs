//! A library for controlling GW Instek AFG-2000 and AFG-2100 series
//! arbitrary function generators over a serial port.
//!
//! The attached model is identified when the device is opened, and a
//! [`Device`] exposing typed operations for it is returned:
//!
//! ```rust
//! # use afgctl::error::Error;
//! # fn wrapper() -> Result<(), Error> {
//! let mut device = afgctl::open_serial("/dev/ttyACM1")?;
//! device.apply_sine(1250, 1.254, 0.52, 1)?;
//! println!("{:?}", device.frequency(1)?);
//! # Ok(())
//! # }
//! ```
//!
//! Any other transport can be used by implementing a [`Connector`] and
//! calling [`resolve`].
//!
//! ## Responses
//!
//! After every command, all of the lines the device sends back before the
//! read timeout of [`READ_TIMEOUT`] expires are collected. A read that
//! times out is not an error. When the responses are of no interest, for
//! instance while streaming many settings, response capture can be turned
//! off with [`Device::set_capture`] or [`Device::capture_guard`]. A
//! background thread then discards whatever the device sends.
//!
//! ## Logging
//!
//! Every line transmitted and received is logged at the debug level through
//! the [`log`](https://docs.rs/log) crate, prefixed with the name of the
//! port. Install any `log` compatible logger to see them.
//!
//! [`Connector`]: backend::Connector
//! [`READ_TIMEOUT`]: backend::READ_TIMEOUT

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]

pub mod backend;
pub mod capture_guard;
pub mod command;
pub mod device;
pub mod error;
pub mod model;
mod resolve;
pub mod response;
mod session;

pub use device::Device;
pub use resolve::{open_serial, resolve};
