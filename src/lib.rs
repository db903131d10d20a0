//! DHT Sensor Driver built on Timer Input-Capture
//!
//! This crate provides a platform-agnostic driver for DHT-class (DHT22, AM2302)
//! temperature and humidity sensors. Instead of timing the sensor's pulses in a
//! busy loop, it lets a timer input-capture channel timestamp every edge on the
//! data line, then decodes the recorded pulse lengths once the line is quiet.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments, no allocation
//! - Edges recorded either from polled captures or by your capture interrupt
//!   handler through a [`SharedRecorder`] guarded by `critical-section`
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access
//! - [`DelayNs`] for the start signal
//!
//! and on an [`EdgeCapture`] implementation for the timer channel. A
//! `critical-section` implementation must be linked in when a
//! [`SharedRecorder`] is used.
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs failed reads
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod capture;
pub mod decode;
pub mod dht;
pub mod error;
pub mod reading;
pub mod recorder;
pub mod timing;

pub use capture::{Armed, EdgeCapture};
pub use dht::Dht;
pub use error::{DecodeError, DhtError};
pub use reading::{MeasurementResult, Reading, Tenths};
pub use recorder::{CapturePolarity, EdgeRecorder, RecorderCell, SharedRecorder};
pub use timing::Timing;
