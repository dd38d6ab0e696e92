//! AD5220 digital potentiometer driver.
//!
//! The AD5220 is a 128-tap potentiometer moved one tap per clock pulse in
//! the direction held on its U/D pin. It has no readback, so [`Ad5220`]
//! mirrors the wiper in software and every operation is sequenced so the
//! mirror never runs ahead of the pulses actually sent.
//!
//! Lines are plain `embedded_hal::digital::OutputPin`s. For several chips
//! on one clock/direction pair, wrap the shared pins in [`SharedLine`].
//!
//! ```ignore
//! use ad5220::{Ad5220, ShutdownMode};
//!
//! let mut pot = Ad5220::with_chip_select(clk, ud, cs, 10_000)?;
//! pot.write_resistance(4_700)?;
//! pot.increment()?;
//! let lines = pot.close_with(ShutdownMode::KeepDriving)?;
//! ```
//!
//! With the `sim` feature, the `sim` module models the chip in memory for
//! host-side tests.

#![deny(unused_must_use)]

pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod lines;
pub mod shared;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use config::PotConfig;
pub use device::{MAX_POSITION, MIN_POSITION, START_POSITION, Variant};
pub use driver::{Ad5220, ShutdownMode};
pub use error::{ConfigError, Error};
pub use lines::{ChipSelect, Lines};
pub use shared::SharedLine;
