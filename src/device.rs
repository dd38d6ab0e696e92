//! AD5220 part constants and ohm/step conversion.
//!
//! Single source of truth for the wiper range. The driver, the config
//! layer and the simulated chip all reference this module rather than
//! hard-coding the 7-bit bounds.
//!
//! The AD5220 is an up/down counter with no readback: 128 taps, moved one
//! tap per falling CLK edge while CS is low, clamped at both end stops.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wiper range
// ---------------------------------------------------------------------------

/// Lowest wiper tap (terminal B).
pub const MIN_POSITION: u8 = 0;
/// Highest wiper tap (terminal A).
pub const MAX_POSITION: u8 = 127;
/// Power-on reset tap (midscale).
pub const START_POSITION: u8 = 64;

// ---------------------------------------------------------------------------
// Resistance variants
// ---------------------------------------------------------------------------

/// End-to-end resistance grades the part ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// AD5220BR10 / BRM10
    K10,
    /// AD5220BR50 / BRM50
    K50,
    /// AD5220BR100 / BRM100
    K100,
}

impl Variant {
    /// Nominal resistance between terminals A and B, in ohms.
    pub const fn full_scale_ohms(self) -> u32 {
        match self {
            Self::K10 => 10_000,
            Self::K50 => 50_000,
            Self::K100 => 100_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion (round half up, integer only)
// ---------------------------------------------------------------------------

/// Tap index closest to `ohms` on a part whose top tap reads `full_scale`.
///
/// Computes `round(ohms / full_scale * MAX_POSITION)`. The result is not
/// clamped to the wiper range; callers hand it to `write`, which reports
/// an unreachable target instead.
pub fn steps_for_ohms(ohms: u32, full_scale: NonZeroU32) -> u32 {
    let full = u64::from(full_scale.get());
    let scaled = 2 * u64::from(ohms) * u64::from(MAX_POSITION) + full;
    u32::try_from(scaled / (2 * full)).unwrap_or(u32::MAX)
}

/// Resistance at tap `position`: `round(position / MAX_POSITION * full_scale)`.
pub fn ohms_for_steps(position: u8, full_scale: NonZeroU32) -> u32 {
    let max = u64::from(MAX_POSITION);
    let scaled = 2 * u64::from(position) * u64::from(full_scale.get()) + max;
    u32::try_from(scaled / (2 * max)).unwrap_or(u32::MAX)
}

/// Size of one tap in ohms, rounded up. Upper bound on conversion error.
pub fn ohms_per_step(full_scale: NonZeroU32) -> u32 {
    full_scale
        .get()
        .div_ceil(u32::from(MAX_POSITION - MIN_POSITION))
}
