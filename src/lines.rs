//! Line handles owned by a driver.
//!
//! Any `embedded_hal::digital::OutputPin` can serve as a line: holding one
//! means the HAL has already configured it as an output. Levels follow the
//! AD5220 pinout:
//!
//! | Line | Idle | Active |
//! |------|------|--------|
//! | CLK  | high | low (falling edge steps the counter) |
//! | U/D  | low (down) | high (up) |
//! | CS   | high (deselected) | low |

use embedded_hal::digital::OutputPin;

/// Chip-select wiring.
///
/// `Tied` means CS is strapped to ground and the chip reacts to every
/// clock edge; `Wired` frames each pulse sequence so several chips can
/// share one clock and direction line.
#[derive(Debug)]
pub enum ChipSelect<P> {
    Tied,
    Wired(P),
}

impl<P> ChipSelect<P> {
    pub fn is_wired(&self) -> bool {
        matches!(self, Self::Wired(_))
    }

    pub fn into_inner(self) -> Option<P> {
        match self {
            Self::Tied => None,
            Self::Wired(pin) => Some(pin),
        }
    }
}

impl<P> From<Option<P>> for ChipSelect<P> {
    fn from(pin: Option<P>) -> Self {
        pin.map_or(Self::Tied, Self::Wired)
    }
}

impl<P: OutputPin> ChipSelect<P> {
    /// Drive CS low. No-op when tied.
    pub(crate) fn assert(&mut self) -> Result<(), P::Error> {
        match self {
            Self::Tied => Ok(()),
            Self::Wired(pin) => pin.set_low(),
        }
    }

    /// Drive CS high. No-op when tied.
    pub(crate) fn deassert(&mut self) -> Result<(), P::Error> {
        match self {
            Self::Tied => Ok(()),
            Self::Wired(pin) => pin.set_high(),
        }
    }
}

/// Lines handed back by `Ad5220::close`.
///
/// Levels are exactly as the driver last set them. Keeping the bundle
/// alive keeps them driven; dropping it releases them on whatever terms
/// the HAL's pin types apply.
#[derive(Debug)]
pub struct Lines<P> {
    pub clock: P,
    pub direction: P,
    pub chip_select: ChipSelect<P>,
}
