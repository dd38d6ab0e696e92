//! Shared clock/direction lines for multi-chip buses.
//!
//! The AD5220 allows CLK and U/D to be bussed across several chips, each
//! with its own CS. Only the selected chip counts edges, so chip-select
//! framing is what serialises them; this proxy just lets several drivers
//! hold the same physical pin.
//!
//! ```ignore
//! let clock = RefCell::new(clk_pin);
//! let direction = RefCell::new(ud_pin);
//! let cs_a = RefCell::new(cs_a_pin);
//! let cs_b = RefCell::new(cs_b_pin);
//!
//! let mut a = Ad5220::with_chip_select(
//!     SharedLine::new(&clock), SharedLine::new(&direction), SharedLine::new(&cs_a), 10_000)?;
//! let mut b = Ad5220::with_chip_select(
//!     SharedLine::new(&clock), SharedLine::new(&direction), SharedLine::new(&cs_b), 10_000)?;
//! ```
//!
//! Single-threaded only. Borrowing is scoped to one level change, so two
//! drivers never hold the pin at once unless one re-enters the other.

use core::cell::RefCell;

use embedded_hal::digital::{ErrorType, OutputPin};

/// `OutputPin` proxy over a pin in a `RefCell`.
#[derive(Debug)]
pub struct SharedLine<'a, P> {
    pin: &'a RefCell<P>,
}

impl<'a, P> SharedLine<'a, P> {
    pub fn new(pin: &'a RefCell<P>) -> Self {
        Self { pin }
    }
}

impl<P> Clone for SharedLine<'_, P> {
    fn clone(&self) -> Self {
        Self { pin: self.pin }
    }
}

impl<P: OutputPin> ErrorType for SharedLine<'_, P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for SharedLine<'_, P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.borrow_mut().set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.borrow_mut().set_high()
    }
}
