//! AD5220 up/down potentiometer driver.
//!
//! The chip has no readback. [`Ad5220`] keeps a mirror of the wiper that
//! equals up-pulses minus down-pulses sent since the last hardware reset,
//! and it only changes the mirror after the pulse for that step went out.
//! An end-stop refusal therefore sends nothing, and a pin failure aborts
//! the step without advancing the mirror. After a pin failure the mirror
//! may be stale; [`Ad5220::reinitialize`] is the recovery.
//!
//! ## Pulse protocol
//!
//! ```text
//! CS   ‾‾‾\________________/‾‾‾   (wired only)
//! U/D  ____/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾    (high = up)
//! CLK  ‾‾‾‾‾‾‾‾‾\___/‾‾‾‾‾‾‾‾‾    (one falling edge = one tap)
//! ```
//!
//! Pin hold times are the HAL's concern; the driver only sequences levels.
//!
//! ## Shutdown
//!
//! There is no `Drop` side effect. Call [`close`](Ad5220::close) to either
//! restore the power-on tap or hand the lines back untouched so another
//! owner can keep driving them (shared-bus wiring).

use core::num::NonZeroU32;

use embedded_hal::digital::OutputPin;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::{self, Label, PotConfig};
use crate::device::{self, MAX_POSITION, MIN_POSITION, START_POSITION};
use crate::error::{Error, Result};
use crate::lines::{ChipSelect, Lines};

/// What [`Ad5220::close`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShutdownMode {
    /// Walk the wiper back to `START_POSITION`, then return the lines.
    /// For an instance that is the chip's only owner.
    #[default]
    Restore,
    /// Leave wiper and line levels alone and return the lines so the
    /// caller keeps driving them.
    KeepDriving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

pub struct Ad5220<P> {
    clock: P,
    direction: P,
    chip_select: ChipSelect<P>,
    position: u8,
    /// False once a pulse left CLK anywhere but idle-high.
    clock_idle: bool,
    full_scale: NonZeroU32,
    shutdown: ShutdownMode,
    label: Label,
}

impl<P: OutputPin> Ad5220<P> {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Driver for a chip whose CS is tied to ground.
    pub fn new(clock: P, direction: P, full_scale_ohms: u32) -> Result<Self, P::Error> {
        Self::build(
            clock,
            direction,
            ChipSelect::Tied,
            full_scale_ohms,
            ShutdownMode::default(),
            config::label("ad5220"),
        )
    }

    /// Driver for a chip with a CS line. CS is deasserted before CLK and
    /// U/D are touched so the chip ignores their power-on levels.
    pub fn with_chip_select(
        clock: P,
        direction: P,
        chip_select: P,
        full_scale_ohms: u32,
    ) -> Result<Self, P::Error> {
        Self::build(
            clock,
            direction,
            ChipSelect::Wired(chip_select),
            full_scale_ohms,
            ShutdownMode::default(),
            config::label("ad5220"),
        )
    }

    pub fn from_config(
        clock: P,
        direction: P,
        chip_select: ChipSelect<P>,
        config: &PotConfig,
    ) -> Result<Self, P::Error> {
        Self::build(
            clock,
            direction,
            chip_select,
            config.full_scale_ohms,
            config.shutdown,
            config.label.clone(),
        )
    }

    /// Lines go to idle and the mirror to the power-on tap. The chip is
    /// never queried; it is assumed to be at `START_POSITION`.
    fn build(
        clock: P,
        direction: P,
        mut chip_select: ChipSelect<P>,
        full_scale_ohms: u32,
        shutdown: ShutdownMode,
        label: Label,
    ) -> Result<Self, P::Error> {
        let full_scale = NonZeroU32::new(full_scale_ohms).ok_or(Error::InvalidFullScale)?;

        chip_select.deassert()?;

        let mut driver = Self {
            clock,
            direction,
            chip_select,
            position: START_POSITION,
            clock_idle: false,
            full_scale,
            shutdown,
            label,
        };
        driver.clock.set_high()?;
        driver.clock_idle = true;
        driver.direction.set_low()?;

        info!(
            "{}: ready (cs={}, {} ohm full scale, wiper={})",
            driver.label,
            if driver.chip_select.is_wired() { "wired" } else { "tied" },
            full_scale_ohms,
            driver.position
        );
        Ok(driver)
    }

    // -----------------------------------------------------------------------
    // Pulse protocol
    // -----------------------------------------------------------------------

    fn activate(&mut self) -> core::result::Result<(), P::Error> {
        self.chip_select.assert()
    }

    fn deactivate(&mut self) -> core::result::Result<(), P::Error> {
        self.chip_select.deassert()
    }

    /// Drive CLK back to idle-high. No edge is counted on the way up.
    fn idle_clock(&mut self) -> core::result::Result<(), P::Error> {
        self.clock.set_high()?;
        self.clock_idle = true;
        Ok(())
    }

    /// One falling edge, then back to idle. If an earlier pulse failed
    /// with CLK low, CLK is raised first so the falling edge is real.
    fn pulse(&mut self) -> core::result::Result<(), P::Error> {
        if !self.clock_idle {
            self.idle_clock()?;
        }
        self.clock_idle = false;
        self.clock.set_low()?;
        self.idle_clock()
    }

    /// Run `body` between CS assert and deassert. On failure CS is still
    /// deasserted (best effort) and the body's error is returned.
    fn framed<F>(&mut self, body: F) -> core::result::Result<(), P::Error>
    where
        F: FnOnce(&mut Self) -> core::result::Result<(), P::Error>,
    {
        self.activate()?;
        if let Err(e) = body(self) {
            let _ = self.deactivate();
            return Err(e);
        }
        self.deactivate()
    }

    /// A framed single-tap move. Does not touch the mirror.
    fn step(&mut self, step: Step) -> core::result::Result<(), P::Error> {
        self.framed(|pot| {
            match step {
                Step::Up => pot.direction.set_high()?,
                Step::Down => pot.direction.set_low()?,
            }
            pot.pulse()
        })?;
        trace!("{}: pulse {:?}", self.label, step);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Move one tap towards A. Refused at `MAX_POSITION` with nothing sent.
    pub fn increment(&mut self) -> Result<(), P::Error> {
        if self.position >= MAX_POSITION {
            debug!("{}: increment refused at {}", self.label, self.position);
            return Err(Error::BoundExceeded {
                position: self.position,
            });
        }
        self.step(Step::Up)?;
        self.position += 1;
        Ok(())
    }

    /// Move one tap towards B. Refused at `MIN_POSITION` with nothing sent.
    pub fn decrement(&mut self) -> Result<(), P::Error> {
        if self.position <= MIN_POSITION {
            debug!("{}: decrement refused at {}", self.label, self.position);
            return Err(Error::BoundExceeded {
                position: self.position,
            });
        }
        self.step(Step::Down)?;
        self.position -= 1;
        Ok(())
    }

    /// Step until the wiper sits at `target`.
    ///
    /// Bounds are not pre-checked: an out-of-range target moves the wiper
    /// to the nearest end stop and returns [`Error::UnreachableTarget`].
    /// Steps already taken stay taken.
    pub fn write(&mut self, target: u8) -> Result<(), P::Error> {
        while self.position != target {
            let moved = if target < self.position {
                self.decrement()
            } else {
                self.increment()
            };
            match moved {
                Ok(()) => {}
                Err(Error::BoundExceeded { position }) => {
                    warn!("{}: target {} unreachable, stopped at {}", self.label, target, position);
                    return Err(Error::UnreachableTarget {
                        target,
                        reached: position,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        debug!("{}: wiper at {}", self.label, self.position);
        Ok(())
    }

    /// Move to the tap nearest `ohms` (round half up), see [`write`](Self::write).
    pub fn write_resistance(&mut self, ohms: u32) -> Result<(), P::Error> {
        let steps = device::steps_for_ohms(ohms, self.full_scale);
        self.write(u8::try_from(steps).unwrap_or(u8::MAX))
    }

    /// Resynchronise the mirror with the chip from any prior state.
    ///
    /// Sends a full span of down pulses in one CS frame. The chip clamps at
    /// its bottom stop, so it ends at `MIN_POSITION` wherever it started.
    /// The mirror is then forced to match and the wiper walked back up to
    /// `START_POSITION`.
    ///
    /// CLK is forced idle before the first pulse. A failed return to idle
    /// leaves it low, and the span would then be one edge short.
    pub fn reinitialize(&mut self) -> Result<(), P::Error> {
        info!("{}: reinitializing (mirror was {})", self.label, self.position);
        self.framed(|pot| {
            pot.direction.set_low()?;
            pot.idle_clock()?;
            for _ in MIN_POSITION..MAX_POSITION {
                pot.pulse()?;
            }
            Ok(())
        })?;
        self.position = MIN_POSITION;
        self.write(START_POSITION)
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Mirrored wiper tap.
    pub fn read(&self) -> u8 {
        self.position
    }

    /// Mirrored wiper resistance (B to W), rounded to the nearest ohm.
    pub fn read_resistance(&self) -> u32 {
        device::ohms_for_steps(self.position, self.full_scale)
    }

    pub fn min_position(&self) -> u8 {
        MIN_POSITION
    }

    pub fn max_position(&self) -> u8 {
        MAX_POSITION
    }

    pub fn is_at_min(&self) -> bool {
        self.position == MIN_POSITION
    }

    pub fn is_at_max(&self) -> bool {
        self.position == MAX_POSITION
    }

    pub fn full_scale_ohms(&self) -> u32 {
        self.full_scale.get()
    }

    /// Replace the nominal full scale with a measured one. Only affects
    /// ohm conversion, never pulses.
    pub fn set_full_scale_ohms(&mut self, ohms: u32) -> Result<(), P::Error> {
        self.full_scale = NonZeroU32::new(ohms).ok_or(Error::InvalidFullScale)?;
        Ok(())
    }

    pub fn has_chip_select(&self) -> bool {
        self.chip_select.is_wired()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Restore `START_POSITION` on close (the default).
    pub fn mark_for_release(&mut self) {
        self.shutdown = ShutdownMode::Restore;
    }

    /// Leave everything as is on close and keep the lines driven.
    pub fn mark_for_retain(&mut self) {
        self.shutdown = ShutdownMode::KeepDriving;
    }

    pub fn shutdown_mode(&self) -> ShutdownMode {
        self.shutdown
    }

    /// Shut down according to the mode set by `mark_for_release` /
    /// `mark_for_retain`.
    pub fn close(self) -> Result<Lines<P>, P::Error> {
        let mode = self.shutdown;
        self.close_with(mode)
    }

    /// Shut down with an explicit mode, ignoring the stored flag.
    ///
    /// On a failed restore the lines are dropped with the driver and the
    /// chip is left wherever the error stopped it.
    pub fn close_with(mut self, mode: ShutdownMode) -> Result<Lines<P>, P::Error> {
        match mode {
            ShutdownMode::Restore => {
                self.write(START_POSITION)?;
                info!("{}: closed, wiper restored to {}", self.label, START_POSITION);
            }
            ShutdownMode::KeepDriving => {
                info!("{}: closed, lines handed off at wiper {}", self.label, self.position);
            }
        }
        Ok(Lines {
            clock: self.clock,
            direction: self.direction,
            chip_select: self.chip_select,
        })
    }
}

impl<P> core::fmt::Debug for Ad5220<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ad5220")
            .field("label", &self.label)
            .field("position", &self.position)
            .field("full_scale", &self.full_scale)
            .field("chip_select", &self.chip_select.is_wired())
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}
