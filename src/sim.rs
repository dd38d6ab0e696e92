//! In-memory AD5220 bus model.
//!
//! Stands in for real GPIO on the host: every [`SimPin`] write is recorded
//! and fed into a model of one or more chips sharing CLK and U/D. Each chip
//! counts falling CLK edges while its CS is low (or tied), moves one tap
//! in the direction held on U/D, and clamps silently at both end stops.
//! The clamping is what `reinitialize()` depends on, so the model must
//! never wrap or fault when over-pulsed.
//!
//! Power-on state: all lines low, every wiper at `START_POSITION`. A wired
//! CS that has not been driven yet therefore reads as selected.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::device::{MAX_POSITION, MIN_POSITION, START_POSITION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Clock,
    Direction,
    /// CS of the chip at this index on the bus.
    ChipSelect(usize),
}

/// One recorded level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent {
    pub role: LineRole,
    pub level: Level,
}

impl LineEvent {
    pub const fn new(role: LineRole, level: Level) -> Self {
        Self { role, level }
    }
}

/// Injected pin failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimLineError {
    pub role: LineRole,
}

impl digital::Error for SimLineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

// ── Chip model ────────────────────────────────────────────────

#[derive(Debug)]
struct Chip {
    wiper: u8,
    /// `None` when CS is tied to ground.
    select: Option<Level>,
    edges: usize,
}

impl Chip {
    fn new(wired: bool) -> Self {
        Self {
            wiper: START_POSITION,
            select: wired.then_some(Level::Low),
            edges: 0,
        }
    }

    fn is_selected(&self) -> bool {
        self.select != Some(Level::High)
    }
}

#[derive(Debug)]
struct BusState {
    clock: Level,
    direction: Level,
    chips: Vec<Chip>,
    history: Vec<LineEvent>,
    /// Armed failures: (line, successful writes left before it fails).
    faults: Vec<(LineRole, usize)>,
}

impl BusState {
    fn drive(&mut self, role: LineRole, level: Level) -> Result<(), SimLineError> {
        if let Some(i) = self.faults.iter().position(|(r, _)| *r == role) {
            if self.faults[i].1 == 0 {
                self.faults.swap_remove(i);
                return Err(SimLineError { role });
            }
            self.faults[i].1 -= 1;
        }

        self.history.push(LineEvent::new(role, level));
        match role {
            LineRole::Clock => {
                let falling = self.clock == Level::High && level == Level::Low;
                self.clock = level;
                if falling {
                    self.clock_edge();
                }
            }
            LineRole::Direction => self.direction = level,
            LineRole::ChipSelect(index) => {
                if let Some(chip) = self.chips.get_mut(index) {
                    chip.select = Some(level);
                }
            }
        }
        Ok(())
    }

    fn clock_edge(&mut self) {
        let up = self.direction == Level::High;
        for chip in self.chips.iter_mut().filter(|c| c.is_selected()) {
            chip.wiper = if up {
                chip.wiper.saturating_add(1).min(MAX_POSITION)
            } else {
                chip.wiper.saturating_sub(1).max(MIN_POSITION)
            };
            chip.edges += 1;
        }
    }
}

// ── Bus handle ────────────────────────────────────────────────

/// Handle to a simulated bus. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    /// One chip with CS tied to ground.
    pub fn single() -> Self {
        Self::with_chips(vec![Chip::new(false)])
    }

    /// One chip with CS wired to a line.
    pub fn single_with_chip_select() -> Self {
        Self::with_chips(vec![Chip::new(true)])
    }

    /// `chips` parts sharing CLK and U/D, each with its own CS line.
    pub fn shared(chips: usize) -> Self {
        Self::with_chips((0..chips).map(|_| Chip::new(true)).collect())
    }

    fn with_chips(chips: Vec<Chip>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                clock: Level::Low,
                direction: Level::Low,
                chips,
                history: Vec::new(),
                faults: Vec::new(),
            })),
        }
    }

    pub fn clock_pin(&self) -> SimPin {
        self.pin(LineRole::Clock)
    }

    pub fn direction_pin(&self) -> SimPin {
        self.pin(LineRole::Direction)
    }

    pub fn chip_select_pin(&self, index: usize) -> SimPin {
        self.pin(LineRole::ChipSelect(index))
    }

    fn pin(&self, role: LineRole) -> SimPin {
        SimPin {
            role,
            state: Rc::clone(&self.state),
        }
    }

    /// Physical wiper of the first chip.
    pub fn wiper(&self) -> u8 {
        self.wiper_of(0)
    }

    pub fn wiper_of(&self, index: usize) -> u8 {
        self.state.borrow().chips[index].wiper
    }

    /// Move a wiper behind the driver's back (brown-out, external reset).
    pub fn set_wiper(&self, index: usize, wiper: u8) {
        self.state.borrow_mut().chips[index].wiper = wiper.clamp(MIN_POSITION, MAX_POSITION);
    }

    /// Falling edges the first chip has counted, clamped ones included.
    pub fn edges(&self) -> usize {
        self.edges_of(0)
    }

    pub fn edges_of(&self, index: usize) -> usize {
        self.state.borrow().chips[index].edges
    }

    /// Current level of a line. A tied CS reads low.
    pub fn level(&self, role: LineRole) -> Level {
        let state = self.state.borrow();
        match role {
            LineRole::Clock => state.clock,
            LineRole::Direction => state.direction,
            LineRole::ChipSelect(index) => state.chips[index].select.unwrap_or(Level::Low),
        }
    }

    pub fn history(&self) -> Vec<LineEvent> {
        self.state.borrow().history.clone()
    }

    pub fn clear_history(&self) {
        self.state.borrow_mut().history.clear();
    }

    /// Let `writes` more writes to `role` succeed, then fail the next one.
    pub fn fail_after(&self, role: LineRole, writes: usize) {
        self.state.borrow_mut().faults.push((role, writes));
    }
}

// ── Pin ───────────────────────────────────────────────────────

/// Output line attached to a [`SimBus`].
#[derive(Debug)]
pub struct SimPin {
    role: LineRole,
    state: Rc<RefCell<BusState>>,
}

impl SimPin {
    pub fn role(&self) -> LineRole {
        self.role
    }
}

impl ErrorType for SimPin {
    type Error = SimLineError;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().drive(self.role, Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().drive(self.role, Level::High)
    }
}
