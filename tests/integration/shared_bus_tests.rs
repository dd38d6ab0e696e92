//! Several chips on one clock/direction pair, framed by their own CS.

use core::cell::RefCell;

use ad5220::sim::{Level, LineRole, SimBus, SimPin};
use ad5220::{Ad5220, SharedLine, ShutdownMode, START_POSITION};

use crate::fixtures::FULL_SCALE;

struct Bus {
    sim: SimBus,
    clock: RefCell<SimPin>,
    direction: RefCell<SimPin>,
    selects: Vec<RefCell<SimPin>>,
}

impl Bus {
    fn new(chips: usize) -> Self {
        let sim = SimBus::shared(chips);
        Self {
            clock: RefCell::new(sim.clock_pin()),
            direction: RefCell::new(sim.direction_pin()),
            selects: (0..chips)
                .map(|i| RefCell::new(sim.chip_select_pin(i)))
                .collect(),
            sim,
        }
    }

    fn pot(&self, index: usize) -> Ad5220<SharedLine<'_, SimPin>> {
        Ad5220::with_chip_select(
            SharedLine::new(&self.clock),
            SharedLine::new(&self.direction),
            SharedLine::new(&self.selects[index]),
            FULL_SCALE,
        )
        .unwrap()
    }
}

#[test]
fn chips_move_independently() {
    let bus = Bus::new(3);
    let mut a = bus.pot(0);
    let mut b = bus.pot(1);
    let mut c = bus.pot(2);

    a.write(10).unwrap();
    b.write(127).unwrap();
    c.decrement().unwrap();

    assert_eq!(bus.sim.wiper_of(0), 10);
    assert_eq!(bus.sim.wiper_of(1), 127);
    assert_eq!(bus.sim.wiper_of(2), START_POSITION - 1);
    assert_eq!(a.read(), bus.sim.wiper_of(0));
    assert_eq!(b.read(), bus.sim.wiper_of(1));
    assert_eq!(c.read(), bus.sim.wiper_of(2));
}

#[test]
fn reinitialize_only_resets_the_selected_chip() {
    let bus = Bus::new(2);
    let mut a = bus.pot(0);
    let mut b = bus.pot(1);
    b.write(100).unwrap();
    bus.sim.set_wiper(0, 5);

    a.reinitialize().unwrap();
    assert_eq!(bus.sim.wiper_of(0), START_POSITION);
    assert_eq!(bus.sim.wiper_of(1), 100);
    assert_eq!(b.read(), 100);
}

#[test]
fn retained_close_keeps_neighbour_undisturbed() {
    let bus = Bus::new(2);
    let mut a = bus.pot(0);
    let mut b = bus.pot(1);
    a.write(30).unwrap();
    b.write(90).unwrap();
    bus.sim.clear_history();

    let lines = a.close_with(ShutdownMode::KeepDriving).unwrap();
    assert!(bus.sim.history().is_empty());
    assert_eq!(bus.sim.level(LineRole::ChipSelect(0)), Level::High);

    b.increment().unwrap();
    assert_eq!(bus.sim.wiper_of(0), 30);
    assert_eq!(bus.sim.wiper_of(1), 91);
    drop(lines);
}

#[test]
fn every_chip_selected_during_construction_stays_put() {
    // Undriven CS lines read as selected, so construction must not clock.
    let bus = Bus::new(2);
    let _a = bus.pot(0);
    let _b = bus.pot(1);
    assert_eq!(bus.sim.edges_of(0), 0);
    assert_eq!(bus.sim.edges_of(1), 0);
}
