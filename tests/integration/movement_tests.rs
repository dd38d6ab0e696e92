//! Stepping, absolute writes and resynchronisation.

use ad5220::sim::{Level, LineRole, SimLineError};
use ad5220::{Error, MAX_POSITION, MIN_POSITION, START_POSITION};

use crate::fixtures::{falling_edges, tied_pot, wired_pot};

#[test]
fn worked_example_sequence() {
    let (mut pot, bus) = tied_pot();

    for _ in 0..10 {
        pot.increment().unwrap();
    }
    assert_eq!(pot.read(), 74);

    // 74 steps reach the bottom stop; every later call is refused.
    let results: Vec<_> = (0..80).map(|_| pot.decrement()).collect();
    assert!(results[..74].iter().all(Result::is_ok));
    assert!(
        results[74..]
            .iter()
            .all(|r| *r == Err(Error::BoundExceeded { position: 0 }))
    );
    assert_eq!(pot.read(), 0);
    assert_eq!(bus.wiper(), 0);

    pot.write_resistance(5_000).unwrap();
    assert!(pot.read().abs_diff(64) <= 1);

    pot.reinitialize().unwrap();
    assert_eq!(pot.read(), START_POSITION);
    assert_eq!(bus.wiper(), START_POSITION);
}

#[test]
fn write_reaches_every_tap_in_range() {
    let (mut pot, bus) = wired_pot();
    for target in [0, 1, 63, 64, 65, 126, 127, 3] {
        pot.write(target).unwrap();
        assert_eq!(pot.read(), target);
        assert_eq!(bus.wiper(), target);
    }
}

#[test]
fn write_sends_exactly_the_distance() {
    let (mut pot, bus) = tied_pot();
    bus.clear_history();
    pot.write(START_POSITION - 20).unwrap();
    assert_eq!(falling_edges(&bus.history()), 20);
}

#[test]
fn write_resistance_above_full_scale_stops_at_top() {
    let (mut pot, bus) = tied_pot();
    let err = pot.write_resistance(50_000).unwrap_err();
    assert_eq!(
        err,
        Error::UnreachableTarget {
            target: u8::MAX,
            reached: MAX_POSITION
        }
    );
    assert_eq!(pot.read(), MAX_POSITION);
    assert_eq!(bus.wiper(), MAX_POSITION);
    assert_eq!(pot.read_resistance(), 10_000);
}

#[test]
fn reinitialize_is_idempotent_after_construction() {
    let (mut pot, bus) = wired_pot();
    pot.reinitialize().unwrap();
    assert_eq!(pot.read(), START_POSITION);
    pot.reinitialize().unwrap();
    assert_eq!(pot.read(), START_POSITION);
    assert_eq!(bus.wiper(), START_POSITION);
}

#[test]
fn reinitialize_overpulses_in_one_frame() {
    let (mut pot, bus) = wired_pot();
    bus.clear_history();
    pot.reinitialize().unwrap();

    let history = bus.history();
    // Full span down, then walk back up to midscale.
    assert_eq!(
        falling_edges(&history),
        usize::from(MAX_POSITION - MIN_POSITION) + usize::from(START_POSITION)
    );
    assert_eq!(history[0].role, LineRole::ChipSelect(0));
}

#[test]
fn failed_pulse_leaves_mirror_stale_until_reinitialize() {
    let (mut pot, bus) = tied_pot();
    // Direction writes succeed; the clock dies on the 11th write, i.e. the
    // falling edge of the 6th step.
    bus.fail_after(LineRole::Clock, 10);

    let err = pot.write(START_POSITION + 20).unwrap_err();
    assert_eq!(
        err,
        Error::Line(SimLineError {
            role: LineRole::Clock
        })
    );
    assert_eq!(pot.read(), START_POSITION + 5);
    assert_eq!(bus.wiper(), START_POSITION + 5);

    // Drift the chip to simulate a lost edge; reinitialize brings both back.
    bus.set_wiper(0, 3);
    pot.reinitialize().unwrap();
    assert_eq!(pot.read(), bus.wiper());
    assert_eq!(pot.read(), START_POSITION);
}

#[test]
fn reinitialize_recovers_after_clock_stuck_low_near_top() {
    let (mut pot, bus) = tied_pot();
    pot.write(MAX_POSITION - 1).unwrap();
    // The falling edge goes out, the return to idle fails.
    bus.fail_after(LineRole::Clock, 1);

    assert!(pot.increment().is_err());
    assert_eq!(pot.read(), MAX_POSITION - 1);
    assert_eq!(bus.wiper(), MAX_POSITION);

    pot.reinitialize().unwrap();
    assert_eq!(bus.wiper(), START_POSITION);
    assert_eq!(pot.read(), START_POSITION);
}

#[test]
fn reinitialize_recovers_after_clock_stuck_low_near_bottom() {
    let (mut pot, bus) = wired_pot();
    pot.write(MIN_POSITION + 1).unwrap();
    bus.fail_after(LineRole::Clock, 1);

    assert!(pot.decrement().is_err());
    assert_eq!(pot.read(), MIN_POSITION + 1);
    assert_eq!(bus.wiper(), MIN_POSITION);
    assert_eq!(bus.level(LineRole::ChipSelect(0)), Level::High);

    pot.reinitialize().unwrap();
    assert_eq!(bus.wiper(), START_POSITION);
    assert_eq!(pot.read(), START_POSITION);
}

#[test]
fn reinitialize_recovers_when_its_own_span_loses_idle() {
    let (mut pot, bus) = tied_pot();
    pot.write(MAX_POSITION).unwrap();
    // First reinitialize dies partway down with CLK left low.
    bus.fail_after(LineRole::Clock, 40);
    assert!(pot.reinitialize().is_err());
    assert_eq!(bus.level(LineRole::Clock), Level::Low);

    pot.reinitialize().unwrap();
    assert_eq!(bus.wiper(), START_POSITION);
    assert_eq!(pot.read(), START_POSITION);
}
