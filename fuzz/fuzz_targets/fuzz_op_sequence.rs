//! Fuzz target: arbitrary driver operation sequences.
//!
//! Decodes each input byte pair into one operation against a simulated
//! chip (optionally with an injected pin failure) and asserts the driver
//! never panics, never leaves the wiper range, and that after a
//! `reinitialize()` the mirror and the chip always agree.
//!
//! cargo fuzz run fuzz_op_sequence

#![no_main]

use ad5220::sim::{LineRole, SimBus};
use ad5220::{Ad5220, MAX_POSITION, MIN_POSITION, START_POSITION};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let bus = SimBus::single_with_chip_select();
    let Ok(mut pot) = Ad5220::with_chip_select(
        bus.clock_pin(),
        bus.direction_pin(),
        bus.chip_select_pin(0),
        10_000,
    ) else {
        return;
    };

    for pair in data.chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        match op % 7 {
            0 => { let _ = pot.increment(); }
            1 => { let _ = pot.decrement(); }
            2 => { let _ = pot.write(arg); }
            3 => { let _ = pot.write_resistance(u32::from(arg) * 100); }
            4 => { let _ = pot.reinitialize(); }
            5 => bus.fail_after(LineRole::Clock, usize::from(arg)),
            _ => bus.set_wiper(0, arg),
        }
        assert!((MIN_POSITION..=MAX_POSITION).contains(&pot.read()));
    }

    // Drain any still-armed fault, then resynchronise.
    while pot.reinitialize().is_err() {}
    assert_eq!(pot.read(), START_POSITION);
    assert_eq!(bus.wiper(), START_POSITION);
});
