//! Mouse-key acceleration curve.
//!
//! Holding a pointer key speeds the cursor up in steps. Counts are poll
//! ticks (10 ms each):
//!
//! | hold ticks | hold time     | step |
//! |------------|---------------|------|
//! | 0..20      | 0..200 ms     | 4    |
//! | 20..50     | 200..500 ms   | 8    |
//! | 50..100    | 500..1000 ms  | 12   |
//! | 100..      | 1000 ms..     | 18   |

/// `(first tick, step)` pairs, ascending.
const STEPS: [(u32, u8); 4] = [(0, 4), (20, 8), (50, 12), (100, 18)];

/// Per-report movement magnitude for a key held `hold_ticks` ticks.
pub const fn velocity(hold_ticks: u32) -> u8 {
    let mut i = STEPS.len() - 1;
    while i > 0 && hold_ticks < STEPS[i].0 {
        i -= 1;
    }
    STEPS[i].1
}
