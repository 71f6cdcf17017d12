//! Fixed-period gate over an external millisecond clock.

use crate::config::POLL_INTERVAL_MS;

/// Says when the next poll tick is due.
///
/// Late ticks are caught up one period at a time, like a free-running
/// counter; if the caller falls more than a full period behind, the
/// schedule restarts from `now` instead of bursting.
pub struct PollTimer {
    period_ms: u32,
    next_ms: Option<u32>,
}

impl PollTimer {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            next_ms: None,
        }
    }

    /// `true` once per elapsed period. The first call is always due.
    pub fn due(&mut self, now: u32) -> bool {
        let Some(next) = self.next_ms else {
            self.next_ms = Some(now.wrapping_add(self.period_ms));
            return true;
        };
        // Signed distance keeps this correct across clock wrap.
        let late = now.wrapping_sub(next) as i32;
        if late < 0 {
            return false;
        }
        self.next_ms = Some(if late as u32 >= self.period_ms {
            now.wrapping_add(self.period_ms)
        } else {
            next.wrapping_add(self.period_ms)
        });
        true
    }
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(POLL_INTERVAL_MS)
    }
}
