//! Day counters for the "Day N of C" framing.
//!
//! The clock variant is a pure function of wall-clock time, so stateless
//! request handlers agree on the day. The sequence variant is an explicit
//! counter owned by whichever loop drives scheduled runs.

const DAY_MS: i64 = 86_400_000;

/// `floor(unix_ms / 86_400_000) % cycle + 1`, always in `1..=cycle`.
pub fn clock_day(unix_ms: i64, cycle: u32) -> u32 {
    let cycle = i64::from(cycle.max(1));
    // cycle fits in u32, so the result does too
    (unix_ms.div_euclid(DAY_MS).rem_euclid(cycle) + 1) as u32
}

/// Today's clock day.
pub fn clock_day_now(cycle: u32) -> u32 {
    clock_day(chrono::Utc::now().timestamp_millis(), cycle)
}

/// Counter for scheduled runs. Not shared: the scheduler loop owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCounter {
    completed: u32,
    total: u32,
}

impl SequenceCounter {
    pub fn new(total: u32) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Day number for the next run, or `None` once `total` runs have happened.
    pub fn advance(&mut self) -> Option<u32> {
        if self.completed >= self.total {
            return None;
        }
        self.completed += 1;
        Some(self.completed)
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}
