use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Fixed-interval cycle driving random world events.
///
/// The original client fired its event loop every 45 seconds; callers
/// poll with a monotonic clock and get `true` at most once per interval.
#[derive(Debug)]
pub struct EventCycle {
    interval: Duration,
    last_fired: Instant,
}

impl EventCycle {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(45);

    /// Cycle armed at `now`; the first fire comes one interval later.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
        }
    }

    pub fn with_default_interval(now: Instant) -> Self {
        Self::new(Self::DEFAULT_INTERVAL, now)
    }

    /// Whether a full interval has elapsed. Resets the timer when it has.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_fired) >= self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Daily genesis shift schedule.
///
/// Fires once whenever the UTC day index advances past the day of the
/// last shift, i.e. at the first poll after UTC midnight. Manual shifts
/// go through [`ShiftClock::mark_shifted`] so a hand-triggered shift
/// suppresses the scheduled one for the rest of the day.
#[derive(Debug)]
pub struct ShiftClock {
    last_shift_day: u64,
}

impl ShiftClock {
    /// Clock that considers the current day already shifted.
    pub fn new(now: SystemTime) -> Self {
        Self {
            last_shift_day: utc_day(now),
        }
    }

    /// Whether a scheduled shift is due. Records the shift when it is.
    pub fn poll(&mut self, now: SystemTime) -> bool {
        let day = utc_day(now);
        if day > self.last_shift_day {
            self.last_shift_day = day;
            true
        } else {
            false
        }
    }

    /// Record an out-of-band (manual) shift at `now`.
    pub fn mark_shifted(&mut self, now: SystemTime) {
        self.last_shift_day = utc_day(now);
    }
}

/// Days since the Unix epoch, UTC. Pre-epoch clocks clamp to day 0.
fn utc_day(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / 86_400)
        .unwrap_or(0)
}
