use fugit::{Duration as FugitDuration, Instant as FugitInstant};

/// Monotonic clock reading, one tick per millisecond.
pub type Instant = FugitInstant<u64, 1, 1000>;
pub type Duration = FugitDuration<u64, 1, 1000>;

pub fn dur_from_millis(millis: u64) -> Duration {
    Duration::millis(millis)
}

pub fn instant_from_millis(millis: u64) -> Instant {
    Instant::from_ticks(millis)
}

/// Milliseconds from `earlier` to `later`, 0 if the clock went backwards.
pub fn millis_between(earlier: Instant, later: Instant) -> u64 {
    later
        .checked_duration_since(earlier)
        .map_or(0, |d| d.ticks())
}
