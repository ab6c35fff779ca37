use std::time::Duration;

/// Host-supplied timestamp in whole milliseconds.
///
/// The engine never reads a wall clock. Every time-dependent operation takes a
/// `TimeMs` so runs can be recorded and replayed exactly.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub const ZERO: TimeMs = TimeMs(0);

    pub fn from_millis(ms: u64) -> Self {
        TimeMs(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// The instant `d` after `self`, saturating at `u64::MAX` milliseconds.
    pub fn after(self, d: Duration) -> Self {
        let add = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        TimeMs(self.0.saturating_add(add))
    }

    /// Elapsed time since `earlier`; zero if `earlier` is in the future.
    pub fn since(self, earlier: TimeMs) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}
