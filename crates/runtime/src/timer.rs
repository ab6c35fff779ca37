//! Deterministic, cancellable timer queue.
//!
//! Key properties:
//! - Total ordering on `(due, id)`: timers due at the same instant fire in
//!   scheduling order.
//! - Cancellation removes the timer; remaining timers keep their order.
//! - No wall clock. The host advances time by calling [`TimerQueue::pop_due`]
//!   with its own `now`.
//!
//! Payloads are plain values describing what should happen; the owner
//! dispatches them. This keeps the queue independent of any UI toolkit.

use std::time::Duration;

use foundation::time::TimeMs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Key {
    due: TimeMs,
    id: TimerId,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedules `payload` to fire at `due`.
    pub fn schedule(&mut self, due: TimeMs, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key { due, id },
            payload,
        });
        id
    }

    /// Schedules `payload` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: TimeMs, delay: Duration, payload: T) -> TimerId {
        self.schedule(now.after(delay), payload)
    }

    /// Cancels a pending timer.
    ///
    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e.key.id == id) else {
            return false;
        };
        self.entries.remove(idx);
        true
    }

    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<TimeMs> {
        self.entries.iter().map(|e| e.key).min().map(|k| k.due)
    }

    /// Pops the earliest timer whose deadline is `<= now`.
    ///
    /// Returns the timer id, its scheduled deadline (not `now`) and payload.
    pub fn pop_due(&mut self, now: TimeMs) -> Option<(TimerId, TimeMs, T)> {
        let mut best_idx: Option<usize> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.key.due > now {
                continue;
            }
            match best_idx {
                None => best_idx = Some(idx),
                Some(best) => {
                    if entry.key < self.entries[best].key {
                        best_idx = Some(idx);
                    }
                }
            }
        }

        let idx = best_idx?;
        let entry = self.entries.swap_remove(idx);
        Some((entry.key.id, entry.key.due, entry.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use foundation::time::TimeMs;
    use std::time::Duration;

    #[test]
    fn fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(TimeMs(300), "late");
        q.schedule(TimeMs(100), "early");

        let (_, due, v) = q.pop_due(TimeMs(1_000)).unwrap();
        assert_eq!((due, v), (TimeMs(100), "early"));
        let (_, due, v) = q.pop_due(TimeMs(1_000)).unwrap();
        assert_eq!((due, v), (TimeMs(300), "late"));
        assert!(q.pop_due(TimeMs(1_000)).is_none());
    }

    #[test]
    fn same_deadline_is_scheduling_order() {
        let mut q = TimerQueue::new();
        q.schedule(TimeMs(5), "a");
        q.schedule(TimeMs(5), "b");
        q.schedule(TimeMs(5), "c");

        let got: Vec<_> = std::iter::from_fn(|| q.pop_due(TimeMs(5)).map(|(_, _, v)| v)).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule_after(TimeMs(1_000), Duration::from_millis(400), ());
        assert!(q.pop_due(TimeMs(1_399)).is_none());
        assert_eq!(q.next_due(), Some(TimeMs(1_400)));
        assert!(q.pop_due(TimeMs(1_400)).is_some());
    }

    #[test]
    fn cancel_removes_pending_timer() {
        let mut q = TimerQueue::new();
        let a = q.schedule(TimeMs(1), "a");
        q.schedule(TimeMs(2), "b");
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.len(), 1);

        let (_, _, v) = q.pop_due(TimeMs(10)).unwrap();
        assert_eq!(v, "b");
        assert!(q.is_empty());
    }
}
