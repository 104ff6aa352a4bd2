use crate::clock::Millis;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Deadline {
    at: Millis,
    seq: u64,
}

/// Keyed set of cancellable one-shot timers. One slot per key: arming a key
/// that is already pending replaces its deadline.
pub(crate) struct TimerTable<K: Ord + Copy> {
    slots: BTreeMap<K, Deadline>,
    seq: u64,
}

impl<K: Ord + Copy> TimerTable<K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            seq: 0,
        }
    }

    pub(crate) fn arm(&mut self, key: K, at: Millis) {
        self.seq += 1;
        self.slots.insert(key, Deadline { at, seq: self.seq });
    }

    /// Safe on keys that already fired or were never armed.
    pub(crate) fn cancel(&mut self, key: K) {
        self.slots.remove(&key);
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self, key: K) -> bool {
        self.slots.contains_key(&key)
    }

    #[cfg(test)]
    pub(crate) fn deadline(&self, key: K) -> Option<Millis> {
        self.slots.get(&key).map(|d| d.at)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    /// Ties go to whichever was armed first.
    pub(crate) fn pop_due(&mut self, now: Millis) -> Option<(K, Millis)> {
        let (key, at) = self
            .slots
            .iter()
            .filter(|(_, d)| d.at <= now)
            .min_by_key(|(_, d)| (d.at, d.seq))
            .map(|(k, d)| (*k, d.at))?;
        self.slots.remove(&key);
        Some((key, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    enum K {
        A,
        B,
        C,
    }

    #[test]
    fn rearm_replaces_pending_deadline() {
        let mut t = TimerTable::new();
        t.arm(K::A, 100);
        t.arm(K::A, 500);
        assert_eq!(t.len(), 1);
        assert_eq!(t.pop_due(499), None);
        assert_eq!(t.pop_due(500), Some((K::A, 500)));
        assert_eq!(t.pop_due(10_000), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut t = TimerTable::new();
        t.cancel(K::B);
        t.arm(K::B, 10);
        t.cancel(K::B);
        t.cancel(K::B);
        assert!(!t.is_armed(K::B));
        assert_eq!(t.pop_due(100), None);
    }

    #[test]
    fn due_timers_pop_in_deadline_then_arming_order() {
        let mut t = TimerTable::new();
        t.arm(K::C, 50);
        t.arm(K::A, 50);
        t.arm(K::B, 20);
        assert_eq!(t.pop_due(60), Some((K::B, 20)));
        assert_eq!(t.pop_due(60), Some((K::C, 50)));
        assert_eq!(t.pop_due(60), Some((K::A, 50)));
        assert_eq!(t.pop_due(60), None);
    }

    #[test]
    fn clear_drops_everything() {
        let mut t = TimerTable::new();
        t.arm(K::A, 1);
        t.arm(K::B, 2);
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.deadline(K::A), None);
    }
}
