// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred recognizer callbacks on a single logical queue.
//!
//! Each recognizer owns at most one pending entry. Entries fire in deadline order;
//! equal deadlines fire in the order they were scheduled.

use alloc::vec::Vec;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    due: u64,
    seq: u64,
    slot: usize,
}

/// Deadline queue keyed by recognizer slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct TimerQueue {
    entries: Vec<Entry>,
    seq: u64,
}

impl TimerQueue {
    /// Arm (or re-arm) the timer of `slot`.
    pub(crate) fn schedule(&mut self, slot: usize, due: u64) {
        self.cancel(slot);
        self.seq += 1;
        self.entries.push(Entry {
            due,
            seq: self.seq,
            slot,
        });
    }

    /// Disarm the timer of `slot`. Returns whether one was pending.
    pub(crate) fn cancel(&mut self, slot: usize) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.slot != slot);
        before != self.entries.len()
    }

    pub(crate) fn is_pending(&self, slot: usize) -> bool {
        self.entries.iter().any(|e| e.slot == slot)
    }

    /// Earliest deadline.
    pub(crate) fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Remove and return the earliest entry due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: u64) -> Option<(usize, u64)> {
        let (pos, entry) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, e)| (i, *e))?;
        self.entries.swap_remove(pos);
        Some((entry.slot, entry.due))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::default();
        q.schedule(3, 100);
        q.schedule(1, 50);
        q.schedule(2, 100);
        assert_eq!(q.next_deadline(), Some(50));
        assert_eq!(q.pop_due(99), Some((1, 50)));
        assert_eq!(q.pop_due(99), None, "nothing else is due yet");
        assert_eq!(q.pop_due(100), Some((3, 100)));
        assert_eq!(q.pop_due(100), Some((2, 100)));
    }

    #[test]
    fn rescheduling_replaces_the_pending_entry() {
        let mut q = TimerQueue::default();
        q.schedule(7, 10);
        q.schedule(7, 30);
        assert_eq!(q.pop_due(20), None, "the earlier deadline was replaced");
        assert!(q.is_pending(7));
        assert!(q.cancel(7));
        assert!(!q.cancel(7));
        assert_eq!(q.next_deadline(), None);
    }
}
