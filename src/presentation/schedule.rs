use crate::events::SourceId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

/// A deferred "turn this slot off" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledHide {
    pub fire_at: Instant,
    /// Insertion order, breaks ties between hides due at the same instant.
    seq: u64,
    pub source: SourceId,
    pub slot: usize,
    pub generation: u64,
}

/// Pending hides ordered by fire time.
#[derive(Debug, Default)]
pub struct HideSchedule {
    queue: BinaryHeap<Reverse<ScheduledHide>>,
    next_seq: u64,
}

impl HideSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at: Instant, source: SourceId, slot: usize, generation: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledHide {
            fire_at,
            seq,
            source,
            slot,
            generation,
        }));
    }

    /// Removes and returns the earliest hide due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledHide> {
        match self.queue.peek() {
            Some(Reverse(hide)) if hide.fire_at <= now => self.queue.pop().map(|Reverse(h)| h),
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse(hide)| hide.fire_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
