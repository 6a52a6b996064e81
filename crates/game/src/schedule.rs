//! Time-keyed queue of deferred effects.
//!
//! Replaces fire-and-forget timers: anything that should happen "later"
//! (hiding a notice, removing a collected star) is pushed with an expiry
//! time and drained by the frame driver once per frame.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: f64,
    /// Insertion order, so items due at the same time drain FIFO.
    seq: u64,
    item: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of items keyed by the time they become due.
#[derive(Debug, Clone)]
pub struct ScheduledQueue<T> {
    heap: BinaryHeap<Reverse<Scheduled<T>>>,
    next_seq: u64,
}

impl<T> Default for ScheduledQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScheduledQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `item` for time `due`.
    pub fn push(&mut self, due: f64, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, item }));
    }

    /// Remove and return every item due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|Reverse(next)| next.due <= now) {
            if let Some(Reverse(next)) = self.heap.pop() {
                due.push(next.item);
            }
        }
        due
    }

    /// Time of the earliest pending item.
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(next)| next.due)
    }

    /// Drop pending items that fail `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.heap.retain(|Reverse(scheduled)| keep(&scheduled.item));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drains_in_time_order() {
        let mut queue = ScheduledQueue::new();
        queue.push(3.0, "c");
        queue.push(1.0, "a");
        queue.push(2.0, "b");

        assert_eq!(queue.next_due(), Some(1.0));
        assert_eq!(queue.drain_due(2.5), vec!["a", "b"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_due(10.0), vec!["c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_nothing_due_yet() {
        let mut queue = ScheduledQueue::new();
        queue.push(5.0, 1);
        assert!(queue.drain_due(4.99).is_empty());
        assert_eq!(queue.drain_due(5.0), vec![1]);
    }

    #[test]
    fn test_same_time_is_fifo() {
        let mut queue = ScheduledQueue::new();
        for i in 0..5 {
            queue.push(1.0, i);
        }
        assert_eq!(queue.drain_due(1.0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_retain() {
        let mut queue = ScheduledQueue::new();
        queue.push(1.0, 1);
        queue.push(2.0, 2);
        queue.push(3.0, 3);
        queue.retain(|&n| n != 2);
        assert_eq!(queue.drain_due(10.0), vec![1, 3]);
    }
}
