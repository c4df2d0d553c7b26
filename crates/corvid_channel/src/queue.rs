//! The internal message queue a [`crate::Channel`] buffers into: either
//! plain FIFO, or a priority heap that orders higher priority first and
//! falls back to arrival order (FIFO) between equal priorities.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// A queue discipline shared by every channel pattern.
pub enum Queue<T> {
    Fifo(VecDeque<T>),
    Priority(BinaryHeap<PriorityItem<T>>, u64),
}

impl<T> Queue<T> {
    pub fn fifo() -> Self {
        Queue::Fifo(VecDeque::new())
    }

    pub fn priority() -> Self {
        Queue::Priority(BinaryHeap::new(), 0)
    }

    /// Push a plain FIFO item. Priority queues treat this as priority 0.
    pub fn push(&mut self, item: T) {
        self.push_with_priority(item, 0);
    }

    pub fn push_with_priority(&mut self, item: T, priority: i64) {
        match self {
            Queue::Fifo(dq) => dq.push_back(item),
            Queue::Priority(heap, seq) => {
                let sequence = *seq;
                *seq += 1;
                heap.push(PriorityItem { item, priority, sequence });
            }
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        match self {
            Queue::Fifo(dq) => dq.pop_front(),
            Queue::Priority(heap, _) => heap.pop().map(|entry| entry.item),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Queue::Fifo(dq) => dq.len(),
            Queue::Priority(heap, _) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry in a priority queue: ordered by `priority` descending, then
/// by `sequence` ascending (earlier arrivals win a tie), so
/// [`BinaryHeap`]'s max-heap pop order matches "higher priority first,
/// FIFO among equals".
pub struct PriorityItem<T> {
    item: T,
    priority: i64,
    sequence: u64,
}

impl<T> PartialEq for PriorityItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl<T> Eq for PriorityItem<T> {}

impl<T> PartialOrd for PriorityItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for PriorityItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_pops_first() {
        let mut q = Queue::priority();
        q.push_with_priority("low", 1);
        q.push_with_priority("high", 10);
        q.push_with_priority("mid", 5);
        assert_eq!(q.pop(), Some("high"));
        assert_eq!(q.pop(), Some("mid"));
        assert_eq!(q.pop(), Some("low"));
    }

    #[test]
    fn equal_priority_is_fifo() {
        let mut q = Queue::priority();
        q.push_with_priority("a", 1);
        q.push_with_priority("b", 1);
        q.push_with_priority("c", 1);
        assert_eq!(q.pop(), Some("a"));
        assert_eq!(q.pop(), Some("b"));
        assert_eq!(q.pop(), Some("c"));
    }

    #[test]
    fn fifo_queue_preserves_arrival_order() {
        let mut q: Queue<i32> = Queue::fifo();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
    }
}
