//! Bounded lock-free ring of fixed-size word records.
//!
//! - Exactly one producer and one consumer; both halves are move-only, so the SPSC contract is
//!   enforced by ownership rather than by convention.
//! - `head` and `tail` are free-running wrapping `u32` record counters. `tail - head` is the
//!   number of committed records; slot index is `counter & mask`.
//! - The producer publishes a record by storing `tail` with `Release` after writing the slot
//!   words; the consumer frees it by storing `head` with `Release` after reading them.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Words per record.
pub const RECORD_WORDS: usize = 4;

pub type Record = [u32; RECORD_WORDS];

/// Largest supported capacity, in records.
pub const MAX_RECORDS: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("ring is full")]
    Full,
    #[error("consumer has been dropped")]
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopError {
    /// No committed record is available right now.
    #[error("ring is empty")]
    Empty,
    /// The ring is empty and the producer is gone; nothing will ever arrive.
    #[error("producer has been dropped")]
    Disconnected,
}

#[derive(Debug)]
struct Shared {
    mask: u32,
    head: AtomicU32,
    tail: AtomicU32,
    producer_alive: AtomicBool,
    consumer_alive: AtomicBool,
    slots: Box<[AtomicU32]>,
}

impl Shared {
    fn capacity(&self) -> u32 {
        self.mask + 1
    }

    fn slot_base(&self, counter: u32) -> usize {
        (counter & self.mask) as usize * RECORD_WORDS
    }
}

/// Create a ring holding at least `capacity_records` records (rounded up to a power of two).
///
/// # Panics
///
/// Panics if `capacity_records` is zero or larger than [`MAX_RECORDS`].
pub fn record_ring(capacity_records: usize) -> (RecordProducer, RecordConsumer) {
    assert!(capacity_records > 0);
    assert!(capacity_records <= MAX_RECORDS);
    let cap = capacity_records.next_power_of_two();
    let slots = (0..cap * RECORD_WORDS)
        .map(|_| AtomicU32::new(0))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    let shared = Arc::new(Shared {
        mask: (cap - 1) as u32,
        head: AtomicU32::new(0),
        tail: AtomicU32::new(0),
        producer_alive: AtomicBool::new(true),
        consumer_alive: AtomicBool::new(true),
        slots,
    });
    (
        RecordProducer {
            shared: Arc::clone(&shared),
        },
        RecordConsumer { shared },
    )
}

#[derive(Debug)]
pub struct RecordProducer {
    shared: Arc<Shared>,
}

impl RecordProducer {
    pub fn capacity(&self) -> usize {
        self.shared.capacity() as usize
    }

    pub fn try_push(&mut self, record: &Record) -> Result<(), PushError> {
        let s = &*self.shared;
        if !s.consumer_alive.load(Ordering::Acquire) {
            return Err(PushError::Disconnected);
        }
        let tail = s.tail.load(Ordering::Relaxed);
        let head = s.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= s.capacity() {
            return Err(PushError::Full);
        }

        let base = s.slot_base(tail);
        for (slot, &word) in s.slots[base..base + RECORD_WORDS].iter().zip(record) {
            slot.store(word, Ordering::Relaxed);
        }
        s.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Push, spinning while the ring is full.
    pub fn push_spinning(&mut self, record: &Record) -> Result<(), PushError> {
        loop {
            match self.try_push(record) {
                Err(PushError::Full) => std::hint::spin_loop(),
                other => return other,
            }
        }
    }
}

impl Drop for RecordProducer {
    fn drop(&mut self) {
        self.shared.producer_alive.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct RecordConsumer {
    shared: Arc<Shared>,
}

impl RecordConsumer {
    pub fn capacity(&self) -> usize {
        self.shared.capacity() as usize
    }

    /// Number of committed records waiting to be popped.
    pub fn len(&self) -> usize {
        let s = &*self.shared;
        s.tail
            .load(Ordering::Acquire)
            .wrapping_sub(s.head.load(Ordering::Relaxed)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn try_pop(&mut self) -> Result<Record, PopError> {
        let s = &*self.shared;
        // Sample liveness before `tail` so a record committed just before the producer dropped is
        // still observed.
        let producer_alive = s.producer_alive.load(Ordering::Acquire);
        let head = s.head.load(Ordering::Relaxed);
        let tail = s.tail.load(Ordering::Acquire);
        if head == tail {
            return Err(if producer_alive {
                PopError::Empty
            } else {
                PopError::Disconnected
            });
        }

        let base = s.slot_base(head);
        let mut record = [0u32; RECORD_WORDS];
        for (word, slot) in record.iter_mut().zip(&s.slots[base..base + RECORD_WORDS]) {
            *word = slot.load(Ordering::Relaxed);
        }
        s.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(record)
    }
}

impl Drop for RecordConsumer {
    fn drop(&mut self) {
        self.shared.consumer_alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let (tx, rx) = record_ring(5);
        assert_eq!(tx.capacity(), 8);
        assert_eq!(rx.capacity(), 8);
    }

    #[test]
    fn full_ring_rejects_push_until_popped() {
        let (mut tx, mut rx) = record_ring(2);
        tx.try_push(&[1, 0, 0, 0]).unwrap();
        tx.try_push(&[2, 0, 0, 0]).unwrap();
        assert_eq!(tx.try_push(&[3, 0, 0, 0]), Err(PushError::Full));

        assert_eq!(rx.try_pop(), Ok([1, 0, 0, 0]));
        tx.try_push(&[3, 0, 0, 0]).unwrap();
        assert_eq!(rx.len(), 2);
    }
}
