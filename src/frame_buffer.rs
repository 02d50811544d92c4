use image::RgbImage;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::FRAME_BUFFER_CAPACITY;

/// A captured camera image tagged with its capture order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub seq: u64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(seq: u64, image: RgbImage) -> Self {
        Self { seq, image }
    }
}

/// Bounded single-producer/single-consumer queue that drops the oldest
/// entry when full, so the consumer always sees the freshest frames.
pub struct FrameBuffer<T = Frame> {
    slots: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> FrameBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(FRAME_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    // Entries are disposable frames, so a panic on the other side must not
    // take the queue down with it.
    fn slots(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue an item, returning the evicted oldest item if the buffer was full.
    pub fn push(&self, item: T) -> Option<T> {
        let mut slots = self.slots();
        let evicted = if slots.len() >= self.capacity {
            slots.pop_front()
        } else {
            None
        };
        slots.push_back(item);
        evicted
    }

    /// Take the oldest retained item (non-blocking)
    pub fn pop(&self) -> Option<T> {
        self.slots().pop_front()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for FrameBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drop_oldest_keeps_newest() {
        let buffer = FrameBuffer::new();
        assert_eq!(buffer.push('A'), None);
        assert_eq!(buffer.push('B'), None);
        assert_eq!(buffer.push('C'), Some('A'));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.pop(), Some('B'));
        assert_eq!(buffer.pop(), Some('C'));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_pop_on_empty_returns_none() {
        let buffer: FrameBuffer<u32> = FrameBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let buffer = FrameBuffer::new();
        for i in 0..100u32 {
            buffer.push(i);
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.pop(), Some(98));
        assert_eq!(buffer.pop(), Some(99));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let buffer = FrameBuffer::with_capacity(0);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.pop(), Some(2));
    }

    #[test]
    fn test_concurrent_producer_consumer_preserves_order() {
        let buffer = Arc::new(FrameBuffer::new());
        let producer_buffer = Arc::clone(&buffer);

        let producer = thread::spawn(move || {
            for i in 0..10_000u64 {
                producer_buffer.push(i);
            }
        });

        let mut seen = Vec::new();
        while !producer.is_finished() || !buffer.is_empty() {
            if let Some(v) = buffer.pop() {
                seen.push(v);
            }
        }
        producer.join().unwrap();

        // Frames may be dropped but never reordered, and the last push survives
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last().copied(), Some(9_999));
    }
}
