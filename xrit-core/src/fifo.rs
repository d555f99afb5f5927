//! Soft-symbol queue between the demodulator producer and the decoder.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Bounded thread-safe byte queue.
///
/// The decoder pulls a whole coded frame per iteration; `pop_into` holds the
/// lock across the entire bulk dequeue so producer pushes can never tear a
/// frame.
#[derive(Debug)]
pub struct SymbolFifo {
    inner: Mutex<VecDeque<u8>>,
    capacity: usize,
}

impl SymbolFifo {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Instantaneous fill level as a percentage of capacity.
    pub fn usage(&self) -> u8 {
        (100 * self.len() / self.capacity).min(100) as u8
    }

    /// Enqueue symbols from the demodulator. Symbols beyond capacity are
    /// dropped; returns how many were accepted.
    pub fn push_slice(&self, symbols: &[u8]) -> usize {
        let mut queue = self.inner.lock().unwrap();
        let room = self.capacity.saturating_sub(queue.len());
        let take = symbols.len().min(room);
        queue.extend(&symbols[..take]);
        take
    }

    /// Dequeue exactly `out.len()` symbols under a single lock acquisition.
    /// Returns false (and removes nothing) if fewer are available.
    pub fn pop_into(&self, out: &mut [u8]) -> bool {
        let mut queue = self.inner.lock().unwrap();
        if queue.len() < out.len() {
            return false;
        }
        for slot in out.iter_mut() {
            *slot = queue.pop_front().unwrap();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_dequeue_is_all_or_nothing() {
        let fifo = SymbolFifo::new(64);
        fifo.push_slice(&[1, 2, 3]);

        let mut out = [0u8; 4];
        assert!(!fifo.pop_into(&mut out));
        assert_eq!(fifo.len(), 3);

        fifo.push_slice(&[4]);
        assert!(fifo.pop_into(&mut out));
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(fifo.is_empty());
    }

    #[test]
    fn overflow_drops_excess() {
        let fifo = SymbolFifo::new(4);
        assert_eq!(fifo.push_slice(&[0; 10]), 4);
        assert_eq!(fifo.len(), 4);
        assert_eq!(fifo.usage(), 100);
    }

    #[test]
    fn usage_is_a_percentage() {
        let fifo = SymbolFifo::new(200);
        fifo.push_slice(&[0; 50]);
        assert_eq!(fifo.usage(), 25);
    }
}
