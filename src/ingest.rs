use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use crate::diagnostics::Counter;

/// Bytes kept from a single delivery.
pub const INGEST_CAPACITY: usize = 1024;

/// Raw sample bytes from one delivery, at most [`INGEST_CAPACITY`] long.
pub type AudioChunk = heapless::Vec<u8, INGEST_CAPACITY>;

/// Single-slot handoff between the audio transport and the render loop.
///
/// The producer may call [`deliver`](Self::deliver) from another core or an
/// interrupt-driven callback. The chunk is copied before the slot is locked and
/// swapped in whole, so the consumer never sees a partially written chunk.
/// There is no queue: a newer delivery replaces one that was not consumed yet.
pub struct AudioIngest {
    slot: Signal<CriticalSectionRawMutex, AudioChunk>,
    truncated: Counter,
    overwritten: Counter,
}

impl Default for AudioIngest {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioIngest {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
            truncated: Counter::new(),
            overwritten: Counter::new(),
        }
    }

    /// Publish a new chunk, keeping only the first [`INGEST_CAPACITY`] bytes.
    pub fn deliver(&self, data: &[u8]) {
        let stored = data.len().min(INGEST_CAPACITY);
        if stored < data.len() {
            self.truncated.increment();
        }

        let mut chunk = AudioChunk::new();
        // bounded by capacity above
        let _ = chunk.extend_from_slice(&data[..stored]);

        if self.slot.signaled() {
            self.overwritten.increment();
        }
        self.slot.signal(chunk);
    }

    /// Take the pending chunk, if any. Never blocks.
    pub fn try_consume(&self) -> Option<AudioChunk> {
        self.slot.try_take()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.signaled()
    }

    pub fn truncated_count(&self) -> u32 {
        self.truncated.get()
    }

    pub fn overwritten_count(&self) -> u32 {
        self.overwritten.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn stores_exact_length_up_to_capacity() {
        let ingest = AudioIngest::new();
        for len in [0usize, 1, 512, INGEST_CAPACITY] {
            let data: std::vec::Vec<u8> = (0..len).map(|i| i as u8).collect();
            ingest.deliver(&data);
            assert!(ingest.is_ready());

            let chunk = ingest.try_consume().unwrap();
            assert_eq!(chunk.len(), len);
            assert_eq!(chunk.as_slice(), data.as_slice());
            assert!(!ingest.is_ready());
        }
        assert_eq!(ingest.truncated_count(), 0);
    }

    #[test]
    fn truncates_oversized_delivery() {
        let ingest = AudioIngest::new();
        let data = std::vec![7u8; INGEST_CAPACITY + 300];
        ingest.deliver(&data);

        let chunk = ingest.try_consume().unwrap();
        assert_eq!(chunk.len(), INGEST_CAPACITY);
        assert!(chunk.iter().all(|&b| b == 7));
        assert_eq!(ingest.truncated_count(), 1);
    }

    #[test]
    fn consume_without_delivery_returns_none() {
        let ingest = AudioIngest::new();
        assert!(ingest.try_consume().is_none());
    }

    #[test]
    fn last_delivery_wins() {
        let ingest = AudioIngest::new();
        ingest.deliver(&[1, 2, 3]);
        ingest.deliver(&[4, 5]);

        assert_eq!(ingest.try_consume().unwrap().as_slice(), &[4, 5]);
        assert!(ingest.try_consume().is_none());
        assert_eq!(ingest.overwritten_count(), 1);
    }

    #[test]
    fn concurrent_producer_never_tears_chunks() {
        let ingest = Arc::new(AudioIngest::new());
        let producer = {
            let ingest = ingest.clone();
            thread::spawn(move || {
                for round in 0..2000u32 {
                    let fill = (round % 251) as u8;
                    ingest.deliver(&[fill; INGEST_CAPACITY]);
                }
            })
        };

        let mut seen = 0;
        while !producer.is_finished() || ingest.is_ready() {
            if let Some(chunk) = ingest.try_consume() {
                let first = chunk[0];
                assert!(chunk.iter().all(|&b| b == first));
                seen += 1;
            }
        }
        producer.join().unwrap();
        assert!(seen > 0);
    }
}
