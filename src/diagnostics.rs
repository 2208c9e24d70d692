use core::sync::atomic::{AtomicU32, Ordering};

/// Event counter that can be bumped from any context.
#[derive(Debug, Default)]
pub struct Counter(AtomicU32);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for inputs the control loop degraded instead of rejecting.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Touches whose pressure fell outside the valid window.
    pub ignored_touches: Counter,
    /// Taps that hit no region of the current screen.
    pub unmapped_taps: Counter,
    pub beats: Counter,
    pub output_errors: Counter,
    pub store_errors: Counter,
    pub display_errors: Counter,
}

/// Point-in-time copy of every counter, including the ones kept by the audio ingest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    /// Deliveries longer than the ingest capacity.
    pub truncated_chunks: u32,
    /// Chunks replaced before the render loop consumed them.
    pub overwritten_chunks: u32,
    pub ignored_touches: u32,
    pub unmapped_taps: u32,
    pub beats: u32,
    pub output_errors: u32,
    pub store_errors: u32,
    pub display_errors: u32,
}

impl Diagnostics {
    pub fn snapshot(&self, truncated_chunks: u32, overwritten_chunks: u32) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            truncated_chunks,
            overwritten_chunks,
            ignored_touches: self.ignored_touches.get(),
            unmapped_taps: self.unmapped_taps.get(),
            beats: self.beats.get(),
            output_errors: self.output_errors.get(),
            store_errors: self.store_errors.get(),
            display_errors: self.display_errors.get(),
        }
    }
}
