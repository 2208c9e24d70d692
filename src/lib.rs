#![cfg_attr(not(test), no_std)]

//! Core of an audio-reactive LED strip controller.
//!
//! Audio arrives asynchronously through [`AudioIngest`], a touch driven [`Menu`]
//! configures the strip topology and the audio mode, and the [`Controller`] ties
//! both together in a single cooperative loop that renders into a [`LedFrame`].
//!
//! All hardware (touch panel, display, LED transmission, key/value storage) is
//! reached through the traits in this crate, the board binary provides the
//! implementations.

extern crate alloc;

pub mod util;

pub mod beat;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod display;
pub mod ingest;
pub mod leds;
pub mod persistence;
pub mod render;
pub mod spectrum;
pub mod touch;
pub mod ui;

/// Millisecond timestamp, as delivered by the board's monotonic clock.
pub type Instant = fugit::Instant<u64, 1, 1_000>;
/// Millisecond duration.
pub type Duration = fugit::Duration<u64, 1, 1_000>;

pub use beat::{BeatDetector, BeatOutcome, BeatState};
pub use config::{AppConfig, AudioMode, StripConfig, StripTopology};
pub use controller::{Board, Controller};
pub use diagnostics::DiagnosticsSnapshot;
pub use display::{Display, GraphicsDisplay};
pub use ingest::{AudioChunk, AudioIngest};
pub use leds::{LedFrame, LedOutput, SmartLedsOutput};
pub use persistence::{KeyValueStore, MemoryStore};
pub use render::{RenderDispatcher, RenderPass};
pub use spectrum::SpectralAnalyzer;
pub use touch::{RawTouch, ScreenPoint, TouchCalibration, TouchEvent, TouchPanel, TouchTracker};
pub use ui::{Menu, Screen, ScreenView, Transition};
