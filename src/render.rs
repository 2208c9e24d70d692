use rand_core::RngCore;

use crate::beat::{BeatDetector, BeatOutcome, BeatState};
use crate::config::{AppConfig, AudioMode, StripTopology};
use crate::ingest::AudioIngest;
use crate::leds::LedFrame;
use crate::spectrum::SpectralAnalyzer;
use crate::ui::Screen;
use crate::Instant;

/// What a render tick did with the pending chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPass {
    Spectrum,
    Beat(BeatOutcome),
}

/// Routes each ready chunk to the analyzer selected by the audio mode.
///
/// Keeps its own copy of the mode and topology. The controller refreshes that
/// copy with [`apply`](Self::apply) between ticks, so a render pass never sees
/// a configuration that the menu is halfway through changing.
pub struct RenderDispatcher {
    mode: AudioMode,
    topology: StripTopology,
    spectral: SpectralAnalyzer,
    beat: BeatDetector,
    frame: LedFrame,
}

impl RenderDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mode: config.mode,
            topology: config.topology.clone(),
            spectral: SpectralAnalyzer::new(),
            beat: BeatDetector::new(),
            frame: LedFrame::new(),
        }
    }

    pub fn apply(&mut self, config: &AppConfig) {
        if self.mode != config.mode {
            log::info!("Audio mode {} -> {}", self.mode.as_str(), config.mode.as_str());
            // leftovers of the other effect would otherwise linger on the strips
            self.frame.clear();
        }
        self.mode = config.mode;
        self.topology = config.topology.clone();
    }

    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn topology(&self) -> &StripTopology {
        &self.topology
    }

    pub fn frame(&self) -> &LedFrame {
        &self.frame
    }

    pub fn beat_state(&self) -> &BeatState {
        self.beat.state()
    }

    /// Render the pending chunk if the visualizer is showing.
    ///
    /// On any other screen the chunk is left in the ingest slot, where a newer
    /// delivery may replace it.
    pub fn tick<R: RngCore>(
        &mut self,
        ingest: &AudioIngest,
        screen: Screen,
        now: Instant,
        rng: &mut R,
    ) -> Option<RenderPass> {
        if screen != Screen::Visualizer {
            return None;
        }
        let chunk = ingest.try_consume()?;

        let pass = match self.mode {
            AudioMode::Spectral => {
                self.spectral.render(&chunk, &self.topology, &mut self.frame);
                RenderPass::Spectrum
            }
            AudioMode::Beat => RenderPass::Beat(self.beat.render(
                &chunk,
                now,
                &self.topology,
                &mut self.frame,
                rng,
            )),
        };
        Some(pass)
    }
}
