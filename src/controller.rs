use rand_core::RngCore;

use crate::beat::{BeatOutcome, BeatState};
use crate::config::AppConfig;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::display::Display;
use crate::ingest::AudioIngest;
use crate::leds::{LedFrame, LedOutput};
use crate::persistence::KeyValueStore;
use crate::render::{RenderDispatcher, RenderPass};
use crate::touch::{TouchCalibration, TouchEvent, TouchPanel, TouchTracker};
use crate::ui::{Menu, Screen, Transition};
use crate::Instant;

/// The hardware collaborators the controller drives.
pub struct Board<T, D, O, S, R> {
    pub touch: T,
    pub display: D,
    pub leds: O,
    pub store: S,
    pub rng: R,
}

/// Owns all controller state and runs one iteration of the control loop per [`tick`](Self::tick).
///
/// Touch handling and rendering share this single context. Only the audio
/// producer runs elsewhere, and it reaches the controller through [`AudioIngest`].
pub struct Controller<'a, T, D, O, S, R> {
    ingest: &'a AudioIngest,
    board: Board<T, D, O, S, R>,
    calibration: TouchCalibration,
    tracker: TouchTracker,
    menu: Menu,
    config: AppConfig,
    dispatcher: RenderDispatcher,
    diagnostics: Diagnostics,
}

impl<'a, T, D, O, S, R> Controller<'a, T, D, O, S, R>
where
    T: TouchPanel,
    D: Display,
    O: LedOutput,
    S: KeyValueStore,
    R: RngCore,
{
    /// Load the stored configuration and show the splash screen.
    ///
    /// An unreadable store is not fatal, the factory defaults are used instead.
    pub fn boot(ingest: &'a AudioIngest, mut board: Board<T, D, O, S, R>, now: Instant) -> Self {
        let diagnostics = Diagnostics::default();
        let config = match AppConfig::load(&mut board.store) {
            Ok(config) => {
                log::info!(
                    "Loaded {} strip(s), mode {}",
                    config.topology.strip_count(),
                    config.mode.as_str()
                );
                config
            }
            Err(e) => {
                log::warn!("{e:?}, using defaults");
                diagnostics.store_errors.increment();
                AppConfig::default()
            }
        };

        let mut controller = Self {
            ingest,
            board,
            calibration: TouchCalibration::default(),
            tracker: TouchTracker::new(),
            menu: Menu::new(now),
            dispatcher: RenderDispatcher::new(&config),
            config,
            diagnostics,
        };
        controller.redraw();
        controller
    }

    pub fn with_calibration(mut self, calibration: TouchCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// One pass of the control loop: splash timeout, touch, then rendering.
    ///
    /// Returns what the render step did, `None` if it had nothing to render.
    pub fn tick(&mut self, now: Instant) -> Option<RenderPass> {
        if let Some(transition) = self.menu.poll(now) {
            self.on_transition(transition);
        }

        self.poll_touch(now);

        let pass = self
            .dispatcher
            .tick(self.ingest, self.menu.screen(), now, &mut self.board.rng)?;
        if pass == RenderPass::Beat(BeatOutcome::Beat) {
            self.diagnostics.beats.increment();
        }
        self.transmit();
        Some(pass)
    }

    fn poll_touch(&mut self, now: Instant) {
        // only an empty sample ends a press; a pressure dip while held is skipped
        let point = match self.board.touch.sample() {
            Some(raw) => match self.calibration.classify(&raw) {
                Some(point) => Some(point),
                None => {
                    self.diagnostics.ignored_touches.increment();
                    return;
                }
            },
            None => None,
        };

        let Some(event) = self.tracker.update(point, now) else {
            return;
        };

        match self.menu.handle(event, &mut self.config, now) {
            Some(transition) => self.on_transition(transition),
            None => {
                if let TouchEvent::Tap(point) = event {
                    log::debug!("Tap at ({}, {}) ignored on {:?}", point.x, point.y, self.menu.screen());
                    self.diagnostics.unmapped_taps.increment();
                }
            }
        }
    }

    fn on_transition(&mut self, transition: Transition) {
        if transition.from != transition.to {
            log::info!("{:?} -> {:?}", transition.from, transition.to);
        }
        if transition.persist {
            self.persist();
        }
        self.dispatcher.apply(&self.config);
        self.redraw();
    }

    fn persist(&mut self) {
        match self.config.save(&mut self.board.store) {
            Ok(()) => log::info!(
                "Saved {} strip(s), mode {}",
                self.config.topology.strip_count(),
                self.config.mode.as_str()
            ),
            Err(e) => {
                log::warn!("{e:?}");
                self.diagnostics.store_errors.increment();
            }
        }
    }

    fn redraw(&mut self) {
        let view = self.menu.view(&self.config);
        if let Err(e) = self.board.display.show(&view) {
            log::warn!("Failed to draw {view:?}: {e:?}");
            self.diagnostics.display_errors.increment();
        }
    }

    fn transmit(&mut self) {
        let topology = self.dispatcher.topology();
        let frame = self.dispatcher.frame();
        for (strip, config) in topology.active().iter().enumerate() {
            let pixels = frame.strip(strip, config.led_count as usize);
            if let Err(e) = self.board.leds.show(strip, pixels) {
                log::warn!("Failed to show strip {strip} (pin {}): {e:?}", config.output_pin);
                self.diagnostics.output_errors.increment();
            }
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.menu.screen()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn frame(&self) -> &LedFrame {
        self.dispatcher.frame()
    }

    pub fn beat_state(&self) -> &BeatState {
        self.dispatcher.beat_state()
    }

    pub fn board(&self) -> &Board<T, D, O, S, R> {
        &self.board
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics
            .snapshot(self.ingest.truncated_count(), self.ingest.overwritten_count())
    }
}
