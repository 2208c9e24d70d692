use crate::config::{AppConfig, AudioMode};
use crate::touch::{ScreenPoint, TouchEvent};
use crate::{Duration, Instant};

/// How long the splash screen stays up after boot.
pub const SPLASH_DWELL: Duration = Duration::from_ticks(2_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Splash,
    MainMenu,
    AudioModeSelect,
    StripCountConfig,
    PerStripCountConfig,
    Visualizer,
}

/// Horizontal band of the screen, `top` inclusive, `bottom` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub top: i32,
    pub bottom: i32,
}

impl Region {
    pub const fn rows(top: i32, bottom: i32) -> Self {
        Self { top, bottom }
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.y >= self.top && point.y < self.bottom
    }
}

pub const MENU_AUDIO_MODE: Region = Region::rows(50, 80);
pub const MENU_CONFIGURE_LEDS: Region = Region::rows(100, 130);
pub const MENU_VISUALIZER: Region = Region::rows(150, 180);
pub const MODE_SPECTRAL: Region = Region::rows(100, 130);
pub const MODE_BEAT: Region = Region::rows(140, 170);

/// Result of an event the menu acted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
    /// The configuration must be written to storage now.
    pub persist: bool,
}

/// What the display should show for the current screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenView {
    Splash,
    MainMenu,
    AudioModeSelect { mode: AudioMode },
    StripCountConfig { strip_count: usize },
    /// `strip_number` is 1-based.
    PerStripCountConfig { strip_number: usize, led_count: u16 },
    Visualizer,
}

/// Touch driven configuration menu.
///
/// Mutates the [`AppConfig`] it is handed; the caller persists it when a
/// [`Transition`] asks for it and applies it to the renderer afterwards.
#[derive(Clone, Debug)]
pub struct Menu {
    screen: Screen,
    /// Strip being edited on [`Screen::PerStripCountConfig`].
    strip_index: usize,
    entered_at: Instant,
}

impl Menu {
    pub fn new(now: Instant) -> Self {
        Self {
            screen: Screen::Splash,
            strip_index: 0,
            entered_at: now,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn strip_index(&self) -> usize {
        self.strip_index
    }

    fn go(&mut self, to: Screen, persist: bool, now: Instant) -> Transition {
        let from = self.screen;
        self.screen = to;
        self.entered_at = now;
        Transition { from, to, persist }
    }

    /// Time based transitions. Call once per tick.
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        if self.screen != Screen::Splash {
            return None;
        }
        let elapsed = now.checked_duration_since(self.entered_at)?;
        (elapsed > SPLASH_DWELL).then(|| self.go(Screen::MainMenu, false, now))
    }

    /// Apply a touch event. `None` means the event does nothing on this screen.
    pub fn handle(
        &mut self,
        event: TouchEvent,
        config: &mut AppConfig,
        now: Instant,
    ) -> Option<Transition> {
        match (self.screen, event) {
            (Screen::MainMenu, TouchEvent::Tap(point)) => {
                let to = if MENU_AUDIO_MODE.contains(point) {
                    Screen::AudioModeSelect
                } else if MENU_CONFIGURE_LEDS.contains(point) {
                    self.strip_index = 0;
                    Screen::StripCountConfig
                } else if MENU_VISUALIZER.contains(point) {
                    Screen::Visualizer
                } else {
                    return None;
                };
                Some(self.go(to, false, now))
            }

            (Screen::AudioModeSelect, TouchEvent::Tap(point)) => {
                // a tap between the options keeps the mode but still leaves the screen
                if MODE_SPECTRAL.contains(point) {
                    config.mode = AudioMode::Spectral;
                } else if MODE_BEAT.contains(point) {
                    config.mode = AudioMode::Beat;
                }
                Some(self.go(Screen::MainMenu, true, now))
            }

            (Screen::StripCountConfig, TouchEvent::Tap(_)) => {
                config.topology.increment_strip_count();
                self.strip_index = 0;
                Some(self.go(Screen::PerStripCountConfig, false, now))
            }

            (Screen::PerStripCountConfig, TouchEvent::Tap(_)) => {
                config.topology.step_led_count(self.strip_index);
                self.strip_index += 1;
                if self.strip_index >= config.topology.strip_count() {
                    Some(self.go(Screen::MainMenu, true, now))
                } else {
                    Some(self.go(Screen::PerStripCountConfig, false, now))
                }
            }

            (Screen::Visualizer, TouchEvent::LongPress) => Some(self.go(Screen::MainMenu, false, now)),

            // splash ignores touch, the visualizer ignores taps, long presses only leave the visualizer
            (Screen::Splash, _)
            | (Screen::Visualizer, TouchEvent::Tap(_))
            | (
                Screen::MainMenu
                | Screen::AudioModeSelect
                | Screen::StripCountConfig
                | Screen::PerStripCountConfig,
                TouchEvent::LongPress,
            ) => None,
        }
    }

    pub fn view(&self, config: &AppConfig) -> ScreenView {
        match self.screen {
            Screen::Splash => ScreenView::Splash,
            Screen::MainMenu => ScreenView::MainMenu,
            Screen::AudioModeSelect => ScreenView::AudioModeSelect { mode: config.mode },
            Screen::StripCountConfig => ScreenView::StripCountConfig {
                strip_count: config.topology.strip_count(),
            },
            Screen::PerStripCountConfig => ScreenView::PerStripCountConfig {
                strip_number: self.strip_index + 1,
                led_count: config.topology.led_count(self.strip_index) as u16,
            },
            Screen::Visualizer => ScreenView::Visualizer,
        }
    }
}
