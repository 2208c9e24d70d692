use crate::util::map_range;
use crate::{Duration, Instant};

/// A reading from the resistive panel, in panel units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTouch {
    pub x: i32,
    pub y: i32,
    pub pressure: i32,
}

/// Touch position in logical screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Source of raw touch samples.
pub trait TouchPanel {
    /// Sample the panel once. Returns `None` when nothing is pressing it.
    fn sample(&mut self) -> Option<RawTouch>;
}

/// Pressure window and panel-to-screen mapping.
///
/// The display is rotated relative to the panel, so screen x comes from
/// panel y and screen y from panel x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchCalibration {
    /// Exclusive lower bound of a valid press.
    pub min_pressure: i32,
    /// Exclusive upper bound of a valid press.
    pub max_pressure: i32,
    /// Panel y range spanning the screen width.
    pub raw_y_range: (i32, i32),
    /// Panel x range spanning the screen height.
    pub raw_x_range: (i32, i32),
    pub screen_width: i32,
    pub screen_height: i32,
}

impl Default for TouchCalibration {
    fn default() -> Self {
        Self {
            min_pressure: 200,
            max_pressure: 1000,
            raw_y_range: (150, 900),
            raw_x_range: (120, 920),
            screen_width: 240,
            screen_height: 320,
        }
    }
}

impl TouchCalibration {
    pub fn accepts(&self, touch: &RawTouch) -> bool {
        touch.pressure > self.min_pressure && touch.pressure < self.max_pressure
    }

    /// Map panel coordinates to screen coordinates. Not clamped to the screen.
    pub fn to_screen(&self, touch: &RawTouch) -> ScreenPoint {
        let (y_min, y_max) = self.raw_y_range;
        let (x_min, x_max) = self.raw_x_range;
        ScreenPoint {
            x: map_range(touch.y, y_min, y_max, 0, self.screen_width),
            y: map_range(touch.x, x_min, x_max, 0, self.screen_height),
        }
    }

    /// Screen position of a valid press, `None` if the pressure is out of the window.
    pub fn classify(&self, touch: &RawTouch) -> Option<ScreenPoint> {
        self.accepts(touch).then(|| self.to_screen(touch))
    }
}

/// Discrete input fed to the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    /// A new press began at this point.
    Tap(ScreenPoint),
    /// The current press has been held for [`LONG_PRESS`].
    LongPress,
}

pub const LONG_PRESS: Duration = Duration::from_ticks(1_000);

/// Turns a stream of per-tick samples into discrete events.
///
/// A press yields one [`TouchEvent::Tap`] when it starts and at most one
/// [`TouchEvent::LongPress`] while held. Nothing fires again until release.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchTracker {
    pressed_since: Option<Instant>,
    long_press_sent: bool,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_since.is_some()
    }

    pub fn update(&mut self, touch: Option<ScreenPoint>, now: Instant) -> Option<TouchEvent> {
        let Some(point) = touch else {
            self.pressed_since = None;
            self.long_press_sent = false;
            return None;
        };

        match self.pressed_since {
            None => {
                self.pressed_since = Some(now);
                Some(TouchEvent::Tap(point))
            }
            Some(since) if !self.long_press_sent => {
                let held = now.checked_duration_since(since)?;
                if held >= LONG_PRESS {
                    self.long_press_sent = true;
                    Some(TouchEvent::LongPress)
                } else {
                    None
                }
            }
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(x: i32, y: i32, pressure: i32) -> RawTouch {
        RawTouch { x, y, pressure }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    #[test]
    fn pressure_window_is_exclusive() {
        let cal = TouchCalibration::default();
        assert!(!cal.accepts(&raw(500, 500, 200)));
        assert!(cal.accepts(&raw(500, 500, 201)));
        assert!(cal.accepts(&raw(500, 500, 999)));
        assert!(!cal.accepts(&raw(500, 500, 1000)));
        assert_eq!(cal.classify(&raw(500, 500, 50)), None);
    }

    #[test]
    fn axes_are_swapped_and_remapped() {
        let cal = TouchCalibration::default();
        assert_eq!(cal.to_screen(&raw(120, 150, 500)), ScreenPoint::new(0, 0));
        assert_eq!(cal.to_screen(&raw(920, 900, 500)), ScreenPoint::new(240, 320));
        // panel x=320 -> screen y=80, panel y=525 -> screen x=120
        assert_eq!(cal.classify(&raw(320, 525, 500)), Some(ScreenPoint::new(120, 80)));
    }

    #[test]
    fn held_touch_taps_once() {
        let mut tracker = TouchTracker::new();
        let p = ScreenPoint::new(10, 60);

        assert_eq!(tracker.update(Some(p), at(0)), Some(TouchEvent::Tap(p)));
        assert_eq!(tracker.update(Some(p), at(10)), None);
        assert_eq!(tracker.update(Some(p), at(20)), None);
        assert_eq!(tracker.update(None, at(30)), None);
        assert!(!tracker.is_pressed());
        assert_eq!(tracker.update(Some(p), at(40)), Some(TouchEvent::Tap(p)));
    }

    #[test]
    fn long_press_fires_once_while_held() {
        let mut tracker = TouchTracker::new();
        let p = ScreenPoint::new(10, 60);

        tracker.update(Some(p), at(0));
        assert_eq!(tracker.update(Some(p), at(999)), None);
        assert_eq!(tracker.update(Some(p), at(1000)), Some(TouchEvent::LongPress));
        assert_eq!(tracker.update(Some(p), at(5000)), None);

        tracker.update(None, at(5001));
        assert_eq!(tracker.update(Some(p), at(5002)), Some(TouchEvent::Tap(p)));
    }
}
