use rand_core::RngCore;
use smart_leds::hsv::{Hsv, hsv2rgb};

use crate::config::StripTopology;
use crate::leds::LedFrame;
use crate::spectrum::SAMPLE_BIAS;
use crate::{Duration, Instant};

pub const THRESHOLD_MULTIPLIER: f32 = 1.5;
pub const COOLDOWN: Duration = Duration::from_ticks(150);
/// Per-tick fade applied when no beat fires, out of 256.
pub const FADE_AMOUNT: u8 = 20;

/// Detector state carried from one tick to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatState {
    pub last_energy: f32,
    /// `None` until the first beat, which lets the first onset through the cooldown.
    pub last_beat: Option<Instant>,
    pub threshold_multiplier: f32,
    pub cooldown: Duration,
}

impl Default for BeatState {
    fn default() -> Self {
        Self {
            last_energy: 0.0,
            last_beat: None,
            threshold_multiplier: THRESHOLD_MULTIPLIER,
            cooldown: COOLDOWN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeatOutcome {
    /// Every LED was set to a random hue.
    Beat,
    /// Every LED was dimmed by [`FADE_AMOUNT`].
    Fade,
}

/// Energy-onset detector driving flash/fade effects.
///
/// `last_energy` starts at zero, so the first chunk with any energy at all
/// always counts as a beat. That includes the first chunk after silence.
#[derive(Debug, Default)]
pub struct BeatDetector {
    state: BeatState,
}

impl BeatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BeatState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    /// Mean of the squared centered samples, zero for an empty chunk.
    pub fn energy(chunk: &[u8]) -> f32 {
        if chunk.is_empty() {
            return 0.0;
        }
        let sum: f32 = chunk
            .iter()
            .map(|&b| {
                let sample = b as f32 - SAMPLE_BIAS;
                sample * sample
            })
            .sum();
        sum / chunk.len() as f32
    }

    /// Decide whether `energy` at `now` is a beat and remember it for the next call.
    pub fn detect(&mut self, energy: f32, now: Instant) -> bool {
        let state = &mut self.state;
        let cooled_down = match state.last_beat {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|elapsed| elapsed > state.cooldown),
        };

        let fired = energy > state.threshold_multiplier * state.last_energy && cooled_down;
        if fired {
            state.last_beat = Some(now);
        }
        state.last_energy = energy;
        fired
    }

    /// Run detection on `chunk` and flash or fade the active LEDs accordingly.
    pub fn render<R: RngCore>(
        &mut self,
        chunk: &[u8],
        now: Instant,
        topology: &StripTopology,
        frame: &mut LedFrame,
        rng: &mut R,
    ) -> BeatOutcome {
        let energy = Self::energy(chunk);
        if self.detect(energy, now) {
            log::debug!("Beat, energy {energy} at {} ms", now.ticks());
            frame.for_each_active(topology, |_, _, pixel| {
                *pixel = hsv2rgb(Hsv {
                    hue: (rng.next_u32() & 0xff) as u8,
                    sat: 255,
                    val: 255,
                });
            });
            BeatOutcome::Beat
        } else {
            frame.fade_to_black_by(topology, FADE_AMOUNT);
            BeatOutcome::Fade
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_leds::RGB8;

    struct CountingRng(u32);

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.0 = self.0.wrapping_add(37);
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest {
                *b = self.next_u32() as u8;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    #[test]
    fn energy_of_centered_samples() {
        assert_eq!(BeatDetector::energy(&[128; 64]), 0.0);
        assert_eq!(BeatDetector::energy(&[138, 118]), 100.0);
        assert_eq!(BeatDetector::energy(&[]), 0.0);
    }

    #[test]
    fn first_nonsilent_chunk_always_beats() {
        let mut detector = BeatDetector::new();
        assert!(detector.detect(0.01, at(0)));
        assert_eq!(detector.state().last_beat, Some(at(0)));
    }

    #[test]
    fn silence_never_beats() {
        let mut detector = BeatDetector::new();
        assert!(!detector.detect(0.0, at(0)));
        assert!(!detector.detect(0.0, at(1000)));
    }

    #[test]
    fn equal_energy_does_not_beat_twice() {
        let mut detector = BeatDetector::new();
        assert!(detector.detect(50.0, at(0)));
        assert!(!detector.detect(50.0, at(1000)));
    }

    #[test]
    fn onset_inside_cooldown_is_suppressed_but_energy_is_tracked() {
        let mut detector = BeatDetector::new();
        assert!(detector.detect(10.0, at(1000)));
        assert!(!detector.detect(100.0, at(1100)));
        assert_eq!(detector.state().last_energy, 100.0);
        assert_eq!(detector.state().last_beat, Some(at(1000)));

        // exactly at the cooldown is still too early
        assert!(!detector.detect(1000.0, at(1150)));
        assert!(detector.detect(10_000.0, at(1151)));
    }

    #[test]
    fn resumes_from_saved_state() {
        let mut detector = BeatDetector::with_state(BeatState {
            last_energy: 10.0,
            last_beat: Some(at(1000)),
            ..BeatState::default()
        });
        assert!(!detector.detect(100.0, at(1100)));
        assert!(detector.detect(1000.0, at(1200)));
    }

    #[test]
    fn post_silence_chunk_beats_again() {
        let mut detector = BeatDetector::new();
        assert!(detector.detect(400.0, at(0)));
        assert!(!detector.detect(0.0, at(500)));
        assert!(detector.detect(1.0, at(1000)));
    }

    #[test]
    fn render_flashes_then_fades() {
        let topology = StripTopology::new(2, &[10, 10]);
        let mut frame = LedFrame::new();
        let mut detector = BeatDetector::new();
        let mut rng = CountingRng(0);

        let loud = [255u8; 256];
        let outcome = detector.render(&loud, at(0), &topology, &mut frame, &mut rng);
        assert_eq!(outcome, BeatOutcome::Beat);
        for strip in 0..2 {
            assert!(frame.strip(strip, 10).iter().all(|p| *p != RGB8::default()));
        }
        // one draw per LED, in strip order
        let hue = |h: u8| hsv2rgb(Hsv { hue: h, sat: 255, val: 255 });
        assert_eq!(frame.strip(0, 2), &[hue(37), hue(74)]);
        assert_eq!(frame.strip(1, 1)[0], hue(((37u32 * 11) & 0xff) as u8));
        let flashed = frame.strip(0, 1)[0];

        let outcome = detector.render(&loud, at(1000), &topology, &mut frame, &mut rng);
        assert_eq!(outcome, BeatOutcome::Fade);
        let faded = frame.strip(0, 1)[0];
        assert!(faded.r <= flashed.r && faded.g <= flashed.g && faded.b <= flashed.b);
        assert_ne!(faded, flashed);
    }
}
