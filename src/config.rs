use core::fmt::Write;

use anyhow::Result;
use heapless::String;

use crate::error_with_location;
use crate::persistence::KeyValueStore;

pub const MAX_STRIPS: usize = 4;
pub const MIN_LEDS: u16 = 10;
pub const MAX_LEDS: u16 = 150;
/// Increment applied per tap on the LED count screen.
pub const LED_STEP: u16 = 10;
pub const DEFAULT_LEDS: u16 = 30;
pub const DEFAULT_STRIP_COUNT: usize = 1;

/// Data pin of each strip slot.
pub const STRIP_OUTPUT_PINS: [u8; MAX_STRIPS] = [21, 22, 27, 32];

/// Preferences namespace holding the configuration.
pub const NAMESPACE: &str = "rgbcfg";
const KEY_STRIP_COUNT: &str = "stripCount";
const KEY_AUDIO_MODE: &str = "audioMode";
const KEY_LEDS_PREFIX: &str = "leds_";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioMode {
    /// Per-LED frequency bins.
    #[default]
    Spectral,
    /// Whole-strip flashes on energy onsets.
    Beat,
}

impl AudioMode {
    /// Name written to storage, compatible with configurations saved by older firmware.
    pub const fn as_str(self) -> &'static str {
        match self {
            AudioMode::Spectral => "fft",
            AudioMode::Beat => "beat",
        }
    }

    pub fn from_stored(name: &str) -> Option<Self> {
        match name {
            "fft" => Some(AudioMode::Spectral),
            "beat" => Some(AudioMode::Beat),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripConfig {
    pub output_pin: u8,
    pub led_count: u16,
}

/// Number of strips in use and the LED count of every slot.
///
/// Slots past `strip_count` keep their count so that raising the strip count
/// brings back the previous length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripTopology {
    strips: [StripConfig; MAX_STRIPS],
    strip_count: usize,
}

impl Default for StripTopology {
    fn default() -> Self {
        Self {
            strips: STRIP_OUTPUT_PINS.map(|output_pin| StripConfig {
                output_pin,
                led_count: DEFAULT_LEDS,
            }),
            strip_count: DEFAULT_STRIP_COUNT,
        }
    }
}

impl StripTopology {
    /// Build a topology, clamping the strip count to `[1, MAX_STRIPS]` and every
    /// LED count to `[MIN_LEDS, MAX_LEDS]`. Slots missing from `led_counts` use the default.
    pub fn new(strip_count: usize, led_counts: &[u16]) -> Self {
        let mut topology = Self::default();
        topology.strip_count = strip_count.clamp(1, MAX_STRIPS);
        for (strip, &count) in topology.strips.iter_mut().zip(led_counts) {
            strip.led_count = count.clamp(MIN_LEDS, MAX_LEDS);
        }
        topology
    }

    pub fn strip_count(&self) -> usize {
        self.strip_count
    }

    /// The strips currently in use.
    pub fn active(&self) -> &[StripConfig] {
        &self.strips[..self.strip_count]
    }

    pub fn led_count(&self, strip: usize) -> usize {
        self.strips.get(strip).map_or(0, |s| s.led_count as usize)
    }

    /// Add one strip, saturating at [`MAX_STRIPS`].
    pub fn increment_strip_count(&mut self) -> usize {
        self.strip_count = (self.strip_count + 1).clamp(1, MAX_STRIPS);
        self.strip_count
    }

    /// Advance a strip's LED count by [`LED_STEP`], wrapping past [`MAX_LEDS`] to [`MIN_LEDS`].
    ///
    /// Returns the new count, or `None` if `strip` is not a slot.
    pub fn step_led_count(&mut self, strip: usize) -> Option<u16> {
        let slot = self.strips.get_mut(strip)?;
        let next = slot.led_count + LED_STEP;
        slot.led_count = if next > MAX_LEDS { MIN_LEDS } else { next };
        Some(slot.led_count)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub topology: StripTopology,
    pub mode: AudioMode,
}

fn leds_key(strip: usize) -> String<16> {
    let mut key = String::new();
    // "leds_" plus at most two digits always fits
    let _ = write!(key, "{KEY_LEDS_PREFIX}{strip}");
    key
}

impl AppConfig {
    /// Read the configuration, falling back to defaults for missing keys.
    pub fn load<S: KeyValueStore>(store: &mut S) -> Result<Self> {
        let strip_count = store
            .get_u32(NAMESPACE, KEY_STRIP_COUNT)
            .map_err(|e| error_with_location!("Failed to read {}: {:?}", KEY_STRIP_COUNT, e))?
            .map_or(DEFAULT_STRIP_COUNT, |v| v as usize)
            .clamp(1, MAX_STRIPS);

        let mut led_counts = [DEFAULT_LEDS; MAX_STRIPS];
        for (strip, count) in led_counts.iter_mut().enumerate().take(strip_count) {
            let key = leds_key(strip);
            if let Some(stored) = store
                .get_u32(NAMESPACE, &key)
                .map_err(|e| error_with_location!("Failed to read {}: {:?}", key, e))?
            {
                *count = stored.min(u16::MAX as u32) as u16;
            }
        }

        Ok(Self {
            topology: StripTopology::new(strip_count, &led_counts),
            mode: Self::load_mode(store),
        })
    }

    /// The stored audio mode. Anything unreadable or unknown becomes the default
    /// without discarding the topology read before it.
    fn load_mode<S: KeyValueStore>(store: &mut S) -> AudioMode {
        let mut buf = [0u8; 16];
        match store.get_str(NAMESPACE, KEY_AUDIO_MODE, &mut buf) {
            Ok(Some(name)) => AudioMode::from_stored(name).unwrap_or_else(|| {
                log::warn!("Unknown audio mode {name:?}, using {}", AudioMode::default().as_str());
                AudioMode::default()
            }),
            Ok(None) => AudioMode::default(),
            Err(e) => {
                log::warn!("Failed to read {KEY_AUDIO_MODE}: {e:?}, using {}", AudioMode::default().as_str());
                AudioMode::default()
            }
        }
    }

    /// Write the active strips and the audio mode, then commit.
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<()> {
        let topology = &self.topology;
        store
            .put_u32(NAMESPACE, KEY_STRIP_COUNT, topology.strip_count() as u32)
            .map_err(|e| error_with_location!("Failed to write {}: {:?}", KEY_STRIP_COUNT, e))?;

        for (strip, config) in topology.active().iter().enumerate() {
            let key = leds_key(strip);
            store
                .put_u32(NAMESPACE, &key, config.led_count as u32)
                .map_err(|e| error_with_location!("Failed to write {}: {:?}", key, e))?;
        }

        store
            .put_str(NAMESPACE, KEY_AUDIO_MODE, self.mode.as_str())
            .map_err(|e| error_with_location!("Failed to write {}: {:?}", KEY_AUDIO_MODE, e))?;

        store
            .commit(NAMESPACE)
            .map_err(|e| error_with_location!("Failed to commit {}: {:?}", NAMESPACE, e))?;

        Ok(())
    }
}
