use core::fmt::Debug;

use smart_leds::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::config::{MAX_LEDS, MAX_STRIPS, StripTopology};
use crate::util::scale8;

/// Preallocated color buffer for every strip slot at its maximum length.
///
/// Only the first `led_count` pixels of each active strip are rendered and sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedFrame {
    pixels: [[RGB8; MAX_LEDS as usize]; MAX_STRIPS],
}

impl Default for LedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl LedFrame {
    pub const fn new() -> Self {
        Self {
            pixels: [[RGB8 { r: 0, g: 0, b: 0 }; MAX_LEDS as usize]; MAX_STRIPS],
        }
    }

    /// The first `len` pixels of `strip`, empty for a strip slot that does not exist.
    pub fn strip(&self, strip: usize, len: usize) -> &[RGB8] {
        match self.pixels.get(strip) {
            Some(pixels) => &pixels[..len.min(pixels.len())],
            None => &[],
        }
    }

    pub fn strip_mut(&mut self, strip: usize, len: usize) -> &mut [RGB8] {
        match self.pixels.get_mut(strip) {
            Some(pixels) => {
                let len = len.min(pixels.len());
                &mut pixels[..len]
            }
            None => &mut [],
        }
    }

    /// Visit every active pixel of `topology` with its strip and LED index.
    pub fn for_each_active(
        &mut self,
        topology: &StripTopology,
        mut f: impl FnMut(usize, usize, &mut RGB8),
    ) {
        for strip in 0..topology.strip_count() {
            let len = topology.led_count(strip);
            for (led, pixel) in self.strip_mut(strip, len).iter_mut().enumerate() {
                f(strip, led, pixel);
            }
        }
    }

    /// Dim every active pixel by `amount`/256, the way `fadeToBlackBy` does.
    pub fn fade_to_black_by(&mut self, topology: &StripTopology, amount: u8) {
        let keep = 255 - amount;
        self.for_each_active(topology, |_, _, pixel| {
            *pixel = RGB8::new(
                scale8(pixel.r, keep),
                scale8(pixel.g, keep),
                scale8(pixel.b, keep),
            );
        });
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Synchronous LED transmission, one call per strip.
pub trait LedOutput {
    type Error: Debug;

    /// Send `pixels` to the strip in slot `strip`, blocking until it is latched.
    fn show(&mut self, strip: usize, pixels: &[RGB8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError<E> {
    /// No driver is attached to this strip slot.
    NoSuchStrip(usize),
    Write(E),
}

/// [`LedOutput`] backed by one `smart-leds` driver per strip slot.
pub struct SmartLedsOutput<W, const N: usize> {
    writers: [W; N],
}

impl<W, const N: usize> SmartLedsOutput<W, N> {
    pub fn new(writers: [W; N]) -> Self {
        Self { writers }
    }

    pub fn writer(&self, strip: usize) -> Option<&W> {
        self.writers.get(strip)
    }
}

impl<W, const N: usize> LedOutput for SmartLedsOutput<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: Debug,
{
    type Error = OutputError<W::Error>;

    fn show(&mut self, strip: usize, pixels: &[RGB8]) -> Result<(), Self::Error> {
        let writer = self
            .writers
            .get_mut(strip)
            .ok_or(OutputError::NoSuchStrip(strip))?;
        writer
            .write(pixels.iter().copied())
            .map_err(OutputError::Write)
    }
}
