use microfft::real::rfft_512;
use smart_leds::hsv::{Hsv, hsv2rgb};

use crate::config::StripTopology;
use crate::leds::LedFrame;
use crate::util::map_range;

/// Transform length.
pub const FFT_SIZE: usize = 512;
/// Number of magnitude bins produced per pass.
pub const BIN_COUNT: usize = FFT_SIZE / 2;
/// Unsigned 8-bit samples are centered on this value.
pub const SAMPLE_BIAS: f32 = 128.0;
/// One sample is taken from every `SAMPLE_STRIDE` bytes of the chunk.
pub const SAMPLE_STRIDE: usize = 2;
const MAGNITUDE_DIVISOR: f32 = 10.0;

/// Spectrum of the most recent chunk, mapped onto the strips.
pub struct SpectralAnalyzer {
    window: [f32; FFT_SIZE],
    input: [f32; FFT_SIZE],
    magnitudes: [f32; BIN_COUNT],
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        let mut window = [0.0f32; FFT_SIZE];
        hamming_window(&mut window);
        Self {
            window,
            input: [0.0; FFT_SIZE],
            magnitudes: [0.0; BIN_COUNT],
        }
    }

    /// Compute the magnitude spectrum of `chunk`.
    ///
    /// Reads `FFT_SIZE` samples at [`SAMPLE_STRIDE`], zero-padding a short chunk.
    pub fn analyze(&mut self, chunk: &[u8]) -> &[f32; BIN_COUNT] {
        let samples = chunk.iter().step_by(SAMPLE_STRIDE).map(|&b| b as f32 - SAMPLE_BIAS);
        self.input.fill(0.0);
        for (slot, sample) in self.input.iter_mut().zip(samples) {
            *slot = sample;
        }

        for (v, w) in self.input.iter_mut().zip(self.window.iter()) {
            *v *= w;
        }

        // real input: the imaginary parts are zero by construction
        let spectrum = rfft_512(&mut self.input);
        // rfft packs the Nyquist bin into the imaginary part of bin 0; only the DC part is kept
        spectrum[0].im = 0.0;

        for (magnitude, c) in self.magnitudes.iter_mut().zip(spectrum.iter()) {
            *magnitude = libm::sqrtf(c.norm_sqr());
        }
        &self.magnitudes
    }

    /// Magnitudes of the last [`analyze`](Self::analyze) call.
    pub fn magnitudes(&self) -> &[f32; BIN_COUNT] {
        &self.magnitudes
    }

    /// Analyze `chunk` and paint every active LED from its bin.
    pub fn render(&mut self, chunk: &[u8], topology: &StripTopology, frame: &mut LedFrame) {
        self.analyze(chunk);

        let magnitudes = &self.magnitudes;
        frame.for_each_active(topology, |strip, led, pixel| {
            let bin = led_to_bin(led, topology.led_count(strip));
            let level = intensity(magnitudes[bin]);
            *pixel = hsv2rgb(Hsv {
                hue: level,
                sat: 255,
                val: level,
            });
        });
    }
}

/// Frequency bin shown by LED `led` of a strip with `led_count` LEDs.
///
/// Spreads the LEDs linearly over `[1, BIN_COUNT)`, skipping DC. Non-decreasing in `led`.
pub fn led_to_bin(led: usize, led_count: usize) -> usize {
    if led_count == 0 {
        return 1;
    }
    let led = led.min(led_count - 1);
    map_range(led as i32, 0, led_count as i32, 1, BIN_COUNT as i32) as usize
}

/// Brightness of a bin, `magnitude / 10` clamped to a byte.
pub fn intensity(magnitude: f32) -> u8 {
    (magnitude / MAGNITUDE_DIVISOR).clamp(0.0, 255.0) as u8
}

fn hamming_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        buffer.fill(1.0);
        return;
    }
    let denom = (n - 1) as f32;
    for (i, v) in buffer.iter_mut().enumerate() {
        // w[n] = 0.54 - 0.46 * cos(2π n / (N-1))
        let phase = (i as f32) / denom;
        *v = 0.54 - 0.46 * libm::cosf(2.0 * core::f32::consts::PI * phase);
    }
}
