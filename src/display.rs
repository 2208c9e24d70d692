use core::fmt::{Debug, Write};

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_10X20, FONT_9X18_BOLD},
    },
    pixelcolor::Rgb565,
    prelude::*,
    text::{Baseline, Text},
};
use heapless::String;

use crate::config::AudioMode;
use crate::ui::ScreenView;

/// Something that can draw a menu screen.
pub trait Display {
    type Error: Debug;

    /// Replace whatever is on screen with `view`.
    fn show(&mut self, view: &ScreenView) -> Result<(), Self::Error>;
}

/// [`Display`] for any RGB565 `embedded-graphics` target, e.g. the 240x320 TFT.
pub struct GraphicsDisplay<D> {
    target: D,
}

impl<D> GraphicsDisplay<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> GraphicsDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn line(&mut self, text: &str, x: i32, y: i32, color: Rgb565) -> Result<(), D::Error> {
        let style = MonoTextStyle::new(&FONT_9X18_BOLD, color);
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(&mut self.target)?;
        Ok(())
    }
}

impl<D> Display for GraphicsDisplay<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    type Error = D::Error;

    fn show(&mut self, view: &ScreenView) -> Result<(), Self::Error> {
        self.target.clear(Rgb565::BLACK)?;

        let mut text: String<32> = String::new();
        match *view {
            ScreenView::Splash => {
                let style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
                Text::with_baseline("RGB CONTROLLER", Point::new(20, 140), style, Baseline::Top)
                    .draw(&mut self.target)?;
            }
            ScreenView::MainMenu => {
                self.line("1. Audio Mode", 40, 50, Rgb565::YELLOW)?;
                self.line("2. Configure LEDs", 40, 100, Rgb565::YELLOW)?;
                self.line("3. Start Visualizer", 40, 150, Rgb565::YELLOW)?;
            }
            ScreenView::AudioModeSelect { mode } => {
                let marker = |m: AudioMode| if m == mode { "> " } else { "  " };
                self.line("SELECT AUDIO MODE", 40, 50, Rgb565::WHITE)?;
                let _ = write!(text, "{}FFT", marker(AudioMode::Spectral));
                self.line(&text, 40, 100, Rgb565::WHITE)?;
                text.clear();
                let _ = write!(text, "{}Beat", marker(AudioMode::Beat));
                self.line(&text, 40, 140, Rgb565::WHITE)?;
            }
            ScreenView::StripCountConfig { strip_count } => {
                let _ = write!(text, "Strips: {strip_count}");
                self.line(&text, 30, 50, Rgb565::WHITE)?;
                self.line("Tap to continue", 30, 100, Rgb565::WHITE)?;
            }
            ScreenView::PerStripCountConfig {
                strip_number,
                led_count,
            } => {
                let _ = write!(text, "Strip #{strip_number}");
                self.line(&text, 10, 40, Rgb565::WHITE)?;
                text.clear();
                let _ = write!(text, "LEDs: {led_count}");
                self.line(&text, 10, 90, Rgb565::WHITE)?;
                self.line("Tap to next/finish", 10, 140, Rgb565::WHITE)?;
            }
            ScreenView::Visualizer => {
                self.line("Visualizer Running...", 20, 100, Rgb565::WHITE)?;
            }
        }
        Ok(())
    }
}
