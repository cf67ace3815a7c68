//! Core logic for a Sense HAT weather station display.
//!
//! The crate separates the display pipeline from the hardware drivers so
//! the interesting parts can be built and tested off-Pi:
//! - Matrix geometry and the `Color` type
//! - Value normalization and the three-stop heat gradient
//! - The screen state machine and the sparkline graph renderer
//! - Signal handling for clean shutdown
//!
//! The `hardware` feature pulls in the real Sense HAT drivers (`hw`),
//! which only build on the Pi.

pub mod controller;
pub mod graph;
#[cfg(feature = "hardware")]
pub mod hw;
pub mod screens;
pub mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// ── Matrix configuration ───────────────────────────────────────────

/// Dimensions of the LED matrix.
///
/// The Sense HAT panel is 8×8, but nothing in the pipeline assumes that;
/// the graph's history capacity is derived from `cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of pixels on the matrix.
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { rows: 8, cols: 8 }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Construction-time failures, raised before the display loop starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("screen list is empty")]
    NoScreens,
    #[error("invalid range: min {min} must be below max {max}")]
    InvalidRange { min: f64, max: f64 },
}

/// A sensor read failed.
///
/// The core never retries these; they propagate to the orchestrator,
/// which clears the display and logs rather than crashing mid-frame.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("temperature read failed: {0}")]
    Temperature(String),
    #[error("humidity read failed: {0}")]
    Humidity(String),
}

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the framebuffer crate.
///
/// This lets the gradient and graph logic run in tests on any machine;
/// the hardware boundary converts to the driver's pixel type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// All channels off. Used as the graph background.
    pub const OFF: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend toward `other`, each channel interpolated
    /// independently and rounded to the nearest intensity.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Apply brightness scaling (0-100) to this color. Used for the
    /// low-light mode so the panel is not blinding at night.
    pub fn dim(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }
}

/// The reference colors the station renders with: the three gradient
/// stops plus the text color for the humidity and clock screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub cold: Color,
    pub mid: Color,
    pub hot: Color,
    pub text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            cold: Color::new(0, 0, 255),
            mid: Color::new(0, 255, 0),
            hot: Color::new(255, 0, 0),
            text: Color::new(200, 200, 200),
        }
    }
}

// ── Value-to-color mapping ─────────────────────────────────────────

/// Map `value` in `[min, max]` onto the unit interval, clamping
/// out-of-range inputs rather than extrapolating.
///
/// Division by zero is ruled out by `Range` construction (`min < max`).
pub fn rescale(min: f64, max: f64, value: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Piecewise-linear gradient across three stops: `[0, 0.5]` blends
/// cold→mid, `[0.5, 1]` blends mid→hot. Exactly `mid` at the midpoint.
pub fn heat_color(t: f64, cold: Color, mid: Color, hot: Color) -> Color {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.5 {
        cold.lerp(mid, t * 2.0)
    } else {
        mid.lerp(hot, (t - 0.5) * 2.0)
    }
}

// ── Shutdown signal ────────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// The flag is shared between the display loop and the signal handler;
/// an `AtomicBool` is all that takes.
pub fn setup_signal_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    running
}

/// Check if the display loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
