//! Sparkline graph renderer: a rolling window of sensor samples drawn
//! as heat-colored bar columns on the LED matrix.
//!
//! This is the only stateful piece of the render pipeline. Each tick
//! appends one sample to a fixed-capacity history (oldest evicted
//! first) and produces a full row-major frame; everything else in the
//! crate renders statelessly from the current reading.

use crate::{Color, ConfigError, MatrixConfig, Palette, heat_color, rescale};
use std::collections::VecDeque;

// ── Range ──────────────────────────────────────────────────────────

/// The domain of interest for a sensor, e.g. 10–40 °C for indoor
/// temperature. Readings outside the range saturate; they never
/// extrapolate past the gradient ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// Fails with [`ConfigError::InvalidRange`] unless `min < max`,
    /// which is what keeps [`Range::normalize`] division-safe.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if min < max {
            Ok(Self { min, max })
        } else {
            Err(ConfigError::InvalidRange { min, max })
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamped position of `value` within the range, in `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        rescale(self.min, self.max, value)
    }
}

// ── Sample history ─────────────────────────────────────────────────

/// Fixed-capacity FIFO of recent samples, oldest first.
#[derive(Debug)]
pub struct SampleHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest if the window is full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples oldest-to-newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

// ── Graph renderer ─────────────────────────────────────────────────

/// Renders the rolling sample window as one bar column per history
/// slot, left-to-right oldest-to-newest.
///
/// Bar height and color both come from the sample's normalized value:
/// `round(t * rows)` pixels lit from the bottom, colored on the
/// cold→mid→hot gradient. Columns without a sample yet stay dark
/// instead of faking a zero reading.
pub struct GraphRenderer {
    range: Range,
    matrix: MatrixConfig,
    palette: Palette,
    history: SampleHistory,
}

impl GraphRenderer {
    /// History capacity is the matrix width: one column per sample.
    pub fn new(range: Range, matrix: MatrixConfig, palette: Palette) -> Self {
        Self {
            range,
            matrix,
            palette,
            history: SampleHistory::new(matrix.cols),
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// Record `sample` and produce the next frame: a row-major
    /// `rows × cols` grid of colors, top row first.
    pub fn render(&mut self, sample: f64) -> Vec<Color> {
        self.history.push(sample);

        let (rows, cols) = (self.matrix.rows, self.matrix.cols);
        let mut pixels = vec![Color::OFF; self.matrix.pixel_count()];

        for (col, sample) in self.history.iter().enumerate() {
            let t = self.range.normalize(sample);
            let bar = (t * rows as f64).round() as usize;
            if bar == 0 {
                continue;
            }
            let color = heat_color(t, self.palette.cold, self.palette.mid, self.palette.hot);

            // Bars grow upward from the bottom row.
            for row in (rows - bar)..rows {
                pixels[row * cols + col] = color;
            }
        }

        pixels
    }
}

// ── Tests ──────────────────────────────────────────────────────────
