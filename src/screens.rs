//! The four display modes and the station context they render from.
//!
//! Hardware access goes through two small traits (`Sensors`,
//! `LedDisplay`) so every screen can be exercised in tests with
//! in-memory fakes; the real drivers live in `hw`.

use crate::graph::{GraphRenderer, Range};
use crate::state::Screen;
use crate::{Color, MatrixConfig, Palette, SensorError, heat_color};
use std::time::Duration;

// ── Hardware-facing traits ─────────────────────────────────────────

/// Environmental sensor readings. Both can fail (I2C hiccups, missing
/// hardware); failures propagate, the core does not retry.
pub trait Sensors {
    /// Raw temperature in °C, before calibration.
    fn read_temperature(&mut self) -> Result<f64, SensorError>;
    /// Relative humidity in percent.
    fn read_humidity(&mut self) -> Result<f64, SensorError>;
}

/// Pixel and text output. Assumed non-failing at this layer; hardware
/// faults below it are the driver's problem.
pub trait LedDisplay {
    /// Scroll `text` across the matrix, one step per `scroll_delay`.
    fn show_text(&mut self, text: &str, scroll_delay: Duration, color: Color);
    /// Paint a full row-major frame (rows × cols colors, top row first).
    fn show_grid(&mut self, pixels: &[Color]);
    /// All pixels off.
    fn clear(&mut self);
}

// ── Station context ────────────────────────────────────────────────

/// Everything the screens need, minus the matrix geometry baked into
/// the graph renderer.
pub struct StationConfig {
    pub matrix: MatrixConfig,
    pub temp_range: Range,
    pub palette: Palette,
    /// Calibration offset subtracted from raw temperature readings.
    /// The Pi's CPU warms the board, so the sensor reads high.
    pub temp_offset: f64,
    pub scroll_delay: Duration,
}

impl StationConfig {
    pub fn new(temp_range: Range) -> Self {
        Self {
            matrix: MatrixConfig::default(),
            temp_range,
            palette: Palette::default(),
            temp_offset: 1.0,
            scroll_delay: Duration::from_millis(100),
        }
    }
}

/// Shared context for all screen render actions: the sensors, the
/// display, and the one stateful piece (the graph's sample history).
/// Single owner, single writer: only the display loop touches it.
pub struct WeatherStation<S, D> {
    sensors: S,
    display: D,
    palette: Palette,
    graph: GraphRenderer,
    temp_range: Range,
    temp_offset: f64,
    scroll_delay: Duration,
}

impl<S: Sensors, D: LedDisplay> WeatherStation<S, D> {
    pub fn new(sensors: S, display: D, config: StationConfig) -> Self {
        Self {
            sensors,
            display,
            palette: config.palette,
            graph: GraphRenderer::new(config.temp_range, config.matrix, config.palette),
            temp_range: config.temp_range,
            temp_offset: config.temp_offset,
            scroll_delay: config.scroll_delay,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Temperature with the calibration offset applied. All screens
    /// use this, never the raw reading.
    fn compensated_temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.sensors.read_temperature()? - self.temp_offset)
    }

    /// Sparkline of recent temperature readings.
    pub fn render_graph(&mut self) -> Result<(), SensorError> {
        let temp = self.compensated_temperature()?;
        let pixels = self.graph.render(temp);
        self.display.show_grid(&pixels);
        Ok(())
    }

    /// Numeric temperature, colorized by where it sits in the range.
    pub fn render_temperature(&mut self) -> Result<(), SensorError> {
        let temp = self.compensated_temperature()?;
        let t = self.temp_range.normalize(temp);
        let color = heat_color(t, self.palette.cold, self.palette.mid, self.palette.hot);
        let text = format!("{temp:.1}C");
        self.display.show_text(&text, self.scroll_delay, color);
        Ok(())
    }

    /// Numeric relative humidity.
    pub fn render_humidity(&mut self) -> Result<(), SensorError> {
        let humidity = self.sensors.read_humidity()?;
        let text = format!("{humidity:.1}%");
        self.display.show_text(&text, self.scroll_delay, self.palette.text);
        Ok(())
    }

    /// Wall-clock time.
    pub fn render_clock(&mut self) -> Result<(), SensorError> {
        let now = chrono::Local::now();
        let text = now.format("%H:%M:%S").to_string();
        self.display.show_text(&text, self.scroll_delay, self.palette.text);
        Ok(())
    }

    /// Shutdown message, scrolled once before the display goes dark.
    pub fn farewell(&mut self) {
        let text_color = self.palette.text;
        self.display.show_text("Bye!", self.scroll_delay, text_color);
    }

    pub fn clear(&mut self) {
        self.display.clear();
    }
}

/// The fixed screen set, in the original cycle order.
pub fn build_screens<S, D>() -> Vec<Screen<WeatherStation<S, D>>>
where
    S: Sensors + 'static,
    D: LedDisplay + 'static,
{
    vec![
        Screen::new(
            "graph",
            Box::new(|st: &mut WeatherStation<S, D>| st.render_graph()),
        ),
        Screen::new(
            "temperature",
            Box::new(|st: &mut WeatherStation<S, D>| st.render_temperature()),
        ),
        Screen::new(
            "humidity",
            Box::new(|st: &mut WeatherStation<S, D>| st.render_humidity()),
        ),
        Screen::new(
            "clock",
            Box::new(|st: &mut WeatherStation<S, D>| st.render_clock()),
        ),
    ]
}

// ── Test fakes ─────────────────────────────────────────────────────

/// In-memory sensor and display stand-ins, shared with the controller
/// tests.
#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    pub struct FakeSensors {
        pub temperature: f64,
        pub humidity: f64,
        pub failing: bool,
    }

    impl FakeSensors {
        pub fn steady(temperature: f64, humidity: f64) -> Self {
            Self {
                temperature,
                humidity,
                failing: false,
            }
        }
    }

    impl Sensors for FakeSensors {
        fn read_temperature(&mut self) -> Result<f64, SensorError> {
            if self.failing {
                return Err(SensorError::Temperature("fake failure".into()));
            }
            Ok(self.temperature)
        }

        fn read_humidity(&mut self) -> Result<f64, SensorError> {
            if self.failing {
                return Err(SensorError::Humidity("fake failure".into()));
            }
            Ok(self.humidity)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum DisplayCall {
        Text { text: String, color: Color },
        Grid(Vec<Color>),
        Clear,
    }

    #[derive(Default)]
    pub struct RecordingDisplay {
        pub calls: Vec<DisplayCall>,
    }

    impl LedDisplay for RecordingDisplay {
        fn show_text(&mut self, text: &str, _scroll_delay: Duration, color: Color) {
            self.calls.push(DisplayCall::Text {
                text: text.to_string(),
                color,
            });
        }

        fn show_grid(&mut self, pixels: &[Color]) {
            self.calls.push(DisplayCall::Grid(pixels.to_vec()));
        }

        fn clear(&mut self) {
            self.calls.push(DisplayCall::Clear);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
