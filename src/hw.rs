//! Sense HAT drivers: the only code that touches real hardware.
//!
//! Everything above this module works with the `Sensors` / `LedDisplay`
//! / `InputSource` traits; here they are implemented over the HAT's
//! HTS221 sensor, the 8×8 framebuffer, and the joystick evdev device.
//! Joystick reads block, so a dedicated reader thread forwards events
//! over an `mpsc` channel and the display loop drains it without
//! blocking.

use crate::controller::{InputEvent, InputSource, StickAction, StickDirection};
use crate::screens::{LedDisplay, Sensors};
use crate::{Color, SensorError};
use sensehat::SenseHat;
use sensehat_screen::{FontCollection, PixelColor, PixelFrame, Rotate, Screen};
use sensehat_stick::{Action, Direction, JoyStick, JoyStickEvent};
use std::error::Error;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

const FRAMEBUFFER_PATH: &str = "/dev/fb1";

/// Brightness used when the low-light flag is set.
const LOW_LIGHT_BRIGHTNESS: u8 = 40;

// ── Sensors ────────────────────────────────────────────────────────

/// Temperature and humidity from the HAT's humidity sensor.
pub struct SenseHatSensors {
    hat: SenseHat,
}

impl SenseHatSensors {
    pub fn open() -> Result<Self, Box<dyn Error>> {
        let hat = SenseHat::new().map_err(|e| format!("failed to open Sense HAT: {e:?}"))?;
        Ok(Self { hat })
    }
}

impl Sensors for SenseHatSensors {
    fn read_temperature(&mut self) -> Result<f64, SensorError> {
        self.hat
            .get_temperature_from_humidity()
            .map(|t| t.as_celsius())
            .map_err(|e| SensorError::Temperature(format!("{e:?}")))
    }

    fn read_humidity(&mut self) -> Result<f64, SensorError> {
        self.hat
            .get_humidity()
            .map(|h| h.as_percent())
            .map_err(|e| SensorError::Humidity(format!("{e:?}")))
    }
}

// ── Display ────────────────────────────────────────────────────────

/// The 8×8 LED framebuffer, with optional 180° rotation (for units
/// mounted upside down) and low-light dimming.
pub struct SenseHatDisplay {
    screen: Screen,
    fonts: FontCollection,
    rotate: Rotate,
    brightness: u8,
}

impl SenseHatDisplay {
    pub fn open(rotate_180: bool, low_light: bool) -> Result<Self, Box<dyn Error>> {
        let screen = Screen::open(FRAMEBUFFER_PATH)
            .map_err(|e| format!("failed to open framebuffer {FRAMEBUFFER_PATH}: {e:?}"))?;
        Ok(Self {
            screen,
            fonts: FontCollection::new(),
            rotate: if rotate_180 {
                Rotate::Ccw180
            } else {
                Rotate::None
            },
            brightness: if low_light { LOW_LIGHT_BRIGHTNESS } else { 100 },
        })
    }

    fn write(&mut self, frame: PixelFrame) {
        let frame = frame.rotate(self.rotate);
        self.screen.write_frame(&frame.frame_line());
    }

    /// Convert at the hardware boundary, dimming applied last.
    fn to_pixel(&self, color: Color) -> PixelColor {
        let c = color.dim(self.brightness);
        PixelColor::new(c.r, c.g, c.b)
    }
}

impl LedDisplay for SenseHatDisplay {
    fn show_text(&mut self, text: &str, scroll_delay: Duration, color: Color) {
        let fg = self.to_pixel(color);
        match self.fonts.sanitize_str(text) {
            Ok(message) => {
                for frame in message.pixel_frames(fg, PixelColor::BLACK) {
                    self.write(frame);
                    thread::sleep(scroll_delay);
                }
            }
            Err(e) => tracing::warn!(text, "could not render text: {e:?}"),
        }
    }

    fn show_grid(&mut self, pixels: &[Color]) {
        let mut cells = [PixelColor::BLACK; 64];
        for (cell, color) in cells.iter_mut().zip(pixels) {
            *cell = self.to_pixel(*color);
        }
        self.write(PixelFrame::new(&cells));
    }

    fn clear(&mut self) {
        self.write(PixelFrame::new(&[PixelColor::BLACK; 64]));
    }
}

// ── Joystick ───────────────────────────────────────────────────────

/// Joystick events, forwarded from a reader thread.
///
/// The thread parks in the evdev read; the channel decouples it from
/// the display loop's pacing. When the receiver is dropped the next
/// send fails and the thread exits.
pub struct SenseHatStick {
    events: Receiver<InputEvent>,
}

impl SenseHatStick {
    pub fn open() -> Result<Self, Box<dyn Error>> {
        let mut stick = JoyStick::open().map_err(|e| format!("failed to open joystick: {e:?}"))?;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                match stick.events() {
                    Ok(events) => {
                        for event in events {
                            let Some(event) = convert(&event) else {
                                continue;
                            };
                            if tx.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("joystick read failed, stopping reader: {e}");
                        return;
                    }
                }
            }
        });

        Ok(Self { events: rx })
    }
}

impl InputSource for SenseHatStick {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Map a raw joystick event into the core's input model. Hold repeats
/// are dropped; the cycle policy only reacts to discrete presses.
fn convert(event: &JoyStickEvent) -> Option<InputEvent> {
    let action = match event.action {
        Action::Press => StickAction::Pressed,
        Action::Release => StickAction::Released,
        Action::Hold => return None,
    };
    let direction = match event.direction {
        Direction::Up => StickDirection::Up,
        Direction::Down => StickDirection::Down,
        Direction::Left => StickDirection::Left,
        Direction::Right => StickDirection::Right,
        Direction::Enter => StickDirection::Middle,
    };
    Some(InputEvent { action, direction })
}
