//! The orchestrator: polls the joystick, decides auto-cycle vs. hold,
//! and drives the state machine until shutdown.
//!
//! Everything runs on one thread. Each iteration processes the pending
//! input events in arrival order before making the timer decision, so a
//! manual "next" always wins over the timer advance for that
//! iteration. Outcomes are typed (`Tick`) instead of funneled through
//! a catch-all handler: continue, shutdown, or a fatal error via
//! `Result`.

use crate::screens::{LedDisplay, Sensors, WeatherStation, build_screens};
use crate::state::StateManager;
use crate::{ConfigError, SensorError, is_running};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

// ── Input events ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StickAction {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StickDirection {
    Up,
    Down,
    Left,
    Right,
    Middle,
}

/// One discrete joystick event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub action: StickAction,
    pub direction: StickDirection,
}

/// Source of joystick events. `poll` returns whatever arrived since
/// the last call: finite, possibly empty, never blocking.
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

// ── Cycle policy ───────────────────────────────────────────────────

/// Whether the timer advances the cycle or re-renders in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleMode {
    /// Advance to the next screen every tick.
    Auto,
    /// Stay on the current screen, repainting it with fresh data.
    Hold,
}

/// Outcome of one loop iteration. Fatal errors travel separately, as
/// the `Err` arm of [`DisplayController::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Shutdown,
}

/// How long to pause between iterations in each mode.
#[derive(Clone, Copy, Debug)]
pub struct CyclePacing {
    pub auto_interval: Duration,
    pub hold_interval: Duration,
}

impl Default for CyclePacing {
    fn default() -> Self {
        Self {
            auto_interval: Duration::from_secs(10),
            hold_interval: Duration::from_secs(2),
        }
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// Owns the station, the screen cycle, and the input source; nothing
/// else touches them once the loop starts.
pub struct DisplayController<S, D, I> {
    station: WeatherStation<S, D>,
    manager: StateManager<WeatherStation<S, D>>,
    input: I,
    mode: CycleMode,
    pacing: CyclePacing,
    running: Arc<AtomicBool>,
}

impl<S, D, I> DisplayController<S, D, I>
where
    S: Sensors + 'static,
    D: LedDisplay + 'static,
    I: InputSource,
{
    pub fn new(
        station: WeatherStation<S, D>,
        input: I,
        pacing: CyclePacing,
        running: Arc<AtomicBool>,
    ) -> Result<Self, ConfigError> {
        let manager = StateManager::new(build_screens())?;
        Ok(Self {
            station,
            manager,
            input,
            mode: CycleMode::Auto,
            pacing,
            running,
        })
    }

    pub fn mode(&self) -> CycleMode {
        self.mode
    }

    pub fn current_screen(&self) -> &'static str {
        self.manager.current_name()
    }

    pub fn station(&self) -> &WeatherStation<S, D> {
        &self.station
    }

    /// One loop iteration, without the pacing sleep.
    ///
    /// Events are handled in arrival order before the timer decision;
    /// a right-press advance suppresses the timer for this iteration.
    pub fn tick(&mut self) -> Result<Tick, SensorError> {
        if !is_running(&self.running) {
            return Ok(Tick::Shutdown);
        }

        let mut advanced_manually = false;
        for event in self.input.poll() {
            tracing::debug!(?event, "joystick event");
            if event.action != StickAction::Pressed {
                continue;
            }
            match event.direction {
                StickDirection::Middle => {
                    tracing::info!("resuming auto-cycle");
                    self.mode = CycleMode::Auto;
                }
                StickDirection::Right => {
                    self.mode = CycleMode::Hold;
                    self.manager.advance(&mut self.station)?;
                    advanced_manually = true;
                }
                _ => {}
            }
        }

        if advanced_manually {
            return Ok(Tick::Continue);
        }

        match self.mode {
            CycleMode::Auto => self.manager.advance(&mut self.station)?,
            CycleMode::Hold => self.manager.refresh(&mut self.station)?,
        }
        Ok(Tick::Continue)
    }

    /// Run until an interrupt or a fatal render error.
    ///
    /// On shutdown the station scrolls its farewell and goes dark; on a
    /// render failure the display is cleared and the error surfaces.
    /// The panel is never left showing a partial frame.
    pub fn run(&mut self) -> Result<(), SensorError> {
        tracing::info!("display loop started");
        loop {
            match self.tick() {
                Ok(Tick::Continue) => {
                    let pause = match self.mode {
                        CycleMode::Auto => self.pacing.auto_interval,
                        CycleMode::Hold => self.pacing.hold_interval,
                    };
                    thread::sleep(pause);
                }
                Ok(Tick::Shutdown) => {
                    tracing::info!("shutdown requested");
                    self.station.farewell();
                    self.station.clear();
                    return Ok(());
                }
                Err(e) => {
                    self.station.clear();
                    tracing::error!(error = %e, "render failed, display cleared");
                    return Err(e);
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Range;
    use crate::screens::StationConfig;
    use crate::screens::fakes::{DisplayCall, FakeSensors, RecordingDisplay};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Input source fed from a script: one batch of events per poll.
    struct ScriptedInput {
        batches: VecDeque<Vec<InputEvent>>,
    }

    impl ScriptedInput {
        fn quiet() -> Self {
            Self {
                batches: VecDeque::new(),
            }
        }

        fn with_batches(batches: &[&[InputEvent]]) -> Self {
            Self {
                batches: batches.iter().map(|b| b.to_vec()).collect(),
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn poll(&mut self) -> Vec<InputEvent> {
            self.batches.pop_front().unwrap_or_default()
        }
    }

    fn press(direction: StickDirection) -> InputEvent {
        InputEvent {
            action: StickAction::Pressed,
            direction,
        }
    }

    fn release(direction: StickDirection) -> InputEvent {
        InputEvent {
            action: StickAction::Released,
            direction,
        }
    }

    fn controller(
        sensors: FakeSensors,
        input: ScriptedInput,
    ) -> DisplayController<FakeSensors, RecordingDisplay, ScriptedInput> {
        let range = Range::new(0.0, 40.0).unwrap();
        let station =
            WeatherStation::new(sensors, RecordingDisplay::default(), StationConfig::new(range));
        DisplayController::new(
            station,
            input,
            CyclePacing::default(),
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap()
    }

    #[test]
    fn starts_in_auto_mode_on_the_graph_screen() {
        let ctl = controller(FakeSensors::steady(21.0, 50.0), ScriptedInput::quiet());
        assert_eq!(ctl.mode(), CycleMode::Auto);
        assert_eq!(ctl.current_screen(), "graph");
    }

    #[test]
    fn auto_mode_advances_every_tick() {
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), ScriptedInput::quiet());

        ctl.tick().unwrap();
        assert_eq!(ctl.current_screen(), "temperature");
        ctl.tick().unwrap();
        assert_eq!(ctl.current_screen(), "humidity");
        ctl.tick().unwrap();
        assert_eq!(ctl.current_screen(), "clock");
        ctl.tick().unwrap();
        assert_eq!(ctl.current_screen(), "graph");
    }

    #[test]
    fn right_press_advances_once_and_holds() {
        let input = ScriptedInput::with_batches(&[&[press(StickDirection::Right)]]);
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), input);

        ctl.tick().unwrap();
        assert_eq!(ctl.mode(), CycleMode::Hold);
        assert_eq!(ctl.current_screen(), "temperature");
        // Exactly one render happened: the manual advance suppressed
        // the timer advance in the same iteration.
        assert_eq!(ctl.station().display().calls.len(), 1);
    }

    #[test]
    fn hold_mode_refreshes_in_place() {
        let input = ScriptedInput::with_batches(&[&[press(StickDirection::Right)]]);
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), input);

        ctl.tick().unwrap();
        ctl.tick().unwrap();
        ctl.tick().unwrap();
        assert_eq!(ctl.current_screen(), "temperature");

        // One manual advance plus two refreshes, all on the same screen.
        let texts: Vec<_> = ctl
            .station()
            .display()
            .calls
            .iter()
            .filter(|c| matches!(c, DisplayCall::Text { .. }))
            .collect();
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn middle_press_resumes_auto_cycling() {
        let input = ScriptedInput::with_batches(&[
            &[press(StickDirection::Right)],
            &[press(StickDirection::Middle)],
        ]);
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), input);

        ctl.tick().unwrap();
        assert_eq!(ctl.mode(), CycleMode::Hold);

        // The middle press flips the mode and the timer advance resumes
        // in the same iteration.
        ctl.tick().unwrap();
        assert_eq!(ctl.mode(), CycleMode::Auto);
        assert_eq!(ctl.current_screen(), "humidity");
    }

    #[test]
    fn releases_and_other_directions_are_ignored() {
        let input = ScriptedInput::with_batches(&[&[
            release(StickDirection::Right),
            press(StickDirection::Up),
            press(StickDirection::Left),
            press(StickDirection::Down),
        ]]);
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), input);

        ctl.tick().unwrap();
        // Just the normal timer advance.
        assert_eq!(ctl.mode(), CycleMode::Auto);
        assert_eq!(ctl.current_screen(), "temperature");
    }

    #[test]
    fn events_in_one_batch_apply_in_arrival_order() {
        // right (hold+advance) then middle (back to auto): the mode
        // ends up Auto, but the manual advance already happened, so the
        // timer still stays quiet this iteration.
        let input = ScriptedInput::with_batches(&[&[
            press(StickDirection::Right),
            press(StickDirection::Middle),
        ]]);
        let mut ctl = controller(FakeSensors::steady(21.0, 50.0), input);

        ctl.tick().unwrap();
        assert_eq!(ctl.mode(), CycleMode::Auto);
        assert_eq!(ctl.current_screen(), "temperature");
        assert_eq!(ctl.station().display().calls.len(), 1);
    }

    #[test]
    fn shutdown_flag_stops_the_loop_with_a_farewell() {
        let running = Arc::new(AtomicBool::new(false));
        let range = Range::new(0.0, 40.0).unwrap();
        let station = WeatherStation::new(
            FakeSensors::steady(21.0, 50.0),
            RecordingDisplay::default(),
            StationConfig::new(range),
        );
        let mut ctl =
            DisplayController::new(station, ScriptedInput::quiet(), CyclePacing::default(), running)
                .unwrap();

        assert_eq!(ctl.tick().unwrap(), Tick::Shutdown);

        ctl.run().unwrap();
        let calls = &ctl.station().display().calls;
        assert_eq!(
            calls.last(),
            Some(&DisplayCall::Clear),
            "display must end dark"
        );
        assert!(calls.iter().any(|c| matches!(
            c,
            DisplayCall::Text { text, .. } if text == "Bye!"
        )));
    }

    #[test]
    fn render_failure_clears_the_display_and_surfaces() {
        let sensors = FakeSensors {
            temperature: 0.0,
            humidity: 0.0,
            failing: true,
        };
        let mut ctl = controller(sensors, ScriptedInput::quiet());

        let err = ctl.run().unwrap_err();
        assert!(matches!(err, SensorError::Temperature(_)));
        assert_eq!(
            ctl.station().display().calls,
            vec![DisplayCall::Clear],
            "nothing rendered, display cleared"
        );
    }
}
