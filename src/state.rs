//! Screen state machine: the ordered list of display modes and the
//! index of the one currently showing.
//!
//! A [`Screen`] wraps exactly one render action; the [`StateManager`]
//! only does index bookkeeping and delegation. The render actions take
//! their context explicitly instead of closing over shared mutable
//! state, which is what keeps the single-writer story simple.

use crate::{ConfigError, SensorError};

/// Boxed render action for one screen. `C` is whatever context the
/// actions need (in production, the station with its sensors and
/// display; in tests, anything).
pub type RenderAction<C> = Box<dyn FnMut(&mut C) -> Result<(), SensorError>>;

/// One selectable display mode: a name plus its render action.
/// Immutable once constructed; invoking it is the only thing it does.
pub struct Screen<C> {
    name: &'static str,
    render: RenderAction<C>,
}

impl<C> Screen<C> {
    pub fn new(name: &'static str, render: RenderAction<C>) -> Self {
        Self { name, render }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the wrapped render action.
    pub fn apply(&mut self, ctx: &mut C) -> Result<(), SensorError> {
        (self.render)(ctx)
    }
}

/// Cycles through a fixed, non-empty list of screens.
///
/// `current` always satisfies `0 <= current < screens.len()`; `advance`
/// wraps with modular arithmetic, so no operation can move it out of
/// bounds once construction has succeeded.
pub struct StateManager<C> {
    screens: Vec<Screen<C>>,
    current: usize,
}

impl<C> StateManager<C> {
    /// Fails with [`ConfigError::NoScreens`] on an empty list; with at
    /// least one screen, no later operation can fail on its own.
    pub fn new(screens: Vec<Screen<C>>) -> Result<Self, ConfigError> {
        if screens.is_empty() {
            return Err(ConfigError::NoScreens);
        }
        Ok(Self {
            screens,
            current: 0,
        })
    }

    /// Index of the active screen.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Name of the active screen, for logging.
    pub fn current_name(&self) -> &'static str {
        self.screens[self.current].name()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Move to the next screen (wrapping) and render it.
    pub fn advance(&mut self, ctx: &mut C) -> Result<(), SensorError> {
        self.current = (self.current + 1) % self.screens.len();
        tracing::debug!(screen = self.current_name(), "advancing");
        self.screens[self.current].apply(ctx)
    }

    /// Re-render the active screen without moving the index. Used to
    /// repaint the same mode with fresh sensor data.
    pub fn refresh(&mut self, ctx: &mut C) -> Result<(), SensorError> {
        self.screens[self.current].apply(ctx)
    }
}

// ── Tests ──────────────────────────────────────────────────────────
