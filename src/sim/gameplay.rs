//! Gameplay state machine
//!
//! Four states drive how hard the player is pushed, how fast platforms scroll
//! and which shadow colour new platforms get:
//!
//! ```text
//! Static --hit--> Playing --accurate--> PlayingAccelerated
//!                    ^                        |
//!                    +-------inaccurate-------+
//! any --out of bounds / hazard--> GameOver (terminal)
//! ```

use serde::{Deserialize, Serialize};

use super::error::SimError;
use super::events::{ListenerId, Observers};
use crate::consts::NEUTRAL_SHADOW;

/// Shadow colours cycled through while accelerated
pub const DEFAULT_SHADOW_PALETTE: [[u32; 4]; 2] = [
    [0xff8888, 0xffbb88, 0xffff88, 0x88ff88],
    [0x88ffff, 0x8888ff, 0xbb88ff, 0xff88ff],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameplayState {
    /// Waiting for the first landing; nothing scrolls
    Static,
    Playing,
    PlayingAccelerated,
    /// Run ended
    GameOver,
}

impl GameplayState {
    /// Per-step acceleration applied while the pointer is held
    pub fn player_acceleration(&self) -> f32 {
        match self {
            GameplayState::Static | GameplayState::GameOver => 0.0,
            GameplayState::Playing | GameplayState::PlayingAccelerated => 200.0,
        }
    }

    /// Horizontal platform scroll velocity (pixels/s, negative is leftward)
    pub fn platform_velocity(&self) -> f32 {
        match self {
            GameplayState::Static | GameplayState::GameOver => 0.0,
            GameplayState::Playing => -550.0,
            GameplayState::PlayingAccelerated => -650.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GameplayState::GameOver)
    }
}

/// Row-major cursor over a colour matrix.
///
/// Serializes as the bare matrix; deserializing validates it and starts the
/// cursor at (0, 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct ShadowPalette {
    colors: Vec<Vec<u32>>,
    row: usize,
    col: usize,
}

impl Default for ShadowPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_SHADOW_PALETTE.iter().map(|row| row.to_vec()).collect(),
            row: 0,
            col: 0,
        }
    }
}

impl ShadowPalette {
    pub fn new(colors: Vec<Vec<u32>>) -> Result<Self, SimError> {
        if colors.is_empty() || colors.iter().any(|row| row.is_empty()) {
            return Err(SimError::InvalidConfig("shadow palette needs at least one colour per row"));
        }
        Ok(Self {
            colors,
            row: 0,
            col: 0,
        })
    }

    /// Return the colour under the cursor and advance, wrapping after the last cell
    pub fn next_color(&mut self) -> u32 {
        let color = self.colors[self.row][self.col];

        self.col += 1;
        if self.col >= self.colors[self.row].len() {
            self.col = 0;
            self.row += 1;
            if self.row >= self.colors.len() {
                self.row = 0;
            }
        }

        color
    }

    pub fn reset(&mut self) {
        self.row = 0;
        self.col = 0;
    }
}

impl TryFrom<Vec<Vec<u32>>> for ShadowPalette {
    type Error = SimError;

    fn try_from(colors: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<ShadowPalette> for Vec<Vec<u32>> {
    fn from(palette: ShadowPalette) -> Self {
        palette.colors
    }
}

/// A completed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: GameplayState,
    pub to: GameplayState,
}

/// Holds the current state, the palette cursor and change listeners.
///
/// Listeners run synchronously in registration order. Changes are also queued
/// for in-simulation consumers, drained with [`GameplayStateMachine::take_changes`].
#[derive(Debug)]
pub struct GameplayStateMachine {
    state: GameplayState,
    palette: ShadowPalette,
    listeners: Observers<StateChange>,
    pending: Vec<StateChange>,
}

impl GameplayStateMachine {
    pub fn new(initial: GameplayState, palette: ShadowPalette) -> Self {
        Self {
            state: initial,
            palette,
            listeners: Observers::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> GameplayState {
        self.state
    }

    /// Move to `to`. Returns false (and changes nothing) when already there or
    /// when the run is over.
    pub fn change_state(&mut self, to: GameplayState) -> bool {
        if self.state.is_terminal() {
            log::warn!("Ignoring transition to {to:?}: run already over");
            return false;
        }
        if self.state == to {
            log::warn!("Ignoring transition to {to:?}: already in that state");
            return false;
        }

        let change = StateChange {
            from: self.state,
            to,
        };
        self.state = to;
        if to == GameplayState::PlayingAccelerated {
            self.palette.reset();
        }

        log::debug!("Gameplay state {:?} -> {:?}", change.from, change.to);
        self.listeners.emit(&change);
        self.pending.push(change);
        true
    }

    /// First landing starts the run
    pub fn start(&mut self) -> bool {
        self.state == GameplayState::Static && self.change_state(GameplayState::Playing)
    }

    /// Accurate hit while playing
    pub fn accelerate(&mut self) -> bool {
        self.state == GameplayState::Playing && self.change_state(GameplayState::PlayingAccelerated)
    }

    /// Inaccurate hit while accelerated
    pub fn decelerate(&mut self) -> bool {
        self.state == GameplayState::PlayingAccelerated && self.change_state(GameplayState::Playing)
    }

    pub fn game_over(&mut self) -> bool {
        self.change_state(GameplayState::GameOver)
    }

    pub fn player_acceleration(&self) -> f32 {
        self.state.player_acceleration()
    }

    pub fn platform_velocity(&self) -> f32 {
        self.state.platform_velocity()
    }

    /// Shadow colour for the next platform update; only cycles while accelerated
    pub fn next_platform_shadow_color(&mut self) -> u32 {
        match self.state {
            GameplayState::PlayingAccelerated => self.palette.next_color(),
            _ => NEUTRAL_SHADOW,
        }
    }

    pub fn on_state_change(&mut self, callback: impl FnMut(&StateChange) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Drain transitions not yet seen by in-sim consumers
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.pending)
    }
}
