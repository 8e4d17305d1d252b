//! Game modes
//!
//! The mode decides which rubric table drives difficulty and which progress
//! metric is fed to it: endless runs use the score, beatmaps count platform hits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::difficulty::{DifficultyManager, DifficultyRubrics, PartialSpawnerConfig};
use super::error::SimError;
use super::events::{ListenerId, Observers};

#[derive(Debug, Error)]
pub enum BeatmapError {
    #[error("malformed beatmap: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("beatmap has no name")]
    MissingName,
    #[error("invalid beatmap rubrics: {0}")]
    Rubrics(#[from] SimError),
}

/// Level data supplying its own difficulty curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Beatmap {
    pub name: String,
    pub rubrics: DifficultyRubrics,
}

#[derive(Deserialize)]
struct RawBeatmap {
    name: String,
    rubrics: BTreeMap<u64, PartialSpawnerConfig>,
}

impl Beatmap {
    /// Parse `{"name": .., "rubrics": {"<threshold>": {..}}}`
    pub fn from_json(json: &str) -> Result<Self, BeatmapError> {
        let raw: RawBeatmap = serde_json::from_str(json)?;
        if raw.name.trim().is_empty() {
            return Err(BeatmapError::MissingName);
        }
        Ok(Self {
            name: raw.name,
            rubrics: DifficultyRubrics::new(raw.rubrics)?,
        })
    }
}

/// Metric fed to the difficulty manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressWatch {
    Score,
    Hits,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameMode {
    Endless,
    Beatmap(Beatmap),
}

impl GameMode {
    pub fn name(&self) -> &str {
        match self {
            GameMode::Endless => "endless",
            GameMode::Beatmap(beatmap) => &beatmap.name,
        }
    }

    pub fn rubrics(&self) -> DifficultyRubrics {
        match self {
            GameMode::Endless => DifficultyRubrics::default_endless(),
            GameMode::Beatmap(beatmap) => beatmap.rubrics.clone(),
        }
    }

    pub fn progress_watch(&self) -> ProgressWatch {
        match self {
            GameMode::Endless => ProgressWatch::Score,
            GameMode::Beatmap(_) => ProgressWatch::Hits,
        }
    }
}

/// Holds the active mode and notifies on changes
#[derive(Debug)]
pub struct GameModeStateMachine {
    mode: GameMode,
    listeners: Observers<GameMode>,
}

impl GameModeStateMachine {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            listeners: Observers::new(),
        }
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn change_mode(&mut self, mode: GameMode) {
        log::info!("Game mode {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.listeners.emit(&self.mode);
    }

    /// Fresh difficulty cursor over the active mode's table
    pub fn difficulty_manager(&self) -> DifficultyManager {
        DifficultyManager::new(self.mode.rubrics())
    }

    pub fn progress_watch(&self) -> ProgressWatch {
        self.mode.progress_watch()
    }

    pub fn on_mode_change(&mut self, callback: impl FnMut(&GameMode) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
