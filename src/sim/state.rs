//! Game state and core simulation types
//!
//! [`GameState`] owns one run: the player, the platform spawner, both state
//! machines, score and the deferred-task scheduler.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::condiment::CondimentId;
use super::difficulty::DifficultyManager;
use super::error::SimError;
use super::gameplay::{
    DEFAULT_SHADOW_PALETTE, GameplayState, GameplayStateMachine, ShadowPalette, StateChange,
};
use super::geometry::Rect;
use super::mode::{GameMode, GameModeStateMachine, ProgressWatch};
use super::platform::PlatformId;
use super::player::Player;
use super::score::{ScoreChanged, ScoreManager};
use super::spawner::PlatformSpawner;
use super::timer::{ReenablePolicy, Scheduler};
use crate::consts::*;
use crate::persistence::{PersistenceError, PlayerDataStore};
use crate::platform::KeyValueStore;

/// Tunables for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub viewport: Vec2,
    pub seed: u64,
    pub gravity: f32,
    pub platform_pool: usize,
    pub condiment_pool: usize,
    pub shadow_palette: Vec<Vec<u32>>,
    pub reenable_policy: ReenablePolicy,
    /// Height above the first platform's top edge where the player starts
    pub player_start_clearance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            seed: 0,
            gravity: GRAVITY,
            platform_pool: PLATFORM_POOL_SIZE,
            condiment_pool: CONDIMENT_POOL_SIZE,
            shadow_palette: DEFAULT_SHADOW_PALETTE.iter().map(|row| row.to_vec()).collect(),
            reenable_policy: ReenablePolicy::default(),
            player_start_clearance: 400.0,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Things presentation collaborators react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlatformSpawned { id: PlatformId, rect: Rect },
    PlatformDespawned { id: PlatformId },
    CondimentAttached { id: CondimentId, platform: PlatformId },
    CondimentReleased { id: CondimentId },
    PlatformHit { id: PlatformId, accurate: bool, left: bool },
    ScoreChanged(ScoreChanged),
    CoinCollected { coins: u64 },
    StateChanged(StateChange),
    TierAdvanced { tier: usize, progress: u64 },
    Particles { count: u32, pos: Vec2 },
    GameOver { score: u64, high_score: u64 },
    /// Player should fade out
    PlayerFadeOut,
}

/// Complete state of one run
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub mode: GameModeStateMachine,
    pub difficulty: DifficultyManager,
    pub gameplay: GameplayStateMachine,
    pub score: ScoreManager,
    pub spawner: PlatformSpawner,
    pub player: Player,
    pub scheduler: Scheduler,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pointer level seen on the previous tick, for edge detection
    pub(crate) pointer_was_down: bool,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig, mode: GameMode, score: ScoreManager) -> Result<Self, SimError> {
        let palette = ShadowPalette::new(config.shadow_palette.clone())?;
        let gameplay = GameplayStateMachine::new(GameplayState::Static, palette);
        let mode = GameModeStateMachine::new(mode);
        let mut difficulty = mode.difficulty_manager();
        let spawner_config = difficulty.update_tier(0).clone();

        let mut spawner = PlatformSpawner::new(
            config.viewport,
            spawner_config,
            config.platform_pool,
            config.condiment_pool,
            config.seed,
        )?;

        let mut events = Vec::new();
        let start_y = match spawner.prespawn(&gameplay, &mut events)? {
            Some(id) => spawner
                .platform(id)
                .map(|p| p.rect.top())
                .unwrap_or(config.viewport.y * 2.0 / 3.0),
            None => config.viewport.y * 2.0 / 3.0,
        };
        let player = Player::new(Vec2::new(
            config.viewport.x * 0.5,
            start_y - config.player_start_clearance,
        ));

        log::info!(
            "New {} run (seed {}, high score {})",
            mode.mode().name(),
            config.seed,
            score.high_score()
        );

        Ok(Self {
            config,
            mode,
            difficulty,
            gameplay,
            score,
            spawner,
            player,
            scheduler: Scheduler::new(),
            time_ticks: 0,
            pointer_was_down: false,
            events,
        })
    }

    /// Start a run seeded with the persisted high score and coins
    pub fn from_store<S: KeyValueStore>(
        config: GameConfig,
        mode: GameMode,
        store: &PlayerDataStore<S>,
    ) -> Result<Self, SimError> {
        Self::new(config, mode, ScoreManager::load_score(store))
    }

    pub fn world_bounds(&self) -> Rect {
        Rect::new(self.config.viewport * 0.5, self.config.viewport)
    }

    pub fn is_over(&self) -> bool {
        self.gameplay.state().is_terminal()
    }

    /// Current value of the mode's progress metric
    pub fn progress(&self) -> u64 {
        match self.mode.progress_watch() {
            ProgressWatch::Score => self.score.score(),
            ProgressWatch::Hits => self.spawner.hits(),
        }
    }

    /// Feed progress to the difficulty manager and reconfigure on a new tier
    pub fn update_difficulty(&mut self) -> Result<(), SimError> {
        let progress = self.progress();
        let before = self.difficulty.tier_index();
        let config = self.difficulty.update_tier(progress).clone();
        let tier = self.difficulty.tier_index();
        if tier != before {
            self.spawner.set_config(config)?;
            self.events.push(GameEvent::TierAdvanced { tier, progress });
        }
        Ok(())
    }

    /// Forward queued gameplay transitions to listeners of the event stream and
    /// to the platforms
    pub fn sync_gameplay(&mut self) {
        let changes = self.gameplay.take_changes();
        if changes.is_empty() {
            return;
        }
        for change in changes {
            self.events.push(GameEvent::StateChanged(change));
        }
        self.player
            .set_state_acceleration(self.gameplay.player_acceleration());
        self.spawner.update_platform_states(&mut self.gameplay);
    }

    /// Terminal: freeze the player and stop the world
    pub fn end_run(&mut self) {
        if !self.gameplay.game_over() {
            return;
        }
        self.player.freeze();
        self.scheduler = Scheduler::new();
        self.sync_gameplay();
        log::info!(
            "Game over: score {} (high score {})",
            self.score.score(),
            self.score.high_score()
        );
        self.events.push(GameEvent::GameOver {
            score: self.score.score(),
            high_score: self.score.high_score(),
        });
        self.events.push(GameEvent::PlayerFadeOut);
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Persist high score and coins
    pub fn save<S: KeyValueStore>(
        &self,
        store: &mut PlayerDataStore<S>,
    ) -> Result<(), PersistenceError> {
        self.score.save_score(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn test_new_run_layout() {
        let mut state =
            GameState::new(GameConfig::with_seed(1), GameMode::Endless, ScoreManager::default())
                .expect("valid config");
        assert_eq!(state.gameplay.state(), GameplayState::Static);
        assert_eq!(state.spawner.active_platforms().count(), 1);

        let platform = state.spawner.active_platforms().next().expect("prespawned");
        assert_eq!(platform.rect.center.x, state.player.pos.x);
        assert_eq!(
            state.player.pos.y,
            platform.rect.top() - state.config.player_start_clearance
        );

        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::PlatformSpawned { .. }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_bad_palette_rejected() {
        let config = GameConfig {
            shadow_palette: vec![],
            ..GameConfig::default()
        };
        assert!(GameState::new(config, GameMode::Endless, ScoreManager::default()).is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"seed": 9}"#).expect("partial config");
        assert_eq!(config.seed, 9);
        assert_eq!(config.platform_pool, PLATFORM_POOL_SIZE);
        assert_eq!(config.reenable_policy, ReenablePolicy::Overlap);
    }

    #[test]
    fn test_end_run_is_terminal() {
        let mut state =
            GameState::new(GameConfig::default(), GameMode::Endless, ScoreManager::default())
                .expect("valid config");
        state.drain_events();
        state.end_run();
        state.end_run();
        let events = state.drain_events();
        let overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert!(state.is_over());
        assert!(!state.player.body_enabled());
    }

    #[test]
    fn test_tier_advances_with_score() {
        let mut state =
            GameState::new(GameConfig::default(), GameMode::Endless, ScoreManager::default())
                .expect("valid config");
        for _ in 0..50 {
            state.score.try_add_score(false);
        }
        state.update_difficulty().expect("valid tier");
        assert_eq!(state.difficulty.tier_index(), 1);
        assert_eq!(state.spawner.config().required_accuracy, 0.6);
    }

    #[test]
    fn test_save_and_reload() {
        let mut store = PlayerDataStore::load(MemoryStorage::new());
        let mut state = GameState::from_store(GameConfig::default(), GameMode::Endless, &store)
            .expect("valid config");
        state.score.try_add_score(true);
        state.score.add_coin();
        state.save(&mut store).expect("save");

        let state = GameState::from_store(GameConfig::default(), GameMode::Endless, &store)
            .expect("valid config");
        assert_eq!(state.score.high_score(), 1);
        assert_eq!(state.score.coins(), 1);
    }
}
