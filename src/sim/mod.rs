//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod condiment;
pub mod difficulty;
pub mod dynamics;
pub mod error;
pub mod events;
pub mod gameplay;
pub mod geometry;
pub mod mode;
pub mod platform;
pub mod player;
pub mod pool;
pub mod score;
pub mod shape;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{CollisionResult, HitAccuracy, ball_rect_collision, hit_accuracy};
pub use condiment::{Condiment, CondimentId, CondimentKind, CondimentReaction};
pub use difficulty::{
    CondimentProbability, DifficultyManager, DifficultyRubrics, PartialSpawnerConfig,
    PlatformColors, SpawnerConfig,
};
pub use dynamics::{ScalarDynamics, SecondOrderDynamics, VectorDynamics};
pub use error::SimError;
pub use events::{ListenerId, Observers};
pub use gameplay::{GameplayState, GameplayStateMachine, ShadowPalette, StateChange};
pub use geometry::Rect;
pub use mode::{Beatmap, BeatmapError, GameMode, GameModeStateMachine, ProgressWatch};
pub use platform::{Platform, PlatformId, Zones};
pub use player::Player;
pub use pool::{Pool, PoolState, Poolable};
pub use score::{ScoreChanged, ScoreManager};
pub use shape::{BreathingShape, Direction, ShapeState};
pub use spawner::{HitContext, HitOutcome, PlatformSpawner, SpawnZones, StatePush};
pub use state::{GameConfig, GameEvent, GameState};
pub use tick::{TickInput, tick};
pub use timer::{IntervalTimer, ReenablePolicy, Scheduler, Task};
