//! Bounce Rush - an endless-runner bouncing ball arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platform spawning, accuracy scoring, state machines)
//! - `persistence`: Player data save/load with defaults merge
//! - `platform`: Browser/native platform abstraction (storage, logging)
//! - `settings`: Player preferences
//! - `skins`: Ball skin catalogue and purchases

pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod skins;

pub use persistence::{PlayerData, PlayerDataAction, PlayerDataStore};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation timestep (60 Hz, one physics step per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Viewport dimensions (portrait, y axis points down)
    pub const VIEWPORT_WIDTH: f32 = 1080.0;
    pub const VIEWPORT_HEIGHT: f32 = 1920.0;

    /// Period of the spawner maintenance pass, decoupled from the physics step
    pub const SPAWNER_PERIOD: Duration = Duration::from_millis(50);
    /// Delay before player input is accepted again after a bounce
    pub const INPUT_REENABLE_DELAY: Duration = Duration::from_millis(200);

    /// Upward speed given to the player on every platform hit
    pub const BOUNCE_VELOCITY: f32 = 1000.0;
    /// Downward speed a platform picks up after being hit
    pub const PLATFORM_SINK_VELOCITY: f32 = 400.0;

    /// World gravity, enabled on the first pointer press (pixels/s²)
    pub const GRAVITY: f32 = 1500.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 40.0;
    pub const PLAYER_MASS: f32 = 1.0;

    /// Pool capacities
    pub const PLATFORM_POOL_SIZE: usize = 20;
    pub const CONDIMENT_POOL_SIZE: usize = 20;

    /// Spin impulses on hit (degrees/s, scaled by a uniform random factor)
    pub const ACCURATE_SPIN: f32 = 400.0;
    pub const LEFT_MISS_SPIN: f32 = 300.0;
    pub const RIGHT_MISS_SPIN: f32 = 200.0;

    /// Upper bound on particles emitted per hit
    pub const MAX_HIT_PARTICLES: f32 = 10.0;

    /// Shadow colour used outside of the accelerated state
    pub const NEUTRAL_SHADOW: u32 = 0xeeeeee;
}

/// Uniform random value in `[min, max)`, collapsing to `min` for an empty range
#[inline]
pub fn lerp_random(t: f32, min: f32, max: f32) -> f32 {
    t * (max - min) + min
}
