//! Platform spawner
//!
//! Keeps a steady stream of platforms scrolling in from the right. Three zones
//! are laid out relative to the viewport:
//!
//! ```text
//!   despawn            viewport            spawn
//!  [-------]  ...  |<---------------->|  [-------]
//!                                      [buffer---]
//! ```
//!
//! On every maintenance period: if no live platform overlaps the buffer zone a
//! new one is placed in the spawn zone, and live platforms overlapping the
//! despawn zone are parked back in the pool along with their condiments.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{CollisionResult, HitAccuracy, ball_rect_collision};
use super::condiment::{Condiment, CondimentId, CondimentKind, CondimentReaction};
use super::difficulty::SpawnerConfig;
use super::error::SimError;
use super::gameplay::GameplayStateMachine;
use super::geometry::Rect;
use super::platform::{Platform, PlatformId};
use super::player::Player;
use super::pool::{Pool, Poolable};
use super::score::ScoreManager;
use super::state::GameEvent;
use super::timer::{IntervalTimer, ReenablePolicy, Scheduler, Task};
use crate::consts::{
    ACCURATE_SPIN, BOUNCE_VELOCITY, INPUT_REENABLE_DELAY, LEFT_MISS_SPIN, MAX_HIT_PARTICLES,
    NEUTRAL_SHADOW, RIGHT_MISS_SPIN, SPAWNER_PERIOD,
};
use crate::lerp_random;

/// Extra distance between the viewport's left edge and the despawn zone
const DESPAWN_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnZones {
    pub spawn: Rect,
    pub buffer: Rect,
    pub despawn: Rect,
}

impl SpawnZones {
    pub fn compute(viewport: Vec2, config: &SpawnerConfig) -> Self {
        let (min_gap, max_gap) = (config.min_gap, config.max_gap);
        let spawn_width = max_gap - min_gap;

        Self {
            spawn: Rect::new(
                Vec2::new(viewport.x + min_gap + spawn_width * 0.5, viewport.y * 0.5),
                Vec2::new(spawn_width, viewport.y),
            ),
            buffer: Rect::new(
                Vec2::new(viewport.x + max_gap * 0.5, viewport.y * 0.5),
                Vec2::new(max_gap, viewport.y),
            ),
            despawn: Rect::from_edges(
                -max_gap - min_gap - DESPAWN_MARGIN,
                0.0,
                -min_gap - DESPAWN_MARGIN,
                viewport.y * 10.0,
            ),
        }
    }
}

/// Which path pushed velocity and shadow colour to the platforms after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePush {
    /// A gameplay transition happened and its change notification did the push
    Transition,
    /// No transition; the spawner pushed the unchanged state itself
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub platform: PlatformId,
    pub accuracy: HitAccuracy,
    pub coins_collected: u32,
    /// A hazard ended the run; bounce and scoring were skipped
    pub game_over: bool,
    pub state_push: Option<StatePush>,
}

/// Everything a hit touches outside the spawner
pub struct HitContext<'a> {
    pub player: &'a mut Player,
    pub score: &'a mut ScoreManager,
    pub gameplay: &'a mut GameplayStateMachine,
    pub scheduler: &'a mut Scheduler,
    pub reenable_policy: ReenablePolicy,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Debug, Clone)]
pub struct PlatformSpawner {
    viewport: Vec2,
    config: SpawnerConfig,
    zones: SpawnZones,
    platforms: Pool<Platform>,
    condiments: BTreeMap<CondimentKind, Pool<Condiment>>,
    timer: IntervalTimer,
    rng: Pcg32,
    /// Colour read at the last state push; new spawns reuse it
    shadow_color: u32,
    /// Platform hits this run; progress metric in beatmap mode
    hits: u64,
}

impl PlatformSpawner {
    pub fn new(
        viewport: Vec2,
        config: SpawnerConfig,
        platform_pool: usize,
        condiment_pool: usize,
        seed: u64,
    ) -> Result<Self, SimError> {
        if !viewport.is_finite() || viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Err(SimError::InvalidConfig("viewport must be positive"));
        }
        config.validate()?;

        let condiments = CondimentKind::ALL
            .into_iter()
            .map(|kind| (kind, Pool::new(condiment_pool, |_| Condiment::new(kind))))
            .collect();

        Ok(Self {
            viewport,
            zones: SpawnZones::compute(viewport, &config),
            config,
            platforms: Pool::new(platform_pool, |i| Platform::new(PlatformId(i))),
            condiments,
            timer: IntervalTimer::new(SPAWNER_PERIOD),
            rng: Pcg32::seed_from_u64(seed),
            shadow_color: NEUTRAL_SHADOW,
            hits: 0,
        })
    }

    /// Swap in a new difficulty tier and recompute zone geometry
    pub fn set_config(&mut self, config: SpawnerConfig) -> Result<(), SimError> {
        config.validate()?;
        self.zones = SpawnZones::compute(self.viewport, &config);
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn zones(&self) -> &SpawnZones {
        &self.zones
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(id.0)
    }

    pub fn active_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter_active().map(|(_, p)| p)
    }

    pub fn condiment(&self, id: CondimentId) -> Option<&Condiment> {
        self.condiments.get(&id.kind).and_then(|pool| pool.get(id.index))
    }

    pub fn active_condiments(&self) -> impl Iterator<Item = &Condiment> {
        self.condiments
            .values()
            .flat_map(|pool| pool.iter_active().map(|(_, c)| c))
    }

    /// Move platforms and carry their condiments along
    pub fn step(&mut self, dt: f32) {
        for (_, platform) in self.platforms.iter_active_mut() {
            platform.step(dt);
        }
        for pool in self.condiments.values_mut() {
            for (_, condiment) in pool.iter_active_mut() {
                let parent = condiment.parent().and_then(|id| self.platforms.get(id.0));
                if let Some(platform) = parent {
                    condiment.follow(&platform.rect);
                }
            }
        }
    }

    /// Run the maintenance pass once per elapsed period
    pub fn update(
        &mut self,
        dt: Duration,
        gameplay: &GameplayStateMachine,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        for _ in 0..self.timer.advance(dt) {
            self.maintain(gameplay, events)?;
        }
        Ok(())
    }

    pub fn maintain(
        &mut self,
        gameplay: &GameplayStateMachine,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), SimError> {
        let buffer = self.zones.buffer;
        let buffer_occupied = self.active_platforms().any(|p| p.rect.overlaps(&buffer));
        if !buffer_occupied {
            self.spawn(gameplay, events)?;
        }

        let despawn = self.zones.despawn;
        let expired: Vec<PlatformId> = self
            .active_platforms()
            .filter(|p| p.rect.overlaps(&despawn))
            .map(|p| p.id)
            .collect();
        for id in expired {
            self.despawn(id, events);
        }
        Ok(())
    }

    /// Place a random platform in the spawn zone, with condiments rolled per kind
    pub fn spawn(
        &mut self,
        gameplay: &GameplayStateMachine,
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<PlatformId>, SimError> {
        let c = &self.config;
        let spawn = self.zones.spawn;
        let center = Vec2::new(
            lerp_random(self.rng.random(), spawn.left(), spawn.right()),
            lerp_random(self.rng.random(), c.min_height, c.max_height),
        );
        let size = Vec2::new(
            lerp_random(self.rng.random(), c.min_platform_width, c.max_platform_width),
            lerp_random(self.rng.random(), c.min_platform_height, c.max_platform_height),
        );

        let Some(id) = self.spawn_at(center, size, gameplay, events)? else {
            return Ok(None);
        };

        for kind in CondimentKind::ALL {
            let roll: f32 = self.rng.random();
            if roll < self.config.condiment_probability.get(kind) {
                self.attach_condiment(id, kind, events);
            }
        }
        Ok(Some(id))
    }

    /// Place a platform at an exact spot. Pool exhaustion is logged and skipped.
    pub fn spawn_at(
        &mut self,
        center: Vec2,
        size: Vec2,
        gameplay: &GameplayStateMachine,
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<PlatformId>, SimError> {
        let rect = Rect::new(center, size);
        if !rect.is_finite() {
            return Err(SimError::UndefinedExtents("spawned platform"));
        }

        let Some(index) = self.platforms.acquire() else {
            log::warn!("Platform pool exhausted, skipping spawn");
            return Ok(None);
        };
        let velocity = gameplay.platform_velocity();
        let platform = self
            .platforms
            .get_mut(index)
            .ok_or(SimError::InactivePlatform(index))?;
        platform.reset_config(center, size, &self.config);
        platform.set_scroll_velocity(velocity);
        platform.set_shadow_color(self.shadow_color);

        log::debug!("Spawned platform {index} at ({:.0}, {:.0})", center.x, center.y);
        events.push(GameEvent::PlatformSpawned {
            id: PlatformId(index),
            rect,
        });
        Ok(Some(PlatformId(index)))
    }

    /// First platform under the player's start position
    pub fn prespawn(
        &mut self,
        gameplay: &GameplayStateMachine,
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<PlatformId>, SimError> {
        let center = Vec2::new(self.viewport.x * 0.5, self.viewport.y * 2.0 / 3.0);
        let size = Vec2::new(self.config.max_platform_width, self.config.max_platform_height);
        self.spawn_at(center, size, gameplay, events)
    }

    fn attach_condiment(
        &mut self,
        platform_id: PlatformId,
        kind: CondimentKind,
        events: &mut Vec<GameEvent>,
    ) -> Option<CondimentId> {
        let platform = self
            .platforms
            .get_mut(platform_id.0)
            .filter(|p| p.is_active())?;
        let pool = self.condiments.get_mut(&kind)?;
        let Some(index) = pool.acquire() else {
            log::warn!("Condiment pool `{kind}` exhausted, skipping attach");
            return None;
        };

        let id = CondimentId { kind, index };
        if let Some(condiment) = pool.get_mut(index) {
            condiment.attach(platform_id, &platform.rect);
        }
        platform.attach(id);
        events.push(GameEvent::CondimentAttached {
            id,
            platform: platform_id,
        });
        Some(id)
    }

    fn release_condiment(&mut self, id: CondimentId, events: &mut Vec<GameEvent>) {
        if let Some(pool) = self.condiments.get_mut(&id.kind) {
            if let Some(condiment) = pool.get_mut(id.index) {
                condiment.detach();
            }
            if pool.release(id.index) {
                events.push(GameEvent::CondimentReleased { id });
            }
        }
    }

    /// Park a platform and everything riding on it
    pub fn despawn(&mut self, id: PlatformId, events: &mut Vec<GameEvent>) {
        let attached = match self.platforms.get_mut(id.0) {
            Some(platform) if platform.is_active() => platform.detach_all(),
            _ => return,
        };
        for condiment in attached {
            self.release_condiment(condiment, events);
        }
        self.platforms.release(id.0);
        log::debug!("Despawned platform {}", id.0);
        events.push(GameEvent::PlatformDespawned { id });
    }

    /// Push the current scroll velocity and shadow colour to every live platform
    pub fn update_platform_states(&mut self, gameplay: &mut GameplayStateMachine) {
        let velocity = gameplay.platform_velocity();
        self.shadow_color = gameplay.next_platform_shadow_color();
        for (_, platform) in self.platforms.iter_active_mut() {
            platform.set_scroll_velocity(velocity);
            platform.set_shadow_color(self.shadow_color);
        }
    }

    pub fn shadow_color(&self) -> u32 {
        self.shadow_color
    }

    /// First live platform touching the player, in slot order
    pub fn find_contact(&self, player: &Player) -> Option<(PlatformId, CollisionResult)> {
        self.active_platforms().find_map(|p| {
            let result = ball_rect_collision(player.pos, player.radius, &p.rect);
            result.hit.then_some((p.id, result))
        })
    }

    /// Resolve the player landing on `id`.
    ///
    /// Order: start the run if still static, judge and recolour the platform,
    /// let condiments react, score, bounce with input suppressed, spin, emit
    /// particles, then move the gameplay state and push it to the platforms
    /// exactly once.
    pub fn resolve_hit(
        &mut self,
        id: PlatformId,
        ctx: HitContext<'_>,
    ) -> Result<HitOutcome, SimError> {
        let (player_left, player_right) = ctx.player.horizontal_extent();
        let accuracy = self
            .platforms
            .get(id.0)
            .ok_or(SimError::InactivePlatform(id.0))?
            .judge(player_left, player_right)?;

        ctx.gameplay.start();

        if let Some(platform) = self.platforms.get_mut(id.0) {
            platform.apply_collision(accuracy);
        }
        self.hits += 1;
        ctx.events.push(GameEvent::PlatformHit {
            id,
            accurate: accuracy.accurate,
            left: accuracy.left,
        });

        let mut outcome = HitOutcome {
            platform: id,
            accuracy,
            coins_collected: 0,
            game_over: false,
            state_push: None,
        };

        let attached: Vec<CondimentId> = self
            .platforms
            .get(id.0)
            .map(|p| p.condiments().to_vec())
            .unwrap_or_default();
        for condiment in attached {
            let reaction = condiment.kind.react(accuracy);
            match reaction {
                CondimentReaction::CollectCoin => {
                    let coins = ctx.score.add_coin();
                    outcome.coins_collected += 1;
                    ctx.events.push(GameEvent::CoinCollected { coins });
                }
                CondimentReaction::GameOver => outcome.game_over = true,
                CondimentReaction::Consumed | CondimentReaction::None => {}
            }
            if reaction.consumes() {
                if let Some(platform) = self.platforms.get_mut(id.0) {
                    platform.detach(condiment);
                }
                self.release_condiment(condiment, ctx.events);
            }
        }
        if outcome.game_over {
            return Ok(outcome);
        }

        ctx.score.try_add_score(accuracy.accurate);
        ctx.events.push(GameEvent::ScoreChanged(ctx.score.snapshot()));

        ctx.player.set_ignore_input(true);
        if ctx.reenable_policy == ReenablePolicy::Reschedule {
            ctx.scheduler.cancel_task(Task::ReenableInput);
        }
        ctx.scheduler.schedule(INPUT_REENABLE_DELAY, Task::ReenableInput);
        ctx.player.bounce(BOUNCE_VELOCITY);

        let spin: f32 = self.rng.random();
        match (accuracy.accurate, accuracy.left) {
            (true, _) => ctx.player.angular_vel += spin * ACCURATE_SPIN,
            (false, true) => ctx.player.angular_vel = -spin * LEFT_MISS_SPIN,
            (false, false) => ctx.player.angular_vel += spin * RIGHT_MISS_SPIN,
        }

        let particles = (self.rng.random::<f32>() * MAX_HIT_PARTICLES) as u32;
        ctx.events.push(GameEvent::Particles {
            count: particles,
            pos: ctx.player.pos,
        });

        if accuracy.accurate {
            ctx.gameplay.accelerate();
        } else {
            ctx.gameplay.decelerate();
        }

        let changes = ctx.gameplay.take_changes();
        for change in &changes {
            ctx.events.push(GameEvent::StateChanged(*change));
        }
        ctx.player.set_state_acceleration(ctx.gameplay.player_acceleration());
        self.update_platform_states(ctx.gameplay);
        outcome.state_push = Some(if changes.is_empty() {
            StatePush::Manual
        } else {
            StatePush::Transition
        });

        Ok(outcome)
    }
}
