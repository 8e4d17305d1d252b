//! Platform entity
//!
//! A platform is split horizontally into three zones. The main zone sits in the
//! middle and spans `required_accuracy * width`; the two side zones share the
//! rest equally. Landings are judged against the main zone.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{HitAccuracy, hit_accuracy};
use super::condiment::CondimentId;
use super::difficulty::{PlatformColors, SpawnerConfig};
use super::error::SimError;
use super::geometry::Rect;
use super::pool::{PoolState, Poolable};
use crate::consts::{NEUTRAL_SHADOW, PLATFORM_SINK_VELOCITY};

/// Slot index into the platform pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub usize);

/// Left / main / right split of a platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zones {
    pub left: Rect,
    pub main: Rect,
    pub right: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub state: PoolState,
    pub rect: Rect,
    pub vel: Vec2,
    /// Snapshot from the last reconfiguration
    pub required_accuracy: f32,
    pub colors: PlatformColors,
    /// Current tint of the left, main and right zones
    pub zone_colors: [u32; 3],
    pub shadow_color: u32,
    /// Landed on since the last reconfiguration
    pub hit: bool,
    condiments: Vec<CondimentId>,
}

impl Platform {
    pub fn new(id: PlatformId) -> Self {
        let colors = PlatformColors::default();
        Self {
            id,
            state: PoolState::Pooled,
            rect: Rect::default(),
            vel: Vec2::ZERO,
            required_accuracy: 0.0,
            colors,
            zone_colors: [colors.base; 3],
            shadow_color: NEUTRAL_SHADOW,
            hit: false,
            condiments: Vec::new(),
        }
    }

    /// Place and size the platform and take colours/accuracy from `config`
    pub fn reset_config(&mut self, center: Vec2, size: Vec2, config: &SpawnerConfig) {
        self.rect = Rect::new(center, size);
        self.vel = Vec2::ZERO;
        self.required_accuracy = config.required_accuracy;
        self.colors = config.platform_color;
        self.zone_colors = [config.platform_color.base; 3];
        self.hit = false;
    }

    pub fn zones(&self) -> Zones {
        let width = self.rect.width();
        let main_width = width * self.required_accuracy;
        let side_width = (width - main_width) * 0.5;
        let height = self.rect.height();
        let center = self.rect.center;

        let side_offset = (main_width + side_width) * 0.5;
        Zones {
            left: Rect::new(
                Vec2::new(center.x - side_offset, center.y),
                Vec2::new(side_width, height),
            ),
            main: Rect::new(center, Vec2::new(main_width, height)),
            right: Rect::new(
                Vec2::new(center.x + side_offset, center.y),
                Vec2::new(side_width, height),
            ),
        }
    }

    /// Judge a landing by the player's horizontal extent
    pub fn judge(&self, player_left: f32, player_right: f32) -> Result<HitAccuracy, SimError> {
        if !self.is_active() {
            return Err(SimError::InactivePlatform(self.id.0));
        }
        if !self.rect.is_finite() {
            return Err(SimError::UndefinedExtents("platform"));
        }
        let main = self.zones().main;
        hit_accuracy(
            player_left,
            player_right,
            main.left(),
            main.right(),
            self.required_accuracy,
        )
    }

    /// Recolour the judged zone and start sinking
    pub fn apply_collision(&mut self, hit: HitAccuracy) {
        match (hit.accurate, hit.left) {
            (true, _) => self.zone_colors[1] = self.colors.accurate,
            (false, true) => self.zone_colors[0] = self.colors.inaccurate,
            (false, false) => self.zone_colors[2] = self.colors.inaccurate,
        }
        self.vel.y = PLATFORM_SINK_VELOCITY;
        self.hit = true;
    }

    /// Horizontal scroll velocity; vertical sink is kept
    pub fn set_scroll_velocity(&mut self, vx: f32) {
        self.vel.x = vx;
    }

    pub fn set_shadow_color(&mut self, color: u32) {
        self.shadow_color = color;
    }

    pub fn step(&mut self, dt: f32) {
        self.rect.center += self.vel * dt;
    }

    pub fn attach(&mut self, condiment: CondimentId) {
        self.condiments.push(condiment);
    }

    pub fn detach(&mut self, condiment: CondimentId) -> bool {
        let before = self.condiments.len();
        self.condiments.retain(|c| *c != condiment);
        self.condiments.len() != before
    }

    /// Remove and return every attached condiment
    pub fn detach_all(&mut self) -> Vec<CondimentId> {
        std::mem::take(&mut self.condiments)
    }

    pub fn condiments(&self) -> &[CondimentId] {
        &self.condiments
    }
}

impl Poolable for Platform {
    fn pool_state(&self) -> PoolState {
        self.state
    }

    fn set_pool_state(&mut self, state: PoolState) {
        self.state = state;
        if state == PoolState::Pooled {
            self.vel = Vec2::ZERO;
        }
    }
}
