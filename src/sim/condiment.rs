//! Platform condiments: coins and spikes
//!
//! A condiment rides on top of exactly one platform. It has no collider of its
//! own; the platform forwards the judged hit to each attached condiment.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::HitAccuracy;
use super::geometry::Rect;
use super::platform::PlatformId;
use super::pool::{PoolState, Poolable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CondimentKind {
    Coin,
    LeftSpike,
    RightSpike,
}

impl CondimentKind {
    pub const ALL: [CondimentKind; 3] = [
        CondimentKind::Coin,
        CondimentKind::LeftSpike,
        CondimentKind::RightSpike,
    ];

    /// Registry key
    pub fn key(&self) -> &'static str {
        match self {
            CondimentKind::Coin => "coin",
            CondimentKind::LeftSpike => "left-spike",
            CondimentKind::RightSpike => "right-spike",
        }
    }

    pub fn size(&self) -> Vec2 {
        match self {
            CondimentKind::Coin => Vec2::new(48.0, 48.0),
            CondimentKind::LeftSpike | CondimentKind::RightSpike => Vec2::new(40.0, 40.0),
        }
    }

    /// Centre position on top of `platform`
    pub fn align(&self, platform: &Rect) -> Vec2 {
        let size = self.size();
        let y = platform.top() - size.y * 0.5;
        let x = match self {
            CondimentKind::Coin => platform.center.x,
            CondimentKind::LeftSpike => platform.left() + size.x * 0.5,
            CondimentKind::RightSpike => platform.right() - size.x * 0.5,
        };
        Vec2::new(x, y)
    }

    /// Reaction to the player landing on the parent platform
    pub fn react(&self, hit: HitAccuracy) -> CondimentReaction {
        match self {
            CondimentKind::Coin if !hit.accurate => CondimentReaction::CollectCoin,
            CondimentKind::Coin => CondimentReaction::Consumed,
            CondimentKind::LeftSpike if !hit.accurate && hit.left => CondimentReaction::GameOver,
            CondimentKind::RightSpike if !hit.accurate && !hit.left => CondimentReaction::GameOver,
            CondimentKind::LeftSpike | CondimentKind::RightSpike => CondimentReaction::None,
        }
    }
}

impl fmt::Display for CondimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CondimentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CondimentKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| format!("unknown condiment `{s}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondimentReaction {
    None,
    /// Picked up without reward
    Consumed,
    /// Picked up, grants one coin
    CollectCoin,
    GameOver,
}

impl CondimentReaction {
    /// Whether the condiment leaves its platform
    pub fn consumes(&self) -> bool {
        matches!(self, CondimentReaction::Consumed | CondimentReaction::CollectCoin)
    }
}

/// Handle into the per-kind condiment pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CondimentId {
    pub kind: CondimentKind,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condiment {
    pub kind: CondimentKind,
    pub state: PoolState,
    pub pos: Vec2,
    parent: Option<PlatformId>,
}

impl Condiment {
    pub fn new(kind: CondimentKind) -> Self {
        Self {
            kind,
            state: PoolState::Pooled,
            pos: Vec2::ZERO,
            parent: None,
        }
    }

    pub fn parent(&self) -> Option<PlatformId> {
        self.parent
    }

    pub fn attach(&mut self, parent: PlatformId, platform: &Rect) {
        self.parent = Some(parent);
        self.follow(platform);
    }

    /// Clear the back-reference; the pool decides what happens next
    pub fn detach(&mut self) {
        self.parent = None;
    }

    /// Re-align after the parent moved
    pub fn follow(&mut self, platform: &Rect) {
        self.pos = self.kind.align(platform);
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.kind.size())
    }
}

impl Poolable for Condiment {
    fn pool_state(&self) -> PoolState {
        self.state
    }

    fn set_pool_state(&mut self, state: PoolState) {
        self.state = state;
    }
}
