//! Second-order dynamics follower
//!
//! A critically-damped (or under/over damped) second-order system that chases a
//! moving target. Used for drag-follow motion and for the breathing curve.
//!
//! Parameters:
//! - `f`: natural frequency; how quickly the follower responds
//! - `z`: damping ratio; 0 never settles, <1 overshoots, >=1 settles without overshoot
//! - `r`: initial response; <0 anticipates, 0 eases in, >1 overshoots the motion

use std::f32::consts::PI;
use std::ops::{Add, Mul, Sub};

use glam::Vec2;

/// Values a follower can track (scalars and 2D vectors)
pub trait Dynamic:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    const ZERO: Self;
}

impl Dynamic for f32 {
    const ZERO: Self = 0.0;
}

impl Dynamic for Vec2 {
    const ZERO: Self = Vec2::ZERO;
}

/// Smoothed follower state
#[derive(Debug, Clone)]
pub struct SecondOrderDynamics<T: Dynamic> {
    /// Previous target, for velocity estimation
    xp: T,
    /// Current position
    y: T,
    /// Current velocity
    yd: T,
    k1: f32,
    k2: f32,
    k3: f32,
}

pub type ScalarDynamics = SecondOrderDynamics<f32>;
pub type VectorDynamics = SecondOrderDynamics<Vec2>;

impl<T: Dynamic> SecondOrderDynamics<T> {
    pub fn new(f: f32, z: f32, r: f32, initial: T) -> Self {
        let w = 2.0 * PI * f;
        Self {
            xp: initial,
            y: initial,
            yd: T::ZERO,
            k1: z / (PI * f),
            k2: 1.0 / (w * w),
            k3: r * z / w,
        }
    }

    /// Advance by `t` seconds toward `target`, returning the smoothed value.
    ///
    /// When `target_velocity` is `None` it is estimated from the previous target.
    pub fn update(&mut self, t: f32, target: T, target_velocity: Option<T>) -> T {
        let xd = match target_velocity {
            Some(xd) => xd,
            None => {
                let xd = (target - self.xp) * (1.0 / t);
                self.xp = target;
                xd
            }
        };

        // k2 clamp keeps large steps stable and small steps jitter free
        let k2_stable = self
            .k2
            .max(t * t / 2.0 + t * self.k1 / 2.0)
            .max(t * self.k1);

        self.y = self.y + self.yd * t;
        let accel = (target + xd * self.k3 - self.y - self.yd * self.k1) * (1.0 / k2_stable);
        self.yd = self.yd + accel * t;

        self.y
    }

    /// Current smoothed value
    pub fn value(&self) -> T {
        self.y
    }

    /// Current follower velocity
    pub fn velocity(&self) -> T {
        self.yd
    }

    pub fn constants(&self) -> (f32, f32, f32) {
        (self.k1, self.k2, self.k3)
    }
}
