//! The player's ball

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::{PLAYER_MASS, PLAYER_RADIUS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// Rotation in degrees (visual only)
    pub angle: f32,
    /// Degrees per second
    pub angular_vel: f32,
    /// Added to velocity once per step while the pointer is held
    acceleration: Vec2,
    pointer_down: bool,
    ignore_input: bool,
    /// Off until the first press so the ball hovers at the start
    gravity_enabled: bool,
    body_enabled: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            mass: PLAYER_MASS,
            angle: 0.0,
            angular_vel: 0.0,
            acceleration: Vec2::ZERO,
            pointer_down: false,
            ignore_input: false,
            gravity_enabled: false,
            body_enabled: true,
        }
    }

    pub fn pointer_down(&mut self) {
        if !self.body_enabled {
            return;
        }
        self.gravity_enabled = true;
        if !self.ignore_input {
            self.pointer_down = true;
        }
    }

    pub fn pointer_up(&mut self) {
        self.pointer_down = false;
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Suppressing input also drops a held pointer so it cannot resume silently
    pub fn set_ignore_input(&mut self, ignore: bool) {
        self.ignore_input = ignore;
        if ignore {
            self.pointer_down = false;
        }
    }

    pub fn ignores_input(&self) -> bool {
        self.ignore_input
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    pub fn body_enabled(&self) -> bool {
        self.body_enabled
    }

    /// Set the held-pointer push from the gameplay state's acceleration
    pub fn set_state_acceleration(&mut self, acceleration: f32) {
        self.acceleration = Vec2::new(0.0, acceleration / self.mass);
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Advance one physics step
    pub fn step(&mut self, dt: f32, gravity: f32) {
        if !self.body_enabled {
            return;
        }
        if self.pointer_down && !self.ignore_input {
            self.vel += self.acceleration;
        }
        if self.gravity_enabled {
            self.vel.y += gravity * dt;
        }
        self.pos += self.vel * dt;
        self.angle = (self.angle + self.angular_vel * dt) % 360.0;
    }

    pub fn bounce(&mut self, speed: f32) {
        self.vel.y = -speed;
    }

    /// Horizontal extent `(left, right)`
    pub fn horizontal_extent(&self) -> (f32, f32) {
        (self.pos.x - self.radius, self.pos.x + self.radius)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, Vec2::splat(self.radius * 2.0))
    }

    /// True once the ball touches any edge of `world`
    pub fn touches_bounds(&self, world: &Rect) -> bool {
        let b = self.bounds();
        b.left() <= world.left()
            || b.right() >= world.right()
            || b.top() <= world.top()
            || b.bottom() >= world.bottom()
    }

    /// Stop everything and disable the body
    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.pointer_down = false;
        self.body_enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_hovers_until_first_press() {
        let mut player = Player::new(Vec2::new(540.0, 1000.0));
        player.step(DT, 1500.0);
        assert_eq!(player.pos, Vec2::new(540.0, 1000.0));

        player.pointer_down();
        player.pointer_up();
        player.step(DT, 1500.0);
        assert!(player.vel.y > 0.0);
        assert!(player.gravity_enabled());
    }

    #[test]
    fn test_held_pointer_accelerates_once_per_step() {
        let mut player = Player::new(Vec2::ZERO);
        player.set_state_acceleration(200.0);
        player.pointer_down();
        player.step(DT, 0.0);
        player.step(DT, 0.0);
        assert_eq!(player.vel, Vec2::new(0.0, 400.0));
    }

    #[test]
    fn test_acceleration_scales_with_mass() {
        let mut player = Player::new(Vec2::ZERO);
        player.mass = 2.0;
        player.set_state_acceleration(200.0);
        assert_eq!(player.acceleration(), Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_ignore_input_clears_pointer() {
        let mut player = Player::new(Vec2::ZERO);
        player.set_state_acceleration(200.0);
        player.pointer_down();
        player.set_ignore_input(true);
        assert!(!player.is_pointer_down());

        // Pressing while ignored does not latch
        player.pointer_down();
        player.set_ignore_input(false);
        player.step(DT, 0.0);
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_freeze_disables_body() {
        let mut player = Player::new(Vec2::ZERO);
        player.set_state_acceleration(200.0);
        player.pointer_down();
        player.vel = Vec2::new(3.0, 4.0);
        player.freeze();
        player.step(DT, 1500.0);
        assert_eq!(player.vel, Vec2::ZERO);
        assert_eq!(player.acceleration(), Vec2::ZERO);
        assert!(!player.body_enabled());
    }

    #[test]
    fn test_touches_bounds() {
        let world = Rect::from_edges(0.0, 0.0, 1080.0, 1920.0);
        assert!(!Player::new(Vec2::new(540.0, 960.0)).touches_bounds(&world));
        assert!(Player::new(Vec2::new(540.0, 1880.0)).touches_bounds(&world));
        assert!(Player::new(Vec2::new(20.0, 960.0)).touches_bounds(&world));
    }
}
