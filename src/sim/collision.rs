//! Collision detection and hit accuracy
//!
//! The ball is a circle, platforms are axis-aligned rectangles. On contact the
//! platform judges how well the ball landed by comparing the ball's horizontal
//! extent against the platform's central "main" zone.

use glam::Vec2;

use super::error::SimError;
use super::geometry::Rect;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a rectangle
pub fn ball_rect_collision(ball_pos: Vec2, ball_radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.clamp_point(ball_pos);
    let delta = ball_pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    if dist_sq > f32::EPSILON {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: ball_radius - dist,
        };
    }

    // Centre inside the rect (tunnelled): push out through the nearest face
    let faces = [
        (ball_pos.y - rect.top(), Vec2::NEG_Y),
        (rect.bottom() - ball_pos.y, Vec2::Y),
        (ball_pos.x - rect.left(), Vec2::NEG_X),
        (rect.right() - ball_pos.x, Vec2::X),
    ];
    let (depth, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::NEG_Y));

    CollisionResult {
        hit: true,
        point: ball_pos - normal * depth,
        normal,
        penetration: depth + ball_radius,
    }
}

/// How a landing was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitAccuracy {
    pub accurate: bool,
    /// Side of the main zone the ball leaned towards
    pub left: bool,
}

/// Judge a landing.
///
/// The player's horizontal extent `[player_left, player_right]` is shrunk
/// inward by `required_accuracy * player_width` on each side. The hit is
/// inaccurate iff both shrunk edges lie on the same side of the main zone
/// `[main_left, main_right]`.
pub fn hit_accuracy(
    player_left: f32,
    player_right: f32,
    main_left: f32,
    main_right: f32,
    required_accuracy: f32,
) -> Result<HitAccuracy, SimError> {
    let inputs = [player_left, player_right, main_left, main_right, required_accuracy];
    if inputs.iter().any(|v| !v.is_finite()) {
        return Err(SimError::UndefinedExtents("hit accuracy"));
    }

    let player_width = player_right - player_left;
    let shrink = player_width * required_accuracy;
    let left = player_left + shrink;
    let right = player_right - shrink;

    let off_left = left <= main_left && right <= main_left;
    let off_right = left >= main_right && right >= main_right;

    Ok(HitAccuracy {
        accurate: !(off_left || off_right),
        left: left <= main_left,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge(player_x: f32, required_accuracy: f32) -> HitAccuracy {
        hit_accuracy(player_x - 10.0, player_x + 10.0, -50.0, 50.0, required_accuracy)
            .expect("finite extents")
    }

    #[test]
    fn test_centered_is_accurate() {
        assert!(judge(0.0, 0.0).accurate);
        assert!(judge(0.0, 0.5).accurate);
    }

    #[test]
    fn test_far_right_is_inaccurate_right() {
        let hit = judge(200.0, 0.5);
        assert!(!hit.accurate);
        assert!(!hit.left);
    }

    #[test]
    fn test_far_left_is_inaccurate_left() {
        let hit = judge(-200.0, 0.5);
        assert!(!hit.accurate);
        assert!(hit.left);
    }

    #[test]
    fn test_required_accuracy_shrinks_player() {
        // Overlaps the main zone by 5 px at the right edge
        assert!(judge(-55.0, 0.0).accurate);
        // Shrinking by 5 px per side removes the overlap
        assert!(!judge(-55.0, 0.25).accurate);
    }

    #[test]
    fn test_non_finite_extents_fail() {
        assert_eq!(
            hit_accuracy(f32::NAN, 1.0, 0.0, 1.0, 0.5),
            Err(SimError::UndefinedExtents("hit accuracy"))
        );
    }

    #[test]
    fn test_ball_lands_on_top() {
        let rect = Rect::from_edges(-100.0, 0.0, 100.0, 20.0);
        let result = ball_rect_collision(Vec2::new(0.0, -35.0), 40.0, &rect);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_Y);
        assert!((result.penetration - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_misses() {
        let rect = Rect::from_edges(-100.0, 0.0, 100.0, 20.0);
        assert!(!ball_rect_collision(Vec2::new(0.0, -41.0), 40.0, &rect).hit);
        assert!(!ball_rect_collision(Vec2::new(150.0, -30.0), 40.0, &rect).hit);
    }

    #[test]
    fn test_tunnelled_ball_exits_nearest_face() {
        let rect = Rect::from_edges(-100.0, 0.0, 100.0, 20.0);
        let result = ball_rect_collision(Vec2::new(0.0, 2.0), 40.0, &rect);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_Y);
        assert!((result.penetration - 42.0).abs() < 1e-4);
    }
}
