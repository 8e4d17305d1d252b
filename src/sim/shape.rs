//! Breathing blob shape
//!
//! A closed path of eight cubic beziers around an origin. Each of the eight
//! compass spines has an anchor at `distance` from the origin and two handles
//! offset `spacing` perpendicular to it. Spines follow their targets through
//! second-order filters and pulse with a yoyo sine ease, so the outline
//! breathes and morphs smoothly between states.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::dynamics::{ScalarDynamics, VectorDynamics};

pub const DEFAULT_DISTANCE: f32 = 200.0;
pub const DEFAULT_SPACING: f32 = 50.0;
/// Pulse range of the breathing parameter
pub const BREATH_MIN: f32 = 0.8;
pub const BREATH_MAX: f32 = 1.0;
/// Each spine's half-cycle lasts this long plus a random extra of up to the same again
pub const BREATH_PERIOD: f32 = 1.0;

/// Compass directions in ring order, starting at the top and going clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    TopRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    TopLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// Unit vector in screen space (y down)
    pub fn vector(&self) -> Vec2 {
        const D: f32 = FRAC_1_SQRT_2;
        match self {
            Direction::Top => Vec2::new(0.0, -1.0),
            Direction::TopRight => Vec2::new(D, -D),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::DownRight => Vec2::new(D, D),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::DownLeft => Vec2::new(-D, D),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::TopLeft => Vec2::new(-D, -D),
        }
    }
}

/// Anchor and handles of one spine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub start: Vec2,
    pub middle: Vec2,
    pub end: Vec2,
}

impl Extent {
    pub fn new(direction: Direction, origin: Vec2, distance: f32, spacing: f32) -> Self {
        let dir = direction.vector();
        let middle = origin + dir * distance;
        Self {
            start: middle + Vec2::new(dir.y, -dir.x) * spacing,
            middle,
            end: middle + Vec2::new(-dir.y, dir.x) * spacing,
        }
    }
}

/// Per-spine targets, indexed in [`Direction::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    pub distance: [f32; 8],
    pub spacing: [f32; 8],
}

impl Default for ShapeState {
    fn default() -> Self {
        Self::rest()
    }
}

impl ShapeState {
    pub fn uniform(distance: f32, spacing: f32) -> Self {
        Self {
            distance: [distance; 8],
            spacing: [spacing; 8],
        }
    }

    pub fn rest() -> Self {
        Self::uniform(DEFAULT_DISTANCE, DEFAULT_SPACING)
    }

    /// Diagonals stretch out, cardinals pull in
    pub fn excited() -> Self {
        let mut state = Self::uniform(DEFAULT_DISTANCE * 0.5, DEFAULT_SPACING * 0.5);
        for (i, dir) in Direction::ALL.iter().enumerate() {
            let v = dir.vector();
            if v.x != 0.0 && v.y != 0.0 {
                state.distance[i] = DEFAULT_DISTANCE * 2.0;
            }
        }
        state
    }

    /// Sharp corners, tall and narrow
    pub fn focused() -> Self {
        let mut state = Self::uniform(DEFAULT_DISTANCE, 0.0);
        for (i, dir) in Direction::ALL.iter().enumerate() {
            match dir {
                Direction::Top | Direction::Down => state.distance[i] = DEFAULT_DISTANCE * 1.5,
                Direction::Left | Direction::Right => state.distance[i] = DEFAULT_DISTANCE / 3.0,
                _ => {}
            }
        }
        state
    }
}

/// Second-order filter tuning, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowerTuning {
    pub frequency: f32,
    pub damping: f32,
    pub response: f32,
}

impl Default for FollowerTuning {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            damping: 0.5,
            response: 2.0,
        }
    }
}

/// Sine ease-in-out ping-pong between [`BREATH_MIN`] and [`BREATH_MAX`]
#[derive(Debug, Clone, Copy, PartialEq)]
struct Breath {
    half_period: f32,
    elapsed: f32,
}

impl Breath {
    fn value(&self) -> f32 {
        let cycle = 2.0 * self.half_period;
        let phase = (self.elapsed % cycle) / self.half_period;
        let p = if phase > 1.0 { 2.0 - phase } else { phase };
        let eased = -((PI * p).cos() - 1.0) * 0.5;
        BREATH_MIN + (BREATH_MAX - BREATH_MIN) * eased
    }
}

#[derive(Debug, Clone)]
struct Spine {
    direction: Direction,
    breath: Breath,
    distance: ScalarDynamics,
    spacing: ScalarDynamics,
}

#[derive(Debug, Clone)]
pub struct BreathingShape {
    origin: VectorDynamics,
    origin_target: Vec2,
    state: ShapeState,
    spines: Vec<Spine>,
}

impl BreathingShape {
    pub fn new(
        origin: Vec2,
        state: ShapeState,
        tuning: FollowerTuning,
        rng: &mut impl Rng,
    ) -> Self {
        let follower = |initial: f32| {
            ScalarDynamics::new(tuning.frequency, tuning.damping, tuning.response, initial)
        };
        let spines = Direction::ALL
            .iter()
            .enumerate()
            .map(|(i, &direction)| Spine {
                direction,
                breath: Breath {
                    half_period: BREATH_PERIOD + rng.random::<f32>() * BREATH_PERIOD,
                    elapsed: 0.0,
                },
                distance: follower(state.distance[i]),
                spacing: follower(state.spacing[i]),
            })
            .collect();

        Self {
            origin: VectorDynamics::new(tuning.frequency, 0.7, 0.0, origin),
            origin_target: origin,
            state,
            spines,
        }
    }

    /// Retarget every spine; the outline morphs over the next updates
    pub fn transition_to(&mut self, state: ShapeState) {
        self.state = state;
    }

    pub fn state(&self) -> &ShapeState {
        &self.state
    }

    /// Drag the origin; it follows with lag
    pub fn set_origin_target(&mut self, target: Vec2) {
        self.origin_target = target;
    }

    pub fn origin(&self) -> Vec2 {
        self.origin.value()
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.origin.update(dt, self.origin_target, None);
        for (i, spine) in self.spines.iter_mut().enumerate() {
            spine.breath.elapsed += dt;
            spine.distance.update(dt, self.state.distance[i], None);
            spine.spacing.update(dt, self.state.spacing[i], None);
        }
    }

    /// Anchor and handles for each spine in ring order
    pub fn control_points(&self) -> Vec<Extent> {
        let origin = self.origin();
        self.spines
            .iter()
            .map(|s| {
                Extent::new(
                    s.direction,
                    origin,
                    s.breath.value() * s.distance.value(),
                    s.spacing.value(),
                )
            })
            .collect()
    }

    /// Closed path: curve `i` runs from spine `i`'s anchor to spine `i + 1`'s
    pub fn curves(&self) -> Vec<[Vec2; 4]> {
        let points = self.control_points();
        let n = points.len();
        (0..n)
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % n];
                [a.middle, a.end, b.start, b.middle]
            })
            .collect()
    }

    /// Sample the whole outline with `per_curve` points per segment
    pub fn outline(&self, per_curve: usize) -> Vec<Vec2> {
        let per_curve = per_curve.max(1);
        self.curves()
            .iter()
            .flat_map(|c| (0..per_curve).map(move |k| cubic_bezier(c, k as f32 / per_curve as f32)))
            .collect()
    }
}

pub fn cubic_bezier(p: &[Vec2; 4], t: f32) -> Vec2 {
    let u = 1.0 - t;
    p[0] * (u * u * u) + p[1] * (3.0 * u * u * t) + p[2] * (3.0 * u * t * t) + p[3] * (t * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn shape() -> BreathingShape {
        let mut rng = Pcg32::seed_from_u64(7);
        BreathingShape::new(
            Vec2::new(540.0, 400.0),
            ShapeState::rest(),
            FollowerTuning::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_extent_handles_are_perpendicular() {
        let e = Extent::new(Direction::Top, Vec2::ZERO, 200.0, 50.0);
        assert_eq!(e.middle, Vec2::new(0.0, -200.0));
        assert_eq!(e.start, Vec2::new(-50.0, -200.0));
        assert_eq!(e.end, Vec2::new(50.0, -200.0));
    }

    #[test]
    fn test_curves_close_the_loop() {
        let curves = shape().curves();
        assert_eq!(curves.len(), 8);
        for i in 0..8 {
            assert_eq!(curves[i][3], curves[(i + 1) % 8][0]);
        }
    }

    #[test]
    fn test_breath_stays_in_range() {
        let mut s = shape();
        let origin = s.origin();
        for _ in 0..600 {
            s.update(1.0 / 60.0);
            for e in s.control_points() {
                let d = (e.middle - origin).length();
                assert!(d >= DEFAULT_DISTANCE * BREATH_MIN - 0.5);
                assert!(d <= DEFAULT_DISTANCE * BREATH_MAX + 0.5);
            }
        }
    }

    #[test]
    fn test_transition_converges() {
        let mut s = shape();
        s.transition_to(ShapeState::uniform(100.0, 10.0));
        for _ in 0..1200 {
            s.update(1.0 / 60.0);
        }
        let origin = s.origin();
        for e in s.control_points() {
            let d = (e.middle - origin).length();
            assert!((80.0 - 1.0..=100.0 + 1.0).contains(&d), "distance {d}");
            assert!(((e.end - e.middle).length() - 10.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_origin_follows_drag() {
        let mut s = shape();
        s.set_origin_target(Vec2::new(600.0, 500.0));
        for _ in 0..1200 {
            s.update(1.0 / 60.0);
        }
        assert!((s.origin() - Vec2::new(600.0, 500.0)).length() < 1.0);
    }

    #[test]
    fn test_presets() {
        let excited = ShapeState::excited();
        assert_eq!(excited.distance[0], DEFAULT_DISTANCE * 0.5);
        assert_eq!(excited.distance[1], DEFAULT_DISTANCE * 2.0);
        let focused = ShapeState::focused();
        assert_eq!(focused.spacing, [0.0; 8]);
        assert_eq!(focused.distance[2], DEFAULT_DISTANCE / 3.0);
    }

    #[test]
    fn test_bezier_endpoints() {
        let p = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE];
        assert_eq!(cubic_bezier(&p, 0.0), Vec2::ZERO);
        assert_eq!(cubic_bezier(&p, 1.0), Vec2::ONE);
    }
}
