//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use std::time::Duration;

use super::error::SimError;
use super::spawner::HitContext;
use super::state::GameState;
use super::timer::Task;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch held this tick
    pub pointer_down: bool,
    /// Demo mode - the sim decides when to hold the pointer
    pub autoplay: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Result<(), SimError> {
    if state.is_over() {
        return Ok(());
    }

    let pointer_down = if input.autoplay {
        autoplay_pointer(state)
    } else {
        input.pointer_down
    };

    // Edges only: a pointer held through an input block must be pressed again
    if pointer_down && !state.pointer_was_down {
        state.player.pointer_down();
    } else if !pointer_down && state.pointer_was_down {
        state.player.pointer_up();
    }
    state.pointer_was_down = pointer_down;

    for task in state.scheduler.advance(Duration::from_secs_f32(dt)) {
        match task {
            Task::ReenableInput => state.player.set_ignore_input(false),
        }
    }

    state
        .player
        .set_state_acceleration(state.gameplay.player_acceleration());
    state.player.step(dt, state.config.gravity);
    state.spawner.step(dt);

    if let Some((id, contact)) = state.spawner.find_contact(&state.player) {
        state.player.pos += contact.normal * contact.penetration;

        let outcome = state.spawner.resolve_hit(
            id,
            HitContext {
                player: &mut state.player,
                score: &mut state.score,
                gameplay: &mut state.gameplay,
                scheduler: &mut state.scheduler,
                reenable_policy: state.config.reenable_policy,
                events: &mut state.events,
            },
        )?;

        if outcome.game_over {
            state.end_run();
            return Ok(());
        }
        state.update_difficulty()?;
    }

    state.spawner.update(
        Duration::from_secs_f32(dt),
        &state.gameplay,
        &mut state.events,
    )?;

    if state.player.touches_bounds(&state.world_bounds()) {
        state.end_run();
    }
    state.sync_gameplay();

    state.time_ticks += 1;
    Ok(())
}

/// Hold the pointer while a platform's sweet spot is right below the ball
fn autoplay_pointer(state: &GameState) -> bool {
    let player = &state.player;
    if !player.gravity_enabled() {
        return true;
    }
    if player.ignores_input() || player.vel.y < 0.0 {
        return false;
    }
    state.spawner.active_platforms().any(|p| {
        let main = p.zones().main;
        !p.hit
            && p.rect.top() > player.pos.y
            && player.pos.x >= main.left()
            && player.pos.x <= main.right()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::gameplay::GameplayState;
    use crate::sim::mode::GameMode;
    use crate::sim::platform::PlatformId;
    use crate::sim::score::ScoreManager;
    use crate::sim::state::{GameConfig, GameEvent};

    fn new_state(seed: u64) -> GameState {
        let mut state = GameState::new(
            GameConfig::with_seed(seed),
            GameMode::Endless,
            ScoreManager::default(),
        )
        .expect("valid config");
        state.drain_events();
        state
    }

    fn press() -> TickInput {
        TickInput {
            pointer_down: true,
            ..Default::default()
        }
    }

    /// Tick until `done` or the budget runs out, collecting events
    fn run_until(
        state: &mut GameState,
        input: &TickInput,
        max_ticks: usize,
        mut done: impl FnMut(&GameState) -> bool,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..max_ticks {
            tick(state, input, SIM_DT).expect("tick");
            events.extend(state.drain_events());
            if done(state) {
                break;
            }
        }
        events
    }

    fn transitions(events: &[GameEvent]) -> Vec<(GameplayState, GameplayState)> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::StateChanged(c) => Some((c.from, c.to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_hovers_until_first_press() {
        let mut state = new_state(1);
        let start = state.player.pos;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT).expect("tick");
        }
        assert_eq!(state.player.pos, start);
        assert_eq!(state.gameplay.state(), GameplayState::Static);
    }

    #[test]
    fn test_first_landing_starts_run() {
        let mut state = new_state(2);
        let events = run_until(&mut state, &press(), 240, |s| s.score.score() > 0);

        assert_eq!(state.score.score(), 1);
        assert_eq!(
            transitions(&events),
            vec![
                (GameplayState::Static, GameplayState::Playing),
                (GameplayState::Playing, GameplayState::PlayingAccelerated),
            ]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PlatformHit {
                id: PlatformId(0),
                accurate: true,
                ..
            }
        )));
        assert!(state.player.vel.y < 0.0);
    }

    #[test]
    fn test_input_reenabled_after_delay() {
        let mut state = new_state(3);
        run_until(&mut state, &press(), 240, |s| s.score.score() > 0);
        assert!(state.player.ignores_input());

        let release = TickInput::default();
        for _ in 0..13 {
            tick(&mut state, &release, SIM_DT).expect("tick");
        }
        assert!(!state.player.ignores_input());
    }

    #[test]
    fn test_falling_out_ends_run() {
        let mut state = new_state(4);
        state.spawner.despawn(PlatformId(0), &mut state.events);
        state.drain_events();

        let events = run_until(&mut state, &press(), 600, GameState::is_over);
        assert!(state.is_over());
        assert!(!state.player.body_enabled());
        assert_eq!(
            transitions(&events),
            vec![(GameplayState::Static, GameplayState::GameOver)]
        );
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerFadeOut)));

        // Terminal: nothing moves any more
        let ticks = state.time_ticks;
        let pos = state.player.pos;
        tick(&mut state, &press(), SIM_DT).expect("tick");
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.player.pos, pos);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_autoplay_scores() {
        let mut state = new_state(5);
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };
        run_until(&mut state, &input, 600, GameState::is_over);
        assert!(state.score.score() >= 1);
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };
        let mut a = new_state(99999);
        let mut b = new_state(99999);

        let events_a = run_until(&mut a, &input, 1800, GameState::is_over);
        let events_b = run_until(&mut b, &input, 1800, GameState::is_over);

        assert_eq!(events_a, events_b);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score.score(), b.score.score());
        assert_eq!(a.player.pos, b.player.pos);
    }
}
