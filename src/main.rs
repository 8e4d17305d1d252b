//! Bounce Rush entry point
//!
//! Native: headless autoplay run with logging, useful for tuning and smoke
//! testing the simulation. Usage: `bounce-rush [seed] [beatmap.json]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    bounce_rush::platform::init_logging();
    log::info!("Bounce Rush (native, headless) starting...");

    if let Err(err) = native::run() {
        log::error!("Run failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the simulation through the library
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use bounce_rush::PlayerDataStore;
    use bounce_rush::consts::SIM_DT;
    use bounce_rush::platform::MemoryStorage;
    use bounce_rush::sim::{Beatmap, GameConfig, GameEvent, GameMode, GameState, TickInput, tick};

    /// Hard stop for runs the autoplayer never loses (ten simulated minutes)
    const MAX_TICKS: u64 = 60 * 60 * 10;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(raw) => raw.parse::<u64>()?,
            None => 0,
        };
        let mode = match args.next() {
            Some(path) => GameMode::Beatmap(Beatmap::from_json(&std::fs::read_to_string(path)?)?),
            None => GameMode::Endless,
        };

        let mut store = PlayerDataStore::load(MemoryStorage::new());
        let mut state = GameState::from_store(GameConfig::with_seed(seed), mode, &store)?;
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };

        let mut hits = 0u32;
        let mut accurate = 0u32;
        while !state.is_over() && state.time_ticks < MAX_TICKS {
            tick(&mut state, &input, SIM_DT)?;
            for event in state.drain_events() {
                match event {
                    GameEvent::PlatformHit { accurate: a, .. } => {
                        hits += 1;
                        accurate += u32::from(a);
                    }
                    GameEvent::TierAdvanced { tier, progress } => {
                        log::info!("Tier {tier} at progress {progress}");
                    }
                    _ => {}
                }
            }
        }

        log::info!(
            "Finished after {:.1}s: score {}, {hits} hits ({accurate} accurate), {} coins",
            state.time_ticks as f32 * SIM_DT,
            state.score.score(),
            state.score.coins()
        );

        state.save(&mut store)?;
        log::info!("High score {}", store.data().high_score);
        Ok(())
    }
}
