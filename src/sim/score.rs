//! Score, streak multiplier and coin tracking

use serde::{Deserialize, Serialize};

use super::events::{ListenerId, Observers};
use crate::persistence::{PersistenceError, PlayerDataAction, PlayerDataStore};
use crate::platform::KeyValueStore;

/// Consecutive accurate hits -> multiplier. Only exact matches change the
/// multiplier; between keys the previous value holds.
pub const MULTIPLIER_THRESHOLDS: [(u32, u32); 10] = [
    (0, 1),
    (5, 2),
    (10, 3),
    (15, 4),
    (25, 5),
    (35, 6),
    (45, 7),
    (55, 8),
    (70, 9),
    (85, 10),
];

/// Look up the multiplier for an exact streak length
pub fn multiplier_for(consecutive_hits: u32) -> Option<u32> {
    MULTIPLIER_THRESHOLDS
        .iter()
        .find(|(hits, _)| *hits == consecutive_hits)
        .map(|(_, multiplier)| *multiplier)
}

/// Payload of the score-changed notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChanged {
    pub score: u64,
    pub consecutive_hits: u32,
    pub multiplier: u32,
}

#[derive(Debug)]
pub struct ScoreManager {
    score: u64,
    high_score: u64,
    consecutive_hits: u32,
    multiplier: u32,
    coins: u64,
    listeners: Observers<ScoreChanged>,
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl ScoreManager {
    pub fn new(high_score: u64, coins: u64) -> Self {
        Self {
            score: 0,
            high_score,
            consecutive_hits: 0,
            multiplier: 1,
            coins,
            listeners: Observers::new(),
        }
    }

    /// Seed high score and coin balance from persisted player data
    pub fn load_score<S: KeyValueStore>(store: &PlayerDataStore<S>) -> Self {
        let data = store.data();
        Self::new(data.high_score, data.coins)
    }

    /// Award one hit. Chainable hits extend the streak, anything else breaks it.
    pub fn try_add_score(&mut self, chainable: bool) -> u64 {
        if chainable {
            self.consecutive_hits += 1;
            if let Some(multiplier) = multiplier_for(self.consecutive_hits) {
                self.multiplier = multiplier;
            }
        } else {
            self.consecutive_hits = 0;
            self.multiplier = 1;
        }

        self.score += u64::from(self.multiplier);
        self.high_score = self.high_score.max(self.score);

        self.notify();
        self.score
    }

    pub fn reset_multiplier(&mut self) {
        self.consecutive_hits = 0;
        self.multiplier = 1;
        self.notify();
    }

    pub fn add_coin(&mut self) -> u64 {
        self.coins += 1;
        self.coins
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn snapshot(&self) -> ScoreChanged {
        ScoreChanged {
            score: self.score,
            consecutive_hits: self.consecutive_hits,
            multiplier: self.multiplier,
        }
    }

    pub fn on_score_change(&mut self, callback: impl FnMut(&ScoreChanged) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Write high score and coin balance back to the player store and flush it
    pub fn save_score<S: KeyValueStore>(
        &self,
        store: &mut PlayerDataStore<S>,
    ) -> Result<(), PersistenceError> {
        let high_score = self.high_score.max(store.data().high_score);
        store.apply(PlayerDataAction::SetHighScore(high_score), false)?;
        store.apply(PlayerDataAction::SetCoins(self.coins), false)?;
        store.apply(PlayerDataAction::Save, false)
    }

    fn notify(&mut self) {
        let event = self.snapshot();
        self.listeners.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_multiplier_steps_at_table_keys() {
        let mut score = ScoreManager::default();
        for _ in 0..4 {
            score.try_add_score(true);
            assert_eq!(score.multiplier(), 1);
        }
        score.try_add_score(true);
        assert_eq!(score.multiplier(), 2);

        for _ in 6..=9 {
            score.try_add_score(true);
            assert_eq!(score.multiplier(), 2);
        }
        score.try_add_score(true);
        assert_eq!(score.consecutive_hits(), 10);
        assert_eq!(score.multiplier(), 3);
    }

    #[test]
    fn test_score_accumulates_multiplier() {
        let mut score = ScoreManager::default();
        for _ in 0..5 {
            score.try_add_score(true);
        }
        // 4 hits at x1 then one at x2
        assert_eq!(score.score(), 6);
    }

    #[test]
    fn test_non_chainable_resets_streak() {
        let mut score = ScoreManager::default();
        for _ in 0..12 {
            score.try_add_score(true);
        }
        assert_eq!(score.multiplier(), 3);

        let before = score.score();
        score.try_add_score(false);
        assert_eq!(score.consecutive_hits(), 0);
        assert_eq!(score.multiplier(), 1);
        assert_eq!(score.score(), before + 1);
    }

    #[test]
    fn test_reset_multiplier() {
        let mut score = ScoreManager::default();
        for _ in 0..5 {
            score.try_add_score(true);
        }
        score.reset_multiplier();
        assert_eq!(score.multiplier(), 1);
        assert_eq!(score.consecutive_hits(), 0);
    }

    #[test]
    fn test_listeners_receive_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut score = ScoreManager::default();
        let sink = seen.clone();
        let id = score.on_score_change(move |e| sink.borrow_mut().push(*e));

        score.try_add_score(true);
        score.try_add_score(false);
        assert!(score.remove_listener(id));
        score.try_add_score(true);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            ScoreChanged {
                score: 1,
                consecutive_hits: 1,
                multiplier: 1
            }
        );
        assert_eq!(seen[1].consecutive_hits, 0);
    }

    #[test]
    fn test_high_score_tracks_existing_best() {
        let mut score = ScoreManager::new(3, 0);
        score.try_add_score(true);
        assert_eq!(score.high_score(), 3);
        score.try_add_score(true);
        score.try_add_score(true);
        score.try_add_score(true);
        assert_eq!(score.high_score(), 4);
    }

    #[test]
    fn test_save_and_load_round_trip_through_store() {
        let mut store = PlayerDataStore::load(MemoryStorage::new());
        let mut score = ScoreManager::load_score(&store);
        for _ in 0..7 {
            score.try_add_score(true);
        }
        score.add_coin();
        score.save_score(&mut store).expect("save");

        let reloaded = PlayerDataStore::load(store.into_storage());
        let score = ScoreManager::load_score(&reloaded);
        assert_eq!(score.high_score(), 10);
        assert_eq!(score.coins(), 1);
        assert_eq!(score.score(), 0);
    }

    proptest! {
        #[test]
        fn prop_high_score_never_decreases(
            hits in proptest::collection::vec(any::<bool>(), 0..200)
        ) {
            let mut score = ScoreManager::new(10, 0);
            let mut last_high = score.high_score();
            let mut last_score = score.score();
            for hit in hits {
                score.try_add_score(hit);
                prop_assert!(score.high_score() >= last_high);
                prop_assert!(score.score() > last_score);
                prop_assert!(score.high_score() >= score.score());
                prop_assert!(score.multiplier() >= 1);
                last_high = score.high_score();
                last_score = score.score();
            }
        }
    }
}
