//! Player data persistence
//!
//! One JSON blob under a fixed key holds everything that survives a session:
//! `{highScore, coins, ownedSkins, equippedSkin, settings: {volume}}`.
//! Loading merges missing or partial fields with defaults; writing replaces
//! the whole blob and only happens on explicit save.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::{KeyValueStore, StorageError};
use crate::settings::{Settings, SettingsPatch};
use crate::sim::events::{ListenerId, Observers};
use crate::skins::DEFAULT_SKIN_ID;

/// Storage key for the player blob
pub const STORAGE_KEY: &str = "player";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode player data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid payload for {action}: {reason}")]
    InvalidPayload {
        action: &'static str,
        reason: &'static str,
    },
}

/// Persisted player profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerData {
    pub high_score: u64,
    pub coins: u64,
    pub owned_skins: Vec<u32>,
    pub equipped_skin: u32,
    pub settings: Settings,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            high_score: 0,
            coins: 0,
            owned_skins: vec![DEFAULT_SKIN_ID],
            equipped_skin: DEFAULT_SKIN_ID,
            settings: Settings::default(),
        }
    }
}

impl PlayerData {
    /// Parse a stored blob, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Mutations accepted by [`PlayerDataStore::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerDataAction {
    Save,
    SetHighScore(u64),
    SetCoins(u64),
    SetEquippedSkin(u32),
    SetOwnedSkins(Vec<u32>),
    SetSettings(SettingsPatch),
}

impl PlayerDataAction {
    fn name(&self) -> &'static str {
        match self {
            PlayerDataAction::Save => "SAVE",
            PlayerDataAction::SetHighScore(_) => "SET_HIGH_SCORE",
            PlayerDataAction::SetCoins(_) => "SET_COINS",
            PlayerDataAction::SetEquippedSkin(_) => "SET_EQUIPPED_SKIN",
            PlayerDataAction::SetOwnedSkins(_) => "SET_OWNED_SKINS",
            PlayerDataAction::SetSettings(_) => "SET_SETTINGS",
        }
    }
}

/// In-memory player profile backed by a key-value store
pub struct PlayerDataStore<S: KeyValueStore> {
    storage: S,
    data: PlayerData,
    listeners: Observers<PlayerData>,
}

impl<S: KeyValueStore> PlayerDataStore<S> {
    /// Read the profile from storage, using defaults if absent or unreadable
    pub fn load(storage: S) -> Self {
        let data = match storage.get(STORAGE_KEY) {
            Some(json) => match PlayerData::from_json(&json) {
                Ok(data) => {
                    log::info!("Loaded player data (high score {})", data.high_score);
                    data
                }
                Err(err) => {
                    log::warn!("Stored player data is corrupt, using defaults: {err}");
                    PlayerData::default()
                }
            },
            None => {
                log::info!("No player data found, starting fresh");
                PlayerData::default()
            }
        };

        Self {
            storage,
            data,
            listeners: Observers::new(),
        }
    }

    pub fn data(&self) -> &PlayerData {
        &self.data
    }

    /// Apply an action; writes through to storage on `Save` or when asked to
    pub fn apply(
        &mut self,
        action: PlayerDataAction,
        save_immediately: bool,
    ) -> Result<(), PersistenceError> {
        let mut save = save_immediately;
        let name = action.name();
        let mutates = action != PlayerDataAction::Save;

        match action {
            PlayerDataAction::Save => save = true,
            PlayerDataAction::SetHighScore(high_score) => self.data.high_score = high_score,
            PlayerDataAction::SetCoins(coins) => self.data.coins = coins,
            PlayerDataAction::SetEquippedSkin(skin) => self.data.equipped_skin = skin,
            PlayerDataAction::SetOwnedSkins(skins) => {
                if skins.is_empty() {
                    return Err(PersistenceError::InvalidPayload {
                        action: name,
                        reason: "owned skins cannot be empty",
                    });
                }
                self.data.owned_skins = skins;
            }
            PlayerDataAction::SetSettings(patch) => {
                if patch.volume.is_some_and(|v| !v.is_finite()) {
                    return Err(PersistenceError::InvalidPayload {
                        action: name,
                        reason: "volume must be finite",
                    });
                }
                self.data.settings.apply(&patch);
            }
        }

        if mutates {
            let snapshot = self.data.clone();
            self.listeners.emit(&snapshot);
        }

        if save {
            self.save()?;
        }
        Ok(())
    }

    /// Write the whole blob to storage
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        let json = self.data.to_json()?;
        self.storage.set(STORAGE_KEY, &json)?;
        log::info!("Player data saved");
        Ok(())
    }

    pub fn on_change(&mut self, callback: impl FnMut(&PlayerData) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
