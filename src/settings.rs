//! Player preferences
//!
//! Persisted inside the player data blob, see [`crate::persistence`].

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

/// Partial settings update; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub volume: Option<f32>,
}

impl Settings {
    /// Apply a patch, clamping values into their valid ranges
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(volume) = patch.volume {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}
