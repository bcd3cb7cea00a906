//! Simulation settings
//!
//! Loaded once by the driver and handed to the environment. Persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;
use crate::error::{ChopperError, Result};

/// Difficulty switch (the cartridge's A/B setting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    #[default]
    Novice,
    Expert,
}

impl Difficulty {
    /// Numeric level (1 or 2)
    pub fn level(&self) -> u8 {
        match self {
            Difficulty::Novice => 1,
            Difficulty::Expert => 2,
        }
    }

    /// Multiplier applied to enemy horizontal speed
    pub fn speed_factor(&self) -> f32 {
        match self {
            Difficulty::Novice => 1.0,
            Difficulty::Expert => 1.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Novice => "Novice",
            Difficulty::Expert => "Expert",
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ChopperError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Difficulty::Novice),
            2 => Ok(Difficulty::Expert),
            other => Err(ChopperError::InvalidDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> u8 {
        difficulty.level()
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enemy speed level
    pub difficulty: Difficulty,
    /// Lives at the start of a game (reserve choppers)
    pub starting_lives: i32,

    // === Debug ===
    /// When false the player never collides with anything (invulnerable)
    pub player_collision: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Novice,
            starting_lives: STARTING_LIVES,
            player_collision: true,
        }
    }
}

impl Settings {
    /// Settings for a given difficulty, everything else default
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document (missing keys fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "difficulty": 2 }"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Expert);
        assert!(settings.player_collision);
        assert_eq!(settings.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn test_invalid_difficulty_rejected() {
        assert!(Settings::from_json(r#"{ "difficulty": 3 }"#).is_err());
        assert!(matches!(
            Difficulty::try_from(0),
            Err(ChopperError::InvalidDifficulty(0))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "chopper_command_settings_{}.json",
            std::process::id()
        ));
        let settings = Settings {
            difficulty: Difficulty::Expert,
            starting_lives: 5,
            player_collision: false,
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Settings::load("/definitely/not/here/settings.json");
        assert!(matches!(result, Err(ChopperError::Io(_))));
    }
}
