//! Cubica's persisted player settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::settings::{EngineSettings, ScreenMode};

pub const DEFAULT_STARTUP_SCENE: &str = "data/scenes/main.xml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub scenes_list_file: String,
    pub last_played_id: u32,
    pub max_played_id: u32,
    pub minimap_width: u32,
    pub minimap_height: u32,
    pub fullscreen: bool,
    pub screen_mode: ScreenMode,
    pub music_volume: u32,
    pub fx_volume: u32,
    pub antialiasing: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            scenes_list_file: "data/scenes/scenes.list".into(),
            last_played_id: 0,
            max_played_id: 1,
            minimap_width: 300,
            minimap_height: 100,
            fullscreen: false,
            screen_mode: ScreenMode::default(),
            music_volume: 70,
            fx_volume: 80,
            antialiasing: if cfg!(debug_assertions) { 2 } else { 4 },
        }
    }
}

impl GameSettings {
    /// Reads settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read settings {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self).context("unable to serialize settings")?;
        fs::write(path, text)
            .with_context(|| format!("unable to write settings {}", path.display()))
    }

    /// Engine options derived from the player's choices.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            multi_threading: true,
            vsync: true,
            use_glow: true,
            multisample: self.antialiasing,
            fullscreen: self.fullscreen,
            screen_mode: self.screen_mode,
            startup_scene: DEFAULT_STARTUP_SCENE.into(),
            ..EngineSettings::default()
        }
    }
}

/// Settings owned by the running game together with where they persist.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub settings: GameSettings,
    path: PathBuf,
}

impl GameContext {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = GameSettings::load(&path)?;
        Ok(Self { settings, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        self.settings.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = GameSettings::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.music_volume, 70);
        assert_eq!(settings.fx_volume, 80);
        assert_eq!(settings.screen_mode, ScreenMode::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut context = GameContext::load(&path).unwrap();
        context.settings.last_played_id = 3;
        context.settings.max_played_id = 4;
        context.settings.fullscreen = true;
        context.save().unwrap();

        let reloaded = GameContext::load(&path).unwrap();
        assert_eq!(reloaded.settings, context.settings);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "music_volume = 10\n").unwrap();
        let settings = GameSettings::load(&path).unwrap();
        assert_eq!(settings.music_volume, 10);
        assert_eq!(settings.fx_volume, 80);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "music_volume = \"loud\"").unwrap();
        assert!(GameSettings::load(&path).is_err());
    }

    #[test]
    fn engine_settings_follow_player_choices() {
        let settings = GameSettings {
            antialiasing: 8,
            fullscreen: true,
            ..GameSettings::default()
        };
        let engine = settings.engine_settings();
        assert_eq!(engine.multisample, 8);
        assert!(engine.fullscreen);
        assert!(engine.vsync);
        assert_eq!(engine.startup_scene, DEFAULT_STARTUP_SCENE);
    }
}
