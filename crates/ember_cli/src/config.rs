//! Ember player configuration file handling

use anyhow::{Context, Result};
use ember_core::{KeyBindings, KeyCode, Signal, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level player configuration (ember.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct EmberConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    /// Key name → signal name; replaces the default bindings when present
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
}

/// Project metadata
#[derive(Debug, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Novel played by `ember novel` when none is named
    #[serde(default)]
    pub novel: Option<String>,
}

/// Headless player settings
#[derive(Debug, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frames per second of the fixed player clock
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Directory holding assets/, scenes/ and novels/
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_fps() -> u32 {
    60
}

fn default_asset_root() -> String {
    ".".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            asset_root: default_asset_root(),
        }
    }
}

impl PlayerConfig {
    pub fn surface(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn frame_time(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}

impl EmberConfig {
    /// Load configuration from a directory (looks for ember.toml)
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join("ember.toml")
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No ember.toml found in {}. Run `ember init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: EmberConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Load from a directory, falling back to defaults when it has no ember.toml
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join("ember.toml")
        };
        if config_path.exists() {
            return Self::load_from_dir(path);
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("ember_project");
        Ok(Self::new(name))
    }

    /// Create a new configuration with the given project name
    pub fn new(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                description: None,
                novel: None,
            },
            player: PlayerConfig::default(),
            bindings: BTreeMap::new(),
        }
    }

    /// Asset root, relative to the directory the config was loaded from
    pub fn asset_root(&self, project_dir: &Path) -> PathBuf {
        let dir = if project_dir.is_file() {
            project_dir.parent().unwrap_or(Path::new("."))
        } else {
            project_dir
        };
        dir.join(&self.player.asset_root)
    }

    /// Key bindings: the defaults, or the configured table if one is given
    pub fn key_bindings(&self) -> Result<KeyBindings> {
        if self.bindings.is_empty() {
            return Ok(KeyBindings::default());
        }
        let mut bindings = KeyBindings::empty();
        for (key, signal) in &self.bindings {
            let code = KeyCode::from_name(key)
                .with_context(|| format!("Unknown key '{}' in [bindings]", key))?;
            let signal = Signal::from_name(signal)
                .with_context(|| format!("Unknown signal '{}' for key '{}'", signal, key))?;
            bindings.bind(code, signal);
        }
        Ok(bindings)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: EmberConfig = toml::from_str("[project]\nname = \"tide\"\n").unwrap();
        assert_eq!(config.player.width, 1920);
        assert_eq!(config.player.fps, 60);
        assert_eq!(config.player.asset_root, ".");
        assert!(config.bindings.is_empty());
        assert_eq!(config.key_bindings().unwrap().len(), KeyBindings::default().len());
    }

    #[test]
    fn test_custom_bindings() {
        let config: EmberConfig = toml::from_str(
            "[project]\nname = \"tide\"\n\n[bindings]\nx = \"visual\"\nz = \"text\"\n",
        )
        .unwrap();
        let bindings = config.key_bindings().unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(
            bindings.resolve(KeyCode(b'X' as u32)),
            Some(Signal::AdvanceVisual)
        );
        assert_eq!(bindings.resolve(KeyCode::ENTER), None);
    }

    #[test]
    fn test_bad_binding_is_reported() {
        let config: EmberConfig =
            toml::from_str("[project]\nname = \"tide\"\n\n[bindings]\nx = \"jump\"\n").unwrap();
        let err = config.key_bindings().unwrap_err();
        assert!(err.to_string().contains("jump"));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = EmberConfig::new("tide").to_toml().unwrap();
        let config: EmberConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.project.name, "tide");
        assert_eq!(config.player.height, 1080);
    }
}
