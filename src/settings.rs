//! Menu settings
//!
//! JSON-backed settings file, loaded once at startup. Unknown keys are kept
//! in `extra` so menu scripts can store their own values through
//! `engine.setting_get` / `engine.setting_set`.

use crate::error::MenuError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "voxel-menu";
const SETTINGS_FILE: &str = "menu.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// User override for the menu script; empty or absent means builtin
    pub main_menu_script: Option<String>,

    /// Frame cap used while clouds are rendered
    pub fps_max: f32,

    pub enable_clouds: bool,

    pub screen_w: u32,
    pub screen_h: u32,

    /// Read-only shared assets (builtin scripts, sounds, textures)
    pub path_share: PathBuf,

    /// Per-user assets and downloads
    pub path_user: PathBuf,

    /// Text shown in the top-left corner
    pub version_label: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for MenuSettings {
    fn default() -> Self {
        MenuSettings {
            main_menu_script: None,
            fps_max: 60.0,
            enable_clouds: true,
            screen_w: 1024,
            screen_h: 768,
            path_share: PathBuf::from("./share"),
            path_user: dirs::data_dir()
                .map(|p| p.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from("./user")),
            version_label: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            extra: BTreeMap::new(),
        }
    }
}

impl MenuSettings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR).join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings: MenuSettings = serde_json::from_str(&json)?;
        Ok(settings)
    }

    /// Loads settings, falling back to defaults when the file is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return MenuSettings::default();
        }

        match MenuSettings::load_from_file(path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                MenuSettings::default()
            }
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), MenuError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Custom menu script, if one is configured
    pub fn custom_menu_script(&self) -> Option<PathBuf> {
        self.main_menu_script
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    pub fn builtin_menu_script(&self) -> PathBuf {
        self.path_share.join("builtin").join("mainmenu.lua")
    }

    /// Reads a script-visible setting as a string
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "main_menu_script" => self.main_menu_script.clone(),
            "fps_max" => Some(self.fps_max.to_string()),
            "enable_clouds" => Some(self.enable_clouds.to_string()),
            _ => self.extra.get(key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Writes a script-visible setting. Typed keys are parsed; everything else
    /// is stored as a string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), MenuError> {
        match key {
            "main_menu_script" => self.main_menu_script = Some(value.to_string()),
            "fps_max" => {
                self.fps_max = value
                    .parse()
                    .map_err(|_| MenuError::Config(format!("fps_max is not a number: {}", value)))?;
            }
            "enable_clouds" => {
                self.enable_clouds = value
                    .parse()
                    .map_err(|_| MenuError::Config(format!("enable_clouds is not a bool: {}", value)))?;
            }
            _ => {
                self.extra.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        Ok(())
    }
}
