//! Settings persistence
//!
//! Settings live in `clonewatch-types`; this module adds loading and saving
//! through confy (TOML under the platform config directory).

use std::path::PathBuf;

pub use clonewatch_types::{CombatStyle, HostScreen, Settings};

use super::error::ConfigError;
use crate::position::default_anchor;

pub const APP_NAME: &str = "clonewatch";
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Settings Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Settings persistence
pub trait SettingsExt: Sized {
    /// Load saved settings, falling back to defaults on any error
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;

    /// Place the overlay at the default anchor the first time a host is seen.
    /// Returns true if the offsets were changed.
    fn initialize_default_position(&mut self, host: &HostScreen) -> bool;
}

impl SettingsExt for Settings {
    fn load() -> Self {
        match Self::try_load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Using default settings");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Path)
    }

    fn initialize_default_position(&mut self, host: &HostScreen) -> bool {
        if self.position_initialized {
            return false;
        }

        let (x, y) = default_anchor(host);
        self.overlay_offset_x = x.clamp(0, host.width as i32);
        self.overlay_offset_y = y.clamp(0, host.height as i32);
        self.position_initialized = true;

        tracing::debug!(
            x = self.overlay_offset_x,
            y = self.overlay_offset_y,
            "Initialized overlay position"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_default_position_once() {
        let host = HostScreen::default();
        let mut settings = Settings::default();

        assert!(settings.initialize_default_position(&host));
        assert_eq!(settings.overlay_offset_x, 960);
        assert_eq!(settings.overlay_offset_y, 216);
        assert!(settings.position_initialized);

        settings.overlay_offset_x = 10;
        assert!(!settings.initialize_default_position(&host));
        assert_eq!(settings.overlay_offset_x, 10);
    }

    #[test]
    fn test_settings_roundtrip_through_toml() {
        let settings = Settings {
            use_ticks: true,
            combat_style: CombatStyle::Necro,
            overlay_offset_x: 640,
            ..Settings::default()
        };
        let path = std::env::temp_dir().join(format!("clonewatch-config-{}.toml", std::process::id()));

        confy::store_path(&path, &settings).unwrap();
        let loaded: Settings = confy::load_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(loaded.use_ticks);
        assert_eq!(loaded.combat_style, CombatStyle::Necro);
        assert_eq!(loaded.overlay_offset_x, 640);
        assert_eq!(loaded.triggers, settings.triggers);
    }
}
