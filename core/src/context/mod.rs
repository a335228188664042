mod config;
mod error;

pub use config::{APP_NAME, CONFIG_NAME, SettingsExt};
pub use error::ConfigError;
