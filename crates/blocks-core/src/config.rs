use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for the block editor surface. Zero or missing values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksConfig {
    pub trigger: Option<char>,
    pub max_visible_commands: usize,
    pub drag_opacity: f32,
    pub indicator_thickness: f32,
    pub palette_width: f32,
    pub table_rows: u64,
    pub table_cols: u64,
}

impl BlocksConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.trigger.is_none() {
            self.trigger = Some('/');
        }
        if self.max_visible_commands == 0 {
            self.max_visible_commands = 50;
        }
        if self.drag_opacity <= 0.0 || self.drag_opacity > 1.0 {
            self.drag_opacity = 0.4;
        }
        if self.indicator_thickness <= 0.0 {
            self.indicator_thickness = 2.0;
        }
        if self.palette_width <= 0.0 {
            self.palette_width = 320.0;
        }
        if self.table_rows == 0 {
            self.table_rows = 3;
        }
        if self.table_cols == 0 {
            self.table_cols = 3;
        }
        self
    }

    pub fn trigger(&self) -> char {
        self.trigger.unwrap_or('/')
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(json)
            .map(Self::with_defaults)
            .map_err(|err| ConfigError::new(format!("Invalid blocks config: {err}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::new(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = BlocksConfig::default().with_defaults();
        assert_eq!(config.trigger(), '/');
        assert_eq!(config.max_visible_commands, 50);
        assert_eq!(config.drag_opacity, 0.4);
        assert_eq!((config.table_rows, config.table_cols), (3, 3));
    }

    #[test]
    fn json_overrides_keep_other_defaults() {
        let config =
            BlocksConfig::from_json_str(r#"{ "trigger": "\\", "table_cols": 5 }"#).unwrap();
        assert_eq!(config.trigger(), '\\');
        assert_eq!(config.table_cols, 5);
        assert_eq!(config.table_rows, 3);
        assert_eq!(config.palette_width, 320.0);
    }

    #[test]
    fn out_of_range_opacity_is_reset() {
        let config = BlocksConfig::from_json_str(r#"{ "drag_opacity": 3.0 }"#).unwrap();
        assert_eq!(config.drag_opacity, 0.4);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = BlocksConfig::from_json_str("{ nope").unwrap_err();
        assert!(err.message().starts_with("Invalid blocks config"));
    }
}
