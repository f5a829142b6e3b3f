//! Shell configuration file handling

use anyhow::{Context, Result};
use hscroll_scroller::ScrollerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up by [`ShellConfig::load_from_dir`]
pub const CONFIG_FILE: &str = "hscroll.toml";

/// Top-level configuration (hscroll.toml)
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub scroller: ScrollerConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Geometry of the demo page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// Width of each routed panel
    #[serde(default = "default_panel_width")]
    pub panel_width: f32,
    #[serde(default = "default_header_height")]
    pub header_height: f32,
    /// Rows in each panel's list
    #[serde(default = "default_list_items")]
    pub list_items: usize,
    #[serde(default = "default_item_height")]
    pub item_height: f32,
    /// Animation frames per second in the headless host
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// Panels opened by the "open" commands
    #[serde(default = "default_open_count")]
    pub open_count: usize,
}

fn default_viewport_width() -> f32 {
    1200.0
}

fn default_viewport_height() -> f32 {
    800.0
}

fn default_panel_width() -> f32 {
    400.0
}

fn default_header_height() -> f32 {
    60.0
}

fn default_list_items() -> usize {
    40
}

fn default_item_height() -> f32 {
    32.0
}

fn default_frame_rate() -> f32 {
    60.0
}

fn default_open_count() -> usize {
    10
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            panel_width: default_panel_width(),
            header_height: default_header_height(),
            list_items: default_list_items(),
            item_height: default_item_height(),
            frame_rate: default_frame_rate(),
            open_count: default_open_count(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a directory (looks for hscroll.toml) or a
    /// file path. A directory without a config file yields the defaults.
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join(CONFIG_FILE)
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Load an explicitly named config file, which must exist
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        Self::load_from_dir(path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ShellConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hscroll_animation::Easing;

    #[test]
    fn test_empty_file_is_default() {
        let config = ShellConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.demo.open_count, 10);
        assert_eq!(config.scroller.initial_offset, 100_000.0);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = ShellConfig::from_toml_str(
            r#"
            [scroller]
            animation_duration = 0.1
            easing = "linear"

            [demo]
            panel_width = 300.0
            "#,
        )
        .unwrap();
        assert_eq!(config.scroller.animation_duration, 0.1);
        assert_eq!(config.scroller.easing, Easing::Linear);
        assert_eq!(config.scroller.wheel_step, 10.0);
        assert_eq!(config.demo.panel_width, 300.0);
        assert_eq!(config.demo.viewport_width, 1200.0);
    }

    #[test]
    fn test_bad_value_is_an_error() {
        assert!(ShellConfig::from_toml_str("[demo]\npanel_width = \"wide\"").is_err());
    }

    #[test]
    fn test_to_toml_writes_both_sections() {
        let mut config = ShellConfig::default();
        config.demo.list_items = 7;
        let text = config.to_toml().unwrap();
        assert!(text.contains("[demo]"));
        assert!(text.contains("list_items = 7"));
        assert!(text.contains("wheel_step"));
    }

    #[test]
    fn test_missing_file_in_dir_gives_defaults() {
        let dir = std::env::temp_dir().join("hscroll-config-missing");
        let _ = fs::create_dir_all(&dir);
        let _ = fs::remove_file(dir.join(CONFIG_FILE));
        assert_eq!(ShellConfig::load_from_dir(&dir).unwrap(), ShellConfig::default());
    }

    #[test]
    fn test_load_from_dir_reads_file() {
        let dir = std::env::temp_dir().join("hscroll-config-present");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), "[demo]\nopen_count = 3\n").unwrap();
        let config = ShellConfig::load_from_dir(&dir).unwrap();
        assert_eq!(config.demo.open_count, 3);
        assert_eq!(ShellConfig::load_file(&dir.join(CONFIG_FILE)).unwrap(), config);
        assert!(ShellConfig::load_file(&dir.join("absent.toml")).is_err());
    }
}
