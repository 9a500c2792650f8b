//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.locdash.toml` files. Only presentation is configurable; the
//! datasets are fixed.

use crate::cli::OutputFormat;
use crate::models::{MarkerIcon, UNDEFINED_RATING};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".locdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Display text settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Map view settings.
    #[serde(default)]
    pub map: MapConfig,

    /// Chart view settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path. Unset means stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Display text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Dashboard title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Shown in place of a missing rating, review count or id.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Shown in place of a missing category.
    #[serde(default = "default_unknown_label")]
    pub unknown_label: String,

    /// Width in characters of a full-scale bar in the text chart.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            fallback: default_fallback(),
            unknown_label: default_unknown_label(),
            bar_width: default_bar_width(),
        }
    }
}

fn default_title() -> String {
    "Location Data Analysis".to_string()
}

fn default_fallback() -> String {
    UNDEFINED_RATING.to_string()
}

fn default_unknown_label() -> String {
    "Unknown".to_string()
}

fn default_bar_width() -> usize {
    40
}

/// Map view settings, passed through to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial center as `[latitude, longitude]`.
    #[serde(default = "default_center")]
    pub center: [f64; 2],

    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Tile URL template.
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Marker icon edge length in pixels.
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,

    /// Icon assets per marker kind.
    #[serde(default)]
    pub icons: IconConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            tile_url: default_tile_url(),
            icon_size: default_icon_size(),
            icons: IconConfig::default(),
        }
    }
}

fn default_center() -> [f64; 2] {
    [37.7749, -122.4194]
}

fn default_zoom() -> u8 {
    3
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_icon_size() -> u32 {
    32
}

/// Icon asset names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconConfig {
    #[serde(default = "default_hotel_icon")]
    pub hotel: String,
    #[serde(default = "default_restaurant_icon")]
    pub restaurant: String,
    #[serde(default = "default_cafe_icon")]
    pub cafe: String,
    #[serde(default = "default_fallback_icon")]
    pub default: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            hotel: default_hotel_icon(),
            restaurant: default_restaurant_icon(),
            cafe: default_cafe_icon(),
            default: default_fallback_icon(),
        }
    }
}

impl IconConfig {
    /// Asset for a resolved marker icon.
    pub fn asset(&self, icon: MarkerIcon) -> &str {
        match icon {
            MarkerIcon::Hotel => &self.hotel,
            MarkerIcon::Restaurant => &self.restaurant,
            MarkerIcon::Cafe => &self.cafe,
            MarkerIcon::Default => &self.default,
        }
    }
}

fn default_hotel_icon() -> String {
    "icon.png".to_string()
}

fn default_restaurant_icon() -> String {
    "restaurant-building.png".to_string()
}

fn default_cafe_icon() -> String {
    "cafe.png".to_string()
}

fn default_fallback_icon() -> String {
    "delete-button.png".to_string()
}

/// Chart view settings, passed through to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Bar fill color.
    #[serde(default = "default_fill")]
    pub fill: String,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            fill: default_fill(),
            height: default_height(),
        }
    }
}

fn default_fill() -> String {
    "#4F46E5".to_string()
}

fn default_height() -> u32 {
    300
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.locdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(ref title) = args.title {
            self.display.title = title.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
