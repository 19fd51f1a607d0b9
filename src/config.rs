// Configuration handling for fingerpaint
//
// This file defines the configuration structure and provides
// functionality to load and save configuration from/to files.
// Every field has a default, so a partial (or missing) file is fine.

use crate::canvas::CanvasOptions;
use crate::error::Error;
use crate::types::{Color, StrokeStyle};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

/// How frames reach the screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// A render thread redraws at a fixed cadence.
    #[default]
    Continuous,
    /// No render thread; redraw right after each input or state change.
    OnDemand,
}

/// One palette entry, e.g. `{ name = "red", rgb = [255, 0, 0] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: String,
    pub rgb: [u8; 3],
}

impl PaletteColor {
    fn new(name: &str, rgb: [u8; 3]) -> Self {
        Self { name: name.to_string(), rgb }
    }

    pub fn color(&self) -> Color {
        Rgb(self.rgb)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "fingerpaint".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Ink sizes in density-independent units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrokeConfig {
    pub width_dp: f32,
    pub marker_radius_dp: f32,
    pub density: f32, // pixels per dp
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            width_dp: StrokeStyle::DEFAULT_WIDTH_DP,
            marker_radius_dp: StrokeStyle::DEFAULT_MARKER_RADIUS_DP,
            density: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// In continuous mode, also redraw right after each pointer event.
    pub immediate_feedback: bool,
    pub frame_interval_ms: u64,
    pub join_timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Continuous,
            immediate_feedback: false,
            frame_interval_ms: 16,
            join_timeout_ms: 1000,
        }
    }
}

/// Configuration for the drawing window and canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the palette entry selected at startup.
    pub initial_color: String,
    pub window: WindowConfig,
    pub stroke: StrokeConfig,
    pub render: RenderConfig,
    pub palette: Vec<PaletteColor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_color: "red".to_string(),
            window: WindowConfig::default(),
            stroke: StrokeConfig::default(),
            render: RenderConfig::default(),
            palette: vec![
                PaletteColor::new("red", [255, 0, 0]),
                PaletteColor::new("yellow", [255, 255, 0]),
                PaletteColor::new("blue", [0, 0, 255]),
                PaletteColor::new("green", [0, 255, 0]),
            ],
        }
    }
}

impl AppConfig {
    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("fingerpaint")
        } else {
            PathBuf::from(".config/fingerpaint")
        };

        config_dir.join("config.toml")
    }

    /// Load configuration from the default location, creating it if missing
    pub fn load_from_file() -> Result<Self, Error> {
        Self::load_from_path(&Self::get_config_path())
    }

    /// Load configuration from `path`, writing defaults there if the file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let default_config = Self::default();
                default_config.save_to_path(path)?;
                Ok(default_config)
            }
            Err(e) => Err(Error::Config(format!("read {}: {e}", path.display()))),
        }
    }

    /// Save configuration to `path`
    pub fn save_to_path(&self, path: &Path) -> Result<(), Error> {
        // Create the directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        let density = if self.stroke.density > 0.0 { self.stroke.density } else { 1.0 };
        StrokeStyle::from_dp(self.stroke.width_dp, self.stroke.marker_radius_dp, density)
    }

    /// Look a palette entry up by name (case-insensitive).
    pub fn palette_color(&self, name: &str) -> Option<Color> {
        self.palette
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(PaletteColor::color)
    }

    /// The startup color: `initial_color` if it names a palette entry,
    /// else the first entry, else red.
    pub fn initial_color(&self) -> Color {
        self.palette_color(&self.initial_color)
            .or_else(|| self.palette.first().map(PaletteColor::color))
            .unwrap_or(Rgb([255, 0, 0]))
    }

    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            initial_color: self.initial_color(),
            style: self.stroke_style(),
            mode: self.render.mode,
            immediate_feedback: self.render.immediate_feedback,
            frame_interval: Duration::from_millis(self.render.frame_interval_ms.max(1)),
            join_timeout: Duration::from_millis(self.render.join_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let config = AppConfig::load_from_path(&path).expect("load");
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_from_path(&path).expect("reload");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
initial_color = "Blue"

[stroke]
density = 2.0

[render]
mode = "on_demand"
"#,
        )
        .expect("write");

        let config = AppConfig::load_from_path(&path).expect("load");
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.stroke.width_dp, 8.0);
        assert_eq!(config.render.mode, RenderMode::OnDemand);
        assert_eq!(config.render.frame_interval_ms, 16);
        assert_eq!(config.initial_color(), Rgb([0, 0, 255]));
        assert_eq!(
            config.stroke_style(),
            StrokeStyle { width: 16.0, marker_radius: 12.0 }
        );
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "palette = 7").expect("write");
        assert!(matches!(AppConfig::load_from_path(&path), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_initial_color_uses_first_palette_entry() {
        let config = AppConfig {
            initial_color: "mauve".to_string(),
            palette: vec![PaletteColor::new("green", [0, 255, 0])],
            ..AppConfig::default()
        };
        assert_eq!(config.initial_color(), Rgb([0, 255, 0]));
    }

    #[test]
    fn canvas_options_follow_render_section() {
        let mut config = AppConfig::default();
        config.render.frame_interval_ms = 0;
        config.render.join_timeout_ms = 250;
        let options = config.canvas_options();
        assert_eq!(options.frame_interval, Duration::from_millis(1));
        assert_eq!(options.join_timeout, Duration::from_millis(250));
        assert_eq!(options.initial_color, Rgb([255, 0, 0]));
    }
}
