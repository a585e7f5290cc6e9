//! Configuration: a TOML file where every field has a default.
//!
//! ```toml
//! [window]
//! width = 1280
//!
//! [stroke]
//! color = { r = 255, g = 200, b = 80 }
//!
//! [simplify]
//! fixed_epsilon = 0.75
//!
//! [view]
//! max_scale = 4.0
//! show_grid = false
//! ```

use crate::error::Error;
use crate::render::StepRange;
use crate::simplify::Tolerance;
use crate::types::{Color, Zoom};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub stroke: StrokeConfig,
    pub simplify: SimplifyConfig,
    pub render: RenderConfig,
    pub view: ViewConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 900, height: 600, title: "Scratch Pad".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub thickness: u8,
    /// Ink on the layer.
    pub color: Color,
    /// Ink for the not-yet-smoothed stroke under the cursor.
    pub preview_color: Color,
    pub background: Color,
    /// Squared distance below which a connected sample is treated as jitter (0 = off).
    pub min_spacing: f32,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            thickness: 3,
            color: Color::WHITE,
            preview_color: Color::rgba(0, 100, 100, 150),
            background: Color::BLACK,
            min_spacing: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    pub epsilon_scale: f64,
    pub min_epsilon: f64,
    /// When set, replaces the adaptive tolerance.
    pub fixed_epsilon: Option<f64>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self { epsilon_scale: 1e-3, min_epsilon: 1e-3, fixed_epsilon: None }
    }
}

impl SimplifyConfig {
    pub fn tolerance(&self) -> Tolerance {
        match self.fixed_epsilon {
            Some(eps) => Tolerance::Fixed(eps),
            None => Tolerance::Adaptive { scale: self.epsilon_scale, min: self.min_epsilon },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub steps_base: f32,
    pub steps_range: f32,
    pub steps_min: u32,
    pub steps_max: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let s = StepRange::default();
        Self { steps_base: s.base, steps_range: s.range, steps_min: s.min, steps_max: s.max }
    }
}

impl RenderConfig {
    pub fn step_range(&self) -> StepRange {
        StepRange { base: self.steps_base, range: self.steps_range, min: self.steps_min, max: self.steps_max }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Scale factor per wheel notch.
    pub zoom_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub show_grid: bool,
    /// Grid cell size in stroke-space units.
    pub grid_spacing: f32,
    pub grid_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let z = Zoom::default();
        Self {
            zoom_step: z.step,
            min_scale: z.min,
            max_scale: z.max,
            show_grid: true,
            grid_spacing: 50.0,
            grid_color: Color::rgb(45, 45, 45),
        }
    }
}

impl ViewConfig {
    pub fn zoom(&self) -> Zoom {
        Zoom { step: self.zoom_step, min: self.min_scale, max: self.max_scale.max(self.min_scale) }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("Pictures"), prefix: "__image__".to_string() }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| Error::ConfigRead { path: path.to_path_buf(), source })?;
        Self::parse(&content).map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.window.width, 900);
        assert_eq!(cfg.simplify.tolerance(), Tolerance::default());
        assert_eq!(cfg.render.step_range(), StepRange::default());
        assert_eq!(cfg.view.zoom(), Zoom::default());
        assert!(cfg.view.show_grid);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            r#"
            [stroke]
            color = { r = 255, g = 200, b = 80 }
            min_spacing = 0.0

            [simplify]
            fixed_epsilon = 0.75

            [render]
            steps_min = 10
            steps_max = 100

            [view]
            max_scale = 4.0
            show_grid = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.stroke.color, Color::rgb(255, 200, 80));
        assert_eq!(cfg.stroke.thickness, 3);
        assert_eq!(cfg.stroke.min_spacing, 0.0);
        assert_eq!(cfg.simplify.tolerance(), Tolerance::Fixed(0.75));
        assert_eq!(cfg.render.step_range().min, 10);
        assert_eq!(cfg.render.step_range().base, 70.0);
        assert_eq!(cfg.view.zoom(), Zoom { step: 1.1, min: 0.1, max: 4.0 });
        assert!(!cfg.view.show_grid);
        assert_eq!(cfg.view.grid_spacing, 50.0);
        assert_eq!(cfg.export, ExportConfig::default());
    }

    #[test]
    fn bad_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pad.toml");
        std::fs::write(&path, "[window]\nwidth = \"wide\"\n").unwrap();
        match Config::load(&path) {
            Err(Error::ConfigParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(matches!(Config::load(&dir.path().join("missing.toml")), Err(Error::ConfigRead { .. })));
    }
}
