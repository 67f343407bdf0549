use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "MUTATION_AGE_FIGURES_CONFIG";

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "figures.toml";

/// Rendering options shared by every figure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Style {
    #[serde(default = "Style::default_dpi")]
    pub dpi: u32,
    /// Multiplier applied to every font size.
    #[serde(default = "Style::default_font_scale")]
    pub font_scale: f64,
    #[serde(default = "Style::default_font_family")]
    pub font_family: String,
}

impl Style {
    fn default_dpi() -> u32 {
        400
    }
    fn default_font_scale() -> f64 {
        1.0
    }
    fn default_font_family() -> String {
        "sans-serif".to_string()
    }

    /// Pixel dimensions of a figure of `width` x `height` inches.
    pub fn canvas_size(&self, (width, height): (f64, f64)) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (width * dpi).round().max(1.0) as u32,
            (height * dpi).round().max(1.0) as u32,
        )
    }

    /// Font height in pixels for a size given in points.
    pub fn font_px(&self, points: f64) -> f64 {
        (points * self.dpi as f64 / 72.0 * self.font_scale).max(1.0)
    }

    /// Length in pixels for a size given in points (line widths, markers).
    pub fn px(&self, points: f64) -> i32 {
        (points * self.dpi as f64 / 72.0).round().max(1.0) as i32
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            dpi: Self::default_dpi(),
            font_scale: Self::default_font_scale(),
            font_family: Self::default_font_family(),
        }
    }
}

/// Row boundaries of the merged TMRCA matrix: rows `[0, hgdp_end)` are HGDP
/// populations, `[hgdp_end, tgp_end)` 1000 Genomes, `[tgp_end, sgdp_end)` SGDP,
/// and everything after are ancient samples.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelLayout {
    #[serde(default = "PanelLayout::default_hgdp_end")]
    pub hgdp_end: usize,
    #[serde(default = "PanelLayout::default_tgp_end")]
    pub tgp_end: usize,
    #[serde(default = "PanelLayout::default_sgdp_end")]
    pub sgdp_end: usize,
}

impl PanelLayout {
    fn default_hgdp_end() -> usize {
        54
    }
    fn default_tgp_end() -> usize {
        80
    }
    fn default_sgdp_end() -> usize {
        210
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            hgdp_end: Self::default_hgdp_end(),
            tgp_end: Self::default_tgp_end(),
            sgdp_end: Self::default_sgdp_end(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory containing `simulated-data/`, `all-data/` and `data/`.
    #[serde(default = "Config::default_data_root")]
    pub data_root: PathBuf,
    #[serde(default = "Config::default_output_dir")]
    pub output_dir: PathBuf,
    /// Years per generation.
    #[serde(default = "Config::default_generation_time")]
    pub generation_time: f64,
    /// Seed for scatter jitter, so reruns produce identical images.
    #[serde(default = "Config::default_jitter_seed")]
    pub jitter_seed: u64,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub layout: PanelLayout,
}

impl Config {
    fn default_data_root() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_output_dir() -> PathBuf {
        PathBuf::from("figures")
    }
    fn default_generation_time() -> f64 {
        25.0
    }
    fn default_jitter_seed() -> u64 {
        42
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load the config named by `MUTATION_AGE_FIGURES_CONFIG`, else `figures.toml`
    /// if present, else the defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
        Ok(Self::default())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: Self::default_data_root(),
            output_dir: Self::default_output_dir(),
            generation_time: Self::default_generation_time(),
            jitter_seed: Self::default_jitter_seed(),
            style: Style::default(),
            layout: PanelLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            output_dir = "out"
            [style]
            dpi = 72
            "#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.style.dpi, 72);
        assert_eq!(cfg.style.font_scale, 1.0);
        assert_eq!(cfg.layout, PanelLayout::default());
        assert_eq!(cfg.generation_time, 25.0);
    }

    #[test]
    fn canvas_size_scales_with_dpi() {
        let style = Style {
            dpi: 100,
            ..Style::default()
        };
        assert_eq!(style.canvas_size((12.0, 6.0)), (1200, 600));
        assert_eq!(style.font_px(72.0), 100.0);
    }
}
