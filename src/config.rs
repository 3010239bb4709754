use serde::Deserialize;
use std::path::PathBuf;

/// Optional TOML configuration for surface geometry, analysis, and colors.
/// Defaults mirror the stock layout: surfaces as wide as the bin count,
/// waveform/spectrum 300 px tall, spectrogram 250, label strip 50.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub surfaces: SurfacesConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
}

#[derive(Debug, Deserialize)]
pub struct SurfacesConfig {
    #[serde(default = "default_waveform_height")]
    pub waveform_height: u32,
    #[serde(default = "default_spectrum_height")]
    pub spectrum_height: u32,
    #[serde(default = "default_spectrogram_height")]
    pub spectrogram_height: u32,
    #[serde(default = "default_label_height")]
    pub label_height: u32,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// FFT window size. Bin count (and surface width) is half of this.
    #[serde(default = "default_transform_size")]
    pub transform_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ColorsConfig {
    /// Ordered anchor colors for the magnitude color scale.
    #[serde(default = "default_anchors")]
    pub anchors: Vec<String>,
    /// Label text size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Default for SurfacesConfig {
    fn default() -> Self {
        Self {
            waveform_height: default_waveform_height(),
            spectrum_height: default_spectrum_height(),
            spectrogram_height: default_spectrogram_height(),
            label_height: default_label_height(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            transform_size: default_transform_size(),
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            anchors: default_anchors(),
            font_size: default_font_size(),
        }
    }
}

fn default_waveform_height() -> u32 { 300 }
fn default_spectrum_height() -> u32 { 300 }
fn default_spectrogram_height() -> u32 { 250 }
fn default_label_height() -> u32 { 50 }
fn default_transform_size() -> usize { 4096 }
fn default_font_size() -> f32 { 10.0 }

fn default_anchors() -> Vec<String> {
    ["blue", "cyan", "green", "yellow", "red"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
