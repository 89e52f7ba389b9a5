use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub education_url: String,
    pub counties_url: String,
    /// Object collection holding the county geometries when the counties
    /// document is a topology.
    pub counties_object: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Horizontal screen scale applied to the pre-projected coordinates.
    pub scale_x: f64,
    /// Vertical screen scale.
    pub scale_y: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub site_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
