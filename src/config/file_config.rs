use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Same keys as the CLI arguments, TOML wins when both are given
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub site_title: Option<String>,
    pub site_url: Option<String>,
    pub cookie_domain: Option<String>,
    pub cookie_path: Option<String>,

    // Only settable from the file
    pub cookie_name: Option<String>,
    pub read_posts_meta_key: Option<String>,
    pub show_widget: Option<bool>,
    pub show_settings_page: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
