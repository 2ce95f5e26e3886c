mod file_config;

pub use file_config::FileConfig;

use crate::hooks::Hooks;
use crate::read_state::{ReadStateCookieSettings, DEFAULT_READ_POSTS_META_KEY};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_SITE_TITLE: &str = "Unread Posts";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub site_title: Option<String>,
    pub site_url: Option<String>,
    pub cookie_domain: Option<String>,
    pub cookie_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub site_title: String,
    /// Base of the permalinks, without trailing slash.
    pub site_url: String,
    pub cookie_domain: Option<String>,
    pub cookie_path: String,
    /// Replaces the cookie name derived from the site title.
    pub cookie_name: Option<String>,
    pub read_posts_meta_key: String,
    pub show_widget: bool,
    pub show_settings_page: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let site_title = file
            .site_title
            .or_else(|| cli.site_title.clone())
            .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

        let site_url = file
            .site_url
            .or_else(|| cli.site_url.clone())
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let cookie_domain = file.cookie_domain.or_else(|| cli.cookie_domain.clone());
        let cookie_path = file
            .cookie_path
            .or_else(|| cli.cookie_path.clone())
            .unwrap_or_else(|| "/".to_string());
        if !cookie_path.starts_with('/') {
            bail!("cookie_path must start with '/': {}", cookie_path);
        }

        let cookie_name = file.cookie_name.filter(|name| !name.is_empty());
        let read_posts_meta_key = file
            .read_posts_meta_key
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_READ_POSTS_META_KEY.to_string());

        Ok(Self {
            db_dir,
            port,
            logging_level,
            site_title,
            site_url,
            cookie_domain,
            cookie_path,
            cookie_name,
            read_posts_meta_key,
            show_widget: file.show_widget.unwrap_or(true),
            show_settings_page: file.show_settings_page.unwrap_or(true),
        })
    }

    pub fn content_db_path(&self) -> PathBuf {
        self.db_dir.join("content.db")
    }

    pub fn accounts_db_path(&self) -> PathBuf {
        self.db_dir.join("accounts.db")
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.db_dir.join("settings.db")
    }

    /// Hooks carrying the overrides and toggles set in the config.
    pub fn hooks(&self) -> Hooks {
        let mut hooks = Hooks::default();
        if let Some(name) = self.cookie_name.clone() {
            hooks = hooks.with_cookie_name(move |_| name.clone());
        }
        hooks.show_widget = self.show_widget;
        hooks.show_settings_page = self.show_settings_page;
        hooks
    }

    /// Cookie settings for the anonymous read state. The `cookie_name` hook is
    /// applied later, when the server state is built.
    pub fn read_state_cookie_settings(&self) -> ReadStateCookieSettings {
        ReadStateCookieSettings {
            path: self.cookie_path.clone(),
            domain: self.cookie_domain.clone(),
            ..ReadStateCookieSettings::for_site(&self.site_title)
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
