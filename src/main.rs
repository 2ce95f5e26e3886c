use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unread_posts_server::config::{AppConfig, CliConfig, FileConfig};
use unread_posts_server::{
    run_server, RequestsLoggingLevel, ServerConfig, SqliteAccountStore, SqliteContentStore,
    SqliteSettingsStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the content, accounts and settings databases.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Site title, also used to name the read state cookie.
    #[clap(long)]
    pub site_title: Option<String>,

    /// Public base URL used to build permalinks.
    #[clap(long)]
    pub site_url: Option<String>,

    /// Domain attribute of the read state cookie.
    #[clap(long)]
    pub cookie_domain: Option<String>,

    /// Path attribute of the read state cookie.
    #[clap(long)]
    pub cookie_path: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            site_title: self.site_title.clone(),
            site_url: self.site_url.clone(),
            cookie_domain: self.cookie_domain.clone(),
            cookie_path: self.cookie_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Opening SQLite content database at {:?}...",
        app_config.content_db_path()
    );
    let content_store = Arc::new(SqliteContentStore::new(
        app_config.content_db_path(),
        &app_config.site_url,
    )?);

    info!(
        "Opening SQLite accounts database at {:?}...",
        app_config.accounts_db_path()
    );
    let account_store = Arc::new(SqliteAccountStore::new(app_config.accounts_db_path())?);

    let settings_store = Arc::new(SqliteSettingsStore::new(app_config.settings_db_path())?);

    let hooks = app_config.hooks();
    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        site_title: app_config.site_title.clone(),
        read_state_cookie: app_config.read_state_cookie_settings(),
        read_posts_meta_key: app_config.read_posts_meta_key.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    run_server(
        server_config,
        account_store,
        content_store,
        settings_store,
        hooks,
    )
    .await
}
