use super::RequestsLoggingLevel;
use crate::read_state::{ReadStateCookieSettings, DEFAULT_READ_POSTS_META_KEY};

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub site_title: String,
    /// Cookie carrying the read state of anonymous visitors.
    pub read_state_cookie: ReadStateCookieSettings,
    /// Account metadata key holding the read state of authenticated visitors.
    pub read_posts_meta_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let site_title = crate::config::DEFAULT_SITE_TITLE.to_string();
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            read_state_cookie: ReadStateCookieSettings::for_site(&site_title),
            site_title,
            read_posts_meta_key: DEFAULT_READ_POSTS_META_KEY.to_string(),
        }
    }
}
