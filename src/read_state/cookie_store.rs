use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::cookie_codec::{decode_read_posts, encode_read_posts};
use super::{PostId, PostIds, ReadPostSet, ReadStateError, ReadStateStore};

pub const READ_POSTS_COOKIE_SUFFIX: &str = "-up_read_posts";
pub const COOKIE_LIFETIME_DAYS: i64 = 365 * 10;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9_\-]+").unwrap();
    static ref REPEATED_DASHES: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Lowercases `s` and turns every run of characters that are not letters, digits,
/// underscores or dashes into a single dash.
pub fn slugify(s: &str) -> String {
    let lower = s.to_lowercase();
    let dashed = NON_SLUG_CHARS.replace_all(&lower, "-");
    let collapsed = REPEATED_DASHES.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

pub fn default_cookie_name(site_title: &str) -> String {
    slugify(&format!("{}{}", site_title, READ_POSTS_COOKIE_SUFFIX))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadStateCookieSettings {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
}

impl ReadStateCookieSettings {
    pub fn for_site(site_title: &str) -> Self {
        ReadStateCookieSettings {
            name: default_cookie_name(site_title),
            path: "/".to_string(),
            domain: None,
        }
    }
}

/// Read state of an anonymous visitor, carried by a browser cookie.
///
/// Changes are not sent anywhere by themselves: the caller must attach the
/// cookies returned by [`ReadStateStore::drain_response_cookies`] to the response.
pub struct CookieReadStateStore {
    settings: ReadStateCookieSettings,
    read_posts: ReadPostSet,
    presented_cookie: bool,
    pending_cookie: Option<Cookie<'static>>,
}

impl CookieReadStateStore {
    pub fn from_jar(settings: ReadStateCookieSettings, jar: &CookieJar) -> Self {
        let value = jar.get(&settings.name).map(|c| c.value().to_string());
        Self::from_cookie_value(settings, value.as_deref())
    }

    pub fn from_cookie_value(settings: ReadStateCookieSettings, value: Option<&str>) -> Self {
        let read_posts = match value {
            Some(value) if !value.is_empty() => match decode_read_posts(value) {
                Ok(read_posts) => read_posts,
                Err(err) => {
                    warn!(
                        "Ignoring unreadable {} cookie, starting from an empty read set: {}",
                        settings.name, err
                    );
                    ReadPostSet::new()
                }
            },
            _ => ReadPostSet::new(),
        };

        CookieReadStateStore {
            presented_cookie: value.is_some(),
            settings,
            read_posts,
            pending_cookie: None,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.settings.name
    }

    fn scoped_cookie(&self, value: String) -> Cookie<'static> {
        let mut builder = Cookie::build((self.settings.name.clone(), value))
            .path(self.settings.path.clone())
            .same_site(SameSite::Lax)
            .http_only(false);
        if let Some(domain) = &self.settings.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    /// Queues the cookie for `read_posts`, which becomes the in-memory set only once
    /// encoded.
    fn write(&mut self, read_posts: ReadPostSet) -> Result<(), ReadStateError> {
        let value = encode_read_posts(&read_posts)?;
        let mut cookie = self.scoped_cookie(value);
        cookie.set_max_age(time::Duration::days(COOKIE_LIFETIME_DAYS));
        self.pending_cookie = Some(cookie);
        self.read_posts = read_posts;
        Ok(())
    }
}

impl ReadStateStore for CookieReadStateStore {
    fn mark_read(&mut self, ids: &PostIds) -> Result<(), ReadStateError> {
        let mut updated = self.read_posts.clone();
        if !updated.insert_all(ids) {
            debug!("All {} posts already read, cookie left untouched", ids.len());
            return Ok(());
        }
        self.write(updated)
    }

    fn mark_unread(&mut self, ids: &PostIds) -> Result<(), ReadStateError> {
        let mut updated = self.read_posts.clone();
        if !updated.remove_all(ids) {
            debug!("None of {} posts were read, cookie left untouched", ids.len());
            return Ok(());
        }
        self.write(updated)
    }

    fn read_ids(&self) -> Vec<PostId> {
        self.read_posts.to_vec()
    }

    fn delete_all(&mut self) -> Result<(), ReadStateError> {
        self.read_posts.clear();
        self.pending_cookie = if self.presented_cookie || self.pending_cookie.is_some() {
            let mut removal = self.scoped_cookie(String::new());
            removal.set_expires(time::OffsetDateTime::now_utc() - time::Duration::days(1));
            removal.set_max_age(time::Duration::ZERO);
            Some(removal)
        } else {
            None
        };
        self.presented_cookie = false;
        Ok(())
    }

    fn drain_response_cookies(&mut self) -> Vec<Cookie<'static>> {
        self.pending_cookie.take().into_iter().collect()
    }
}
