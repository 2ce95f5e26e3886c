//! Overrides applied at fixed points of the read-state and listing flow.
//!
//! Every hook receives the value computed by default and returns the value to use.
//! A [`Hooks`] is built once at startup and shared read-only afterwards.

use std::sync::Arc;

use crate::content::{ContentQuery, PostType};
use crate::settings::ListingSettings;
use crate::unread::UnreadResult;

type Override<T> = Arc<dyn Fn(T) -> T + Send + Sync>;
type MarkupOverride = Arc<dyn Fn(String, &UnreadResult) -> String + Send + Sync>;

#[derive(Clone)]
pub struct Hooks {
    cookie_name: Option<Override<String>>,
    meta_key: Option<Override<String>>,
    usable_post_types: Option<Override<Vec<PostType>>>,
    unread_query: Option<Override<ContentQuery>>,
    section_settings: Option<Override<ListingSettings>>,
    section_markup: Option<MarkupOverride>,
    widget_markup: Option<MarkupOverride>,
    /// Whether the sidebar widget is available at all.
    pub show_widget: bool,
    /// Whether the admin settings endpoints are exposed.
    pub show_settings_page: bool,
}

impl Default for Hooks {
    fn default() -> Self {
        Hooks {
            cookie_name: None,
            meta_key: None,
            usable_post_types: None,
            unread_query: None,
            section_settings: None,
            section_markup: None,
            widget_markup: None,
            show_widget: true,
            show_settings_page: true,
        }
    }
}

fn apply<T>(hook: &Option<Override<T>>, value: T) -> T {
    match hook {
        Some(f) => f(value),
        None => value,
    }
}

impl Hooks {
    pub fn with_cookie_name(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.cookie_name = Some(Arc::new(f));
        self
    }

    pub fn with_meta_key(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.meta_key = Some(Arc::new(f));
        self
    }

    pub fn with_usable_post_types(
        mut self,
        f: impl Fn(Vec<PostType>) -> Vec<PostType> + Send + Sync + 'static,
    ) -> Self {
        self.usable_post_types = Some(Arc::new(f));
        self
    }

    pub fn with_unread_query(
        mut self,
        f: impl Fn(ContentQuery) -> ContentQuery + Send + Sync + 'static,
    ) -> Self {
        self.unread_query = Some(Arc::new(f));
        self
    }

    pub fn with_section_settings(
        mut self,
        f: impl Fn(ListingSettings) -> ListingSettings + Send + Sync + 'static,
    ) -> Self {
        self.section_settings = Some(Arc::new(f));
        self
    }

    pub fn with_section_markup(
        mut self,
        f: impl Fn(String, &UnreadResult) -> String + Send + Sync + 'static,
    ) -> Self {
        self.section_markup = Some(Arc::new(f));
        self
    }

    pub fn with_widget_markup(
        mut self,
        f: impl Fn(String, &UnreadResult) -> String + Send + Sync + 'static,
    ) -> Self {
        self.widget_markup = Some(Arc::new(f));
        self
    }

    pub fn cookie_name(&self, default: String) -> String {
        apply(&self.cookie_name, default)
    }

    pub fn meta_key(&self, default: String) -> String {
        apply(&self.meta_key, default)
    }

    pub fn usable_post_types(&self, default: Vec<PostType>) -> Vec<PostType> {
        apply(&self.usable_post_types, default)
    }

    pub fn unread_query(&self, default: ContentQuery) -> ContentQuery {
        apply(&self.unread_query, default)
    }

    pub fn section_settings(&self, default: ListingSettings) -> ListingSettings {
        apply(&self.section_settings, default)
    }

    pub fn section_markup(&self, default: String, unread: &UnreadResult) -> String {
        match &self.section_markup {
            Some(f) => f(default, unread),
            None => default,
        }
    }

    pub fn widget_markup(&self, default: String, unread: &UnreadResult) -> String {
        match &self.widget_markup {
            Some(f) => f(default, unread),
            None => default,
        }
    }
}
