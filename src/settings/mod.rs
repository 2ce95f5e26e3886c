//! Site options: the listing section settings and the widget instance.

mod listing_settings;
mod sqlite_settings_store;

pub use listing_settings::{
    ListingSettings, PostTypeMode, WidgetInstance, DEFAULT_LISTING_COUNT, DEFAULT_POST_TYPE,
    DEFAULT_SECTION_TITLE,
};
pub use sqlite_settings_store::SqliteSettingsStore;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::hooks::Hooks;

pub const LISTING_SETTINGS_OPTION: &str = "unread_posts_section";
pub const WIDGET_INSTANCE_OPTION: &str = "unread_posts_widget";

/// Named option values, stored as text.
pub trait SettingsStore: Send + Sync {
    fn get_option(&self, name: &str) -> Result<Option<String>>;

    /// When the option was last written, if it exists.
    fn get_option_updated_at(&self, name: &str) -> Result<Option<DateTime<Utc>>>;

    /// Creates or replaces the option.
    fn set_option(&self, name: &str, value: &str) -> Result<()>;

    fn delete_option(&self, name: &str) -> Result<()>;
}

fn load_json_option<T: DeserializeOwned + Default>(store: &dyn SettingsStore, name: &str) -> Result<T> {
    let Some(raw) = store.get_option(name)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("Option {} is unreadable, using defaults: {}", name, err);
            Ok(T::default())
        }
    }
}

fn store_json_option<T: Serialize>(store: &dyn SettingsStore, name: &str, value: &T) -> Result<()> {
    let serialized =
        serde_json::to_string(value).with_context(|| format!("Failed to serialize {}", name))?;
    store.set_option(name, &serialized)
}

/// Stored listing settings, completed with defaults and passed through the
/// `section_settings` hook.
pub fn load_listing_settings(store: &dyn SettingsStore, hooks: &Hooks) -> Result<ListingSettings> {
    let settings = load_json_option(store, LISTING_SETTINGS_OPTION)?;
    Ok(hooks.section_settings(settings))
}

pub fn save_listing_settings(store: &dyn SettingsStore, settings: &ListingSettings) -> Result<()> {
    settings.validate()?;
    store_json_option(store, LISTING_SETTINGS_OPTION, settings)
}

pub fn load_widget_instance(store: &dyn SettingsStore) -> Result<WidgetInstance> {
    load_json_option(store, WIDGET_INSTANCE_OPTION)
}

pub fn save_widget_instance(store: &dyn SettingsStore, instance: &WidgetInstance) -> Result<()> {
    instance.validate()?;
    store_json_option(store, WIDGET_INSTANCE_OPTION, instance)
}
