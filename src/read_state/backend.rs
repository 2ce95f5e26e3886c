use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;

use super::{
    CookieReadStateStore, PersistentReadStateStore, ReadStateCookieSettings, ReadStateError,
    ReadStateStore,
};
use crate::account::AccountMetaStore;

/// Where a visitor's read state lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ReadStateBackend {
    /// Anonymous visitor, state carried by a cookie.
    Cookie,
    /// Authenticated account, state kept in account metadata.
    Persistent { account_id: usize },
}

impl ReadStateBackend {
    pub fn for_account(account_id: Option<usize>) -> Self {
        match account_id {
            Some(account_id) => ReadStateBackend::Persistent { account_id },
            None => ReadStateBackend::Cookie,
        }
    }
}

/// Opens the store matching a visitor's [`ReadStateBackend`].
#[derive(Clone)]
pub struct ReadStateStoreFactory {
    cookie_settings: ReadStateCookieSettings,
    meta_key: String,
    meta_store: Arc<dyn AccountMetaStore>,
}

impl ReadStateStoreFactory {
    pub fn new(
        cookie_settings: ReadStateCookieSettings,
        meta_key: impl Into<String>,
        meta_store: Arc<dyn AccountMetaStore>,
    ) -> Self {
        ReadStateStoreFactory {
            cookie_settings,
            meta_key: meta_key.into(),
            meta_store,
        }
    }

    pub fn cookie_settings(&self) -> &ReadStateCookieSettings {
        &self.cookie_settings
    }

    pub fn meta_key(&self) -> &str {
        &self.meta_key
    }

    pub fn open(
        &self,
        backend: ReadStateBackend,
        jar: &CookieJar,
    ) -> Result<Box<dyn ReadStateStore>, ReadStateError> {
        Ok(match backend {
            ReadStateBackend::Cookie => Box::new(CookieReadStateStore::from_jar(
                self.cookie_settings.clone(),
                jar,
            )),
            ReadStateBackend::Persistent { account_id } => {
                Box::new(PersistentReadStateStore::load(
                    self.meta_store.clone(),
                    account_id,
                    self.meta_key.clone(),
                )?)
            }
        })
    }
}
