use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{PostId, PostIds, ReadPostSet, ReadStateError, ReadStateStore};
use crate::account::AccountMetaStore;

pub const DEFAULT_READ_POSTS_META_KEY: &str = "up_read_posts";

/// Read state of an authenticated account, kept as a JSON array in one of the
/// account's metadata fields. Every write replaces the whole array.
pub struct PersistentReadStateStore {
    meta_store: Arc<dyn AccountMetaStore>,
    account_id: usize,
    meta_key: String,
    read_posts: ReadPostSet,
}

impl PersistentReadStateStore {
    pub fn load(
        meta_store: Arc<dyn AccountMetaStore>,
        account_id: usize,
        meta_key: impl Into<String>,
    ) -> Result<Self, ReadStateError> {
        let meta_key = meta_key.into();
        let stored = meta_store
            .get_account_meta(account_id, &meta_key)
            .context("Failed to load read posts")?;

        let read_posts = match stored {
            None => ReadPostSet::new(),
            Some(raw) => match serde_json::from_str::<Vec<PostId>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(err) => {
                    warn!(
                        "Ignoring unreadable {} of account {}, starting from an empty read set: {}",
                        meta_key, account_id, err
                    );
                    ReadPostSet::new()
                }
            },
        };

        Ok(PersistentReadStateStore {
            meta_store,
            account_id,
            meta_key,
            read_posts,
        })
    }

    pub fn account_id(&self) -> usize {
        self.account_id
    }

    /// Stores `read_posts`, which becomes the in-memory set only once stored.
    fn write(&mut self, read_posts: ReadPostSet) -> Result<(), ReadStateError> {
        let serialized = serde_json::to_string(&read_posts.to_vec())
            .map_err(|e| ReadStateError::Encoding(e.to_string()))?;
        self.meta_store
            .set_account_meta(self.account_id, &self.meta_key, &serialized)
            .context("Failed to store read posts")?;
        self.read_posts = read_posts;
        Ok(())
    }
}

impl ReadStateStore for PersistentReadStateStore {
    fn mark_read(&mut self, ids: &PostIds) -> Result<(), ReadStateError> {
        let mut updated = self.read_posts.clone();
        if !updated.insert_all(ids) {
            debug!(
                "All {} posts already read by account {}",
                ids.len(),
                self.account_id
            );
            return Ok(());
        }
        self.write(updated)
    }

    fn mark_unread(&mut self, ids: &PostIds) -> Result<(), ReadStateError> {
        let mut updated = self.read_posts.clone();
        if !updated.remove_all(ids) {
            debug!(
                "None of {} posts were read by account {}",
                ids.len(),
                self.account_id
            );
            return Ok(());
        }
        self.write(updated)
    }

    fn read_ids(&self) -> Vec<PostId> {
        self.read_posts.to_vec()
    }

    fn delete_all(&mut self) -> Result<(), ReadStateError> {
        self.meta_store
            .delete_account_meta(self.account_id, &self.meta_key)
            .context("Failed to delete read posts")?;
        self.read_posts.clear();
        Ok(())
    }
}
