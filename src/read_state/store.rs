use axum_extra::extract::cookie::Cookie;
use std::collections::BTreeSet;

use super::{PostId, PostIds};

#[derive(Debug, thiserror::Error)]
pub enum ReadStateError {
    #[error("invalid post id {0}: post ids must be positive integers")]
    InvalidPostId(i64),
    #[error("malformed post id {0:?}")]
    MalformedPostId(String),
    #[error("failed to encode read posts: {0}")]
    Encoding(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Per-visitor record of which posts have been read.
///
/// A store is bound to one visitor for the duration of one request. The set it
/// holds never contains duplicates, and writes only happen when the set changes.
pub trait ReadStateStore: Send {
    /// Adds the given posts to the read set.
    fn mark_read(&mut self, ids: &PostIds) -> Result<(), ReadStateError>;

    /// Removes the given posts from the read set.
    fn mark_unread(&mut self, ids: &PostIds) -> Result<(), ReadStateError>;

    /// All read post ids, ascending.
    fn read_ids(&self) -> Vec<PostId>;

    /// Destroys the whole record for this visitor.
    fn delete_all(&mut self) -> Result<(), ReadStateError>;

    /// Cookies that must be attached to the response for the changes to stick.
    fn drain_response_cookies(&mut self) -> Vec<Cookie<'static>> {
        Vec::new()
    }
}

/// The read set shared by every store implementation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadPostSet(BTreeSet<PostId>);

impl ReadPostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if at least one id was not already present.
    pub fn insert_all(&mut self, ids: &PostIds) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.0.insert(*id);
        }
        changed
    }

    /// Returns true if at least one id was present and got removed.
    pub fn remove_all(&mut self, ids: &PostIds) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.0.remove(id);
        }
        changed
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<PostId> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<PostId> for ReadPostSet {
    fn from_iter<T: IntoIterator<Item = PostId>>(iter: T) -> Self {
        ReadPostSet(iter.into_iter().collect())
    }
}
