//! Per-visitor record of read posts.
//!
//! Anonymous visitors keep their record in a cookie, authenticated accounts in
//! their account metadata. Both sit behind [`ReadStateStore`], and
//! [`ReadStateStoreFactory`] picks one per request from the visitor's
//! [`ReadStateBackend`].

mod backend;
pub mod cookie_codec;
mod cookie_store;
mod persistent_store;
pub(crate) mod post_id;
mod store;

#[cfg(test)]
mod properties;

pub use backend::{ReadStateBackend, ReadStateStoreFactory};
pub use cookie_store::{
    default_cookie_name, slugify, CookieReadStateStore, ReadStateCookieSettings,
    COOKIE_LIFETIME_DAYS,
};
pub use persistent_store::{PersistentReadStateStore, DEFAULT_READ_POSTS_META_KEY};
pub use post_id::{PostId, PostIds};
pub use store::{ReadPostSet, ReadStateError, ReadStateStore};
