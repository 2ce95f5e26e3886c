//! Test fixture creation for the server databases

use super::constants::*;
use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;
use unread_posts_server::content::{ContentStore, NewPost, PostStatus, SqliteContentStore};
use unread_posts_server::read_state::PostId;
use unread_posts_server::{AccountManager, SqliteAccountStore};

/// Creates the accounts database with a regular and an admin account.
pub fn create_test_accounts(dir: &TempDir) -> Result<Arc<SqliteAccountStore>> {
    let store = Arc::new(SqliteAccountStore::new(dir.path().join("accounts.db"))?);
    let manager = AccountManager::new(store.clone());
    manager.create_account(TEST_USER, TEST_PASS, false)?;
    manager.create_account(ADMIN_USER, ADMIN_PASS, true)?;
    Ok(store)
}

fn new_post(id: u64, post_type: &str, status: PostStatus, title: &str) -> Result<NewPost> {
    Ok(NewPost {
        id: Some(PostId::new(id)?),
        post_type: post_type.to_string(),
        status,
        title: title.to_string(),
        content: format!("<p>Content of {}</p>", title),
        published: Some(1_700_000_000 + id as i64 * 3600),
    })
}

/// Creates the content database with four published posts, a draft and a page.
/// Permalinks point at `site_url`.
pub fn create_test_content(dir: &TempDir, site_url: &str) -> Result<SqliteContentStore> {
    let store = SqliteContentStore::new(dir.path().join("content.db"), site_url)?;
    for (id, title) in [
        (POST_3_ID, POST_3_TITLE),
        (POST_5_ID, POST_5_TITLE),
        (POST_7_ID, POST_7_TITLE),
        (POST_9_ID, POST_9_TITLE),
    ] {
        store.create_post(new_post(id, "post", PostStatus::Publish, title)?)?;
    }
    store.create_post(new_post(DRAFT_ID, "post", PostStatus::Draft, "Unfinished")?)?;
    store.create_post(new_post(PAGE_ID, "page", PostStatus::Publish, PAGE_TITLE)?)?;
    Ok(store)
}
