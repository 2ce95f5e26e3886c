//! Listing of the posts a visitor has not read yet.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::content::{ContentItem, ContentQuery, ContentStore, PostOrder, PostStatus};
use crate::hooks::Hooks;
use crate::read_state::PostId;
use crate::settings::{ListingSettings, WidgetInstance, DEFAULT_POST_TYPE};

/// What to list. The read ids to exclude are passed separately.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UnreadRequest {
    pub post_types: Vec<String>,
    /// Maximum number of posts, None for all.
    pub count: Option<usize>,
    pub orderby: PostOrder,
}

impl Default for UnreadRequest {
    fn default() -> Self {
        UnreadRequest {
            post_types: vec![DEFAULT_POST_TYPE.to_string()],
            count: None,
            orderby: PostOrder::Date,
        }
    }
}

impl UnreadRequest {
    /// Request for the section shown below a post of type `current_post_type`.
    pub fn for_section(settings: &ListingSettings, current_post_type: &str) -> Self {
        UnreadRequest {
            post_types: settings.listed_post_types(current_post_type),
            count: Some(settings.count),
            orderby: settings.orderby,
        }
    }
}

impl From<&WidgetInstance> for UnreadRequest {
    fn from(instance: &WidgetInstance) -> Self {
        UnreadRequest {
            post_types: instance.post_types.clone(),
            count: Some(instance.count),
            orderby: instance.orderby,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnreadResult {
    /// Number of unread posts, regardless of the requested count.
    pub found: usize,
    pub items: Vec<ContentItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnreadPosts {
    /// Nothing left to read.
    Empty,
    Found(UnreadResult),
}

impl UnreadPosts {
    pub fn as_result(&self) -> Option<&UnreadResult> {
        match self {
            UnreadPosts::Empty => None,
            UnreadPosts::Found(result) => Some(result),
        }
    }

    pub fn found(&self) -> usize {
        self.as_result().map(|r| r.found).unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct UnreadQueryService {
    content_store: Arc<dyn ContentStore>,
    hooks: Arc<Hooks>,
}

impl UnreadQueryService {
    pub fn new(content_store: Arc<dyn ContentStore>, hooks: Arc<Hooks>) -> Self {
        UnreadQueryService {
            content_store,
            hooks,
        }
    }

    /// The content query for `request`, after the `unread_query` hook.
    pub fn build_query(&self, read_ids: &[PostId], request: &UnreadRequest) -> ContentQuery {
        let post_types = if request.post_types.is_empty() {
            vec![DEFAULT_POST_TYPE.to_string()]
        } else {
            request.post_types.clone()
        };
        self.hooks.unread_query(ContentQuery {
            post_types,
            status: PostStatus::Publish,
            exclude: read_ids.to_vec(),
            order: request.orderby,
            limit: request.count,
        })
    }

    pub fn get_unread(&self, read_ids: &[PostId], request: &UnreadRequest) -> Result<UnreadPosts> {
        let query = self.build_query(read_ids, request);
        let result = self.content_store.query_posts(&query)?;
        debug!(
            "{} unread posts of types {:?}, {} read excluded",
            result.found,
            query.post_types,
            query.exclude.len()
        );
        if result.found == 0 {
            return Ok(UnreadPosts::Empty);
        }
        Ok(UnreadPosts::Found(UnreadResult {
            found: result.found,
            items: result.items,
        }))
    }
}
