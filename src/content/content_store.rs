use anyhow::Result;

use super::models::{ContentQuery, ContentQueryResult, NewPost, Post, PostType};
use crate::read_state::PostId;

/// Repository of posts and post types.
pub trait ContentStore: Send + Sync {
    /// Returns the post with the given id, whatever its status.
    fn get_post(&self, id: PostId) -> Result<Option<Post>>;

    /// Runs a listing query. `found` counts every match, `items` honors the limit.
    fn query_posts(&self, query: &ContentQuery) -> Result<ContentQueryResult>;

    /// Registered post types, optionally only the public ones.
    fn get_post_types(&self, public_only: bool) -> Result<Vec<PostType>>;

    /// Registers a post type, or updates its label and visibility.
    fn put_post_type(&self, post_type: &PostType) -> Result<()>;

    /// Stores a new post and returns its id.
    fn create_post(&self, post: NewPost) -> Result<PostId>;

    /// Public URL of a post.
    fn permalink(&self, id: PostId) -> String;
}
