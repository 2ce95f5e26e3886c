mod content_store;
mod models;
mod sqlite_content_store;

pub use content_store::ContentStore;
pub use models::{
    ContentItem, ContentQuery, ContentQueryResult, NewPost, Post, PostOrder, PostStatus, PostType,
};
pub use sqlite_content_store::SqliteContentStore;
