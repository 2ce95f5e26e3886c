use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::read_state::PostId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
        }
    }
}

impl FromStr for PostStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            _ => bail!("Unknown post status {}", s),
        }
    }
}

/// Ordering of listed posts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostOrder {
    /// Most recently published first.
    #[default]
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "rand")]
    Random,
}

impl PostOrder {
    pub fn label(&self) -> &'static str {
        match self {
            PostOrder::Date => "Latest Posts",
            PostOrder::Random => "Random Posts",
        }
    }
}

impl FromStr for PostOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date" => Ok(PostOrder::Date),
            "rand" => Ok(PostOrder::Random),
            _ => bail!("Unknown post order {}", s),
        }
    }
}

impl fmt::Display for PostOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostOrder::Date => write!(f, "date"),
            PostOrder::Random => write!(f, "rand"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostType {
    pub name: String,
    pub label: String,
    pub public: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub post_type: String,
    pub status: PostStatus,
    pub title: String,
    pub content: String,
    /// Unix seconds.
    pub published: i64,
}

#[derive(Clone, Debug)]
pub struct NewPost {
    /// Explicit id, or None to let the store assign one.
    pub id: Option<PostId>,
    pub post_type: String,
    pub status: PostStatus,
    pub title: String,
    pub content: String,
    /// Unix seconds, or None for now.
    pub published: Option<i64>,
}

/// A post as it appears in listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub id: PostId,
    pub post_type: String,
    pub title: String,
    pub permalink: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentQuery {
    /// Post types to include. Empty means any type.
    pub post_types: Vec<String>,
    pub status: PostStatus,
    /// Posts that must not appear in the result.
    pub exclude: Vec<PostId>,
    pub order: PostOrder,
    /// Maximum number of items, or None for all of them.
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentQueryResult {
    /// Number of matching posts, regardless of `limit`.
    pub found: usize,
    pub items: Vec<ContentItem>,
}
