use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::content::PostOrder;

pub const DEFAULT_SECTION_TITLE: &str = "Read Next";
pub const DEFAULT_LISTING_COUNT: usize = 5;
pub const DEFAULT_POST_TYPE: &str = "post";

/// Which post types the in-content section lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostTypeMode {
    /// Only posts of the same type as the one being viewed.
    #[default]
    Same,
    /// The types listed in [`ListingSettings::post_types`].
    Selected,
}

/// Configuration of the "unread posts" section appended to post content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    pub show: bool,
    pub title: String,
    pub count: usize,
    /// Post types whose pages get the section.
    pub show_for: Vec<String>,
    pub post_type_mode: PostTypeMode,
    pub post_types: Vec<String>,
    pub orderby: PostOrder,
}

impl Default for ListingSettings {
    fn default() -> Self {
        ListingSettings {
            show: false,
            title: DEFAULT_SECTION_TITLE.to_string(),
            count: DEFAULT_LISTING_COUNT,
            show_for: vec![DEFAULT_POST_TYPE.to_string()],
            post_type_mode: PostTypeMode::Same,
            post_types: vec![DEFAULT_POST_TYPE.to_string()],
            orderby: PostOrder::Date,
        }
    }
}

impl ListingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            bail!("count must be a positive number");
        }
        if self.post_type_mode == PostTypeMode::Selected && self.post_types.is_empty() {
            bail!("at least one post type must be selected");
        }
        Ok(())
    }

    pub fn is_shown_for(&self, post_type: &str) -> bool {
        self.show && self.show_for.iter().any(|t| t == post_type)
    }

    /// Post types to list below a post of type `current_post_type`.
    pub fn listed_post_types(&self, current_post_type: &str) -> Vec<String> {
        match self.post_type_mode {
            PostTypeMode::Same => vec![current_post_type.to_string()],
            PostTypeMode::Selected => self.post_types.clone(),
        }
    }
}

/// Configuration of the sidebar widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetInstance {
    /// May be empty, in which case no title is rendered.
    pub title: String,
    pub count: usize,
    pub orderby: PostOrder,
    pub post_types: Vec<String>,
}

impl Default for WidgetInstance {
    fn default() -> Self {
        WidgetInstance {
            title: String::new(),
            count: DEFAULT_LISTING_COUNT,
            orderby: PostOrder::Date,
            post_types: vec![DEFAULT_POST_TYPE.to_string()],
        }
    }
}

impl WidgetInstance {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            bail!("count must be a positive number");
        }
        if self.post_types.is_empty() {
            bail!("at least one post type must be selected");
        }
        Ok(())
    }
}
