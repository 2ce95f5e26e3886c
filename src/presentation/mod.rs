//! HTML for the unread listings: the section appended to post content, the
//! sidebar widget and the single post page around them.

use crate::content::Post;
use crate::hooks::Hooks;
use crate::settings::{ListingSettings, WidgetInstance};
use crate::unread::{UnreadPosts, UnreadRequest, UnreadResult};

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<ul>` of links to the unread posts.
pub fn render_unread_list(unread: &UnreadResult) -> String {
    let mut html = String::from("<ul>");
    for item in &unread.items {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&item.permalink),
            escape_html(&item.title)
        ));
    }
    html.push_str("</ul>");
    html
}

/// The query for the section below a post of type `post_type`, or None if the
/// section is not shown for that type.
pub fn section_request(settings: &ListingSettings, post_type: &str) -> Option<UnreadRequest> {
    if !settings.is_shown_for(post_type) {
        return None;
    }
    Some(UnreadRequest::for_section(settings, post_type))
}

pub fn render_section(settings: &ListingSettings, unread: &UnreadResult) -> String {
    format!(
        "<h4>{}</h4> {}",
        escape_html(&settings.title),
        render_unread_list(unread)
    )
}

/// Appends the unread section to the content of `post`. The content comes back
/// unchanged when the section is off for the post's type or nothing is unread.
pub fn append_unread_section(
    content: &str,
    post: &Post,
    settings: &ListingSettings,
    unread: &UnreadPosts,
    hooks: &Hooks,
) -> String {
    if !settings.is_shown_for(&post.post_type) {
        return content.to_string();
    }
    let Some(result) = unread.as_result() else {
        return content.to_string();
    };
    let section = render_section(settings, result);
    format!("{}{}", content, hooks.section_markup(section, result))
}

/// Markup surrounding a widget, provided by the page layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetArea {
    pub before_widget: String,
    pub after_widget: String,
    pub before_title: String,
    pub after_title: String,
}

impl Default for WidgetArea {
    fn default() -> Self {
        WidgetArea {
            before_widget: "<section class=\"widget unread-posts-widget\">".to_string(),
            after_widget: "</section>".to_string(),
            before_title: "<h3 class=\"widget-title\">".to_string(),
            after_title: "</h3>".to_string(),
        }
    }
}

/// The widget, or None when there is nothing unread.
pub fn render_widget(
    area: &WidgetArea,
    instance: &WidgetInstance,
    unread: &UnreadPosts,
    hooks: &Hooks,
) -> Option<String> {
    let result = unread.as_result()?;

    let mut html = area.before_widget.clone();
    if !instance.title.is_empty() {
        html.push_str(&area.before_title);
        html.push_str(&escape_html(&instance.title));
        html.push_str(&area.after_title);
    }
    html.push_str(&hooks.widget_markup(render_unread_list(result), result));
    html.push_str(&area.after_widget);
    Some(html)
}

pub fn render_post_page(
    site_title: &str,
    post: &Post,
    content: &str,
    sidebar: Option<&str>,
) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{} | {}</title>\n</head>\n<body>\n<article class=\"post-{}\">\n<h1>{}</h1>\n{}\n</article>\n{}</body>\n</html>\n",
        escape_html(&post.title),
        escape_html(site_title),
        post.id,
        escape_html(&post.title),
        content,
        sidebar
            .map(|s| format!("<aside>{}</aside>\n", s))
            .unwrap_or_default()
    )
}
