use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::content_store::ContentStore;
use super::models::{
    ContentItem, ContentQuery, ContentQueryResult, NewPost, Post, PostOrder, PostType,
};
use crate::read_state::PostId;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};

const POST_TYPE_TABLE_V_0: Table = Table {
    name: "post_type",
    columns: &[
        sqlite_column!("name", &SqlType::Text, is_primary_key = true),
        sqlite_column!("label", &SqlType::Text, non_null = true),
        sqlite_column!(
            "public",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const POST_TABLE_V_0: Table = Table {
    name: "post",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "post_type",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "post_type",
                foreign_column: "name",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "content",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "published",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_post_type_status", "post_type, status"),
        ("idx_post_published", "published"),
    ],
    unique_constraints: &[],
};

static VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[POST_TYPE_TABLE_V_0, POST_TABLE_V_0],
    migration: None,
}];

/// Post types every content database starts with.
const BUILTIN_POST_TYPES: &[(&str, &str)] = &[("post", "Posts"), ("page", "Pages")];

pub struct SqliteContentStore {
    conn: Arc<Mutex<Connection>>,
    site_url: String,
}

impl SqliteContentStore {
    pub fn new<T: AsRef<Path>>(db_path: T, site_url: &str) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        for (name, label) in BUILTIN_POST_TYPES {
            conn.execute(
                "INSERT OR IGNORE INTO post_type (name, label) VALUES (?1, ?2)",
                params![name, label],
            )?;
        }
        Ok(SqliteContentStore {
            conn: Arc::new(Mutex::new(conn)),
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }
}

/// WHERE clause and its parameters shared by the count and the listing query.
fn build_filter(query: &ContentQuery) -> Result<(String, Vec<Box<dyn ToSql>>)> {
    let mut clauses = vec!["status = ?1".to_string()];
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(query.status.as_str())];

    if !query.post_types.is_empty() {
        values.push(Box::new(serde_json::to_string(&query.post_types)?));
        clauses.push(format!(
            "post_type IN (SELECT value FROM json_each(?{}))",
            values.len()
        ));
    }
    if !query.exclude.is_empty() {
        values.push(Box::new(serde_json::to_string(&query.exclude)?));
        clauses.push(format!(
            "id NOT IN (SELECT value FROM json_each(?{}))",
            values.len()
        ));
    }
    Ok((clauses.join(" AND "), values))
}

impl ContentStore for SqliteContentStore {
    fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT post_type, status, title, content, published FROM post WHERE id = ?1",
                params![i64::from(id)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((post_type, status, title, content, published)) = row else {
            return Ok(None);
        };
        Ok(Some(Post {
            id,
            post_type,
            status: status.parse()?,
            title,
            content,
            published,
        }))
    }

    fn query_posts(&self, query: &ContentQuery) -> Result<ContentQueryResult> {
        let (filter, mut values) = build_filter(query)?;
        let conn = self.conn.lock().unwrap();

        let found: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM post WHERE {}", filter),
            rusqlite::params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        if found == 0 {
            return Ok(ContentQueryResult::default());
        }

        let order = match query.order {
            PostOrder::Date => "published DESC, id DESC",
            PostOrder::Random => "RANDOM()",
        };
        // A negative LIMIT means no limit in SQLite
        values.push(Box::new(query.limit.map(|l| l as i64).unwrap_or(-1)));
        let sql = format!(
            "SELECT id, post_type, title FROM post WHERE {} ORDER BY {} LIMIT ?{}",
            filter,
            order,
            values.len()
        );
        debug!("Running content query: {}", sql);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let items = rows
            .into_iter()
            .map(|(id, post_type, title)| {
                let id = PostId::try_from(id).context("Stored post has an invalid id")?;
                Ok(ContentItem {
                    id,
                    post_type,
                    title,
                    permalink: self.permalink(id),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ContentQueryResult {
            found: found as usize,
            items,
        })
    }

    fn get_post_types(&self, public_only: bool) -> Result<Vec<PostType>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name, label, public FROM post_type WHERE public = 1 OR ?1 = 0 ORDER BY name",
        )?;
        let post_types = stmt
            .query_map(params![public_only as i64], |row| {
                Ok(PostType {
                    name: row.get(0)?,
                    label: row.get(1)?,
                    public: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(post_types)
    }

    fn put_post_type(&self, post_type: &PostType) -> Result<()> {
        if post_type.name.trim().is_empty() {
            bail!("Post type name cannot be empty");
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO post_type (name, label, public) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET label = excluded.label, public = excluded.public",
            params![post_type.name, post_type.label, post_type.public as i64],
        )
        .with_context(|| format!("Failed to store post type {}", post_type.name))?;
        Ok(())
    }

    fn create_post(&self, post: NewPost) -> Result<PostId> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO post (id, post_type, status, title, content, published)
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, cast(strftime('%s','now') as int)))",
            params![
                post.id.map(i64::from),
                post.post_type,
                post.status.as_str(),
                post.title,
                post.content,
                post.published,
            ],
        )
        .with_context(|| format!("Failed to create post {:?}", post.title))?;
        PostId::try_from(conn.last_insert_rowid()).context("Database assigned an invalid post id")
    }

    fn permalink(&self, id: PostId) -> String {
        format!("{}/posts/{}", self.site_url, id)
    }
}
