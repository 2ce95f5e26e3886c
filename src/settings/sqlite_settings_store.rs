use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::SettingsStore;
use crate::sqlite_column;
use crate::sqlite_persistence::{open_versioned_db, SqlType, Table, VersionedSchema};

const OPTION_TABLE_V_0: Table = Table {
    name: "site_option",
    columns: &[
        sqlite_column!("name", &SqlType::Text, is_primary_key = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

static VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[OPTION_TABLE_V_0],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteSettingsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSettingsStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteSettingsStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get_option(&self, name: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM site_option WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_option_updated_at(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM site_option WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid timestamp {} for option {}", s, name))
        })
        .transpose()
    }

    fn set_option(&self, name: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO site_option (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = ?2, updated_at = ?3",
            params![name, value, Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("Failed to store option {}", name))?;
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM site_option WHERE name = ?1", params![name])?;
        Ok(())
    }
}
