use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::account_store::{
    Account, AccountAuthTokenStore, AccountCredentialsStore, AccountMetaStore, AccountStore,
};
use super::auth::{
    from_unix_seconds, to_unix_seconds, AuthToken, AuthTokenValue, PasswordCredentials,
};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};

const ACCOUNT_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "account",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const ACCOUNT_TABLE_V_0: Table = Table {
    name: "account",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "is_admin",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "account_password_credentials",
    columns: &[
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ACCOUNT_FOREIGN_KEY)
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[],
    unique_constraints: &[],
};

const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ACCOUNT_FOREIGN_KEY)
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_auth_token_account_id", "account_id")],
    unique_constraints: &[],
};

const ACCOUNT_META_TABLE_V_0: Table = Table {
    name: "account_meta",
    columns: &[
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ACCOUNT_FOREIGN_KEY)
        ),
        sqlite_column!("meta_key", &SqlType::Text, non_null = true),
        sqlite_column!("meta_value", &SqlType::Text, non_null = true),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["account_id", "meta_key"]],
};

static VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ACCOUNT_TABLE_V_0,
        PASSWORD_CREDENTIALS_TABLE_V_0,
        AUTH_TOKEN_TABLE_V_0,
        ACCOUNT_META_TABLE_V_0,
    ],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteAccountStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAccountStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteAccountStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn account_from_row(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        handle: row.get(1)?,
        is_admin: row.get::<_, i64>(2)? != 0,
    })
}

fn auth_token_from_row(row: &rusqlite::Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        account_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: from_unix_seconds(row.get(2)?),
        last_used: row.get::<_, Option<i64>>(3)?.map(from_unix_seconds),
    })
}

impl AccountMetaStore for SqliteAccountStore {
    fn get_account_meta(&self, account_id: usize, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT meta_value FROM account_meta WHERE account_id = ?1 AND meta_key = ?2",
            params![account_id, key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to read {} of account {}", key, account_id))
    }

    fn set_account_meta(&self, account_id: usize, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO account_meta (account_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
             ON CONFLICT(account_id, meta_key) DO UPDATE SET
                meta_value = excluded.meta_value,
                updated = cast(strftime('%s','now') as int)",
            params![account_id, key, value],
        )
        .with_context(|| format!("Failed to write {} of account {}", key, account_id))?;
        Ok(())
    }

    fn delete_account_meta(&self, account_id: usize, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM account_meta WHERE account_id = ?1 AND meta_key = ?2",
            params![account_id, key],
        )
        .with_context(|| format!("Failed to delete {} of account {}", key, account_id))?;
        Ok(())
    }
}

impl AccountAuthTokenStore for SqliteAccountStore {
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT account_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()?)
    }

    fn add_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (account_id, value, created) VALUES (?1, ?2, ?3)",
            params![token.account_id, token.value.0, to_unix_seconds(token.created)],
        )
        .with_context(|| format!("Failed to store auth token of account {}", token.account_id))?;
        Ok(())
    }

    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                "SELECT account_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()?;
        if token.is_some() {
            conn.execute("DELETE FROM auth_token WHERE value = ?1", params![value.0])?;
        }
        Ok(token)
    }

    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![to_unix_seconds(SystemTime::now()), value.0],
        )?;
        Ok(())
    }
}

impl AccountCredentialsStore for SqliteAccountStore {
    fn get_password_credentials(&self, account_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT salt, hash, hasher, created, last_used
                 FROM account_password_credentials WHERE account_id = ?1",
                params![account_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((salt, hash, hasher, created, last_used)) = row else {
            return Ok(None);
        };
        Ok(Some(PasswordCredentials {
            account_id,
            salt,
            hash,
            hasher: hasher.parse()?,
            created: from_unix_seconds(created),
            last_used: last_used.map(from_unix_seconds),
        }))
    }

    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO account_password_credentials (account_id, salt, hash, hasher, created)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(account_id) DO UPDATE SET
                salt = excluded.salt,
                hash = excluded.hash,
                hasher = excluded.hasher,
                created = excluded.created,
                last_used = NULL",
            params![
                credentials.account_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string(),
                to_unix_seconds(credentials.created),
            ],
        )
        .with_context(|| {
            format!(
                "Failed to store password credentials of account {}",
                credentials.account_id
            )
        })?;
        Ok(())
    }

    fn update_password_last_used(&self, account_id: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE account_password_credentials SET last_used = ?1 WHERE account_id = ?2",
            params![to_unix_seconds(SystemTime::now()), account_id],
        )?;
        Ok(())
    }
}

impl AccountStore for SqliteAccountStore {
    fn create_account(&self, handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO account (handle) VALUES (?1)", params![handle])
            .with_context(|| format!("Failed to create account {}", handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_account(&self, account_id: usize) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, handle, is_admin FROM account WHERE id = ?1",
                params![account_id],
                account_from_row,
            )
            .optional()?)
    }

    fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, handle, is_admin FROM account WHERE handle = ?1",
                params![handle],
                account_from_row,
            )
            .optional()?)
    }

    fn set_admin(&self, account_id: usize, is_admin: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE account SET is_admin = ?1 WHERE id = ?2",
            params![is_admin as i64, account_id],
        )?;
        if updated == 0 {
            anyhow::bail!("Account {} does not exist", account_id);
        }
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, handle, is_admin FROM account ORDER BY id")?;
        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }
}
