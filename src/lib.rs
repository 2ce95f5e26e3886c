//! Unread Posts Server Library
//!
//! Tracks which posts each visitor has read and lists the ones they have not.
//! The modules are exposed for the binaries and the end-to-end tests.

pub mod account;
pub mod config;
pub mod content;
pub mod hooks;
pub mod presentation;
pub mod read_state;
pub mod server;
pub mod settings;
pub mod sqlite_persistence;
pub mod unread;

// Re-export commonly used types for convenience
pub use account::{AccountManager, AccountStore, SqliteAccountStore};
pub use content::{ContentStore, SqliteContentStore};
pub use hooks::Hooks;
pub use read_state::{PostId, PostIds, ReadStateStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use settings::{SettingsStore, SqliteSettingsStore};
