mod account_manager;
mod account_store;
pub mod auth;
mod sqlite_account_store;

pub use account_manager::AccountManager;
pub use account_store::{
    Account, AccountAuthTokenStore, AccountCredentialsStore, AccountMetaStore, AccountStore,
};
pub use sqlite_account_store::SqliteAccountStore;
