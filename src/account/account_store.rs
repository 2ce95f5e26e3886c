use anyhow::Result;
use serde::Serialize;

use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: usize,
    pub handle: String,
    pub is_admin: bool,
}

/// Named, string-valued fields attached to an account.
pub trait AccountMetaStore: Send + Sync {
    /// Returns the value stored under `key`, or None if it was never set.
    fn get_account_meta(&self, account_id: usize, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_account_meta(&self, account_id: usize, key: &str, value: &str) -> Result<()>;

    /// Removes the field. Removing a field that does not exist is not an error.
    fn delete_account_meta(&self, account_id: usize, key: &str) -> Result<()>;
}

pub trait AccountAuthTokenStore: Send + Sync {
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;

    /// Returns the deleted token, if it existed.
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()>;
}

pub trait AccountCredentialsStore: Send + Sync {
    fn get_password_credentials(&self, account_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Creates or replaces the password credentials of the account.
    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()>;

    fn update_password_last_used(&self, account_id: usize) -> Result<()>;
}

pub trait AccountStore: AccountMetaStore + AccountAuthTokenStore + AccountCredentialsStore {
    /// Creates a new account and returns its id.
    fn create_account(&self, handle: &str) -> Result<usize>;

    fn get_account(&self, account_id: usize) -> Result<Option<Account>>;

    fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>>;

    fn set_admin(&self, account_id: usize, is_admin: bool) -> Result<()>;

    fn list_accounts(&self) -> Result<Vec<Account>>;
}
