use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

use super::account_store::{Account, AccountStore};
use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials};

/// Account operations built on top of an [`AccountStore`]: login, session
/// resolution and account provisioning.
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
}

impl AccountManager {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        AccountManager { store }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn create_account(&self, handle: &str, password: &str, is_admin: bool) -> Result<usize> {
        if handle.trim().is_empty() {
            bail!("Account handle cannot be empty");
        }
        if self.store.get_account_by_handle(handle)?.is_some() {
            bail!("Account {} already exists", handle);
        }
        let account_id = self.store.create_account(handle)?;
        self.store
            .set_password_credentials(&PasswordCredentials::new(account_id, password)?)?;
        if is_admin {
            self.store.set_admin(account_id, true)?;
        }
        info!("Created account {} with id {}", handle, account_id);
        Ok(account_id)
    }

    pub fn set_password(&self, handle: &str, password: &str) -> Result<()> {
        let Some(account) = self.store.get_account_by_handle(handle)? else {
            bail!("Account {} does not exist", handle);
        };
        self.store
            .set_password_credentials(&PasswordCredentials::new(account.id, password)?)
    }

    pub fn set_admin(&self, handle: &str, is_admin: bool) -> Result<()> {
        let Some(account) = self.store.get_account_by_handle(handle)? else {
            bail!("Account {} does not exist", handle);
        };
        self.store.set_admin(account.id, is_admin)
    }

    /// Checks the password and, when it matches, issues a new auth token.
    pub fn login(&self, handle: &str, password: &str) -> Result<Option<AuthToken>> {
        let Some(account) = self.store.get_account_by_handle(handle)? else {
            debug!("Login attempt for unknown account {}", handle);
            return Ok(None);
        };
        let Some(credentials) = self.store.get_password_credentials(account.id)? else {
            debug!("Account {} has no password credentials", handle);
            return Ok(None);
        };
        if !credentials.verify(password)? {
            debug!("Wrong password for account {}", handle);
            return Ok(None);
        }
        self.store.update_password_last_used(account.id)?;

        let token = AuthToken {
            account_id: account.id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.store.add_auth_token(&token)?;
        Ok(Some(token))
    }

    /// Returns the account owning `token`, refreshing the token's last use.
    pub fn resolve_token(&self, token: &AuthTokenValue) -> Result<Option<Account>> {
        let Some(auth_token) = self.store.get_auth_token(token)? else {
            return Ok(None);
        };
        if let Err(e) = self.store.update_auth_token_last_used(token) {
            debug!("Failed to update auth token last_used timestamp: {}", e);
        }
        self.store.get_account(auth_token.account_id)
    }

    pub fn logout(&self, token: &AuthTokenValue) -> Result<bool> {
        Ok(self.store.delete_auth_token(token)?.is_some())
    }
}
