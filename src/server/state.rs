use axum::extract::FromRef;

use crate::account::AccountManager;
use crate::content::ContentStore;
use crate::hooks::Hooks;
use crate::read_state::ReadStateStoreFactory;
use crate::settings::SettingsStore;
use crate::unread::UnreadQueryService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedAccountManager = Arc<AccountManager>;
pub type GuardedContentStore = Arc<dyn ContentStore>;
pub type GuardedSettingsStore = Arc<dyn SettingsStore>;
pub type GuardedUnreadQueryService = Arc<UnreadQueryService>;
pub type GuardedReadStateStoreFactory = Arc<ReadStateStoreFactory>;
pub type GuardedHooks = Arc<Hooks>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub account_manager: GuardedAccountManager,
    pub content_store: GuardedContentStore,
    pub settings_store: GuardedSettingsStore,
    pub unread_service: GuardedUnreadQueryService,
    pub read_state_factory: GuardedReadStateStoreFactory,
    pub hooks: GuardedHooks,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedAccountManager {
    fn from_ref(input: &ServerState) -> Self {
        input.account_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedContentStore {
    fn from_ref(input: &ServerState) -> Self {
        input.content_store.clone()
    }
}

impl FromRef<ServerState> for GuardedSettingsStore {
    fn from_ref(input: &ServerState) -> Self {
        input.settings_store.clone()
    }
}

impl FromRef<ServerState> for GuardedUnreadQueryService {
    fn from_ref(input: &ServerState) -> Self {
        input.unread_service.clone()
    }
}

impl FromRef<ServerState> for GuardedHooks {
    fn from_ref(input: &ServerState) -> Self {
        input.hooks.clone()
    }
}
