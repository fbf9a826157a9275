//! Shared application state

use std::{sync::Arc, time::Duration};

use crate::{
    auth::JwtManager,
    config::Config,
    lyzr::{LyzrClient, LyzrError},
    storage::{StorageClient, StorageError},
    store::Store,
};

/// State cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub lyzr: Arc<LyzrClient>,
    pub storage: Arc<StorageClient>,
    pub jwt: JwtManager,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("agent service client: {0}")]
    Lyzr(#[from] LyzrError),
    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Result<Self, StateError> {
        let lyzr = LyzrClient::new(
            &config.lyzr_api_url,
            config.lyzr_api_key.clone(),
            Duration::from_millis(config.lyzr_request_timeout_ms),
        )?;
        let storage = StorageClient::new(
            &config.supabase_url,
            &config.supabase_service_role_key,
            &config.knowledge_base_bucket,
        )?;
        let jwt = JwtManager::new(&config.supabase_jwt_secret);

        Ok(Self {
            config: Arc::new(config),
            store,
            lyzr: Arc::new(lyzr),
            storage: Arc::new(storage),
            jwt,
        })
    }
}
