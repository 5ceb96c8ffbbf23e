use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::api::ApiClient;
use crate::auth::session::SessionStore;
use crate::config::ClientConfig;
use crate::history::HistoryService;
use crate::profile::ProfileService;
use crate::scan::ScanOrchestrator;
use crate::storage::{KeyValueStore, SqliteStore};
use crate::transport::{HttpTransport, Transport};

/// Everything a front end needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl AppState {
    /// Opens the persistent store, builds the HTTP transport and restores
    /// any saved session.
    pub async fn init(config: ClientConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.store.url, &config.store.scope)
            .await
            .with_context(|| format!("opening store {}", config.store.url))?;
        let transport = HttpTransport::new(&config.api_base_url, config.http_timeout)
            .context("building http client")?;

        let state = Self::from_parts(config, Arc::new(transport), Arc::new(store));
        let session = state.session.restore().await;
        info!(
            api = %state.config.api_base_url,
            authenticated = session.is_authenticated(),
            "client ready"
        );
        Ok(state)
    }

    pub fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(transport.clone(), store));
        let api = ApiClient::new(transport, session.clone());
        Self {
            config: Arc::new(config),
            session,
            api,
        }
    }

    /// A fresh orchestrator; each holds at most one pending scan.
    pub fn scanner(&self) -> ScanOrchestrator {
        ScanOrchestrator::new(self.api.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.api.clone())
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.api.clone())
    }
}
