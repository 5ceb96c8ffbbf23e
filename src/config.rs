use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub store: StoreConfig,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".into());
        let http_timeout = Duration::from_secs(
            std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        let store = StoreConfig {
            url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "sqlite://nutriscan.db?mode=rwc".into()),
            scope: std::env::var("STORE_SCOPE").unwrap_or_else(|_| "nutriscan".into()),
        };
        anyhow::ensure!(!api_base_url.trim().is_empty(), "API_BASE_URL is empty");
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http_timeout,
            store,
        })
    }

    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            store: StoreConfig {
                url: "sqlite::memory:".into(),
                scope: "test".into(),
            },
        }
    }
}
