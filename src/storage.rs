use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::RwLock;

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

/// Scoped string key-value persistence used for the session token and the
/// cached user record.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    scope      TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (scope, key)
)
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    scope: String,
}

impl SqliteStore {
    pub async fn open(url: &str, scope: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("parse store url {}", url))?
            .create_if_missing(true);
        // One connection keeps `sqlite::memory:` a single database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("open key-value store")?;
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("create kv schema")?;
        Ok(Self {
            pool,
            scope: scope.to_string(),
        })
    }

    pub async fn open_in_memory(scope: &str) -> anyhow::Result<Self> {
        Self::open("sqlite::memory:", scope).await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
              FROM kv
             WHERE scope = ?1 AND key = ?2
            "#,
        )
        .bind(&self.scope)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("kv get {}", key))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let now = OffsetDateTime::now_utc().format(&Rfc3339)?;
        sqlx::query(
            r#"
            INSERT INTO kv (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (scope, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.scope)
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("kv set {}", key))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv WHERE scope = ?1 AND key = ?2")
            .bind(&self.scope)
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("kv remove {}", key))?;
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
