//! Durable key → string storage for serialized collections.
//!
//! Stores hold an `Arc<dyn ContentStorage>`: PostgreSQL when `DATABASE_URL`
//! is set, otherwise `MemoryStorage`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;

#[async_trait]
pub trait ContentStorage: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn write(&self, key: &str, payload: &str) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgContentStorage {
    pool: PgPool,
}

impl PgContentStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStorage for PgContentStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM portfolio_content WHERE storage_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(payload)
    }

    /// Last write wins; there is no version column.
    async fn write(&self, key: &str, payload: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO portfolio_content (storage_key, payload, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (storage_key)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        debug!("Wrote {} bytes under '{key}'", payload.len());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a key, as if written by an earlier session.
    #[cfg(test)]
    pub fn with_value(self, key: &str, payload: &str) -> Self {
        self.put(key, payload);
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.values.lock() {
            Ok(values) => values.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    fn put(&self, key: &str, payload: &str) {
        match self.values.lock() {
            Ok(mut values) => values.insert(key.to_string(), payload.to_string()),
            Err(poisoned) => poisoned
                .into_inner()
                .insert(key.to_string(), payload.to_string()),
        };
    }
}

#[async_trait]
impl ContentStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, payload: &str) -> Result<(), AppError> {
        self.put(key, payload);
        Ok(())
    }
}
