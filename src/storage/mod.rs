//! Usage accounting for the paywall: scan counters and pro membership
//!
//! The original glue kept these in unsynchronized process-local globals.
//! Here they sit behind a trait so the backend is swappable: an in-memory
//! map for tests and ephemeral runs, SQLite for anything that should survive
//! a restart.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::error::Result;

/// Per-user scan counters and pro-tier membership.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn scan_count(&self, user_id: &str) -> Result<u32>;
    /// Atomically increment and return the new count.
    async fn record_scan(&self, user_id: &str) -> Result<u32>;
    async fn is_pro(&self, user_id: &str) -> Result<bool>;
    /// Idempotent: granting twice is not an error.
    async fn grant_pro(&self, user_id: &str) -> Result<()>;
}

/// Process-local store. Counters do not survive a restart; fine for tests
/// and single-shot runs, not for production billing.
#[derive(Default)]
pub struct MemoryStore {
    scans: RwLock<HashMap<String, u32>>,
    pro: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn scan_count(&self, user_id: &str) -> Result<u32> {
        Ok(self.scans.read().await.get(user_id).copied().unwrap_or(0))
    }

    async fn record_scan(&self, user_id: &str) -> Result<u32> {
        let mut scans = self.scans.write().await;
        let count = scans.entry(user_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn is_pro(&self, user_id: &str) -> Result<bool> {
        Ok(self.pro.read().await.contains(user_id))
    }

    async fn grant_pro(&self, user_id: &str) -> Result<()> {
        self.pro.write().await.insert(user_id.to_string());
        Ok(())
    }
}

/// Durable store on SQLite.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS scan_usage (
                user_id TEXT PRIMARY KEY,
                scans INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS pro_users (
                user_id TEXT PRIMARY KEY,
                granted_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl UsageStore for SqliteStore {
    async fn scan_count(&self, user_id: &str) -> Result<u32> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT scans FROM scan_usage WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(count.unwrap_or(0) as u32)
    }

    async fn record_scan(&self, user_id: &str) -> Result<u32> {
        // Upsert keeps the increment atomic under concurrent scans.
        let count: i64 = sqlx::query_scalar(
            "INSERT INTO scan_usage (user_id, scans) VALUES (?, 1)
             ON CONFLICT(user_id) DO UPDATE SET scans = scans + 1
             RETURNING scans",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    async fn is_pro(&self, user_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pro_users WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn grant_pro(&self, user_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO pro_users (user_id, granted_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
