//! SeaORM storage backend
//!
//! Relational storage using SeaORM, supporting SQLite and PostgreSQL.
//! Every write runs in its own transaction; the unique constraint on
//! `original_url` is the dedup mechanism.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use super::{UrlEntry, UrlKey, UrlStorage};
use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortenerError};

pub use connection::{connect_postgres, connect_sqlite, run_migrations};
pub use converters::{entry_to_active_model, model_to_entry};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        Ok("postgres")
    } else {
        Err(ShortenerError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
    backend_name: &'static str,
}

impl DatabaseStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(ShortenerError::database_config("database_url is not set"));
        }

        let backend_name = infer_backend_from_url(&config.database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            connect_postgres(&config.database_url, config.pool_size).await?
        };

        let storage = DatabaseStorage { db, backend_name };

        if config.run_migrations {
            run_migrations(&storage.db).await?;
        } else {
            info!("Schema migrations disabled");
        }

        warn!("{} storage initialized.", backend_name.to_uppercase());
        Ok(storage)
    }
}

#[async_trait]
impl UrlStorage for DatabaseStorage {
    async fn add(&self, entry: &UrlEntry) -> Result<()> {
        self.insert_one(entry).await
    }

    async fn get(&self, id: Uuid) -> Result<UrlEntry> {
        self.find_by_id(id).await
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<UrlEntry>> {
        self.find_by_user(user_id).await
    }

    async fn batch(&self, entries: &[UrlEntry]) -> Result<()> {
        self.insert_batch(entries).await
    }

    async fn batch_delete(&self, keys: &[UrlKey]) -> Result<()> {
        self.mark_deleted(keys).await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| ShortenerError::database_connection(format!("Ping failed: {}", e)))
    }

    async fn get_user_count(&self) -> Result<usize> {
        self.count_users().await
    }

    async fn get_url_count(&self) -> Result<usize> {
        self.count_urls().await
    }

    async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(|e| {
            ShortenerError::database_connection(format!("Failed to close pool: {}", e))
        })?;
        info!("{} storage closed", self.backend_name.to_uppercase());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        self.backend_name
    }
}
