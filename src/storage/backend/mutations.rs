//! Mutation operations for DatabaseStorage
//!
//! This module contains all write database operations. Each call owns one
//! transaction; any path that does not commit rolls back.

use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, error, info, warn};

use super::DatabaseStorage;
use super::converters::{entry_to_active_model, model_to_entry};
use crate::errors::{Result, ShortenerError};
use crate::storage::{UrlEntry, UrlKey};

use migration::entities::url;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        warn!("Rollback failed: {}", e);
    }
}

impl DatabaseStorage {
    async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| ShortenerError::database_operation(format!("开始事务失败: {}", e)))
    }

    async fn commit(txn: DatabaseTransaction) -> Result<()> {
        txn.commit()
            .await
            .map_err(|e| ShortenerError::database_operation(format!("提交事务失败: {}", e)))
    }

    /// 按长链接查出已存在的记录
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<UrlEntry>> {
        url::Entity::find()
            .filter(url::Column::OriginalUrl.eq(long_url))
            .one(&self.db)
            .await?
            .map(model_to_entry)
            .transpose()
    }

    pub(super) async fn insert_one(&self, entry: &UrlEntry) -> Result<()> {
        let txn = self.begin().await?;

        let inserted = url::Entity::insert(entry_to_active_model(entry))
            .exec_without_returning(&txn)
            .await;

        if let Err(e) = inserted {
            rollback(txn).await;

            if !is_unique_violation(&e) {
                error!("Failed to insert url {}: {}", entry.id, e);
                return Err(e.into());
            }

            // 事务已回滚，用连接池查出先前插入的那一行
            return match self.find_by_long_url(entry.long_url.as_str()).await? {
                Some(existing) => {
                    debug!(
                        "Duplicate long url {}, existing id {}",
                        entry.long_url, existing.id
                    );
                    Err(ShortenerError::already_exists(existing))
                }
                None => Err(ShortenerError::database_operation(format!(
                    "Unique violation for {} without a matching row: {}",
                    entry.id, e
                ))),
            };
        }

        Self::commit(txn).await
    }

    /// 批量插入（单个事务，任一条冲突则整体失败）
    pub(super) async fn insert_batch(&self, entries: &[UrlEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let txn = self.begin().await?;

        for entry in entries {
            let inserted = url::Entity::insert(entry_to_active_model(entry))
                .exec_without_returning(&txn)
                .await;

            if let Err(e) = inserted {
                rollback(txn).await;

                if is_unique_violation(&e) {
                    debug!("Batch rejected, duplicate long url {}", entry.long_url);
                    return Err(ShortenerError::already_exists(entry.clone()));
                }

                error!("Failed to insert url {} in batch: {}", entry.id, e);
                return Err(e.into());
            }
        }

        Self::commit(txn).await?;
        info!("Batch inserted {} urls", entries.len());
        Ok(())
    }

    /// 批量软删除；任何一行失败都会回滚整个批次
    pub(super) async fn mark_deleted(&self, keys: &[UrlKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let txn = self.begin().await?;

        let mut affected = 0;
        for key in keys {
            let result = url::Entity::update_many()
                .col_expr(url::Column::Deleted, Expr::value(true))
                .filter(url::Column::Id.eq(key.id))
                .filter(url::Column::UserId.eq(key.user_id))
                .exec(&txn)
                .await;

            match result {
                Ok(res) => affected += res.rows_affected,
                Err(e) => {
                    rollback(txn).await;
                    error!("Failed to mark url {} as deleted: {}", key.id, e);
                    return Err(ShortenerError::database_operation(format!(
                        "批量删除失败 ({}): {}",
                        key.id, e
                    )));
                }
            }
        }

        Self::commit(txn).await?;
        info!("Marked {} of {} urls as deleted", affected, keys.len());
        Ok(())
    }
}
