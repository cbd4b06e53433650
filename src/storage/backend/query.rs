//! Query operations for DatabaseStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use super::DatabaseStorage;
use super::converters::model_to_entry;
use crate::errors::{Result, ShortenerError};
use crate::storage::UrlEntry;

use migration::entities::url;

impl DatabaseStorage {
    pub(super) async fn find_by_id(&self, id: Uuid) -> Result<UrlEntry> {
        let model = url::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ShortenerError::not_found(format!("url {} not found", id)))?;

        model_to_entry(model)
    }

    pub(super) async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<UrlEntry>> {
        url::Entity::find()
            .filter(url::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_entry)
            .collect()
    }

    /// SELECT COUNT(*) FROM (SELECT DISTINCT user_id FROM urls)
    pub(super) async fn count_users(&self) -> Result<usize> {
        let count = url::Entity::find()
            .select_only()
            .column(url::Column::UserId)
            .distinct()
            .count(&self.db)
            .await?;
        Ok(count as usize)
    }

    pub(super) async fn count_urls(&self) -> Result<usize> {
        let count = url::Entity::find().count(&self.db).await?;
        Ok(count as usize)
    }
}
