use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::errors::Result;

pub mod backend;
pub mod cache;
pub mod models;

pub use backend::DatabaseStorage;
pub use cache::CacheStorage;
pub use models::{Stats, UrlEntry, UrlKey};

/// 短链接存储接口
///
/// 缓存引擎与关系型引擎都实现这一组操作，上层只依赖这个 trait。
#[async_trait]
pub trait UrlStorage: Send + Sync {
    /// 插入一条映射；长链接已存在时返回 `AlreadyExists`，携带已有记录
    async fn add(&self, entry: &UrlEntry) -> Result<()>;

    /// 按 id 查询；软删除的记录照常返回（`deleted = true`）
    async fn get(&self, id: Uuid) -> Result<UrlEntry>;

    /// 返回用户的全部记录，包括已软删除的
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<UrlEntry>>;

    /// 全有或全无的批量插入
    async fn batch(&self, entries: &[UrlEntry]) -> Result<()>;

    /// 标记删除；不属于该用户的条目静默跳过
    async fn batch_delete(&self, keys: &[UrlKey]) -> Result<()>;

    async fn ping(&self) -> Result<()>;

    async fn get_user_count(&self) -> Result<usize>;

    async fn get_url_count(&self) -> Result<usize>;

    /// 释放资源（写回快照文件 / 关闭连接池）
    async fn close(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// Pick the storage engine from configuration.
    ///
    /// A configured database wins; if it cannot be reached the cache engine
    /// is used instead, with the snapshot file when one is configured.
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn UrlStorage>> {
        if !config.database.database_url.is_empty() {
            match DatabaseStorage::new(&config.database).await {
                Ok(storage) => {
                    info!("Using {} storage backend", storage.backend_name());
                    return Ok(Arc::new(storage));
                }
                Err(e) => {
                    error!("Failed to initialize database storage: {}", e);
                    warn!("Falling back to cache storage");
                }
            }
        }

        let storage = CacheStorage::new(&config.cache)?;
        if config.cache.file_path.is_empty() {
            info!("Using cache storage backend without persistence");
        } else {
            info!(
                "Using cache storage backend with file: {}",
                config.cache.file_path
            );
        }
        Ok(Arc::new(storage))
    }
}
