//! In-memory storage engine
//!
//! The whole map sits behind one reader/writer lock; every operation holds it
//! for its full duration. With a snapshot path configured the map is loaded
//! on construction and written back on `close`.

mod file;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::{UrlEntry, UrlKey, UrlStorage};
use crate::config::CacheConfig;
use crate::errors::{Result, ShortenerError};

#[derive(Debug, Clone)]
pub(crate) struct CachedUrl {
    pub user_id: Uuid,
    pub value: Url,
    pub deleted: bool,
}

/// 受同一把锁保护的全部状态
#[derive(Default)]
struct CacheState {
    data: HashMap<Uuid, CachedUrl>,
    /// 长链接 -> id，用于去重
    by_url: HashMap<String, Uuid>,
}

impl CacheState {
    fn from_data(data: HashMap<Uuid, CachedUrl>) -> Self {
        let mut by_url = HashMap::with_capacity(data.len());
        for (id, item) in &data {
            if let Some(first) = by_url.insert(item.value.to_string(), *id) {
                warn!(
                    "Duplicate long URL in snapshot, {} and {} share {}",
                    first, id, item.value
                );
            }
        }
        Self { data, by_url }
    }

    fn existing(&self, long_url: &Url) -> Option<UrlEntry> {
        let id = self.by_url.get(long_url.as_str())?;
        self.data.get(id).map(|item| to_entry(*id, item))
    }

    fn insert(&mut self, entry: &UrlEntry) {
        self.by_url.insert(entry.long_url.to_string(), entry.id);
        self.data.insert(
            entry.id,
            CachedUrl {
                user_id: entry.user_id,
                value: entry.long_url.clone(),
                deleted: false,
            },
        );
    }
}

fn to_entry(id: Uuid, item: &CachedUrl) -> UrlEntry {
    UrlEntry::new(id, item.user_id, item.value.clone()).with_deleted(item.deleted)
}

pub struct CacheStorage {
    state: RwLock<CacheState>,
    file_path: Option<PathBuf>,
}

impl CacheStorage {
    /// Create the engine, loading the snapshot when `file_path` is set.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        if config.file_path.is_empty() {
            return Ok(Self::in_memory());
        }

        let path = PathBuf::from(&config.file_path);
        let data = file::load_snapshot(&path)?;
        info!("Loaded {} urls from {}", data.len(), path.display());

        Ok(Self {
            state: RwLock::new(CacheState::from_data(data)),
            file_path: Some(path),
        })
    }

    /// 不做持久化的纯内存实例
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            file_path: None,
        }
    }

    /// 立即把当前状态写入快照文件
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let state = self.state.read();
        file::store_snapshot(path, &state.data)?;
        info!("Stored {} urls to {}", state.data.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl UrlStorage for CacheStorage {
    async fn add(&self, entry: &UrlEntry) -> Result<()> {
        let mut state = self.state.write();

        if let Some(existing) = state.existing(&entry.long_url) {
            return Err(ShortenerError::already_exists(existing));
        }

        state.insert(entry);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<UrlEntry> {
        let state = self.state.read();

        state
            .data
            .get(&id)
            .map(|item| to_entry(id, item))
            .ok_or_else(|| ShortenerError::not_found(format!("url {} not found", id)))
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<UrlEntry>> {
        let state = self.state.read();

        Ok(state
            .data
            .iter()
            .filter(|(_, item)| item.user_id == user_id)
            .map(|(id, item)| to_entry(*id, item))
            .collect())
    }

    async fn batch(&self, entries: &[UrlEntry]) -> Result<()> {
        let mut state = self.state.write();

        // 先整体校验，保证全有或全无
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            if state.existing(&entry.long_url).is_some() || !seen.insert(entry.long_url.as_str()) {
                return Err(ShortenerError::already_exists(entry.clone()));
            }
        }

        for entry in entries {
            state.insert(entry);
        }
        Ok(())
    }

    async fn batch_delete(&self, keys: &[UrlKey]) -> Result<()> {
        let mut state = self.state.write();

        let mut marked = 0;
        for key in keys {
            match state.data.get_mut(&key.id) {
                Some(item) if item.user_id == key.user_id => {
                    item.deleted = true;
                    marked += 1;
                }
                Some(_) => debug!("Skip deleting {}: not owned by {}", key.id, key.user_id),
                None => debug!("Skip deleting {}: not found", key.id),
            }
        }

        debug!("Marked {} of {} urls as deleted", marked, keys.len());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Err(ShortenerError::InvalidStorageType)
    }

    async fn get_user_count(&self) -> Result<usize> {
        let state = self.state.read();
        let users: HashSet<Uuid> = state.data.values().map(|item| item.user_id).collect();
        Ok(users.len())
    }

    async fn get_url_count(&self) -> Result<usize> {
        Ok(self.state.read().data.len())
    }

    async fn close(&self) -> Result<()> {
        if self.file_path.is_none() {
            return Ok(());
        }

        self.flush()?;
        info!("Cache storage closed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "cache"
    }
}
