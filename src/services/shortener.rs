//! Shortening engine
//!
//! Validates caller input, assigns identifiers, renders short URLs and hands
//! persistence to whichever [`UrlStorage`] was selected at startup. Deletions
//! go through the queue in [`super::queue`].

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::queue::{self, QueueWorker, Task};
use crate::config::ShortenerConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::{Stats, UrlEntry, UrlKey, UrlStorage};
use crate::utils::{base62, parse_long_url, parse_user_id};

#[derive(Clone)]
pub struct Shortener {
    base_url: Url,
    storage: Arc<dyn UrlStorage>,
    task_queue: mpsc::Sender<Task>,
}

impl Shortener {
    /// 创建引擎及其删除队列 worker
    ///
    /// worker 需要由调用方 spawn，并与引擎共用同一个关闭信号。
    pub fn new(
        storage: Arc<dyn UrlStorage>,
        config: &ShortenerConfig,
    ) -> Result<(Self, QueueWorker)> {
        let base_url = config.parse_base_url()?;
        if config.max_task_queue == 0 {
            return Err(ShortenerError::config(
                "max_task_queue must be at least 1",
            ));
        }
        if config.check_task_interval_ms == 0 {
            return Err(ShortenerError::config(
                "check_task_interval_ms must be greater than 0",
            ));
        }

        let (task_queue, worker) = queue::channel(
            config.max_task_queue,
            Arc::clone(&storage),
            config.check_task_interval(),
        );

        info!(
            "Shortener ready: base_url={}, backend={}, queue capacity={}",
            base_url,
            storage.backend_name(),
            config.max_task_queue
        );

        Ok((
            Self {
                base_url,
                storage,
                task_queue,
            },
            worker,
        ))
    }

    /// base URL + "/" + 编码后的 id
    pub fn short_url(&self, id: Uuid) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            base62::encode(id)
        );
        url.set_path(&path);
        url
    }

    fn attach_short_url(&self, entry: UrlEntry) -> UrlEntry {
        let short_url = self.short_url(entry.id);
        entry.with_short_url(short_url)
    }

    /// 冲突时给已有记录补上短链接，保证调用方拿到可用的短码
    fn resolve_conflict(&self, err: ShortenerError) -> ShortenerError {
        match err {
            ShortenerError::AlreadyExists(existing) => {
                ShortenerError::already_exists(self.attach_short_url(*existing))
            }
            other => other,
        }
    }

    /// 随机生成 id；首字节为 0 的 id 无法被解码，重新抽取
    fn generate_id() -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if base62::is_encodable(id) {
                return id;
            }
        }
    }

    pub async fn create_url(&self, raw_url: &str, user_id: &str) -> Result<UrlEntry> {
        let long_url = parse_long_url(raw_url)?;
        let user_id = parse_user_id(user_id)?;

        let entry = UrlEntry::new(Self::generate_id(), user_id, long_url);
        self.storage
            .add(&entry)
            .await
            .map_err(|e| self.resolve_conflict(e))?;

        debug!("Created short url {} -> {}", entry.id, entry.long_url);
        Ok(self.attach_short_url(entry))
    }

    pub async fn get_url(&self, code: &str) -> Result<UrlEntry> {
        let id = base62::decode(code)?;
        let entry = self.storage.get(id).await?;

        if entry.deleted {
            return Err(ShortenerError::gone(format!("url {} has been deleted", code)));
        }

        Ok(self.attach_short_url(entry))
    }

    /// 用户的全部未删除链接
    pub async fn get_user_urls(&self, user_id: &str) -> Result<Vec<UrlEntry>> {
        let user_id = parse_user_id(user_id)?;
        let entries = self.storage.get_by_user_id(user_id).await?;

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.deleted)
            .map(|entry| self.attach_short_url(entry))
            .collect())
    }

    /// 批量创建：全部成功或全部失败
    pub async fn batch_url(
        &self,
        correlation_ids: &[String],
        raw_urls: &[String],
        user_id: &str,
    ) -> Result<Vec<UrlEntry>> {
        if correlation_ids.len() != raw_urls.len() {
            return Err(ShortenerError::invalid_request(format!(
                "{} correlation ids for {} urls",
                correlation_ids.len(),
                raw_urls.len()
            )));
        }

        let user_id = parse_user_id(user_id)?;
        if raw_urls.is_empty() {
            return Ok(Vec::new());
        }

        let entries = correlation_ids
            .iter()
            .zip(raw_urls)
            .map(|(correlation_id, raw_url)| {
                let long_url = parse_long_url(raw_url)?;
                Ok(UrlEntry::new(Self::generate_id(), user_id, long_url)
                    .with_correlation_id(correlation_id.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;

        self.storage
            .batch(&entries)
            .await
            .map_err(|e| self.resolve_conflict(e))?;

        debug!("Batch created {} short urls", entries.len());
        Ok(entries
            .into_iter()
            .map(|entry| self.attach_short_url(entry))
            .collect())
    }

    /// 将删除请求放入队列，不等待执行
    ///
    /// 队列已满时立即返回 `TaskBufferFull`，不会阻塞调用方。
    pub async fn delete_url(&self, user_id: &str, codes: &[String]) -> Result<()> {
        let user_id = parse_user_id(user_id)?;
        let targets = codes
            .iter()
            .map(|code| {
                base62::decode(code).map(|id| UrlKey { id, user_id })
            })
            .collect::<Result<Vec<_>>>()?;

        if targets.is_empty() {
            return Ok(());
        }

        let count = targets.len();
        match self.task_queue.try_send(Task::delete(targets)) {
            Ok(()) => {
                debug!("Queued deletion of {} urls for {}", count, user_id);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!("Deletion queue is full, rejecting {} urls", count);
                Err(ShortenerError::TaskBufferFull)
            }
            Err(TrySendError::Closed(_)) => Err(ShortenerError::QueueClosed),
        }
    }

    /// 存储健康检查
    pub async fn storage_check(&self) -> Result<()> {
        self.storage.ping().await
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        let users = self.storage.get_user_count().await?;
        let urls = self.storage.get_url_count().await?;
        Ok(Stats { users, urls })
    }

    /// 关闭存储；应在删除队列 worker 退出之后调用
    pub async fn close(&self) -> Result<()> {
        self.storage.close().await
    }
}
