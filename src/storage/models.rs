use url::Url;
use uuid::Uuid;

/// 一条短链接映射
///
/// `short_url` 只在读出时由当前 base URL 和 `id` 派生，存储层从不保存它。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub long_url: Url,
    pub short_url: Option<Url>,
    /// 仅用于批量请求的结果匹配，不落库
    pub correlation_id: Option<String>,
    pub deleted: bool,
}

impl UrlEntry {
    pub fn new(id: Uuid, user_id: Uuid, long_url: Url) -> Self {
        Self {
            id,
            user_id,
            long_url,
            short_url: None,
            correlation_id: None,
            deleted: false,
        }
    }

    pub fn with_short_url(mut self, short_url: Url) -> Self {
        self.short_url = Some(short_url);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    pub fn key(&self) -> UrlKey {
        UrlKey {
            id: self.id,
            user_id: self.user_id,
        }
    }
}

/// (id, owner) pair targeted by a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrlKey {
    pub id: Uuid,
    pub user_id: Uuid,
}

/// 服务统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub users: usize,
    pub urls: usize,
}
