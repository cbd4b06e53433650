//! Cache storage tests
//!
//! In-memory engine behaviour and its JSON snapshot file.

use shorturl::config::CacheConfig;
use shorturl::errors::ShortenerError;
use shorturl::storage::{CacheStorage, UrlEntry, UrlKey, UrlStorage};
use tempfile::TempDir;
use url::Url;
use uuid::Uuid;

fn create_test_entry(user_id: Uuid, long_url: &str) -> UrlEntry {
    UrlEntry::new(Uuid::new_v4(), user_id, Url::parse(long_url).unwrap())
}

fn snapshot_config(dir: &TempDir) -> CacheConfig {
    CacheConfig {
        file_path: dir.path().join("storage.json").display().to_string(),
    }
}

// =============================================================================
// 基本读写测试
// =============================================================================

#[cfg(test)]
mod crud_tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let storage = CacheStorage::in_memory();
        let user = Uuid::new_v4();
        let entry = create_test_entry(user, "https://example.com/a");

        storage.add(&entry).await.unwrap();

        let found = storage.get(entry.id).await.unwrap();
        assert_eq!(found.long_url, entry.long_url);
        assert_eq!(found.user_id, user);
        assert!(!found.deleted);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let storage = CacheStorage::in_memory();
        assert!(matches!(
            storage.get(Uuid::new_v4()).await,
            Err(ShortenerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_by_user_id_scans_all() {
        let storage = CacheStorage::in_memory();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        storage
            .add(&create_test_entry(alice, "https://a.com/1"))
            .await
            .unwrap();
        storage
            .add(&create_test_entry(bob, "https://b.com/1"))
            .await
            .unwrap();
        storage
            .add(&create_test_entry(alice, "https://a.com/2"))
            .await
            .unwrap();

        let urls = storage.get_by_user_id(alice).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|e| e.user_id == alice));
    }

    #[tokio::test]
    async fn test_ping_reports_invalid_storage_type() {
        let storage = CacheStorage::in_memory();
        assert!(matches!(
            storage.ping().await,
            Err(ShortenerError::InvalidStorageType)
        ));
        assert_eq!(storage.backend_name(), "cache");
    }

    #[tokio::test]
    async fn test_counts() {
        let storage = CacheStorage::in_memory();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        storage
            .batch(&[
                create_test_entry(alice, "https://c.com/1"),
                create_test_entry(alice, "https://c.com/2"),
                create_test_entry(bob, "https://c.com/3"),
            ])
            .await
            .unwrap();

        assert_eq!(storage.get_user_count().await.unwrap(), 2);
        assert_eq!(storage.get_url_count().await.unwrap(), 3);
    }
}

// =============================================================================
// 去重与批量测试
// =============================================================================

#[cfg(test)]
mod dedup_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_duplicate_returns_existing() {
        let storage = CacheStorage::in_memory();
        let first = create_test_entry(Uuid::new_v4(), "https://example.com/a");
        let second = create_test_entry(Uuid::new_v4(), "https://example.com/a");

        storage.add(&first).await.unwrap();
        let err = storage.add(&second).await.unwrap_err();

        assert_eq!(err.existing().map(|e| e.id), Some(first.id));
        assert_eq!(storage.get_url_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let storage = CacheStorage::in_memory();
        let user = Uuid::new_v4();
        storage
            .add(&create_test_entry(user, "https://taken.com/"))
            .await
            .unwrap();

        let fresh = create_test_entry(user, "https://fresh.com/");
        let clash = create_test_entry(user, "https://taken.com/");
        let err = storage
            .batch(&[fresh.clone(), clash.clone()])
            .await
            .unwrap_err();

        assert_eq!(err.existing().map(|e| e.id), Some(clash.id));
        assert!(storage.get(fresh.id).await.is_err());
        assert_eq!(storage.get_url_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_duplicate_within_batch() {
        let storage = CacheStorage::in_memory();
        let user = Uuid::new_v4();

        let err = storage
            .batch(&[
                create_test_entry(user, "https://same.com/"),
                create_test_entry(user, "https://same.com/"),
            ])
            .await
            .unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(storage.get_url_count().await.unwrap(), 0);
    }
}

// =============================================================================
// 软删除测试
// =============================================================================

#[cfg(test)]
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_delete_marks_owned_entries() {
        let storage = CacheStorage::in_memory();
        let owner = Uuid::new_v4();
        let mine = create_test_entry(owner, "https://mine.com/");
        let theirs = create_test_entry(Uuid::new_v4(), "https://theirs.com/");
        storage.add(&mine).await.unwrap();
        storage.add(&theirs).await.unwrap();

        storage
            .batch_delete(&[
                mine.key(),
                UrlKey {
                    id: theirs.id,
                    user_id: owner,
                },
                UrlKey {
                    id: Uuid::new_v4(),
                    user_id: owner,
                },
            ])
            .await
            .unwrap();

        assert!(storage.get(mine.id).await.unwrap().deleted);
        assert!(!storage.get(theirs.id).await.unwrap().deleted);
        // 不存在的 id 不会被写入
        assert_eq!(storage.get_url_count().await.unwrap(), 2);
    }
}

// =============================================================================
// 快照文件测试
// =============================================================================

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_survives_restart() {
        let dir = TempDir::new().unwrap();
        let config = snapshot_config(&dir);
        let user = Uuid::new_v4();
        let kept = create_test_entry(user, "https://kept.com/");
        let removed = create_test_entry(user, "https://removed.com/");

        let storage = CacheStorage::new(&config).unwrap();
        storage.add(&kept).await.unwrap();
        storage.add(&removed).await.unwrap();
        storage.batch_delete(&[removed.key()]).await.unwrap();
        storage.close().await.unwrap();

        let reopened = CacheStorage::new(&config).unwrap();
        let found = reopened.get(kept.id).await.unwrap();
        assert_eq!(found.long_url, kept.long_url);
        assert_eq!(found.user_id, user);
        assert!(reopened.get(removed.id).await.unwrap().deleted);

        // 去重索引也随快照恢复
        let err = reopened
            .add(&create_test_entry(Uuid::new_v4(), "https://kept.com/"))
            .await
            .unwrap_err();
        assert_eq!(err.existing().map(|e| e.id), Some(kept.id));
    }

    #[tokio::test]
    async fn test_snapshot_layout() {
        let dir = TempDir::new().unwrap();
        let config = snapshot_config(&dir);
        let entry = create_test_entry(Uuid::new_v4(), "https://ya.ru");

        let storage = CacheStorage::new(&config).unwrap();
        storage.add(&entry).await.unwrap();
        storage.close().await.unwrap();

        let raw = std::fs::read_to_string(&config.file_path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let item = &json["data"][entry.id.to_string()];
        assert_eq!(item["user_id"], entry.user_id.to_string());
        assert_eq!(item["value"], "https://ya.ru/");
        assert!(item.get("deleted").is_none());
    }

    #[tokio::test]
    async fn test_missing_snapshot_starts_empty() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::new(&snapshot_config(&dir)).unwrap();
        assert_eq!(storage.get_url_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = snapshot_config(&dir);
        std::fs::write(&config.file_path, "{ not json").unwrap();

        assert!(matches!(
            CacheStorage::new(&config),
            Err(ShortenerError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_close_without_path_is_noop() {
        let storage = CacheStorage::in_memory();
        storage.close().await.unwrap();
    }
}
