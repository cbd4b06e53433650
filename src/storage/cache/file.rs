//! 快照文件读写
//!
//! 文件格式：`{ "data": { <uuid>: { "user_id": <uuid>, "value": <url> } } }`。
//! 只有已软删除的条目才会额外写出 `"deleted": true`。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;
use uuid::Uuid;

use super::CachedUrl;
use crate::errors::{Result, ShortenerError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    data: BTreeMap<Uuid, SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    user_id: Uuid,
    value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    deleted: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// 从快照文件加载；文件不存在或为空时返回空表
pub(super) fn load_snapshot(path: &Path) -> Result<HashMap<Uuid, CachedUrl>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Snapshot file {} not found, starting empty", path.display());
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(ShortenerError::file_operation(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            )));
        }
    };

    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
        ShortenerError::serialization(format!(
            "Failed to parse snapshot {}: {}",
            path.display(),
            e
        ))
    })?;

    snapshot
        .data
        .into_iter()
        .map(|(id, entry)| {
            let value = Url::parse(&entry.value).map_err(|e| {
                ShortenerError::serialization(format!(
                    "Invalid url for {} in snapshot: {}",
                    id, e
                ))
            })?;
            Ok((
                id,
                CachedUrl {
                    user_id: entry.user_id,
                    value,
                    deleted: entry.deleted,
                },
            ))
        })
        .collect()
}

/// 把整张表写回快照文件（整体覆盖）
pub(super) fn store_snapshot(path: &Path, data: &HashMap<Uuid, CachedUrl>) -> Result<()> {
    let snapshot = Snapshot {
        data: data
            .iter()
            .map(|(id, item)| {
                (
                    *id,
                    SnapshotEntry {
                        user_id: item.user_id,
                        value: item.value.to_string(),
                        deleted: item.deleted,
                    },
                )
            })
            .collect(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec(&snapshot)?;
    fs::write(path, json)?;
    Ok(())
}
