//! URL 与用户标识验证模块
//!
//! 长链接必须是带 host 的绝对 URL，且不能使用危险协议。

use url::Url;
use uuid::Uuid;

use crate::errors::{Result, ShortenerError};

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 验证并解析长链接
///
/// 检查项目：
/// 1. URL 不为空
/// 2. 不是危险协议（javascript:, data:, file: 等）
/// 3. 是带 host 的绝对 URL
pub fn parse_long_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ShortenerError::parse("URL cannot be empty"));
    }

    let lower = raw.to_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(**p)) {
        return Err(ShortenerError::parse(format!(
            "dangerous protocol blocked: {}",
            proto
        )));
    }

    let url = Url::parse(raw)
        .map_err(|e| ShortenerError::parse(format!("invalid URL {}: {}", raw, e)))?;

    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(ShortenerError::parse(format!(
            "URL must be absolute with a host: {}",
            raw
        )));
    }

    Ok(url)
}

/// 解析用户标识（RFC 4122 UUID）
pub fn parse_user_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| ShortenerError::parse(format!("invalid user id {}: {}", raw, e)))
}
