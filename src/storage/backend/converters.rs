use ::url::Url;

use crate::errors::{Result, ShortenerError};
use crate::storage::UrlEntry;
use migration::entities::url;

/// 将 Sea-ORM Model 转换为 UrlEntry，长链接按字符串重新解析
pub fn model_to_entry(model: url::Model) -> Result<UrlEntry> {
    let long_url = Url::parse(&model.original_url).map_err(|e| {
        ShortenerError::database_operation(format!(
            "Malformed url stored for {}: {}",
            model.id, e
        ))
    })?;

    Ok(UrlEntry::new(model.id, model.user_id, long_url).with_deleted(model.deleted))
}

/// 将 UrlEntry 转换为 ActiveModel（用于插入）
pub fn entry_to_active_model(entry: &UrlEntry) -> url::ActiveModel {
    use sea_orm::ActiveValue::*;

    url::ActiveModel {
        id: Set(entry.id),
        user_id: Set(entry.user_id),
        original_url: Set(entry.long_url.to_string()),
        deleted: Set(false),
    }
}
