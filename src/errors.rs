use std::fmt;

use crate::storage::UrlEntry;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    Parse(String),
    Decode(String),
    InvalidRequest(String),
    /// 长链接已存在，携带已有记录（id / 所属用户 / 长链接）
    AlreadyExists(Box<UrlEntry>),
    NotFound(String),
    Gone(String),
    TaskBufferFull,
    QueueClosed,
    InvalidStorageType,
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
}

impl ShortenerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::Parse(_) => "E001",
            ShortenerError::Decode(_) => "E002",
            ShortenerError::InvalidRequest(_) => "E003",
            ShortenerError::AlreadyExists(_) => "E004",
            ShortenerError::NotFound(_) => "E005",
            ShortenerError::Gone(_) => "E006",
            ShortenerError::TaskBufferFull => "E007",
            ShortenerError::QueueClosed => "E008",
            ShortenerError::InvalidStorageType => "E009",
            ShortenerError::DatabaseConfig(_) => "E010",
            ShortenerError::DatabaseConnection(_) => "E011",
            ShortenerError::DatabaseOperation(_) => "E012",
            ShortenerError::FileOperation(_) => "E013",
            ShortenerError::Serialization(_) => "E014",
            ShortenerError::Config(_) => "E015",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::Parse(_) => "Parse Error",
            ShortenerError::Decode(_) => "Decode Error",
            ShortenerError::InvalidRequest(_) => "Invalid Request",
            ShortenerError::AlreadyExists(_) => "URL Already Exists",
            ShortenerError::NotFound(_) => "URL Not Found",
            ShortenerError::Gone(_) => "URL Deleted",
            ShortenerError::TaskBufferFull => "Task Buffer Full",
            ShortenerError::QueueClosed => "Task Queue Closed",
            ShortenerError::InvalidStorageType => "Invalid Storage Type",
            ShortenerError::DatabaseConfig(_) => "Database Configuration Error",
            ShortenerError::DatabaseConnection(_) => "Database Connection Error",
            ShortenerError::DatabaseOperation(_) => "Database Operation Error",
            ShortenerError::FileOperation(_) => "File Operation Error",
            ShortenerError::Serialization(_) => "Serialization Error",
            ShortenerError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            ShortenerError::Parse(msg)
            | ShortenerError::Decode(msg)
            | ShortenerError::InvalidRequest(msg)
            | ShortenerError::NotFound(msg)
            | ShortenerError::Gone(msg)
            | ShortenerError::DatabaseConfig(msg)
            | ShortenerError::DatabaseConnection(msg)
            | ShortenerError::DatabaseOperation(msg)
            | ShortenerError::FileOperation(msg)
            | ShortenerError::Serialization(msg)
            | ShortenerError::Config(msg) => msg.clone(),
            ShortenerError::AlreadyExists(existing) => {
                format!("{} already shortened as {}", existing.long_url, existing.id)
            }
            ShortenerError::TaskBufferFull => "deletion queue is at capacity".to_string(),
            ShortenerError::QueueClosed => "deletion queue is no longer running".to_string(),
            ShortenerError::InvalidStorageType => {
                "storage has no durable backend to ping".to_string()
            }
        }
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ShortenerError::AlreadyExists(_))
    }

    /// The pre-existing entry carried by an `AlreadyExists` conflict.
    pub fn existing(&self) -> Option<&UrlEntry> {
        match self {
            ShortenerError::AlreadyExists(existing) => Some(&**existing),
            _ => None,
        }
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortenerError {}

// 便捷的构造函数
impl ShortenerError {
    pub fn parse<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Parse(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Decode(msg.into())
    }

    pub fn invalid_request<T: Into<String>>(msg: T) -> Self {
        ShortenerError::InvalidRequest(msg.into())
    }

    pub fn already_exists(existing: UrlEntry) -> Self {
        ShortenerError::AlreadyExists(Box::new(existing))
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn gone<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Gone(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShortenerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortenerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShortenerError {
    fn from(err: std::io::Error) -> Self {
        ShortenerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortenerError {
    fn from(err: serde_json::Error) -> Self {
        ShortenerError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ShortenerError {
    fn from(err: url::ParseError) -> Self {
        ShortenerError::Parse(err.to_string())
    }
}

impl From<uuid::Error> for ShortenerError {
    fn from(err: uuid::Error) -> Self {
        ShortenerError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for ShortenerError {
    fn from(err: config::ConfigError) -> Self {
        ShortenerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
