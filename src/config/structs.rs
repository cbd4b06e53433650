use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, ShortenerError};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - shortener: 短链接渲染前缀与删除队列参数
/// - storage: 缓存引擎快照文件与数据库连接
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SHORTURL，分隔符：__
    /// 示例：SHORTURL__SHORTENER__MAX_TASK_QUEUE=10
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.as_ref();

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::from(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("SHORTURL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if path.exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path.display());
        }
        Ok(config)
    }

    /// 校验启动时必须满足的约束
    pub fn validate(&self) -> Result<()> {
        self.shortener.parse_base_url()?;

        if self.shortener.max_task_queue == 0 {
            return Err(ShortenerError::config(
                "shortener.max_task_queue must be at least 1",
            ));
        }
        if self.shortener.check_task_interval_ms == 0 {
            return Err(ShortenerError::config(
                "shortener.check_task_interval_ms must be greater than 0",
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ShortenerError::config(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 短链接服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_task_queue")]
    pub max_task_queue: usize,
    #[serde(default = "default_check_task_interval_ms")]
    pub check_task_interval_ms: u64,
}

impl ShortenerConfig {
    /// 渲染短链接用的前缀，必须是带 host 的绝对 URL
    pub fn parse_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ShortenerError::config(format!("Invalid base_url '{}': {}", self.base_url, e))
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ShortenerError::config(format!(
                "base_url '{}' must be an absolute URL with a host",
                self.base_url
            )));
        }
        Ok(url)
    }

    pub fn check_task_interval(&self) -> Duration {
        Duration::from_millis(self.check_task_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// 缓存引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 快照文件路径，为空表示不持久化
    #[serde(default = "default_cache_file_path")]
    pub file_path: String,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 为空表示不使用数据库
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_max_task_queue() -> usize {
    100
}

fn default_check_task_interval_ms() -> u64 {
    5000
}

fn default_cache_file_path() -> String {
    "./storage.json".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_run_migrations() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    Some(String::new())
}

fn default_enable_rotation() -> bool {
    true
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_task_queue: default_max_task_queue(),
            check_task_interval_ms: default_check_task_interval_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file_path: default_cache_file_path(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            pool_size: default_database_pool_size(),
            run_migrations: default_run_migrations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            enable_rotation: default_enable_rotation(),
            max_backups: default_max_backups(),
        }
    }
}
