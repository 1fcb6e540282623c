//! Application configuration module / 应用配置模块
//!
//! Configuration is loaded from config.json next to the binary; a default
//! file is created on first run. Bind address and index data source can be
//! overridden by environment variables (useful in containers):
//! 首次运行时创建默认配置文件，监听地址和索引数据源可用环境变量覆盖：
//! `DOCSEARCH_HOST`, `DOCSEARCH_PORT`, `DOCSEARCH_INDEX`.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Global configuration instance / 全局配置实例
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Application configuration / 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Index configuration / 索引配置
    pub index: IndexConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Index configuration / 索引配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path of the JSON document set served by the in-memory backend
    /// 内存后端加载的 JSON 文档集路径
    pub data_file: String,
    /// Abstract window size in characters / 摘要窗口长度（字符）
    pub abstract_max_chars: usize,
    /// Context words kept around each match / 命中词两侧保留的词数
    pub abstract_context_words: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_file: "data/documents.json".to_string(),
            abstract_max_chars: 120,
            abstract_context_words: 4,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the index data file path / 获取索引数据文件路径
    pub fn get_index_data_file(&self) -> PathBuf {
        PathBuf::from(&self.index.data_file)
    }

    /// Apply environment overrides / 应用环境变量覆盖
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DOCSEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("DOCSEARCH_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("DOCSEARCH_PORT is not a port number: {}", port),
            }
        }
        if let Ok(data_file) = std::env::var("DOCSEARCH_INDEX") {
            self.index.data_file = data_file;
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists
/// 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    let config_path = get_config_path();

    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        let config = AppConfig::default();
        save_config(&config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        config
    };

    config.apply_env_overrides();
    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let config_path = get_config_path();

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(&config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Get global configuration instance / 获取全局配置实例
pub fn get_config() -> Arc<RwLock<AppConfig>> {
    CONFIG
        .get_or_init(|| {
            let config = load_config().unwrap_or_default();
            Arc::new(RwLock::new(config))
        })
        .clone()
}

/// Get a read-only snapshot of current config / 获取当前配置的只读快照
pub fn config() -> AppConfig {
    get_config().read().clone()
}
