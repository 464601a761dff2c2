//! 配置管理模块
//!
//! 提供应用配置的加载、解析和默认值管理。
//! 配置文件采用 TOML 格式，支持从文件加载或使用内置默认值。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 代理服务器配置
    pub server: ServerConfig,
    /// 上游搜索接口配置
    pub upstream: UpstreamConfig,
    /// 搜索组件配置
    pub finder: FinderConfig,
    /// TUI 配置
    pub tui: TuiConfig,
    /// 存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听端口
    pub port: u16,
    /// 绑定地址
    pub bind: String,
}

/// 上游配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// accounts search 接口地址（查询参数原样转发）
    pub search_url: String,
    /// HTTP 请求 User-Agent
    pub user_agent: String,
}

/// 搜索组件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// 代理搜索端点
    pub endpoint: String,
    /// 触发搜索的最小字符数
    pub min_search_length: usize,
    /// 输入防抖时间（毫秒）
    pub debounce_ms: u64,
    /// 每页结果数
    pub per_page: u32,
}

/// TUI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// 事件轮询超时（毫秒）
    pub poll_timeout_ms: u64,
    /// 日志缓冲区大小
    pub log_buffer_size: usize,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 数据目录（空表示使用默认路径）
    pub data_dir: Option<PathBuf>,
    /// 日志目录名
    pub log_dirname: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 默认日志级别
    pub level: String,
    /// 调试模式日志级别
    pub debug_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            bind: "127.0.0.1".to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            search_url: "https://canvas.instructure.com/api/v1/accounts/search".to_string(),
            user_agent: concat!("host-finder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3030/api/search".to_string(),
            min_search_length: 3,
            debounce_ms: 500,
            per_page: 5,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 50,
            log_buffer_size: 100,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_dirname: "logs".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_level: "debug,hyper=info,reqwest=info".to_string(),
        }
    }
}

impl FinderConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    /// 从 TOML 文件加载配置
    /// 如果文件不存在，返回默认配置
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config file: {}", e);
                }
            }
        }
        Self::default()
    }

    /// 从默认位置加载配置
    /// 优先级：
    /// 1. 当前目录下的 host-finder.toml
    /// 2. 数据目录下的 config.toml（数据目录受 HOST_FINDER_DATA_DIR 覆盖）
    /// 3. 内置默认值
    pub fn load_default() -> Self {
        let data_dir = env_data_dir().unwrap_or_else(get_default_data_dir);
        Self::load_layered(Path::new("host-finder.toml"), &data_dir)
    }

    fn load_layered(local: &Path, data_dir: &Path) -> Self {
        if local.exists() {
            return Self::load(local);
        }

        let data_config = data_dir.join("config.toml");
        if data_config.exists() {
            return Self::load(&data_config);
        }

        Self::default()
    }

    /// 获取数据目录
    /// 配置项 > 环境变量 > 系统默认
    pub fn get_data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(env_data_dir)
            .unwrap_or_else(get_default_data_dir)
    }

    /// 日志目录
    pub fn get_log_dir(&self) -> PathBuf {
        self.get_data_dir().join(&self.storage.log_dirname)
    }

    /// 生成配置文件内容
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// 覆盖数据目录的环境变量
pub const DATA_DIR_ENV: &str = "HOST_FINDER_DATA_DIR";

fn env_data_dir() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)
}

/// 获取默认数据目录
fn get_default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("host-finder")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.finder.min_search_length, 3);
        assert_eq!(config.finder.per_page, 5);
        assert_eq!(config.finder.debounce(), Duration::from_millis(500));
        assert!(config.upstream.search_url.ends_with("/api/v1/accounts/search"));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = config.to_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("port = 3030"));
        assert!(toml_str.contains("[finder]"));
        assert!(toml_str.contains("debounce_ms = 500"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[server]
port = 8080
bind = "0.0.0.0"

[finder]
per_page = 10
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.finder.per_page, 10);
        // 未指定的字段使用默认值
        assert_eq!(config.finder.min_search_length, 3);
        assert_eq!(config.tui.log_buffer_size, 100);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[upstream]\nsearch_url = \"http://127.0.0.1:9/search\"\n",
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.upstream.search_url, "http://127.0.0.1:9/search");
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_load_missing_or_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppConfig::load(&dir.path().join("nope.toml"));
        assert_eq!(missing.finder.debounce_ms, 500);

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[server\nport = ").unwrap();
        assert_eq!(AppConfig::load(&broken).server.port, 3030);
    }

    #[test]
    fn test_layered_load_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("host-finder.toml");
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("config.toml"), "[server]\nport = 4000\n").unwrap();

        // 没有本地文件时读取数据目录下的 config.toml
        assert_eq!(AppConfig::load_layered(&local, &data_dir).server.port, 4000);

        std::fs::write(&local, "[server]\nport = 5000\n").unwrap();
        assert_eq!(AppConfig::load_layered(&local, &data_dir).server.port, 5000);

        let empty = dir.path().join("empty");
        assert_eq!(AppConfig::load_layered(&dir.path().join("none.toml"), &empty).server.port, 3030);
    }

    #[test]
    fn test_data_dir_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(DATA_DIR_ENV, dir.path());

        let config = AppConfig::default();
        assert_eq!(config.get_data_dir(), dir.path());
        assert_eq!(config.get_log_dir(), dir.path().join("logs"));

        // 配置文件中的 data_dir 优先于环境变量
        let mut pinned = AppConfig::default();
        pinned.storage.data_dir = Some(dir.path().join("pinned"));
        assert_eq!(pinned.get_data_dir(), dir.path().join("pinned"));

        std::env::remove_var(DATA_DIR_ENV);
        assert_ne!(config.get_data_dir(), dir.path());
    }
}
