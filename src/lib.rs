//! Host Finder
//!
//! 机构搜索组件（TUI）与上游搜索代理（HTTP）。

pub mod api;
pub mod cli;
pub mod config;
pub mod finder;
pub mod tui;

use config::AppConfig;

/// 代理服务的共享状态
pub struct AppState {
  pub http: reqwest::Client,
  pub config: AppConfig,
}

impl AppState {
  pub fn new(config: AppConfig) -> reqwest::Result<Self> {
    let http = http_client(&config)?;
    Ok(Self { http, config })
  }
}

/// 按配置构建 HTTP 客户端
pub fn http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
  reqwest::Client::builder()
    .user_agent(&config.upstream.user_agent)
    .build()
}
