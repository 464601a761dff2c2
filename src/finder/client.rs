use std::future::Future;

use reqwest::header::LINK;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use super::link;
use super::model::{HostRecord, SearchPage};

#[derive(Error, Debug)]
pub enum ClientError {
  #[error("Bad API response: {0}")]
  Status(StatusCode),
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),
  #[error("Decode error: {0}")]
  Decode(#[from] serde_json::Error),
}

/// 搜索数据源
///
/// 组件只依赖这个接口；生产环境走代理，测试用内存实现。
pub trait HostSearch: Send + Sync + 'static {
  fn search(
    &self,
    term: &str,
    per_page: u32,
  ) -> impl Future<Output = Result<SearchPage, ClientError>> + Send;
}

/// 通过 `/api/search` 代理查询
#[derive(Clone)]
pub struct ProxyClient {
  http: reqwest::Client,
  endpoint: String,
}

impl ProxyClient {
  pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
    Self {
      http,
      endpoint: endpoint.into(),
    }
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  async fn fetch(&self, term: &str, per_page: u32) -> Result<SearchPage, ClientError> {
    let per_page = per_page.to_string();
    let response = self
      .http
      .get(&self.endpoint)
      .query(&[("name", term), ("per_page", per_page.as_str())])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ClientError::Status(status));
    }

    // 多行 Link 等价于逗号合并后的单个值
    let links: Vec<&str> = response
      .headers()
      .get_all(LINK)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .collect();
    let links = links.join(", ");
    let pages = link::page_count(Some(links.as_str()).filter(|v| !v.is_empty()));
    let body = response.bytes().await?;
    let records: Vec<HostRecord> = serde_json::from_slice(&body)?;
    debug!("'{}' -> {} hosts, {} pages", term, records.len(), pages);

    Ok(SearchPage::from_records(records, pages))
  }
}

impl HostSearch for ProxyClient {
  fn search(
    &self,
    term: &str,
    per_page: u32,
  ) -> impl Future<Output = Result<SearchPage, ClientError>> + Send {
    self.fetch(term, per_page)
  }
}
