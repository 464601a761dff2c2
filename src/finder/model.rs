use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 结果链接的固定协议前缀
pub const URL_SCHEME: &str = "https://";

/// Upstream account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostRecord {
  /// Account id
  pub id: i64,
  /// Institution display name
  pub name: String,
  /// Canvas domain of the institution
  pub domain: String,
}

/// 展示用的搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
  pub id: i64,
  pub name: String,
  pub url: String,
}

impl From<HostRecord> for SearchResult {
  fn from(record: HostRecord) -> Self {
    Self {
      id: record.id,
      name: record.name,
      url: format!("{}{}", URL_SCHEME, record.domain),
    }
  }
}

/// 一次成功搜索的结果页
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
  pub results: Vec<SearchResult>,
  /// 总页数，至少为 1
  pub pages: u32,
}

impl SearchPage {
  pub fn from_records(records: Vec<HostRecord>, pages: u32) -> Self {
    Self {
      results: records.into_iter().map(SearchResult::from).collect(),
      pages: pages.max(1),
    }
  }
}

/// "还有更多结果" 提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoreHint {
  AFewMore,
  More,
  ManyMore,
}

impl MoreHint {
  /// 根据总页数选择提示；一页及以下不提示
  pub fn from_pages(pages: u32) -> Option<Self> {
    match pages {
      0 | 1 => None,
      2..=3 => Some(Self::AFewMore),
      4..=10 => Some(Self::More),
      _ => Some(Self::ManyMore),
    }
  }

  /// 强调词，渲染时加粗
  pub fn quantifier(&self) -> &'static str {
    match self {
      Self::AFewMore => "a few",
      Self::More => "",
      Self::ManyMore => "many",
    }
  }

  pub fn message(&self) -> String {
    match self {
      Self::More => "... and more not shown here".to_string(),
      other => format!("... and {} more not shown here", other.quantifier()),
    }
  }
}
