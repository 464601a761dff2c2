use tracing::error;

use super::client::ClientError;
use super::model::{MoreHint, SearchPage, SearchResult};

/// 输入框下方的提示类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
  Hint,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMessage {
  pub kind: MessageKind,
  pub text: String,
}

/// 结果区域应显示的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderView<'a> {
  /// 加载中，只显示加载指示
  Loading,
  /// 尚未搜索，什么都不显示
  Blank,
  /// 搜索完成但没有结果
  NothingFound,
  Results {
    items: &'a [SearchResult],
    hint: Option<MoreHint>,
  },
}

/// 搜索组件的纯状态
///
/// 不做 IO。每个搜索周期有一个递增的 generation，只有当前 generation
/// 的结果可以写入状态。
#[derive(Debug)]
pub struct FinderState {
  min_search_length: usize,
  host: String,
  search_term: String,
  loading: bool,
  results: Option<Vec<SearchResult>>,
  pages: u32,
  generation: u64,
}

impl FinderState {
  pub fn new(min_search_length: usize) -> Self {
    Self {
      min_search_length,
      host: String::new(),
      search_term: String::new(),
      loading: false,
      results: None,
      pages: 0,
      generation: 0,
    }
  }

  /// 输入框当前显示的值
  pub fn host(&self) -> &str {
    &self.host
  }

  /// 生效的搜索词
  pub fn search_term(&self) -> &str {
    &self.search_term
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn results(&self) -> Option<&[SearchResult]> {
    self.results.as_deref()
  }

  pub fn pages(&self) -> u32 {
    self.pages
  }

  /// 更新显示值，返回是否达到最小搜索长度
  pub fn set_host(&mut self, value: &str) -> bool {
    self.host.clear();
    self.host.push_str(value);
    self.is_searchable()
  }

  pub fn is_searchable(&self) -> bool {
    self.host.chars().count() >= self.min_search_length
  }

  /// 开始新的搜索周期，旧周期随之失效
  pub fn begin_cycle(&mut self, term: &str) -> u64 {
    self.search_term = term.to_string();
    self.generation += 1;
    self.loading = true;
    self.generation
  }

  /// 回到“尚未搜索”
  pub fn reset(&mut self) {
    self.search_term.clear();
    self.generation += 1;
    self.loading = false;
    self.results = None;
  }

  /// 应用周期结果；过期周期直接丢弃，返回 false
  pub fn apply(&mut self, generation: u64, outcome: Result<SearchPage, ClientError>) -> bool {
    if generation != self.generation {
      return false;
    }

    match outcome {
      Ok(page) => {
        self.results = Some(page.results);
        self.pages = page.pages;
      }
      Err(e) => {
        error!("Search for '{}' failed: {}", self.search_term, e);
      }
    }
    self.loading = false;
    true
  }

  pub fn view(&self) -> FinderView<'_> {
    if self.loading {
      return FinderView::Loading;
    }
    match self.results.as_deref() {
      None => FinderView::Blank,
      Some([]) => FinderView::NothingFound,
      Some(items) => FinderView::Results {
        items,
        hint: MoreHint::from_pages(self.pages),
      },
    }
  }

  /// 任何一次搜索完成后（且不在加载中）显示帮助文字
  pub fn should_show_help(&self) -> bool {
    self.results.is_some() && !self.loading
  }

  pub fn input_message(&self) -> Option<InputMessage> {
    if self.is_searchable() {
      return None;
    }
    let kind = if self.host.is_empty() {
      MessageKind::Hint
    } else {
      MessageKind::Error
    };
    Some(InputMessage {
      kind,
      text: format!("Type at least {} characters to search", self.min_search_length),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;

  use crate::finder::model::HostRecord;

  fn page(n: usize, pages: u32) -> SearchPage {
    let records = (0..n)
      .map(|i| HostRecord {
        id: i as i64,
        name: format!("Host {}", i),
        domain: format!("host{}.edu", i),
      })
      .collect();
    SearchPage::from_records(records, pages)
  }

  #[test]
  fn test_initial_state_is_blank_without_help() {
    let state = FinderState::new(3);
    assert_eq!(state.view(), FinderView::Blank);
    assert!(!state.should_show_help());
    assert!(!state.is_loading());
  }

  #[test]
  fn test_input_message_kinds() {
    let mut state = FinderState::new(3);
    let msg = state.input_message().unwrap();
    assert_eq!(msg.kind, MessageKind::Hint);
    assert_eq!(msg.text, "Type at least 3 characters to search");

    assert!(!state.set_host("ha"));
    assert_eq!(state.input_message().unwrap().kind, MessageKind::Error);

    assert!(state.set_host("har"));
    assert_eq!(state.input_message(), None);
  }

  #[test]
  fn test_length_counts_characters_not_bytes() {
    let mut state = FinderState::new(3);
    // 两个字符，六个字节
    assert!(!state.set_host("大学"));
    assert!(state.set_host("大学城"));
  }

  #[test]
  fn test_loading_hides_everything_else() {
    let mut state = FinderState::new(3);
    let generation = state.begin_cycle("foo");
    assert!(state.apply(generation, Ok(page(2, 1))));

    state.begin_cycle("food");
    assert_eq!(state.view(), FinderView::Loading);
    assert!(!state.should_show_help());
  }

  #[test]
  fn test_empty_result_shows_nothing_found_and_help() {
    let mut state = FinderState::new(3);
    let generation = state.begin_cycle("zzz");
    state.apply(generation, Ok(page(0, 1)));

    assert_eq!(state.view(), FinderView::NothingFound);
    assert!(state.should_show_help());
  }

  #[test]
  fn test_results_with_hint() {
    let mut state = FinderState::new(3);
    let generation = state.begin_cycle("state");
    state.apply(generation, Ok(page(5, 7)));

    match state.view() {
      FinderView::Results { items, hint } => {
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].url, "https://host0.edu");
        assert_eq!(hint, Some(MoreHint::More));
      }
      other => panic!("unexpected view {:?}", other),
    }
  }

  #[test]
  fn test_single_page_has_no_hint() {
    let mut state = FinderState::new(3);
    let generation = state.begin_cycle("state");
    state.apply(generation, Ok(page(3, 1)));
    assert!(matches!(state.view(), FinderView::Results { hint: None, .. }));
  }

  #[test]
  fn test_failure_keeps_previous_results() {
    let mut state = FinderState::new(3);
    let first = state.begin_cycle("foo");
    state.apply(first, Ok(page(2, 2)));

    let second = state.begin_cycle("foob");
    assert!(state.apply(
      second,
      Err(ClientError::Status(StatusCode::SERVICE_UNAVAILABLE))
    ));

    assert!(!state.is_loading());
    assert_eq!(state.results().map(|r| r.len()), Some(2));
    assert_eq!(state.pages(), 2);
    assert!(state.should_show_help());
  }

  #[test]
  fn test_failure_before_any_success_stays_blank() {
    let mut state = FinderState::new(3);
    let generation = state.begin_cycle("foo");
    state.apply(generation, Err(ClientError::Status(StatusCode::BAD_GATEWAY)));

    assert!(!state.is_loading());
    assert_eq!(state.view(), FinderView::Blank);
    assert!(!state.should_show_help());
  }

  #[test]
  fn test_stale_generation_is_ignored() {
    let mut state = FinderState::new(3);
    let old = state.begin_cycle("foo");
    let current = state.begin_cycle("foobar");

    assert!(!state.apply(old, Ok(page(4, 1))));
    assert!(state.is_loading());
    assert_eq!(state.results(), None);

    assert!(state.apply(current, Ok(page(1, 1))));
    assert_eq!(state.results().map(|r| r.len()), Some(1));
  }

  #[test]
  fn test_reset_clears_results_and_invalidates_cycle() {
    let mut state = FinderState::new(3);
    let first = state.begin_cycle("foo");
    state.apply(first, Ok(page(2, 1)));

    let pending = state.begin_cycle("foob");
    state.reset();
    assert!(!state.apply(pending, Ok(page(5, 9))));

    assert_eq!(state.search_term(), "");
    assert_eq!(state.view(), FinderView::Blank);
    assert!(!state.should_show_help());
    assert!(!state.is_loading());
  }
}
