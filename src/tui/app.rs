use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::finder::{FinderView, HostFinder, HostSearch, ProxyClient, SearchResult};

/// 日志缓冲区（线程安全）
pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

/// 创建日志缓冲区
pub fn create_log_buffer(size: usize) -> LogBuffer {
  Arc::new(Mutex::new(VecDeque::with_capacity(size)))
}

/// 焦点位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Search,
  Results,
}

/// 应用状态
pub struct App<S = ProxyClient> {
  /// 搜索组件
  pub finder: HostFinder<S>,
  /// 应用配置
  pub config: AppConfig,

  /// 输入内容
  pub input: String,
  /// 光标位置（字节偏移）
  pub cursor: usize,
  /// 当前选中的结果
  pub selected: usize,
  /// 当前焦点
  pub focus: Focus,
  /// 加载动画帧
  pub spinner: usize,

  /// 是否显示快捷键帮助
  pub show_keys: bool,
  /// 是否退出
  pub should_quit: bool,

  /// 调试模式
  pub debug_mode: bool,
  /// 日志缓冲区
  pub log_buffer: Option<LogBuffer>,
  /// 是否显示日志面板
  pub show_logs: bool,
}

impl<S: HostSearch> App<S> {
  pub fn new(source: S, debug_mode: bool, log_buffer: Option<LogBuffer>, config: AppConfig) -> Self {
    let finder = HostFinder::new(source, &config.finder);

    Self {
      finder,
      config,
      input: String::new(),
      cursor: 0,
      selected: 0,
      focus: Focus::Search,
      spinner: 0,
      show_keys: false,
      should_quit: false,
      debug_mode,
      log_buffer,
      show_logs: debug_mode,
    }
  }

  /// 获取日志条目
  pub fn get_logs(&self) -> Vec<String> {
    self
      .log_buffer
      .as_ref()
      .map(|buf| buf.lock().iter().cloned().collect())
      .unwrap_or_default()
  }

  /// 切换日志面板显示
  pub fn toggle_logs(&mut self) {
    if self.debug_mode {
      self.show_logs = !self.show_logs;
    }
  }

  /// 每轮事件循环调用：驱动防抖并收取搜索结果
  pub fn tick(&mut self, now: Instant) {
    self.finder.tick(now);
    if self.finder.drain() > 0 {
      self.selected = 0;
    }
    if self.finder.state().is_loading() {
      self.spinner = self.spinner.wrapping_add(1);
    }
    if self.focus == Focus::Results && self.results().is_empty() {
      self.focus = Focus::Search;
    }
  }

  /// 当前可见的结果
  pub fn results(&self) -> &[SearchResult] {
    match self.finder.state().view() {
      FinderView::Results { items, .. } => items,
      _ => &[],
    }
  }

  pub fn selected_result(&self) -> Option<&SearchResult> {
    self.results().get(self.selected)
  }

  fn changed(&mut self) {
    self.finder.input(&self.input, Instant::now());
  }

  /// 输入字符
  pub fn input_char(&mut self, c: char) {
    self.input.insert(self.cursor, c);
    self.cursor += c.len_utf8();
    self.changed();
  }

  /// 删除字符
  pub fn delete_char(&mut self) {
    if let Some(c) = self.input[..self.cursor].chars().next_back() {
      self.cursor -= c.len_utf8();
      self.input.remove(self.cursor);
      self.changed();
    }
  }

  /// 删除光标后的字符
  pub fn delete_char_forward(&mut self) {
    if self.cursor < self.input.len() {
      self.input.remove(self.cursor);
      self.changed();
    }
  }

  /// 光标左移
  pub fn cursor_left(&mut self) {
    if let Some(c) = self.input[..self.cursor].chars().next_back() {
      self.cursor -= c.len_utf8();
    }
  }

  /// 光标右移
  pub fn cursor_right(&mut self) {
    if let Some(c) = self.input[self.cursor..].chars().next() {
      self.cursor += c.len_utf8();
    }
  }

  /// 光标移到开头
  pub fn cursor_home(&mut self) {
    self.cursor = 0;
  }

  /// 光标移到结尾
  pub fn cursor_end(&mut self) {
    self.cursor = self.input.len();
  }

  /// 清空输入
  pub fn clear_search(&mut self) {
    self.input.clear();
    self.cursor = 0;
    self.selected = 0;
    self.changed();
  }

  /// 列表上移
  pub fn list_up(&mut self) {
    self.selected = self.selected.saturating_sub(1);
  }

  /// 列表下移
  pub fn list_down(&mut self) {
    if self.selected + 1 < self.results().len() {
      self.selected += 1;
    }
  }

  pub fn list_first(&mut self) {
    self.selected = 0;
  }

  pub fn list_last(&mut self) {
    self.selected = self.results().len().saturating_sub(1);
  }

  /// 在浏览器中打开选中的机构
  pub fn open_selected(&self) {
    let Some(result) = self.selected_result() else {
      return;
    };
    debug!("Opening {}", result.url);
    if let Err(e) = open::that(&result.url) {
      warn!("Failed to open {}: {}", result.url, e);
    }
  }

  /// 状态栏文字
  pub fn status_line(&self) -> String {
    let state = self.finder.state();
    if state.is_loading() {
      return format!("Searching '{}'...", state.search_term());
    }
    if self.finder.has_pending_input() {
      return "Typing...".to_string();
    }
    match state.results() {
      None => format!("Endpoint: {}", self.config.finder.endpoint),
      Some([]) => format!("No hosts for '{}'", state.search_term()),
      Some(items) => format!(
        "{} shown for '{}' ({} page{})",
        items.len(),
        state.search_term(),
        state.pages(),
        if state.pages() == 1 { "" } else { "s" }
      ),
    }
  }
}
