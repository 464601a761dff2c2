//! 机构搜索组件
//!
//! 输入 → 防抖 → 搜索周期 → 渲染状态。组件本身不关心界面，
//! TUI 和命令行都只是它的前端。

pub mod client;
pub mod debounce;
pub mod link;
pub mod model;
pub mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::FinderConfig;

pub use client::{ClientError, HostSearch, ProxyClient};
pub use debounce::Debouncer;
pub use model::{HostRecord, MoreHint, SearchPage, SearchResult};
pub use state::{FinderState, FinderView, InputMessage, MessageKind};

/// 帮助文字中的搜索建议
pub const SEARCH_TIPS: [&str; 3] = [
  "Make sure that you are spelling your institution correctly.",
  "Try adding names/titles that are specific to your institution.",
  "Try entering your institution's complete name.",
];

pub const HELP_TITLE: &str = "Didn't find what you are looking for? Keep trying!";
pub const SUPPORT_LABEL: &str = "Canvas Guides";
pub const SUPPORT_URL: &str = "https://www.instructure.com";
pub const NOTHING_FOUND: &str = "Sorry, we couldn't find anything that matched.";

/// 已结束的搜索周期
struct CycleOutcome {
  generation: u64,
  outcome: Result<SearchPage, ClientError>,
}

/// 进行中的搜索周期
struct InFlight {
  generation: u64,
  cancelled: Arc<AtomicBool>,
  handle: JoinHandle<()>,
}

impl InFlight {
  /// 置取消标记并尽力中止请求；标记保证即使传输层没有及时中止，结果也会被丢弃
  fn cancel(self) {
    self.cancelled.store(true, Ordering::SeqCst);
    self.handle.abort();
  }
}

/// 搜索组件控制器
///
/// 所有状态修改都发生在调用方所在的任务上；搜索周期在独立任务里运行，
/// 只通过 channel 把结果送回来。
pub struct HostFinder<S> {
  source: Arc<S>,
  per_page: u32,
  state: FinderState,
  debouncer: Debouncer<String>,
  inflight: Option<InFlight>,
  tx: mpsc::UnboundedSender<CycleOutcome>,
  rx: mpsc::UnboundedReceiver<CycleOutcome>,
}

impl<S: HostSearch> HostFinder<S> {
  pub fn new(source: S, config: &FinderConfig) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source: Arc::new(source),
      per_page: config.per_page,
      state: FinderState::new(config.min_search_length),
      debouncer: Debouncer::new(config.debounce()),
      inflight: None,
      tx,
      rx,
    }
  }

  pub fn state(&self) -> &FinderState {
    &self.state
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// 是否有尚未生效的输入
  pub fn has_pending_input(&self) -> bool {
    self.debouncer.is_pending()
  }

  /// 是否有进行中的搜索周期
  pub fn is_searching(&self) -> bool {
    self.inflight.is_some()
  }

  /// 处理一次输入变化
  pub fn input(&mut self, value: &str, now: Instant) {
    if !self.state.set_host(value) {
      self.debouncer.cancel();
      self.set_search_term("");
      return;
    }
    self.debouncer.schedule(value.to_string(), now);
  }

  /// 驱动防抖；搜索词生效时返回 true
  pub fn tick(&mut self, now: Instant) -> bool {
    match self.debouncer.poll(now) {
      Some(term) => {
        self.set_search_term(&term);
        true
      }
      None => false,
    }
  }

  /// 设置生效的搜索词，变化时取消旧周期并开始新周期
  pub fn set_search_term(&mut self, term: &str) {
    if term == self.state.search_term() {
      return;
    }

    if let Some(inflight) = self.inflight.take() {
      inflight.cancel();
    }

    if term.is_empty() {
      self.state.reset();
    } else {
      self.start_cycle(term);
    }
  }

  fn start_cycle(&mut self, term: &str) {
    let generation = self.state.begin_cycle(term);
    let cancelled = Arc::new(AtomicBool::new(false));

    let source = Arc::clone(&self.source);
    let flag = Arc::clone(&cancelled);
    let tx = self.tx.clone();
    let term = term.to_string();
    let per_page = self.per_page;

    debug!("Search cycle {} for '{}'", generation, term);

    let handle = tokio::spawn(async move {
      let outcome = source.search(&term, per_page).await;
      if flag.load(Ordering::SeqCst) {
        return;
      }
      let _ = tx.send(CycleOutcome { generation, outcome });
    });

    self.inflight = Some(InFlight {
      generation,
      cancelled,
      handle,
    });
  }

  fn apply(&mut self, done: CycleOutcome) -> bool {
    let applied = self.state.apply(done.generation, done.outcome);
    if applied
      && self
        .inflight
        .as_ref()
        .is_some_and(|f| f.generation == done.generation)
    {
      self.inflight = None;
    }
    applied
  }

  /// 应用所有已完成的周期，返回生效的数量（0 或 1）
  pub fn drain(&mut self) -> usize {
    let mut applied = 0;
    while let Ok(done) = self.rx.try_recv() {
      if self.apply(done) {
        applied += 1;
      }
    }
    applied
  }

  /// 等待当前周期结束并应用；没有进行中的周期时立即返回 false
  pub async fn wait_for_outcome(&mut self) -> bool {
    while self.inflight.is_some() {
      let Some(done) = self.rx.recv().await else {
        return false;
      };
      if self.apply(done) {
        return true;
      }
    }
    false
  }
}

impl<S> Drop for HostFinder<S> {
  fn drop(&mut self) {
    if let Some(inflight) = self.inflight.take() {
      inflight.cancel();
    }
  }
}
