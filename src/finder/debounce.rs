use std::time::{Duration, Instant};

/// 输入防抖
///
/// 每次 `schedule` 都会重置计时；安静期满后 `poll` 交出最后一次的值。
/// 由事件循环按 tick 驱动，`now` 由调用方传入。
#[derive(Debug)]
pub struct Debouncer<T> {
  delay: Duration,
  pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: None,
    }
  }

  pub fn schedule(&mut self, value: T, now: Instant) {
    self.pending = Some((value, now));
  }

  pub fn cancel(&mut self) {
    self.pending = None;
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// 安静期已满则取出待定值
  pub fn poll(&mut self, now: Instant) -> Option<T> {
    let (_, since) = self.pending.as_ref()?;
    if now.saturating_duration_since(*since) >= self.delay {
      self.pending.take().map(|(value, _)| value)
    } else {
      None
    }
  }

  /// 距离触发还剩多久
  pub fn remaining(&self, now: Instant) -> Option<Duration> {
    self
      .pending
      .as_ref()
      .map(|(_, since)| self.delay.saturating_sub(now.saturating_duration_since(*since)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DELAY: Duration = Duration::from_millis(500);

  #[test]
  fn test_fires_after_quiet_period() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(DELAY);
    debouncer.schedule("harvard", start);

    assert_eq!(debouncer.poll(start + Duration::from_millis(499)), None);
    assert_eq!(debouncer.poll(start + DELAY), Some("harvard"));
    // 只触发一次
    assert_eq!(debouncer.poll(start + DELAY * 2), None);
    assert!(!debouncer.is_pending());
  }

  #[test]
  fn test_reschedule_resets_timer_and_keeps_latest() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(DELAY);
    debouncer.schedule("har", start);
    let later = start + Duration::from_millis(300);
    debouncer.schedule("harv", later);

    assert_eq!(debouncer.poll(start + DELAY), None);
    assert_eq!(debouncer.remaining(start + DELAY), Some(Duration::from_millis(300)));
    assert_eq!(debouncer.poll(later + DELAY), Some("harv"));
  }

  #[test]
  fn test_cancel_drops_pending() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(DELAY);
    debouncer.schedule("har", start);
    debouncer.cancel();

    assert_eq!(debouncer.poll(start + DELAY * 4), None);
    assert_eq!(debouncer.remaining(start), None);
  }
}
