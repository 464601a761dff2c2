use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use super::app::{App, Focus};
use crate::finder::HostSearch;

/// 事件处理结果
#[derive(Debug, PartialEq, Eq)]
pub enum EventResult {
  /// 继续运行
  Continue,
  /// 退出程序
  Quit,
}

/// 轮询事件
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
  if event::poll(timeout)? {
    Ok(Some(event::read()?))
  } else {
    Ok(None)
  }
}

/// 处理按键事件
pub fn handle_key_event<S: HostSearch>(app: &mut App<S>, key: KeyEvent) -> EventResult {
  // 全局快捷键（任何焦点状态下都生效）
  match key.code {
    // Ctrl+C 或 Ctrl+Q 强制退出
    KeyCode::Char('c') | KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
      return EventResult::Quit;
    }
    // Ctrl+H 切换快捷键帮助
    KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => {
      app.show_keys = !app.show_keys;
      return EventResult::Continue;
    }
    // ? 切换快捷键帮助（非搜索焦点时）
    KeyCode::Char('?') if app.focus != Focus::Search => {
      app.show_keys = !app.show_keys;
      return EventResult::Continue;
    }
    // Ctrl+L 切换日志面板（调试模式）
    KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
      app.toggle_logs();
      return EventResult::Continue;
    }
    _ => {}
  }

  // 帮助弹窗打开时任意键关闭
  if app.show_keys {
    app.show_keys = false;
    return EventResult::Continue;
  }

  match app.focus {
    Focus::Search => handle_search_input(app, key),
    Focus::Results => handle_results_input(app, key),
  }
}

fn handle_search_input<S: HostSearch>(app: &mut App<S>, key: KeyEvent) -> EventResult {
  match key.code {
    // 清空 (Ctrl+U)
    KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
      app.clear_search();
    }
    // Esc: 输入为空时退出，否则清空
    KeyCode::Esc => {
      if app.input.is_empty() {
        return EventResult::Quit;
      }
      app.clear_search();
    }
    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.input_char(c),
    KeyCode::Backspace => app.delete_char(),
    KeyCode::Delete => app.delete_char_forward(),
    KeyCode::Left => app.cursor_left(),
    KeyCode::Right => app.cursor_right(),
    KeyCode::Home => app.cursor_home(),
    KeyCode::End => app.cursor_end(),
    KeyCode::Tab | KeyCode::Down | KeyCode::Enter => {
      if !app.results().is_empty() {
        app.focus = Focus::Results;
      }
    }
    _ => {}
  }
  EventResult::Continue
}

fn handle_results_input<S: HostSearch>(app: &mut App<S>, key: KeyEvent) -> EventResult {
  match key.code {
    KeyCode::Up | KeyCode::Char('k') => {
      if app.selected == 0 {
        app.focus = Focus::Search;
      } else {
        app.list_up();
      }
    }
    KeyCode::Down | KeyCode::Char('j') => app.list_down(),
    // Jump to top (Home or 'g' for vim-style gg)
    KeyCode::Home | KeyCode::Char('g') => app.list_first(),
    // Jump to end (End or 'G' for vim-style)
    KeyCode::End | KeyCode::Char('G') => app.list_last(),
    KeyCode::Enter | KeyCode::Char('o') => app.open_selected(),
    KeyCode::Tab | KeyCode::Char('/') | KeyCode::Esc => {
      app.focus = Focus::Search;
    }
    // 在列表中也可以继续输入
    KeyCode::Char(c) if c.is_alphanumeric() || c == ' ' => {
      app.focus = Focus::Search;
      app.cursor_end();
      app.input_char(c);
    }
    KeyCode::Backspace => {
      app.focus = Focus::Search;
      app.cursor_end();
      app.delete_char();
    }
    _ => {}
  }
  EventResult::Continue
}
