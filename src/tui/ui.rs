use ratatui::{
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
  Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Focus};
use crate::finder::{
  FinderView, HostSearch, MessageKind, MoreHint, SearchResult, HELP_TITLE, NOTHING_FOUND,
  SEARCH_TIPS, SUPPORT_LABEL, SUPPORT_URL,
};

const LABEL: &str = "Search for your school or institution";
const PLACEHOLDER: &str = "Search…";
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// 帮助文字固定高度：分隔线 + 标题 + 三条建议 + 支持链接
const HELP_HEIGHT: u16 = SEARCH_TIPS.len() as u16 + 3;

/// 主界面渲染
pub fn render<S: HostSearch>(frame: &mut Frame, app: &App<S>) {
  let area = frame.area();
  let show_help = app.finder.state().should_show_help();

  let mut constraints = vec![
    Constraint::Length(1), // 标签
    Constraint::Length(3), // 搜索框
    Constraint::Length(1), // 输入提示
    Constraint::Min(3),    // 结果区
  ];
  if show_help {
    constraints.push(Constraint::Length(HELP_HEIGHT));
  }
  if app.show_logs {
    constraints.push(Constraint::Length(10));
  }
  constraints.push(Constraint::Length(1)); // 状态栏

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  let mut idx = 0;
  let label = Paragraph::new(Span::styled(
    LABEL,
    Style::default().add_modifier(Modifier::BOLD),
  ));
  frame.render_widget(label, chunks[idx]);
  idx += 1;

  render_search_bar(frame, app, chunks[idx]);
  idx += 1;

  render_input_message(frame, app, chunks[idx]);
  idx += 1;

  render_results(frame, app, chunks[idx]);
  idx += 1;

  if show_help {
    render_help_blurb(frame, chunks[idx]);
    idx += 1;
  }

  if app.show_logs {
    render_log_panel(frame, app, chunks[idx]);
    idx += 1;
  }

  render_status_bar(frame, app, chunks[idx]);

  if app.show_keys {
    render_keys_popup(frame);
  }
}

/// 渲染搜索框
fn render_search_bar<S: HostSearch>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let search_style = if app.focus == Focus::Search {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default().fg(Color::Gray)
  };

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(search_style)
    .title(" 🔍 ");
  let inner = block.inner(area);

  let text = if app.input.is_empty() {
    Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
  } else {
    Span::raw(app.input.as_str())
  };
  frame.render_widget(Paragraph::new(text).block(block), area);

  if app.focus == Focus::Search && !app.show_keys {
    let display_width = app.input[..app.cursor].width() as u16;
    frame.set_cursor_position((inner.x + display_width, inner.y));
  }
}

/// 输入框下方的提示/错误
fn render_input_message<S: HostSearch>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let Some(message) = app.finder.state().input_message() else {
    return;
  };
  let style = match message.kind {
    MessageKind::Hint => Style::default().fg(Color::DarkGray),
    MessageKind::Error => Style::default().fg(Color::Red),
  };
  frame.render_widget(Paragraph::new(Span::styled(message.text, style)), area);
}

/// 渲染结果区
fn render_results<S: HostSearch>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let border_style = if app.focus == Focus::Results {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default().fg(Color::Gray)
  };
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(border_style)
    .title(" Results ");

  match app.finder.state().view() {
    FinderView::Loading => {
      let frame_idx = app.spinner % SPINNER.len();
      let text = Line::from(vec![
        Span::styled(SPINNER[frame_idx], Style::default().fg(Color::Cyan)),
        Span::styled(
          " Waiting for results to load",
          Style::default().fg(Color::DarkGray),
        ),
      ]);
      frame.render_widget(Paragraph::new(text).block(block), area);
    }
    FinderView::Blank => {
      frame.render_widget(block, area);
    }
    FinderView::NothingFound => {
      let text = Paragraph::new(NOTHING_FOUND)
        .block(block)
        .wrap(Wrap { trim: true });
      frame.render_widget(text, area);
    }
    FinderView::Results { items, hint } => {
      let inner = block.inner(area);
      frame.render_widget(block, area);

      let (list_area, hint_area) = if hint.is_some() && inner.height > 1 {
        let parts = Layout::default()
          .direction(Direction::Vertical)
          .constraints([Constraint::Min(1), Constraint::Length(1)])
          .split(inner);
        (parts[0], Some(parts[1]))
      } else {
        (inner, None)
      };

      render_result_list(frame, app, items, list_area);

      if let (Some(hint), Some(hint_area)) = (hint, hint_area) {
        frame.render_widget(Paragraph::new(more_line(hint)), hint_area);
      }
    }
  }
}

fn render_result_list<S: HostSearch>(
  frame: &mut Frame,
  app: &App<S>,
  items: &[SearchResult],
  area: Rect,
) {
  let list_items: Vec<ListItem> = items
    .iter()
    .map(|result| {
      ListItem::new(Line::from(vec![
        Span::styled(
          result.name.as_str(),
          Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        ),
        Span::styled(
          format!("  {}", truncate(&result.url, 60)),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut list = List::new(list_items);
  let mut list_state = ListState::default();
  if app.focus == Focus::Results {
    list = list.highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    );
    list_state.select(Some(app.selected.min(items.len().saturating_sub(1))));
  }
  frame.render_stateful_widget(list, area, &mut list_state);
}

/// "还有更多" 提示，强调词加粗
fn more_line(hint: MoreHint) -> Line<'static> {
  let dim = Style::default().fg(Color::DarkGray);
  match hint {
    MoreHint::More => Line::from(Span::styled(hint.message(), dim)),
    other => Line::from(vec![
      Span::styled("... and ", dim),
      Span::styled(
        other.quantifier(),
        dim.add_modifier(Modifier::BOLD),
      ),
      Span::styled(" more not shown here", dim),
    ]),
  }
}

/// 搜索建议与支持链接
fn render_help_blurb(frame: &mut Frame, area: Rect) {
  let mut lines = vec![
    Line::from(Span::styled(
      "─".repeat(area.width as usize),
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(Span::styled(
      HELP_TITLE,
      Style::default().add_modifier(Modifier::BOLD),
    )),
  ];
  lines.extend(SEARCH_TIPS.iter().map(|tip| Line::from(format!("  • {}", tip))));
  lines.push(Line::from(vec![
    Span::raw("  • Still having difficulty? Get more help here: "),
    Span::styled(
      SUPPORT_LABEL,
      Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::UNDERLINED),
    ),
    Span::styled(
      format!(" ({})", SUPPORT_URL),
      Style::default().fg(Color::DarkGray),
    ),
  ]));

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// 渲染日志面板
fn render_log_panel<S: HostSearch>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta))
    .title(" Debug Logs [Ctrl+L close] ");

  let logs = app.get_logs();
  let inner_height = area.height.saturating_sub(2) as usize;

  // 只显示最新的日志
  let start = logs.len().saturating_sub(inner_height);

  let lines: Vec<Line> = logs
    .iter()
    .skip(start)
    .map(|log| {
      let style = if log.contains("[ERROR]") {
        Style::default().fg(Color::Red)
      } else if log.contains("[WARN]") {
        Style::default().fg(Color::Yellow)
      } else if log.contains("[DEBUG]") {
        Style::default().fg(Color::DarkGray)
      } else {
        Style::default().fg(Color::Gray)
      };
      Line::from(Span::styled(log.clone(), style))
    })
    .collect();

  let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

/// 渲染状态栏
fn render_status_bar<S: HostSearch>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  let left = match (app.focus, app.selected_result()) {
    (Focus::Results, Some(result)) => format!(" {}", result.url),
    _ => format!(" {}", app.status_line()),
  };
  let status = Paragraph::new(left).style(Style::default().fg(Color::Cyan));
  frame.render_widget(status, chunks[0]);

  let hints = match app.focus {
    Focus::Search => "[Tab] Results  [Ctrl+H] Keys  [Esc] Clear/Quit ",
    Focus::Results => "[↑↓/jk] Nav  [Enter] Open  [Esc] Back ",
  };
  let hints = Paragraph::new(hints)
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Right);
  frame.render_widget(hints, chunks[1]);
}

/// 渲染快捷键弹窗
fn render_keys_popup(frame: &mut Frame) {
  let area = centered_rect(50, 60, frame.area());

  frame.render_widget(Clear, area);

  let key_style = Style::default().fg(Color::Yellow);
  let rows = [
    ("  Type     ", "Search (at least 3 characters)"),
    ("  Tab / ↓  ", "Move to results"),
    ("  ↑↓ / jk  ", "Navigate results"),
    ("  Enter    ", "Open selected institution"),
    ("  g / G    ", "Jump to first/last"),
    ("  Esc      ", "Clear / Back / Quit"),
    ("  Ctrl+U   ", "Clear search"),
    ("  Ctrl+H   ", "Toggle this help (or ? outside search)"),
    ("  Ctrl+L   ", "Toggle debug logs (requires --debug)"),
    ("  Ctrl+Q/C ", "Force quit"),
  ];

  let mut help_text = vec![
    Line::from(Span::styled(
      "Keyboard Shortcuts",
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];
  help_text.extend(
    rows
      .iter()
      .map(|(k, d)| Line::from(vec![Span::styled(*k, key_style), Span::raw(*d)])),
  );
  help_text.push(Line::from(""));
  help_text.push(Line::from(Span::styled(
    "Press any key to close",
    Style::default().fg(Color::DarkGray),
  )));

  let help = Paragraph::new(help_text)
    .block(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Help "),
    )
    .alignment(Alignment::Left);

  frame.render_widget(help, area);
}

/// 居中矩形
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
  let popup_layout = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// 截断字符串
fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::future::Future;

  use ratatui::backend::TestBackend;
  use ratatui::Terminal;

  use crate::config::AppConfig;
  use crate::finder::{ClientError, HostRecord, SearchPage};

  struct PagedSource(u32);

  impl HostSearch for PagedSource {
    fn search(
      &self,
      _term: &str,
      _per_page: u32,
    ) -> impl Future<Output = Result<SearchPage, ClientError>> + Send {
      let pages = self.0;
      async move {
        let records = vec![HostRecord {
          id: 1,
          name: "Foo U".into(),
          domain: "foo.edu".into(),
        }];
        Ok(SearchPage::from_records(records, pages))
      }
    }
  }

  fn screen<S: HostSearch>(app: &App<S>) -> String {
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| render(f, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn test_truncate_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_initial_screen_shows_hint_only() {
    let app = App::new(PagedSource(1), false, None, AppConfig::default());
    let text = screen(&app);
    assert!(text.contains(LABEL));
    assert!(text.contains("Type at least 3 characters to search"));
    assert!(!text.contains(HELP_TITLE));
    assert!(!text.contains(NOTHING_FOUND));
  }

  #[tokio::test]
  async fn test_results_screen_with_many_more_hint() {
    let mut app = App::new(PagedSource(12), false, None, AppConfig::default());
    app.finder.set_search_term("foo");
    assert!(screen(&app).contains("Waiting for results to load"));

    assert!(app.finder.wait_for_outcome().await);
    let text = screen(&app);
    assert!(text.contains("Foo U"));
    assert!(text.contains("https://foo.edu"));
    assert!(text.contains("... and many more not shown here"));
    assert!(text.contains(HELP_TITLE));
    assert!(text.contains(SUPPORT_LABEL));
  }

  #[tokio::test]
  async fn test_single_page_has_no_more_line() {
    let mut app = App::new(PagedSource(1), false, None, AppConfig::default());
    app.finder.set_search_term("foo");
    assert!(app.finder.wait_for_outcome().await);
    let text = screen(&app);
    assert!(text.contains("Foo U"));
    assert!(!text.contains("not shown here"));
  }
}
