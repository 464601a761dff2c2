use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use host_finder::cli::{Cli, Commands};
use host_finder::config::AppConfig;
use host_finder::finder::{
  HostSearch, MoreHint, ProxyClient, HELP_TITLE, NOTHING_FOUND, SEARCH_TIPS, SUPPORT_LABEL,
  SUPPORT_URL,
};
use host_finder::{api, http_client, tui, AppState};

/// 初始化终端日志（用于 CLI 命令）
fn init_console_logging(config: &AppConfig, debug: bool) {
  let level = if debug {
    config.logging.debug_level.clone()
  } else {
    config.logging.level.clone()
  };
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or(level),
    ))
    .init();
}

/// 初始化服务器日志（输出到文件）
fn init_server_logging(log_dir: &std::path::Path, config: &AppConfig, debug: bool) {
  let file_appender = tracing_appender::rolling::daily(log_dir, "host-finder.log");
  let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

  // Keep guard alive
  Box::leak(Box::new(guard));

  let env_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
    if debug {
      config.logging.debug_level.clone()
    } else {
      config.logging.level.clone()
    }
  }));

  if debug {
    // Debug mode: dual-write to file and console
    tracing_subscriber::registry()
      .with(
        tracing_subscriber::fmt::layer()
          .with_writer(non_blocking_file)
          .with_ansi(false),
      )
      .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
      .with(env_filter)
      .init();
  } else {
    // Normal mode: file only
    tracing_subscriber::registry()
      .with(
        tracing_subscriber::fmt::layer()
          .with_writer(non_blocking_file)
          .with_ansi(false),
      )
      .with(env_filter)
      .init();
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // 加载配置
  let config = AppConfig::load_default();

  match cli.command {
    // 启动代理服务
    Some(Commands::Serve { port, bind }) => {
      let bind = bind.unwrap_or_else(|| config.server.bind.clone());
      let port = port.unwrap_or(config.server.port);
      run_server(&bind, port, cli.debug, config).await
    }

    // 单次搜索
    Some(Commands::Search {
      name,
      per_page,
      endpoint,
    }) => {
      init_console_logging(&config, cli.debug);
      run_search(&name, per_page, endpoint, &config).await
    }

    // 输出当前配置
    Some(Commands::Config) => {
      print!("{}", config.to_toml());
      Ok(())
    }

    // 无子命令时启动 TUI
    None => tui::run(cli.debug, config).await,
  }
}

/// 运行 HTTP 服务
async fn run_server(bind: &str, port: u16, debug: bool, config: AppConfig) -> anyhow::Result<()> {
  let log_dir = config.get_log_dir();
  std::fs::create_dir_all(&log_dir)?;

  init_server_logging(&log_dir, &config, debug);

  tracing::info!("Upstream: {}", config.upstream.search_url);

  let state = Arc::new(AppState::new(config)?);
  let app = api::app(state);

  // 启动服务器
  let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
  println!("Host Finder proxy listening on http://{}", addr);
  println!("Search: http://{}/api/search?name=...", addr);
  println!("Swagger UI: http://{}/swagger-ui", addr);
  println!("Logs: {}", log_dir.display());
  if debug {
    println!("Debug mode: ON (logs also printed to console)");
  }
  println!("Press Ctrl+C to stop");
  tracing::info!("HTTP server listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;

  // Graceful shutdown with Ctrl+C
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  tracing::info!("Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for Ctrl+C: {}", e);
  }
}

/// 单次搜索并打印结果
async fn run_search(
  name: &str,
  per_page: Option<u32>,
  endpoint: Option<String>,
  config: &AppConfig,
) -> anyhow::Result<()> {
  let min = config.finder.min_search_length;
  if name.chars().count() < min {
    anyhow::bail!("Type at least {} characters to search", min);
  }

  let endpoint = endpoint.unwrap_or_else(|| config.finder.endpoint.clone());
  let per_page = per_page.unwrap_or(config.finder.per_page);
  let client = ProxyClient::new(http_client(config)?, endpoint);

  let page = client.search(name, per_page).await?;
  if page.results.is_empty() {
    println!("{}", NOTHING_FOUND);
  } else {
    for result in &page.results {
      println!("{:<40} {}", result.name, result.url);
    }
    if let Some(hint) = MoreHint::from_pages(page.pages) {
      println!("{}", hint.message());
    }
  }

  println!();
  println!("{}", HELP_TITLE);
  for tip in SEARCH_TIPS {
    println!("  • {}", tip);
  }
  println!(
    "  • Still having difficulty? Get more help here: {} ({})",
    SUPPORT_LABEL, SUPPORT_URL
  );

  Ok(())
}
