use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "host-finder")]
#[command(author, version, about = "Find your institution - search widget and search proxy")]
pub struct Cli {
  /// Enable debug mode (show logs at TUI bottom)
  #[arg(short, long, global = true)]
  pub debug: bool,

  #[command(subcommand)]
  pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
  /// Start the search proxy server
  Serve {
    /// Listen port (default from config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address (default from config)
    #[arg(short, long)]
    bind: Option<String>,
  },

  /// Search once through the proxy and print the results
  Search {
    /// Institution name (at least 3 characters)
    name: String,

    /// Results per page
    #[arg(long)]
    per_page: Option<u32>,

    /// Proxy search endpoint
    #[arg(long)]
    endpoint: Option<String>,
  },

  /// Print the effective configuration as TOML
  Config,
}
