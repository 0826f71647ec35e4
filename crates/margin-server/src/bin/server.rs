//! Margin API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Token issuing
//!
//! To create a bearer token for a user:
//!
//! ```
//! cargo run -p margin-server --bin server -- --issue-token acct:alice@example.com
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use margin_api::{AppState, hash_token};
use margin_core::{links::LinkBuilder, store::AnnotationStore as _};
use margin_server::{ServerConfig, generate_token, log_events};
use margin_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser)]
#[command(author, version, about = "Margin annotation API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Issue a bearer token for USERID, print it, and exit.
  #[arg(long, value_name = "USERID")]
  issue_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 5000)?
    .set_default("base_url", "http://localhost:5000")?
    .set_default("store_path", "margin.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MARGIN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Initialise tracing. A bad filter level stops startup here.
  let exception_filter = server_cfg
    .exception_filter()
    .context("invalid log_filters entry")?;
  tracing_subscriber::registry()
    .with(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with(fmt::layer())
    .with(exception_filter)
    .init();

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: issue a token and exit.
  if let Some(userid) = cli.issue_token {
    let token = generate_token();
    store
      .add_token(&userid, &hash_token(&token))
      .await
      .context("failed to store token")?;
    println!("{token}");
    return Ok(());
  }

  let state = AppState::new(Arc::new(store), LinkBuilder::new(&server_cfg.base_url));
  tokio::spawn(log_events(state.subscribe()));

  let app = margin_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
