//! econ-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `ECON_*`
//! environment variables, opens the SQLite store and either serves the REST
//! API or runs the store pipeline once.
//!
//! ```sh
//! cargo run -p econ-server -- serve
//! cargo run -p econ-server -- ingest
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use econ_api::AppState;
use econ_core::{continent::ContinentTable, pipeline::run_ingest};
use econ_server::ServerConfig;
use econ_store_sqlite::SqliteStore;
use econ_worldbank::WorldBankClient;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Economy Explorer server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
  /// Serve the HTTP API (default).
  #[default]
  Serve,
  /// Fetch, persist and aggregate once, then exit.
  Ingest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("ECON")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins"),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let source =
    WorldBankClient::new(server_cfg.client_config()).context("failed to build HTTP client")?;
  let continents = ContinentTable::standard();

  let result = match cli.command.unwrap_or_default() {
    Command::Serve => serve(&server_cfg, store.clone(), source, continents).await,
    Command::Ingest => ingest(&store, &source, &continents).await,
  };

  store.close().await.context("failed to close store")?;
  result
}

async fn serve(
  cfg: &ServerConfig,
  store: SqliteStore,
  source: WorldBankClient,
  continents: ContinentTable,
) -> anyhow::Result<()> {
  let state = AppState {
    store:      Arc::new(store),
    source:     Arc::new(source),
    continents: Arc::new(continents),
  };
  let app = econ_server::app(state, cfg)?;
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down cleanly");
  Ok(())
}

async fn ingest(
  store: &SqliteStore,
  source: &WorldBankClient,
  continents: &ContinentTable,
) -> anyhow::Result<()> {
  let outcome = run_ingest(source, store, continents)
    .await
    .context("store pipeline failed")?;

  tracing::info!(
    run_id = %outcome.run_id,
    fetched = outcome.fetched,
    countries = outcome.stored.countries_written,
    facts = outcome.stored.facts_written,
    summaries = outcome.aggregation.written.len(),
    "ingest complete"
  );
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
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
