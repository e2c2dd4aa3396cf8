//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::open_store;
use crate::domain::error::BlotterError;
use crate::domain::filter::TradeFilter;
use crate::domain::repository;
use crate::domain::trade::{parse_price, parse_timestamp};
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_store::TradeStore;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "blotter", about = "Trade blotter query service")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "blotter.ini")]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve,
    /// Create the trade table if it does not exist
    InitDb,
    /// Create trades from a CSV file, skipping ids already stored
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    #[command(flatten)]
    Query(QueryCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommand {
    /// Print every trade sorted by price
    List,
    /// Print one trade by id
    Show { id: String },
    /// Print trades whose counterparty, instrument or trader contains TEXT
    Search { text: String },
    /// Print trades matching all given criteria, sorted by price
    Filter(FilterArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub asset_class: Option<String>,
    /// Exclusive lower bound on trade time
    #[arg(long, value_parser = parse_timestamp_arg)]
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper bound on trade time
    #[arg(long, value_parser = parse_timestamp_arg)]
    pub end: Option<NaiveDateTime>,
    #[arg(long, value_parser = parse_price_arg)]
    pub min_price: Option<f64>,
    #[arg(long, value_parser = parse_price_arg)]
    pub max_price: Option<f64>,
    /// Buy or Sell
    #[arg(long)]
    pub trade_type: Option<String>,
}

impl From<&FilterArgs> for TradeFilter {
    fn from(args: &FilterArgs) -> Self {
        TradeFilter {
            asset_class: args.asset_class.clone(),
            start: args.start,
            end: args.end,
            min_price: args.min_price,
            max_price: args.max_price,
            trade_type: args.trade_type.clone(),
        }
    }
}

fn parse_timestamp_arg(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn parse_price_arg(s: &str) -> Result<f64, String> {
    parse_price("price", s).map_err(|e| e.to_string())
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn execute(cli: Cli) -> Result<(), BlotterError> {
    let config = load_config(&cli.config)?;
    init_tracing(&config);

    match cli.command {
        Command::Serve => run_serve(&config),
        Command::InitDb => {
            let store = open_store(&config)?;
            tracing::info!(trades = store.count()?, "schema ready");
            Ok(())
        }
        Command::Import { file } => run_import(&config, &file),
        Command::Query(query) => {
            let store = open_store(&config)?;
            let stdout = std::io::stdout();
            run_query(store.as_ref(), &query, &mut stdout.lock())
        }
    }
}

/// Load the INI file and layer `BLOTTER_*` environment overrides on top.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BlotterError> {
    Ok(FileConfigAdapter::from_file(path)?.with_env_overrides())
}

/// Install the global subscriber. `RUST_LOG` wins over `[log] level`.
pub fn init_tracing(config: &dyn ConfigPort) {
    let level = config
        .get_string("log", "level")
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when called more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.get_bool("log", "ansi", true))
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, BlotterError> {
    let raw = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    raw.parse().map_err(|e: std::net::AddrParseError| BlotterError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("'{raw}': {e}"),
    })
}

/// Run one read-only query and print the result as JSON.
pub fn run_query(
    store: &dyn TradeStore,
    query: &QueryCommand,
    out: &mut dyn Write,
) -> Result<(), BlotterError> {
    match query {
        QueryCommand::List => write_json(out, &repository::list_all(store)?),
        QueryCommand::Show { id } => write_json(out, &repository::get_by_id(store, id)?),
        QueryCommand::Search { text } => write_json(out, &repository::search(store, text)?),
        QueryCommand::Filter(args) => {
            write_json(out, &repository::filter(store, &TradeFilter::from(args))?)
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), BlotterError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(std::io::Error::other)?;
    writeln!(out)?;
    Ok(())
}

fn run_import(config: &dyn ConfigPort, file: &Path) -> Result<(), BlotterError> {
    tracing::info!(file = %file.display(), "reading trades");
    let trades = csv_adapter::read_trades_from_path(file)?;
    let store = open_store(config)?;
    let summary = csv_adapter::import_trades(store.as_ref(), trades)?;
    tracing::info!(
        created = summary.created,
        duplicates = summary.duplicates.len(),
        "import finished"
    );
    Ok(())
}

fn run_serve(config: &dyn ConfigPort) -> Result<(), BlotterError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};

        let addr = listen_addr(config)?;
        let store = open_store(config)?;
        let router = build_router(AppState::new(store));

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        })?;

        tracing::info!("server stopped");
        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config;
        Err(BlotterError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: "built without the 'web' feature".into(),
        })
    }
}

#[cfg(feature = "web")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
