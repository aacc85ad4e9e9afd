mod api;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use todo_core::{config, date::parse_date, recurrence::next_date};
use todo_store::Store;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo", version, about = "Personal task scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Port to listen on (overrides config).
    #[arg(long, env = "TODO_PORT", global = true)]
    port: Option<u16>,

    /// SQLite database file (overrides config).
    #[arg(long, env = "TODO_DBFILE", global = true)]
    db_file: Option<String>,

    /// Directory with the web client (overrides config).
    #[arg(long, env = "TODO_WEBDIR", global = true)]
    web_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Print the next occurrence of a date under a repeat rule.
    NextDate {
        /// Reference date, YYYYMMDD. Defaults to today.
        #[arg(long)]
        now: Option<String>,
        /// Anchor date, YYYYMMDD.
        #[arg(long)]
        date: String,
        /// Repeat rule, e.g. "d 7" or "y".
        #[arg(long, default_value = "")]
        repeat: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    apply_overrides(&mut cfg, &cli);

    let _log_guard = init_logging(&cfg.todo);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting todo (config: {})", cli.config);

            if let Err(e) = run_server(&cfg).await {
                error!("todo stopped: {e:#}");
                return Err(e);
            }
        }
        Commands::NextDate { now, date, repeat } => {
            let now = match now {
                Some(raw) => parse_date(&raw)?,
                None => chrono::Local::now().date_naive(),
            };
            match next_date(now, &date, &repeat)? {
                Some(next) => println!("{next}"),
                None => println!("(no repeat rule)"),
            }
        }
    }

    Ok(())
}

/// Open the store and serve until shutdown. The store is closed either way.
async fn run_server(cfg: &config::Config) -> anyhow::Result<()> {
    let store = Store::new(&cfg.storage).await?;
    let state = api::ApiState::new(Arc::new(store.clone()), cfg.tasks.default_limit);

    let served = api::serve(&cfg.server, state).await;
    store.close().await;
    served
}

/// Apply CLI flags and `TODO_*` environment variables on top of the file config.
fn apply_overrides(cfg: &mut config::Config, cli: &Cli) {
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if let Some(ref db_file) = cli.db_file {
        cfg.storage.db_path = db_file.clone();
    }
    if let Some(ref web_dir) = cli.web_dir {
        cfg.server.web_dir = web_dir.clone();
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// With `log_dir` set, output goes to a daily-rolling file instead of stdout;
/// the returned guard must live until exit so buffered lines get flushed.
fn init_logging(
    cfg: &config::TodoConfig,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    match cfg.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(config::shellexpand(dir), "todo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
