// Crease entry point.
//
// Startup sequence for the TUI modes:
// 1. Parse the command line
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (log to file, not terminal)
// 4. Open the session database and restore a stored session
// 5. Build the REST client and the app state
// 6. Spawn the app loop, run the TUI until the user quits
// 7. Wait briefly for the app loop to finish

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};

use crease_app::app::{self, AppState};
use crease_app::import::import_players;
use crease_app::protocol::Mode;
use crease_core::api::HttpApi;
use crease_core::config::{self, Config, LoggingConfig};
use crease_core::db::Database;
use crease_core::model::PlayerStats;
use crease_core::session::Session;
use crease_cricket::roster_csv;
use crease_cricket::valuation::{format_currency, Valuation};
use crease_tui::tui;

#[derive(Parser)]
#[command(name = "crease")]
#[command(about = "Fantasy cricket team selection client", long_about = None)]
struct Cli {
    /// Directory holding config/crease.toml (defaults to the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse players, build a team and follow the leaderboard
    Portal,
    /// Tournament summary and roster management
    Admin,
    /// Create every player in a roster CSV using the stored session
    Import {
        /// CSV with Name, University, Category and the six counters
        file: PathBuf,
    },
    /// Print the valuation of a stat line without contacting the server
    Value(StatLine),
}

#[derive(Args, Debug)]
struct StatLine {
    #[arg(long, default_value_t = 0.0)]
    runs: f64,
    #[arg(long, default_value_t = 0.0)]
    balls: f64,
    #[arg(long, default_value_t = 0.0)]
    innings: f64,
    #[arg(long, default_value_t = 0.0)]
    wickets: f64,
    /// Overs bowled as a plain decimal; balls bowled are taken as overs times six
    #[arg(long, default_value_t = 0.0)]
    overs: f64,
    #[arg(long, default_value_t = 0.0)]
    conceded: f64,
}

impl From<&StatLine> for PlayerStats {
    fn from(line: &StatLine) -> Self {
        PlayerStats {
            total_runs: line.runs,
            balls_faced: line.balls,
            innings_played: line.innings,
            wickets: line.wickets,
            overs_bowled: line.overs,
            runs_conceded: line.conceded,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Portal => run_tui(&cli, Mode::Portal).await,
        Commands::Admin => run_tui(&cli, Mode::Admin).await,
        Commands::Import { file } => run_import(&cli, file).await,
        Commands::Value(line) => {
            print_valuation(&PlayerStats::from(line));
            Ok(())
        }
    }
}

/// Load config and start logging. Returns the config and its base directory.
fn setup(cli: &Cli) -> anyhow::Result<(Config, PathBuf)> {
    let base_dir = match &cli.config {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read working directory")?,
    };
    let config = config::load_config_in(&base_dir).context("failed to load configuration")?;
    init_tracing(&base_dir, &config.logging, cli.verbose)?;
    info!("Config loaded from {}", base_dir.display());
    Ok((config, base_dir))
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let db_path = config.db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = Database::open(&db_path.to_string_lossy()).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());
    Session::restore(db).context("failed to restore session")
}

async fn run_tui(cli: &Cli, mode: Mode) -> anyhow::Result<()> {
    let (config, _) = setup(cli)?;
    info!("Crease {} starting up", mode.label());

    let session = open_session(&config)?;
    if let Some(current) = session.current() {
        info!("Restored session for {}", current.username);
    }

    let api = Arc::new(HttpApi::from_config(&config.api));
    info!("API base URL: {}", api.base_url());

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = AppState::new(config, mode, api, session);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // Blocks until the user quits.
    if let Err(e) = tui::run(mode, ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Crease shut down cleanly");
    Ok(())
}

async fn run_import(cli: &Cli, file: &Path) -> anyhow::Result<()> {
    let (config, _) = setup(cli)?;

    let drafts = roster_csv::load_roster(file)?;
    println!("Read {} players from {}", drafts.len(), file.display());

    let session = open_session(&config)?;
    let token = session
        .token()
        .context("no stored session; sign in with `crease admin` first")?;

    let api = HttpApi::from_config(&config.api);
    let report = import_players(&api, token, &drafts)
        .await
        .context("import aborted")?;

    println!("Created {} players", report.created);
    for (name, reason) in &report.failed {
        println!("  failed: {name}: {reason}");
    }
    if !report.failed.is_empty() {
        anyhow::bail!("{} players could not be created", report.failed.len());
    }
    Ok(())
}

fn print_valuation(stats: &PlayerStats) {
    let v = Valuation::of(stats);
    println!("Batting strike rate: {:.2}", v.batting_strike_rate);
    println!("Batting average:     {:.2}", v.batting_average);
    println!("Bowling strike rate: {:.2}", v.bowling_strike_rate);
    println!("Economy rate:        {:.2}", v.economy_rate);
    println!("Points:              {:.2}", v.points);
    println!("Value:               {}", format_currency(v.value));
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing(base_dir: &Path, logging: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join(&logging.directory);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("crease.log"))?;

    let default_filter = if verbose {
        "crease=debug,warn".to_string()
    } else {
        logging.filter.clone()
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
