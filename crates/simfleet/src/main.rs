//! simfleet - manage a fleet of IoT SIM cards
//!
//! This is the entry point for the `simfleet` command. It wires together:
//! - Configuration loading
//! - The session file and the audit log
//! - The HTTP transport to the management API
//! - The fleet engine, which runs the requested command

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simfleet_api::SimStatus;
use simfleet_client::{Credentials, HttpTransport};
use simfleet_config::{load_or_default, ConfigError};
use simfleet_core::{CommandError, CommandReport, CommandResult, FleetEngine};
use simfleet_store::{AuditLog, SessionFile};
use simfleet_util::{default_config_path, SIMFLEET_CONFIG_ENV, SIMFLEET_DATA_DIR_ENV};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for input, usage and configuration problems
const EXIT_USAGE: u8 = 2;

/// simfleet - manage IoT SIM cards through the management API
#[derive(Parser, Debug)]
#[command(name = "simfleet", version)]
#[command(about = "Manage a fleet of IoT SIM cards through the management API", long_about = None)]
struct Args {
    /// Configuration file path (or set SIMFLEET_CONFIG; default: ~/.config/simfleet/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the session file and audit log (or set SIMFLEET_DATA_DIR)
    #[arg(short, long, global = true, env = SIMFLEET_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Diagnostic log level
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store a session token (valid for 60 minutes)
    Token {
        #[arg(short, long, env = "SIMFLEET_USERNAME")]
        username: String,

        #[arg(short, long, env = "SIMFLEET_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List SIMs, one page of up to 100 at a time
    List {
        /// Number of pages to fetch (1-10)
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Show everything known about one SIM
    Sim { iccid: String },

    /// Show the network status of a SIM
    Status { iccid: String },

    /// Show daily usage; RANGE is `[start][:end]` with dates as YYYY-MM-DD
    Usage {
        iccid: String,
        #[arg(allow_hyphen_values = true)]
        range: Option<String>,
    },

    /// Show the remaining data quota of a SIM
    Quota { iccid: String },

    /// Show the event history of a SIM
    Events {
        iccid: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show connectivity details of a SIM
    Connectivity { iccid: String },

    /// Reset the network connectivity of a SIM
    Reset { iccid: String },

    /// Set labels; both lists are comma-separated and paired by position
    Label { iccids: String, labels: String },

    /// Enable SIMs (comma-separated ICCIDs)
    Enable { iccids: String },

    /// Disable SIMs (comma-separated ICCIDs)
    Disable { iccids: String },

    /// Lock SIMs to their current IMEI (comma-separated ICCIDs)
    Lock { iccids: String },

    /// Remove the IMEI lock from SIMs (comma-separated ICCIDs)
    Unlock { iccids: String },

    /// Show the newest audit log entries
    Log {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show whether the stored session is still valid
    Session,
}

fn build_engine(args: &Args) -> Result<FleetEngine> {
    let explicit = args.config.is_some() || std::env::var_os(SIMFLEET_CONFIG_ENV).is_some();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);

    let mut settings = load_or_default(&config_path, explicit)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(data_dir) = &args.data_dir {
        settings.paths = settings.paths.with_data_dir(data_dir);
    }

    info!(
        config_path = %config_path.display(),
        data_dir = %settings.paths.data_dir().display(),
        base_url = %settings.api.base_url,
        "Configuration loaded"
    );

    let transport = Arc::new(
        HttpTransport::new(&settings.api.base_url).context("Failed to set up HTTP client")?,
    );
    let vault = Arc::new(SessionFile::new(settings.paths.session_file()));
    let audit = Arc::new(AuditLog::new(settings.paths.audit_log()));

    Ok(FleetEngine::new(settings, transport, vault, audit))
}

async fn dispatch(engine: &FleetEngine, command: Command) -> CommandResult<CommandReport> {
    let now = simfleet_util::now();
    debug!(%now, "Running command");

    match command {
        Command::Token { username, password } => {
            engine
                .acquire_token(&Credentials::new(username, password), now)
                .await
        }
        Command::List { pages } => engine.list_sims(pages, now).await,
        Command::Sim { iccid } => engine.get_sim(&iccid, now).await,
        Command::Status { iccid } => engine.sim_status(&iccid, now).await,
        Command::Usage { iccid, range } => engine.sim_usage(&iccid, range.as_deref(), now).await,
        Command::Quota { iccid } => engine.sim_quota(&iccid, now).await,
        Command::Events { iccid, page } => engine.sim_events(&iccid, page, now).await,
        Command::Connectivity { iccid } => engine.sim_connectivity(&iccid, now).await,
        Command::Reset { iccid } => engine.reset_connectivity(&iccid, now).await,
        Command::Label { iccids, labels } => engine.set_labels(&iccids, &labels, now).await,
        Command::Enable { iccids } => engine.set_status(&iccids, SimStatus::Enabled, now).await,
        Command::Disable { iccids } => engine.set_status(&iccids, SimStatus::Disabled, now).await,
        Command::Lock { iccids } => engine.set_imei_lock(&iccids, true, now).await,
        Command::Unlock { iccids } => engine.set_imei_lock(&iccids, false, now).await,
        Command::Log { limit } => engine.recent_log(limit),
        Command::Session => engine.session_status(now),
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let engine = build_engine(&args)?;
    let report = dispatch(&engine, args.command).await?;

    render::console(&report.console);
    if let Some(text) = render::payload(&report.payload) {
        println!("{}", text);
    }

    Ok(if report.is_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Input and configuration problems exit with the usage status
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let usage = err.downcast_ref::<ConfigError>().is_some()
        || err
            .downcast_ref::<CommandError>()
            .is_some_and(CommandError::is_input_error);

    if usage {
        ExitCode::from(EXIT_USAGE)
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "simfleet starting");

    if simfleet_util::is_mock_time_active() {
        warn!(now = %simfleet_util::now(), "Mock time is active");
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    }
}
