//! Focus Dashboard CLI
//!
//! Runs timed focus sessions against a focus-scoring service:
//! - a countdown of the session length
//! - the live focus status, refreshed every second
//! - warnings, with a forced stop once too many pile up

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use focus_dashboard::cli::{Cli, Commands, Display, LoginArgs, RunArgs, UserStore};
use focus_dashboard::types::{Credentials, DEFAULT_BASE_URL};
use focus_dashboard::{
    DashboardConfig, FocusService, HttpFocusService, SessionCommand, SessionController,
    TerminalDashboard,
};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over the verbose flag.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => run_dashboard(args).await?,
        Some(Commands::Login(args)) => login(args).await?,
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Builds the effective configuration: defaults, then the config file, then flags.
fn build_config(args: &RunArgs) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    if let Some(server) = &args.server {
        config = config.with_base_url(server.clone());
    }

    let username = match (&args.username, &config.username) {
        (Some(name), _) => Some(name.clone()),
        (None, Some(name)) => Some(name.clone()),
        (None, None) => remembered_username(),
    };
    config = config.with_username(username);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Username saved by the last successful login, if it can be read.
fn remembered_username() -> Option<String> {
    let store = match UserStore::new() {
        Ok(store) => store,
        Err(e) => {
            tracing::debug!("no username store: {:#}", e);
            return None;
        }
    };
    match store.load() {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("ignoring remembered username: {:#}", e);
            None
        }
    }
}

async fn run_dashboard(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let service = Arc::new(
        HttpFocusService::new(&config.base_url, config.request_timeout())
            .context("Failed to create the service client")?,
    );

    let view = TerminalDashboard::new();
    view.show_banner(config.effective_username());

    let (command_tx, command_rx) = mpsc::channel(16);
    if args.auto_start {
        command_tx.send(SessionCommand::Start).await?;
    }
    spawn_command_reader(command_tx.clone());
    spawn_interrupt_handler(command_tx);

    let mut controller = SessionController::new(service, view, config);
    controller.run(command_rx).await;
    Ok(())
}

/// Forwards stdin lines to the controller. End of input quits.
///
/// Runs on a plain thread so a pending read never holds up shutdown.
fn spawn_command_reader(command_tx: mpsc::Sender<SessionCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<SessionCommand>() {
                Ok(command) => {
                    if command_tx.blocking_send(command).is_err() {
                        return;
                    }
                }
                Err(e) => Display::show_error(&e),
            }
        }
        let _ = command_tx.blocking_send(SessionCommand::Quit);
    });
}

/// Ctrl-C quits, finalizing an active session first.
fn spawn_interrupt_handler(command_tx: mpsc::Sender<SessionCommand>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received");
            let _ = command_tx.send(SessionCommand::Quit).await;
        }
    });
}

async fn login(args: LoginArgs) -> Result<()> {
    let base_url = args.server.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let service = HttpFocusService::new(base_url, DashboardConfig::default().request_timeout())
        .context("Failed to create the service client")?;

    let credentials = Credentials {
        username: args.username.clone(),
        password: args.password,
    };

    match service.login(&credentials).await {
        Ok(response) if response.is_success() => {
            UserStore::new()?.save(&args.username)?;
            Display::show_login_success(&args.username, &response);
        }
        Ok(response) => {
            Display::show_login_rejected(&response);
            std::process::exit(1);
        }
        Err(e) => {
            Display::show_connection_error(&e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
