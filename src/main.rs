//! Timerable CLI - a subject-based pomodoro timer
//!
//! Sessions alternate focused work with short breaks and close with a long
//! break. The `daemon` subcommand keeps time; every other subcommand talks to
//! it over a Unix socket.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use timerable::cli::{Cli, Commands, DaemonArgs, Display, IpcClient, SubjectsAction};
use timerable::daemon::{default_socket_path, run_daemon, DaemonOptions};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let socket = cli.socket;
    let client = || IpcClient::for_socket(socket.clone());

    match command {
        Commands::Start(args) => Display::show_action(&client()?.start(&args.subject).await?),
        Commands::Toggle => Display::show_action(&client()?.toggle().await?),
        Commands::Pause => Display::show_action(&client()?.pause().await?),
        Commands::Resume => Display::show_action(&client()?.resume().await?),
        Commands::Skip => Display::show_action(&client()?.skip().await?),
        Commands::Reset => Display::show_action(&client()?.reset().await?),
        Commands::Status => Display::show_status(&client()?.status().await?),
        Commands::Subjects { action: None } => {
            Display::show_subjects(&client()?.subjects().await?);
        }
        Commands::Subjects {
            action: Some(SubjectsAction::Add { name }),
        } => Display::show_subjects(&client()?.add_subject(&name).await?),
        Commands::Subjects {
            action: Some(SubjectsAction::Remove { name }),
        } => Display::show_subjects(&client()?.remove_subject(&name).await?),
        Commands::Config(args) => {
            Display::show_settings(&client()?.configure(args.to_params()).await?);
        }
        Commands::Daemon(args) => {
            let socket_path = match &socket {
                Some(path) => path.clone(),
                None => default_socket_path()?,
            };
            run_daemon(daemon_options(socket_path, args)).await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

fn daemon_options(socket_path: std::path::PathBuf, args: DaemonArgs) -> DaemonOptions {
    let mut options = DaemonOptions::new(socket_path)
        .with_subjects(args.subjects)
        .with_bell(!args.no_bell);
    if args.ephemeral {
        options = options.ephemeral();
    }
    if let Some(path) = args.defaults {
        options = options.with_defaults_path(path);
    }
    options
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
