mod config;
mod export_cmd;
mod generate_cmd;
mod reset_cmd;
mod status_cmd;
#[cfg(test)]
mod test_util;
mod toggle_cmd;
mod tui;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use rpm_core::GeminiConfig;
use rpm_store::open_store;

use config::RpmConfig;

#[derive(Parser)]
#[command(
    name = "rpm",
    version,
    about = "Turn a brain dump into a 100 Reasons Matrix"
)]
struct Cli {
    /// Directory holding the saved matrix (overrides RPM_DATA_DIR env var)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Defaults to the interactive dashboard
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an rpm config file
    Init {
        /// Gemini API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Gemini model name
        #[arg(long, default_value = GeminiConfig::DEFAULT_MODEL)]
        model: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Launch the interactive dashboard
    Dashboard,
    /// Generate a new matrix and print it (replaces any saved matrix)
    Generate {
        /// Brain dump: current tasks, problems, stress
        #[arg(long, conflicts_with = "tasks_file")]
        tasks: Option<String>,
        /// Desired outcomes and dreams
        #[arg(long, conflicts_with = "goals_file")]
        goals: Option<String>,
        /// Read the brain dump from a file (`-` for stdin)
        #[arg(long)]
        tasks_file: Option<PathBuf>,
        /// Read the desired outcomes from a file (`-` for stdin)
        #[arg(long)]
        goals_file: Option<PathBuf>,
    },
    /// Show the saved matrix with progress
    Status,
    /// Mark a reason realized, or clear it if already realized
    Toggle {
        /// Reason ID as shown by `rpm status`
        reason_id: String,
    },
    /// Discard the saved matrix and its progress
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Write the saved matrix as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Install the global subscriber. The dashboard owns the terminal, so in that
/// mode log lines go to `log_file` instead of stderr.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Execute the `rpm init` command: write a config file.
fn cmd_init(api_key: Option<String>, model: String, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let masked = api_key.as_deref().map(config::mask_key);
    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key,
            model: Some(model.clone()),
            base_url: None,
        },
        storage: config::StorageSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  gemini.model = {model}");
    match masked {
        Some(masked) => println!("  gemini.api_key = {masked}"),
        None => {
            println!("  gemini.api_key = (not set)");
            println!();
            println!("Set GEMINI_API_KEY or rerun with `--api-key <KEY> --force` before generating.");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);

    let data_dir = cli.data_dir.as_deref();

    match command {
        Commands::Init {
            api_key,
            model,
            force,
        } => {
            init_tracing(None)?;
            cmd_init(api_key, model, force)?;
        }
        Commands::Dashboard => {
            let resolved = RpmConfig::resolve(data_dir)?;
            init_tracing(Some(&resolved.store.log_path()))?;
            tui::run_dashboard(&resolved).await?;
        }
        Commands::Generate {
            tasks,
            goals,
            tasks_file,
            goals_file,
        } => {
            init_tracing(None)?;
            let resolved = RpmConfig::resolve(data_dir)?;
            let tasks = generate_cmd::read_input(tasks, tasks_file.as_deref())?;
            let goals = generate_cmd::read_input(goals, goals_file.as_deref())?;
            generate_cmd::run_generate(&resolved, tasks, goals).await?;
        }
        Commands::Status => {
            init_tracing(None)?;
            let resolved = RpmConfig::resolve(data_dir)?;
            status_cmd::run_status(&open_store(&resolved.store))?;
        }
        Commands::Toggle { reason_id } => {
            init_tracing(None)?;
            let resolved = RpmConfig::resolve(data_dir)?;
            toggle_cmd::run_toggle(&open_store(&resolved.store), &reason_id)?;
        }
        Commands::Reset { yes } => {
            init_tracing(None)?;
            let resolved = RpmConfig::resolve(data_dir)?;
            let stdin = std::io::stdin();
            reset_cmd::run_reset(
                &open_store(&resolved.store),
                yes,
                &mut stdin.lock(),
                &mut std::io::stdout(),
            )?;
        }
        Commands::Export { output } => {
            init_tracing(None)?;
            let resolved = RpmConfig::resolve(data_dir)?;
            export_cmd::run_export(&open_store(&resolved.store), output.as_deref())?;
        }
    }

    Ok(())
}
