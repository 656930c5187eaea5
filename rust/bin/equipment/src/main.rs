//! `equipment` is the terminal front end for the equipment monitoring panel.
//!
//! Lists, charts and edits equipment readings on a remote equipment API,
//! and flags readings above the safety thresholds.

mod commands;
mod config;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::records::FieldArgs;

/// Equipment monitoring CLI.
#[derive(Parser, Debug)]
#[command(name = "equipment", about = "Equipment monitoring panel")]
struct Cli {
    /// Path to client config file (default: ~/.equipment/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Server URL; overrides the current context.
    #[arg(long = "server", global = true)]
    server: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value_t = Output::Table)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all equipment readings.
    List,

    /// Draw temperature and pressure per reading.
    Chart,

    /// Report readings above the safety thresholds. Exits with 2 if any.
    Check,

    /// Add a reading.
    Create {
        #[arg(long)]
        temperature: f64,
        #[arg(long)]
        pressure: f64,
        /// ISO 8601 timestamp (default: now).
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Change fields of an existing reading.
    Update {
        /// Reading ID.
        id: String,
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long)]
        pressure: Option<f64>,
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Delete a reading.
    Delete {
        /// Reading ID.
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Refresh and redraw the chart on an interval until Ctrl-C.
    Watch {
        /// Seconds between refreshes.
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },

    /// Manage contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        /// Context name.
        name: String,
        /// Server URL.
        #[arg(long, default_value = equipment_client::DEFAULT_BASE_URL)]
        url: String,
        /// Request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        /// Server URL.
        #[arg(long)]
        url: Option<String>,
        /// Request timeout in seconds; 0 clears it.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let json = cli.output == Output::Json;
    let server = cli.server.as_deref();

    match cli.command {
        Commands::List => {
            let panel = commands::records::connect(&config_path, server)?;
            commands::records::list(&panel, json).await?;
        }

        Commands::Chart => {
            let panel = commands::records::connect(&config_path, server)?;
            commands::records::chart(&panel, json).await?;
        }

        Commands::Check => {
            let panel = commands::records::connect(&config_path, server)?;
            if commands::records::check(&panel, json).await? {
                std::process::exit(2);
            }
        }

        Commands::Create {
            temperature,
            pressure,
            timestamp,
        } => {
            let panel = commands::records::connect(&config_path, server)?;
            commands::records::create(&panel, temperature, pressure, timestamp).await?;
        }

        Commands::Update {
            id,
            temperature,
            pressure,
            timestamp,
        } => {
            let panel = commands::records::connect(&config_path, server)?;
            let args = FieldArgs {
                temperature,
                pressure,
                timestamp,
            };
            commands::records::update(&panel, &id, args).await?;
        }

        Commands::Delete { id, yes } => {
            if !yes {
                eprint!("Delete equipment {}? [y/N]: ", id);
                std::io::stderr().flush()?;
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let panel = commands::records::connect(&config_path, server)?;
            commands::records::delete(&panel, &id).await?;
        }

        Commands::Watch { interval } => {
            let panel = commands::records::connect(&config_path, server)?;
            commands::records::watch(&panel, Duration::from_secs(interval)).await?;
        }

        Commands::Context { action } => match action {
            ContextAction::Create {
                name,
                url,
                timeout_secs,
            } => {
                commands::context::create(&name, &url, timeout_secs, &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set {
                name,
                url,
                timeout_secs,
            } => {
                commands::context::set(&name, url.as_deref(), timeout_secs, &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Version => {
            println!("equipment cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
