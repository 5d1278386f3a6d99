//! formtable CLI
//!
//! Terminal front end for the registration form and its record table.
//!
//! # Usage
//!
//! ```bash
//! formtable session
//! formtable session --script entries.txt
//! formtable add --name "Jane Doe" --email jane@example.com --birth-date 1990-04-12 --department sales
//! formtable schema --format json
//! formtable config set locale de_DE
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "formtable")]
#[command(author = "formtable")]
#[command(version)]
#[command(about = "Registration form with an in-memory record table", long_about = None)]
struct Cli {
    /// Locale for dates in the table, e.g. en_US or de_DE
    #[arg(long, global = true, env = "FORMTABLE_LOCALE")]
    locale: Option<String>,

    /// When fields are validated outside of submit: on_submit, on_blur, on_change, all
    #[arg(long, global = true, env = "FORMTABLE_VALIDATION_MODE")]
    mode: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter records interactively, one event per line
    Session {
        /// Read events from a file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Submit a single registration and print the table
    Add(commands::add::AddArgs),
    /// Print the form schema
    Schema,
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::Config::load(cli.profile.as_deref())?;
    let settings = config.resolve(cli.locale.as_deref(), cli.mode.as_deref(), cli.format)?;
    tracing::debug!(mode = %settings.mode, format = ?settings.format, "settings resolved");

    match cli.command {
        Commands::Session { script: Some(path) } => {
            let file = tokio::fs::File::open(&path).await?;
            commands::session::run(BufReader::new(file), &settings, false).await
        }
        Commands::Session { script: None } => {
            let interactive = commands::session::stdin_is_terminal();
            commands::session::run(BufReader::new(tokio::io::stdin()), &settings, interactive).await
        }
        Commands::Add(args) => {
            println!("{}", commands::add::handle(args, &settings)?.trim_end());
            Ok(())
        }
        Commands::Schema => {
            let schema = formtable_core::registration_schema(chrono::Local::now().date_naive())?;
            println!("{}", commands::schema::render(&schema, settings.format)?.trim_end());
            Ok(())
        }
        Commands::Config { action } => commands::config::handle(action, cli.profile.as_deref()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}
