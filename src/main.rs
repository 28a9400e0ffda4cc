//! envcheck - keep a create-t3-app zod env schema in sync with the code
//!
//! Finds environment variables that the process environment or the source
//! tree uses but the `serverSchema` does not declare, and offers to add them.

mod checks;
mod config;
mod detection;
mod error;
mod remediation;
mod scanner;
mod schema;
mod syntax;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::checks::typesafe_env::{Mode, TypesafeEnv};
use crate::checks::{Check, CheckReport};
use crate::config::{Config, ProjectConfig};
use crate::detection::ProjectDetector;
use crate::remediation::InquirePrompter;

#[derive(Parser)]
#[command(name = "envcheck")]
#[command(author = "Envcheck Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Find process.env usages missing from your zod env schema", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory to start looking for the project from (defaults to current directory)
    #[arg(short, long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "ENVCHECK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the env schema and interactively add missing variables (default)
    Check,

    /// Report missing variables without prompting or writing
    Scan,

    /// Initialize envcheck configuration for this project
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

fn setup_logging(verbosity: u8) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("envcheck")
        .join("logs");

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "envcheck.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.or_else(|| Config::default_path().filter(|p| p.exists()));
    match path {
        Some(path) => Config::load(&path),
        None => Ok(Config::default()),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let start = match cli.path {
        Some(path) => path
            .canonicalize()
            .with_context(|| format!("{} does not exist", path.display()))?,
        None => std::env::current_dir()?,
    };
    let detector = ProjectDetector::locate(&start)?;

    let mode = match cli.command.unwrap_or(Commands::Check) {
        Commands::Init { force } => {
            config::init_project_config(detector.root(), force)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Check => Mode::Interactive,
        Commands::Scan => Mode::ReportOnly,
    };

    let config = load_config(cli.config)?;
    let project = ProjectConfig::load(detector.root())?.unwrap_or_default();

    let context = detector.analyze().await?;
    let details = context
        .node
        .as_ref()
        .map(|node| match &node.framework {
            Some(framework) => format!("({}, {})", framework, node.package_manager),
            None => format!("({})", node.package_manager),
        })
        .unwrap_or_default();
    ui::banner(&context.name, &details);
    if context.node.as_ref().is_some_and(|node| !node.uses_zod) {
        ui::log("zod is not listed in package.json dependencies");
    }

    let layout = detector.layout(&project.schema, &project.scan.source_dir)?;
    let mut check = TypesafeEnv::new(layout, project, config, Box::new(InquirePrompter), mode);

    tracing::info!(check = check.name(), root = %context.root.display(), "running check");
    let report = check.check().await?;

    if !report.added.is_empty() {
        println!("\nAdded to the schema: {}", report.added.join(", "));
    }
    Ok(exit_code(mode, &report))
}

/// `scan` fails while anything is undeclared; an interactive run has already
/// offered every name, so it succeeds.
fn exit_code(mode: Mode, report: &CheckReport) -> ExitCode {
    let unresolved = report.unresolved();
    if mode == Mode::ReportOnly && !unresolved.is_empty() {
        let list: Vec<_> = unresolved.into_iter().collect();
        println!("\nMissing from the schema: {}", list.join(", "));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Keep the guard alive for the duration of the program
    let _logging_guard = match setup_logging(cli.verbose) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Failed to set up logging: {err:#}");
            None
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ui::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
