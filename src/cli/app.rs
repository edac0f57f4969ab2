//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{schedule, task};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "minipm")]
#[command(author, version, about = "Local-first project tasks with dependency-aware scheduling")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to `default_format` from the global config)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Compute a recommended task order and save it
    ///
    /// Orders tasks so every dependency comes first, preferring earlier due
    /// dates, then smaller estimates, then current position.
    Schedule {
        /// JSON file with tasks to schedule instead of the stored ones
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Print the order without saving it
        #[arg(long)]
        dry_run: bool,

        /// Order by due date and creation time only, ignoring dependencies
        #[arg(long, conflicts_with = "input")]
        by_deadline: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("minipm starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .minipm directory at: {}", project.project_dir().display()),
            );
            output.success(&format!("Initialized minipm project at {}", project.root().display()));
        }

        Commands::Task(cmd) => task::run(cmd, &output)?,

        Commands::Schedule {
            input,
            dry_run,
            by_deadline,
        } => {
            output.verbose_ctx(
                "schedule",
                &format!(
                    "input={:?}, dry_run={}, by_deadline={}",
                    input, dry_run, by_deadline
                ),
            );
            if by_deadline {
                schedule::by_deadline(&output, dry_run)?
            } else {
                schedule::run(&output, input.as_deref(), dry_run)?
            }
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
