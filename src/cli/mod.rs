//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Task | Work item management | `task add`, `task dep`, `task done` |
//! | Schedule | Recommended order | `schedule`, `schedule --dry-run` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Exit Codes
//!
//! - `0` - success
//! - `1` - any error
//! - `2` - the tasks cannot be scheduled (duplicate titles, unknown
//!   dependencies, cycles)
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod schedule;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
