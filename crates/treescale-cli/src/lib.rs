//! Treescale CLI Library
//!
//! Command-line runner for the treescale complexity harness: lists the
//! scenario catalog, runs degree checks against the in-memory hierarchy and
//! previews synthetic tree shapes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;
pub mod tree;

pub use commands::{Cli, ColorArg, Commands, ListArgs, RunArgs, ShapeArg, ShapeArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{RunResults, ScenarioResult, ScenarioRunner, ScenarioStatus};
pub use tree::{display_shape, node_path, render_tree, TreeConfig};
