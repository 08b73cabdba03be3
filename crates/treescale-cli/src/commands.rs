//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Treescale: catch super-linear tree widget operations
#[derive(Parser, Debug)]
#[command(name = "treescale")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the standard scenario catalog
    List(ListArgs),

    /// Run degree checks against the in-memory hierarchy
    Run(RunArgs),

    /// Build a synthetic tree and print it
    Shape(ShapeArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// YAML suite file (defaults to the standard catalog)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Small workload size for every scenario
    #[arg(long)]
    pub small: Option<usize>,

    /// Large workload size for every scenario
    #[arg(long)]
    pub large: Option<usize>,

    /// Noise floor in milliseconds
    #[arg(long)]
    pub noise_floor_ms: Option<u64>,

    /// Skip the untimed warmup pass
    #[arg(long)]
    pub no_warmup: bool,

    /// Time against a simulated clock charging this many nanoseconds per tree operation
    #[arg(long, value_name = "NANOS")]
    pub simulate: Option<u64>,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the shape command
#[derive(Parser, Debug)]
pub struct ShapeArgs {
    /// Tree topology
    pub shape: ShapeArg,

    /// Number of nodes
    pub size: usize,

    /// Materialize nodes on demand instead of eagerly
    #[arg(long = "virtual")]
    pub lazy: bool,

    /// Maximum depth to print
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Tree topology argument
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ShapeArg {
    /// Recursive halving
    Binary,
    /// One root with every other node beneath it
    Star,
}

impl From<ShapeArg> for treescale::Shape {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Binary => Self::Binary,
            ShapeArg::Star => Self::Star,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
