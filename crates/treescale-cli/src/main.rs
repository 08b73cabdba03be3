//! Treescale CLI: catch super-linear tree widget operations
//!
//! ## Usage
//!
//! ```bash
//! treescale list                          # Show the scenario catalog
//! treescale run --filter traverse         # Run matching scenarios
//! treescale run --config suite.yaml       # Run a YAML suite
//! treescale run --simulate 1000           # Deterministic run, 1µs per tree operation
//! treescale shape binary 15 --virtual     # Preview a synthetic tree
//! ```

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;
use treescale::{Mode, Scenario, SuiteConfig};
use treescale_cli::{
    display_shape, logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ListArgs,
    RunArgs, ScenarioRunner, ShapeArgs, TreeConfig, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity);

    match cli.command {
        Commands::List(args) => run_list(&args),
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::Shape(args) => run_shape(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_list(args: &ListArgs) -> CliResult<()> {
    let catalog = Scenario::catalog();
    let mut out = io::stdout().lock();

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&catalog)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<26} {:<7} {:<8} {:<10} {:<18} CEILING",
        "NAME", "SHAPE", "MODE", "OPERATION", "SIZES"
    )?;
    for scenario in &catalog {
        writeln!(
            out,
            "{:<26} {:<7} {:<8} {:<10} {:<18} {:.2}",
            scenario.name,
            scenario.shape.to_string(),
            scenario.mode.to_string(),
            scenario.operation.to_string(),
            scenario.sizes.to_string(),
            scenario.max_degree
        )?;
    }
    Ok(())
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let suite = match args.config {
        Some(ref path) => SuiteConfig::load(path)?,
        None => SuiteConfig::default(),
    };

    let config = config
        .with_fail_fast(args.fail_fast)
        .with_sizes(args.small, args.large)
        .with_noise_floor_ms(args.noise_floor_ms)
        .with_no_warmup(args.no_warmup);

    let mut runner = ScenarioRunner::new(config);
    if let Some(nanos) = args.simulate {
        runner = runner.with_simulated_cost(Duration::from_nanos(nanos));
    }
    runner.run(&suite, args.filter.as_deref())?.into_result()?;
    Ok(())
}

fn run_shape(config: &CliConfig, args: &ShapeArgs) -> CliResult<()> {
    if args.max_depth == Some(0) {
        return Err(CliError::invalid_argument("--max-depth must be at least 1"));
    }

    let tree_config = TreeConfig::new()
        .with_depth(args.max_depth)
        .with_colors(config.color.should_color());
    let output = display_shape(
        args.shape.into(),
        args.size,
        Mode::from_virtual(args.lazy),
        &tree_config,
    )?;
    io::stdout().lock().write_all(output.as_bytes())?;
    Ok(())
}
