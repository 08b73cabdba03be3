//! Scenario runner implementation

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use serde::Serialize;
use std::time::{Duration, Instant};
use treescale::{
    CostModel, FakeClock, MeasurementHarness, MemoryEnvironment, Scenario, ScenarioOutcome, SizePair, Stage,
    SuiteConfig, Verdict,
};

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Degree below the ceiling
    Passed,
    /// Both samples under the noise floor
    Skipped,
    /// Ceiling reached or the operation failed
    Failed,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: ScenarioStatus,
    /// Estimated degree, when both samples were taken
    pub degree: Option<f64>,
    /// Diagnostic line
    pub message: String,
    /// Wall time spent on the scenario
    pub duration: Duration,
}

impl ScenarioResult {
    /// Classify a harness outcome
    #[must_use]
    pub fn from_outcome(outcome: &ScenarioOutcome, duration: Duration) -> Self {
        let (status, message) = match (&outcome.result, outcome.verdict()) {
            (Ok(report), Some(Verdict::BelowNoiseFloor)) => {
                (ScenarioStatus::Skipped, report.to_string())
            }
            (Ok(report), _) => (ScenarioStatus::Passed, report.to_string()),
            (Err(err), _) => (ScenarioStatus::Failed, err.to_string()),
        };
        Self {
            name: outcome.scenario.name.clone(),
            status,
            degree: outcome.report().map(|report| report.degree),
            message,
            duration,
        }
    }

    /// Check if the scenario did not fail
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status != ScenarioStatus::Failed
    }
}

/// Aggregated scenario results
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResults {
    /// Individual results in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl RunResults {
    /// Create new empty results
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result
    pub fn add(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Number of scenarios skipped below the noise floor
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Total number of scenarios run
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Check if nothing failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }

    /// Turn failures into an error
    pub fn into_result(self) -> CliResult<Self> {
        if self.all_passed() {
            Ok(self)
        } else {
            Err(CliError::ScenarioFailed {
                failed: self.failed(),
                total: self.total(),
            })
        }
    }
}

/// Runs scenarios against the in-memory hierarchy
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: ProgressReporter,
    cost: Option<CostModel>,
}

impl ScenarioRunner {
    /// Create a new scenario runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self {
            config,
            reporter,
            cost: None,
        }
    }

    /// Time against simulated costs instead of the wall clock
    #[must_use]
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Charge `per_op` of simulated time for every tree operation
    ///
    /// Timings become deterministic, so the verdict reflects how many
    /// operations a scenario performs rather than how fast the host is.
    #[must_use]
    pub fn with_simulated_cost(self, per_op: Duration) -> Self {
        self.with_cost_model(CostModel::uniform(FakeClock::new(), per_op))
    }

    #[cfg(test)]
    fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Select and adjust the scenarios to run
    ///
    /// Applies the filter and size overrides, then validates the result.
    pub fn plan(&self, suite: &SuiteConfig, filter: Option<&str>) -> CliResult<Vec<Scenario>> {
        let mut scenarios = Vec::new();
        for scenario in &suite.scenarios {
            if filter.is_some_and(|f| !scenario.matches(f)) {
                continue;
            }
            let sizes = if self.config.overrides_sizes() {
                SizePair::new(
                    self.config.small.unwrap_or(scenario.sizes.small),
                    self.config.large.unwrap_or(scenario.sizes.large),
                )?
            } else {
                scenario.sizes
            };
            let scenario = scenario.clone().with_sizes(sizes);
            scenario.validate()?;
            scenarios.push(scenario);
        }
        Ok(scenarios)
    }

    /// Harness with the suite defaults and command-line overrides
    #[must_use]
    pub fn harness(&self, suite: &SuiteConfig) -> MeasurementHarness {
        let mut harness = suite.harness();
        if let Some(ms) = self.config.noise_floor_ms {
            harness = harness.with_noise_floor(Duration::from_millis(ms));
        }
        if self.config.no_warmup {
            harness = harness.with_warmup(false);
        }
        if let Some(ref cost) = self.cost {
            harness = harness.with_clock(cost.clock().clone());
        }
        harness
    }

    /// Run the suite with an optional name filter
    ///
    /// Returns results even when scenarios fail; use
    /// [`RunResults::into_result`] to turn failures into an error.
    pub fn run(&mut self, suite: &SuiteConfig, filter: Option<&str>) -> CliResult<RunResults> {
        let start = Instant::now();
        let mut results = RunResults::new();

        let scenarios = self.plan(suite, filter)?;
        if scenarios.is_empty() {
            self.reporter.warning("No scenarios matched");
            results.duration = start.elapsed();
            return Ok(results);
        }

        let harness = self.harness(suite);
        tracing::info!(
            scenarios = scenarios.len(),
            noise_floor_ms = harness.noise_floor().as_millis() as u64,
            warmup = harness.warmup(),
            "running suite"
        );

        self.reporter.header("Running Scenarios");
        if self.cost.is_some() {
            self.reporter.info("Timing against a simulated clock");
        }
        self.reporter
            .start_progress(scenarios.len() as u64, "Starting...");

        for scenario in &scenarios {
            self.reporter.set_message(&scenario.name);

            let scenario_start = Instant::now();
            let mut stage = Stage::new(self.environment());
            let outcome = scenario.outcome(&harness, &mut stage);
            let result = ScenarioResult::from_outcome(&outcome, scenario_start.elapsed());

            if self.config.verbosity.is_verbose() {
                self.reporter.info(&format!(
                    "{}: {} -> {} nodes, {:.2?} wall time",
                    scenario.name, scenario.sizes.small, scenario.sizes.large, result.duration
                ));
            }

            let line = format!("{}: {}", result.name, result.message);
            let failed = match result.status {
                ScenarioStatus::Passed => {
                    self.reporter.success(&line);
                    false
                }
                ScenarioStatus::Skipped => {
                    self.reporter.skipped(&line);
                    false
                }
                ScenarioStatus::Failed => {
                    self.reporter.failure(&line);
                    true
                }
            };

            results.add(result);
            self.reporter.increment(1);

            if failed && self.config.fail_fast {
                break;
            }
        }

        self.reporter.finish();
        results.duration = start.elapsed();

        self.reporter.summary(
            results.passed(),
            results.failed(),
            results.skipped(),
            results.duration,
        );

        Ok(results)
    }

    fn environment(&self) -> MemoryEnvironment {
        match self.cost {
            Some(ref cost) => MemoryEnvironment::new().with_cost_model(cost.clone()),
            None => MemoryEnvironment::new(),
        }
    }
}
