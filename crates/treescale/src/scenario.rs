//! Scenarios and suite configuration.
//!
//! A [`Scenario`] names a workload shape and mode, the operation to time and
//! the degree ceiling it must stay under. [`Scenario::catalog`] holds the
//! standard checks; [`SuiteConfig`] loads custom ones from YAML:
//!
//! ```yaml
//! noise_floor_ms: 50
//! warmup: true
//! scenarios:
//!   - name: build-binary-virtual
//!     shape: binary
//!     mode: virtual
//!     operation: build
//!     sizes: { small: 10000, large: 100000 }
//!     max_degree: 1.1
//! ```

use crate::degree::{DegreeReport, Verdict};
use crate::harness::{MeasurementHarness, Operation, SizePair, Stage};
use crate::hierarchy::{Environment, Hierarchy, Mode};
use crate::result::{ScaleError, ScaleResult};
use crate::shape::Shape;
use crate::walker::BreadthFirstWalker;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default small size of catalog scenarios
pub const DEFAULT_SMALL_SIZE: usize = 10_000;

/// Default large size of catalog scenarios
pub const DEFAULT_LARGE_SIZE: usize = 100_000;

/// Degree ceiling of catalog scenarios
pub const LINEAR_CEILING: f64 = 1.1;

/// Immutable description of a synthetic hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workload {
    /// Topology
    pub shape: Shape,
    /// Node count
    pub size: usize,
    /// Materialization mode
    pub mode: Mode,
}

impl Workload {
    /// Create a workload
    #[must_use]
    pub const fn new(shape: Shape, size: usize, mode: Mode) -> Self {
        Self { shape, size, mode }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.shape, self.mode, self.size)
    }
}

/// Operation a scenario times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Build the workload
    Build,
    /// Walk every node of a built workload
    Traverse,
    /// Relabel every node of a built workload through the walker
    Relabel,
    /// Scroll the last item of a built workload into view
    ShowLast,
    /// Dispose a built workload
    Dispose,
}

impl OperationKind {
    /// Every operation kind
    pub const ALL: [Self; 5] = [
        Self::Build,
        Self::Traverse,
        Self::Relabel,
        Self::ShowLast,
        Self::Dispose,
    ];

    /// Kebab-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Traverse => "traverse",
            Self::Relabel => "relabel",
            Self::ShowLast => "show-last",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| format!("Unknown operation: {s}"))
    }
}

/// [`Operation`] for one scenario
///
/// Everything except `Build` builds its workload during the untimed prepare
/// step and times only the target operation.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioOperation {
    kind: OperationKind,
    shape: Shape,
    mode: Mode,
}

impl ScenarioOperation {
    /// Create the operation
    #[must_use]
    pub const fn new(kind: OperationKind, shape: Shape, mode: Mode) -> Self {
        Self { kind, shape, mode }
    }

    fn workload(&self, size: usize) -> Workload {
        Workload::new(self.shape, size, self.mode)
    }
}

impl<E: Environment> Operation<E> for ScenarioOperation {
    fn prepare(&mut self, stage: &mut Stage<E>, size: usize) -> ScaleResult<()> {
        if self.kind != OperationKind::Build {
            stage.build(&self.workload(size))?;
        }
        Ok(())
    }

    fn run(&mut self, stage: &mut Stage<E>, size: usize) -> ScaleResult<()> {
        match self.kind {
            OperationKind::Build => {
                stage.build(&self.workload(size))?;
            }
            OperationKind::Traverse => {
                BreadthFirstWalker::count(stage.require_tree()?)?;
            }
            OperationKind::Relabel => {
                let mut next = 0_u64;
                BreadthFirstWalker::traverse(stage.require_tree()?, |tree, node| {
                    tree.set_label(node, &format!("Relabelled {next}"))?;
                    next += 1;
                    Ok(())
                })?;
            }
            OperationKind::ShowLast => {
                let tree = stage.require_tree()?;
                if let Some(last) = self.shape.last_item(tree)? {
                    tree.show_item(last)?;
                }
            }
            OperationKind::Dispose => {
                let mut tree = stage.take_tree().ok_or(ScaleError::MissingTree)?;
                tree.dispose();
            }
        }
        Ok(())
    }
}

/// Named degree check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Unique name
    pub name: String,
    /// Workload topology
    pub shape: Shape,
    /// Materialization mode
    #[serde(default)]
    pub mode: Mode,
    /// Timed operation
    pub operation: OperationKind,
    /// Small and large sizes
    pub sizes: SizePair,
    /// Degree ceiling
    pub max_degree: f64,
}

impl Scenario {
    /// Create a scenario with the catalog sizes and ceiling
    #[must_use]
    pub fn new(shape: Shape, mode: Mode, operation: OperationKind) -> Self {
        Self {
            name: format!("{operation}-{shape}-{mode}"),
            shape,
            mode,
            operation,
            sizes: SizePair {
                small: DEFAULT_SMALL_SIZE,
                large: DEFAULT_LARGE_SIZE,
            },
            max_degree: LINEAR_CEILING,
        }
    }

    /// Override the sizes
    #[must_use]
    pub const fn with_sizes(mut self, sizes: SizePair) -> Self {
        self.sizes = sizes;
        self
    }

    /// Override the degree ceiling
    #[must_use]
    pub const fn with_max_degree(mut self, max_degree: f64) -> Self {
        self.max_degree = max_degree;
        self
    }

    /// Standard scenarios: every operation on every shape and mode
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        let mut scenarios = Vec::new();
        for operation in OperationKind::ALL {
            for shape in Shape::ALL {
                for mode in [Mode::Eager, Mode::Virtual] {
                    scenarios.push(Self::new(shape, mode, operation));
                }
            }
        }
        scenarios
    }

    /// Workload at `size`
    #[must_use]
    pub const fn workload(&self, size: usize) -> Workload {
        Workload::new(self.shape, size, self.mode)
    }

    /// Check if the name contains `filter` (case-insensitive)
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }

    /// Check name, sizes and ceiling
    pub fn validate(&self) -> ScaleResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScaleError::config("scenario name must not be empty"));
        }
        if !self.max_degree.is_finite() || self.max_degree <= 0.0 {
            return Err(ScaleError::InvalidCeiling {
                value: self.max_degree,
            });
        }
        self.sizes.validate()
    }

    /// Run the degree check for this scenario
    pub fn run<E: Environment>(&self, harness: &MeasurementHarness, stage: &mut Stage<E>) -> ScaleResult<DegreeReport> {
        let _span = tracing::info_span!("scenario", name = %self.name).entered();
        let mut operation = ScenarioOperation::new(self.operation, self.shape, self.mode);
        harness.assert_maximum_degree(stage, self.max_degree, self.sizes, &mut operation)
    }

    /// Run and capture the outcome
    pub fn outcome<E: Environment>(&self, harness: &MeasurementHarness, stage: &mut Stage<E>) -> ScenarioOutcome {
        ScenarioOutcome {
            scenario: self.clone(),
            result: self.run(harness, stage),
        }
    }
}

/// Result of running one scenario
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Scenario that ran
    pub scenario: Scenario,
    /// Report on a pass, error otherwise
    pub result: ScaleResult<DegreeReport>,
}

impl ScenarioOutcome {
    /// Check if the scenario passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.result.is_ok()
    }

    /// Report, also available when the ceiling was exceeded
    #[must_use]
    pub fn report(&self) -> Option<&DegreeReport> {
        match &self.result {
            Ok(report) => Some(report),
            Err(err) => err.report(),
        }
    }

    /// Verdict, when the check got far enough to produce one
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.report().map(|report| report.verdict)
    }
}

/// YAML suite: harness defaults and scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Noise floor in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_floor_ms: Option<u64>,
    /// Whether to run warmup passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<bool>,
    /// Scenarios to run
    pub scenarios: Vec<Scenario>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            noise_floor_ms: None,
            warmup: None,
            scenarios: Scenario::catalog(),
        }
    }
}

impl SuiteConfig {
    /// Parse and validate a YAML suite
    pub fn from_yaml(yaml: &str) -> ScaleResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML suite file
    pub fn load(path: impl AsRef<Path>) -> ScaleResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading suite");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ScaleResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check every scenario and require unique names
    pub fn validate(&self) -> ScaleResult<()> {
        if self.scenarios.is_empty() {
            return Err(ScaleError::config("suite defines no scenarios"));
        }
        let mut names = HashSet::new();
        for scenario in &self.scenarios {
            scenario.validate().map_err(|err| match err {
                ScaleError::Config { message } => {
                    ScaleError::config(format!("scenario '{}': {message}", scenario.name))
                }
                other => other,
            })?;
            if !names.insert(scenario.name.as_str()) {
                return Err(ScaleError::config(format!(
                    "duplicate scenario name '{}'",
                    scenario.name
                )));
            }
        }
        Ok(())
    }

    /// Harness configured with the suite defaults
    #[must_use]
    pub fn harness(&self) -> MeasurementHarness {
        let mut harness = MeasurementHarness::new();
        if let Some(ms) = self.noise_floor_ms {
            harness = harness.with_noise_floor(Duration::from_millis(ms));
        }
        if let Some(warmup) = self.warmup {
            harness = harness.with_warmup(warmup);
        }
        harness
    }
}
