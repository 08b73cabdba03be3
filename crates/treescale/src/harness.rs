//! Measurement Harness
//!
//! Times an operation at two workload sizes and checks the growth degree
//! between them against a ceiling.
//!
//! ## Trial sequence
//!
//! ```text
//! reset ─► warmup(small) ─► reset ─► measure(small) ─► reset ─► measure(large) ─► check
//! ```
//!
//! Every trial works on a freshly built hierarchy; `reset` disposes the
//! previous one and drains pending UI events so nothing carries over between
//! timed regions.
//!
//! ## Example
//!
//! ```
//! use treescale::{
//!     MeasurementHarness, MemoryEnvironment, Mode, ScaleResult, Shape, SizePair, Stage, Workload,
//! };
//!
//! let harness = MeasurementHarness::new();
//! let mut stage = Stage::new(MemoryEnvironment::new());
//! let sizes = SizePair::new(100, 1000)?;
//!
//! let mut build = |stage: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
//!     stage.build(&Workload::new(Shape::Binary, size, Mode::Eager))?;
//!     Ok(())
//! };
//! let report = harness.assert_maximum_degree(&mut stage, 1.1, sizes, &mut build)?;
//! assert!(report.passed());
//! # Ok::<(), treescale::ScaleError>(())
//! ```

use crate::builder::TreeBuilder;
use crate::clock::{Clock, MonotonicClock};
use crate::degree::{DegreeCheck, DegreeReport, Sample, Verdict, DEFAULT_NOISE_FLOOR};
use crate::hierarchy::{Environment, Hierarchy};
use crate::initializer::{LabelInitializer, NodeInitializer};
use crate::result::{ScaleError, ScaleResult};
use crate::scenario::Workload;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, info_span, warn};

/// Small and large workload sizes of a degree check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePair {
    /// Smaller size
    pub small: usize,
    /// Larger size
    pub large: usize,
}

impl SizePair {
    /// Create a size pair, requiring `0 < small < large`
    pub fn new(small: usize, large: usize) -> ScaleResult<Self> {
        let pair = Self { small, large };
        pair.validate()?;
        Ok(pair)
    }

    /// Pair `small` with ten times `small`
    pub fn decade(small: usize) -> ScaleResult<Self> {
        Self::new(small, small.saturating_mul(10))
    }

    /// Check `0 < small < large`
    pub fn validate(&self) -> ScaleResult<()> {
        if self.small == 0 || self.small >= self.large {
            return Err(ScaleError::InvalidSizes {
                small: self.small,
                large: self.large,
            });
        }
        Ok(())
    }

    /// `large / small`
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.large as f64 / self.small as f64
    }
}

impl fmt::Display for SizePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.small, self.large)
    }
}

/// Environment plus the hierarchy of the current trial
#[derive(Debug)]
pub struct Stage<E: Environment> {
    env: E,
    tree: Option<E::Tree>,
}

impl<E: Environment> Stage<E> {
    /// Create a stage with no hierarchy
    pub const fn new(env: E) -> Self {
        Self { env, tree: None }
    }

    /// Environment
    pub const fn environment(&self) -> &E {
        &self.env
    }

    /// Mutable environment
    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Hierarchy of the current trial
    pub const fn tree(&self) -> Option<&E::Tree> {
        self.tree.as_ref()
    }

    /// Mutable hierarchy of the current trial
    pub fn tree_mut(&mut self) -> Option<&mut E::Tree> {
        self.tree.as_mut()
    }

    /// Hierarchy of the current trial, failing when none was built
    pub fn require_tree(&mut self) -> ScaleResult<&mut E::Tree> {
        self.tree.as_mut().ok_or(ScaleError::MissingTree)
    }

    /// Take the hierarchy out of the stage
    pub fn take_tree(&mut self) -> Option<E::Tree> {
        self.tree.take()
    }

    /// Build `workload` with a fresh [`LabelInitializer`]
    pub fn build(&mut self, workload: &Workload) -> ScaleResult<&mut E::Tree> {
        self.build_with(workload, LabelInitializer::new())
    }

    /// Build `workload` with `initializer`, replacing the current hierarchy
    pub fn build_with<I>(&mut self, workload: &Workload, initializer: I) -> ScaleResult<&mut E::Tree>
    where
        I: NodeInitializer + 'static,
    {
        self.dispose_tree();
        let tree = TreeBuilder::build(&mut self.env, workload, initializer)?;
        Ok(self.tree.insert(tree))
    }

    /// Drain pending UI events
    pub fn process_events(&mut self) -> usize {
        self.env.process_events()
    }

    /// Dispose the current hierarchy and drain pending events
    pub fn reset(&mut self) -> usize {
        self.dispose_tree();
        self.env.process_events()
    }

    /// Consume the stage, disposing its hierarchy
    pub fn into_environment(mut self) -> E {
        self.dispose_tree();
        self.env
    }

    fn dispose_tree(&mut self) {
        if let Some(mut tree) = self.tree.take() {
            tree.dispose();
        }
    }
}

/// Operation measured by the harness
///
/// `prepare` runs outside the timed region, `run` inside it. Closures of the
/// form `FnMut(&mut Stage<E>, usize) -> ScaleResult<()>` are operations with
/// nothing to prepare.
pub trait Operation<E: Environment> {
    /// Untimed setup for a trial of `size`
    fn prepare(&mut self, _stage: &mut Stage<E>, _size: usize) -> ScaleResult<()> {
        Ok(())
    }

    /// Timed work for a trial of `size`
    fn run(&mut self, stage: &mut Stage<E>, size: usize) -> ScaleResult<()>;
}

impl<E, F> Operation<E> for F
where
    E: Environment,
    F: FnMut(&mut Stage<E>, usize) -> ScaleResult<()>,
{
    fn run(&mut self, stage: &mut Stage<E>, size: usize) -> ScaleResult<()> {
        self(stage, size)
    }
}

/// Times operations and checks their growth degree
#[derive(Debug)]
pub struct MeasurementHarness {
    clock: Box<dyn Clock>,
    noise_floor: Duration,
    warmup: bool,
}

impl Default for MeasurementHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementHarness {
    /// Create a harness on the monotonic clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Box::new(MonotonicClock::new()),
            noise_floor: DEFAULT_NOISE_FLOOR,
            warmup: true,
        }
    }

    /// Read time from `clock`
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the noise floor
    #[must_use]
    pub const fn with_noise_floor(mut self, noise_floor: Duration) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    /// Enable or disable the warmup pass
    #[must_use]
    pub const fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Noise floor
    #[must_use]
    pub const fn noise_floor(&self) -> Duration {
        self.noise_floor
    }

    /// Check if the warmup pass runs
    #[must_use]
    pub const fn warmup(&self) -> bool {
        self.warmup
    }

    /// Time `operation` at both sizes and require its degree below `max_degree`
    ///
    /// Returns the report on a pass (including noise-floor passes) and
    /// [`ScaleError::DegreeExceeded`] carrying it otherwise. A failing
    /// operation aborts the check. The stage is reset on every exit path.
    pub fn assert_maximum_degree<E, O>(
        &self,
        stage: &mut Stage<E>,
        max_degree: f64,
        sizes: SizePair,
        operation: &mut O,
    ) -> ScaleResult<DegreeReport>
    where
        E: Environment,
        O: Operation<E> + ?Sized,
    {
        let check = DegreeCheck::try_new(max_degree)?.with_noise_floor(self.noise_floor);
        sizes.validate()?;

        let _span = info_span!(
            "degree_check",
            max_degree,
            small = sizes.small,
            large = sizes.large
        )
        .entered();

        let samples = self.run_trials(stage, sizes, operation);
        self.reset(stage);
        let (small, large) = samples?;

        let report = check.evaluate(small, large);
        match report.verdict {
            Verdict::Within => info!(degree = report.degree, "degree within ceiling"),
            Verdict::BelowNoiseFloor => debug!(
                small_ms = small.millis(),
                large_ms = large.millis(),
                "both samples below noise floor"
            ),
            Verdict::Exceeded => warn!(%report, "degree ceiling exceeded"),
        }

        if report.passed() {
            Ok(report)
        } else {
            Err(ScaleError::degree_exceeded(report))
        }
    }

    /// Time one trial of `operation` at `size`
    ///
    /// Prepares, drains events, reads the clock, runs, drains events again
    /// and reads the clock.
    pub fn measure<E, O>(&self, stage: &mut Stage<E>, operation: &mut O, size: usize) -> ScaleResult<Sample>
    where
        E: Environment,
        O: Operation<E> + ?Sized,
    {
        operation.prepare(stage, size)?;
        stage.process_events();

        let start = self.clock.now();
        operation.run(stage, size)?;
        stage.process_events();
        let elapsed = self.clock.now().saturating_sub(start);

        let sample = Sample::new(size, elapsed);
        debug!(size, elapsed_ms = sample.millis(), "sample");
        Ok(sample)
    }

    /// Dispose the stage's hierarchy and drain pending events
    pub fn reset<E: Environment>(&self, stage: &mut Stage<E>) -> usize {
        stage.reset()
    }

    fn run_trials<E, O>(&self, stage: &mut Stage<E>, sizes: SizePair, operation: &mut O) -> ScaleResult<(Sample, Sample)>
    where
        E: Environment,
        O: Operation<E> + ?Sized,
    {
        self.reset(stage);
        if self.warmup {
            debug!(size = sizes.small, "warmup");
            self.measure(stage, operation, sizes.small)?;
            self.reset(stage);
        }

        let small = self.measure(stage, operation, sizes.small)?;
        self.reset(stage);
        let large = self.measure(stage, operation, sizes.large)?;
        Ok((small, large))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::hierarchy::{HierarchyError, Mode};
    use crate::memory::{FaultPlan, MemoryEnvironment};
    use crate::shape::Shape;

    fn fake_harness(clock: &FakeClock) -> MeasurementHarness {
        MeasurementHarness::new().with_clock(clock.clone())
    }

    mod size_pair_tests {
        use super::*;

        #[test]
        fn test_valid_pair() {
            let pair = SizePair::new(10, 100).unwrap();
            assert!((pair.ratio() - 10.0).abs() < f64::EPSILON);
            assert_eq!(pair.to_string(), "10 -> 100");
        }

        #[test]
        fn test_decade() {
            assert_eq!(SizePair::decade(500).unwrap().large, 5000);
        }

        #[test]
        fn test_rejects_invalid_pairs() {
            for (small, large) in [(0, 10), (10, 10), (20, 10)] {
                assert!(matches!(
                    SizePair::new(small, large),
                    Err(ScaleError::InvalidSizes { .. })
                ));
            }
        }
    }

    mod stage_tests {
        use super::*;

        #[test]
        fn test_build_replaces_and_disposes() {
            let mut stage = Stage::new(MemoryEnvironment::new());
            stage
                .build(&Workload::new(Shape::Star, 5, Mode::Eager))
                .unwrap();
            stage
                .build(&Workload::new(Shape::Star, 8, Mode::Eager))
                .unwrap();
            assert_eq!(stage.tree().unwrap().node_count(), 8);
            assert_eq!(stage.environment().trees_created(), 2);
        }

        #[test]
        fn test_reset_disposes_and_drains() {
            let mut stage = Stage::new(MemoryEnvironment::new());
            stage
                .build(&Workload::new(Shape::Binary, 10, Mode::Eager))
                .unwrap();
            assert_eq!(stage.reset(), 1);
            assert!(stage.tree().is_none());
            assert!(matches!(stage.require_tree(), Err(ScaleError::MissingTree)));
        }

        #[test]
        fn test_into_environment() {
            let mut stage = Stage::new(MemoryEnvironment::new());
            stage
                .build(&Workload::new(Shape::Binary, 10, Mode::Eager))
                .unwrap();
            let env = stage.into_environment();
            assert_eq!(env.pending_events(), 1);
        }
    }

    mod measure_tests {
        use super::*;

        struct Recorder {
            prepared: Vec<usize>,
            ran: Vec<usize>,
            clock: FakeClock,
        }

        impl Operation<MemoryEnvironment> for Recorder {
            fn prepare(&mut self, _stage: &mut Stage<MemoryEnvironment>, size: usize) -> ScaleResult<()> {
                self.prepared.push(size);
                // Untimed work must not show up in the sample
                self.clock.advance(Duration::from_secs(60));
                Ok(())
            }

            fn run(&mut self, _stage: &mut Stage<MemoryEnvironment>, size: usize) -> ScaleResult<()> {
                self.ran.push(size);
                self.clock.advance(Duration::from_micros(size as u64 * 100));
                Ok(())
            }
        }

        #[test]
        fn test_prepare_is_untimed() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let mut op = Recorder {
                prepared: Vec::new(),
                ran: Vec::new(),
                clock: clock.clone(),
            };
            let sample = harness.measure(&mut stage, &mut op, 10).unwrap();
            assert_eq!(sample, Sample::from_millis(10, 1));
        }

        #[test]
        fn test_warmup_runs_small_size_once() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let mut op = Recorder {
                prepared: Vec::new(),
                ran: Vec::new(),
                clock: clock.clone(),
            };
            harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(100, 1000).unwrap(), &mut op)
                .unwrap();
            assert_eq!(op.ran, vec![100, 100, 1000]);
            assert_eq!(op.prepared, vec![100, 100, 1000]);
        }

        #[test]
        fn test_without_warmup() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock).with_warmup(false);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let mut op = Recorder {
                prepared: Vec::new(),
                ran: Vec::new(),
                clock: clock.clone(),
            };
            harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(100, 1000).unwrap(), &mut op)
                .unwrap();
            assert_eq!(op.ran, vec![100, 1000]);
        }
    }

    mod degree_check_tests {
        use super::*;

        #[test]
        fn test_linear_cost_passes() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let ticker = clock.clone();
            let mut linear = move |_: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                ticker.advance(Duration::from_micros(size as u64 * 50));
                Ok(())
            };

            let report = harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(1000, 10_000).unwrap(), &mut linear)
                .unwrap();
            assert_eq!(report.verdict, Verdict::Within);
            assert!((report.degree - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_quadratic_cost_fails_with_diagnostic() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let ticker = clock.clone();
            let mut quadratic = move |_: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                ticker.advance_nanos((size * size) as u64 * 10);
                Ok(())
            };

            let err = harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(1000, 10_000).unwrap(), &mut quadratic)
                .unwrap_err();
            let report = err.report().expect("diagnostic");
            assert!((report.degree - 2.0).abs() < 1e-9);
            assert_eq!(report.small, Sample::from_millis(1000, 10));
            assert_eq!(report.large, Sample::from_millis(10_000, 1000));
            assert!(err.to_string().contains("ceiling 1.10"));
        }

        #[test]
        fn test_noise_floor_pass() {
            let clock = FakeClock::new();
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let ticker = clock.clone();
            let mut tiny = move |_: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                ticker.advance_nanos((size * size) as u64);
                Ok(())
            };

            let report = harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(100, 1000).unwrap(), &mut tiny)
                .unwrap();
            assert_eq!(report.verdict, Verdict::BelowNoiseFloor);
        }

        #[test]
        fn test_cost_model_build_is_linear() {
            let clock = FakeClock::new();
            let env = MemoryEnvironment::new().with_cost_model(
                crate::memory::CostModel::new(clock.clone())
                    .with_create(Duration::from_micros(20))
                    .with_attribute(Duration::from_micros(5)),
            );
            let harness = fake_harness(&clock);
            let mut stage = Stage::new(env);
            let mut build = |stage: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                stage.build(&Workload::new(Shape::Binary, size, Mode::Eager))?;
                Ok(())
            };

            let report = harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(1000, 10_000).unwrap(), &mut build)
                .unwrap();
            assert_eq!(report.verdict, Verdict::Within);
            assert!((report.degree - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_invalid_inputs_rejected_before_running() {
            let harness = MeasurementHarness::new();
            let mut stage = Stage::new(MemoryEnvironment::new());
            let mut calls = 0;
            let mut op = |_: &mut Stage<MemoryEnvironment>, _: usize| -> ScaleResult<()> {
                calls += 1;
                Ok(())
            };
            let sizes = SizePair { small: 10, large: 5 };
            assert!(matches!(
                harness.assert_maximum_degree(&mut stage, 1.1, sizes, &mut op),
                Err(ScaleError::InvalidSizes { .. })
            ));
            let sizes = SizePair::new(5, 10).unwrap();
            assert!(matches!(
                harness.assert_maximum_degree(&mut stage, -1.0, sizes, &mut op),
                Err(ScaleError::InvalidCeiling { .. })
            ));
            assert_eq!(calls, 0);
        }
    }

    mod failure_tests {
        use super::*;

        #[test]
        fn test_construction_failure_aborts_and_resets() {
            let env = MemoryEnvironment::new().with_fault_plan(FaultPlan::fail_creation(50));
            let harness = MeasurementHarness::new();
            let mut stage = Stage::new(env);
            let mut build = |stage: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                stage.build(&Workload::new(Shape::Binary, size, Mode::Eager))?;
                Ok(())
            };

            let err = harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(100, 1000).unwrap(), &mut build)
                .unwrap_err();
            assert!(matches!(
                err,
                ScaleError::Construction(HierarchyError::Injected { .. })
            ));
            assert!(stage.tree().is_none());
            assert_eq!(stage.environment().pending_events(), 0);
        }

        #[test]
        fn test_failure_leaves_no_redraw_suppression() {
            let harness = MeasurementHarness::new().with_warmup(false);
            let mut stage = Stage::new(MemoryEnvironment::new());
            let mut op = |stage: &mut Stage<MemoryEnvironment>, size: usize| -> ScaleResult<()> {
                let tree = stage.build(&Workload::new(Shape::Star, size, Mode::Eager))?;
                let mut guard = crate::hierarchy::RedrawGuard::new(tree);
                guard.item(None, 99)?;
                Ok(())
            };

            assert!(harness
                .assert_maximum_degree(&mut stage, 1.1, SizePair::new(5, 50).unwrap(), &mut op)
                .is_err());
            // Two repaints: one from the build, one from the failing guard
            assert_eq!(stage.environment().processed_events(), 2);
        }
    }
}
