//! Empirical growth-degree estimation.
//!
//! Two timed samples `(n0, t0)` and `(n1, t1)` give the exponent `k` in
//! `t ~ n^k`:
//!
//! ```text
//! k = ln(t1 / t0) / ln(n1 / n0)
//! ```
//!
//! A linear operation measures `k ≈ 1.0`, a quadratic one `k ≈ 2.0`. Timings
//! that both sit at or below the noise floor are too small to say anything
//! about growth and always pass.

use crate::result::{ScaleError, ScaleResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default noise floor below which both samples are considered noise
pub const DEFAULT_NOISE_FLOOR: Duration = Duration::from_millis(100);

/// One timed measurement of an operation at a workload size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Workload size (node count)
    pub size: usize,
    /// Wall time of the timed region
    pub elapsed: Duration,
}

impl Sample {
    /// Create a sample
    #[must_use]
    pub const fn new(size: usize, elapsed: Duration) -> Self {
        Self { size, elapsed }
    }

    /// Create a sample from whole milliseconds
    #[must_use]
    pub const fn from_millis(size: usize, millis: u64) -> Self {
        Self::new(size, Duration::from_millis(millis))
    }

    /// Elapsed time in milliseconds
    #[must_use]
    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Average cost per element in nanoseconds
    #[must_use]
    pub fn nanos_per_element(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.size as f64
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items in {:.3}ms", self.size, self.millis())
    }
}

/// Estimate the growth degree between two samples
///
/// Sizes must satisfy `0 < small.size < large.size`; otherwise the result is
/// NaN. Zero timings never divide: two zero timings give `0.0`, a zero large
/// timing gives `0.0`, and a zero small timing against a positive large one
/// gives `+inf`.
#[must_use]
pub fn estimate(small: Sample, large: Sample) -> f64 {
    if small.size == 0 || large.size <= small.size {
        return f64::NAN;
    }

    let t0 = small.elapsed.as_nanos();
    let t1 = large.elapsed.as_nanos();
    if t1 == 0 {
        return 0.0;
    }
    if t0 == 0 {
        return f64::INFINITY;
    }

    let time_ratio = t1 as f64 / t0 as f64;
    let size_ratio = large.size as f64 / small.size as f64;
    time_ratio.ln() / size_ratio.ln()
}

/// Outcome of a degree check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Degree strictly below the ceiling
    Within,
    /// Both samples at or below the noise floor; degree not asserted
    BelowNoiseFloor,
    /// Degree at or above the ceiling
    Exceeded,
}

impl Verdict {
    /// Check if the verdict passes
    #[must_use]
    pub const fn is_pass(self) -> bool {
        !matches!(self, Self::Exceeded)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Within => write!(f, "within"),
            Self::BelowNoiseFloor => write!(f, "below noise floor"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}

/// Diagnostic for one degree check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeReport {
    /// Sample at the small size
    pub small: Sample,
    /// Sample at the large size
    pub large: Sample,
    /// `large.size / small.size`
    pub size_ratio: f64,
    /// Per-element cost at the large size over per-element cost at the small size
    pub cost_ratio: f64,
    /// Estimated growth degree
    pub degree: f64,
    /// Ceiling the degree was checked against
    pub max_degree: f64,
    /// Noise floor in effect
    pub noise_floor: Duration,
    /// Outcome
    pub verdict: Verdict,
}

impl DegreeReport {
    /// Check if the report passes
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

impl fmt::Display for DegreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = if self.degree < self.max_degree {
            "<"
        } else {
            ">="
        };
        write!(
            f,
            "degree {:.3} {} ceiling {:.2} ({}): {} -> {}; size ratio {:.1}x, per-element cost ratio {:.2}x",
            self.degree,
            relation,
            self.max_degree,
            self.verdict,
            self.small,
            self.large,
            self.size_ratio,
            self.cost_ratio,
        )?;
        if self.verdict == Verdict::BelowNoiseFloor {
            write!(
                f,
                ", noise floor {:.3}ms",
                self.noise_floor.as_secs_f64() * 1000.0
            )?;
        }
        Ok(())
    }
}

/// Degree ceiling with a noise floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeCheck {
    max_degree: f64,
    noise_floor: Duration,
}

impl DegreeCheck {
    /// Create a check with the default noise floor
    #[must_use]
    pub const fn new(max_degree: f64) -> Self {
        Self {
            max_degree,
            noise_floor: DEFAULT_NOISE_FLOOR,
        }
    }

    /// Create a check, rejecting ceilings that are not positive and finite
    pub fn try_new(max_degree: f64) -> ScaleResult<Self> {
        if !max_degree.is_finite() || max_degree <= 0.0 {
            return Err(ScaleError::InvalidCeiling { value: max_degree });
        }
        Ok(Self::new(max_degree))
    }

    /// Set the noise floor
    #[must_use]
    pub const fn with_noise_floor(mut self, noise_floor: Duration) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    /// Degree ceiling
    #[must_use]
    pub const fn max_degree(&self) -> f64 {
        self.max_degree
    }

    /// Noise floor
    #[must_use]
    pub const fn noise_floor(&self) -> Duration {
        self.noise_floor
    }

    /// Evaluate two samples into a report
    #[must_use]
    pub fn evaluate(&self, small: Sample, large: Sample) -> DegreeReport {
        let degree = estimate(small, large);
        let size_ratio = if small.size == 0 {
            f64::INFINITY
        } else {
            large.size as f64 / small.size as f64
        };

        let verdict = if small.elapsed <= self.noise_floor && large.elapsed <= self.noise_floor {
            Verdict::BelowNoiseFloor
        } else if degree < self.max_degree {
            Verdict::Within
        } else {
            Verdict::Exceeded
        };

        DegreeReport {
            small,
            large,
            size_ratio,
            cost_ratio: cost_ratio(small, large),
            degree,
            max_degree: self.max_degree,
            noise_floor: self.noise_floor,
            verdict,
        }
    }

    /// Evaluate two samples, failing when the ceiling is exceeded
    pub fn assert(&self, small: Sample, large: Sample) -> ScaleResult<DegreeReport> {
        let report = self.evaluate(small, large);
        if report.passed() {
            Ok(report)
        } else {
            Err(ScaleError::degree_exceeded(report))
        }
    }
}

fn cost_ratio(small: Sample, large: Sample) -> f64 {
    let per0 = small.nanos_per_element();
    let per1 = large.nanos_per_element();
    if per0 == 0.0 {
        return if per1 == 0.0 { 1.0 } else { f64::INFINITY };
    }
    per1 / per0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod estimate_tests {
        use super::*;

        #[test]
        fn test_linear_degree() {
            let degree = estimate(
                Sample::from_millis(1000, 10),
                Sample::from_millis(10_000, 100),
            );
            assert!((degree - 1.0).abs() < 1e-9, "degree = {degree}");
        }

        #[test]
        fn test_quadratic_degree() {
            let degree = estimate(
                Sample::from_millis(1000, 10),
                Sample::from_millis(10_000, 1000),
            );
            assert!((degree - 2.0).abs() < 1e-9, "degree = {degree}");
        }

        #[test]
        fn test_constant_degree() {
            let degree = estimate(
                Sample::from_millis(1000, 50),
                Sample::from_millis(10_000, 50),
            );
            assert!(degree.abs() < 1e-9);
        }

        #[test]
        fn test_non_decade_ratio() {
            let degree = estimate(
                Sample::from_millis(100, 10),
                Sample::from_millis(400, 160),
            );
            assert!((degree - 2.0).abs() < 1e-9);
        }

        #[test]
        fn test_zero_timings() {
            assert_eq!(
                estimate(Sample::from_millis(10, 0), Sample::from_millis(100, 0)),
                0.0
            );
            assert_eq!(
                estimate(Sample::from_millis(10, 5), Sample::from_millis(100, 0)),
                0.0
            );
            assert_eq!(
                estimate(Sample::from_millis(10, 0), Sample::from_millis(100, 5)),
                f64::INFINITY
            );
        }

        #[test]
        fn test_invalid_sizes_are_nan() {
            assert!(estimate(Sample::from_millis(0, 1), Sample::from_millis(10, 2)).is_nan());
            assert!(estimate(Sample::from_millis(10, 1), Sample::from_millis(10, 2)).is_nan());
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_linear_passes_linear_ceiling() {
            let report = DegreeCheck::new(1.1).evaluate(
                Sample::from_millis(1000, 200),
                Sample::from_millis(10_000, 2000),
            );
            assert_eq!(report.verdict, Verdict::Within);
            assert!(report.passed());
            assert!((report.size_ratio - 10.0).abs() < 1e-9);
            assert!((report.cost_ratio - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_quadratic_fails_linear_ceiling() {
            let err = DegreeCheck::new(1.1)
                .assert(
                    Sample::from_millis(1000, 200),
                    Sample::from_millis(10_000, 20_000),
                )
                .unwrap_err();
            let report = err.report().unwrap();
            assert_eq!(report.verdict, Verdict::Exceeded);
            assert!((report.cost_ratio - 10.0).abs() < 1e-9);
        }

        #[test]
        fn test_degree_equal_to_ceiling_fails() {
            let report = DegreeCheck::new(1.0)
                .with_noise_floor(Duration::ZERO)
                .evaluate(
                    Sample::from_millis(1000, 10),
                    Sample::from_millis(10_000, 100),
                );
            // ln(10)/ln(10) is exactly 1.0 in floating point
            assert_eq!(report.degree, 1.0);
            assert_eq!(report.verdict, Verdict::Exceeded);
        }

        #[test]
        fn test_noise_floor_exemption() {
            for ceiling in [0.01, 0.5, 1.1, 2.1] {
                let report = DegreeCheck::new(ceiling).evaluate(
                    Sample::from_millis(1000, 5),
                    Sample::from_millis(10_000, 8),
                );
                assert_eq!(report.verdict, Verdict::BelowNoiseFloor);
                assert!(report.passed());
            }
        }

        #[test]
        fn test_noise_floor_needs_both_samples() {
            let report = DegreeCheck::new(1.1).evaluate(
                Sample::from_millis(1000, 5),
                Sample::from_millis(10_000, 500),
            );
            assert_eq!(report.verdict, Verdict::Exceeded);
        }

        #[test]
        fn test_noise_floor_is_inclusive() {
            let report = DegreeCheck::new(0.5).evaluate(
                Sample::from_millis(1000, 100),
                Sample::from_millis(10_000, 100),
            );
            assert_eq!(report.verdict, Verdict::BelowNoiseFloor);
        }

        #[test]
        fn test_zero_floor_zero_small_sample() {
            let report = DegreeCheck::new(2.1)
                .with_noise_floor(Duration::ZERO)
                .evaluate(Sample::from_millis(10, 0), Sample::from_millis(100, 1));
            assert_eq!(report.degree, f64::INFINITY);
            assert_eq!(report.cost_ratio, f64::INFINITY);
            assert_eq!(report.verdict, Verdict::Exceeded);
        }

        #[test]
        fn test_try_new_rejects_bad_ceilings() {
            for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
                assert!(matches!(
                    DegreeCheck::try_new(value),
                    Err(ScaleError::InvalidCeiling { .. })
                ));
            }
            assert_eq!(DegreeCheck::try_new(1.1).unwrap().max_degree(), 1.1);
        }

        #[test]
        fn test_default_noise_floor() {
            assert_eq!(DegreeCheck::new(1.1).noise_floor(), DEFAULT_NOISE_FLOOR);
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_display_exceeded() {
            let report = DegreeCheck::new(1.1).evaluate(
                Sample::from_millis(1000, 200),
                Sample::from_millis(10_000, 20_000),
            );
            let text = report.to_string();
            assert!(text.contains("degree 2.000 >= ceiling 1.10"));
            assert!(text.contains("exceeded"));
            assert!(text.contains("1000 items in 200.000ms"));
            assert!(text.contains("10000 items in 20000.000ms"));
            assert!(text.contains("size ratio 10.0x"));
            assert!(text.contains("per-element cost ratio 10.00x"));
        }

        #[test]
        fn test_display_noise_floor() {
            let report = DegreeCheck::new(1.1).evaluate(
                Sample::from_millis(1000, 5),
                Sample::from_millis(10_000, 80),
            );
            let text = report.to_string();
            assert!(text.contains("below noise floor"));
            assert!(text.contains("noise floor 100.000ms"));
        }

        #[test]
        fn test_report_serializes() {
            let report = DegreeCheck::new(1.1).evaluate(
                Sample::from_millis(1000, 200),
                Sample::from_millis(10_000, 2000),
            );
            let json = serde_json::to_string(&report).unwrap();
            assert!(json.contains("\"verdict\":\"within\""));
        }
    }
}
