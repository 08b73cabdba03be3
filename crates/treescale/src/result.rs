//! Result and error types for Treescale.

use crate::degree::DegreeReport;
use crate::hierarchy::HierarchyError;
use thiserror::Error;

/// Result type for Treescale operations
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Errors that can occur while building workloads or checking growth degrees
#[derive(Debug, Error)]
pub enum ScaleError {
    /// The hierarchy collaborator failed while creating or populating nodes
    #[error("Construction failed: {0}")]
    Construction(#[from] HierarchyError),

    /// Measured growth degree reached the declared ceiling
    #[error("Maximum degree exceeded: {report}")]
    DegreeExceeded {
        /// Full diagnostic for the failing check
        report: Box<DegreeReport>,
    },

    /// Operation needs a hierarchy but none was built for the current trial
    #[error("No hierarchy built for the current trial")]
    MissingTree,

    /// Size pair is not strictly increasing or starts at zero
    #[error("Invalid size pair: small={small}, large={large} (need 0 < small < large)")]
    InvalidSizes {
        /// Smaller workload size
        small: usize,
        /// Larger workload size
        large: usize,
    },

    /// Degree ceiling is not a positive finite number
    #[error("Invalid degree ceiling: {value}")]
    InvalidCeiling {
        /// Offending ceiling
        value: f64,
    },

    /// Suite or scenario configuration is malformed
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ScaleError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a failing report
    #[must_use]
    pub fn degree_exceeded(report: DegreeReport) -> Self {
        Self::DegreeExceeded {
            report: Box::new(report),
        }
    }

    /// The diagnostic report, when this error is a failed degree check
    #[must_use]
    pub fn report(&self) -> Option<&DegreeReport> {
        match self {
            Self::DegreeExceeded { report } => Some(report),
            _ => None,
        }
    }
}
