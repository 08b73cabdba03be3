//! Treescale: complexity-scaling harness for tree widget operations
//!
//! Treescale catches algorithmic regressions in hierarchical widgets. It
//! builds synthetic trees of a chosen [`Shape`] at two sizes, times an
//! operation on each and fails when the inferred growth exponent reaches a
//! declared ceiling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │  Scenario    │──►│ MeasurementHarness│──►│ DegreeCheck     │
//! │ (shape, op,  │   │ warmup, N0, N1    │   │ ln(t1/t0)/      │
//! │  ceiling)    │   │                   │   │ ln(n1/n0)       │
//! └──────────────┘   └─────────┬─────────┘   └─────────────────┘
//!                              │
//!                 ┌────────────┴────────────┐
//!                 ▼                         ▼
//!          ┌─────────────┐          ┌──────────────────┐
//!          │ TreeBuilder │          │ BreadthFirstWalker│
//!          │ Shape +     │          │ level order       │
//!          │ LazyPopulator│         └──────────────────┘
//!          └──────┬──────┘
//!                 ▼
//!       Hierarchy / Environment  (widget toolkit, or MemoryTree)
//! ```
//!
//! The widget tree is an external collaborator reached through the
//! [`Hierarchy`] and [`Environment`] traits. [`MemoryTree`] is the in-memory
//! reference implementation used by the tests and the CLI.

#![warn(missing_docs)]

pub mod builder;
pub mod clock;
pub mod degree;
pub mod harness;
pub mod hierarchy;
pub mod initializer;
pub mod memory;
pub mod populate;
mod result;
pub mod scenario;
pub mod shape;
pub mod walker;

pub use builder::TreeBuilder;
pub use clock::{Clock, FakeClock, MonotonicClock};
pub use degree::{estimate, DegreeCheck, DegreeReport, Sample, Verdict, DEFAULT_NOISE_FLOOR};
pub use harness::{MeasurementHarness, Operation, SizePair, Stage};
pub use hierarchy::{
    Color, Environment, Font, Hierarchy, HierarchyError, HierarchyResult, Materializer, Mode,
    NodeId, Parent, PopulateRequest, RedrawGuard,
};
pub use initializer::{LabelInitializer, NodeInitializer, NoopInitializer, PathInitializer};
pub use memory::{CostModel, FaultPlan, MemoryEnvironment, MemoryTree, NodeAttributes};
pub use populate::LazyPopulator;
pub use result::{ScaleError, ScaleResult};
pub use scenario::{
    OperationKind, Scenario, ScenarioOperation, ScenarioOutcome, SuiteConfig, Workload,
    DEFAULT_LARGE_SIZE, DEFAULT_SMALL_SIZE, LINEAR_CEILING,
};
pub use shape::{binary_split, Shape};
pub use walker::BreadthFirstWalker;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::builder::*;
    pub use super::clock::*;
    pub use super::degree::*;
    pub use super::harness::*;
    pub use super::hierarchy::*;
    pub use super::initializer::*;
    pub use super::memory::*;
    pub use super::populate::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::shape::*;
    pub use super::walker::*;
}
