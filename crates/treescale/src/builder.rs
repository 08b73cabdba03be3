//! Workload construction with scoped redraw suppression.

use crate::hierarchy::{Environment, Hierarchy, RedrawGuard};
use crate::initializer::NodeInitializer;
use crate::result::ScaleResult;
use crate::scenario::Workload;

/// Builds workloads into fresh hierarchies
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Create a hierarchy in the workload's mode and fill it
    ///
    /// Redraw is suppressed while the shape is built and resumed on every
    /// exit path. A partially built hierarchy is disposed before the error is
    /// returned.
    pub fn build<E, I>(env: &mut E, workload: &Workload, initializer: I) -> ScaleResult<E::Tree>
    where
        E: Environment,
        I: NodeInitializer + 'static,
    {
        let _span = tracing::debug_span!(
            "build",
            shape = %workload.shape,
            mode = %workload.mode,
            size = workload.size
        )
        .entered();

        let mut tree = env.create_tree(workload.mode)?;
        if let Err(err) = Self::fill(&mut tree, workload, initializer) {
            tracing::debug!(error = %err, "construction failed");
            tree.dispose();
            return Err(err);
        }
        Ok(tree)
    }

    /// Fill an existing empty hierarchy with the workload's shape
    pub fn fill<I>(tree: &mut dyn Hierarchy, workload: &Workload, initializer: I) -> ScaleResult<()>
    where
        I: NodeInitializer + 'static,
    {
        let mut tree = RedrawGuard::new(tree);
        workload
            .shape
            .build_tree(&mut *tree, workload.size, initializer)?;
        Ok(())
    }
}
