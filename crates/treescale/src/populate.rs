//! On-demand population for virtual hierarchies.
//!
//! [`LazyPopulator`] turns a shape, a size and an initializer into the
//! materializer a virtual hierarchy fires when a node is first reached. Each
//! call only touches the node being populated and its already-populated
//! parent, never another lazy node.

use crate::hierarchy::{Hierarchy, HierarchyError, HierarchyResult, Materializer, Parent, PopulateRequest};
use crate::initializer::NodeInitializer;
use crate::shape::{branches, declared_children, Shape};

/// Materializer state for one virtual build
#[derive(Debug)]
pub struct LazyPopulator<I> {
    shape: Shape,
    size: usize,
    initializer: I,
}

impl<I: NodeInitializer + 'static> LazyPopulator<I> {
    /// Create a populator for a `size`-node `shape`
    pub const fn new(shape: Shape, size: usize, initializer: I) -> Self {
        Self {
            shape,
            size,
            initializer,
        }
    }

    /// Populate one node
    ///
    /// Binary nodes derive their budget from the parent's remaining count (the
    /// requested size for top-level nodes), record their own remaining count
    /// and declare their children. The Star root declares `size - 1` children.
    /// The initializer runs last.
    pub fn populate(&mut self, tree: &mut dyn Hierarchy, request: PopulateRequest) -> HierarchyResult<()> {
        match self.shape {
            Shape::Binary => {
                let budget = match request.parent {
                    Some(parent) => tree.remaining_child_count(parent)?.unwrap_or(0),
                    None => self.size,
                };
                let branch = branches(budget).nth(request.index).ok_or(
                    HierarchyError::IndexOutOfRange {
                        parent: Parent(request.parent),
                        index: request.index,
                        count: declared_children(budget),
                    },
                )?;
                let remaining = branch - 1;
                tree.set_remaining_child_count(request.node, remaining)?;
                tree.set_item_count(Some(request.node), declared_children(remaining))?;
            }
            Shape::Star => {
                if request.parent.is_none() {
                    tree.set_item_count(Some(request.node), self.size.saturating_sub(1))?;
                }
            }
        }
        self.initializer.initialize(tree, request)
    }

    /// Box this populator as a materializer
    pub fn into_materializer(mut self) -> Materializer {
        Box::new(move |tree: &mut dyn Hierarchy, request: PopulateRequest| {
            self.populate(tree, request)
        })
    }

    /// Install on `tree`, replacing any previous materializer
    pub fn install(self, tree: &mut dyn Hierarchy) {
        tracing::trace!(shape = %self.shape, size = self.size, "installing lazy populator");
        tree.set_materializer(self.into_materializer());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::hierarchy::Mode;
    use crate::initializer::{NoopInitializer, PathInitializer};
    use crate::memory::MemoryTree;

    fn virtual_tree<I: NodeInitializer + 'static>(shape: Shape, size: usize, init: I) -> MemoryTree {
        let mut tree = MemoryTree::new(Mode::Virtual);
        LazyPopulator::new(shape, size, init).install(&mut tree);
        tree.set_item_count(None, shape.top_level_count(size)).unwrap();
        tree
    }

    #[test]
    fn test_binary_budget_flows_from_parent() {
        let mut tree = virtual_tree(Shape::Binary, 100, NoopInitializer);
        let right = tree.item(None, 1).unwrap();
        assert_eq!(tree.remaining_child_count(right).unwrap(), Some(49));
        assert_eq!(tree.item_count(Some(right)).unwrap(), 2);

        let grandchild = tree.item(Some(right), 0).unwrap();
        // 49 splits into 24 and 25
        assert_eq!(tree.remaining_child_count(grandchild).unwrap(), Some(23));
    }

    #[test]
    fn test_only_accessed_nodes_materialize() {
        let mut tree = virtual_tree(Shape::Binary, 10_000, NoopInitializer);
        tree.item(None, 0).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.populate_count(), 1);
    }

    #[test]
    fn test_star_root_declares_children() {
        let mut tree = virtual_tree(Shape::Star, 10, NoopInitializer);
        let root = tree.item(None, 0).unwrap();
        assert_eq!(tree.item_count(Some(root)).unwrap(), 9);
        let child = tree.item(Some(root), 8).unwrap();
        assert_eq!(tree.item_count(Some(child)).unwrap(), 0);
        assert_eq!(tree.remaining_child_count(child).unwrap(), None);
    }

    #[test]
    fn test_initializer_runs_after_declaration() {
        let mut tree = virtual_tree(Shape::Binary, 7, PathInitializer);
        let right = tree.item(None, 1).unwrap();
        let leaf_parent = tree.item(Some(right), 1).unwrap();
        assert_eq!(tree.label(leaf_parent).unwrap(), "1.1");
    }

    #[test]
    fn test_index_past_budget_is_an_error() {
        let mut populator = LazyPopulator::new(Shape::Binary, 1, NoopInitializer);
        let mut tree = MemoryTree::new(Mode::Eager);
        let node = tree.add_item(None).unwrap();
        let err = populator
            .populate(
                &mut tree,
                PopulateRequest {
                    node,
                    parent: None,
                    index: 1,
                },
            )
            .unwrap_err();
        assert!(matches!(err, HierarchyError::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_initializer_failure_propagates() {
        let failing = |_tree: &mut dyn Hierarchy, _request: PopulateRequest| -> HierarchyResult<()> {
            Err(HierarchyError::Injected {
                message: "boom".to_string(),
            })
        };
        let mut tree = virtual_tree(Shape::Star, 3, failing);
        assert!(matches!(
            tree.item(None, 0),
            Err(HierarchyError::Injected { .. })
        ));
    }
}
