//! Level-order traversal.

use crate::hierarchy::{Hierarchy, NodeId, RedrawGuard};
use crate::result::ScaleResult;
use std::collections::VecDeque;

/// Breadth-first walker over a hierarchy
///
/// Children are reached through [`Hierarchy::item`], so walking a virtual
/// tree materializes every node. Redraw stays suppressed for the whole walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirstWalker;

impl BreadthFirstWalker {
    /// Visit every node once in level order; returns the visit count
    ///
    /// A failing visitor stops the walk and its error is returned.
    pub fn traverse<F>(tree: &mut dyn Hierarchy, mut visit: F) -> ScaleResult<usize>
    where
        F: FnMut(&mut dyn Hierarchy, NodeId) -> ScaleResult<()>,
    {
        let mut tree = RedrawGuard::new(tree);
        let mut queue = VecDeque::new();
        enqueue_children(&mut *tree, None, &mut queue)?;

        let mut visited = 0;
        while let Some(node) = queue.pop_front() {
            visit(&mut *tree, node)?;
            visited += 1;
            enqueue_children(&mut *tree, Some(node), &mut queue)?;
        }
        Ok(visited)
    }

    /// Count nodes reachable from the top level
    pub fn count(tree: &mut dyn Hierarchy) -> ScaleResult<usize> {
        Self::traverse(tree, |_, _| Ok(()))
    }

    /// Node handles in level order
    pub fn collect(tree: &mut dyn Hierarchy) -> ScaleResult<Vec<NodeId>> {
        let mut nodes = Vec::new();
        Self::traverse(tree, |_, node| {
            nodes.push(node);
            Ok(())
        })?;
        Ok(nodes)
    }
}

fn enqueue_children(
    tree: &mut dyn Hierarchy,
    parent: Option<NodeId>,
    queue: &mut VecDeque<NodeId>,
) -> ScaleResult<()> {
    let count = tree.item_count(parent)?;
    queue.reserve(count);
    for index in 0..count {
        queue.push_back(tree.item(parent, index)?);
    }
    Ok(())
}
