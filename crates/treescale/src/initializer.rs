//! Per-node initializers.
//!
//! An initializer runs once per node when the node becomes visible: at
//! creation in eager mode, from the populate signal in virtual mode. Any
//! `FnMut(&mut dyn Hierarchy, PopulateRequest) -> HierarchyResult<()>` is an
//! initializer.

use crate::hierarchy::{Color, Font, Hierarchy, HierarchyResult, PopulateRequest};

/// Sets display attributes on a freshly visible node
pub trait NodeInitializer {
    /// Initialize `request.node`
    fn initialize(&mut self, tree: &mut dyn Hierarchy, request: PopulateRequest)
        -> HierarchyResult<()>;
}

impl<F> NodeInitializer for F
where
    F: FnMut(&mut dyn Hierarchy, PopulateRequest) -> HierarchyResult<()>,
{
    fn initialize(
        &mut self,
        tree: &mut dyn Hierarchy,
        request: PopulateRequest,
    ) -> HierarchyResult<()> {
        self(tree, request)
    }
}

/// Initializer that leaves nodes untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInitializer;

impl NodeInitializer for NoopInitializer {
    fn initialize(&mut self, _tree: &mut dyn Hierarchy, _request: PopulateRequest) -> HierarchyResult<()> {
        Ok(())
    }
}

const LIGHT: Color = Color::rgb(0xf5, 0xf5, 0xf5);
const DARK: Color = Color::rgb(0x20, 0x20, 0x20);

/// Labels nodes `Node <id>` from a monotonic counter and styles them by parity
///
/// Every build gets its own initializer, so IDs restart at zero per trial.
#[derive(Debug, Clone)]
pub struct LabelInitializer {
    next_id: u64,
    font_family: String,
}

impl Default for LabelInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelInitializer {
    /// Create an initializer starting at ID 0
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            font_family: "Sans".to_string(),
        }
    }

    /// Start numbering at `first_id`
    #[must_use]
    pub const fn starting_at(mut self, first_id: u64) -> Self {
        self.next_id = first_id;
        self
    }

    /// ID the next node will receive
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }
}

impl NodeInitializer for LabelInitializer {
    fn initialize(&mut self, tree: &mut dyn Hierarchy, request: PopulateRequest) -> HierarchyResult<()> {
        let id = self.next_id;
        self.next_id += 1;

        let even = id % 2 == 0;
        let (foreground, background) = if even { (DARK, LIGHT) } else { (LIGHT, DARK) };
        tree.set_label(request.node, &format!("Node {id}"))?;
        tree.set_foreground(request.node, foreground)?;
        tree.set_background(request.node, background)?;
        tree.set_font(request.node, Font::new(self.font_family.clone(), 9).with_bold(even))
    }
}

/// Labels nodes with their dotted structural path (`0`, `0.1`, `0.1.0`)
///
/// The label depends only on position, so eager and virtual builds of the
/// same workload label every node identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathInitializer;

impl NodeInitializer for PathInitializer {
    fn initialize(&mut self, tree: &mut dyn Hierarchy, request: PopulateRequest) -> HierarchyResult<()> {
        let label = match request.parent {
            Some(parent) => format!("{}.{}", tree.label(parent)?, request.index),
            None => request.index.to_string(),
        };
        tree.set_label(request.node, &label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::hierarchy::{Mode, NodeId};
    use crate::memory::MemoryTree;

    fn request(node: NodeId, parent: Option<NodeId>, index: usize) -> PopulateRequest {
        PopulateRequest {
            node,
            parent,
            index,
        }
    }

    #[test]
    fn test_closure_is_initializer() {
        let mut tree = MemoryTree::new(Mode::Eager);
        let node = tree.add_item(None).unwrap();
        let mut init = |tree: &mut dyn Hierarchy, request: PopulateRequest| {
            tree.set_label(request.node, "closure")
        };
        init.initialize(&mut tree, request(node, None, 0)).unwrap();
        assert_eq!(tree.label(node).unwrap(), "closure");
    }

    #[test]
    fn test_label_initializer_counts_and_styles() {
        let mut tree = MemoryTree::new(Mode::Eager);
        let first = tree.add_item(None).unwrap();
        let second = tree.add_item(None).unwrap();
        let mut init = LabelInitializer::new();
        init.initialize(&mut tree, request(first, None, 0)).unwrap();
        init.initialize(&mut tree, request(second, None, 1)).unwrap();

        let a = tree.attributes(first).unwrap();
        let b = tree.attributes(second).unwrap();
        assert_eq!(a.label, "Node 0");
        assert_eq!(b.label, "Node 1");
        assert_eq!(a.foreground, b.background);
        assert!(a.font.unwrap().bold);
        assert!(!b.font.unwrap().bold);
        assert_eq!(init.next_id(), 2);
    }

    #[test]
    fn test_label_initializer_starting_at() {
        let mut tree = MemoryTree::new(Mode::Eager);
        let node = tree.add_item(None).unwrap();
        LabelInitializer::new()
            .starting_at(41)
            .initialize(&mut tree, request(node, None, 0))
            .unwrap();
        assert_eq!(tree.label(node).unwrap(), "Node 41");
    }

    #[test]
    fn test_path_initializer() {
        let mut tree = MemoryTree::new(Mode::Eager);
        let root = tree.add_item(None).unwrap();
        let child = tree.add_item(Some(root)).unwrap();
        let mut init = PathInitializer;
        init.initialize(&mut tree, request(root, None, 1)).unwrap();
        init.initialize(&mut tree, request(child, Some(root), 0)).unwrap();
        assert_eq!(tree.label(child).unwrap(), "1.0");
    }

    #[test]
    fn test_noop_initializer() {
        let mut tree = MemoryTree::new(Mode::Eager);
        let node = tree.add_item(None).unwrap();
        NoopInitializer
            .initialize(&mut tree, request(node, None, 0))
            .unwrap();
        assert_eq!(tree.label(node).unwrap(), "");
    }
}
