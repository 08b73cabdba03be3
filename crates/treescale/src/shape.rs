//! Synthetic tree topologies.
//!
//! A [`Shape`] fills a hierarchy with exactly `size` nodes:
//!
//! - [`Shape::Binary`]: each node carries the number of descendants still to
//!   be created and splits it into a left and right branch with
//!   [`binary_split`]. Every branch reserves one slot for its own node.
//! - [`Shape::Star`]: one root with `size - 1` direct children.
//!
//! ```text
//! Binary, size 7              Star, size 4
//!
//! ├── a (2)                   └── root
//! │   ├── (0)                     ├── c0
//! │   └── (0)                     ├── c1
//! └── b (3)                       └── c2
//!     ├── (0)
//!     └── (1)
//!         └── (0)
//! ```

use crate::hierarchy::{Hierarchy, HierarchyResult, Mode, NodeId, PopulateRequest};
use crate::initializer::NodeInitializer;
use crate::populate::LazyPopulator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Split a descendant budget into left and right branch sizes
#[must_use]
pub const fn binary_split(count: usize) -> (usize, usize) {
    let left = count / 2;
    (left, count - left)
}

/// Non-empty branch sizes of a budget, in child-index order
pub(crate) fn branches(count: usize) -> impl Iterator<Item = usize> {
    let (left, right) = binary_split(count);
    [left, right].into_iter().filter(|branch| *branch > 0)
}

/// Number of children a node with `count` remaining descendants declares
#[must_use]
pub fn declared_children(count: usize) -> usize {
    branches(count).count()
}

/// Topology of a synthetic workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Recursively halved binary tree
    Binary,
    /// Single root with every other node as a direct child
    Star,
}

impl Shape {
    /// Every shape
    pub const ALL: [Self; 2] = [Self::Binary, Self::Star];

    /// Lowercase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Star => "star",
        }
    }

    /// Populate `tree` with exactly `size` nodes
    ///
    /// Eager trees are realized immediately and `initializer` runs on every
    /// node at creation. Virtual trees only get their top level declared; the
    /// initializer moves into a materializer and runs as nodes are reached.
    pub fn build_tree<I>(self, tree: &mut dyn Hierarchy, size: usize, mut initializer: I) -> HierarchyResult<()>
    where
        I: NodeInitializer + 'static,
    {
        match tree.mode() {
            Mode::Eager => match self {
                Self::Binary => build_binary(tree, None, size, &mut initializer),
                Self::Star => build_star(tree, size, &mut initializer),
            },
            Mode::Virtual => {
                LazyPopulator::new(self, size, initializer).install(tree);
                tree.set_item_count(None, self.top_level_count(size))
            }
        }
    }

    /// Number of top-level items a workload of `size` declares
    #[must_use]
    pub fn top_level_count(self, size: usize) -> usize {
        match self {
            Self::Binary => declared_children(size),
            Self::Star => usize::from(size > 0),
        }
    }

    /// Deepest-last node of a built tree, `None` when empty
    ///
    /// Binary follows the last child from the last top-level item until a
    /// leaf; Star answers the root's last child, or the root when it has none.
    /// In virtual mode this materializes the path it follows.
    pub fn last_item(self, tree: &mut dyn Hierarchy) -> HierarchyResult<Option<NodeId>> {
        let top = tree.item_count(None)?;
        if top == 0 {
            return Ok(None);
        }

        match self {
            Self::Binary => {
                let mut node = tree.item(None, top - 1)?;
                loop {
                    let children = tree.item_count(Some(node))?;
                    if children == 0 {
                        return Ok(Some(node));
                    }
                    node = tree.item(Some(node), children - 1)?;
                }
            }
            Self::Star => {
                let root = tree.item(None, 0)?;
                match tree.item_count(Some(root))? {
                    0 => Ok(Some(root)),
                    children => tree.item(Some(root), children - 1).map(Some),
                }
            }
        }
    }
}

fn build_binary<I: NodeInitializer>(
    tree: &mut dyn Hierarchy,
    parent: Option<NodeId>,
    count: usize,
    initializer: &mut I,
) -> HierarchyResult<()> {
    for (index, branch) in branches(count).enumerate() {
        let node = tree.add_item(parent)?;
        tree.set_remaining_child_count(node, branch - 1)?;
        initializer.initialize(tree, PopulateRequest { node, parent, index })?;
        build_binary(tree, Some(node), branch - 1, initializer)?;
    }
    Ok(())
}

fn build_star<I: NodeInitializer>(
    tree: &mut dyn Hierarchy,
    size: usize,
    initializer: &mut I,
) -> HierarchyResult<()> {
    if size == 0 {
        return Ok(());
    }
    let root = tree.add_item(None)?;
    initializer.initialize(
        tree,
        PopulateRequest {
            node: root,
            parent: None,
            index: 0,
        },
    )?;
    for index in 0..size - 1 {
        let node = tree.add_item(Some(root))?;
        initializer.initialize(
            tree,
            PopulateRequest {
                node,
                parent: Some(root),
                index,
            },
        )?;
    }
    Ok(())
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "star" => Ok(Self::Star),
            _ => Err(format!("Unknown shape: {s} (expected binary or star)")),
        }
    }
}
