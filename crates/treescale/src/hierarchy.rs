//! Hierarchy Collaborator Contract
//!
//! The harness never talks to a concrete widget toolkit. Everything it needs
//! from a tree widget goes through [`Hierarchy`], and everything it needs from
//! the display (tree creation, event pump) goes through [`Environment`].
//!
//! ## Virtual mode
//!
//! In [`Mode::Virtual`] a hierarchy only stores declared child counts. The
//! first time a declared node is reached through [`Hierarchy::item`], the
//! hierarchy calls the installed [`Materializer`] synchronously with a
//! [`PopulateRequest`] naming the node, its parent and its index. The
//! materializer must not reach other unmaterialized nodes.
//!
//! ## Redraw suppression
//!
//! `set_redraw(false)` / `set_redraw(true)` must always be paired. Use
//! [`RedrawGuard`], which re-enables redraw when dropped, on every exit path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Result type for collaborator calls
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Errors raised by a hierarchy collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Handle does not name a live node
    #[error("Unknown node: {node}")]
    UnknownNode {
        /// Offending handle
        node: NodeId,
    },

    /// Child index past the declared child count
    #[error("Index {index} out of range for {parent} with {count} items")]
    IndexOutOfRange {
        /// Parent that was indexed (`top level` when absent)
        parent: Parent,
        /// Requested index
        index: usize,
        /// Declared item count
        count: usize,
    },

    /// Hierarchy was already disposed
    #[error("Hierarchy is disposed")]
    Disposed,

    /// Materializer reached another lazy node while populating
    #[error("Re-entrant populate of {node}")]
    ReentrantPopulate {
        /// Node whose population was requested during another populate
        node: NodeId,
    },

    /// Failure injected by a fault plan
    #[error("Injected failure: {message}")]
    Injected {
        /// Error message
        message: String,
    },
}

/// Opaque handle to a node owned by a hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Parent position: a node, or the hierarchy's top level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parent(pub Option<NodeId>);

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(node) => write!(f, "{node}"),
            None => write!(f, "top level"),
        }
    }
}

/// Materialization mode of a hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Nodes are created and initialized up front
    #[default]
    Eager,
    /// Nodes are declared by count and populated on first access
    Virtual,
}

impl Mode {
    /// Check if virtual mode
    #[must_use]
    pub const fn is_virtual(self) -> bool {
        matches!(self, Self::Virtual)
    }

    /// Mode from the `virtual` flag
    #[must_use]
    pub const fn from_virtual(is_virtual: bool) -> Self {
        if is_virtual {
            Self::Virtual
        } else {
            Self::Eager
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => write!(f, "eager"),
            Self::Virtual => write!(f, "virtual"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "virtual" | "lazy" => Ok(Self::Virtual),
            _ => Err(format!("Unknown mode: {s}")),
        }
    }
}

/// RGB color attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a color from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Font attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    /// Font family
    pub family: String,
    /// Size in points
    pub points: u16,
    /// Bold weight
    pub bold: bool,
}

impl Font {
    /// Create a regular-weight font
    #[must_use]
    pub fn new(family: impl Into<String>, points: u16) -> Self {
        Self {
            family: family.into(),
            points,
            bold: false,
        }
    }

    /// Set bold weight
    #[must_use]
    pub const fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// A node that needs initialization, with its structural position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopulateRequest {
    /// Node to initialize
    pub node: NodeId,
    /// Parent node (`None` for top-level items)
    pub parent: Option<NodeId>,
    /// Index among the parent's items
    pub index: usize,
}

/// Callback fired once per lazy node on first access
pub type Materializer =
    Box<dyn FnMut(&mut dyn Hierarchy, PopulateRequest) -> HierarchyResult<()>>;

/// Tree widget contract consumed by the harness
pub trait Hierarchy {
    /// Materialization mode this hierarchy was created with
    fn mode(&self) -> Mode;

    /// Declare the number of items under `parent` without realizing them
    fn set_item_count(&mut self, parent: Option<NodeId>, count: usize) -> HierarchyResult<()>;

    /// Declared number of items under `parent`
    fn item_count(&self, parent: Option<NodeId>) -> HierarchyResult<usize>;

    /// Create one realized item appended under `parent`
    fn add_item(&mut self, parent: Option<NodeId>) -> HierarchyResult<NodeId>;

    /// Item at `index` under `parent`
    ///
    /// In virtual mode this populates the item through the materializer the
    /// first time it is reached.
    fn item(&mut self, parent: Option<NodeId>, index: usize) -> HierarchyResult<NodeId>;

    /// All items under `parent`, realized in index order
    fn items(&mut self, parent: Option<NodeId>) -> HierarchyResult<Vec<NodeId>> {
        let count = self.item_count(parent)?;
        (0..count).map(|index| self.item(parent, index)).collect()
    }

    /// Install the populate callback used in virtual mode
    fn set_materializer(&mut self, materializer: Materializer);

    /// Suspend (`false`) or resume (`true`) redraw batching
    fn set_redraw(&mut self, enabled: bool);

    /// Set the item label
    fn set_label(&mut self, node: NodeId, label: &str) -> HierarchyResult<()>;

    /// Item label (empty when never set)
    fn label(&self, node: NodeId) -> HierarchyResult<String>;

    /// Set the item foreground color
    fn set_foreground(&mut self, node: NodeId, color: Color) -> HierarchyResult<()>;

    /// Set the item background color
    fn set_background(&mut self, node: NodeId, color: Color) -> HierarchyResult<()>;

    /// Set the item font
    fn set_font(&mut self, node: NodeId, font: Font) -> HierarchyResult<()>;

    /// Attach the number of descendants still to be created under `node`
    fn set_remaining_child_count(&mut self, node: NodeId, count: usize) -> HierarchyResult<()>;

    /// Remaining descendant count attached to `node`, if any
    fn remaining_child_count(&self, node: NodeId) -> HierarchyResult<Option<usize>>;

    /// Scroll `node` into view, expanding its ancestors
    fn show_item(&mut self, node: NodeId) -> HierarchyResult<()>;

    /// Release every node; further calls fail with [`HierarchyError::Disposed`]
    fn dispose(&mut self);

    /// Check if disposed
    fn is_disposed(&self) -> bool;
}

/// Display-level services used between measurement phases
pub trait Environment {
    /// Hierarchy type this environment creates
    type Tree: Hierarchy;

    /// Create an empty hierarchy in `mode`
    fn create_tree(&mut self, mode: Mode) -> HierarchyResult<Self::Tree>;

    /// Drain pending UI work; returns the number of events processed
    fn process_events(&mut self) -> usize;
}

/// Scoped redraw suppression
///
/// Calls `set_redraw(false)` on creation and `set_redraw(true)` on drop, so
/// the pair holds on `?` returns and unwinding alike. Dereferences to the
/// wrapped hierarchy.
#[derive(Debug)]
pub struct RedrawGuard<'a, H: Hierarchy + ?Sized> {
    tree: &'a mut H,
}

impl<'a, H: Hierarchy + ?Sized> RedrawGuard<'a, H> {
    /// Suspend redraw on `tree` until the guard is dropped
    pub fn new(tree: &'a mut H) -> Self {
        tree.set_redraw(false);
        Self { tree }
    }
}

impl<H: Hierarchy + ?Sized> Deref for RedrawGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.tree
    }
}

impl<H: Hierarchy + ?Sized> DerefMut for RedrawGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.tree
    }
}

impl<H: Hierarchy + ?Sized> Drop for RedrawGuard<'_, H> {
    fn drop(&mut self) {
        self.tree.set_redraw(true);
    }
}
