//! Shape Preview
//!
//! Builds a synthetic workload in the in-memory hierarchy and draws it.
//!
//! ## Example Output
//!
//! ```text
//! binary/eager/7
//! ├── Node 0 (remaining 2)
//! │   ├── Node 1
//! │   └── Node 2
//! └── Node 3 (remaining 3)
//!     ├── Node 4
//!     └── Node 5 (remaining 1)
//!         └── Node 6 ◀ last
//!
//! Total: 7 nodes, 7 materialized; last item Node 6 at 1.1.0
//! ```

use crate::error::CliResult;
use console::style;
use treescale::{
    Hierarchy, HierarchyResult, LabelInitializer, MemoryEnvironment, MemoryTree, Mode, NodeId,
    ScaleError, Shape, TreeBuilder, Workload,
};

/// Configuration for tree display
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth to display (None = unlimited)
    pub max_depth: Option<usize>,
    /// Show remaining child counts
    pub show_remaining: bool,
    /// Use colors
    pub use_colors: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeConfig {
    /// Create a config that shows remaining counts
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: None,
            show_remaining: true,
            use_colors: false,
        }
    }

    /// Set maximum depth
    #[must_use]
    pub const fn with_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable or disable colors
    #[must_use]
    pub const fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Show or hide remaining child counts
    #[must_use]
    pub const fn with_remaining(mut self, show: bool) -> Self {
        self.show_remaining = show;
        self
    }
}

/// Draw `tree` with box-drawing connectors, marking `highlight`
///
/// Reading a virtual tree materializes every node drawn.
pub fn render_tree(
    tree: &mut dyn Hierarchy,
    config: &TreeConfig,
    highlight: Option<NodeId>,
) -> HierarchyResult<String> {
    let mut output = String::new();
    render_children(tree, None, "", 0, config, highlight, &mut output)?;
    Ok(output)
}

fn render_children(
    tree: &mut dyn Hierarchy,
    parent: Option<NodeId>,
    prefix: &str,
    depth: usize,
    config: &TreeConfig,
    highlight: Option<NodeId>,
    output: &mut String,
) -> HierarchyResult<()> {
    let count = tree.item_count(parent)?;
    for index in 0..count {
        let node = tree.item(parent, index)?;
        let is_last = index + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(&node_line(tree, node, config, highlight)?);

        let children = tree.item_count(Some(node))?;
        let expand = config.max_depth.map_or(true, |max| depth + 1 < max);
        if children > 0 && !expand {
            output.push_str(&format!(" [+{children}]"));
        }
        output.push('\n');

        if children > 0 && expand {
            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            render_children(tree, Some(node), &child_prefix, depth + 1, config, highlight, output)?;
        }
    }
    Ok(())
}

fn node_line(
    tree: &dyn Hierarchy,
    node: NodeId,
    config: &TreeConfig,
    highlight: Option<NodeId>,
) -> HierarchyResult<String> {
    let label = tree.label(node)?;
    let mut line = if config.use_colors {
        style(&label).bold().to_string()
    } else {
        label
    };

    if config.show_remaining {
        if let Some(remaining) = tree.remaining_child_count(node)?.filter(|&r| r > 0) {
            let text = format!(" (remaining {remaining})");
            if config.use_colors {
                line.push_str(&style(text).dim().to_string());
            } else {
                line.push_str(&text);
            }
        }
    }

    if highlight == Some(node) {
        if config.use_colors {
            line.push_str(&style(" ◀ last").cyan().to_string());
        } else {
            line.push_str(" ◀ last");
        }
    }
    Ok(line)
}

/// Child indices from the top level down to `node`, dotted
pub fn node_path(tree: &MemoryTree, node: NodeId) -> HierarchyResult<String> {
    let mut indices = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        let (parent, index) = tree.position(node)?;
        indices.push(index.to_string());
        current = parent;
    }
    indices.reverse();
    Ok(indices.join("."))
}

/// Build `shape` at `size` in the in-memory hierarchy and draw it
pub fn display_shape(shape: Shape, size: usize, mode: Mode, config: &TreeConfig) -> CliResult<String> {
    let workload = Workload::new(shape, size, mode);
    let mut env = MemoryEnvironment::new();
    let mut tree = TreeBuilder::build(&mut env, &workload, LabelInitializer::new())?;

    let last = shape.last_item(&mut tree).map_err(ScaleError::from)?;
    let body = render_tree(&mut tree, config, last).map_err(ScaleError::from)?;

    let mut output = format!("{workload}\n{body}\n");
    output.push_str(&format!(
        "Total: {size} nodes, {} materialized",
        tree.node_count()
    ));
    if let Some(node) = last {
        let label = tree.label(node).map_err(ScaleError::from)?;
        let path = node_path(&tree, node).map_err(ScaleError::from)?;
        output.push_str(&format!("; last item {label} at {path}"));
    }
    output.push('\n');

    tree.dispose();
    Ok(output)
}
