//! In-memory reference collaborator.
//!
//! [`MemoryTree`] is an arena-backed [`Hierarchy`] with real virtual-mode
//! semantics: declared children are placeholders until first access, the
//! installed materializer fires exactly once per node, and re-entrant
//! population is reported as an error. [`MemoryEnvironment`] creates trees
//! sharing one repaint queue and can charge a simulated [`CostModel`] to a
//! [`FakeClock`].

use crate::clock::FakeClock;
use crate::hierarchy::{
    Color, Environment, Font, Hierarchy, HierarchyError, HierarchyResult, Materializer, Mode,
    NodeId, Parent, PopulateRequest,
};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Display attributes recorded on a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeAttributes {
    /// Label text
    pub label: String,
    /// Foreground color
    pub foreground: Option<Color>,
    /// Background color
    pub background: Option<Color>,
    /// Font
    pub font: Option<Font>,
}

/// Failures to inject into a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultPlan {
    fail_creation: Option<usize>,
}

impl FaultPlan {
    /// No injected failures
    #[must_use]
    pub const fn none() -> Self {
        Self {
            fail_creation: None,
        }
    }

    /// Fail the `nth` node creation (1-based)
    #[must_use]
    pub const fn fail_creation(nth: usize) -> Self {
        Self {
            fail_creation: Some(nth),
        }
    }
}

/// Simulated costs charged to a fake clock
#[derive(Debug, Clone)]
pub struct CostModel {
    clock: FakeClock,
    create: Duration,
    populate: Duration,
    access: Duration,
    attribute: Duration,
    dispose: Duration,
    repaint: Duration,
}

impl CostModel {
    /// Cost model charging nothing until configured
    #[must_use]
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            create: Duration::ZERO,
            populate: Duration::ZERO,
            access: Duration::ZERO,
            attribute: Duration::ZERO,
            dispose: Duration::ZERO,
            repaint: Duration::ZERO,
        }
    }

    /// Same cost for every kind of work
    #[must_use]
    pub fn uniform(clock: FakeClock, cost: Duration) -> Self {
        Self {
            clock,
            create: cost,
            populate: cost,
            access: cost,
            attribute: cost,
            dispose: cost,
            repaint: cost,
        }
    }

    /// Cost per node creation
    #[must_use]
    pub const fn with_create(mut self, cost: Duration) -> Self {
        self.create = cost;
        self
    }

    /// Cost per populate signal
    #[must_use]
    pub const fn with_populate(mut self, cost: Duration) -> Self {
        self.populate = cost;
        self
    }

    /// Cost per access to a realized node
    #[must_use]
    pub const fn with_access(mut self, cost: Duration) -> Self {
        self.access = cost;
        self
    }

    /// Cost per attribute write
    #[must_use]
    pub const fn with_attribute(mut self, cost: Duration) -> Self {
        self.attribute = cost;
        self
    }

    /// Cost per node released on dispose
    #[must_use]
    pub const fn with_dispose(mut self, cost: Duration) -> Self {
        self.dispose = cost;
        self
    }

    /// Cost per processed repaint event
    #[must_use]
    pub const fn with_repaint(mut self, cost: Duration) -> Self {
        self.repaint = cost;
        self
    }

    /// Clock the costs are charged to
    #[must_use]
    pub const fn clock(&self) -> &FakeClock {
        &self.clock
    }

    fn charge(&self, cost: Duration, times: usize) {
        if !cost.is_zero() && times > 0 {
            self.clock
                .advance_nanos(cost.as_nanos() as u64 * times as u64);
        }
    }
}

#[derive(Debug, Clone)]
struct NodeRecord {
    parent: Option<NodeId>,
    index: usize,
    children: Vec<Option<NodeId>>,
    attributes: NodeAttributes,
    remaining: Option<usize>,
    materialized: bool,
    expanded: bool,
    live: bool,
}

impl NodeRecord {
    fn new(parent: Option<NodeId>, index: usize, materialized: bool) -> Self {
        Self {
            parent,
            index,
            children: Vec::new(),
            attributes: NodeAttributes::default(),
            remaining: None,
            materialized,
            expanded: false,
            live: true,
        }
    }
}

/// Arena-backed hierarchy
pub struct MemoryTree {
    mode: Mode,
    nodes: Vec<NodeRecord>,
    top: Vec<Option<NodeId>>,
    materializer: Option<Materializer>,
    populating: Option<NodeId>,
    redraw_depth: usize,
    events: Rc<Cell<usize>>,
    cost: Option<CostModel>,
    faults: FaultPlan,
    creations: usize,
    populate_count: usize,
    live: usize,
    top_item: Option<NodeId>,
    disposed: bool,
}

impl fmt::Debug for MemoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTree")
            .field("mode", &self.mode)
            .field("live", &self.live)
            .field("populate_count", &self.populate_count)
            .field("redraw_depth", &self.redraw_depth)
            .field("has_materializer", &self.materializer.is_some())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl MemoryTree {
    /// Create a standalone tree with its own event queue
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self::with_parts(mode, Rc::new(Cell::new(0)), None, FaultPlan::none())
    }

    fn with_parts(
        mode: Mode,
        events: Rc<Cell<usize>>,
        cost: Option<CostModel>,
        faults: FaultPlan,
    ) -> Self {
        Self {
            mode,
            nodes: Vec::new(),
            top: Vec::new(),
            materializer: None,
            populating: None,
            redraw_depth: 0,
            events,
            cost,
            faults,
            creations: 0,
            populate_count: 0,
            live: 0,
            top_item: None,
            disposed: false,
        }
    }

    /// Inject failures into subsequent node creations
    #[must_use]
    pub const fn with_fault_plan(mut self, faults: FaultPlan) -> Self {
        self.faults = faults;
        self
    }

    /// Number of live realized nodes
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.live
    }

    /// Number of populate signals fired
    #[must_use]
    pub const fn populate_count(&self) -> usize {
        self.populate_count
    }

    /// Number of node creations attempted
    #[must_use]
    pub const fn creations(&self) -> usize {
        self.creations
    }

    /// Current redraw suppression depth
    #[must_use]
    pub const fn redraw_depth(&self) -> usize {
        self.redraw_depth
    }

    /// Node last scrolled into view
    #[must_use]
    pub const fn top_item(&self) -> Option<NodeId> {
        self.top_item
    }

    /// Repaints queued and not yet processed
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.get()
    }

    /// Display attributes of a node
    pub fn attributes(&self, node: NodeId) -> HierarchyResult<NodeAttributes> {
        Ok(self.record(node)?.attributes.clone())
    }

    /// Check if a node is expanded
    pub fn is_expanded(&self, node: NodeId) -> HierarchyResult<bool> {
        Ok(self.record(node)?.expanded)
    }

    /// Check if a node has been populated (always true in eager mode)
    pub fn is_materialized(&self, node: NodeId) -> HierarchyResult<bool> {
        Ok(self.record(node)?.materialized)
    }

    /// Parent and index of a node
    pub fn position(&self, node: NodeId) -> HierarchyResult<(Option<NodeId>, usize)> {
        let record = self.record(node)?;
        Ok((record.parent, record.index))
    }

    fn ensure_live(&self) -> HierarchyResult<()> {
        if self.disposed {
            Err(HierarchyError::Disposed)
        } else {
            Ok(())
        }
    }

    fn record(&self, node: NodeId) -> HierarchyResult<&NodeRecord> {
        self.ensure_live()?;
        self.nodes
            .get(node.0)
            .filter(|record| record.live)
            .ok_or(HierarchyError::UnknownNode { node })
    }

    fn record_mut(&mut self, node: NodeId) -> HierarchyResult<&mut NodeRecord> {
        self.ensure_live()?;
        self.nodes
            .get_mut(node.0)
            .filter(|record| record.live)
            .ok_or(HierarchyError::UnknownNode { node })
    }

    fn slots(&self, parent: Option<NodeId>) -> HierarchyResult<&Vec<Option<NodeId>>> {
        match parent {
            Some(node) => Ok(&self.record(node)?.children),
            None => {
                self.ensure_live()?;
                Ok(&self.top)
            }
        }
    }

    fn slots_mut(&mut self, parent: Option<NodeId>) -> HierarchyResult<&mut Vec<Option<NodeId>>> {
        match parent {
            Some(node) => Ok(&mut self.record_mut(node)?.children),
            None => {
                self.ensure_live()?;
                Ok(&mut self.top)
            }
        }
    }

    fn charge(&self, pick: fn(&CostModel) -> Duration, times: usize) {
        if let Some(cost) = &self.cost {
            cost.charge(pick(cost), times);
        }
    }

    fn allocate(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        materialized: bool,
    ) -> HierarchyResult<NodeId> {
        self.creations += 1;
        if self.faults.fail_creation == Some(self.creations) {
            return Err(HierarchyError::Injected {
                message: format!("node creation #{} failed", self.creations),
            });
        }
        self.charge(|c| c.create, 1);

        let node = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord::new(parent, index, materialized));
        self.live += 1;
        Ok(node)
    }

    fn release_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(record) = self.nodes.get_mut(current.0) else {
                continue;
            };
            if !record.live {
                continue;
            }
            record.live = false;
            stack.extend(record.children.drain(..).flatten());
            self.live -= 1;
            if self.top_item == Some(current) {
                self.top_item = None;
            }
        }
    }

    fn populate(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        index: usize,
    ) -> HierarchyResult<NodeId> {
        if self.populating.is_some() {
            return Err(HierarchyError::ReentrantPopulate { node });
        }
        self.record_mut(node)?.materialized = true;
        self.populate_count += 1;
        self.charge(|c| c.populate, 1);

        let Some(mut materializer) = self.materializer.take() else {
            return Ok(node);
        };
        self.populating = Some(node);
        let tree: &mut dyn Hierarchy = &mut *self;
        let result = materializer(tree, PopulateRequest { node, parent, index });
        self.populating = None;
        if self.materializer.is_none() {
            self.materializer = Some(materializer);
        }
        result.map(|()| node)
    }
}

impl Hierarchy for MemoryTree {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_item_count(&mut self, parent: Option<NodeId>, count: usize) -> HierarchyResult<()> {
        let current = self.slots(parent)?.len();
        if count < current {
            let removed: Vec<NodeId> = self
                .slots_mut(parent)?
                .drain(count..)
                .flatten()
                .collect();
            for node in removed {
                self.release_subtree(node);
            }
            return Ok(());
        }

        for index in current..count {
            let slot = if self.mode.is_virtual() {
                None
            } else {
                Some(self.allocate(parent, index, true)?)
            };
            self.slots_mut(parent)?.push(slot);
        }
        Ok(())
    }

    fn item_count(&self, parent: Option<NodeId>) -> HierarchyResult<usize> {
        Ok(self.slots(parent)?.len())
    }

    fn add_item(&mut self, parent: Option<NodeId>) -> HierarchyResult<NodeId> {
        let index = self.slots(parent)?.len();
        let node = self.allocate(parent, index, true)?;
        self.slots_mut(parent)?.push(Some(node));
        Ok(node)
    }

    fn item(&mut self, parent: Option<NodeId>, index: usize) -> HierarchyResult<NodeId> {
        let slots = self.slots(parent)?;
        let slot = match slots.get(index) {
            Some(slot) => *slot,
            None => {
                return Err(HierarchyError::IndexOutOfRange {
                    parent: Parent(parent),
                    index,
                    count: slots.len(),
                })
            }
        };

        match slot {
            Some(node) => {
                if self.record(node)?.materialized {
                    self.charge(|c| c.access, 1);
                    Ok(node)
                } else {
                    self.populate(node, parent, index)
                }
            }
            None => {
                let node = self.allocate(parent, index, false)?;
                if let Some(slot) = self.slots_mut(parent)?.get_mut(index) {
                    *slot = Some(node);
                }
                self.populate(node, parent, index)
            }
        }
    }

    fn set_materializer(&mut self, materializer: Materializer) {
        self.materializer = Some(materializer);
    }

    fn set_redraw(&mut self, enabled: bool) {
        if !enabled {
            self.redraw_depth += 1;
            return;
        }
        if self.redraw_depth > 0 {
            self.redraw_depth -= 1;
            if self.redraw_depth == 0 && !self.disposed {
                self.events.set(self.events.get() + 1);
            }
        }
    }

    fn set_label(&mut self, node: NodeId, label: &str) -> HierarchyResult<()> {
        label.clone_into(&mut self.record_mut(node)?.attributes.label);
        self.charge(|c| c.attribute, 1);
        Ok(())
    }

    fn label(&self, node: NodeId) -> HierarchyResult<String> {
        Ok(self.record(node)?.attributes.label.clone())
    }

    fn set_foreground(&mut self, node: NodeId, color: Color) -> HierarchyResult<()> {
        self.record_mut(node)?.attributes.foreground = Some(color);
        self.charge(|c| c.attribute, 1);
        Ok(())
    }

    fn set_background(&mut self, node: NodeId, color: Color) -> HierarchyResult<()> {
        self.record_mut(node)?.attributes.background = Some(color);
        self.charge(|c| c.attribute, 1);
        Ok(())
    }

    fn set_font(&mut self, node: NodeId, font: Font) -> HierarchyResult<()> {
        self.record_mut(node)?.attributes.font = Some(font);
        self.charge(|c| c.attribute, 1);
        Ok(())
    }

    fn set_remaining_child_count(&mut self, node: NodeId, count: usize) -> HierarchyResult<()> {
        self.record_mut(node)?.remaining = Some(count);
        Ok(())
    }

    fn remaining_child_count(&self, node: NodeId) -> HierarchyResult<Option<usize>> {
        Ok(self.record(node)?.remaining)
    }

    fn show_item(&mut self, node: NodeId) -> HierarchyResult<()> {
        let mut ancestor = self.record(node)?.parent;
        while let Some(current) = ancestor {
            let record = self.record_mut(current)?;
            record.expanded = true;
            ancestor = record.parent;
            self.charge(|c| c.access, 1);
        }
        self.top_item = Some(node);
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.charge(|c| c.dispose, self.live);
        tracing::trace!(nodes = self.live, "disposing memory tree");
        self.nodes.clear();
        self.top.clear();
        self.materializer = None;
        self.top_item = None;
        self.live = 0;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Environment creating [`MemoryTree`]s that share one repaint queue
#[derive(Debug)]
pub struct MemoryEnvironment {
    events: Rc<Cell<usize>>,
    processed: usize,
    trees_created: usize,
    cost: Option<CostModel>,
    faults: FaultPlan,
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEnvironment {
    /// Create an environment without simulated costs
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Rc::new(Cell::new(0)),
            processed: 0,
            trees_created: 0,
            cost: None,
            faults: FaultPlan::none(),
        }
    }

    /// Charge simulated costs to a fake clock
    #[must_use]
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Inject failures into every tree created afterwards
    #[must_use]
    pub const fn with_fault_plan(mut self, faults: FaultPlan) -> Self {
        self.faults = faults;
        self
    }

    /// Replace the fault plan for trees created afterwards
    pub fn set_fault_plan(&mut self, faults: FaultPlan) {
        self.faults = faults;
    }

    /// Repaints queued and not yet processed
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.get()
    }

    /// Total events processed so far
    #[must_use]
    pub const fn processed_events(&self) -> usize {
        self.processed
    }

    /// Number of trees created so far
    #[must_use]
    pub const fn trees_created(&self) -> usize {
        self.trees_created
    }
}

impl Environment for MemoryEnvironment {
    type Tree = MemoryTree;

    fn create_tree(&mut self, mode: Mode) -> HierarchyResult<MemoryTree> {
        self.trees_created += 1;
        Ok(MemoryTree::with_parts(
            mode,
            Rc::clone(&self.events),
            self.cost.clone(),
            self.faults,
        ))
    }

    fn process_events(&mut self) -> usize {
        let drained = self.events.replace(0);
        if let Some(cost) = &self.cost {
            cost.charge(cost.repaint, drained);
        }
        self.processed += drained;
        drained
    }
}
