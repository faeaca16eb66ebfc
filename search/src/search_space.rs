//! Per-state search nodes and the node status machine.
//!
//! The search space is a dense `StateId → node` table that grows with the
//! state registry. Parent edges are `(StateId, OperatorId)` pairs, never
//! pointers, so the only cycle in the ownership graph is the logical
//! predecessor relation inside the id arrays.
//!
//! Status transitions are validated with asserts: an illegal transition is
//! a programming error in the search loop, not a recoverable condition.
//!
//! ```text
//! New        --open_initial/open-->  Open
//! Open       --close-->              Closed
//! New|Open   --mark_dead_end-->      DeadEnd
//! Closed     --reopen-->             Open
//! Open|Closed --update_parent-->     (unchanged; metadata only)
//! ```

use foray_task::task::OperatorId;

use crate::state_registry::StateId;

/// Lifecycle status of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Never inserted into the open list.
    New,
    /// Inserted, awaiting expansion.
    Open,
    /// Expanded.
    Closed,
    /// Known unreachable-to-goal; terminal.
    DeadEnd,
}

/// The mutable per-state record.
#[derive(Debug, Clone, Copy)]
pub struct NodeInfo {
    pub status: NodeStatus,
    /// Path cost under the adjusted cost function.
    pub g: i32,
    /// Path cost under original costs; checked against the bound.
    pub real_g: i32,
    /// Creating edge: predecessor state and the operator that reached us.
    pub parent: Option<(StateId, OperatorId)>,
}

impl NodeInfo {
    const fn new() -> Self {
        Self {
            status: NodeStatus::New,
            g: -1,
            real_g: -1,
            parent: None,
        }
    }
}

/// Dense `StateId → NodeInfo` table.
#[derive(Debug, Default)]
pub struct SearchSpace {
    infos: Vec<NodeInfo>,
}

impl SearchSpace {
    #[must_use]
    pub fn new() -> Self {
        Self { infos: Vec::new() }
    }

    /// Mutable handle for the node of `id`, creating it as `New` on first
    /// access.
    pub fn node(&mut self, id: StateId) -> SearchNode<'_> {
        if id.index() >= self.infos.len() {
            self.infos.resize(id.index() + 1, NodeInfo::new());
        }
        SearchNode {
            id,
            info: &mut self.infos[id.index()],
        }
    }

    /// Read-only copy of the node record (`New` if never touched).
    #[must_use]
    pub fn info(&self, id: StateId) -> NodeInfo {
        self.infos
            .get(id.index())
            .copied()
            .unwrap_or_else(NodeInfo::new)
    }

    /// Walk parent edges from `goal` back to the root and return the
    /// operator sequence in execution order.
    ///
    /// With reopening disabled and an inconsistent heuristic the stored
    /// g-value and this traced path may diverge; callers that report costs
    /// must recompute them from the returned sequence.
    #[must_use]
    pub fn trace_path(&self, goal: StateId) -> Vec<OperatorId> {
        let mut plan = Vec::new();
        let mut current = goal;
        while let Some((parent, op)) = self.info(current).parent {
            plan.push(op);
            current = parent;
        }
        plan.reverse();
        plan
    }

    /// Number of node records allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// Mutable handle for one node, enforcing the status machine.
pub struct SearchNode<'a> {
    id: StateId,
    info: &'a mut NodeInfo,
}

impl SearchNode<'_> {
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> NodeStatus {
        self.info.status
    }

    #[must_use]
    pub fn g(&self) -> i32 {
        self.info.g
    }

    #[must_use]
    pub fn real_g(&self) -> i32 {
        self.info.real_g
    }

    #[must_use]
    pub fn parent(&self) -> Option<(StateId, OperatorId)> {
        self.info.parent
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.info.status == NodeStatus::New
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.info.status == NodeStatus::Open
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.info.status == NodeStatus::Closed
    }

    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.info.status == NodeStatus::DeadEnd
    }

    /// Open the root node with `g = real_g = 0` and no parent.
    pub fn open_initial(&mut self) {
        assert!(
            self.is_new(),
            "open_initial on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.info.status = NodeStatus::Open;
        self.info.g = 0;
        self.info.real_g = 0;
        self.info.parent = None;
    }

    /// Open a new node reached via `(parent, op)`.
    pub fn open(&mut self, parent: (StateId, OperatorId), g: i32, real_g: i32) {
        assert!(
            self.is_new(),
            "open on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.info.status = NodeStatus::Open;
        self.set_edge(parent, g, real_g);
    }

    /// Return a closed (or still open) node to the open list with a cheaper
    /// path.
    pub fn reopen(&mut self, parent: (StateId, OperatorId), g: i32, real_g: i32) {
        assert!(
            self.is_open() || self.is_closed(),
            "reopen on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.info.status = NodeStatus::Open;
        self.set_edge(parent, g, real_g);
    }

    /// Record a cheaper path without reinserting (reopening disabled).
    ///
    /// The node's g-value changes while any open-list entries keep their old
    /// keys; the traced path and g may diverge from here on.
    pub fn update_parent(&mut self, parent: (StateId, OperatorId), g: i32, real_g: i32) {
        assert!(
            self.is_open() || self.is_closed(),
            "update_parent on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.set_edge(parent, g, real_g);
    }

    pub fn close(&mut self) {
        assert!(
            self.is_open(),
            "close on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.info.status = NodeStatus::Closed;
    }

    /// Terminal transition; dead ends are never reopened or expanded.
    pub fn mark_dead_end(&mut self) {
        assert!(
            self.is_new() || self.is_open(),
            "mark_dead_end on node {} with status {:?}",
            self.id,
            self.info.status
        );
        self.info.status = NodeStatus::DeadEnd;
    }

    fn set_edge(&mut self, parent: (StateId, OperatorId), g: i32, real_g: i32) {
        debug_assert!(g >= 0 && real_g >= 0);
        self.info.g = g;
        self.info.real_g = real_g;
        self.info.parent = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_start_new() {
        let mut space = SearchSpace::new();
        let sid = crate::state_registry::test_support::state_id(3);
        assert_eq!(space.node(sid).status(), NodeStatus::New);
        assert_eq!(space.len(), 4, "table grows to cover the id");
    }

    #[test]
    fn open_close_lifecycle() {
        let mut space = SearchSpace::new();
        let root = crate::state_registry::test_support::state_id(0);
        let child = crate::state_registry::test_support::state_id(1);

        space.node(root).open_initial();
        assert!(space.node(root).is_open());
        assert_eq!(space.node(root).g(), 0);

        space.node(child).open((root, OperatorId::new(0)), 4, 4);
        space.node(root).close();
        assert!(space.node(root).is_closed());
        assert_eq!(space.node(child).parent(), Some((root, OperatorId::new(0))));
    }

    #[test]
    fn reopen_lowers_g() {
        let mut space = SearchSpace::new();
        let root = crate::state_registry::test_support::state_id(0);
        let child = crate::state_registry::test_support::state_id(1);
        space.node(root).open_initial();
        space.node(child).open((root, OperatorId::new(0)), 5, 5);
        space.node(child).close();
        space.node(child).reopen((root, OperatorId::new(1)), 3, 3);
        assert!(space.node(child).is_open());
        assert_eq!(space.node(child).g(), 3);
    }

    #[test]
    fn trace_path_recovers_the_operator_sequence() {
        let mut space = SearchSpace::new();
        let s0 = crate::state_registry::test_support::state_id(0);
        let s1 = crate::state_registry::test_support::state_id(1);
        let s2 = crate::state_registry::test_support::state_id(2);
        space.node(s0).open_initial();
        space.node(s1).open((s0, OperatorId::new(7)), 1, 1);
        space.node(s2).open((s1, OperatorId::new(9)), 2, 2);
        assert_eq!(
            space.trace_path(s2),
            vec![OperatorId::new(7), OperatorId::new(9)]
        );
        assert_eq!(space.trace_path(s0), Vec::new());
    }

    #[test]
    #[should_panic(expected = "close on node")]
    fn closing_a_new_node_is_fatal() {
        let mut space = SearchSpace::new();
        let sid = crate::state_registry::test_support::state_id(0);
        space.node(sid).close();
    }

    #[test]
    #[should_panic(expected = "mark_dead_end on node")]
    fn dead_end_is_terminal() {
        let mut space = SearchSpace::new();
        let sid = crate::state_registry::test_support::state_id(0);
        space.node(sid).open_initial();
        space.node(sid).mark_dead_end();
        space.node(sid).mark_dead_end();
    }
}
