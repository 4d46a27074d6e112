// Flowchart graph controller.
//
// Owns the node and link collections and is the only thing that mutates
// them. Everything the UI sees goes through here:
// - direct operations (add/move/delete node, connect, drag the capture set)
// - the pointer-event state machine (interaction.rs)
// - serialize/load (serialize.rs)
//
// Invariants kept by every mutator:
// - a link always runs from an output port (1 or 2) to an input port (0)
// - at most one link leaves any (node, output port) pair
// - no link refers to a node that is not in `nodes`
// - the pending connection, capture set and selection only name live nodes
//
// Mutators report what they did as a list of `Change`s so the rendering
// side can update just the affected elements.

use serde::Serialize;
use tracing::{debug, trace};

use crate::model::{
    DiagramConfig, Link, LinkId, Node, NodeId, NodeType, OutputPort, PortIndex, PortRef,
};
use crate::routing::{self, Segment};

mod interaction;
mod serialize;

pub use interaction::{PointerEvent, Tool};
pub use serialize::{SerializedDiagram, SerializedLink, SerializedNode};

/// A single observable effect of a controller operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    NodeAdded { node: NodeId },
    NodeMoved { node: NodeId },
    NodeRemoved { node: NodeId },
    NodeCaptured { node: NodeId },
    NodeReleased { node: NodeId },
    SelectionChanged,
    LinkAdded { link: LinkId },
    LinkRerouted { link: LinkId },
    LinkRemoved { link: LinkId },
    PortActivated { node: NodeId, port: PortIndex },
    PortDeactivated { node: NodeId, port: PortIndex },
    ToolChanged { tool: Tool },
}

#[derive(Debug, Clone)]
pub struct Flowchart {
    cfg: DiagramConfig,
    editable: bool,
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_node_id: u32,
    next_link_id: u32,
    tool: Tool,
    /// First endpoint of a half-made link.
    pending: Option<PortRef>,
    /// Nodes currently being dragged.
    captured: Vec<NodeId>,
    selected: Vec<NodeId>,
    /// Canvas pixels to model units.
    scale: f64,
}

impl Default for Flowchart {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

impl Flowchart {
    pub fn new(cfg: DiagramConfig) -> Self {
        Self {
            cfg,
            editable: true,
            nodes: Vec::new(),
            links: Vec::new(),
            next_node_id: 0,
            next_link_id: 0,
            tool: Tool::Select,
            pending: None,
            captured: Vec::new(),
            selected: Vec::new(),
            scale: 1.0,
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.cfg
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Links with `node` at either end.
    pub fn links_touching(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.touches(node))
    }

    pub fn captured(&self) -> &[NodeId] {
        &self.captured
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn pending_connection(&self) -> Option<PortRef> {
        self.pending
    }

    /// Add a node centered at (x, y) and return its id.
    pub fn add_node(&mut self, node_type: NodeType, text: impl Into<String>, x: f64, y: f64) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let mut node = Node::new(id, node_type, text);
        node.move_to(x, y);
        debug!(node = id.0, node_type = node_type.as_str(), x, y, "node added");
        self.nodes.push(node);
        id
    }

    pub fn set_node_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Move a node to an absolute position and reroute its links.
    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> Vec<Change> {
        let Some(node) = self.node_mut(id) else {
            return Vec::new();
        };
        node.move_to(x, y);
        let mut changes = vec![Change::NodeMoved { node: id }];
        changes.extend(self.reroute_links_touching(&[id]));
        changes
    }

    /// Move every captured node by (dx, dy) model units and reroute their links.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> Vec<Change> {
        if self.captured.is_empty() {
            return Vec::new();
        }
        let moved = self.captured.clone();
        let mut changes = Vec::with_capacity(moved.len());
        for &id in &moved {
            if let Some(node) = self.node_mut(id) {
                node.move_by(dx, dy);
                changes.push(Change::NodeMoved { node: id });
            }
        }
        changes.extend(self.reroute_links_touching(&moved));
        changes
    }

    /// Delete a node together with every link touching it.
    ///
    /// START and END nodes are never deleted. A pending connection on the
    /// node is dropped, and the node leaves the capture set and selection.
    pub fn delete_node(&mut self, id: NodeId) -> Vec<Change> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        if !node.node_type().is_deletable() {
            debug!(node = id.0, "refusing to delete start/end node");
            return Vec::new();
        }

        let mut changes = self.remove_links_where(|l| l.touches(id));

        if let Some(p) = self.pending.filter(|p| p.node == id) {
            self.pending = None;
            changes.push(Change::PortDeactivated { node: p.node, port: p.port });
        }
        self.captured.retain(|n| *n != id);
        if self.selected.contains(&id) {
            self.selected.retain(|n| *n != id);
            changes.push(Change::SelectionChanged);
        }

        self.nodes.retain(|n| n.id != id);
        debug!(node = id.0, "node deleted");
        changes.push(Change::NodeRemoved { node: id });
        changes
    }

    /// Link two ports. One must be an input and the other an output; the
    /// order they are given in does not matter. Returns no changes when the
    /// pair cannot form a link.
    pub fn connect(&mut self, a: PortRef, b: PortRef) -> Vec<Change> {
        if !self.port_exists(a) || !self.port_exists(b) {
            return Vec::new();
        }
        match resolve_direction(a, b) {
            Some((from, port, to)) => self.insert_link(from, port, to).1,
            None => {
                debug!(?a, ?b, "ports cannot be linked in either direction");
                Vec::new()
            }
        }
    }

    /// Remove the links attached to a port: every incoming link for the
    /// input port, or the single outgoing link for an output port.
    pub fn cut_port(&mut self, port: PortRef) -> Vec<Change> {
        let changes = self.remove_links_where(|l| l.attached_to(port));
        debug!(node = port.node.0, port = port.port.index(), removed = changes.len(), "port cut");
        changes
    }

    pub fn port_exists(&self, port: PortRef) -> bool {
        self.node(port.node).is_some_and(|n| n.has_port(port.port))
    }

    pub fn clear_selection(&mut self) -> Vec<Change> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        self.selected.clear();
        vec![Change::SelectionChanged]
    }

    /// Insert a link, replacing whatever already leaves `(from, port)`.
    fn insert_link(&mut self, from: NodeId, port: OutputPort, to: NodeId) -> (LinkId, Vec<Change>) {
        let source = PortRef { node: from, port: port.port() };
        let mut changes = self.remove_links_where(|l| l.source() == source);

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        let mut link = Link::new(id, from, port, to);
        link.segments = self.compute_route(from, port, to);
        debug!(link = id.0, from = from.0, port = port.code(), to = to.0, "link added");
        self.links.push(link);

        changes.push(Change::LinkAdded { link: id });
        (id, changes)
    }

    fn remove_links_where(&mut self, pred: impl Fn(&Link) -> bool) -> Vec<Change> {
        let mut removed = Vec::new();
        self.links.retain(|l| {
            if pred(l) {
                removed.push(Change::LinkRemoved { link: l.id });
                false
            } else {
                true
            }
        });
        removed
    }

    fn compute_route(&self, from: NodeId, port: OutputPort, to: NodeId) -> Vec<Segment> {
        let start = self.node(from).and_then(|n| n.port_anchor(port.port(), &self.cfg));
        let end = self.node(to).and_then(|n| n.port_anchor(PortIndex::Input, &self.cfg));
        match start.zip(end) {
            Some((a, b)) => routing::compute_segments(a, b, &self.cfg),
            None => Vec::new(),
        }
    }

    fn reroute_links_touching(&mut self, moved: &[NodeId]) -> Vec<Change> {
        let mut changes = Vec::new();
        for i in 0..self.links.len() {
            let (id, from, port, to) = {
                let l = &self.links[i];
                (l.id, l.from, l.from_port, l.to)
            };
            if !moved.iter().any(|n| *n == from || *n == to) {
                continue;
            }
            self.links[i].segments = self.compute_route(from, port, to);
            trace!(link = id.0, "link rerouted");
            changes.push(Change::LinkRerouted { link: id });
        }
        changes
    }
}

/// Orient a pair of pressed ports as (output node, output port, input node).
fn resolve_direction(a: PortRef, b: PortRef) -> Option<(NodeId, OutputPort, NodeId)> {
    match (a.port.as_output(), b.port.as_output()) {
        (Some(out), None) => Some((a.node, out, b.node)),
        (None, Some(out)) => Some((b.node, out, a.node)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn port(node: NodeId, index: u8) -> PortRef {
        PortRef { node, port: PortIndex::from_index(index).unwrap() }
    }

    #[test]
    fn test_connect_either_order() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "a", 100.0, 40.0);
        let b = fc.add_node(NodeType::Action, "b", 100.0, 100.0);

        fc.connect(port(b, 0), port(a, 1));
        assert_eq!(fc.links().len(), 1);
        let l = &fc.links()[0];
        assert_eq!(l.from, a);
        assert_eq!(l.to, b);
        assert_eq!(l.from_port, OutputPort::Primary);
        assert_eq!(l.to_port(), PortIndex::Input);
    }

    #[test]
    fn test_connect_same_direction_rejected() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 0.0, 0.0);
        let b = fc.add_node(NodeType::Action, "", 0.0, 50.0);
        assert!(fc.connect(port(a, 1), port(b, 1)).is_empty());
        assert!(fc.connect(port(a, 0), port(b, 0)).is_empty());
        assert!(fc.links().is_empty());
    }

    #[test]
    fn test_connect_missing_port_rejected() {
        let mut fc = Flowchart::default();
        let s = fc.add_node(NodeType::Start, "", 0.0, 0.0);
        let e = fc.add_node(NodeType::End, "", 0.0, 50.0);
        assert!(fc.connect(port(e, 1), port(s, 0)).is_empty());
        assert!(fc.connect(port(s, 2), port(e, 0)).is_empty());
        assert_eq!(fc.connect(port(s, 1), port(e, 0)).len(), 1);
    }

    #[test]
    fn test_output_port_replaces_previous_link() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 100.0, 40.0);
        let b = fc.add_node(NodeType::Action, "", 60.0, 100.0);
        let c = fc.add_node(NodeType::Action, "", 140.0, 100.0);

        fc.connect(port(a, 1), port(b, 0));
        let first = fc.links()[0].id;
        let changes = fc.connect(port(a, 1), port(c, 0));

        assert_eq!(fc.links().len(), 1);
        assert_eq!(fc.links()[0].to, c);
        assert!(changes.contains(&Change::LinkRemoved { link: first }));
        assert!(fc.link(first).is_none());
        let replacement = fc.links()[0].id;
        assert_eq!(fc.link(replacement).unwrap().source(), PortRef { node: a, port: PortIndex::Primary });
    }

    #[test]
    fn test_fan_in_allowed() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 60.0, 40.0);
        let b = fc.add_node(NodeType::Action, "", 140.0, 40.0);
        let c = fc.add_node(NodeType::Action, "", 100.0, 100.0);
        fc.connect(port(a, 1), port(c, 0));
        fc.connect(port(b, 1), port(c, 0));
        assert_eq!(fc.links().len(), 2);
    }

    #[test]
    fn test_condition_two_outputs_independent() {
        let mut fc = Flowchart::default();
        let cond = fc.add_node(NodeType::Condition, "?", 100.0, 40.0);
        let yes = fc.add_node(NodeType::Action, "", 40.0, 100.0);
        let no = fc.add_node(NodeType::Action, "", 160.0, 100.0);
        fc.connect(port(cond, 1), port(yes, 0));
        fc.connect(port(cond, 2), port(no, 0));
        assert_eq!(fc.links().len(), 2);

        // both outputs may also converge on the same input
        fc.connect(port(cond, 2), port(yes, 0));
        assert_eq!(fc.links().len(), 2);
        assert!(fc.links().iter().all(|l| l.to == yes));
    }

    #[test]
    fn test_delete_cascades_links() {
        let mut fc = Flowchart::default();
        let s = fc.add_node(NodeType::Start, "", 100.0, 20.0);
        let a = fc.add_node(NodeType::Action, "", 100.0, 60.0);
        let e = fc.add_node(NodeType::End, "", 100.0, 100.0);
        fc.connect(port(s, 1), port(a, 0));
        fc.connect(port(a, 1), port(e, 0));

        let changes = fc.delete_node(a);
        assert!(changes.contains(&Change::NodeRemoved { node: a }));
        assert!(fc.node(a).is_none());
        assert!(fc.links().is_empty());
        for l in fc.links() {
            assert!(fc.node(l.from).is_some() && fc.node(l.to).is_some());
        }
    }

    #[test]
    fn test_start_and_end_not_deletable() {
        let mut fc = Flowchart::default();
        let s = fc.add_node(NodeType::Start, "", 0.0, 0.0);
        let e = fc.add_node(NodeType::End, "", 0.0, 50.0);
        fc.connect(port(s, 1), port(e, 0));
        assert!(fc.delete_node(s).is_empty());
        assert!(fc.delete_node(e).is_empty());
        assert_eq!(fc.nodes().len(), 2);
        assert_eq!(fc.links().len(), 1);
    }

    #[test]
    fn test_move_node_reroutes_links() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 100.0, 40.0);
        let b = fc.add_node(NodeType::Action, "", 100.0, 100.0);
        fc.connect(port(a, 1), port(b, 0));

        // right of and below the source: route turns down, across, down
        fc.move_node(b, 150.0, 120.0);
        let incident: Vec<&Link> = fc.links_touching(b).collect();
        assert_eq!(incident.len(), 1);
        let l = incident[0];
        assert_eq!(l.target(), PortRef { node: b, port: PortIndex::Input });
        crate::routing::assert_orthogonal_and_connected(
            &l.segments,
            Point::new(100.0, 50.0),
            Point::new(150.0, 110.0),
        );
        assert_eq!(routing::svg_path(&l.segments), "M 100 50 L 100 105 L 150 105 L 150 110");
    }

    #[test]
    fn test_cut_input_removes_all_incoming() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 60.0, 40.0);
        let b = fc.add_node(NodeType::Action, "", 140.0, 40.0);
        let c = fc.add_node(NodeType::Action, "", 100.0, 100.0);
        fc.connect(port(a, 1), port(c, 0));
        fc.connect(port(b, 1), port(c, 0));
        fc.connect(port(c, 1), port(a, 0));

        assert_eq!(fc.cut_port(port(c, 0)).len(), 2);
        assert_eq!(fc.links().len(), 1);
        assert_eq!(fc.links()[0].from, c);
    }

    #[test]
    fn test_cut_output_removes_only_that_port() {
        let mut fc = Flowchart::default();
        let cond = fc.add_node(NodeType::Condition, "", 100.0, 40.0);
        let yes = fc.add_node(NodeType::Action, "", 40.0, 100.0);
        let no = fc.add_node(NodeType::Action, "", 160.0, 100.0);
        fc.connect(port(cond, 1), port(yes, 0));
        fc.connect(port(cond, 2), port(no, 0));

        assert_eq!(fc.cut_port(port(cond, 2)).len(), 1);
        assert_eq!(fc.links().len(), 1);
        assert_eq!(fc.links()[0].from_port, OutputPort::Primary);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut fc = Flowchart::default();
        let a = fc.add_node(NodeType::Action, "", 0.0, 0.0);
        fc.delete_node(a);
        let b = fc.add_node(NodeType::Action, "", 0.0, 0.0);
        assert_ne!(a, b);
    }
}
