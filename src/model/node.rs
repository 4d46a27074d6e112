//! Node entity: type, label text, center position and capture flag.
//!
//! Outline and port anchors are never stored; they are computed from the
//! current position through the geometry module every time they are asked for.

use super::{DiagramConfig, NodeId, NodeType, Point, PortIndex};
use crate::geometry::{self, Outline, PortAnchor};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    node_type: NodeType,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub captured: bool,
}

impl Node {
    /// A new node sits at the origin until moved.
    pub fn new(id: NodeId, node_type: NodeType, text: impl Into<String>) -> Self {
        Self {
            id,
            node_type,
            text: text.into(),
            x: 0.0,
            y: 0.0,
            captured: false,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.move_to(self.x + dx, self.y + dy);
    }

    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn has_port(&self, port: PortIndex) -> bool {
        self.node_type.has_port(port)
    }

    pub fn outline(&self, cfg: &DiagramConfig) -> Outline {
        geometry::outline(self.node_type, self.x, self.y, cfg)
    }

    /// Anchor of `port`, or None when this node type has no such port.
    pub fn port_anchor(&self, port: PortIndex, cfg: &DiagramConfig) -> Option<PortAnchor> {
        if !self.has_port(port) {
            return None;
        }
        Some(geometry::port_anchor(self.node_type, self.x, self.y, port, cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_at_origin() {
        let n = Node::new(NodeId(0), NodeType::Action, "X");
        assert_eq!(n.center(), Point::new(0.0, 0.0));
        assert!(!n.captured);
        assert_eq!(n.text, "X");
    }

    #[test]
    fn test_move_by_is_relative() {
        let mut n = Node::new(NodeId(0), NodeType::Action, "");
        n.move_to(10.0, 20.0);
        n.move_by(5.0, -5.0);
        assert_eq!(n.center(), Point::new(15.0, 15.0));
    }

    #[test]
    fn test_anchor_follows_position() {
        let cfg = DiagramConfig::default();
        let mut n = Node::new(NodeId(0), NodeType::Action, "");
        n.move_to(100.0, 40.0);
        let a = n.port_anchor(PortIndex::Primary, &cfg).unwrap();
        assert_eq!(a.point, Point::new(100.0, 50.0));
        n.move_by(10.0, 0.0);
        let a = n.port_anchor(PortIndex::Primary, &cfg).unwrap();
        assert_eq!(a.point, Point::new(110.0, 50.0));
    }

    #[test]
    fn test_missing_port_has_no_anchor() {
        let cfg = DiagramConfig::default();
        let start = Node::new(NodeId(0), NodeType::Start, "");
        assert!(start.port_anchor(PortIndex::Input, &cfg).is_none());
        let end = Node::new(NodeId(1), NodeType::End, "");
        assert!(end.port_anchor(PortIndex::Primary, &cfg).is_none());
    }
}
