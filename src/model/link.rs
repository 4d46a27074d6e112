use super::{LinkId, NodeId, OutputPort, PortIndex, PortRef};
use crate::routing::Segment;

/// A directed edge from an output port to another node's input port.
///
/// The link only refers to its endpoints by id; the owning `Flowchart`
/// removes it before either endpoint node goes away. `segments` is the last
/// route computed for the current endpoint positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub from_port: OutputPort,
    pub to: NodeId,
    pub segments: Vec<Segment>,
}

impl Link {
    pub fn new(id: LinkId, from: NodeId, from_port: OutputPort, to: NodeId) -> Self {
        Self {
            id,
            from,
            from_port,
            to,
            segments: Vec::new(),
        }
    }

    /// Links always land on the input port.
    pub fn to_port(&self) -> PortIndex {
        PortIndex::Input
    }

    pub fn source(&self) -> PortRef {
        PortRef { node: self.from, port: self.from_port.port() }
    }

    pub fn target(&self) -> PortRef {
        PortRef { node: self.to, port: PortIndex::Input }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// Whether this link is attached to the given port, in the direction the port implies.
    pub fn attached_to(&self, port: PortRef) -> bool {
        match port.port {
            PortIndex::Input => self.target() == port,
            PortIndex::Primary | PortIndex::Alternate => self.source() == port,
        }
    }
}
