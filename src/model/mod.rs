// Core data model for the flowchart engine.
//
// - Ids: opaque integer handles assigned at creation, never reused
// - NodeType: the six node kinds with their serialized codes
// - PortIndex / OutputPort: connection points (0 = input, 1/2 = outputs)
// - DiagramConfig: node dimensions, connection stub size, logical view box
//
// Nodes and links live in their own submodules; geometry and routing are
// derived from these values on demand and never stored here.

use serde::{Deserialize, Serialize};

mod link;
mod node;

pub use link::Link;
pub use node::Node;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Action,
    Input,
    Output,
    Condition,
    Start,
    End,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Action,
        NodeType::Input,
        NodeType::Output,
        NodeType::Condition,
        NodeType::Start,
        NodeType::End,
    ];

    /// Integer code used by the serialized diagram format.
    pub fn code(self) -> u8 {
        match self {
            NodeType::Action => 1,
            NodeType::Input => 2,
            NodeType::Output => 3,
            NodeType::Condition => 4,
            NodeType::Start => 5,
            NodeType::End => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<NodeType> {
        NodeType::ALL.iter().copied().find(|t| t.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Action => "action",
            NodeType::Input => "input",
            NodeType::Output => "output",
            NodeType::Condition => "condition",
            NodeType::Start => "start",
            NodeType::End => "end",
        }
    }

    /// START and END anchor the chart and cannot be removed with the delete tool.
    pub fn is_deletable(self) -> bool {
        !matches!(self, NodeType::Start | NodeType::End)
    }

    pub fn has_port(self, port: PortIndex) -> bool {
        match (self, port) {
            (NodeType::Start, PortIndex::Input) => false,
            (NodeType::End, PortIndex::Primary | PortIndex::Alternate) => false,
            (NodeType::Condition, _) => true,
            (_, PortIndex::Alternate) => false,
            _ => true,
        }
    }

    /// Ports in index order, filtered to the ones this type actually has.
    pub fn ports(self) -> impl Iterator<Item = PortIndex> {
        PortIndex::ALL.into_iter().filter(move |p| self.has_port(*p))
    }
}

/// A connection point on a node, identified by its connection index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PortIndex {
    Input,
    Primary,
    Alternate,
}

impl PortIndex {
    pub const ALL: [PortIndex; 3] = [PortIndex::Input, PortIndex::Primary, PortIndex::Alternate];

    pub fn index(self) -> u8 {
        match self {
            PortIndex::Input => 0,
            PortIndex::Primary => 1,
            PortIndex::Alternate => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<PortIndex> {
        match index {
            0 => Some(PortIndex::Input),
            1 => Some(PortIndex::Primary),
            2 => Some(PortIndex::Alternate),
            _ => None,
        }
    }

    /// The output side of this port, or None for the input port.
    pub fn as_output(self) -> Option<OutputPort> {
        match self {
            PortIndex::Input => None,
            PortIndex::Primary => Some(OutputPort::Primary),
            PortIndex::Alternate => Some(OutputPort::Alternate),
        }
    }
}

impl TryFrom<u8> for PortIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PortIndex::from_index(value).ok_or_else(|| format!("invalid port index {}", value))
    }
}

impl From<PortIndex> for u8 {
    fn from(port: PortIndex) -> u8 {
        port.index()
    }
}

/// The two output ports a link may leave from. Doubles as the link type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputPort {
    Primary,
    Alternate,
}

impl OutputPort {
    pub fn code(self) -> u8 {
        self.port().index()
    }

    pub fn from_code(code: u8) -> Option<OutputPort> {
        PortIndex::from_index(code).and_then(PortIndex::as_output)
    }

    pub fn port(self) -> PortIndex {
        match self {
            OutputPort::Primary => PortIndex::Primary,
            OutputPort::Alternate => PortIndex::Alternate,
        }
    }
}

/// A (node, port) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortIndex,
}

#[derive(Debug, Clone)]
pub struct DiagramConfig {
    /// Node bounding box width (W).
    pub node_width: f64,
    /// Node bounding box height (H).
    pub node_height: f64,
    /// Length of the stubs leaving an output and entering an input.
    pub connection_size: f64,
    /// Logical model space; on-screen size only changes the pixel ratio.
    pub view_box: SizeF,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            node_width: 40.0,
            node_height: 20.0,
            connection_size: 5.0,
            view_box: SizeF { w: 300.0, h: 300.0 },
        }
    }
}
