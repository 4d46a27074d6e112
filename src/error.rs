use thiserror::Error;

/// Reasons a serialized diagram is rejected by `Flowchart::load`.
///
/// A rejected load never touches the current diagram.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedDiagram {
    #[error("Failed to parse diagram JSON: {0}")]
    InvalidJson(String),

    #[error("Node {index} has unknown type code {code}")]
    UnknownNodeType { index: usize, code: u8 },

    #[error("Link {link} references node {node}, but the diagram only has {count} nodes")]
    NodeIndexOutOfRange { link: usize, node: usize, count: usize },

    #[error("Link {link} has invalid type {code} (expected 1 or 2)")]
    InvalidLinkType { link: usize, code: u8 },

    #[error("Link {link} uses port {port} of node {node} ({node_type}), which has no such port")]
    MissingPort {
        link: usize,
        node: usize,
        node_type: &'static str,
        port: u8,
    },
}

impl From<serde_json::Error> for MalformedDiagram {
    fn from(err: serde_json::Error) -> Self {
        MalformedDiagram::InvalidJson(err.to_string())
    }
}
