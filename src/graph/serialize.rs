//! Persisted diagram format and the serialize/load round trip.
//!
//! Nodes are written in collection order and links refer to them by array
//! index, so ids never leak into storage. Loading validates the whole
//! document before touching the current diagram.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Flowchart;
use crate::error::MalformedDiagram;
use crate::model::{DiagramConfig, NodeId, NodeType, OutputPort, PortIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDiagram {
    #[serde(default = "default_editable")]
    pub editable: bool,
    pub nodes: Vec<SerializedNode>,
    pub links: Vec<SerializedLink>,
}

fn default_editable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    #[serde(rename = "type")]
    pub node_type: u8,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLink {
    /// Index into `nodes`.
    pub from: usize,
    /// Index into `nodes`.
    pub to: usize,
    /// Output port the link leaves from (1 or 2).
    #[serde(rename = "type")]
    pub link_type: u8,
}

/// A link whose indices and ports have been checked against the node list.
struct CheckedLink {
    from: usize,
    port: OutputPort,
    to: usize,
}

impl Flowchart {
    /// Build a diagram straight from serialized data.
    pub fn from_serialized(
        cfg: DiagramConfig,
        data: &SerializedDiagram,
    ) -> Result<Self, MalformedDiagram> {
        let mut fc = Flowchart::new(cfg);
        fc.load(data)?;
        Ok(fc)
    }

    pub fn serialize(&self) -> SerializedDiagram {
        let index: HashMap<NodeId, usize> =
            self.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let nodes = self
            .nodes
            .iter()
            .map(|n| SerializedNode {
                node_type: n.node_type().code(),
                x: n.x,
                y: n.y,
                text: n.text.clone(),
            })
            .collect();

        let links = self
            .links
            .iter()
            .filter_map(|l| {
                Some(SerializedLink {
                    from: *index.get(&l.from)?,
                    to: *index.get(&l.to)?,
                    link_type: l.from_port.code(),
                })
            })
            .collect();

        SerializedDiagram { editable: self.editable, nodes, links }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.serialize())
    }

    /// Replace the whole diagram with `data`.
    ///
    /// Existing nodes, links, selection and any pending connection are
    /// discarded. On error nothing changes.
    pub fn load(&mut self, data: &SerializedDiagram) -> Result<(), MalformedDiagram> {
        let (types, links) = match validate(data) {
            Ok(checked) => checked,
            Err(e) => {
                warn!(error = %e, "rejecting diagram");
                return Err(e);
            }
        };

        self.nodes.clear();
        self.links.clear();
        self.pending = None;
        self.captured.clear();
        self.selected.clear();
        self.editable = data.editable;

        let ids: Vec<NodeId> = data
            .nodes
            .iter()
            .zip(types)
            .map(|(n, t)| self.add_node(t, n.text.clone(), n.x, n.y))
            .collect();

        for l in &links {
            self.insert_link(ids[l.from], l.port, ids[l.to]);
        }

        debug!(nodes = self.nodes.len(), links = self.links.len(), "diagram loaded");
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), MalformedDiagram> {
        let data: SerializedDiagram = serde_json::from_str(json)?;
        self.load(&data)
    }
}

fn validate(data: &SerializedDiagram) -> Result<(Vec<NodeType>, Vec<CheckedLink>), MalformedDiagram> {
    let types = data
        .nodes
        .iter()
        .enumerate()
        .map(|(index, n)| {
            NodeType::from_code(n.node_type)
                .ok_or(MalformedDiagram::UnknownNodeType { index, code: n.node_type })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = types.len();
    let links = data
        .links
        .iter()
        .enumerate()
        .map(|(link, l)| {
            for node in [l.from, l.to] {
                if node >= count {
                    return Err(MalformedDiagram::NodeIndexOutOfRange { link, node, count });
                }
            }
            let port = OutputPort::from_code(l.link_type)
                .ok_or(MalformedDiagram::InvalidLinkType { link, code: l.link_type })?;
            for (node, needed) in [(l.from, port.port()), (l.to, PortIndex::Input)] {
                if !types[node].has_port(needed) {
                    return Err(MalformedDiagram::MissingPort {
                        link,
                        node,
                        node_type: types[node].as_str(),
                        port: needed.index(),
                    });
                }
            }
            Ok(CheckedLink { from: l.from, port, to: l.to })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((types, links))
}
