//! Output types for the rendering frontend.
//!
//! These structs are serialized to JSON and handed to the UI layer, which
//! draws them as SVG. Every value here is derived from the current graph
//! state on each call; nothing is cached between renders.

use serde::Serialize;

use crate::geometry::{Facing, Outline};
use crate::graph::{Flowchart, Tool};
use crate::model::{LinkId, NodeId, Point, SizeF};
use crate::routing::svg_path;

/// A node ready for the frontend to draw
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutput {
    pub id: NodeId,
    /// "action", "input", "output", "condition", "start" or "end"
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub text: String,
    pub center: Point,
    pub captured: bool,
    pub selected: bool,
    pub outline: Outline,
    /// SVG `points` attribute, only for polygon outlines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    pub ports: Vec<PortOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortOutput {
    pub index: u8,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    /// Whether this port is the pending end of an unfinished connection
    pub active: bool,
}

/// A link between two nodes
#[derive(Debug, Clone, Serialize)]
pub struct LinkOutput {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Output port the link leaves from (1 or 2)
    #[serde(rename = "type")]
    pub link_type: u8,
    /// SVG path data
    pub path: String,
}

/// Error information for the frontend
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
}

/// The combined output sent to the frontend
#[derive(Debug, Clone, Serialize)]
pub struct DiagramOutput {
    pub editable: bool,
    pub tool: Tool,
    pub view_box: SizeF,
    pub nodes: Vec<NodeOutput>,
    pub links: Vec<LinkOutput>,
}

impl Flowchart {
    pub fn render(&self) -> DiagramOutput {
        let cfg = self.config();
        let pending = self.pending_connection();

        let nodes = self
            .nodes()
            .iter()
            .map(|n| {
                let outline = n.outline(cfg);
                let ports = n
                    .node_type()
                    .ports()
                    .filter_map(|p| {
                        let anchor = n.port_anchor(p, cfg)?;
                        Some(PortOutput {
                            index: p.index(),
                            x: anchor.point.x,
                            y: anchor.point.y,
                            facing: anchor.facing,
                            active: pending.is_some_and(|r| r.node == n.id && r.port == p),
                        })
                    })
                    .collect();
                NodeOutput {
                    id: n.id,
                    node_type: n.node_type().as_str(),
                    text: n.text.clone(),
                    center: n.center(),
                    captured: n.captured,
                    selected: self.is_selected(n.id),
                    points: outline.svg_points(),
                    outline,
                    ports,
                }
            })
            .collect();

        let links = self
            .links()
            .iter()
            .map(|l| LinkOutput {
                id: l.id,
                from: l.from,
                to: l.to,
                link_type: l.from_port.code(),
                path: svg_path(&l.segments),
            })
            .collect();

        DiagramOutput {
            editable: self.is_editable(),
            tool: self.tool(),
            view_box: cfg.view_box,
            nodes,
            links,
        }
    }
}
