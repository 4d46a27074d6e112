//! Pointer-driven editing: tool modes and the connection state machine.
//!
//! The UI forwards raw pointer events to [`Flowchart::handle_pointer_event`],
//! which runs each one to completion before returning the resulting changes.
//! Connection state is either idle or holding one pending port that waits
//! for its partner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Change, Flowchart};
use crate::model::{NodeId, NodeType, PortIndex, PortRef};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Move,
    Action,
    Io,
    Condition,
    Delete,
    Cut,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Move => "move",
            Tool::Action => "action",
            Tool::Io => "io",
            Tool::Condition => "condition",
            Tool::Delete => "delete",
            Tool::Cut => "cut",
        }
    }

    /// Node type placed by a canvas press with this tool.
    pub fn creates(self) -> Option<NodeType> {
        match self {
            Tool::Action => Some(NodeType::Action),
            Tool::Io => Some(NodeType::Input),
            Tool::Condition => Some(NodeType::Condition),
            _ => None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Tool::Select),
            "move" => Ok(Tool::Move),
            "action" => Ok(Tool::Action),
            "io" => Ok(Tool::Io),
            "condition" => Ok(Tool::Condition),
            "delete" => Ok(Tool::Delete),
            "cut" => Ok(Tool::Cut),
            other => Err(format!("unknown tool '{}'", other)),
        }
    }
}

/// Raw pointer input. Canvas coordinates and deltas are in screen pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    PortPress { node: NodeId, port: PortIndex },
    NodePress {
        node: NodeId,
        #[serde(default)]
        add_to_selection: bool,
    },
    CanvasPress { x: f64, y: f64 },
    PointerMove {
        dx: f64,
        dy: f64,
        #[serde(default)]
        buttons_held: bool,
    },
    PointerRelease,
}

impl Flowchart {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_current_tool(&mut self, tool: Tool) -> Vec<Change> {
        if self.tool == tool {
            return Vec::new();
        }
        self.tool = tool;
        vec![Change::ToolChanged { tool }]
    }

    /// Canvas-pixel to model-unit ratio.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Report the on-screen width of the canvas. Non-positive widths are ignored.
    pub fn set_viewport_width(&mut self, client_width: f64) {
        if client_width > 0.0 {
            self.scale = self.cfg.view_box.w / client_width;
        }
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Vec<Change> {
        if !self.editable {
            return Vec::new();
        }
        match event {
            PointerEvent::PortPress { node, port } => self.press_port(PortRef { node, port }),
            PointerEvent::NodePress { node, add_to_selection } => self.press_node(node, add_to_selection),
            PointerEvent::CanvasPress { x, y } => self.press_canvas(x, y),
            PointerEvent::PointerMove { dx, dy, buttons_held } => {
                if buttons_held {
                    self.drag_by(dx * self.scale, dy * self.scale)
                } else {
                    Vec::new()
                }
            }
            PointerEvent::PointerRelease => self.release_captured(),
        }
    }

    fn press_port(&mut self, pressed: PortRef) -> Vec<Change> {
        if !self.port_exists(pressed) {
            return Vec::new();
        }

        let Some(first) = self.pending.take() else {
            if self.tool == Tool::Cut {
                let mut changes = self.cut_port(pressed);
                changes.push(Change::PortDeactivated { node: pressed.node, port: pressed.port });
                return changes;
            }
            self.pending = Some(pressed);
            return vec![Change::PortActivated { node: pressed.node, port: pressed.port }];
        };

        // Second endpoint: link if the pair is input/output in either order,
        // otherwise just drop the pending end.
        let mut changes = self.connect(first, pressed);
        if changes.is_empty() {
            debug!(?first, ?pressed, "discarding pending connection");
        }
        changes.push(Change::PortDeactivated { node: first.node, port: first.port });
        if pressed != first {
            changes.push(Change::PortDeactivated { node: pressed.node, port: pressed.port });
        }
        changes
    }

    fn press_node(&mut self, id: NodeId, add_to_selection: bool) -> Vec<Change> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };

        if self.tool == Tool::Delete {
            if !node.node_type().is_deletable() {
                return Vec::new();
            }
            let mut changes = self.delete_node(id);
            changes.extend(self.set_current_tool(Tool::Select));
            return changes;
        }

        let mut changes = Vec::new();
        if !add_to_selection {
            changes.extend(self.release_captured());
            changes.extend(self.clear_selection());
        }
        if !self.captured.contains(&id) {
            if let Some(node) = self.node_mut(id) {
                node.set_captured(true);
            }
            self.captured.push(id);
            changes.push(Change::NodeCaptured { node: id });
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
            changes.push(Change::SelectionChanged);
        }
        changes
    }

    fn press_canvas(&mut self, x: f64, y: f64) -> Vec<Change> {
        match self.tool.creates() {
            Some(node_type) => {
                let id = self.add_node(node_type, "", x * self.scale, y * self.scale);
                self.selected.clear();
                self.selected.push(id);
                vec![Change::NodeAdded { node: id }, Change::SelectionChanged]
            }
            None if matches!(self.tool, Tool::Select | Tool::Move) => self.clear_selection(),
            None => Vec::new(),
        }
    }

    fn release_captured(&mut self) -> Vec<Change> {
        let released = std::mem::take(&mut self.captured);
        let mut changes = Vec::with_capacity(released.len());
        for id in released {
            if let Some(node) = self.node_mut(id) {
                node.set_captured(false);
                changes.push(Change::NodeReleased { node: id });
            }
        }
        changes
    }
}
