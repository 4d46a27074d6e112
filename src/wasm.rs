//! WASM bindings for the flowchart-core library.
//!
//! The editor object exposed to JavaScript is defined here. Structured
//! values cross the boundary as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::MalformedDiagram;
use crate::graph::{Change, Flowchart, PointerEvent, Tool};
use crate::model::{DiagramConfig, NodeId, NodeType};
use crate::output::ErrorInfo;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

#[derive(Serialize)]
struct ErrorOutput {
    error: ErrorInfo,
}

fn error_json(message: String) -> String {
    console_error(&message);
    serde_json::to_string(&ErrorOutput { error: ErrorInfo { message } })
        .unwrap_or_else(|_| "{\"error\": {\"message\": \"unknown\"}}".to_string())
}

fn changes_json(changes: &[Change]) -> String {
    serde_json::to_string(changes).unwrap_or_else(|e| error_json(format!("Error encoding changes: {}", e)))
}

fn local_storage() -> Result<web_sys::Storage, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage is not available"))
}

/// A flowchart editor instance driven by the page's pointer events.
#[wasm_bindgen]
pub struct FlowchartEditor {
    inner: Flowchart,
}

impl Default for FlowchartEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl FlowchartEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { inner: Flowchart::new(DiagramConfig::default()) }
    }

    /// Report the canvas' on-screen width in pixels.
    pub fn set_viewport_width(&mut self, client_width: f64) {
        self.inner.set_viewport_width(client_width);
    }

    /// Switch tool mode. Returns the changes as JSON, or an error object for unknown tools.
    pub fn set_tool(&mut self, tool: &str) -> String {
        match tool.parse::<Tool>() {
            Ok(tool) => changes_json(&self.inner.set_current_tool(tool)),
            Err(e) => error_json(e),
        }
    }

    /// Feed one pointer event (JSON, tagged by `kind`) and get the resulting changes.
    pub fn handle_pointer_event(&mut self, event: &str) -> String {
        match serde_json::from_str::<PointerEvent>(event) {
            Ok(event) => changes_json(&self.inner.handle_pointer_event(event)),
            Err(e) => error_json(format!("Error parsing pointer event: {}", e)),
        }
    }

    /// Add a node by its serialized type code. Returns the new id, or
    /// undefined for an unknown code.
    pub fn add_node(&mut self, type_code: u8, text: &str, x: f64, y: f64) -> Option<u32> {
        match NodeType::from_code(type_code) {
            Some(node_type) => Some(self.inner.add_node(node_type, text, x, y).0),
            None => {
                console_error(&format!("Unknown node type {}", type_code));
                None
            }
        }
    }

    pub fn delete_node(&mut self, id: u32) -> String {
        changes_json(&self.inner.delete_node(NodeId(id)))
    }

    pub fn move_node(&mut self, id: u32, x: f64, y: f64) -> String {
        changes_json(&self.inner.move_node(NodeId(id), x, y))
    }

    pub fn set_node_text(&mut self, id: u32, text: &str) -> bool {
        self.inner.set_node_text(NodeId(id), text)
    }

    /// Full render description (shapes, ports, link paths) as JSON.
    pub fn render(&self) -> String {
        serde_json::to_string(&self.inner.render())
            .unwrap_or_else(|e| error_json(format!("Error rendering diagram: {}", e)))
    }

    pub fn serialize(&self) -> String {
        self.inner
            .to_json()
            .unwrap_or_else(|e| error_json(format!("Error serializing diagram: {}", e)))
    }

    /// Replace the diagram. Returns "{}" on success or an error object.
    pub fn load(&mut self, json: &str) -> String {
        match self.inner.load_json(json) {
            Ok(()) => "{}".to_string(),
            Err(e) => error_json(format!("Error loading diagram: {}", e)),
        }
    }

    pub fn save_to_storage(&self, key: &str) -> Result<(), JsValue> {
        let json = self
            .inner
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        local_storage()?.set_item(key, &json)
    }

    pub fn load_from_storage(&mut self, key: &str) -> Result<(), JsValue> {
        let Some(json) = local_storage()?.get_item(key)? else {
            return Err(JsValue::from_str(&format!("Nothing stored under '{}'", key)));
        };
        self.inner.load_json(&json).map_err(|e: MalformedDiagram| {
            console_error(&format!("Error loading stored diagram: {}", e));
            JsValue::from_str(&e.to_string())
        })
    }
}
