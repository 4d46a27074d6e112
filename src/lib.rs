//! Flowchart diagram engine.
//!
//! Typed nodes joined by directed links, an orthogonal link router, the
//! pointer-driven editing state machine and the persisted diagram format.
//! The browser UI talks to it through the bindings in [`wasm`].

pub mod error;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod output;
pub mod routing;
pub mod wasm;

pub use error::MalformedDiagram;
pub use graph::{Change, Flowchart, PointerEvent, SerializedDiagram, Tool};
pub use model::{DiagramConfig, Link, LinkId, Node, NodeId, NodeType, OutputPort, PortIndex, PortRef};
pub use output::DiagramOutput;
