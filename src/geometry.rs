// Node outline and port anchor geometry.
//
// Pure functions of (type, center, config). Nothing here is cached: nodes
// move freely, so callers re-derive outlines and anchors on every query.
//
// Shapes (W = node_width, H = node_height, centered on (x, y)):
// - ACTION:        W x H rectangle
// - CONDITION:     diamond through the midpoints of the bounding box edges
// - INPUT/OUTPUT:  parallelogram, top edge skewed right by H/4
// - START/END:     circle of radius H/2
//
// Ports: input on the top edge, primary output on the bottom edge, except
// CONDITION whose outputs sit on the left (1) and right (2) vertices.

use serde::Serialize;

use crate::model::{DiagramConfig, NodeType, Point, PortIndex};

const BOUNDARY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Outline {
    /// Axis-aligned rectangle given by its top-left corner.
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Polygon { points: Vec<Point> },
    Circle { cx: f64, cy: f64, r: f64 },
}

impl Outline {
    /// SVG `points` attribute ("x,y x,y ...") for polygon outlines.
    pub fn svg_points(&self) -> Option<String> {
        match self {
            Outline::Polygon { points } => Some(
                points
                    .iter()
                    .map(|p| format!("{},{}", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }

    /// Whether `p` lies on the outline's boundary (not strictly inside or outside).
    pub fn on_boundary(&self, p: Point) -> bool {
        match self {
            Outline::Rect { x, y, width, height } => {
                let corners = [
                    Point::new(*x, *y),
                    Point::new(x + width, *y),
                    Point::new(x + width, y + height),
                    Point::new(*x, y + height),
                ];
                on_closed_polyline(&corners, p)
            }
            Outline::Polygon { points } => on_closed_polyline(points, p),
            Outline::Circle { cx, cy, r } => {
                let d = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
                (d - r).abs() < BOUNDARY_EPS
            }
        }
    }
}

/// Which way a port faces, i.e. the direction a link leaves or enters it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit vector in model coordinates (y grows downward).
    pub fn unit(self) -> (f64, f64) {
        match self {
            Facing::Up => (0.0, -1.0),
            Facing::Down => (0.0, 1.0),
            Facing::Left => (-1.0, 0.0),
            Facing::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PortAnchor {
    pub point: Point,
    pub facing: Facing,
}

impl PortAnchor {
    pub fn is_bottom_facing(&self) -> bool {
        self.facing == Facing::Down
    }
}

pub fn outline(node_type: NodeType, x: f64, y: f64, cfg: &DiagramConfig) -> Outline {
    let hw = cfg.node_width / 2.0;
    let hh = cfg.node_height / 2.0;
    match node_type {
        NodeType::Action => Outline::Rect {
            x: x - hw,
            y: y - hh,
            width: cfg.node_width,
            height: cfg.node_height,
        },
        NodeType::Condition => Outline::Polygon {
            points: vec![
                Point::new(x, y - hh), // top
                Point::new(x - hw, y), // left
                Point::new(x, y + hh), // bottom
                Point::new(x + hw, y), // right
            ],
        },
        NodeType::Input | NodeType::Output => {
            let skew = cfg.node_height / 4.0;
            Outline::Polygon {
                points: vec![
                    Point::new(x - hw + skew, y - hh), // left-top
                    Point::new(x - hw - skew, y + hh), // left-bottom
                    Point::new(x + hw - skew, y + hh), // right-bottom
                    Point::new(x + hw + skew, y - hh), // right-top
                ],
            }
        }
        NodeType::Start | NodeType::End => Outline::Circle { cx: x, cy: y, r: hh },
    }
}

/// Anchor point of a port. Does not check that `node_type` has the port;
/// see [`NodeType::has_port`].
pub fn port_anchor(
    node_type: NodeType,
    x: f64,
    y: f64,
    port: PortIndex,
    cfg: &DiagramConfig,
) -> PortAnchor {
    let hw = cfg.node_width / 2.0;
    let hh = cfg.node_height / 2.0;
    match (port, node_type) {
        (PortIndex::Input, _) => PortAnchor { point: Point::new(x, y - hh), facing: Facing::Up },
        (PortIndex::Primary, NodeType::Condition) => {
            PortAnchor { point: Point::new(x - hw, y), facing: Facing::Left }
        }
        (PortIndex::Primary, _) => PortAnchor { point: Point::new(x, y + hh), facing: Facing::Down },
        (PortIndex::Alternate, _) => PortAnchor { point: Point::new(x + hw, y), facing: Facing::Right },
    }
}

fn on_closed_polyline(points: &[Point], p: Point) -> bool {
    (0..points.len()).any(|i| on_segment(points[i], points[(i + 1) % points.len()], p))
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    if len == 0.0 {
        return (p.x - a.x).abs() < BOUNDARY_EPS && (p.y - a.y).abs() < BOUNDARY_EPS;
    }
    if (cross / len).abs() > BOUNDARY_EPS {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    dot >= -BOUNDARY_EPS && dot <= len * len + BOUNDARY_EPS
}
