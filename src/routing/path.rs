// Orthogonal path primitives.
//
// A route is built as a polyline of corner points, then cut into segments
// with zero-length pieces dropped and same-direction runs merged.

use serde::Serialize;

use crate::model::Point;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y && self.from.x != self.to.x
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x && self.from.y != self.to.y
    }

    pub fn length(&self) -> f64 {
        (self.to.x - self.from.x).abs() + (self.to.y - self.from.y).abs()
    }

    /// Heading as a pair of signs; an axis with no movement is 0.
    fn direction(&self) -> (i8, i8) {
        (sign(self.to.x - self.from.x), sign(self.to.y - self.from.y))
    }
}

// `f64::signum` maps 0.0 to 1.0, which would make "right" and "down" look alike.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Turn a list of corner points into segments, skipping zero-length hops and
/// fusing consecutive segments heading the same way.
pub fn segments_from_points(points: &[Point]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for pair in points.windows(2) {
        let seg = Segment { from: pair[0], to: pair[1] };
        if seg.from == seg.to {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.direction() == seg.direction() => last.to = seg.to,
            _ => out.push(seg),
        }
    }
    out
}

/// SVG path data ("M x y L x y ...") for a connected run of segments.
pub fn svg_path(segments: &[Segment]) -> String {
    let Some(first) = segments.first() else {
        return String::new();
    };
    let mut d = format!("M {} {}", first.from.x, first.from.y);
    for seg in segments {
        d.push_str(&format!(" L {} {}", seg.to.x, seg.to.y));
    }
    d
}
