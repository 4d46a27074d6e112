// Orthogonal link routing.
//
// Given an output anchor and an input anchor, produce an axis-aligned path:
//
//   1. stub of `connection_size` leaving the output in its facing direction
//   2. one of three elbows between the stub end and the approach point
//      - Detour:          bottom output with the target above the stub end;
//                         step sideways past the node edge, climb, then cross
//      - VerticalFirst:   bottom output, target above, or side output facing
//                         away from the target's side
//      - HorizontalFirst: side output facing the target, target below
//   3. stub of `connection_size` dropping onto the input from above
//
// The side-output rule keeps a CONDITION's left/right exit from running back
// across its own diamond. Note: this is the reverse of the plain reading
// "facing toward the target => vertical first"; taken literally, that rule
// sends a side exit facing away straight back through the node, so the
// branch is deliberately flipped.

use crate::geometry::{Facing, PortAnchor};
use crate::model::{DiagramConfig, Point};

mod path;

pub use path::{segments_from_points, svg_path, Segment};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Elbow {
    Detour,
    VerticalFirst,
    HorizontalFirst,
}

/// Pick the elbow shape for a route whose source stub ends at `stub_end` and
/// whose destination approach starts at `approach`.
pub fn choose_elbow(facing: Facing, stub_end: Point, approach: Point) -> Elbow {
    let target_above = approach.y < stub_end.y;
    let exits_down = facing == Facing::Down;
    let faces_away = match facing {
        Facing::Left => approach.x > stub_end.x,
        Facing::Right => approach.x < stub_end.x,
        Facing::Up | Facing::Down => false,
    };

    if exits_down && target_above {
        Elbow::Detour
    } else if exits_down || target_above || faces_away {
        Elbow::VerticalFirst
    } else {
        Elbow::HorizontalFirst
    }
}

/// Compute the segments of a link from an output anchor to an input anchor.
/// The first segment starts exactly at `from.point` and the last one ends
/// exactly at `to.point`.
pub fn compute_segments(from: PortAnchor, to: PortAnchor, cfg: &DiagramConfig) -> Vec<Segment> {
    segments_from_points(&route_points(from, to, cfg))
}

/// Same as [`compute_segments`] but rendered as SVG path data.
pub fn compute_path(from: PortAnchor, to: PortAnchor, cfg: &DiagramConfig) -> String {
    svg_path(&compute_segments(from, to, cfg))
}

fn route_points(from: PortAnchor, to: PortAnchor, cfg: &DiagramConfig) -> Vec<Point> {
    let c = cfg.connection_size;
    let (ux, uy) = from.facing.unit();
    let start = from.point;
    let stub_end = Point::new(start.x + ux * c, start.y + uy * c);
    let approach = Point::new(to.point.x, to.point.y - c);

    let mut pts = vec![start, stub_end];
    match choose_elbow(from.facing, stub_end, approach) {
        Elbow::Detour => {
            let side = if to.point.x >= start.x { 1.0 } else { -1.0 };
            let clear_x = stub_end.x + side * (cfg.node_width / 2.0 + c);
            pts.push(Point::new(clear_x, stub_end.y));
            pts.push(Point::new(clear_x, approach.y));
        }
        Elbow::VerticalFirst => pts.push(Point::new(stub_end.x, approach.y)),
        Elbow::HorizontalFirst => pts.push(Point::new(approach.x, stub_end.y)),
    }
    pts.push(approach);
    pts.push(to.point);
    pts
}

/// Test helper: the route is non-empty, axis-aligned, gap-free, runs from
/// `from` to `to`, and its last segment drops onto the input from above.
#[cfg(test)]
pub(crate) fn assert_orthogonal_and_connected(segs: &[Segment], from: Point, to: Point) {
    assert!(!segs.is_empty());
    assert_eq!(segs[0].from, from);
    assert_eq!(segs[segs.len() - 1].to, to);
    for s in segs {
        assert!(s.is_horizontal() || s.is_vertical(), "diagonal segment {:?}", s);
    }
    for pair in segs.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    let last = segs[segs.len() - 1];
    assert!(last.is_vertical() && last.from.y < last.to.y, "last segment {:?} does not enter from above", last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::port_anchor;
    use crate::model::{NodeType, PortIndex};

    fn input_at(x: f64, y: f64) -> PortAnchor {
        PortAnchor { point: Point::new(x, y), facing: Facing::Up }
    }

    fn bottom_at(x: f64, y: f64) -> PortAnchor {
        PortAnchor { point: Point::new(x, y), facing: Facing::Down }
    }

    #[test]
    fn test_straight_down_has_no_horizontal() {
        let cfg = DiagramConfig::default();
        let segs = compute_segments(bottom_at(100.0, 50.0), input_at(100.0, 90.0), &cfg);
        assert_orthogonal_and_connected(&segs, Point::new(100.0, 50.0), Point::new(100.0, 90.0));
        assert!(segs.iter().all(|s| !s.is_horizontal()));
        assert_eq!(compute_path(bottom_at(100.0, 50.0), input_at(100.0, 90.0), &cfg), "M 100 50 L 100 90");
    }

    #[test]
    fn test_target_above_takes_detour() {
        let cfg = DiagramConfig::default();
        let segs = compute_segments(bottom_at(100.0, 50.0), input_at(100.0, 10.0), &cfg);
        assert_orthogonal_and_connected(&segs, Point::new(100.0, 50.0), Point::new(100.0, 10.0));

        // stub down, then sideways clear of the node before climbing
        assert!(segs[0].is_vertical());
        assert!(segs[1].is_horizontal());
        assert!(segs[1].length() >= cfg.node_width / 2.0 + cfg.connection_size);
        assert!(segs[2].is_vertical());
        assert!(segs[2].to.y < segs[2].from.y);
    }

    #[test]
    fn test_detour_goes_toward_target_side() {
        let cfg = DiagramConfig::default();
        let left = compute_segments(bottom_at(100.0, 50.0), input_at(40.0, 10.0), &cfg);
        assert!(left[1].to.x < 100.0);
        let right = compute_segments(bottom_at(100.0, 50.0), input_at(160.0, 10.0), &cfg);
        assert!(right[1].to.x > 100.0);
    }

    #[test]
    fn test_down_then_across() {
        let cfg = DiagramConfig::default();
        let from = bottom_at(100.0, 50.0);
        let to = input_at(160.0, 90.0);
        let segs = compute_segments(from, to, &cfg);
        assert_orthogonal_and_connected(&segs, from.point, to.point);
        assert_eq!(segs.len(), 3);
        assert!(segs[0].is_vertical());
        assert!(segs[1].is_horizontal());
        assert_eq!(segs[1].from.y, 85.0);
        assert!(segs[2].is_vertical());
    }

    #[test]
    fn test_right_and_below_stays_orthogonal() {
        let cfg = DiagramConfig::default();
        let from = bottom_at(100.0, 50.0);
        let to = input_at(160.0, 90.0);
        let segs = compute_segments(from, to, &cfg);
        assert_orthogonal_and_connected(&segs, from.point, to.point);
        assert_eq!(compute_path(from, to, &cfg), "M 100 50 L 100 85 L 160 85 L 160 90");
    }

    #[test]
    fn test_last_segment_enters_from_above() {
        let cfg = DiagramConfig::default();
        let targets = [(100.0, 90.0), (100.0, 10.0), (20.0, 200.0), (250.0, -30.0)];
        for (x, y) in targets {
            let segs = compute_segments(bottom_at(100.0, 50.0), input_at(x, y), &cfg);
            let last = segs[segs.len() - 1];
            assert!(last.is_vertical());
            assert!(last.from.y < last.to.y);
        }
    }

    #[test]
    fn test_condition_side_toward_target_goes_across_first() {
        let cfg = DiagramConfig::default();
        let from = port_anchor(NodeType::Condition, 100.0, 40.0, PortIndex::Primary, &cfg);
        let to = input_at(40.0, 100.0);
        assert_eq!(
            choose_elbow(from.facing, Point::new(75.0, 40.0), Point::new(40.0, 95.0)),
            Elbow::HorizontalFirst
        );
        let segs = compute_segments(from, to, &cfg);
        assert_orthogonal_and_connected(&segs, from.point, to.point);
        assert_eq!(segs.len(), 2);
        assert!(segs[0].is_horizontal());
        assert_eq!(segs[0].from.y, 40.0);
    }

    #[test]
    fn test_condition_side_away_from_target_goes_down_first() {
        let cfg = DiagramConfig::default();
        let from = port_anchor(NodeType::Condition, 100.0, 40.0, PortIndex::Primary, &cfg);
        let to = input_at(160.0, 100.0);
        let segs = compute_segments(from, to, &cfg);
        assert_orthogonal_and_connected(&segs, from.point, to.point);

        // short stub left, then down past the diamond before crossing right
        assert!(segs[0].is_horizontal());
        assert_eq!(segs[0].to.x, 75.0);
        assert!(segs[1].is_vertical());
        assert!(segs[1].to.y > 40.0 + cfg.node_height / 2.0);
        assert!(segs[2].is_horizontal());
    }

    #[test]
    fn test_condition_target_above_goes_vertical_first() {
        let cfg = DiagramConfig::default();
        let from = port_anchor(NodeType::Condition, 100.0, 40.0, PortIndex::Alternate, &cfg);
        let to = input_at(200.0, 0.0);
        let segs = compute_segments(from, to, &cfg);
        assert_orthogonal_and_connected(&segs, from.point, to.point);
        assert!(segs[0].is_horizontal());
        assert_eq!(segs[0].to.x, 125.0);
        assert!(segs[1].is_vertical());
        assert!(segs[1].to.y < segs[1].from.y);
    }
}
