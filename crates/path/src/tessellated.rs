use pictor_geom::math::{normal_of, vector, Point, Vector};
use pictor_geom::BoundingBox;

use crate::segment::{Segment, SegmentKind};

use core::ops::Range;

/// The geometry of the meeting point of two consecutive contour edges.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Join {
    pub position: Point,
    /// Unit tangent of the edge going into the join.
    pub enter_unit_vector: Vector,
    /// Unit tangent of the edge leaving the join.
    pub leaving_unit_vector: Vector,
    /// Signed turning angle in radians.
    pub join_angle: f32,
    /// ±1; the sign with which edge normals point toward the outside of
    /// the turn.
    pub lambda: f32,
    pub distance_from_contour_start: f32,
    /// Length of the edge going into the join.
    pub distance_from_previous_join: f32,
    pub contour_length: f32,
    /// Whether the join involves the edge generated by `close()`.
    pub of_closing_edge: bool,
}

impl Join {
    /// Normal of the edge going into the join (tangent rotated a quarter
    /// turn counter-clockwise).
    #[inline]
    pub fn enter_join_normal(&self) -> Vector {
        normal_of(self.enter_unit_vector)
    }

    /// Normal of the edge leaving the join.
    #[inline]
    pub fn leaving_join_normal(&self) -> Vector {
        normal_of(self.leaving_unit_vector)
    }
}

/// The geometry of an open contour's endpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Cap {
    pub position: Point,
    /// Unit vector pointing out of the contour, i.e. the direction in
    /// which cap geometry extends past the endpoint.
    pub unit_vector: Vector,
    pub is_starting_cap: bool,
    /// Length of the edge the cap terminates.
    pub edge_length: f32,
    pub contour_length: f32,
}

/// An ordered run of segments belonging to the same edge, with an optional
/// reference to the segment immediately preceding the run.
///
/// `prev_to_start` lets consumers compute seamless offsets across a
/// partition boundary without owning the predecessor geometry.
#[derive(Copy, Clone, Debug)]
pub struct SegmentChain<'l> {
    pub segments: &'l [Segment],
    pub prev_to_start: Option<&'l Segment>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct EdgeData {
    segments: Range<usize>,
    of_closing_edge: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct ContourData {
    edges: Range<usize>,
    closed: bool,
    length: f32,
}

/// A path reduced to line/arc segments with joins and caps, the input of
/// the partitioning and stroking stages.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TessellatedPath {
    segments: Vec<Segment>,
    edges: Vec<EdgeData>,
    contours: Vec<ContourData>,
    joins: Vec<Join>,
    caps: Vec<Cap>,
    bounding_box: BoundingBox,
    has_arcs: bool,
}

impl TessellatedPath {
    pub fn builder() -> TessellatedPathBuilder {
        TessellatedPathBuilder::new()
    }

    pub fn number_contours(&self) -> usize {
        self.contours.len()
    }

    pub fn number_edges(&self, contour: usize) -> usize {
        self.contours[contour].edges.len()
    }

    pub fn contour_closed(&self, contour: usize) -> bool {
        self.contours[contour].closed
    }

    pub fn contour_length(&self, contour: usize) -> f32 {
        self.contours[contour].length
    }

    /// The segments of one edge of one contour.
    pub fn edge_segments(&self, contour: usize, edge: usize) -> &[Segment] {
        let e = &self.edges[self.contours[contour].edges.start + edge];
        &self.segments[e.segments.clone()]
    }

    pub fn edge_of_closing(&self, contour: usize, edge: usize) -> bool {
        self.edges[self.contours[contour].edges.start + edge].of_closing_edge
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn caps(&self) -> &[Cap] {
        &self.caps
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn has_arcs(&self) -> bool {
        self.has_arcs
    }

    /// Total length over all contours.
    pub fn total_length(&self) -> f32 {
        self.contours.iter().map(|c| c.length).sum()
    }
}

/// Assembles a [`TessellatedPath`](struct.TessellatedPath.html) from
/// already-flattened geometry, computing lengths, tangents, joins and
/// caps.
#[derive(Clone, Debug, Default)]
pub struct TessellatedPathBuilder {
    path: TessellatedPath,
    // Current contour, one Vec<Segment> per edge, raw (distances unset).
    current: Vec<Vec<Segment>>,
    first_point: Option<Point>,
    position: Point,
}

impl TessellatedPathBuilder {
    pub fn new() -> Self {
        TessellatedPathBuilder::default()
    }

    /// Starts a new contour at `at`.
    pub fn begin(&mut self, at: Point) {
        debug_assert!(self.first_point.is_none(), "unterminated contour");
        self.first_point = Some(at);
        self.position = at;
    }

    /// Adds a single-segment line edge.
    pub fn line_to(&mut self, to: Point) {
        self.edge_to(&[to]);
    }

    /// Adds one edge whose segments run through all of `points`; a
    /// multi-point call produces a multi-segment chain.
    pub fn edge_to(&mut self, points: &[Point]) {
        debug_assert!(self.first_point.is_some(), "edge_to before begin");
        debug_assert!(!points.is_empty());
        let mut edge = Vec::with_capacity(points.len());
        let mut from = self.position;
        for &p in points {
            edge.push(Segment::line(from, p));
            from = p;
        }
        self.position = from;
        self.current.push(edge);
    }

    /// Adds a single-segment circular-arc edge from the current position
    /// to `to`, subtending the signed angle `arc_angle` (counter-clockwise
    /// positive, |angle| < 2π).
    pub fn arc_to(&mut self, to: Point, arc_angle: f32) {
        debug_assert!(self.first_point.is_some(), "arc_to before begin");
        debug_assert!(arc_angle != 0.0);
        let from = self.position;
        let chord = to - from;
        let half = 0.5 * arc_angle;
        // Center sits on the chord bisector; the signed distance follows
        // from chord = 2·r·sin(|angle|/2).
        let mid = from + chord * 0.5;
        let center = mid + normal_of(chord) * (0.5 / half.tan());
        self.current.push(vec![Segment::arc(from, to, center, arc_angle)]);
        self.position = to;
        self.path.has_arcs = true;
    }

    /// Ends the current contour; when `close` is true a closing line edge
    /// back to the start point is generated (and its two joins are marked
    /// as closing-edge joins).
    pub fn end(&mut self, close: bool) {
        let first = match self.first_point.take() {
            Some(p) => p,
            None => return,
        };
        let mut edges = core::mem::take(&mut self.current);
        if edges.is_empty() {
            return;
        }

        let closed = close;
        if close && (self.position - first).length() > 1e-6 {
            let mut seg = Segment::line(self.position, first);
            seg.of_closing_edge = true;
            edges.push(vec![seg]);
        }
        let contour_length: f32 = edges
            .iter()
            .flat_map(|e| e.iter())
            .map(|s| s.length)
            .sum();

        // Distance bookkeeping.
        let mut from_contour_start = 0.0;
        let edge_start_index = self.path.edges.len();
        for edge in &mut edges {
            let edge_length: f32 = edge.iter().map(|s| s.length).sum();
            let mut from_edge_start = 0.0;
            for seg in edge.iter_mut() {
                seg.distance_from_edge_start = from_edge_start;
                seg.distance_from_contour_start = from_contour_start;
                seg.edge_length = edge_length;
                seg.contour_length = contour_length;
                from_edge_start += seg.length;
                from_contour_start += seg.length;
            }
        }

        // Joins between consecutive edges (wrapping when closed).
        let num_edges = edges.len();
        let join_pairs = if closed { num_edges } else { num_edges.saturating_sub(1) };
        for i in 0..join_pairs {
            let next = (i + 1) % num_edges;
            let incoming = edges[i].last().expect("empty edge");
            let outgoing = edges[next].first().expect("empty edge");
            let of_closing_edge = incoming.of_closing_edge || outgoing.of_closing_edge;
            self.path.joins.push(make_join(
                incoming,
                outgoing,
                of_closing_edge,
                contour_length,
            ));
        }

        // Caps on open contours.
        if !closed {
            let first_seg = edges.first().and_then(|e| e.first()).expect("empty edge");
            let last_seg = edges.last().and_then(|e| e.last()).expect("empty edge");
            self.path.caps.push(Cap {
                position: first_seg.from,
                unit_vector: -first_seg.enter_unit_vector,
                is_starting_cap: true,
                edge_length: first_seg.edge_length,
                contour_length,
            });
            self.path.caps.push(Cap {
                position: last_seg.to,
                unit_vector: last_seg.leaving_unit_vector,
                is_starting_cap: false,
                edge_length: last_seg.edge_length,
                contour_length,
            });
        }

        // Move segments into the flat storage.
        for edge in edges {
            let start = self.path.segments.len();
            let of_closing_edge = edge.first().map_or(false, |s| s.of_closing_edge);
            for seg in edge {
                self.path.bounding_box.union_box(&seg.bounding_box());
                self.path.segments.push(seg);
            }
            self.path.edges.push(EdgeData {
                segments: start..self.path.segments.len(),
                of_closing_edge,
            });
        }

        self.path.contours.push(ContourData {
            edges: edge_start_index..self.path.edges.len(),
            closed,
            length: contour_length,
        });
    }

    pub fn build(mut self) -> TessellatedPath {
        debug_assert!(self.first_point.is_none(), "unterminated contour");
        self.path.has_arcs = self.path.has_arcs
            || self.path.segments.iter().any(|s| s.kind == SegmentKind::Arc);
        self.path
    }
}

fn make_join(incoming: &Segment, outgoing: &Segment, of_closing_edge: bool, contour_length: f32) -> Join {
    let v0 = incoming.leaving_unit_vector;
    let v1 = outgoing.enter_unit_vector;
    let cross = v0.x * v1.y - v0.y * v1.x;
    let dot = v0.x * v1.x + v0.y * v1.y;
    let join_angle = cross.atan2(dot);
    let lambda = if cross > 0.0 { -1.0 } else { 1.0 };

    Join {
        position: incoming.to,
        enter_unit_vector: v0,
        leaving_unit_vector: v1,
        join_angle,
        lambda,
        distance_from_contour_start: incoming.distance_from_contour_start + incoming.length,
        distance_from_previous_join: incoming.edge_length,
        contour_length,
        of_closing_edge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_geom::math::point;
    use pictor_geom::math::PI;

    fn polyline(points: &[Point], close: bool) -> TessellatedPath {
        let mut builder = TessellatedPath::builder();
        builder.begin(points[0]);
        for &p in &points[1..] {
            builder.line_to(p);
        }
        builder.end(close);
        builder.build()
    }

    #[test]
    fn open_polyline_joins_and_caps() {
        let path = polyline(
            &[
                point(0.0, 0.0),
                point(1.0, 0.0),
                point(1.0, 1.0),
                point(0.0, 1.0),
            ],
            false,
        );
        assert_eq!(path.number_contours(), 1);
        assert_eq!(path.number_edges(0), 3);
        assert_eq!(path.joins().len(), 2);
        assert_eq!(path.caps().len(), 2);
        assert!((path.total_length() - 3.0).abs() < 1e-5);

        assert!(path.caps()[0].is_starting_cap);
        assert_eq!(path.caps()[0].unit_vector, vector(-1.0, 0.0));
        assert!(!path.caps()[1].is_starting_cap);
    }

    #[test]
    fn closed_triangle_has_three_joins_no_caps() {
        let path = polyline(
            &[point(0.0, 0.0), point(2.0, 0.0), point(1.0, 2.0)],
            true,
        );
        assert_eq!(path.joins().len(), 3);
        assert!(path.caps().is_empty());
        // Two of the three joins touch the closing edge.
        let closing = path.joins().iter().filter(|j| j.of_closing_edge).count();
        assert_eq!(closing, 2);
    }

    #[test]
    fn join_turn_direction() {
        // Left turn at (1, 0): lambda is negative.
        let left = polyline(
            &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)],
            false,
        );
        assert_eq!(left.joins()[0].lambda, -1.0);
        assert!((left.joins()[0].join_angle - 0.5 * PI).abs() < 1e-5);

        // Right turn: lambda positive, angle negative.
        let right = polyline(
            &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, -1.0)],
            false,
        );
        assert_eq!(right.joins()[0].lambda, 1.0);
        assert!((right.joins()[0].join_angle + 0.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn join_distance_values() {
        let path = polyline(
            &[point(0.0, 0.0), point(3.0, 0.0), point(3.0, 4.0)],
            false,
        );
        let join = &path.joins()[0];
        assert!((join.distance_from_previous_join - 3.0).abs() < 1e-5);
        assert!((join.distance_from_contour_start - 3.0).abs() < 1e-5);
        assert!((join.contour_length - 7.0).abs() < 1e-5);
    }

    #[test]
    fn arc_edge_center_derivation() {
        let mut builder = TessellatedPath::builder();
        builder.begin(point(1.0, 0.0));
        builder.arc_to(point(0.0, 1.0), 0.5 * PI);
        builder.end(false);
        let path = builder.build();

        let seg = &path.segments()[0];
        assert!(seg.is_arc());
        assert!(seg.center.distance_to(point(0.0, 0.0)) < 1e-4);
        assert!((seg.radius - 1.0).abs() < 1e-4);
        assert!((path.total_length() - 0.5 * PI).abs() < 1e-3);
        assert!(path.has_arcs());
    }

    #[test]
    fn multi_segment_edge_is_one_chain() {
        let mut builder = TessellatedPath::builder();
        builder.begin(point(0.0, 0.0));
        builder.edge_to(&[point(1.0, 0.0), point(2.0, 0.0), point(3.0, 0.0)]);
        builder.end(false);
        let path = builder.build();

        assert_eq!(path.number_edges(0), 1);
        assert_eq!(path.edge_segments(0, 0).len(), 3);
        // No joins inside an edge.
        assert!(path.joins().is_empty());
        let seg = &path.edge_segments(0, 0)[2];
        assert!((seg.distance_from_edge_start - 2.0).abs() < 1e-5);
    }
}
