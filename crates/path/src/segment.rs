use pictor_geom::math::{point, vector, Point, Vector, PI};
use pictor_geom::BoundingBox;

/// Whether a segment is a straight line or a circular arc.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SegmentKind {
    Line,
    Arc,
}

/// A single line or circular-arc piece of a tessellated contour edge.
///
/// Segments are immutable once tessellation completes; they are owned by
/// the [`TessellatedPath`](struct.TessellatedPath.html) that produced them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Segment {
    pub kind: SegmentKind,
    pub from: Point,
    pub to: Point,
    /// Center of the supporting circle; meaningless for lines.
    pub center: Point,
    /// Radius of the supporting circle; meaningless for lines.
    pub radius: f32,
    /// Signed subtended angle in radians, 0 for line segments.
    pub arc_angle: f32,
    pub length: f32,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    /// Unit tangent at the start of the segment.
    pub enter_unit_vector: Vector,
    /// Unit tangent at the end of the segment.
    pub leaving_unit_vector: Vector,
    /// Whether this segment continues its predecessor without a join
    /// (it was produced by splitting a segment at a partition boundary).
    pub continuation: bool,
    /// Whether the segment belongs to the edge a `close()` generated.
    pub of_closing_edge: bool,
}

/// The relation of a segment to an axis-aligned split line, as computed by
/// [`Segment::split`](struct.Segment.html#method.split).
#[derive(Clone, Debug)]
pub enum SegmentSplit {
    /// The segment lies entirely on the min side of the split line.
    Before,
    /// The segment lies entirely on the max side of the split line.
    After,
    /// The segment crosses the split line; `start_is_before` tells which
    /// side `before.from` is on.
    Split {
        before: Segment,
        after: Segment,
        start_is_before: bool,
    },
}

impl Segment {
    pub(crate) fn line(from: Point, to: Point) -> Self {
        let d = to - from;
        let length = d.length();
        let dir = if length > 0.0 { d / length } else { vector(1.0, 0.0) };
        Segment {
            kind: SegmentKind::Line,
            from,
            to,
            center: point(0.0, 0.0),
            radius: 0.0,
            arc_angle: 0.0,
            length,
            distance_from_edge_start: 0.0,
            distance_from_contour_start: 0.0,
            edge_length: 0.0,
            contour_length: 0.0,
            enter_unit_vector: dir,
            leaving_unit_vector: dir,
            continuation: false,
            of_closing_edge: false,
        }
    }

    pub(crate) fn arc(from: Point, to: Point, center: Point, arc_angle: f32) -> Self {
        let radius = (from - center).length();
        let length = radius * arc_angle.abs();
        let mut seg = Segment {
            kind: SegmentKind::Arc,
            from,
            to,
            center,
            radius,
            arc_angle,
            length,
            distance_from_edge_start: 0.0,
            distance_from_contour_start: 0.0,
            edge_length: 0.0,
            contour_length: 0.0,
            enter_unit_vector: vector(1.0, 0.0),
            leaving_unit_vector: vector(1.0, 0.0),
            continuation: false,
            of_closing_edge: false,
        };
        seg.enter_unit_vector = seg.tangent_at(0.0);
        seg.leaving_unit_vector = seg.tangent_at(1.0);
        seg
    }

    #[inline]
    pub fn is_arc(&self) -> bool {
        self.kind == SegmentKind::Arc
    }

    fn start_angle(&self) -> f32 {
        let d = self.from - self.center;
        d.y.atan2(d.x)
    }

    /// Point on the segment at parameter `t` in [0, 1].
    pub fn position_at(&self, t: f32) -> Point {
        match self.kind {
            SegmentKind::Line => self.from.lerp(self.to, t),
            SegmentKind::Arc => {
                let theta = self.start_angle() + t * self.arc_angle;
                self.center + vector(theta.cos(), theta.sin()) * self.radius
            }
        }
    }

    /// Unit tangent at parameter `t` in [0, 1].
    pub fn tangent_at(&self, t: f32) -> Vector {
        match self.kind {
            SegmentKind::Line => self.enter_unit_vector,
            SegmentKind::Arc => {
                let theta = self.start_angle() + t * self.arc_angle;
                vector(-theta.sin(), theta.cos()) * self.arc_angle.signum()
            }
        }
    }

    /// The tight bounding box of the segment's geometry.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::from_points(self.from, self.to);
        if self.is_arc() {
            // Axis extremes occur where the swept angle crosses a multiple
            // of π/2.
            let theta0 = self.start_angle();
            let theta1 = theta0 + self.arc_angle;
            let (lo, hi) = if theta0 <= theta1 { (theta0, theta1) } else { (theta1, theta0) };
            let mut k = (lo / (0.5 * PI)).ceil() as i32;
            loop {
                let theta = (k as f32) * 0.5 * PI;
                if theta > hi {
                    break;
                }
                bbox.union_point(
                    self.center + vector(theta.cos(), theta.sin()) * self.radius,
                );
                k += 1;
            }
        }
        bbox
    }

    /// Cuts the segment at parameter `t`, distributing lengths and
    /// distance values proportionally; the second piece is marked as a
    /// continuation.
    pub fn split_at(&self, t: f32) -> (Segment, Segment) {
        let mid = self.position_at(t);
        let tangent = self.tangent_at(t);
        let len_before = self.length * t;

        let mut before = *self;
        before.to = mid;
        before.length = len_before;
        before.arc_angle = self.arc_angle * t;
        before.leaving_unit_vector = tangent;

        let mut after = *self;
        after.from = mid;
        after.length = self.length - len_before;
        after.arc_angle = self.arc_angle * (1.0 - t);
        after.distance_from_edge_start += len_before;
        after.distance_from_contour_start += len_before;
        after.enter_unit_vector = tangent;
        after.continuation = true;

        (before, after)
    }

    /// Classifies the segment against the split line `coord == value`
    /// (`coordinate` 0 for x, 1 for y), cutting it when it straddles.
    pub fn split(&self, coordinate: usize, value: f32) -> SegmentSplit {
        debug_assert!(coordinate < 2);
        let c0 = coord(self.from, coordinate);
        let c1 = coord(self.to, coordinate);

        let t = match self.kind {
            SegmentKind::Line => {
                if (c0 < value) == (c1 < value) {
                    None
                } else {
                    // A crossing at the very ends would produce a
                    // zero-length piece; classify by midpoint instead.
                    let t = (value - c0) / (c1 - c0);
                    if t > 1e-4 && t < 1.0 - 1e-4 {
                        Some(t)
                    } else {
                        None
                    }
                }
            }
            SegmentKind::Arc => self.arc_crossing(coordinate, value),
        };

        match t {
            None => {
                let mid = coord(self.position_at(0.5), coordinate);
                if mid < value {
                    SegmentSplit::Before
                } else {
                    SegmentSplit::After
                }
            }
            Some(t) => {
                let (before_piece, after_piece) = self.split_at(t);
                let start_is_before = c0 < value;
                let (before, after) = if start_is_before {
                    (before_piece, after_piece)
                } else {
                    (after_piece, before_piece)
                };
                SegmentSplit::Split {
                    before,
                    after,
                    start_is_before,
                }
            }
        }
    }

    /// First parameter in (0, 1) where the arc crosses `coord == value`,
    /// if any.
    fn arc_crossing(&self, coordinate: usize, value: f32) -> Option<f32> {
        let u = (value - coord(self.center, coordinate)) / self.radius;
        if u.abs() > 1.0 {
            return None;
        }

        // Base solutions of cos θ = u (x axis) or sin θ = u (y axis).
        let base: [f32; 2] = if coordinate == 0 {
            let a = u.acos();
            [a, -a]
        } else {
            let a = u.asin();
            [a, PI - a]
        };

        let theta0 = self.start_angle();
        let mut best: Option<f32> = None;
        for &b in &base {
            for k in -2i32..=2 {
                let theta = b + (k as f32) * 2.0 * PI;
                let t = (theta - theta0) / self.arc_angle;
                if t > 1e-4 && t < 1.0 - 1e-4 {
                    best = Some(match best {
                        None => t,
                        Some(prev) => prev.min(t),
                    });
                }
            }
        }
        best
    }
}

#[inline]
fn coord(p: Point, coordinate: usize) -> f32 {
    if coordinate == 0 {
        p.x
    } else {
        p.y
    }
}
