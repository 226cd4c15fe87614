//! Packing of stroke geometry into the 3×uvec4 vertex format.
//!
//! A stroked vertex carries its position on the path spine, an offset
//! direction the vertex shader scales by the stroke radius, dash-pattern
//! distances, and a packed classification word. Stroke width is therefore
//! a draw-time parameter; the data packed here serves every width.
//!
//! The packed word layout is a wire contract shared with the shader side:
//! offset type in bits `[0, 4)`, boundary flag at bit 4, depth in bits
//! `[5, 25)`, join flag at bit 25; bits at and above 26 are per-offset-type.

use pictor_geom::math::{normal_of, vector, Point, Vector, PI};
use pictor_geom::arc_segment_count;
use pictor_path::{Cap, Join, Segment, SegmentChain};

use crate::attribute::{pack_bits, pack_float, unpack_bits, unpack_float, PainterAttribute, PainterIndex};

pub const OFFSET_TYPE_BIT0: u32 = 0;
pub const OFFSET_TYPE_NUM_BITS: u32 = 4;
pub const BOUNDARY_BIT: u32 = 4;
pub const DEPTH_BIT0: u32 = 5;
pub const DEPTH_NUM_BITS: u32 = 20;
pub const JOIN_BIT: u32 = 25;
pub const NUMBER_COMMON_BITS: u32 = 26;

/// Set on miter-clip tip vertices whose first normal had its y negated.
pub const NORMAL0_Y_SIGN_BIT: u32 = 26;
/// Set on miter-clip tip vertices whose second normal had its y negated.
pub const NORMAL1_Y_SIGN_BIT: u32 = 27;
/// Sign of the sine of the turn angle, for miter-clip tips.
pub const SIN_SIGN_BIT: u32 = 28;
/// Set on the three vertices of an adjustable/flat cap stub that extend
/// past the contour endpoint.
pub const CAP_ENDING_BIT: u32 = 26;

/// How the vertex shader turns `pre_offset`/`auxiliary_offset` into a
/// displacement.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OffsetType {
    /// Interior of a segment quad.
    SubEdge = 0,
    /// Bevel geometry between consecutive sub-edges and plain bevel joins.
    SharedWithEdge = 1,
    RoundedJoin = 2,
    MiterClipJoin = 3,
    MiterJoin = 4,
    MiterBevelJoin = 5,
    RoundedCap = 6,
    SquareCap = 7,
    AdjustableCap = 8,
    FlatCap = 9,
}

impl OffsetType {
    pub fn from_bits(bits: u32) -> Option<OffsetType> {
        Some(match bits {
            0 => OffsetType::SubEdge,
            1 => OffsetType::SharedWithEdge,
            2 => OffsetType::RoundedJoin,
            3 => OffsetType::MiterClipJoin,
            4 => OffsetType::MiterJoin,
            5 => OffsetType::MiterBevelJoin,
            6 => OffsetType::RoundedCap,
            7 => OffsetType::SquareCap,
            8 => OffsetType::AdjustableCap,
            9 => OffsetType::FlatCap,
            _ => {
                return None;
            }
        })
    }
}

/// A stroke vertex before packing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokedPoint {
    pub position: Point,
    /// Unit offset direction, scaled by the stroke radius in the shader.
    pub pre_offset: Vector,
    /// Extra per-offset-type data (e.g. the second normal of a miter).
    pub auxiliary_offset: Vector,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    pub packed_data: u32,
}

impl StrokedPoint {
    pub fn offset_type(&self) -> Option<OffsetType> {
        OffsetType::from_bits(unpack_bits(
            OFFSET_TYPE_BIT0,
            OFFSET_TYPE_NUM_BITS,
            self.packed_data,
        ))
    }

    pub fn on_boundary(&self) -> bool {
        unpack_bits(BOUNDARY_BIT, 1, self.packed_data) != 0
    }

    pub fn depth(&self) -> u32 {
        unpack_bits(DEPTH_BIT0, DEPTH_NUM_BITS, self.packed_data)
    }

    pub fn is_join(&self) -> bool {
        unpack_bits(JOIN_BIT, 1, self.packed_data) != 0
    }

    pub fn pack_point(&self) -> PainterAttribute {
        PainterAttribute {
            attrib0: [
                pack_float(self.position.x),
                pack_float(self.position.y),
                pack_float(self.pre_offset.x),
                pack_float(self.pre_offset.y),
            ],
            attrib1: [
                pack_float(self.distance_from_edge_start),
                pack_float(self.distance_from_contour_start),
                pack_float(self.auxiliary_offset.x),
                pack_float(self.auxiliary_offset.y),
            ],
            attrib2: [
                self.packed_data,
                pack_float(self.edge_length),
                pack_float(self.contour_length),
                0,
            ],
        }
    }

    /// Inverse of [`pack_point`](#method.pack_point).
    pub fn unpack_point(attr: &PainterAttribute) -> StrokedPoint {
        StrokedPoint {
            position: Point::new(unpack_float(attr.attrib0[0]), unpack_float(attr.attrib0[1])),
            pre_offset: vector(unpack_float(attr.attrib0[2]), unpack_float(attr.attrib0[3])),
            auxiliary_offset: vector(unpack_float(attr.attrib1[2]), unpack_float(attr.attrib1[3])),
            distance_from_edge_start: unpack_float(attr.attrib1[0]),
            distance_from_contour_start: unpack_float(attr.attrib1[1]),
            edge_length: unpack_float(attr.attrib2[1]),
            contour_length: unpack_float(attr.attrib2[2]),
            packed_data: attr.attrib2[0],
        }
    }
}

fn packed_data(offset_type: OffsetType, boundary: bool, depth: u32, join: bool) -> u32 {
    pack_bits(OFFSET_TYPE_BIT0, OFFSET_TYPE_NUM_BITS, offset_type as u32)
        | pack_bits(BOUNDARY_BIT, 1, boundary as u32)
        | pack_bits(DEPTH_BIT0, DEPTH_NUM_BITS, depth)
        | pack_bits(JOIN_BIT, 1, join as u32)
}

/// Attribute/index/depth counts a packing operation produces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PackSize {
    pub number_attributes: usize,
    pub number_indices: usize,
    pub number_depths: usize,
}

impl PackSize {
    fn add(&mut self, other: PackSize) {
        self.number_attributes += other.number_attributes;
        self.number_indices += other.number_indices;
        self.number_depths += other.number_depths;
    }
}

/// Reverses triangle order in place (keeping each triple's winding) so
/// that drawing the index buffer front to back visits decreasing depth.
pub fn reverse_triangles(indices: &mut [PainterIndex]) {
    debug_assert!(indices.len() % 3 == 0);
    let n = indices.len() / 3;
    for t in 0..n / 2 {
        let s = n - 1 - t;
        for k in 0..3 {
            indices.swap(3 * t + k, 3 * s + k);
        }
    }
}

struct Packer<'l> {
    attributes: &'l mut [PainterAttribute],
    indices: &'l mut [PainterIndex],
    attr_cursor: usize,
    index_cursor: usize,
}

impl<'l> Packer<'l> {
    fn vertex(&mut self, p: StrokedPoint) -> u32 {
        let i = self.attr_cursor;
        self.attributes[i] = p.pack_point();
        self.attr_cursor += 1;
        i as u32
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices[self.index_cursor] = a;
        self.indices[self.index_cursor + 1] = b;
        self.indices[self.index_cursor + 2] = c;
        self.index_cursor += 3;
    }

    fn finish(self) {
        debug_assert_eq!(self.attr_cursor, self.attributes.len());
        debug_assert_eq!(self.index_cursor, self.indices.len());
    }
}

/// ±1 with which the normals of two meeting sub-edges point toward the
/// outside of the turn.
pub fn compute_bevel_lambda(leaving: Vector, entering: Vector) -> f32 {
    let cross = leaving.x * entering.y - leaving.y * entering.x;
    if cross > 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn count_bevels(chain: &SegmentChain) -> usize {
    let mut n = 0;
    let mut prev = chain.prev_to_start.is_some();
    for seg in chain.segments {
        if prev && !seg.continuation {
            n += 1;
        }
        prev = true;
    }
    n
}

/// Maximum distance between an arc and the sub-edge quads that stroke it,
/// relative to the arc radius.
pub const ARC_EDGE_THRESH: f32 = 0.01;

/// A line segment strokes as one quad; an arc segment subdivides into
/// enough quads to keep the chords within [`ARC_EDGE_THRESH`] of the arc.
fn sub_quad_count(seg: &Segment) -> usize {
    if seg.is_arc() {
        arc_segment_count(seg.arc_angle, ARC_EDGE_THRESH) as usize
    } else {
        1
    }
}

/// Sizes for [`pack_segment_chains`](fn.pack_segment_chains.html): 6
/// attributes / 12 indices per sub-edge quad, 6 attributes / 6 indices
/// per inner+outer bevel between sub-edges, 1 depth per segment plus 1
/// per bevel (the quads an arc subdivides into share their segment's
/// depth).
pub fn pack_segment_chains_size(chains: &[SegmentChain]) -> PackSize {
    let mut size = PackSize::default();
    for chain in chains {
        let q: usize = chain.segments.iter().map(sub_quad_count).sum();
        let b = count_bevels(chain);
        size.add(PackSize {
            number_attributes: 6 * q + 6 * b,
            number_indices: 12 * q + 6 * b,
            number_depths: chain.segments.len() + b,
        });
    }
    size
}

/// Packs the segment quads (and inter-segment bevels) of `chains`,
/// assigning depths `depth_start, depth_start + 1, ...` in packing order.
/// Returns the number of depth values consumed. The caller reverses
/// triangles afterwards if it wants front-to-back order.
pub fn pack_segment_chains(
    chains: &[SegmentChain],
    depth_start: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) -> u32 {
    let size = pack_segment_chains_size(chains);
    debug_assert_eq!(attributes.len(), size.number_attributes);
    debug_assert_eq!(indices.len(), size.number_indices);

    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let mut depth = depth_start;

    for chain in chains {
        let mut prev: Option<&Segment> = chain.prev_to_start;
        for seg in chain.segments {
            if let Some(p) = prev {
                if !seg.continuation {
                    pack_inter_segment_bevel(p, seg, depth, &mut packer);
                    depth += 1;
                }
            }
            pack_segment_quad(seg, depth, &mut packer);
            depth += 1;
            prev = Some(seg);
        }
    }
    packer.finish();
    depth - depth_start
}

fn pack_segment_quad(seg: &Segment, depth: u32, packer: &mut Packer) {
    let count = sub_quad_count(seg);
    for i in 0..count {
        let t0 = i as f32 / count as f32;
        let t1 = (i + 1) as f32 / count as f32;
        pack_sub_quad(seg, t0, t1, depth, packer);
    }
}

/// Position and outward normal at parameter `t` of a segment. Endpoints
/// reuse the stored points and tangents so neighbouring geometry stays
/// watertight.
fn segment_point(seg: &Segment, t: f32) -> (Point, Vector) {
    if t <= 0.0 {
        (seg.from, normal_of(seg.enter_unit_vector))
    } else if t >= 1.0 {
        (seg.to, normal_of(seg.leaving_unit_vector))
    } else {
        (seg.position_at(t), normal_of(seg.tangent_at(t)))
    }
}

fn pack_sub_quad(seg: &Segment, t0: f32, t1: f32, depth: u32, packer: &mut Packer) {
    let (p0, n0) = segment_point(seg, t0);
    let (p1, n1) = segment_point(seg, t1);

    let mut base = StrokedPoint {
        position: seg.from,
        pre_offset: vector(0.0, 0.0),
        auxiliary_offset: vector(0.0, 0.0),
        distance_from_edge_start: seg.distance_from_edge_start,
        distance_from_contour_start: seg.distance_from_contour_start,
        edge_length: seg.edge_length,
        contour_length: seg.contour_length,
        packed_data: 0,
    };

    let mut vs = [0u32; 6];
    for (i, &(end, side)) in [
        (false, 1.0f32),
        (false, 0.0),
        (false, -1.0),
        (true, 1.0),
        (true, 0.0),
        (true, -1.0),
    ]
    .iter()
    .enumerate()
    {
        let (pos, normal, t) = if end { (p1, n1, t1) } else { (p0, n0, t0) };
        base.position = pos;
        base.pre_offset = normal * side;
        let d = seg.length * t;
        base.distance_from_edge_start = seg.distance_from_edge_start + d;
        base.distance_from_contour_start = seg.distance_from_contour_start + d;
        base.packed_data = packed_data(OffsetType::SubEdge, side != 0.0, depth, false);
        vs[i] = packer.vertex(base);
    }

    packer.triangle(vs[0], vs[1], vs[4]);
    packer.triangle(vs[0], vs[4], vs[3]);
    packer.triangle(vs[1], vs[2], vs[5]);
    packer.triangle(vs[1], vs[5], vs[4]);
}

/// The bevel pair hiding the crack between two meeting sub-edges: one
/// triangle on the outside of the turn, one on the inside.
fn pack_inter_segment_bevel(prev: &Segment, next: &Segment, depth: u32, packer: &mut Packer) {
    let lambda = compute_bevel_lambda(prev.leaving_unit_vector, next.enter_unit_vector);
    let n0 = normal_of(prev.leaving_unit_vector);
    let n1 = normal_of(next.enter_unit_vector);

    let base = StrokedPoint {
        position: next.from,
        pre_offset: vector(0.0, 0.0),
        auxiliary_offset: vector(0.0, 0.0),
        distance_from_edge_start: next.distance_from_edge_start,
        distance_from_contour_start: next.distance_from_contour_start,
        edge_length: next.edge_length,
        contour_length: next.contour_length,
        packed_data: 0,
    };

    for &sign in &[1.0f32, -1.0] {
        let lam = lambda * sign;
        let center = packer.vertex(StrokedPoint {
            packed_data: packed_data(OffsetType::SharedWithEdge, false, depth, false),
            ..base
        });
        let a = packer.vertex(StrokedPoint {
            pre_offset: n0 * lam,
            packed_data: packed_data(OffsetType::SharedWithEdge, true, depth, false),
            ..base
        });
        let b = packer.vertex(StrokedPoint {
            pre_offset: n1 * lam,
            packed_data: packed_data(OffsetType::SharedWithEdge, true, depth, false),
            ..base
        });
        packer.triangle(center, a, b);
    }
}

fn join_base(join: &Join, depth: u32, offset_type: OffsetType, boundary: bool) -> StrokedPoint {
    StrokedPoint {
        position: join.position,
        pre_offset: vector(0.0, 0.0),
        auxiliary_offset: vector(0.0, 0.0),
        distance_from_edge_start: 0.0,
        distance_from_contour_start: join.distance_from_contour_start,
        edge_length: join.distance_from_previous_join,
        contour_length: join.contour_length,
        packed_data: packed_data(offset_type, boundary, depth, true),
    }
}

pub fn pack_bevel_join_size() -> PackSize {
    PackSize {
        number_attributes: 3,
        number_indices: 3,
        number_depths: 1,
    }
}

pub fn pack_bevel_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let n0 = join.enter_join_normal() * join.lambda;
    let n1 = join.leaving_join_normal() * join.lambda;

    let c = packer.vertex(join_base(join, depth, OffsetType::SharedWithEdge, false));
    let a = packer.vertex(StrokedPoint {
        pre_offset: n0,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });
    let b = packer.vertex(StrokedPoint {
        pre_offset: n1,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });
    packer.triangle(c, a, b);
    packer.finish();
}

pub fn pack_miter_clip_join_size() -> PackSize {
    PackSize {
        number_attributes: 5,
        number_indices: 9,
        number_depths: 1,
    }
}

/// Miter-clip joins carry both tip vertices so the shader can clip the
/// miter at the runtime miter limit.
pub fn pack_miter_clip_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let n0 = join.enter_join_normal();
    let n1 = join.leaving_join_normal();
    let sin_sign = if join.join_angle < 0.0 { 1 } else { 0 };
    let tip_bits = pack_bits(NORMAL0_Y_SIGN_BIT, 1, (n0.y < 0.0) as u32)
        | pack_bits(NORMAL1_Y_SIGN_BIT, 1, (n1.y < 0.0) as u32)
        | pack_bits(SIN_SIGN_BIT, 1, sin_sign);

    let c = packer.vertex(join_base(join, depth, OffsetType::SharedWithEdge, false));
    let e0 = packer.vertex(StrokedPoint {
        pre_offset: n0 * join.lambda,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });
    let mut tip = join_base(join, depth, OffsetType::MiterClipJoin, true);
    tip.pre_offset = n0 * join.lambda;
    tip.auxiliary_offset = n1 * join.lambda;
    tip.packed_data |= tip_bits;
    let t0 = packer.vertex(tip);
    tip.pre_offset = n1 * join.lambda;
    tip.auxiliary_offset = n0 * join.lambda;
    let t1 = packer.vertex(tip);
    let e1 = packer.vertex(StrokedPoint {
        pre_offset: n1 * join.lambda,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });

    packer.triangle(c, e0, t0);
    packer.triangle(c, t0, t1);
    packer.triangle(c, t1, e1);
    packer.finish();
}

pub fn pack_miter_join_size() -> PackSize {
    PackSize {
        number_attributes: 4,
        number_indices: 6,
        number_depths: 1,
    }
}

pub fn pack_miter_bevel_join_size() -> PackSize {
    pack_miter_join_size()
}

pub fn pack_miter_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_single_tip_miter(join, depth, OffsetType::MiterJoin, attributes, indices);
}

/// Like a miter join, but the shader falls back to the bevel triangle
/// instead of clipping when the runtime miter limit is exceeded.
pub fn pack_miter_bevel_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_single_tip_miter(join, depth, OffsetType::MiterBevelJoin, attributes, indices);
}

fn pack_single_tip_miter(
    join: &Join,
    depth: u32,
    offset_type: OffsetType,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let n0 = join.enter_join_normal() * join.lambda;
    let n1 = join.leaving_join_normal() * join.lambda;

    let c = packer.vertex(join_base(join, depth, OffsetType::SharedWithEdge, false));
    let e0 = packer.vertex(StrokedPoint {
        pre_offset: n0,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });
    let mut tip = join_base(join, depth, offset_type, true);
    tip.pre_offset = n0;
    tip.auxiliary_offset = n1;
    let t = packer.vertex(tip);
    let e1 = packer.vertex(StrokedPoint {
        pre_offset: n1,
        ..join_base(join, depth, OffsetType::SharedWithEdge, true)
    });

    packer.triangle(c, e0, t);
    packer.triangle(c, t, e1);
    packer.finish();
}

/// Rounded joins fan `arc_segment_count(|angle|, thresh)` rim vertices
/// around the join wedge.
pub fn pack_rounded_join_size(join: &Join, thresh: f32) -> PackSize {
    let n = arc_segment_count(join.join_angle.abs(), thresh) as usize;
    PackSize {
        number_attributes: 1 + n,
        number_indices: 3 * (n - 1),
        number_depths: 1,
    }
}

pub fn pack_rounded_join(
    join: &Join,
    thresh: f32,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let n = arc_segment_count(join.join_angle.abs(), thresh) as usize;
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let start = join.enter_join_normal() * join.lambda;
    let end = join.leaving_join_normal() * join.lambda;

    let c = packer.vertex(join_base(join, depth, OffsetType::SharedWithEdge, false));
    let mut prev = 0u32;
    for i in 0..n {
        let t = i as f32 / (n - 1) as f32;
        let mut p = join_base(join, depth, OffsetType::RoundedJoin, true);
        p.pre_offset = rotate(start, t * join.join_angle);
        p.auxiliary_offset = end;
        let v = packer.vertex(p);
        if i > 0 {
            packer.triangle(c, prev, v);
        }
        prev = v;
    }
    packer.finish();
}

pub fn pack_square_cap_size() -> PackSize {
    PackSize {
        number_attributes: 5,
        number_indices: 9,
        number_depths: 1,
    }
}

fn cap_base(cap: &Cap, depth: u32, offset_type: OffsetType, boundary: bool) -> StrokedPoint {
    let distance = if cap.is_starting_cap {
        0.0
    } else {
        cap.contour_length
    };
    StrokedPoint {
        position: cap.position,
        pre_offset: vector(0.0, 0.0),
        auxiliary_offset: vector(0.0, 0.0),
        distance_from_edge_start: if cap.is_starting_cap { 0.0 } else { cap.edge_length },
        distance_from_contour_start: distance,
        edge_length: cap.edge_length,
        contour_length: cap.contour_length,
        packed_data: packed_data(offset_type, boundary, depth, false),
    }
}

pub fn pack_square_cap(
    cap: &Cap,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let n = normal_of(cap.unit_vector);

    let c = packer.vertex(cap_base(cap, depth, OffsetType::SquareCap, false));
    let s0 = packer.vertex(StrokedPoint {
        pre_offset: n,
        ..cap_base(cap, depth, OffsetType::SquareCap, true)
    });
    let mut ext = cap_base(cap, depth, OffsetType::SquareCap, true);
    ext.pre_offset = n;
    ext.auxiliary_offset = cap.unit_vector;
    let e0 = packer.vertex(ext);
    ext.pre_offset = -n;
    let e1 = packer.vertex(ext);
    let s1 = packer.vertex(StrokedPoint {
        pre_offset: -n,
        ..cap_base(cap, depth, OffsetType::SquareCap, true)
    });

    packer.triangle(c, s0, e0);
    packer.triangle(c, e0, e1);
    packer.triangle(c, e1, s1);
    packer.finish();
}

pub fn pack_flat_cap_size() -> PackSize {
    PackSize {
        number_attributes: 6,
        number_indices: 12,
        number_depths: 1,
    }
}

pub fn pack_adjustable_cap_size() -> PackSize {
    pack_flat_cap_size()
}

pub fn pack_flat_cap(
    cap: &Cap,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_cap_stub(cap, depth, OffsetType::FlatCap, attributes, indices);
}

/// Adjustable caps carry the same stub quad as flat caps but with an
/// offset type the dash evaluator recognizes, so partial caps at a dash
/// boundary can be grown or suppressed per fragment.
pub fn pack_adjustable_cap(
    cap: &Cap,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_cap_stub(cap, depth, OffsetType::AdjustableCap, attributes, indices);
}

fn pack_cap_stub(
    cap: &Cap,
    depth: u32,
    offset_type: OffsetType,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    let n = normal_of(cap.unit_vector);
    let ending = pack_bits(CAP_ENDING_BIT, 1, 1);

    let mut vs = [0u32; 6];
    for (i, &(extended, side)) in [
        (false, 1.0f32),
        (false, 0.0),
        (false, -1.0),
        (true, 1.0),
        (true, 0.0),
        (true, -1.0),
    ]
    .iter()
    .enumerate()
    {
        let mut p = cap_base(cap, depth, offset_type, side != 0.0);
        p.pre_offset = n * side;
        if extended {
            p.auxiliary_offset = cap.unit_vector;
            p.packed_data |= ending;
        }
        vs[i] = packer.vertex(p);
    }

    packer.triangle(vs[0], vs[1], vs[4]);
    packer.triangle(vs[0], vs[4], vs[3]);
    packer.triangle(vs[1], vs[2], vs[5]);
    packer.triangle(vs[1], vs[5], vs[4]);
    packer.finish();
}

/// Rounded caps are the rounded-join fan at θ = π.
pub fn pack_rounded_cap_size(thresh: f32) -> PackSize {
    let n = arc_segment_count(PI, thresh) as usize;
    PackSize {
        number_attributes: 1 + n,
        number_indices: 3 * (n - 1),
        number_depths: 1,
    }
}

pub fn pack_rounded_cap(
    cap: &Cap,
    thresh: f32,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let n = arc_segment_count(PI, thresh) as usize;
    let mut packer = Packer {
        attributes,
        indices,
        attr_cursor: 0,
        index_cursor: 0,
    };
    // Sweep from +normal through the cap direction to -normal.
    let start = normal_of(cap.unit_vector);

    let c = packer.vertex(cap_base(cap, depth, OffsetType::RoundedCap, false));
    let mut prev = 0u32;
    for i in 0..n {
        let t = i as f32 / (n - 1) as f32;
        let mut p = cap_base(cap, depth, OffsetType::RoundedCap, true);
        p.pre_offset = rotate(start, -t * PI);
        p.auxiliary_offset = cap.unit_vector;
        let v = packer.vertex(p);
        if i > 0 {
            packer.triangle(c, prev, v);
        }
        prev = v;
    }
    packer.finish();
}

fn rotate(v: Vector, angle: f32) -> Vector {
    let (s, c) = angle.sin_cos();
    vector(c * v.x - s * v.y, s * v.x + c * v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_geom::math::point;
    use pictor_path::TessellatedPath;

    fn right_angle_join() -> Join {
        let mut builder = TessellatedPath::builder();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(1.0, 0.0));
        builder.line_to(point(1.0, 1.0));
        builder.end(false);
        builder.build().joins()[0]
    }

    #[test]
    fn point_wire_round_trip() {
        let p = StrokedPoint {
            position: point(1.5, -2.0),
            pre_offset: vector(0.0, 1.0),
            auxiliary_offset: vector(-1.0, 0.0),
            distance_from_edge_start: 0.25,
            distance_from_contour_start: 3.5,
            edge_length: 1.0,
            contour_length: 7.0,
            packed_data: packed_data(OffsetType::MiterClipJoin, true, 123_456, true),
        };
        let unpacked = StrokedPoint::unpack_point(&p.pack_point());
        assert_eq!(unpacked, p);
        assert_eq!(unpacked.offset_type(), Some(OffsetType::MiterClipJoin));
        assert!(unpacked.on_boundary());
        assert!(unpacked.is_join());
        assert_eq!(unpacked.depth(), 123_456);
    }

    #[test]
    fn bevel_join_pack() {
        let join = right_angle_join();
        let size = pack_bevel_join_size();
        let mut attrs = vec![PainterAttribute::default(); size.number_attributes];
        let mut indices = vec![0; size.number_indices];
        pack_bevel_join(&join, 5, &mut attrs, &mut indices);

        let center = StrokedPoint::unpack_point(&attrs[0]);
        assert!(!center.on_boundary());
        assert!(center.is_join());
        assert_eq!(center.depth(), 5);
        assert_eq!(center.position, point(1.0, 0.0));

        // Both rim offsets point to the outside of the left turn.
        for attr in &attrs[1..] {
            let p = StrokedPoint::unpack_point(attr);
            assert!(p.on_boundary());
            // Left turn: outside is the -normal side, y <= 0 or x >= 0.
            assert!(p.pre_offset.y <= 1e-6 || p.pre_offset.x >= -1e-6);
        }
    }

    #[test]
    fn rounded_join_counts_match_size() {
        let join = right_angle_join();
        for &thresh in &[0.5f32, 0.1, 0.01] {
            let size = pack_rounded_join_size(&join, thresh);
            let n = arc_segment_count(join.join_angle.abs(), thresh) as usize;
            assert_eq!(size.number_attributes, 1 + n);
            assert_eq!(size.number_indices, 3 * (n - 1));

            let mut attrs = vec![PainterAttribute::default(); size.number_attributes];
            let mut indices = vec![0; size.number_indices];
            pack_rounded_join(&join, thresh, 0, &mut attrs, &mut indices);
            // Rim offsets are unit length.
            for attr in &attrs[1..] {
                let p = StrokedPoint::unpack_point(attr);
                assert!((p.pre_offset.length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn rounded_cap_is_rounded_join_at_pi() {
        for &thresh in &[0.5f32, 0.05] {
            let n = arc_segment_count(PI, thresh) as usize;
            let size = pack_rounded_cap_size(thresh);
            assert_eq!(size.number_attributes, 1 + n);
            assert_eq!(size.number_indices, 3 * (n - 1));
        }
    }

    #[test]
    fn segment_chain_pack_sizes() {
        let mut builder = TessellatedPath::builder();
        builder.begin(point(0.0, 0.0));
        builder.edge_to(&[point(1.0, 0.0), point(2.0, 1.0), point(3.0, 1.0)]);
        builder.end(false);
        let path = builder.build();

        let chain = SegmentChain {
            segments: path.edge_segments(0, 0),
            prev_to_start: None,
        };
        let chains = [chain];
        let size = pack_segment_chains_size(&chains);
        // 3 segments, 2 bevels.
        assert_eq!(size.number_attributes, 6 * 3 + 6 * 2);
        assert_eq!(size.number_indices, 12 * 3 + 6 * 2);
        assert_eq!(size.number_depths, 5);

        let mut attrs = vec![PainterAttribute::default(); size.number_attributes];
        let mut indices = vec![0; size.number_indices];
        let depths = pack_segment_chains(&chains, 10, &mut attrs, &mut indices);
        assert_eq!(depths, 5);

        // Depths are within [10, 15) and every index is in range.
        for attr in &attrs {
            let d = StrokedPoint::unpack_point(attr).depth();
            assert!((10..15).contains(&d));
        }
        for &i in &indices {
            assert!((i as usize) < attrs.len());
        }
    }

    #[test]
    fn arc_segments_subdivide_to_cover_the_bulge() {
        // Half circle of radius 1 from (1, 0) to (-1, 0) through (0, 1).
        let mut builder = TessellatedPath::builder();
        builder.begin(point(1.0, 0.0));
        builder.arc_to(point(-1.0, 0.0), PI);
        builder.end(false);
        let path = builder.build();

        let chains = [SegmentChain {
            segments: path.edge_segments(0, 0),
            prev_to_start: None,
        }];
        let size = pack_segment_chains_size(&chains);
        let quads = arc_segment_count(PI, ARC_EDGE_THRESH) as usize;
        assert_eq!(size.number_attributes, 6 * quads);
        assert_eq!(size.number_indices, 12 * quads);
        assert_eq!(size.number_depths, 1);

        let mut attrs = vec![PainterAttribute::default(); size.number_attributes];
        let mut indices = vec![0; size.number_indices];
        pack_segment_chains(&chains, 0, &mut attrs, &mut indices);

        let mut top = f32::MIN;
        for attr in &attrs {
            let p = StrokedPoint::unpack_point(attr);
            // Every spine point sits on the arc, not on its chord.
            let r = (p.position - point(0.0, 0.0)).length();
            assert!((r - 1.0).abs() < 1e-3, "off the circle: r = {}", r);
            // Boundary offsets point along the radius.
            if p.on_boundary() {
                let radial = p.position - point(0.0, 0.0);
                let cross = radial.x * p.pre_offset.y - radial.y * p.pre_offset.x;
                assert!(cross.abs() < 1e-3);
            }
            top = top.max(p.position.y);
        }
        assert!(top > 0.99, "arc apex not covered, top = {}", top);
    }

    #[test]
    fn continuation_suppresses_bevel() {
        let mut builder = TessellatedPath::builder();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(4.0, 0.0));
        builder.end(false);
        let path = builder.build();
        let seg = path.edge_segments(0, 0)[0];
        let (before, after) = match seg.split(0, 2.0) {
            pictor_path::SegmentSplit::Split { before, after, .. } => (before, after),
            _ => panic!("expected a split"),
        };

        let pieces = [before, after];
        let whole = [SegmentChain {
            segments: &pieces,
            prev_to_start: None,
        }];
        // The second piece is a continuation, so no bevel between them.
        let size = pack_segment_chains_size(&whole);
        assert_eq!(size.number_depths, 2);
        assert_eq!(size.number_attributes, 12);
    }

    #[test]
    fn reverse_triangles_keeps_triples() {
        let mut indices = vec![0, 1, 2, 3, 4, 5, 6, 7, 8];
        reverse_triangles(&mut indices);
        assert_eq!(indices, vec![6, 7, 8, 3, 4, 5, 0, 1, 2]);
    }
}
