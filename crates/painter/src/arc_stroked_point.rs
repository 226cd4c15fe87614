//! Arc-rounded join/cap packing.
//!
//! Instead of approximating rounded joins and caps with triangle fans,
//! the arc variants emit a few arc-segment primitives whose coverage the
//! fragment shader evaluates per pixel. Each vertex carries the arc
//! center direction, per-unit angle and radius alongside the common
//! classification word (same common bit layout as
//! [`stroked_point`](../stroked_point/index.html)).

use pictor_geom::math::{normal_of, vector, Point, Vector, PI};
use pictor_path::{Cap, Join};

use crate::attribute::{
    pack_bits, pack_float, unpack_bits, unpack_float, PainterAttribute, PainterIndex,
};
use crate::stroked_point::{
    PackSize, BOUNDARY_BIT, DEPTH_BIT0, DEPTH_NUM_BITS, JOIN_BIT, OFFSET_TYPE_BIT0,
    OFFSET_TYPE_NUM_BITS,
};

/// Number of arc units a half-disc cap is carved into; joins use the same
/// per-unit angle `π / ARCS_PER_CAP`.
pub const ARCS_PER_CAP: u32 = 4;

/// Set on vertices displaced past the stroke boundary to give the
/// fragment shader room for the per-pixel arc coverage test.
pub const BEYOND_BOUNDARY_BIT: u32 = 26;

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArcOffsetType {
    /// On the arc spine.
    ArcPoint = 0,
    /// On the stroke boundary.
    ArcBoundaryPoint = 1,
    /// Capper vertex a dash evaluator may extend.
    DashedCapper = 2,
}

impl ArcOffsetType {
    pub fn from_bits(bits: u32) -> Option<ArcOffsetType> {
        Some(match bits {
            0 => ArcOffsetType::ArcPoint,
            1 => ArcOffsetType::ArcBoundaryPoint,
            2 => ArcOffsetType::DashedCapper,
            _ => {
                return None;
            }
        })
    }
}

/// An arc-stroke vertex before packing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArcStrokedPoint {
    pub position: Point,
    /// Unit direction from the arc center through this vertex.
    pub offset_direction: Vector,
    /// Spine radius; 0 when the arc is centered on the path (joins/caps).
    pub radius: f32,
    /// Angle the containing arc unit subtends.
    pub arc_angle: f32,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    pub packed_data: u32,
}

impl ArcStrokedPoint {
    pub fn offset_type(&self) -> Option<ArcOffsetType> {
        ArcOffsetType::from_bits(unpack_bits(
            OFFSET_TYPE_BIT0,
            OFFSET_TYPE_NUM_BITS,
            self.packed_data,
        ))
    }

    pub fn depth(&self) -> u32 {
        unpack_bits(DEPTH_BIT0, DEPTH_NUM_BITS, self.packed_data)
    }

    pub fn pack_point(&self) -> PainterAttribute {
        PainterAttribute {
            attrib0: [
                pack_float(self.position.x),
                pack_float(self.position.y),
                pack_float(self.offset_direction.x),
                pack_float(self.offset_direction.y),
            ],
            attrib1: [
                pack_float(self.distance_from_edge_start),
                pack_float(self.distance_from_contour_start),
                pack_float(self.radius),
                pack_float(self.arc_angle),
            ],
            attrib2: [
                self.packed_data,
                pack_float(self.edge_length),
                pack_float(self.contour_length),
                0,
            ],
        }
    }

    pub fn unpack_point(attr: &PainterAttribute) -> ArcStrokedPoint {
        ArcStrokedPoint {
            position: Point::new(unpack_float(attr.attrib0[0]), unpack_float(attr.attrib0[1])),
            offset_direction: vector(unpack_float(attr.attrib0[2]), unpack_float(attr.attrib0[3])),
            radius: unpack_float(attr.attrib1[2]),
            arc_angle: unpack_float(attr.attrib1[3]),
            distance_from_edge_start: unpack_float(attr.attrib1[0]),
            distance_from_contour_start: unpack_float(attr.attrib1[1]),
            edge_length: unpack_float(attr.attrib2[1]),
            contour_length: unpack_float(attr.attrib2[2]),
            packed_data: attr.attrib2[0],
        }
    }
}

fn arc_packed_data(
    offset_type: ArcOffsetType,
    boundary: bool,
    beyond: bool,
    depth: u32,
    join: bool,
) -> u32 {
    pack_bits(OFFSET_TYPE_BIT0, OFFSET_TYPE_NUM_BITS, offset_type as u32)
        | pack_bits(BOUNDARY_BIT, 1, boundary as u32)
        | pack_bits(DEPTH_BIT0, DEPTH_NUM_BITS, depth)
        | pack_bits(JOIN_BIT, 1, join as u32)
        | pack_bits(BEYOND_BOUNDARY_BIT, 1, beyond as u32)
}

/// Number of arc units covering `arc_angle`.
pub fn arc_unit_count(arc_angle: f32) -> usize {
    1 + (arc_angle.abs() / (PI / ARCS_PER_CAP as f32)) as usize
}

/// Sizes for [`pack_arc_join`](fn.pack_arc_join.html):
/// `3·count + 2` attributes / `9·count` indices for
/// `count = 1 + ⌊|angle| / (π/ARCS_PER_CAP)⌋`.
pub fn pack_join_size(join_angle: f32) -> PackSize {
    let count = arc_unit_count(join_angle);
    PackSize {
        number_attributes: 3 * count + 2,
        number_indices: 9 * count,
        number_depths: 1,
    }
}

/// Sizes for [`pack_arc_cap`](fn.pack_arc_cap.html): a join at θ = π.
pub fn pack_cap_size() -> PackSize {
    pack_join_size(PI)
}

struct FanGeometry {
    position: Point,
    start: Vector,
    sweep: f32,
    distance_from_edge_start: f32,
    distance_from_contour_start: f32,
    edge_length: f32,
    contour_length: f32,
    is_join: bool,
}

pub fn pack_arc_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_arc_fan(
        &FanGeometry {
            position: join.position,
            start: join.enter_join_normal() * join.lambda,
            sweep: join.join_angle,
            distance_from_edge_start: 0.0,
            distance_from_contour_start: join.distance_from_contour_start,
            edge_length: join.distance_from_previous_join,
            contour_length: join.contour_length,
            is_join: true,
        },
        depth,
        attributes,
        indices,
    );
}

pub fn pack_arc_cap(
    cap: &Cap,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    pack_arc_fan(
        &FanGeometry {
            position: cap.position,
            // From +normal through the cap direction to -normal.
            start: normal_of(cap.unit_vector),
            sweep: -PI,
            distance_from_edge_start: if cap.is_starting_cap { 0.0 } else { cap.edge_length },
            distance_from_contour_start: if cap.is_starting_cap {
                0.0
            } else {
                cap.contour_length
            },
            edge_length: cap.edge_length,
            contour_length: cap.contour_length,
            is_join: false,
        },
        depth,
        attributes,
        indices,
    );
}

fn pack_arc_fan(
    fan: &FanGeometry,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [PainterIndex],
) {
    let count = arc_unit_count(fan.sweep);
    debug_assert_eq!(attributes.len(), 3 * count + 2);
    debug_assert_eq!(indices.len(), 9 * count);

    let unit_angle = fan.sweep / count as f32;
    let base = ArcStrokedPoint {
        position: fan.position,
        offset_direction: vector(0.0, 0.0),
        radius: 0.0,
        arc_angle: unit_angle,
        distance_from_edge_start: fan.distance_from_edge_start,
        distance_from_contour_start: fan.distance_from_contour_start,
        edge_length: fan.edge_length,
        contour_length: fan.contour_length,
        packed_data: arc_packed_data(ArcOffsetType::ArcPoint, false, false, depth, fan.is_join),
    };

    // Layout: center, count+1 rim vertices, 2·count beyond-boundary
    // vertices.
    attributes[0] = base.pack_point();
    let rim0 = 1u32;
    let outer0 = rim0 + count as u32 + 1;

    for i in 0..=count {
        let dir = rotate(fan.start, i as f32 * unit_angle);
        let mut p = base;
        p.offset_direction = dir;
        p.packed_data =
            arc_packed_data(ArcOffsetType::ArcBoundaryPoint, true, false, depth, fan.is_join);
        attributes[(rim0 as usize) + i] = p.pack_point();
    }
    for i in 0..count {
        for (k, &t) in [0.25f32, 0.75].iter().enumerate() {
            let dir = rotate(fan.start, (i as f32 + t) * unit_angle);
            let mut p = base;
            p.offset_direction = dir;
            p.packed_data =
                arc_packed_data(ArcOffsetType::ArcBoundaryPoint, true, true, depth, fan.is_join);
            attributes[(outer0 as usize) + 2 * i + k] = p.pack_point();
        }
    }

    let mut cursor = 0;
    let mut triangle = |a: u32, b: u32, c: u32| {
        indices[cursor] = a;
        indices[cursor + 1] = b;
        indices[cursor + 2] = c;
        cursor += 3;
    };
    for i in 0..count as u32 {
        let r0 = rim0 + i;
        let r1 = rim0 + i + 1;
        let o0 = outer0 + 2 * i;
        let o1 = o0 + 1;
        triangle(0, r0, r1);
        triangle(r0, o0, o1);
        triangle(r0, o1, r1);
    }
    debug_assert_eq!(cursor, indices.len());
}

fn rotate(v: Vector, angle: f32) -> Vector {
    let (s, c) = angle.sin_cos();
    vector(c * v.x - s * v.y, s * v.x + c * v.y)
}
