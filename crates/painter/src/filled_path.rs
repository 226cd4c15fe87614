//! Fill geometry grouped by winding number.
//!
//! A [`FilledPath`](struct.FilledPath.html) takes a winding-labelled
//! triangulation and reorganizes it into a binary tree of spatially
//! disjoint subsets, each exposing chunked
//! [`PainterAttributeData`](../attribute_data/struct.PainterAttributeData.html):
//! one index chunk per winding number, addressed through the
//! winding-to-chunk bijection below, so a renderer can implement any fill
//! rule by choosing which chunks to draw. A parallel data set holds the
//! anti-alias fuzz, a ribbon of quads along every boundary between
//! regions of different winding number, chunked through the collapsed
//! variant of the same mapping.
//!
//! The mapping itself lays winding numbers out as 0, 1, -1, 2, -2, ...
//! after a block of reserved fill-rule slots, and must stay bitwise
//! stable: renderers bake it into their chunk selection tables.

use std::cell::RefCell;
use std::rc::Rc;

use pictor_geom::math::{normal_of, vector, Point};
use pictor_geom::BoundingBox;
use pictor_path::{FillTessellation, FillTriangle};

use crate::attribute::{pack_float, PainterAttribute, PainterIndex};
use crate::attribute_data::{
    AttributeDataFiller, DataSizes, FillDestination, PainterAttributeData, ZRange,
};
use crate::stroked_point::compute_bevel_lambda;

/// Chunk holding the triangles with winding number zero, drawn by the
/// complement-nonzero fill rule.
pub const COMPLEMENT_NONZERO_CHUNK: usize = 0;

/// First chunk index available to per-winding data; slots
/// 1..`FILL_RULE_DATA_COUNT` are reserved for the other fill rules.
pub const FILL_RULE_DATA_COUNT: usize = 4;

/// Fuzz vertex lying on the path boundary itself (full coverage).
pub const FUZZ_ON_PATH: u32 = 0;
/// Fuzz vertex pushed off the boundary by the fragment falloff (zero
/// coverage).
pub const FUZZ_ON_BOUNDARY: u32 = 1;
/// Off-boundary fuzz vertex at a corner, extended along the miter.
pub const FUZZ_ON_BOUNDARY_MITER: u32 = 2;

/// Subsets stop splitting below this many triangles.
const SPLITTING_THRESHOLD: usize = 50;
const MAX_RECURSION_DEPTH: u32 = 10;

/// Maps a winding number to the index chunk holding its triangles.
///
/// Zero maps to [`COMPLEMENT_NONZERO_CHUNK`](constant.COMPLEMENT_NONZERO_CHUNK.html);
/// non-zero windings follow in the order 1, -1, 2, -2, ... starting at
/// [`FILL_RULE_DATA_COUNT`](constant.FILL_RULE_DATA_COUNT.html).
pub fn chunk_from_winding_number(w: i32) -> usize {
    if w == 0 {
        return COMPLEMENT_NONZERO_CHUNK;
    }
    let sign_bit = (w < 0) as usize;
    FILL_RULE_DATA_COUNT + sign_bit + 2 * (w.abs() as usize - 1)
}

/// Inverse of [`chunk_from_winding_number`](fn.chunk_from_winding_number.html).
///
/// Panics on the reserved fill-rule slots, which hold no single winding
/// number.
pub fn winding_number_from_chunk(chunk: usize) -> i32 {
    if chunk == COMPLEMENT_NONZERO_CHUNK {
        return 0;
    }
    assert!(chunk >= FILL_RULE_DATA_COUNT);
    let k = chunk - FILL_RULE_DATA_COUNT;
    let magnitude = (k / 2) as i32 + 1;
    if k & 1 == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// The collapsed mapping used by the anti-alias fuzz data, which has no
/// reserved slots: 0, then 1, -1, 2, -2, ...
pub fn fuzz_chunk_from_winding_number(w: i32) -> usize {
    if w == 0 {
        return 0;
    }
    let sign_bit = (w < 0) as usize;
    1 + sign_bit + 2 * (w.abs() as usize - 1)
}

/// Inverse of [`fuzz_chunk_from_winding_number`](fn.fuzz_chunk_from_winding_number.html).
pub fn winding_number_from_fuzz_chunk(chunk: usize) -> i32 {
    if chunk == 0 {
        return 0;
    }
    let k = chunk - 1;
    let magnitude = (k / 2) as i32 + 1;
    if k & 1 == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// One boundary edge of the triangulation, with enough adjacency to emit
/// the corner miter toward the next edge of its chain.
#[derive(Copy, Clone, Debug)]
struct FuzzEdge {
    from: u32,
    to: u32,
    winding: i32,
    /// Endpoint of the following edge in the same chain, when that
    /// corner belongs to this edge.
    next_to: Option<u32>,
}

type LazyData = RefCell<Option<Rc<PainterAttributeData>>>;

struct FillSubsetData {
    bounding_box: BoundingBox,
    children: Option<[usize; 2]>,
    /// Leaf payload; empty on internal nodes.
    triangles: Vec<FillTriangle>,
    fuzz_edges: Vec<FuzzEdge>,
    painter_data: LazyData,
    fuzz_data: LazyData,
}

/// Winding-chunked fill data generator for one triangulation.
///
/// Re-entrant but not thread-safe: the lazy caches mutate on first
/// access, making the type `!Sync`.
pub struct FilledPath {
    points: Vec<Point>,
    subsets: Vec<FillSubsetData>,
}

impl FilledPath {
    pub fn new(tess: &FillTessellation) -> Self {
        let mut fuzz_edges = Vec::new();
        for chain in tess.boundary_chains() {
            let n = chain.number_edges();
            for i in 0..n {
                let (from, to) = chain.edge(i);
                // The corner at `to` exists whenever another edge of the
                // chain leaves from it.
                let next_to = if i + 1 < n || chain.closed {
                    Some(chain.edge((i + 1) % n).1)
                } else {
                    None
                };
                fuzz_edges.push(FuzzEdge {
                    from,
                    to,
                    winding: chain.winding,
                    next_to,
                });
            }
        }

        let mut path = FilledPath {
            points: tess.points().to_vec(),
            subsets: Vec::new(),
        };
        path.build_subset(tess.triangles().to_vec(), fuzz_edges, 0);
        path
    }

    fn build_subset(
        &mut self,
        triangles: Vec<FillTriangle>,
        fuzz_edges: Vec<FuzzEdge>,
        recursion_depth: u32,
    ) -> usize {
        let mut bbox = BoundingBox::new();
        for tri in &triangles {
            for &i in &tri.indices {
                bbox.union_point(self.points[i as usize]);
            }
        }
        for edge in &fuzz_edges {
            bbox.union_point(self.points[edge.from as usize]);
            bbox.union_point(self.points[edge.to as usize]);
        }

        let index = self.subsets.len();
        self.subsets.push(FillSubsetData {
            bounding_box: bbox,
            children: None,
            triangles: Vec::new(),
            fuzz_edges: Vec::new(),
            painter_data: LazyData::default(),
            fuzz_data: LazyData::default(),
        });

        if triangles.len() <= SPLITTING_THRESHOLD
            || recursion_depth >= MAX_RECURSION_DEPTH
            || bbox.is_empty()
        {
            self.subsets[index].triangles = triangles;
            self.subsets[index].fuzz_edges = fuzz_edges;
            return index;
        }

        // Cut the longer bbox axis at its midpoint; whole triangles go to
        // the side their centroid falls on, ties to the before child.
        let size = bbox.size();
        let coordinate = if size.x >= size.y { 0 } else { 1 };
        let center = bbox.min() + (bbox.max() - bbox.min()) * 0.5;
        let value = if coordinate == 0 { center.x } else { center.y };

        let side = |p: Point| -> bool {
            let c = if coordinate == 0 { p.x } else { p.y };
            c > value
        };
        let centroid = |tri: &FillTriangle| -> Point {
            let [a, b, c] = tri.indices;
            let (a, b, c) = (
                self.points[a as usize],
                self.points[b as usize],
                self.points[c as usize],
            );
            point_average(a, b, c)
        };

        let (after_tris, before_tris): (Vec<_>, Vec<_>) =
            triangles.into_iter().partition(|t| side(centroid(t)));
        let (after_edges, before_edges): (Vec<_>, Vec<_>) = fuzz_edges.into_iter().partition(|e| {
            let from = self.points[e.from as usize];
            let to = self.points[e.to as usize];
            side(from + (to - from) * 0.5)
        });

        if before_tris.is_empty() || after_tris.is_empty() {
            // The midpoint cut did not separate anything; keep the leaf.
            self.subsets[index].triangles = if before_tris.is_empty() {
                after_tris
            } else {
                before_tris
            };
            self.subsets[index].fuzz_edges = before_edges
                .into_iter()
                .chain(after_edges.into_iter())
                .collect();
            return index;
        }

        let c0 = self.build_subset(before_tris, before_edges, recursion_depth + 1);
        let c1 = self.build_subset(after_tris, after_edges, recursion_depth + 1);
        self.subsets[index].children = Some([c0, c1]);
        index
    }

    pub fn number_subsets(&self) -> usize {
        self.subsets.len()
    }

    pub fn subset_bounding_box(&self, subset: usize) -> &BoundingBox {
        &self.subsets[subset].bounding_box
    }

    pub fn subset_children(&self, subset: usize) -> Option<[usize; 2]> {
        self.subsets[subset].children
    }

    /// All winding-labelled triangles covered by `subset`, including its
    /// descendants'.
    fn gather_triangles(&self, subset: usize) -> Vec<FillTriangle> {
        let mut out = Vec::new();
        let mut stack = vec![subset];
        while let Some(s) = stack.pop() {
            let data = &self.subsets[s];
            match data.children {
                Some([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
                None => out.extend_from_slice(&data.triangles),
            }
        }
        out
    }

    fn gather_fuzz_edges(&self, subset: usize) -> Vec<FuzzEdge> {
        let mut out = Vec::new();
        let mut stack = vec![subset];
        while let Some(s) = stack.pop() {
            let data = &self.subsets[s];
            match data.children {
                Some([a, b]) => {
                    stack.push(b);
                    stack.push(a);
                }
                None => out.extend_from_slice(&data.fuzz_edges),
            }
        }
        out
    }

    /// The per-winding triangle data of `subset`; index chunk `c` holds
    /// the triangles of winding `winding_number_from_chunk(c)`. Built on
    /// first access.
    pub fn painter_data(&self, subset: usize) -> Rc<PainterAttributeData> {
        let cell = &self.subsets[subset].painter_data;
        if let Some(data) = &*cell.borrow() {
            return Rc::clone(data);
        }
        let data = Rc::new(PainterAttributeData::from_filler(&WindingFiller {
            points: &self.points,
            triangles: &self.gather_triangles(subset),
        }));
        *cell.borrow_mut() = Some(Rc::clone(&data));
        data
    }

    /// The anti-alias fuzz ribbon of `subset`, chunked by
    /// `fuzz_chunk_from_winding_number`. Built on first access.
    pub fn aa_fuzz_painter_data(&self, subset: usize) -> Rc<PainterAttributeData> {
        let cell = &self.subsets[subset].fuzz_data;
        if let Some(data) = &*cell.borrow() {
            return Rc::clone(data);
        }
        let data = Rc::new(PainterAttributeData::from_filler(&FuzzFiller {
            points: &self.points,
            edges: &self.gather_fuzz_edges(subset),
        }));
        *cell.borrow_mut() = Some(Rc::clone(&data));
        data
    }
}

fn point_average(a: Point, b: Point, c: Point) -> Point {
    Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// Fill vertices carry only a position; coverage is implied by the fill
/// rule.
pub fn pack_fill_point(p: Point) -> PainterAttribute {
    PainterAttribute {
        attrib0: [pack_float(p.x), pack_float(p.y), 0, 0],
        attrib1: [0; 4],
        attrib2: [0; 4],
    }
}

/// Fuzz vertices carry position, classification and the boundary normal
/// along which off-boundary vertices are pushed out.
pub fn pack_fuzz_point(p: Point, classification: u32, normal: pictor_geom::math::Vector) -> PainterAttribute {
    PainterAttribute {
        attrib0: [pack_float(p.x), pack_float(p.y), classification, 0],
        attrib1: [pack_float(normal.x), pack_float(normal.y), 0, 0],
        attrib2: [0; 4],
    }
}

struct WindingFiller<'l> {
    points: &'l [Point],
    triangles: &'l [FillTriangle],
}

impl<'l> WindingFiller<'l> {
    fn number_chunks(&self) -> usize {
        self.triangles
            .iter()
            .map(|t| chunk_from_winding_number(t.winding) + 1)
            .max()
            .unwrap_or(1)
    }
}

impl<'l> AttributeDataFiller for WindingFiller<'l> {
    fn compute_sizes(&self, sizes: &mut DataSizes) {
        sizes.number_attributes = self.points.len();
        sizes.number_indices = 3 * self.triangles.len();
        sizes.number_attribute_chunks = 1;
        sizes.number_index_chunks = self.number_chunks();
        sizes.number_z_ranges = sizes.number_index_chunks;
    }

    fn fill_data(&self, dst: &mut FillDestination) {
        for (i, &p) in self.points.iter().enumerate() {
            dst.attributes[i] = pack_fill_point(p);
        }
        dst.attribute_chunks[0] = 0..self.points.len();

        let number_chunks = self.number_chunks();
        let mut counts = vec![0usize; number_chunks];
        for tri in self.triangles {
            counts[chunk_from_winding_number(tri.winding)] += 3;
        }
        let mut cursor = 0;
        let mut cursors = Vec::with_capacity(number_chunks);
        for (chunk, &count) in counts.iter().enumerate() {
            dst.index_chunks[chunk] = cursor..cursor + count;
            dst.index_adjusts[chunk] = 0;
            // Fill data carries no depth ordering of its own.
            dst.z_ranges[chunk] = if count > 0 {
                ZRange { begin: 0, end: 1 }
            } else {
                ZRange::default()
            };
            cursors.push(cursor);
            cursor += count;
        }
        for tri in self.triangles {
            let chunk = chunk_from_winding_number(tri.winding);
            let at = cursors[chunk];
            dst.indices[at] = tri.indices[0];
            dst.indices[at + 1] = tri.indices[1];
            dst.indices[at + 2] = tri.indices[2];
            cursors[chunk] += 3;
        }
    }
}

struct FuzzFiller<'l> {
    points: &'l [Point],
    edges: &'l [FuzzEdge],
}

impl<'l> FuzzFiller<'l> {
    fn number_chunks(&self) -> usize {
        self.edges
            .iter()
            .map(|e| fuzz_chunk_from_winding_number(e.winding) + 1)
            .max()
            .unwrap_or(1)
    }

    fn edge_sizes(edge: &FuzzEdge) -> (usize, usize) {
        // Quad per edge, plus a miter triangle at an interior corner.
        match edge.next_to {
            Some(_) => (4 + 3, 6 + 3),
            None => (4, 6),
        }
    }

    fn pack_edge(
        &self,
        edge: &FuzzEdge,
        base: usize,
        attributes: &mut [PainterAttribute],
        indices: &mut [PainterIndex],
    ) {
        let from = self.points[edge.from as usize];
        let to = self.points[edge.to as usize];
        let delta = to - from;
        let len = delta.length().max(1e-6);
        let direction = delta / len;
        let normal = normal_of(direction);

        attributes[0] = pack_fuzz_point(from, FUZZ_ON_PATH, vector(0.0, 0.0));
        attributes[1] = pack_fuzz_point(to, FUZZ_ON_PATH, vector(0.0, 0.0));
        attributes[2] = pack_fuzz_point(from, FUZZ_ON_BOUNDARY, normal);
        attributes[3] = pack_fuzz_point(to, FUZZ_ON_BOUNDARY, normal);

        let b = base as u32;
        indices[0] = b;
        indices[1] = b + 2;
        indices[2] = b + 3;
        indices[3] = b;
        indices[4] = b + 3;
        indices[5] = b + 1;

        if let Some(next_to) = edge.next_to {
            let next = self.points[next_to as usize];
            let next_delta = next - to;
            let next_len = next_delta.length().max(1e-6);
            let next_direction = next_delta / next_len;
            let next_normal = normal_of(next_direction);
            // Push both miter vertices toward the outside of the turn,
            // each along its own edge normal; the shader extends them to
            // the shared miter point.
            let lambda = compute_bevel_lambda(direction, next_direction);

            attributes[4] = pack_fuzz_point(to, FUZZ_ON_PATH, vector(0.0, 0.0));
            attributes[5] = pack_fuzz_point(to, FUZZ_ON_BOUNDARY_MITER, normal * lambda);
            attributes[6] = pack_fuzz_point(to, FUZZ_ON_BOUNDARY_MITER, next_normal * lambda);
            indices[6] = b + 4;
            indices[7] = b + 5;
            indices[8] = b + 6;
        }
    }
}

impl<'l> AttributeDataFiller for FuzzFiller<'l> {
    fn compute_sizes(&self, sizes: &mut DataSizes) {
        for edge in self.edges {
            let (a, i) = FuzzFiller::edge_sizes(edge);
            sizes.number_attributes += a;
            sizes.number_indices += i;
        }
        sizes.number_attribute_chunks = 1;
        sizes.number_index_chunks = self.number_chunks();
        sizes.number_z_ranges = sizes.number_index_chunks;
    }

    fn fill_data(&self, dst: &mut FillDestination) {
        let number_chunks = self.number_chunks();

        // Group edges per chunk so each chunk's indices are contiguous.
        let mut attr_counts = vec![0usize; number_chunks];
        let mut index_counts = vec![0usize; number_chunks];
        for edge in self.edges {
            let chunk = fuzz_chunk_from_winding_number(edge.winding);
            let (a, i) = FuzzFiller::edge_sizes(edge);
            attr_counts[chunk] += a;
            index_counts[chunk] += i;
        }
        let mut attr_cursors = vec![0usize; number_chunks];
        let mut index_cursors = vec![0usize; number_chunks];
        let mut attr_cursor = 0;
        let mut index_cursor = 0;
        for chunk in 0..number_chunks {
            attr_cursors[chunk] = attr_cursor;
            index_cursors[chunk] = index_cursor;
            dst.index_chunks[chunk] = index_cursor..index_cursor + index_counts[chunk];
            dst.index_adjusts[chunk] = 0;
            dst.z_ranges[chunk] = if index_counts[chunk] > 0 {
                ZRange { begin: 0, end: 1 }
            } else {
                ZRange::default()
            };
            attr_cursor += attr_counts[chunk];
            index_cursor += index_counts[chunk];
        }
        dst.attribute_chunks[0] = 0..attr_cursor;

        for edge in self.edges {
            let chunk = fuzz_chunk_from_winding_number(edge.winding);
            let (a, i) = FuzzFiller::edge_sizes(edge);
            let a0 = attr_cursors[chunk];
            let i0 = index_cursors[chunk];
            self.pack_edge(
                edge,
                a0,
                &mut dst.attributes[a0..a0 + a],
                &mut dst.indices[i0..i0 + i],
            );
            attr_cursors[chunk] += a;
            index_cursors[chunk] += i;
        }
    }
}
