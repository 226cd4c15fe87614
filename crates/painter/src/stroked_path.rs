//! Stroke geometry organized per subset and per style.
//!
//! A [`StrokedPath`](struct.StrokedPath.html) owns the spatial partition
//! of a tessellated path plus, per subset, lazily generated
//! [`PainterAttributeData`](../attribute_data/struct.PainterAttributeData.html)
//! for the edges and (through
//! [`StrokedCapsJoins`](struct.StrokedCapsJoins.html)) for every join and
//! cap style. Everything a draw-time decision can pick is precomputed:
//! all three miter variants exist side by side, rounded data is cached
//! per tessellation threshold.
//!
//! Depth values within one subset follow a fixed order the renderer's
//! occlusion scheme depends on: non-closing edges, then joins, then caps,
//! then closing edges. Index buffers are stored with triangle order
//! reversed, so drawing front to back visits decreasing depth.

use std::cell::RefCell;
use std::rc::Rc;

use pictor_path::{Cap, Join, SegmentChain, TessellatedPath};

use crate::arc_stroked_point;
use crate::attribute::{PainterAttribute, PainterIndex};
use crate::attribute_data::{
    AttributeDataFiller, DataSizes, FillDestination, PainterAttributeData, ZRange,
};
use crate::partitioned_path::{PartitionedTessellatedPath, SubsetId};
use crate::stroked_point::{self, PackSize};

/// Index chunk of the non-closing edges in edge data.
pub const EDGE_CHUNK_NON_CLOSING: usize = 0;
/// Index chunk of the edges generated by closing contours.
pub const EDGE_CHUNK_CLOSING: usize = 1;
/// Index chunk of joins not involving a closing edge.
pub const JOIN_CHUNK_NON_CLOSING: usize = 0;
/// Index chunk of joins on a closing edge.
pub const JOIN_CHUNK_CLOSING: usize = 1;
/// The single index chunk of cap data.
pub const CAP_CHUNK: usize = 0;

type LazyData = RefCell<Option<Rc<PainterAttributeData>>>;
type ThreshCache = RefCell<Vec<(f32, Rc<PainterAttributeData>)>>;

/// Per-subset depth budget; the bases encode the edge/join/cap/closing
/// ordering.
#[derive(Copy, Clone, Debug, Default)]
struct DepthCounts {
    non_closing_edges: u32,
    joins: u32,
    caps: u32,
    closing_edges: u32,
}

impl DepthCounts {
    fn join_base(&self) -> u32 {
        self.non_closing_edges
    }

    fn cap_base(&self) -> u32 {
        self.non_closing_edges + self.joins
    }

    fn closing_edge_base(&self) -> u32 {
        self.non_closing_edges + self.joins + self.caps
    }
}

struct EdgeCache {
    data: LazyData,
    depth: DepthCounts,
}

struct CapsJoinsSubset {
    /// Non-closing joins first, closing-edge joins after.
    joins: Vec<Join>,
    number_non_closing_joins: usize,
    caps: Vec<Cap>,
    join_depth_base: u32,
    cap_depth_base: u32,

    bevel_joins: LazyData,
    miter_clip_joins: LazyData,
    miter_joins: LazyData,
    miter_bevel_joins: LazyData,
    rounded_joins: ThreshCache,
    arc_rounded_joins: LazyData,

    square_caps: LazyData,
    flat_caps: LazyData,
    adjustable_caps: LazyData,
    rounded_caps: ThreshCache,
    arc_rounded_caps: LazyData,
}

/// Join and cap attribute data per subset and per style.
///
/// Re-entrant but not thread-safe: the lazy caches mutate on first
/// access, making the type `!Sync`.
pub struct StrokedCapsJoins {
    subsets: Vec<CapsJoinsSubset>,
}

/// Stroke data generator for one tessellated path.
pub struct StrokedPath {
    partition: PartitionedTessellatedPath,
    edges: Vec<EdgeCache>,
    caps_joins: StrokedCapsJoins,
}

impl StrokedPath {
    pub fn new(path: &TessellatedPath) -> Self {
        let partition = PartitionedTessellatedPath::new(path);

        let mut edges = Vec::with_capacity(partition.number_subsets());
        let mut cj_subsets = Vec::with_capacity(partition.number_subsets());
        for index in 0..partition.number_subsets() {
            let subset = partition.subset(SubsetId(index as u32));

            let chains = subset.segment_chains();
            let (non_closing, closing) = split_closing_chains(&chains);
            let nc_size = stroked_point::pack_segment_chains_size(&non_closing);
            let c_size = stroked_point::pack_segment_chains_size(&closing);

            let mut joins: Vec<Join> =
                subset.joins().iter().map(|j| **j).filter(|j| !j.of_closing_edge).collect();
            let number_non_closing_joins = joins.len();
            joins.extend(subset.joins().iter().map(|j| **j).filter(|j| j.of_closing_edge));
            let caps: Vec<Cap> = subset.caps().iter().map(|c| **c).collect();

            let depth = DepthCounts {
                non_closing_edges: nc_size.number_depths as u32,
                joins: joins.len() as u32,
                caps: caps.len() as u32,
                closing_edges: c_size.number_depths as u32,
            };

            cj_subsets.push(CapsJoinsSubset {
                joins,
                number_non_closing_joins,
                caps,
                join_depth_base: depth.join_base(),
                cap_depth_base: depth.cap_base(),
                bevel_joins: LazyData::default(),
                miter_clip_joins: LazyData::default(),
                miter_joins: LazyData::default(),
                miter_bevel_joins: LazyData::default(),
                rounded_joins: ThreshCache::default(),
                arc_rounded_joins: LazyData::default(),
                square_caps: LazyData::default(),
                flat_caps: LazyData::default(),
                adjustable_caps: LazyData::default(),
                rounded_caps: ThreshCache::default(),
                arc_rounded_caps: LazyData::default(),
            });
            edges.push(EdgeCache {
                data: LazyData::default(),
                depth,
            });
        }

        StrokedPath {
            partition,
            edges,
            caps_joins: StrokedCapsJoins {
                subsets: cj_subsets,
            },
        }
    }

    pub fn partition(&self) -> &PartitionedTessellatedPath {
        &self.partition
    }

    pub fn caps_joins(&self) -> &StrokedCapsJoins {
        &self.caps_joins
    }

    /// The number of depth (z) values subset `id`'s geometry occupies,
    /// over all of its edges, joins and caps.
    pub fn number_depths(&self, id: SubsetId) -> u32 {
        let d = &self.edges[id.index()].depth;
        d.closing_edge_base() + d.closing_edges
    }

    /// The edge quads/bevels of subset `id`; built on first access.
    pub fn edges(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let cache = &self.edges[id.index()];
        lazy(&cache.data, || {
            let subset = self.partition.subset(id);
            let chains = subset.segment_chains();
            let (non_closing, closing) = split_closing_chains(&chains);
            PainterAttributeData::from_filler(&EdgeFiller {
                non_closing: &non_closing,
                closing: &closing,
                depth: cache.depth,
            })
        })
    }

    pub fn bevel_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.bevel_joins(id)
    }

    pub fn miter_clip_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.miter_clip_joins(id)
    }

    pub fn miter_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.miter_joins(id)
    }

    pub fn miter_bevel_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.miter_bevel_joins(id)
    }

    pub fn rounded_joins(&self, id: SubsetId, thresh: f32) -> Rc<PainterAttributeData> {
        self.caps_joins.rounded_joins(id, thresh)
    }

    pub fn arc_rounded_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.arc_rounded_joins(id)
    }

    pub fn square_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.square_caps(id)
    }

    pub fn flat_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.flat_caps(id)
    }

    pub fn adjustable_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.adjustable_caps(id)
    }

    pub fn rounded_caps(&self, id: SubsetId, thresh: f32) -> Rc<PainterAttributeData> {
        self.caps_joins.rounded_caps(id, thresh)
    }

    pub fn arc_rounded_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        self.caps_joins.arc_rounded_caps(id)
    }
}

#[derive(Copy, Clone)]
enum JoinVariant {
    Bevel,
    MiterClip,
    Miter,
    MiterBevel,
    Rounded(f32),
    ArcRounded,
}

#[derive(Copy, Clone)]
enum CapVariant {
    Square,
    Flat,
    Adjustable,
    Rounded(f32),
    ArcRounded,
}

impl StrokedCapsJoins {
    pub fn number_subsets(&self) -> usize {
        self.subsets.len()
    }

    pub fn bevel_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.bevel_joins, || s.build_joins(JoinVariant::Bevel))
    }

    pub fn miter_clip_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.miter_clip_joins, || s.build_joins(JoinVariant::MiterClip))
    }

    pub fn miter_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.miter_joins, || s.build_joins(JoinVariant::Miter))
    }

    pub fn miter_bevel_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.miter_bevel_joins, || s.build_joins(JoinVariant::MiterBevel))
    }

    /// Rounded join fans tessellated for `thresh`; cached per distinct
    /// threshold value.
    pub fn rounded_joins(&self, id: SubsetId, thresh: f32) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy_thresh(&s.rounded_joins, thresh, || {
            s.build_joins(JoinVariant::Rounded(thresh))
        })
    }

    pub fn arc_rounded_joins(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.arc_rounded_joins, || s.build_joins(JoinVariant::ArcRounded))
    }

    pub fn square_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.square_caps, || s.build_caps(CapVariant::Square))
    }

    pub fn flat_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.flat_caps, || s.build_caps(CapVariant::Flat))
    }

    pub fn adjustable_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.adjustable_caps, || s.build_caps(CapVariant::Adjustable))
    }

    pub fn rounded_caps(&self, id: SubsetId, thresh: f32) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy_thresh(&s.rounded_caps, thresh, || {
            s.build_caps(CapVariant::Rounded(thresh))
        })
    }

    pub fn arc_rounded_caps(&self, id: SubsetId) -> Rc<PainterAttributeData> {
        let s = &self.subsets[id.index()];
        lazy(&s.arc_rounded_caps, || s.build_caps(CapVariant::ArcRounded))
    }
}

impl CapsJoinsSubset {
    fn build_joins(&self, variant: JoinVariant) -> PainterAttributeData {
        PainterAttributeData::from_filler(&JoinFiller {
            joins: &self.joins,
            number_non_closing: self.number_non_closing_joins,
            depth_base: self.join_depth_base,
            variant,
        })
    }

    fn build_caps(&self, variant: CapVariant) -> PainterAttributeData {
        PainterAttributeData::from_filler(&CapFiller {
            caps: &self.caps,
            depth_base: self.cap_depth_base,
            variant,
        })
    }
}

fn lazy(cell: &LazyData, build: impl FnOnce() -> PainterAttributeData) -> Rc<PainterAttributeData> {
    if let Some(data) = &*cell.borrow() {
        return Rc::clone(data);
    }
    let data = Rc::new(build());
    *cell.borrow_mut() = Some(Rc::clone(&data));
    data
}

fn lazy_thresh(
    cache: &ThreshCache,
    thresh: f32,
    build: impl FnOnce() -> PainterAttributeData,
) -> Rc<PainterAttributeData> {
    for (t, data) in cache.borrow().iter() {
        if *t == thresh {
            return Rc::clone(data);
        }
    }
    let data = Rc::new(build());
    cache.borrow_mut().push((thresh, Rc::clone(&data)));
    data
}

fn split_closing_chains<'l>(
    chains: &[SegmentChain<'l>],
) -> (Vec<SegmentChain<'l>>, Vec<SegmentChain<'l>>) {
    chains
        .iter()
        .copied()
        .partition(|c| !c.segments.first().map_or(false, |s| s.of_closing_edge))
}

struct EdgeFiller<'l> {
    non_closing: &'l [SegmentChain<'l>],
    closing: &'l [SegmentChain<'l>],
    depth: DepthCounts,
}

impl<'l> AttributeDataFiller for EdgeFiller<'l> {
    fn compute_sizes(&self, sizes: &mut DataSizes) {
        let nc = stroked_point::pack_segment_chains_size(self.non_closing);
        let c = stroked_point::pack_segment_chains_size(self.closing);
        sizes.number_attributes = nc.number_attributes + c.number_attributes;
        sizes.number_indices = nc.number_indices + c.number_indices;
        sizes.number_attribute_chunks = 1;
        sizes.number_index_chunks = 2;
        sizes.number_z_ranges = 2;
    }

    fn fill_data(&self, dst: &mut FillDestination) {
        let nc = stroked_point::pack_segment_chains_size(self.non_closing);

        let (nc_attrs, c_attrs) = dst.attributes.split_at_mut(nc.number_attributes);
        let (nc_indices, c_indices) = dst.indices.split_at_mut(nc.number_indices);

        stroked_point::pack_segment_chains(self.non_closing, 0, nc_attrs, nc_indices);
        stroked_point::pack_segment_chains(
            self.closing,
            self.depth.closing_edge_base(),
            c_attrs,
            c_indices,
        );
        stroked_point::reverse_triangles(nc_indices);
        stroked_point::reverse_triangles(c_indices);

        dst.attribute_chunks[0] = 0..nc_attrs.len() + c_attrs.len();
        dst.index_chunks[EDGE_CHUNK_NON_CLOSING] = 0..nc_indices.len();
        dst.index_chunks[EDGE_CHUNK_CLOSING] =
            nc_indices.len()..nc_indices.len() + c_indices.len();
        // Closing indices are relative to their own attribute run.
        dst.index_adjusts[EDGE_CHUNK_NON_CLOSING] = 0;
        dst.index_adjusts[EDGE_CHUNK_CLOSING] = nc.number_attributes as i32;
        dst.z_ranges[EDGE_CHUNK_NON_CLOSING] = ZRange {
            begin: 0,
            end: self.depth.non_closing_edges as i32,
        };
        dst.z_ranges[EDGE_CHUNK_CLOSING] = ZRange {
            begin: self.depth.closing_edge_base() as i32,
            end: (self.depth.closing_edge_base() + self.depth.closing_edges) as i32,
        };
    }
}

struct JoinFiller<'l> {
    joins: &'l [Join],
    number_non_closing: usize,
    depth_base: u32,
    variant: JoinVariant,
}

impl<'l> JoinFiller<'l> {
    fn join_size(&self, join: &Join) -> PackSize {
        match self.variant {
            JoinVariant::Bevel => stroked_point::pack_bevel_join_size(),
            JoinVariant::MiterClip => stroked_point::pack_miter_clip_join_size(),
            JoinVariant::Miter => stroked_point::pack_miter_join_size(),
            JoinVariant::MiterBevel => stroked_point::pack_miter_bevel_join_size(),
            JoinVariant::Rounded(thresh) => stroked_point::pack_rounded_join_size(join, thresh),
            JoinVariant::ArcRounded => arc_stroked_point::pack_join_size(join.join_angle),
        }
    }

    fn pack_join(
        &self,
        join: &Join,
        depth: u32,
        attrs: &mut [PainterAttribute],
        indices: &mut [PainterIndex],
    ) {
        match self.variant {
            JoinVariant::Bevel => stroked_point::pack_bevel_join(join, depth, attrs, indices),
            JoinVariant::MiterClip => {
                stroked_point::pack_miter_clip_join(join, depth, attrs, indices)
            }
            JoinVariant::Miter => stroked_point::pack_miter_join(join, depth, attrs, indices),
            JoinVariant::MiterBevel => {
                stroked_point::pack_miter_bevel_join(join, depth, attrs, indices)
            }
            JoinVariant::Rounded(thresh) => {
                stroked_point::pack_rounded_join(join, thresh, depth, attrs, indices)
            }
            JoinVariant::ArcRounded => arc_stroked_point::pack_arc_join(join, depth, attrs, indices),
        }
    }
}

impl<'l> AttributeDataFiller for JoinFiller<'l> {
    fn compute_sizes(&self, sizes: &mut DataSizes) {
        for join in self.joins {
            let s = self.join_size(join);
            sizes.number_attributes += s.number_attributes;
            sizes.number_indices += s.number_indices;
        }
        sizes.number_attribute_chunks = 1;
        sizes.number_index_chunks = 2;
        sizes.number_z_ranges = 2;
    }

    fn fill_data(&self, dst: &mut FillDestination) {
        let mut attr_cursor = 0;
        let mut index_cursor = 0;
        let mut non_closing_indices_end = 0;

        for (j, join) in self.joins.iter().enumerate() {
            let s = self.join_size(join);
            let attrs = &mut dst.attributes[attr_cursor..attr_cursor + s.number_attributes];
            let indices = &mut dst.indices[index_cursor..index_cursor + s.number_indices];
            self.pack_join(join, self.depth_base + j as u32, attrs, indices);
            // Make indices absolute within the flat attribute array.
            for i in indices.iter_mut() {
                *i += attr_cursor as u32;
            }
            attr_cursor += s.number_attributes;
            index_cursor += s.number_indices;
            if j + 1 == self.number_non_closing {
                non_closing_indices_end = index_cursor;
            }
        }
        if self.number_non_closing == self.joins.len() {
            non_closing_indices_end = index_cursor;
        }

        let (nc, c) = dst.indices.split_at_mut(non_closing_indices_end);
        stroked_point::reverse_triangles(nc);
        stroked_point::reverse_triangles(c);

        dst.attribute_chunks[0] = 0..attr_cursor;
        dst.index_chunks[JOIN_CHUNK_NON_CLOSING] = 0..non_closing_indices_end;
        dst.index_chunks[JOIN_CHUNK_CLOSING] = non_closing_indices_end..index_cursor;
        dst.index_adjusts[0] = 0;
        dst.index_adjusts[1] = 0;
        dst.z_ranges[JOIN_CHUNK_NON_CLOSING] = ZRange {
            begin: self.depth_base as i32,
            end: (self.depth_base as usize + self.number_non_closing) as i32,
        };
        dst.z_ranges[JOIN_CHUNK_CLOSING] = ZRange {
            begin: (self.depth_base as usize + self.number_non_closing) as i32,
            end: (self.depth_base as usize + self.joins.len()) as i32,
        };
    }
}

struct CapFiller<'l> {
    caps: &'l [Cap],
    depth_base: u32,
    variant: CapVariant,
}

impl<'l> CapFiller<'l> {
    fn cap_size(&self) -> PackSize {
        match self.variant {
            CapVariant::Square => stroked_point::pack_square_cap_size(),
            CapVariant::Flat => stroked_point::pack_flat_cap_size(),
            CapVariant::Adjustable => stroked_point::pack_adjustable_cap_size(),
            CapVariant::Rounded(thresh) => stroked_point::pack_rounded_cap_size(thresh),
            CapVariant::ArcRounded => arc_stroked_point::pack_cap_size(),
        }
    }
}

impl<'l> AttributeDataFiller for CapFiller<'l> {
    fn compute_sizes(&self, sizes: &mut DataSizes) {
        let s = self.cap_size();
        sizes.number_attributes = s.number_attributes * self.caps.len();
        sizes.number_indices = s.number_indices * self.caps.len();
        sizes.number_attribute_chunks = 1;
        sizes.number_index_chunks = 1;
        sizes.number_z_ranges = 1;
    }

    fn fill_data(&self, dst: &mut FillDestination) {
        let s = self.cap_size();
        for (c, cap) in self.caps.iter().enumerate() {
            let a0 = c * s.number_attributes;
            let i0 = c * s.number_indices;
            let attrs = &mut dst.attributes[a0..a0 + s.number_attributes];
            let indices = &mut dst.indices[i0..i0 + s.number_indices];
            let depth = self.depth_base + c as u32;
            match self.variant {
                CapVariant::Square => stroked_point::pack_square_cap(cap, depth, attrs, indices),
                CapVariant::Flat => stroked_point::pack_flat_cap(cap, depth, attrs, indices),
                CapVariant::Adjustable => {
                    stroked_point::pack_adjustable_cap(cap, depth, attrs, indices)
                }
                CapVariant::Rounded(thresh) => {
                    stroked_point::pack_rounded_cap(cap, thresh, depth, attrs, indices)
                }
                CapVariant::ArcRounded => arc_stroked_point::pack_arc_cap(cap, depth, attrs, indices),
            }
            for i in indices.iter_mut() {
                *i += a0 as u32;
            }
        }
        stroked_point::reverse_triangles(dst.indices);

        dst.attribute_chunks[0] = 0..dst.attributes.len();
        dst.index_chunks[CAP_CHUNK] = 0..dst.indices.len();
        dst.index_adjusts[CAP_CHUNK] = 0;
        dst.z_ranges[CAP_CHUNK] = ZRange {
            begin: self.depth_base as i32,
            end: (self.depth_base as usize + self.caps.len()) as i32,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroked_point::StrokedPoint;
    use pictor_geom::math::point;
    use pictor_path::TessellatedPathBuilder;

    fn polyline() -> StrokedPath {
        // Three segments, two interior joins, two caps.
        let mut builder = TessellatedPathBuilder::new();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(2.0, 0.0));
        builder.line_to(point(2.0, 2.0));
        builder.line_to(point(0.0, 2.0));
        builder.end(false);
        StrokedPath::new(&builder.build())
    }

    fn closed_square() -> StrokedPath {
        let mut builder = TessellatedPathBuilder::new();
        builder.begin(point(0.0, 0.0));
        builder.line_to(point(2.0, 0.0));
        builder.line_to(point(2.0, 2.0));
        builder.line_to(point(0.0, 2.0));
        builder.end(true);
        StrokedPath::new(&builder.build())
    }

    fn depths(data: &PainterAttributeData, chunk: usize) -> Vec<u32> {
        let adjust = data.index_adjust_chunk(chunk);
        data.index_data_chunk(chunk)
            .iter()
            .map(|&i| {
                let attr = &data.attribute_data()[(i as i64 + adjust as i64) as usize];
                StrokedPoint::unpack_point(attr).depth()
            })
            .collect()
    }

    #[test]
    fn edge_depths_precede_join_depths() {
        let stroked = polyline();
        let root = stroked.partition().root_subset().id();

        let edges = stroked.edges(root);
        let joins = stroked.bevel_joins(root);

        let max_edge = depths(&edges, EDGE_CHUNK_NON_CLOSING)
            .into_iter()
            .max()
            .expect("no edge triangles");
        let min_join = depths(&joins, JOIN_CHUNK_NON_CLOSING)
            .into_iter()
            .min()
            .expect("no join triangles");
        assert!(
            max_edge < min_join,
            "edge depth {} not below join depth {}",
            max_edge,
            min_join
        );
    }

    #[test]
    fn join_depths_precede_cap_depths() {
        let stroked = polyline();
        let root = stroked.partition().root_subset().id();

        let joins = stroked.bevel_joins(root);
        let caps = stroked.square_caps(root);
        let max_join = depths(&joins, JOIN_CHUNK_NON_CLOSING).into_iter().max().unwrap();
        let min_cap = depths(&caps, CAP_CHUNK).into_iter().min().unwrap();
        assert!(max_join < min_cap);
    }

    #[test]
    fn closing_edges_come_last() {
        let stroked = closed_square();
        let root = stroked.partition().root_subset().id();

        let edges = stroked.edges(root);
        let joins = stroked.bevel_joins(root);

        let closing = depths(&edges, EDGE_CHUNK_CLOSING);
        assert!(!closing.is_empty());
        let min_closing = *closing.iter().min().unwrap();

        for d in depths(&edges, EDGE_CHUNK_NON_CLOSING) {
            assert!(d < min_closing);
        }
        for d in depths(&joins, JOIN_CHUNK_NON_CLOSING)
            .into_iter()
            .chain(depths(&joins, JOIN_CHUNK_CLOSING))
        {
            assert!(d < min_closing);
        }
        assert_eq!(
            stroked.number_depths(root),
            stroked.edges(root).z_range(EDGE_CHUNK_CLOSING).end as u32
        );
    }

    #[test]
    fn closed_contour_has_closing_joins_and_no_caps() {
        let stroked = closed_square();
        let root = stroked.partition().root_subset().id();

        let joins = stroked.bevel_joins(root);
        assert!(!joins.index_data_chunk(JOIN_CHUNK_NON_CLOSING).is_empty());
        assert!(!joins.index_data_chunk(JOIN_CHUNK_CLOSING).is_empty());

        let caps = stroked.square_caps(root);
        assert!(caps.index_data_chunk(CAP_CHUNK).is_empty());
    }

    #[test]
    fn data_is_cached_per_subset() {
        let stroked = polyline();
        let root = stroked.partition().root_subset().id();

        assert!(Rc::ptr_eq(&stroked.edges(root), &stroked.edges(root)));
        assert!(Rc::ptr_eq(
            &stroked.miter_joins(root),
            &stroked.miter_joins(root)
        ));

        let a = stroked.rounded_joins(root, 0.1);
        let b = stroked.rounded_joins(root, 0.1);
        let c = stroked.rounded_joins(root, 0.01);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
        // A finer threshold tessellates more.
        assert!(c.attribute_data().len() > a.attribute_data().len());
    }

    #[test]
    fn all_indices_address_valid_attributes() {
        let stroked = closed_square();
        let root = stroked.partition().root_subset().id();

        let everything = [
            stroked.edges(root),
            stroked.bevel_joins(root),
            stroked.miter_clip_joins(root),
            stroked.miter_joins(root),
            stroked.miter_bevel_joins(root),
            stroked.rounded_joins(root, 0.05),
            stroked.arc_rounded_joins(root),
            stroked.square_caps(root),
            stroked.flat_caps(root),
            stroked.adjustable_caps(root),
            stroked.rounded_caps(root, 0.05),
            stroked.arc_rounded_caps(root),
        ];
        for data in &everything {
            for chunk in 0..data.number_index_chunks() {
                let adjust = data.index_adjust_chunk(chunk);
                for &i in data.index_data_chunk(chunk) {
                    let attr = i as i64 + adjust as i64;
                    assert!(attr >= 0 && (attr as usize) < data.attribute_data().len());
                }
            }
        }
    }

    #[test]
    fn miter_variants_precompute_all_three() {
        // Same joins, three different data sets, sized per variant.
        let stroked = polyline();
        let root = stroked.partition().root_subset().id();

        let clip = stroked.miter_clip_joins(root);
        let miter = stroked.miter_joins(root);
        let bevel = stroked.miter_bevel_joins(root);

        // 2 joins: 5 attrs each for clip, 4 for the single-tip variants.
        assert_eq!(clip.attribute_data().len(), 10);
        assert_eq!(miter.attribute_data().len(), 8);
        assert_eq!(bevel.attribute_data().len(), 8);
        assert_eq!(miter.z_range(JOIN_CHUNK_NON_CLOSING), clip.z_range(JOIN_CHUNK_NON_CLOSING));
    }
}
