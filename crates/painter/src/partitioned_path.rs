//! Spatial partitioning of tessellated path geometry.
//!
//! A [`PartitionedTessellatedPath`](struct.PartitionedTessellatedPath.html)
//! is a binary tree built once over a path's segments, joins and caps.
//! Sibling subsets own disjoint geometry: a segment straddling a split
//! line is cut at the line (sub-arcs keep a proportional share of the arc
//! angle), so every subset's geometry is strictly contained in its
//! bounding box. Culling queries walk the tree against clip half-plane
//! equations and report the surviving subset ids.

use pictor_geom::math::{ClipEquation, Point, Vector};
use pictor_geom::{clip_against_planes, BoundingBox, ClipScratch, Matrix3};
use pictor_path::{Cap, Join, Segment, SegmentChain, SegmentSplit, TessellatedPath};

/// Leaves stop splitting below this many segments.
pub const SPLITTING_THRESHOLD: usize = 50;
pub const MAX_RECURSION_DEPTH: usize = 10;

/// Identifies a subset of a
/// [`PartitionedTessellatedPath`](struct.PartitionedTessellatedPath.html).
/// The root is id 0 and a parent's id is smaller than its children's.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsetId(pub(crate) u32);

impl SubsetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Extra culling slack, in pixel and item units, accounting for geometry
/// (stroke width, miter tips) not known at partition time.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GeometryInflation {
    pub pixel_space_distance: f32,
    pub item_space_distance: f32,
    pub pixel_space_distance_miter_joins: f32,
    pub item_space_distance_miter_joins: f32,
}

/// Reusable buffers for the `select_subsets` queries. Not for sharing
/// between calls in flight.
#[derive(Default)]
pub struct ScratchSpace {
    adjusted_clip_eqs: Vec<ClipEquation>,
    clip: ClipScratch,
}

#[derive(Clone, Debug)]
struct OwnedChain {
    segments: Vec<Segment>,
    prev_to_start: Option<Segment>,
}

impl OwnedChain {
    fn as_chain(&self) -> SegmentChain {
        SegmentChain {
            segments: &self.segments,
            prev_to_start: self.prev_to_start.as_ref(),
        }
    }
}

#[derive(Clone, Debug)]
struct SubsetData {
    bounding_box: BoundingBox,
    children: Option<[usize; 2]>,
    // Leaf-only geometry storage.
    chains: Vec<OwnedChain>,
    joins: Vec<Join>,
    caps: Vec<Cap>,
}

pub struct PartitionedTessellatedPath {
    subsets: Vec<SubsetData>,
    has_arcs: bool,
}

/// A borrow of one node of the partition tree.
#[derive(Copy, Clone)]
pub struct Subset<'l> {
    path: &'l PartitionedTessellatedPath,
    index: usize,
}

impl PartitionedTessellatedPath {
    pub fn new(path: &TessellatedPath) -> Self {
        let mut chains = Vec::new();
        for contour in 0..path.number_contours() {
            for edge in 0..path.number_edges(contour) {
                chains.push(OwnedChain {
                    segments: path.edge_segments(contour, edge).to_vec(),
                    prev_to_start: None,
                });
            }
        }
        let joins = path.joins().to_vec();
        let caps = path.caps().to_vec();

        let mut subsets = Vec::new();
        build_subset(&mut subsets, chains, joins, caps, 0);
        PartitionedTessellatedPath {
            subsets,
            has_arcs: path.has_arcs(),
        }
    }

    pub fn number_subsets(&self) -> usize {
        self.subsets.len()
    }

    pub fn has_arcs(&self) -> bool {
        self.has_arcs
    }

    pub fn root_subset(&self) -> Subset {
        self.subset(SubsetId(0))
    }

    pub fn subset(&self, id: SubsetId) -> Subset {
        assert!(id.index() < self.subsets.len());
        Subset {
            path: self,
            index: id.index(),
        }
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.subsets[0].bounding_box
    }

    /// Walks the tree against the clip half-planes `eq · (x, y, 1) ≥ 0`
    /// and writes the ids of the surviving subsets into `dst` (cleared
    /// first), returning how many were written. A node that is entirely
    /// unclipped reports itself instead of its descendants; the count
    /// never exceeds [`number_subsets`](#method.number_subsets).
    ///
    /// Clip equations live in the space `clip_matrix` maps *to*; each
    /// equation's offset grows by `inflation.pixel_space_distance` pixels
    /// (converted with `one_pixel_width`) and bounding boxes grow by
    /// `inflation.item_space_distance` before testing, so geometry whose
    /// stroke width is decided later is never wrongly culled.
    pub fn select_subsets(
        &self,
        scratch: &mut ScratchSpace,
        clip_equations: &[ClipEquation],
        clip_matrix: &Matrix3,
        one_pixel_width: Vector,
        inflation: &GeometryInflation,
        dst: &mut Vec<SubsetId>,
    ) -> usize {
        self.select(
            scratch,
            clip_equations,
            clip_matrix,
            one_pixel_width,
            inflation.pixel_space_distance,
            inflation.item_space_distance,
            dst,
        )
    }

    /// Like [`select_subsets`](#method.select_subsets) but with the
    /// looser miter-join inflation, guaranteeing joins whose miter tip
    /// may extend past the ordinary slack are not culled. May over-select,
    /// never under-selects.
    pub fn select_subsets_miter(
        &self,
        scratch: &mut ScratchSpace,
        clip_equations: &[ClipEquation],
        clip_matrix: &Matrix3,
        one_pixel_width: Vector,
        inflation: &GeometryInflation,
        dst: &mut Vec<SubsetId>,
    ) -> usize {
        self.select(
            scratch,
            clip_equations,
            clip_matrix,
            one_pixel_width,
            inflation.pixel_space_distance_miter_joins,
            inflation.item_space_distance_miter_joins,
            dst,
        )
    }

    /// Selects everything: the root subset stands for the whole tree.
    pub fn select_subsets_no_culling(&self, dst: &mut Vec<SubsetId>) -> usize {
        dst.clear();
        dst.push(SubsetId(0));
        1
    }

    fn select(
        &self,
        scratch: &mut ScratchSpace,
        clip_equations: &[ClipEquation],
        clip_matrix: &Matrix3,
        one_pixel_width: Vector,
        pixel_distance: f32,
        item_distance: f32,
        dst: &mut Vec<SubsetId>,
    ) -> usize {
        dst.clear();
        let ScratchSpace {
            adjusted_clip_eqs,
            clip,
        } = scratch;

        adjusted_clip_eqs.clear();
        for eq in clip_equations {
            let room =
                pixel_distance * (eq[0].abs() * one_pixel_width.x + eq[1].abs() * one_pixel_width.y);
            adjusted_clip_eqs.push(clip_matrix.transform_equation([eq[0], eq[1], eq[2] + room]));
        }

        self.select_node(0, adjusted_clip_eqs, clip, item_distance, dst);
        dst.len()
    }

    fn select_node(
        &self,
        index: usize,
        eqs: &[ClipEquation],
        clip: &mut ClipScratch,
        item_distance: f32,
        dst: &mut Vec<SubsetId>,
    ) {
        let subset = &self.subsets[index];
        if subset.bounding_box.is_empty() {
            return;
        }
        let corners = subset.bounding_box.inflated_corners(item_distance);
        let (unclipped, polygon) = clip_against_planes(eqs, &corners, clip);
        if polygon.is_empty() {
            return;
        }
        if unclipped {
            dst.push(SubsetId(index as u32));
            return;
        }
        match subset.children {
            None => dst.push(SubsetId(index as u32)),
            Some([a, b]) => {
                self.select_node(a, eqs, clip, item_distance, dst);
                self.select_node(b, eqs, clip, item_distance, dst);
            }
        }
    }
}

impl<'l> Subset<'l> {
    pub fn id(&self) -> SubsetId {
        SubsetId(self.index as u32)
    }

    pub fn bounding_box(&self) -> &'l BoundingBox {
        &self.path.subsets[self.index].bounding_box
    }

    /// The bounding box as a counter-clockwise quad, for callers that
    /// want to draw or clip against the subset region as a path.
    pub fn bounding_box_polygon(&self) -> [Point; 4] {
        self.path.subsets[self.index].bounding_box.inflated_corners(0.0)
    }

    pub fn has_children(&self) -> bool {
        self.path.subsets[self.index].children.is_some()
    }

    pub fn children(&self) -> Option<(Subset<'l>, Subset<'l>)> {
        self.path.subsets[self.index].children.map(|[a, b]| {
            (
                Subset {
                    path: self.path,
                    index: a,
                },
                Subset {
                    path: self.path,
                    index: b,
                },
            )
        })
    }

    /// The segment chains owned by this subset's descendant leaves.
    pub fn segment_chains(&self) -> Vec<SegmentChain<'l>> {
        let mut out = Vec::new();
        self.for_each_leaf(|leaf| {
            out.extend(leaf.chains.iter().map(|c| c.as_chain()));
        });
        out
    }

    pub fn joins(&self) -> Vec<&'l Join> {
        let mut out = Vec::new();
        self.for_each_leaf(|leaf| out.extend(leaf.joins.iter()));
        out
    }

    pub fn caps(&self) -> Vec<&'l Cap> {
        let mut out = Vec::new();
        self.for_each_leaf(|leaf| out.extend(leaf.caps.iter()));
        out
    }

    fn for_each_leaf(&self, mut f: impl FnMut(&'l SubsetData)) {
        let mut stack = vec![self.index];
        while let Some(i) = stack.pop() {
            let data = &self.path.subsets[i];
            match data.children {
                Some([a, b]) => {
                    // Right child pushed first so leaves come out in
                    // creation order.
                    stack.push(b);
                    stack.push(a);
                }
                None => f(data),
            }
        }
    }
}

fn build_subset(
    subsets: &mut Vec<SubsetData>,
    chains: Vec<OwnedChain>,
    joins: Vec<Join>,
    caps: Vec<Cap>,
    depth: usize,
) -> usize {
    let mut bounding_box = BoundingBox::new();
    for chain in &chains {
        for seg in &chain.segments {
            bounding_box.union_box(&seg.bounding_box());
        }
    }
    for join in &joins {
        bounding_box.union_point(join.position);
    }
    for cap in &caps {
        bounding_box.union_point(cap.position);
    }

    let index = subsets.len();
    subsets.push(SubsetData {
        bounding_box,
        children: None,
        chains: Vec::new(),
        joins: Vec::new(),
        caps: Vec::new(),
    });

    let number_segments: usize = chains.iter().map(|c| c.segments.len()).sum();
    if number_segments > SPLITTING_THRESHOLD && depth < MAX_RECURSION_DEPTH {
        if let Some((coordinate, value)) = choose_split(&chains, number_segments) {
            let mut before_chains = Vec::new();
            let mut after_chains = Vec::new();
            for chain in &chains {
                split_chain(chain, coordinate, value, &mut before_chains, &mut after_chains);
            }

            // Point geometry: exactly on the split line goes to the
            // before child.
            let (after_joins, before_joins): (Vec<_>, Vec<_>) = joins
                .into_iter()
                .partition(|j| point_coord(j.position, coordinate) > value);
            let (after_caps, before_caps): (Vec<_>, Vec<_>) = caps
                .into_iter()
                .partition(|c| point_coord(c.position, coordinate) > value);

            let a = build_subset(subsets, before_chains, before_joins, before_caps, depth + 1);
            let b = build_subset(subsets, after_chains, after_joins, after_caps, depth + 1);
            subsets[index].children = Some([a, b]);
            return index;
        }
    }

    let s = &mut subsets[index];
    s.chains = chains;
    s.joins = joins;
    s.caps = caps;
    index
}

fn point_coord(p: Point, coordinate: usize) -> f32 {
    if coordinate == 0 {
        p.x
    } else {
        p.y
    }
}

/// Picks the axis and value whose split leaves the most balanced children,
/// or `None` when no split strictly shrinks both sides.
fn choose_split(chains: &[OwnedChain], number_segments: usize) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32, usize)> = None;

    for coordinate in 0..2 {
        let mut coords = Vec::with_capacity(number_segments * 2);
        for chain in chains {
            for seg in &chain.segments {
                coords.push(point_coord(seg.from, coordinate));
                coords.push(point_coord(seg.to, coordinate));
            }
        }
        coords.sort_by(|a, b| a.partial_cmp(b).expect("non-finite coordinate"));
        let value = coords[coords.len() / 2];

        let mut before = 0usize;
        let mut after = 0usize;
        for chain in chains {
            for seg in &chain.segments {
                match seg.split(coordinate, value) {
                    SegmentSplit::Before => before += 1,
                    SegmentSplit::After => after += 1,
                    SegmentSplit::Split { .. } => {
                        before += 1;
                        after += 1;
                    }
                }
            }
        }

        if before < number_segments && after < number_segments {
            let score = before.max(after);
            if best.map_or(true, |(_, _, s)| score < s) {
                best = Some((coordinate, value, score));
            }
        }
    }

    best.map(|(coordinate, value, _)| (coordinate, value))
}

/// Routes a chain's segments to the two sides of a split line, cutting
/// straddling segments. Runs of consecutive segments landing on the same
/// side become sub-chains whose `prev_to_start` is the segment that
/// preceded the run in the original order.
fn split_chain(
    chain: &OwnedChain,
    coordinate: usize,
    value: f32,
    before_out: &mut Vec<OwnedChain>,
    after_out: &mut Vec<OwnedChain>,
) {
    let mut current: [Option<OwnedChain>; 2] = [None, None];
    let mut prev: Option<Segment> = chain.prev_to_start;
    let mut last_side: Option<usize> = None;

    let emit = |side: usize,
                seg: Segment,
                prev: &mut Option<Segment>,
                last_side: &mut Option<usize>,
                current: &mut [Option<OwnedChain>; 2],
                before_out: &mut Vec<OwnedChain>,
                after_out: &mut Vec<OwnedChain>| {
        let contiguous = *last_side == Some(side);
        if !contiguous {
            if let Some(done) = current[side].take() {
                // The chain resumes after a gap on the other side; the
                // finished run is complete.
                if side == 0 {
                    before_out.push(done);
                } else {
                    after_out.push(done);
                }
            }
        }
        let chain = current[side].get_or_insert_with(|| OwnedChain {
            segments: Vec::new(),
            prev_to_start: *prev,
        });
        chain.segments.push(seg);
        *prev = Some(seg);
        *last_side = Some(side);
    };

    for seg in &chain.segments {
        match seg.split(coordinate, value) {
            SegmentSplit::Before => emit(
                0,
                *seg,
                &mut prev,
                &mut last_side,
                &mut current,
                before_out,
                after_out,
            ),
            SegmentSplit::After => emit(
                1,
                *seg,
                &mut prev,
                &mut last_side,
                &mut current,
                before_out,
                after_out,
            ),
            SegmentSplit::Split {
                before,
                after,
                start_is_before,
            } => {
                let (first, second, sides) = if start_is_before {
                    (before, after, (0usize, 1usize))
                } else {
                    (after, before, (1usize, 0usize))
                };
                emit(
                    sides.0,
                    first,
                    &mut prev,
                    &mut last_side,
                    &mut current,
                    before_out,
                    after_out,
                );
                emit(
                    sides.1,
                    second,
                    &mut prev,
                    &mut last_side,
                    &mut current,
                    before_out,
                    after_out,
                );
            }
        }
    }

    let [before_current, after_current] = current;
    if let Some(c) = before_current {
        before_out.push(c);
    }
    if let Some(c) = after_current {
        after_out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_geom::math::{point, vector};
    use pictor_path::TessellatedPathBuilder;

    // A zig-zag polyline with enough segments to force several splits.
    fn zig_zag(n: usize) -> TessellatedPath {
        let mut builder = TessellatedPathBuilder::new();
        builder.begin(point(0.0, 0.0));
        for i in 1..=n {
            let y = if i % 2 == 0 { 0.0 } else { 1.0 };
            builder.line_to(point(i as f32 * 0.1, y));
        }
        builder.end(false);
        builder.build()
    }

    fn leaf_ids(path: &PartitionedTessellatedPath) -> Vec<SubsetId> {
        (0..path.number_subsets())
            .map(|i| SubsetId(i as u32))
            .filter(|&id| !path.subset(id).has_children())
            .collect()
    }

    #[test]
    fn tree_splits_large_paths() {
        let path = zig_zag(200);
        let partition = PartitionedTessellatedPath::new(&path);
        assert!(partition.number_subsets() > 1);
        assert!(partition.root_subset().has_children());
        // Parent ids precede child ids.
        for i in 0..partition.number_subsets() {
            if let Some((a, b)) = partition.subset(SubsetId(i as u32)).children() {
                assert!(a.id().index() > i && b.id().index() > i);
            }
        }
    }

    #[test]
    fn leaf_lengths_reconstruct_the_path() {
        let path = zig_zag(157);
        let total = path.total_length();
        let partition = PartitionedTessellatedPath::new(&path);

        let mut sum = 0.0;
        for id in leaf_ids(&partition) {
            for chain in partition.subset(id).segment_chains() {
                for seg in chain.segments {
                    sum += seg.length;
                }
            }
        }
        assert!((sum - total).abs() < total * 1e-4, "{} vs {}", sum, total);
    }

    #[test]
    fn leaf_geometry_stays_inside_leaf_boxes() {
        let path = zig_zag(120);
        let partition = PartitionedTessellatedPath::new(&path);
        for id in leaf_ids(&partition) {
            let subset = partition.subset(id);
            let bbox = subset.bounding_box();
            for chain in subset.segment_chains() {
                for seg in chain.segments {
                    let sb = seg.bounding_box();
                    assert!(sb.min().x >= bbox.min().x - 1e-4);
                    assert!(sb.max().x <= bbox.max().x + 1e-4);
                    assert!(sb.min().y >= bbox.min().y - 1e-4);
                    assert!(sb.max().y <= bbox.max().y + 1e-4);
                }
            }
            for join in subset.joins() {
                assert!(bbox.contains(join.position));
            }
        }
    }

    #[test]
    fn joins_assigned_to_exactly_one_leaf() {
        let path = zig_zag(130);
        let expected = path.joins().len();
        let partition = PartitionedTessellatedPath::new(&path);
        let mut count = 0;
        for id in leaf_ids(&partition) {
            count += partition.subset(id).joins().len();
        }
        assert_eq!(count, expected);
    }

    #[test]
    fn select_subsets_culls_clip_space_half() {
        // Segments spanning x in [0, 10]; clip to x >= 5 with no slack.
        let mut builder = TessellatedPathBuilder::new();
        builder.begin(point(0.0, 0.0));
        for i in 1..=100 {
            builder.line_to(point(i as f32 * 0.1, (i % 2) as f32 * 0.2));
        }
        builder.end(false);
        let partition = PartitionedTessellatedPath::new(&builder.build());

        let mut scratch = ScratchSpace::default();
        let mut selected = Vec::new();
        let n = partition.select_subsets(
            &mut scratch,
            &[[1.0, 0.0, -5.0]],
            &Matrix3::identity(),
            vector(0.001, 0.001),
            &GeometryInflation::default(),
            &mut selected,
        );
        assert_eq!(n, selected.len());
        assert!(n >= 1);
        assert!(n <= partition.number_subsets());

        // Everything selected touches x >= 5; every leaf not under a
        // selected subset is entirely x < 5.
        for &id in &selected {
            assert!(partition.subset(id).bounding_box().max().x >= 5.0 - 1e-4);
        }
        let mut covered = std::collections::HashSet::new();
        for &id in &selected {
            let mut stack = vec![partition.subset(id)];
            while let Some(s) = stack.pop() {
                covered.insert(s.id());
                if let Some((a, b)) = s.children() {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
        for id in leaf_ids(&partition) {
            if !covered.contains(&id) {
                assert!(partition.subset(id).bounding_box().max().x < 5.0 + 1e-4);
            }
        }
    }

    #[test]
    fn unclipped_tree_reports_only_the_root() {
        let partition = PartitionedTessellatedPath::new(&zig_zag(200));
        let mut scratch = ScratchSpace::default();
        let mut selected = Vec::new();
        // A clip that keeps everything.
        let n = partition.select_subsets(
            &mut scratch,
            &[[1.0, 0.0, 100.0]],
            &Matrix3::identity(),
            vector(0.001, 0.001),
            &GeometryInflation::default(),
            &mut selected,
        );
        assert_eq!(n, 1);
        assert_eq!(selected[0], SubsetId(0));
    }

    #[test]
    fn no_culling_returns_the_root() {
        let partition = PartitionedTessellatedPath::new(&zig_zag(10));
        let mut dst = Vec::new();
        assert_eq!(partition.select_subsets_no_culling(&mut dst), 1);
        assert_eq!(dst, vec![SubsetId(0)]);
    }

    #[test]
    fn miter_selection_never_under_selects() {
        let partition = PartitionedTessellatedPath::new(&zig_zag(150));
        let mut scratch = ScratchSpace::default();
        let eqs = [[1.0, 0.0, -5.0], [-1.0, 0.0, 8.0]];
        let inflation = GeometryInflation {
            pixel_space_distance: 1.0,
            item_space_distance: 0.5,
            pixel_space_distance_miter_joins: 4.0,
            item_space_distance_miter_joins: 2.0,
        };

        let mut plain = Vec::new();
        partition.select_subsets(
            &mut scratch,
            &eqs,
            &Matrix3::identity(),
            vector(0.01, 0.01),
            &inflation,
            &mut plain,
        );
        let mut miter = Vec::new();
        partition.select_subsets_miter(
            &mut scratch,
            &eqs,
            &Matrix3::identity(),
            vector(0.01, 0.01),
            &inflation,
            &mut miter,
        );

        // Every leaf covered by the plain selection is covered by the
        // miter selection too.
        let covers = |ids: &[SubsetId], leaf: SubsetId| {
            ids.iter().any(|&id| {
                let mut stack = vec![partition.subset(id)];
                while let Some(s) = stack.pop() {
                    if s.id() == leaf {
                        return true;
                    }
                    if let Some((a, b)) = s.children() {
                        stack.push(a);
                        stack.push(b);
                    }
                }
                false
            })
        };
        for id in leaf_ids(&partition) {
            if covers(&plain, id) {
                assert!(covers(&miter, id));
            }
        }
    }

    #[test]
    fn split_pieces_are_continuations() {
        // The zig-zag drives splitting; the second contour's single long
        // segment spans the whole x range and must be cut by the first
        // x split.
        let mut builder = TessellatedPathBuilder::new();
        builder.begin(point(0.0, 0.0));
        for i in 1..=160 {
            let y = if i % 2 == 0 { 0.0 } else { 1.0 };
            builder.line_to(point(i as f32 * 0.1, y));
        }
        builder.end(false);
        builder.begin(point(0.0, 5.0));
        builder.line_to(point(16.0, 5.0));
        builder.end(false);
        let path = builder.build();
        let partition = PartitionedTessellatedPath::new(&path);
        let mut found_continuation = false;
        for id in leaf_ids(&partition) {
            for chain in partition.subset(id).segment_chains() {
                for (i, seg) in chain.segments.iter().enumerate() {
                    if seg.continuation {
                        found_continuation = true;
                        // A continuation piece follows its other half,
                        // reachable through prev_to_start when it opens a
                        // chain.
                        if i == 0 {
                            assert!(chain.prev_to_start.is_some());
                        }
                    }
                }
            }
        }
        // With 160 zig-zag segments some segment must have been cut.
        assert!(found_continuation);
    }
}
