//! Input geometry for path filling.
//!
//! A [`FillTessellation`](struct.FillTessellation.html) is a triangulation
//! of a path's interior in which every triangle is labelled with the
//! winding number of the region it covers, plus the boundary chains
//! separating regions of different winding number. Downstream consumers
//! partition this data spatially and group it by winding number.

use pictor_geom::math::Point;
use pictor_geom::BoundingBox;

/// One triangle of the triangulation together with the winding number of
/// the region it lies in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FillTriangle {
    /// Indices into [`FillTessellation::points`](struct.FillTessellation.html#method.points).
    pub indices: [u32; 3],
    pub winding: i32,
}

/// A polyline of triangulation points running along the boundary between
/// two winding regions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BoundaryChain {
    /// Indices into the point store, in order along the boundary.
    pub point_indices: Vec<u32>,
    /// Winding number of the region the chain bounds.
    pub winding: i32,
    /// Winding number of the region on the other side of the chain.
    pub neighbor_winding: i32,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl BoundaryChain {
    /// Number of boundary edges in the chain.
    pub fn number_edges(&self) -> usize {
        if self.point_indices.len() < 2 {
            return 0;
        }
        if self.closed {
            self.point_indices.len()
        } else {
            self.point_indices.len() - 1
        }
    }

    /// The endpoints of edge `i`, as point indices.
    pub fn edge(&self, i: usize) -> (u32, u32) {
        let n = self.point_indices.len();
        debug_assert!(i < self.number_edges());
        (self.point_indices[i], self.point_indices[(i + 1) % n])
    }
}

/// A winding-labelled triangulation of a filled path.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FillTessellation {
    points: Vec<Point>,
    triangles: Vec<FillTriangle>,
    boundary_chains: Vec<BoundaryChain>,
    bounding_box: BoundingBox,
}

impl FillTessellation {
    pub fn new() -> Self {
        FillTessellation::default()
    }

    /// Adds a point, returning its index.
    pub fn add_point(&mut self, p: Point) -> u32 {
        debug_assert!(self.points.len() < u32::MAX as usize);
        self.bounding_box.union_point(p);
        self.points.push(p);
        self.points.len() as u32 - 1
    }

    pub fn add_triangle(&mut self, indices: [u32; 3], winding: i32) {
        debug_assert!(indices.iter().all(|&i| (i as usize) < self.points.len()));
        self.triangles.push(FillTriangle { indices, winding });
    }

    pub fn add_boundary_chain(&mut self, chain: BoundaryChain) {
        debug_assert!(chain
            .point_indices
            .iter()
            .all(|&i| (i as usize) < self.points.len()));
        self.boundary_chains.push(chain);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, index: u32) -> Point {
        self.points[index as usize]
    }

    pub fn triangles(&self) -> &[FillTriangle] {
        &self.triangles
    }

    pub fn boundary_chains(&self) -> &[BoundaryChain] {
        &self.boundary_chains
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// The smallest and largest winding numbers present, or `None` when
    /// there are no triangles.
    pub fn winding_range(&self) -> Option<(i32, i32)> {
        let mut iter = self.triangles.iter();
        let first = iter.next()?.winding;
        let mut min = first;
        let mut max = first;
        for tri in iter {
            min = min.min(tri.winding);
            max = max.max(tri.winding);
        }
        Some((min, max))
    }

    /// Centroid of triangle `i`, used to classify triangles spatially.
    pub fn triangle_centroid(&self, i: usize) -> Point {
        let tri = &self.triangles[i];
        let a = self.point(tri.indices[0]);
        let b = self.point(tri.indices[1]);
        let c = self.point(tri.indices[2]);
        ((a.to_vector() + b.to_vector() + c.to_vector()) / 3.0).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_geom::math::point;

    fn square_tessellation() -> FillTessellation {
        let mut fill = FillTessellation::new();
        let a = fill.add_point(point(0.0, 0.0));
        let b = fill.add_point(point(1.0, 0.0));
        let c = fill.add_point(point(1.0, 1.0));
        let d = fill.add_point(point(0.0, 1.0));
        fill.add_triangle([a, b, c], 1);
        fill.add_triangle([a, c, d], 1);
        fill.add_boundary_chain(BoundaryChain {
            point_indices: vec![a, b, c, d],
            winding: 1,
            neighbor_winding: 0,
            closed: true,
        });
        fill
    }

    #[test]
    fn winding_range() {
        let mut fill = square_tessellation();
        assert_eq!(fill.winding_range(), Some((1, 1)));
        let e = fill.add_point(point(2.0, 0.0));
        fill.add_triangle([0, 1, e], -2);
        assert_eq!(fill.winding_range(), Some((-2, 1)));
        assert_eq!(FillTessellation::new().winding_range(), None);
    }

    #[test]
    fn closed_chain_edges_wrap() {
        let fill = square_tessellation();
        let chain = &fill.boundary_chains()[0];
        assert_eq!(chain.number_edges(), 4);
        assert_eq!(chain.edge(3), (3, 0));
    }

    #[test]
    fn open_chain_edge_count() {
        let chain = BoundaryChain {
            point_indices: vec![0, 1, 2],
            winding: 0,
            neighbor_winding: 1,
            closed: false,
        };
        assert_eq!(chain.number_edges(), 2);
        assert_eq!(chain.edge(1), (1, 2));
    }

    #[test]
    fn centroid() {
        let fill = square_tessellation();
        let c = fill.triangle_centroid(0);
        assert!((c.x - 2.0 / 3.0).abs() < 1e-6);
        assert!((c.y - 1.0 / 3.0).abs() < 1e-6);
    }
}
