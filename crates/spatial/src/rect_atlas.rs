//! A guillotine rectangle packer over a fixed integer region.

use pictor_geom::math::{int_point, int_size, IntPoint, IntSize};

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct Node {
    location: IntPoint,
    size: IntSize,
    /// Dimensions of the rectangle placed at `location`, if any. Always
    /// `None` once the node has children.
    placed: Option<IntSize>,
    /// Child node indices, smallest area first. At most 3.
    children: Vec<usize>,
    // Largest free extents obtainable in this subtree, for fast rejection.
    widest: i32,
    tallest: i32,
    biggest: i32,
}

impl Node {
    fn leaf(location: IntPoint, size: IntSize) -> Self {
        Node {
            location,
            size,
            placed: None,
            children: Vec::new(),
            widest: size.width,
            tallest: size.height,
            biggest: size.width * size.height,
        }
    }

    fn area(&self) -> i32 {
        self.size.width * self.size.height
    }
}

/// Packs axis-aligned rectangles into a W×H region.
///
/// Placements are never freed individually; the only way to reclaim space
/// is [`clear`](#method.clear) or [`clear_resize`](#method.clear_resize),
/// which invalidate every previously returned location at once.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RectAtlas {
    size: IntSize,
    nodes: Vec<Node>,
}

impl RectAtlas {
    /// The location returned when no space is left.
    pub const FAILURE: IntPoint = IntPoint::new(-1, -1);

    pub fn new(size: IntSize) -> Self {
        let mut atlas = RectAtlas {
            size,
            nodes: Vec::new(),
        };
        atlas.clear();
        atlas
    }

    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Places a `dimension`-sized rectangle, returning its top-left
    /// location or [`FAILURE`](#associatedconstant.FAILURE) when it does
    /// not fit. A zero or negative dimension places nothing and returns
    /// `(0, 0)`.
    pub fn add_rectangle(&mut self, dimension: IntSize) -> IntPoint {
        if dimension.width <= 0 || dimension.height <= 0 {
            return int_point(0, 0);
        }
        self.place(0, dimension).unwrap_or(RectAtlas::FAILURE)
    }

    /// Forgets all placements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(int_point(0, 0), self.size));
    }

    /// Forgets all placements and changes the region dimensions.
    pub fn clear_resize(&mut self, new_size: IntSize) {
        self.size = new_size;
        self.clear();
    }

    fn place(&mut self, node: usize, req: IntSize) -> Option<IntPoint> {
        {
            let n = &self.nodes[node];
            if req.width > n.widest || req.height > n.tallest
                || req.width * req.height > n.biggest
            {
                return None;
            }
        }

        if !self.nodes[node].children.is_empty() {
            let children = self.nodes[node].children.clone();
            for child in children {
                if let Some(p) = self.place(child, req) {
                    self.refresh_caches(node);
                    return Some(p);
                }
            }
            // The per-axis caches are necessary but not sufficient; a
            // request can fail here even though every check above passed.
            return None;
        }

        match self.nodes[node].placed {
            None => {
                debug_assert!(
                    req.width <= self.nodes[node].size.width
                        && req.height <= self.nodes[node].size.height
                );
                let location = self.nodes[node].location;
                self.nodes[node].placed = Some(req);
                self.refresh_caches(node);
                Some(location)
            }
            Some(placed) => {
                self.split(node, placed);
                self.place(node, req)
            }
        }
    }

    /// Turns an occupied leaf into an internal node whose children cover
    /// the placed rectangle and the two leftover strips.
    fn split(&mut self, node: usize, placed: IntSize) {
        let location = self.nodes[node].location;
        let size = self.nodes[node].size;
        let leftover_w = size.width - placed.width;
        let leftover_h = size.height - placed.height;

        let mut occupied = Node::leaf(location, placed);
        occupied.placed = Some(placed);
        occupied.widest = 0;
        occupied.tallest = 0;
        occupied.biggest = 0;

        // Split along the axis with more leftover so the larger strip
        // stays in one piece.
        let (a, b) = if leftover_w > leftover_h {
            (
                Node::leaf(
                    int_point(location.x + placed.width, location.y),
                    int_size(leftover_w, size.height),
                ),
                Node::leaf(
                    int_point(location.x, location.y + placed.height),
                    int_size(placed.width, leftover_h),
                ),
            )
        } else {
            (
                Node::leaf(
                    int_point(location.x, location.y + placed.height),
                    int_size(size.width, leftover_h),
                ),
                Node::leaf(
                    int_point(location.x + placed.width, location.y),
                    int_size(leftover_w, placed.height),
                ),
            )
        };

        let base = self.nodes.len();
        self.nodes.push(occupied);
        self.nodes.push(a);
        self.nodes.push(b);

        let mut children = vec![base, base + 1, base + 2];
        children.sort_by_key(|&c| self.nodes[c].area());

        let n = &mut self.nodes[node];
        n.placed = None;
        n.children = children;
    }

    fn refresh_caches(&mut self, node: usize) {
        let (widest, tallest, biggest) = if self.nodes[node].children.is_empty() {
            let n = &self.nodes[node];
            match n.placed {
                None => (n.size.width, n.size.height, n.area()),
                Some(placed) => {
                    let right_w = n.size.width - placed.width;
                    let below_h = n.size.height - placed.height;
                    let widest = if below_h > 0 { n.size.width } else { right_w };
                    let tallest = if right_w > 0 { n.size.height } else { below_h };
                    let biggest = (right_w * n.size.height).max(n.size.width * below_h);
                    (widest, tallest, biggest)
                }
            }
        } else {
            let mut widest = 0;
            let mut tallest = 0;
            let mut biggest = 0;
            for &c in &self.nodes[node].children {
                widest = widest.max(self.nodes[c].widest);
                tallest = tallest.max(self.nodes[c].tallest);
                biggest = biggest.max(self.nodes[c].biggest);
            }
            (widest, tallest, biggest)
        };
        let n = &mut self.nodes[node];
        n.widest = widest;
        n.tallest = tallest;
        n.biggest = biggest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(p: IntPoint) -> bool {
        p.x < 0 || p.y < 0
    }

    fn overlap(a: (IntPoint, IntSize), b: (IntPoint, IntSize)) -> bool {
        a.0.x < b.0.x + b.1.width
            && b.0.x < a.0.x + a.1.width
            && a.0.y < b.0.y + b.1.height
            && b.0.y < a.0.y + a.1.height
    }

    #[test]
    fn placements_in_bounds_and_disjoint() {
        let mut atlas = RectAtlas::new(int_size(128, 128));
        let sizes = [
            int_size(30, 40),
            int_size(64, 16),
            int_size(10, 100),
            int_size(50, 50),
            int_size(7, 7),
            int_size(64, 64),
            int_size(3, 90),
        ];
        let mut placed = Vec::new();
        for &s in &sizes {
            let p = atlas.add_rectangle(s);
            if failed(p) {
                continue;
            }
            assert!(p.x >= 0 && p.y >= 0);
            assert!(p.x + s.width <= 128 && p.y + s.height <= 128);
            for &other in &placed {
                assert!(!overlap((p, s), other), "{:?} overlaps {:?}", (p, s), other);
            }
            placed.push((p, s));
        }
        assert!(placed.len() >= 5);
    }

    #[test]
    fn exhaustion_returns_sentinel() {
        let mut atlas = RectAtlas::new(int_size(32, 32));
        assert!(!failed(atlas.add_rectangle(int_size(32, 32))));
        assert_eq!(atlas.add_rectangle(int_size(1, 1)), RectAtlas::FAILURE);
        assert!(failed(atlas.add_rectangle(int_size(32, 32))));
    }

    #[test]
    fn clear_reclaims_everything() {
        let mut atlas = RectAtlas::new(int_size(64, 64));
        for _ in 0..16 {
            assert!(!failed(atlas.add_rectangle(int_size(16, 16))));
        }
        assert!(failed(atlas.add_rectangle(int_size(64, 64))));
        atlas.clear();
        assert!(!failed(atlas.add_rectangle(int_size(64, 64))));
    }

    #[test]
    fn clear_resize_changes_capacity() {
        let mut atlas = RectAtlas::new(int_size(16, 16));
        assert!(failed(atlas.add_rectangle(int_size(32, 32))));
        atlas.clear_resize(int_size(64, 64));
        assert_eq!(atlas.size(), int_size(64, 64));
        assert!(!failed(atlas.add_rectangle(int_size(32, 32))));
    }

    #[test]
    fn degenerate_request_is_a_no_op() {
        let mut atlas = RectAtlas::new(int_size(8, 8));
        assert_eq!(atlas.add_rectangle(int_size(0, 5)), int_point(0, 0));
        assert_eq!(atlas.add_rectangle(int_size(-3, 2)), int_point(0, 0));
        // The full region is still available.
        assert!(!failed(atlas.add_rectangle(int_size(8, 8))));
    }

    #[test]
    fn tight_packing_fills_rows() {
        // Four quadrants fill the atlas exactly.
        let mut atlas = RectAtlas::new(int_size(64, 64));
        for _ in 0..4 {
            assert!(!failed(atlas.add_rectangle(int_size(32, 32))));
        }
        assert!(failed(atlas.add_rectangle(int_size(1, 1))));
    }
}
