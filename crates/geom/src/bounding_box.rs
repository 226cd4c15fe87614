use crate::math::{point, Point, Vector};

/// An axis-aligned rectangle that starts out empty and grows to enclose
/// the points and boxes added to it.
///
/// Unlike `euclid::Box2D`, emptiness is tracked explicitly so that a box
/// built from no geometry never contributes to a union.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    min: Point,
    max: Point,
    empty: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::new()
    }
}

impl BoundingBox {
    /// An empty box.
    pub fn new() -> Self {
        BoundingBox {
            min: point(0.0, 0.0),
            max: point(0.0, 0.0),
            empty: true,
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        let mut bbox = BoundingBox::new();
        bbox.union_point(a);
        bbox.union_point(b);
        bbox
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The min corner. Meaningless for an empty box.
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// The max corner. Meaningless for an empty box.
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    #[inline]
    pub fn size(&self) -> Vector {
        if self.empty {
            Vector::zero()
        } else {
            self.max - self.min
        }
    }

    pub fn union_point(&mut self, p: Point) {
        if self.empty {
            self.min = p;
            self.max = p;
            self.empty = false;
        } else {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        }
    }

    pub fn union_box(&mut self, other: &BoundingBox) {
        if !other.empty {
            self.union_point(other.min);
            self.union_point(other.max);
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        !self.empty
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.empty || (self.contains(other.min) && self.contains(other.max))
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !self.empty
            && !other.empty
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// The four corners of the box inflated by `rad` on every side,
    /// in counter-clockwise order.
    pub fn inflated_corners(&self, rad: f32) -> [Point; 4] {
        let min = point(self.min.x - rad, self.min.y - rad);
        let max = point(self.max.x + rad, self.max.y + rad);
        [
            point(min.x, min.y),
            point(max.x, min.y),
            point(max.x, max.y),
            point(min.x, max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_union_is_identity() {
        let mut a = BoundingBox::new();
        let b = BoundingBox::from_points(point(1.0, 2.0), point(3.0, 4.0));
        a.union_box(&b);
        assert_eq!(a, b);

        let mut c = b;
        c.union_box(&BoundingBox::new());
        assert_eq!(c, b);
    }

    #[test]
    fn union_point_grows() {
        let mut bbox = BoundingBox::new();
        bbox.union_point(point(1.0, 1.0));
        assert!(bbox.contains(point(1.0, 1.0)));
        assert!(!bbox.contains(point(0.0, 0.0)));

        bbox.union_point(point(-1.0, 3.0));
        assert_eq!(bbox.min(), point(-1.0, 1.0));
        assert_eq!(bbox.max(), point(1.0, 3.0));
    }

    #[test]
    fn inflated_corners_ccw() {
        let bbox = BoundingBox::from_points(point(0.0, 0.0), point(2.0, 2.0));
        let c = bbox.inflated_corners(1.0);
        assert_eq!(c[0], point(-1.0, -1.0));
        assert_eq!(c[2], point(3.0, 3.0));
    }
}
