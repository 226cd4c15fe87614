use crate::math::{ClipEquation, Point};

/// A row-major 3×3 matrix, used to map local coordinates into clip space
/// (including projective transforms, which `euclid::Transform2D` cannot
/// represent).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    pub rows: [[f32; 3]; 3],
}

impl Matrix3 {
    pub fn identity() -> Self {
        Matrix3 {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Matrix3 {
            rows: [[sx, 0.0, tx], [0.0, sy, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// `self · [x, y, 1]`.
    pub fn transform_point(&self, p: Point) -> [f32; 3] {
        let v = [p.x, p.y, 1.0];
        let mut out = [0.0; 3];
        for (i, row) in self.rows.iter().enumerate() {
            out[i] = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
        }
        out
    }

    /// Transforms a clip half-plane equation from clip space into the
    /// space the matrix maps *from*: the row-vector product `eq · self`.
    ///
    /// If `self` maps local points to clip space, a point is on the
    /// non-negative side of the returned equation exactly when its image
    /// is on the non-negative side of `eq`.
    pub fn transform_equation(&self, eq: ClipEquation) -> ClipEquation {
        let mut out = [0.0; 3];
        for (j, o) in out.iter_mut().enumerate() {
            *o = eq[0] * self.rows[0][j] + eq[1] * self.rows[1][j] + eq[2] * self.rows[2][j];
        }
        out
    }
}

/// Reusable buffers for [`clip_against_planes`](fn.clip_against_planes.html),
/// so that repeated culling queries do not reallocate.
///
/// A `ClipScratch` must not be shared between calls in flight; each query
/// thread keeps its own.
#[derive(Default)]
pub struct ClipScratch {
    polygon: [Vec<Point>; 2],
}

#[inline]
fn eval(eq: &ClipEquation, p: Point) -> f32 {
    eq[0] * p.x + eq[1] * p.y + eq[2]
}

/// Clips the convex polygon `input` against the half-planes
/// `eq · (x, y, 1) ≥ 0`, Sutherland–Hodgman style.
///
/// Returns whether the polygon was entirely on the non-negative side of
/// every plane, together with the clipped polygon (borrowed from
/// `scratch`; empty when the polygon is clipped away completely).
pub fn clip_against_planes<'l>(
    equations: &[ClipEquation],
    input: &[Point],
    scratch: &'l mut ClipScratch,
) -> (bool, &'l [Point]) {
    let [ref mut a, ref mut b] = scratch.polygon;
    a.clear();
    a.extend_from_slice(input);

    let mut unclipped = true;
    let mut src_is_a = true;

    for eq in equations {
        let (src, dst) = if src_is_a { (&mut *a, &mut *b) } else { (&mut *b, &mut *a) };
        dst.clear();

        let mut all_inside = true;
        for i in 0..src.len() {
            let p = src[i];
            let q = src[(i + 1) % src.len()];
            let fp = eval(eq, p);
            let fq = eval(eq, q);

            if fp >= 0.0 {
                dst.push(p);
            } else {
                all_inside = false;
            }

            if (fp < 0.0) != (fq < 0.0) {
                // The edge crosses the plane.
                let t = fp / (fp - fq);
                dst.push(p.lerp(q, t));
            }
        }

        unclipped = unclipped && all_inside;
        src_is_a = !src_is_a;

        let clipped_away = if src_is_a { a.is_empty() } else { b.is_empty() };
        if clipped_away {
            break;
        }
    }

    let result: &_ = if src_is_a { a } else { b };
    (unclipped, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    fn unit_square() -> [Point; 4] {
        [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ]
    }

    #[test]
    fn no_planes_is_unclipped() {
        let mut scratch = ClipScratch::default();
        let (unclipped, out) = clip_against_planes(&[], &unit_square(), &mut scratch);
        assert!(unclipped);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn half_plane_cuts_square() {
        // x >= 0.5
        let mut scratch = ClipScratch::default();
        let (unclipped, out) =
            clip_against_planes(&[[1.0, 0.0, -0.5]], &unit_square(), &mut scratch);
        assert!(!unclipped);
        assert!(!out.is_empty());
        for p in out {
            assert!(p.x >= 0.5 - 1e-6);
        }
    }

    #[test]
    fn plane_misses_square_entirely() {
        // x >= 2
        let mut scratch = ClipScratch::default();
        let (unclipped, out) =
            clip_against_planes(&[[1.0, 0.0, -2.0]], &unit_square(), &mut scratch);
        assert!(!unclipped);
        assert!(out.is_empty());
    }

    #[test]
    fn equation_transform_matches_point_transform() {
        let m = Matrix3::scale_translate(2.0, 3.0, -1.0, 4.0);
        let eq = [1.0, -0.5, 0.25];
        let local_eq = m.transform_equation(eq);

        for &p in &unit_square() {
            let clip = m.transform_point(p);
            let direct = eq[0] * clip[0] + eq[1] * clip[1] + eq[2] * clip[2];
            let via_local = eval(&local_eq, p);
            assert!((direct - via_local).abs() < 1e-4);
        }
    }
}
