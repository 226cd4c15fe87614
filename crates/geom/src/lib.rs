#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::many_single_char_names)]

//! Geometric utilities for the pictor path rendering pipeline, on top of euclid.
//!
//! This crate is reexported in [pictor](https://docs.rs/pictor/).
//!
//! # Overview
//!
//! This crate provides the small amount of geometry the rest of the pipeline
//! is built on:
//!
//! - f32 aliases of the euclid types (see the [math](math/index.html) module),
//! - an empty-able axis-aligned [`BoundingBox`](struct.BoundingBox.html),
//! - a 3×3 [`Matrix3`](struct.Matrix3.html) and convex-polygon clipping
//!   against half-plane equations, used for culling queries,
//! - error-bounded circular-arc subdivision counting.

pub extern crate euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod bounding_box;
mod clip;
pub mod math;

pub use crate::bounding_box::BoundingBox;
pub use crate::clip::{clip_against_planes, ClipScratch, Matrix3};

use crate::math::PI;

/// Returns the number of line segments needed to approximate a circular
/// arc subtending `arc_angle` radians so that the maximum distance between
/// the arc and its approximation stays under `thresh` (with the threshold
/// expressed relative to a unit radius).
///
/// The return value is always at least 4, and one segment more than the
/// error bound requires so that the bound is beaten rather than met.
pub fn arc_segment_count(arc_angle: f32, thresh: f32) -> u32 {
    let d = (1.0 - thresh).max(0.5);
    let theta = (0.5 * d.acos()).max(1e-5);
    let needed = (arc_angle.abs() / theta) as u32;

    1 + needed.max(3)
}

/// Number of segments for a circular arc of the given radius, with the
/// threshold in the same units as the radius.
pub fn arc_segment_count_for_radius(radius: f32, arc_angle: f32, thresh: f32) -> u32 {
    arc_segment_count(arc_angle, thresh / radius.max(1e-6))
}

/// The half-angle miter extension factor `1 / sin(θ/2)` for a join turning
/// by `join_angle`. This is the ratio of the miter tip distance to the
/// stroking radius; the caller compares it against a miter limit.
pub fn miter_extension_factor(join_angle: f32) -> f32 {
    let half = 0.5 * (PI - join_angle.abs());
    let s = half.sin();
    if s <= 1e-6 {
        f32::INFINITY
    } else {
        1.0 / s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_count_minimum() {
        // Tiny angles still produce a usable fan.
        assert_eq!(arc_segment_count(0.01, 0.1), 4);
    }

    #[test]
    fn arc_count_monotonic_in_angle() {
        let thresh = 0.05;
        let mut prev = 0;
        for i in 1..16 {
            let angle = (i as f32) * 0.5;
            let n = arc_segment_count(angle, thresh);
            assert!(n >= prev);
            prev = n;
        }
    }

    #[test]
    fn arc_count_increases_as_thresh_shrinks() {
        assert!(arc_segment_count(PI, 0.001) > arc_segment_count(PI, 0.1));
    }

    #[test]
    fn miter_factor_right_angle() {
        // At a 90 degree turn the miter tip sits sqrt(2) radii out.
        let f = miter_extension_factor(0.5 * PI);
        assert!((f - core::f32::consts::SQRT_2).abs() < 1e-5);
    }
}
