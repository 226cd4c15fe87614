//! f32 aliases of the euclid types used throughout the pipeline.

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// Alias for `euclid::default::Size2D<f32>`.
pub type Size = euclid::default::Size2D<f32>;

/// Alias for `euclid::default::Box2D<f32>`.
pub type Box2D = euclid::default::Box2D<f32>;

/// Alias for `euclid::default::Point2D<i32>`, used by the atlas allocator.
pub type IntPoint = euclid::default::Point2D<i32>;

/// Alias for `euclid::default::Size2D<i32>`, used by the atlas allocator.
pub type IntSize = euclid::default::Size2D<i32>;

/// An f32 triple, used for clip half-plane equations `a·x + b·y + c ≥ 0`.
pub type ClipEquation = [f32; 3];

pub use core::f32::consts::PI;

/// Shorthand for `Point::new`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Vector::new`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Shorthand for `IntPoint::new`.
#[inline]
pub fn int_point(x: i32, y: i32) -> IntPoint {
    IntPoint::new(x, y)
}

/// Shorthand for `IntSize::new`.
#[inline]
pub fn int_size(w: i32, h: i32) -> IntSize {
    IntSize::new(w, h)
}

/// The vector `v` rotated a quarter turn counter-clockwise.
#[inline]
pub fn normal_of(v: Vector) -> Vector {
    vector(-v.y, v.x)
}
