#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Tessellated path data structures consumed by the pictor pipeline.
//!
//! This crate is reexported in [pictor](https://docs.rs/pictor/).
//!
//! A [`TessellatedPath`](struct.TessellatedPath.html) is the normalized form
//! the rest of the pipeline operates on: contours broken into edges, edges
//! broken into line and circular-arc [`Segment`](struct.Segment.html)s, with
//! a [`Join`](struct.Join.html) at every interior vertex and up to two
//! [`Cap`](struct.Cap.html)s on open contours. Producing this form from
//! curves is the job of an external tessellator; the
//! [`TessellatedPathBuilder`](struct.TessellatedPathBuilder.html) assembles
//! one from already-flattened geometry and fills in lengths, tangents and
//! turn data.
//!
//! For fills, [`FillTessellation`](struct.FillTessellation.html) carries
//! winding-tagged triangles plus the boundary chains between regions of
//! differing winding number.

pub extern crate pictor_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod fill;
mod segment;
mod tessellated;

pub use crate::fill::{BoundaryChain, FillTessellation, FillTriangle};
pub use crate::segment::{Segment, SegmentKind, SegmentSplit};
pub use crate::tessellated::{
    Cap, Join, SegmentChain, TessellatedPath, TessellatedPathBuilder,
};

/// f32 aliases of the euclid types, reexported from `pictor_geom`.
pub mod math {
    pub use pictor_geom::math::*;
}
