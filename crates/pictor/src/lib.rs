#![deny(bare_trait_objects)]

//! Spatially partitioned GPU attribute/index data generation for 2D paths.
//!
//! # Crates
//!
//! This meta-crate (`pictor`) reexports the following sub-crates for convenience:
//!
//! * **pictor_geom** - Points, vectors, bounding boxes, clipping and the
//!   small numeric helpers the rest of the stack shares.
//! * **pictor_path** - The tessellated-path input model: segments, joins,
//!   caps and winding-labelled fill triangulations.
//! * **pictor_spatial** - Interval/rectangle spatial indexing: the
//!   interval tree used for hit testing and the rectangle atlas packer.
//! * **pictor_painter** - The attribute/index pipeline: spatial
//!   partitioning of path geometry, stroke and fill data generation, and
//!   the chunked attribute-data container.
//!
//! Each `pictor_<name>` crate is reexported as a `<name>` module. For example:
//!
//! ```ignore
//! extern crate pictor_painter;
//! use pictor_painter::StrokedPath;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! extern crate pictor;
//! use pictor::painter::StrokedPath;
//! ```
//!
//! # Feature flags
//!
//! Serialization of the geometric and wire-format types using serde can be
//! enabled with the `serialization` feature flag (disabled by default).
//!
//! # Example
//!
//! ```
//! use pictor::math::point;
//! use pictor::path::TessellatedPathBuilder;
//! use pictor::painter::StrokedPath;
//!
//! let mut builder = TessellatedPathBuilder::new();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.line_to(point(10.0, 10.0));
//! builder.end(false);
//!
//! let stroked = StrokedPath::new(&builder.build());
//! let root = stroked.partition().root_subset().id();
//! let edges = stroked.edges(root);
//!
//! // The generated chunks are ready to be uploaded to the GPU.
//! println!(
//!     " -- {} attributes {} indices",
//!     edges.attribute_data().len(),
//!     edges.index_data().len()
//! );
//! ```

pub extern crate pictor_painter;
pub extern crate pictor_spatial;

pub use pictor_painter as painter;
pub use pictor_spatial as spatial;
pub use painter::geom;
pub use painter::path;

pub use geom::math;
