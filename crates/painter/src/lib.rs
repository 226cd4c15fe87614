#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Generation of GPU attribute/index data from tessellated paths.
//!
//! This crate is reexported in [pictor](https://docs.rs/pictor/).
//!
//! The pipeline: a
//! [`TessellatedPath`](../pictor_path/struct.TessellatedPath.html) is
//! partitioned into a binary tree of spatially disjoint
//! [`Subset`](partitioned_path/struct.Subset.html)s; a
//! [`StrokedPath`](stroked_path/struct.StrokedPath.html) or
//! [`FilledPath`](filled_path/struct.FilledPath.html) lazily packs each
//! subset's geometry into
//! [`PainterAttributeData`](attribute_data/struct.PainterAttributeData.html)
//! chunks that an external renderer feeds to vertex/index buffers. Stroke
//! radius, join/cap style and fill rule are all resolved at draw time, so
//! one generated data set serves every stroke width and every fill rule.
//!
//! Nothing here is internally synchronized; the lazy per-subset caches
//! make the top-level types `!Sync` by construction. Distinct instances
//! are freely usable from distinct threads.

pub extern crate pictor_geom as geom;
pub extern crate pictor_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod arc_stroked_point;
pub mod attribute;
pub mod attribute_data;
pub mod filled_path;
pub mod partitioned_path;
pub mod stroked_path;
pub mod stroked_point;

pub use crate::attribute::{PainterAttribute, PainterIndex};
pub use crate::attribute_data::{
    AttributeDataFiller, DataSizes, FillDestination, PainterAttributeData, ZRange,
};
pub use crate::filled_path::FilledPath;
pub use crate::partitioned_path::{
    GeometryInflation, PartitionedTessellatedPath, ScratchSpace, Subset, SubsetId,
};
pub use crate::stroked_path::{StrokedCapsJoins, StrokedPath};
