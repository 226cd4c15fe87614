#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]

//! Spatial lookup structures used by the pictor pipeline.
//!
//! This crate is reexported in [pictor](https://docs.rs/pictor/).
//!
//! - [`IntervalFinder`](struct.IntervalFinder.html): a one-dimensional
//!   interval tree answering "which entries cover point x".
//! - [`RectAtlas`](struct.RectAtlas.html): a guillotine bin-packer over a
//!   fixed integer region.
//! - [`GlyphFinder`](struct.GlyphFinder.html): a two-level interval index
//!   for hit-testing laid-out glyph runs.
//!
//! None of these types are internally synchronized. Distinct instances may
//! be used from distinct threads, but sharing one instance across threads
//! requires external locking.

pub extern crate pictor_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod glyph_finder;
mod interval_finder;
mod rect_atlas;

pub use crate::glyph_finder::{GlyphFinder, PerLine};
pub use crate::interval_finder::IntervalFinder;
pub use crate::rect_atlas::RectAtlas;
