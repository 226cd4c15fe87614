use std::io;

use clap::ArgMatches;
use pictor::math::point;
use pictor::path::{TessellatedPath, TessellatedPathBuilder};

pub struct PartitionCmd {
    pub points: usize,
    pub clip_x: Option<f32>,
    pub output: Box<dyn io::Write>,
}

pub struct StrokeCmd {
    pub points: usize,
    pub thresh: f32,
    pub output: Box<dyn io::Write>,
}

pub struct FillCmd {
    pub quads: usize,
    pub output: Box<dyn io::Write>,
}

pub struct AtlasCmd {
    pub width: i32,
    pub height: i32,
    pub count: usize,
    pub seed: u64,
    pub output: Box<dyn io::Write>,
}

pub fn get_usize(matches: &ArgMatches, name: &str, default: usize) -> usize {
    if let Some(s) = matches.value_of(name) {
        return s.parse().unwrap_or(default);
    }
    default
}

pub fn get_i32(matches: &ArgMatches, name: &str, default: i32) -> i32 {
    if let Some(s) = matches.value_of(name) {
        return s.parse().unwrap_or(default);
    }
    default
}

pub fn get_f32(matches: &ArgMatches, name: &str, default: f32) -> f32 {
    if let Some(s) = matches.value_of(name) {
        return s.parse().unwrap_or(default);
    }
    default
}

/// An open spiral polyline with `points` vertices, large enough to make
/// the partition split several times.
pub fn build_spiral(points: usize) -> TessellatedPath {
    let mut builder = TessellatedPathBuilder::new();
    builder.begin(point(0.0, 0.0));
    for i in 1..points.max(2) {
        let t = i as f32 * 0.25;
        let r = 1.0 + t;
        builder.line_to(point(r * t.cos(), r * t.sin()));
    }
    builder.end(false);
    builder.build()
}
