//! Hit-testing of laid-out glyph runs.
//!
//! Layout is line oriented, so the index is two level: an interval tree
//! over y selects candidate lines, and a per-line interval tree over x
//! selects the glyphs under the query point.

use pictor_geom::math::Point;

use crate::interval_finder::IntervalFinder;

/// The x-axis glyph index of a single layout line.
#[derive(Clone, Debug)]
pub struct PerLine {
    vertical: (f32, f32),
    glyphs: IntervalFinder<usize>,
}

impl PerLine {
    fn new(horizontal: (f32, f32), vertical: (f32, f32)) -> Self {
        PerLine {
            vertical,
            glyphs: IntervalFinder::new(horizontal.0, horizontal.1),
        }
    }

    /// The y-range the line occupies.
    pub fn vertical_range(&self) -> (f32, f32) {
        self.vertical
    }

    pub fn add_glyph(&mut self, horizontal: (f32, f32), glyph: usize) {
        self.glyphs.add_entry(horizontal, glyph);
    }

    pub fn find_glyphs(&self, x: f32, out: &mut Vec<usize>) {
        self.glyphs.find_entries(x, out);
    }
}

/// Two-level interval index mapping a point to the glyphs under it.
///
/// Glyph values are caller-chosen indices (typically into the caller's
/// glyph-run storage); the finder never interprets them.
#[derive(Clone, Debug)]
pub struct GlyphFinder {
    lines: Vec<PerLine>,
    line_finder: IntervalFinder<usize>,
}

impl GlyphFinder {
    /// Creates a finder whose lines all fall within the y-range
    /// `vertical_domain`.
    pub fn new(vertical_domain: (f32, f32)) -> Self {
        GlyphFinder {
            lines: Vec::new(),
            line_finder: IntervalFinder::new(vertical_domain.0, vertical_domain.1),
        }
    }

    /// Registers a layout line spanning `horizontal` × `vertical`,
    /// returning its index for later
    /// [`add_glyph`](#method.add_glyph) calls.
    pub fn add_line(&mut self, horizontal: (f32, f32), vertical: (f32, f32)) -> usize {
        let index = self.lines.len();
        self.lines.push(PerLine::new(horizontal, vertical));
        self.line_finder.add_entry(vertical, index);
        index
    }

    pub fn line(&self, index: usize) -> &PerLine {
        &self.lines[index]
    }

    pub fn number_lines(&self) -> usize {
        self.lines.len()
    }

    /// Records that `glyph` occupies `horizontal` on line `line`.
    pub fn add_glyph(&mut self, line: usize, horizontal: (f32, f32), glyph: usize) {
        self.lines[line].add_glyph(horizontal, glyph);
    }

    /// Appends to `out` every glyph whose box contains `p`.
    pub fn query(&self, p: Point, out: &mut Vec<usize>) {
        let mut candidate_lines = Vec::new();
        self.line_finder.find_entries(p.y, &mut candidate_lines);
        for line in candidate_lines {
            self.lines[line].find_glyphs(p.x, out);
        }
    }

    /// The first glyph found under `p`, if any.
    pub fn glyph_source(&self, p: Point) -> Option<usize> {
        let mut hits = Vec::new();
        self.query(p, &mut hits);
        hits.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_geom::math::point;

    fn sample_layout() -> GlyphFinder {
        // Three lines of five glyphs, 10 units wide, lines 12 units tall.
        let mut finder = GlyphFinder::new((0.0, 36.0));
        for row in 0..3 {
            let y0 = row as f32 * 12.0;
            let line = finder.add_line((0.0, 50.0), (y0, y0 + 12.0));
            for col in 0..5 {
                let x0 = col as f32 * 10.0;
                finder.add_glyph(line, (x0, x0 + 10.0), row * 5 + col);
            }
        }
        finder
    }

    #[test]
    fn hit_inside_a_glyph() {
        let finder = sample_layout();
        assert_eq!(finder.glyph_source(point(25.0, 5.0)), Some(2));
        assert_eq!(finder.glyph_source(point(3.0, 30.0)), Some(10));
        assert_eq!(finder.glyph_source(point(47.0, 15.0)), Some(9));
    }

    #[test]
    fn miss_outside_layout() {
        let finder = sample_layout();
        assert_eq!(finder.glyph_source(point(60.0, 5.0)), None);
        assert_eq!(finder.glyph_source(point(25.0, 40.0)), None);
        assert_eq!(finder.glyph_source(point(-1.0, -1.0)), None);
    }

    #[test]
    fn shared_boundary_reports_both() {
        let finder = sample_layout();
        // x = 10 is the boundary between glyphs 0 and 1 of line 0; y = 12
        // is shared by lines 0 and 1.
        let mut hits = Vec::new();
        finder.query(point(10.0, 12.0), &mut hits);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 5, 6]);
    }
}
