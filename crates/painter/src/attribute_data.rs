//! Chunked attribute/index buffer container.
//!
//! A [`PainterAttributeData`](struct.PainterAttributeData.html) owns one
//! flat attribute array and one flat index array; chunks are sub-ranges of
//! those arrays, independently addressable so a renderer can draw any
//! subset of the data without copying.

use crate::attribute::{PainterAttribute, PainterIndex};

use core::ops::Range;

/// Half-open range of depth (z) values a chunk's triangles occupy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ZRange {
    pub begin: i32,
    pub end: i32,
}

impl ZRange {
    pub fn difference(self) -> i32 {
        self.end - self.begin
    }
}

/// Sizes a filler reports before any allocation happens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSizes {
    pub number_attributes: usize,
    pub number_indices: usize,
    pub number_attribute_chunks: usize,
    pub number_index_chunks: usize,
    pub number_z_ranges: usize,
}

/// Mutable views a filler populates during
/// [`set_data`](struct.PainterAttributeData.html#method.set_data).
///
/// Every chunk range must be a sub-range of the matching flat array; the
/// flat arrays are exactly the sizes the filler reported.
pub struct FillDestination<'l> {
    pub attributes: &'l mut [PainterAttribute],
    pub indices: &'l mut [PainterIndex],
    pub attribute_chunks: &'l mut [Range<usize>],
    pub index_chunks: &'l mut [Range<usize>],
    pub z_ranges: &'l mut [ZRange],
    /// Per index chunk; added to each index when addressing attributes.
    pub index_adjusts: &'l mut [i32],
}

/// A synchronous callback that sizes and then populates a
/// [`PainterAttributeData`](struct.PainterAttributeData.html).
pub trait AttributeDataFiller {
    fn compute_sizes(&self, sizes: &mut DataSizes);
    fn fill_data(&self, dst: &mut FillDestination);
}

#[derive(Clone, Debug, Default)]
pub struct PainterAttributeData {
    attributes: Vec<PainterAttribute>,
    indices: Vec<PainterIndex>,
    attribute_chunks: Vec<Range<usize>>,
    index_chunks: Vec<Range<usize>>,
    z_ranges: Vec<ZRange>,
    index_adjusts: Vec<i32>,
    largest_attribute_chunk: usize,
    largest_index_chunk: usize,
    non_empty_index_chunks: Vec<usize>,
}

impl PainterAttributeData {
    pub fn new() -> Self {
        PainterAttributeData::default()
    }

    /// Builds a populated container from a filler.
    pub fn from_filler(filler: &dyn AttributeDataFiller) -> Self {
        let mut data = PainterAttributeData::new();
        data.set_data(filler);
        data
    }

    /// Replaces the contents: asks `filler` for sizes, allocates exactly
    /// those, lets the filler populate them, then computes the largest
    /// chunk sizes and the list of non-empty index chunks.
    pub fn set_data(&mut self, filler: &dyn AttributeDataFiller) {
        let mut sizes = DataSizes::default();
        filler.compute_sizes(&mut sizes);

        self.attributes = vec![PainterAttribute::default(); sizes.number_attributes];
        self.indices = vec![0; sizes.number_indices];
        self.attribute_chunks = vec![0..0; sizes.number_attribute_chunks];
        self.index_chunks = vec![0..0; sizes.number_index_chunks];
        self.z_ranges = vec![ZRange::default(); sizes.number_z_ranges];
        self.index_adjusts = vec![0; sizes.number_index_chunks];

        filler.fill_data(&mut FillDestination {
            attributes: &mut self.attributes,
            indices: &mut self.indices,
            attribute_chunks: &mut self.attribute_chunks,
            index_chunks: &mut self.index_chunks,
            z_ranges: &mut self.z_ranges,
            index_adjusts: &mut self.index_adjusts,
        });

        for chunk in &self.attribute_chunks {
            assert!(chunk.start <= chunk.end && chunk.end <= self.attributes.len());
        }
        for chunk in &self.index_chunks {
            assert!(chunk.start <= chunk.end && chunk.end <= self.indices.len());
        }

        self.largest_attribute_chunk = self
            .attribute_chunks
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0);
        self.largest_index_chunk = self
            .index_chunks
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0);
        self.non_empty_index_chunks = self
            .index_chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, _)| i)
            .collect();
    }

    pub fn attribute_data(&self) -> &[PainterAttribute] {
        &self.attributes
    }

    pub fn index_data(&self) -> &[PainterIndex] {
        &self.indices
    }

    pub fn number_attribute_chunks(&self) -> usize {
        self.attribute_chunks.len()
    }

    pub fn number_index_chunks(&self) -> usize {
        self.index_chunks.len()
    }

    /// Attribute chunk `i`; empty for out-of-range `i`.
    pub fn attribute_data_chunk(&self, i: usize) -> &[PainterAttribute] {
        match self.attribute_chunks.get(i) {
            Some(c) => &self.attributes[c.clone()],
            None => &[],
        }
    }

    /// Index chunk `i`; empty for out-of-range `i`.
    pub fn index_data_chunk(&self, i: usize) -> &[PainterIndex] {
        match self.index_chunks.get(i) {
            Some(c) => &self.indices[c.clone()],
            None => &[],
        }
    }

    /// Depth range of index chunk `i`; the zero range for out-of-range `i`.
    pub fn z_range(&self, i: usize) -> ZRange {
        self.z_ranges.get(i).copied().unwrap_or_default()
    }

    /// Index adjust of index chunk `i`; 0 for out-of-range `i`.
    pub fn index_adjust_chunk(&self, i: usize) -> i32 {
        self.index_adjusts.get(i).copied().unwrap_or(0)
    }

    pub fn largest_attribute_chunk(&self) -> usize {
        self.largest_attribute_chunk
    }

    pub fn largest_index_chunk(&self) -> usize {
        self.largest_index_chunk
    }

    /// Indices of the index chunks that hold at least one index, so a
    /// renderer can skip empty draws.
    pub fn non_empty_index_chunks(&self) -> &[usize] {
        &self.non_empty_index_chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::pack_float;

    // Fills K chunks of growing size, with one deliberately empty chunk.
    struct TestFiller {
        chunk_sizes: Vec<usize>,
    }

    impl AttributeDataFiller for TestFiller {
        fn compute_sizes(&self, sizes: &mut DataSizes) {
            let total: usize = self.chunk_sizes.iter().sum();
            sizes.number_attributes = total;
            sizes.number_indices = total * 3;
            sizes.number_attribute_chunks = self.chunk_sizes.len();
            sizes.number_index_chunks = self.chunk_sizes.len();
            sizes.number_z_ranges = self.chunk_sizes.len();
        }

        fn fill_data(&self, dst: &mut FillDestination) {
            let mut a = 0;
            let mut i = 0;
            let mut z = 0;
            for (c, &n) in self.chunk_sizes.iter().enumerate() {
                for k in 0..n {
                    dst.attributes[a + k].attrib0[0] = pack_float(k as f32);
                    for t in 0..3 {
                        dst.indices[i + 3 * k + t] = k as PainterIndex;
                    }
                }
                dst.attribute_chunks[c] = a..a + n;
                dst.index_chunks[c] = i..i + 3 * n;
                dst.z_ranges[c] = ZRange {
                    begin: z,
                    end: z + n as i32,
                };
                dst.index_adjusts[c] = a as i32;
                a += n;
                i += 3 * n;
                z += n as i32;
            }
        }
    }

    #[test]
    fn round_trip() {
        let filler = TestFiller {
            chunk_sizes: vec![2, 0, 5, 3],
        };
        let data = PainterAttributeData::from_filler(&filler);

        assert_eq!(data.number_attribute_chunks(), 4);
        assert_eq!(data.number_index_chunks(), 4);
        assert_eq!(data.attribute_data().len(), 10);
        assert_eq!(data.index_data().len(), 30);

        // Every index plus its chunk's adjust is a valid attribute index.
        for c in 0..data.number_index_chunks() {
            let adjust = data.index_adjust_chunk(c);
            for &i in data.index_data_chunk(c) {
                let attrib = i as i64 + adjust as i64;
                assert!(attrib >= 0 && (attrib as usize) < data.attribute_data().len());
            }
        }

        assert_eq!(data.largest_attribute_chunk(), 5);
        assert_eq!(data.largest_index_chunk(), 15);
        assert_eq!(data.non_empty_index_chunks(), &[0, 2, 3]);
        assert_eq!(data.z_range(2), ZRange { begin: 2, end: 7 });
    }

    #[test]
    fn out_of_range_chunks_are_empty() {
        let data = PainterAttributeData::from_filler(&TestFiller {
            chunk_sizes: vec![1],
        });
        assert!(data.attribute_data_chunk(7).is_empty());
        assert!(data.index_data_chunk(7).is_empty());
        assert_eq!(data.z_range(7), ZRange::default());
        assert_eq!(data.index_adjust_chunk(7), 0);
    }

    #[test]
    fn set_data_replaces_previous_contents() {
        let mut data = PainterAttributeData::from_filler(&TestFiller {
            chunk_sizes: vec![4, 4],
        });
        data.set_data(&TestFiller {
            chunk_sizes: vec![1],
        });
        assert_eq!(data.number_index_chunks(), 1);
        assert_eq!(data.attribute_data().len(), 1);
        assert_eq!(data.largest_index_chunk(), 3);
    }
}
