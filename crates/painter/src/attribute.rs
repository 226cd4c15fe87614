//! The fixed-width per-vertex wire format.
//!
//! Every generated vertex is three `uvec4`s; the meaning of each lane is
//! defined by the packer that produced it (see
//! [`stroked_point`](../stroked_point/index.html) and
//! [`arc_stroked_point`](../arc_stroked_point/index.html)). Floats travel
//! bit-cast, never converted.

/// Index into a [`PainterAttribute`](struct.PainterAttribute.html) array.
pub type PainterIndex = u32;

/// One GPU vertex: three `uvec4`s.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PainterAttribute {
    pub attrib0: [u32; 4],
    pub attrib1: [u32; 4],
    pub attrib2: [u32; 4],
}

/// Bit-casts a float into an attribute lane.
#[inline]
pub fn pack_float(f: f32) -> u32 {
    f.to_bits()
}

/// Recovers a float from an attribute lane.
#[inline]
pub fn unpack_float(u: u32) -> f32 {
    f32::from_bits(u)
}

/// Writes `value` into the bit range `[bit0, bit0 + num_bits)`.
#[inline]
pub fn pack_bits(bit0: u32, num_bits: u32, value: u32) -> u32 {
    debug_assert!(num_bits < 32);
    debug_assert!(value < (1 << num_bits), "value does not fit in field");
    value << bit0
}

/// Reads the bit range `[bit0, bit0 + num_bits)`.
#[inline]
pub fn unpack_bits(bit0: u32, num_bits: u32, packed: u32) -> u32 {
    debug_assert!(num_bits < 32);
    (packed >> bit0) & ((1 << num_bits) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_lane_round_trip() {
        for &f in &[0.0f32, -0.0, 1.5, -3.25e7, f32::INFINITY] {
            assert_eq!(unpack_float(pack_float(f)).to_bits(), f.to_bits());
        }
    }

    #[test]
    fn bit_fields_do_not_collide() {
        let packed = pack_bits(0, 4, 9) | pack_bits(4, 1, 1) | pack_bits(5, 20, 0xABCDE);
        assert_eq!(unpack_bits(0, 4, packed), 9);
        assert_eq!(unpack_bits(4, 1, packed), 1);
        assert_eq!(unpack_bits(5, 20, packed), 0xABCDE);
    }
}
