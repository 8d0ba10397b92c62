/*!
16-bit axis quantization for the replicated turn offset.

The wire format is a single `u16` per character: the full -180..180 degree
ring scaled into 65536 steps. Negative angles wrap through the integer cast,
so compression accepts any finite degree value and decompression always lands
back in (-180, 180].
*/

use crate::angle::normalize_axis;

const SCALE: f32 = 65536.0 / 360.0;
const INV_SCALE: f32 = 360.0 / 65536.0;

/// Quantizes a degree angle onto the 16-bit ring.
#[inline]
pub fn compress_axis_to_u16(angle_deg: f32) -> u16 {
    // Cast through i32 so negative angles wrap into the ring instead of
    // saturating at zero.
    (angle_deg * SCALE).round() as i32 as u16
}

/// Inverts [`compress_axis_to_u16`], returning degrees in (-180, 180].
#[inline]
pub fn decompress_axis_from_u16(code: u16) -> f32 {
    normalize_axis(code as f32 * INV_SCALE)
}
