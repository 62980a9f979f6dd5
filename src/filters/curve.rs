//! Cubic Bézier tone curve, applied through a 256-entry LUT
//!
//! The curve is anchored at (0,0) and (1,1) with caller-supplied control
//! points (x1,y1) and (x2,y2). Evaluation plugs the input intensity in as
//! the Bézier parameter `t` directly instead of solving for the `t` whose
//! X equals the input; the x control points therefore never participate.
//! This matches the long-standing behavior of the tone-remap stage and is
//! kept for compatibility. Consequence: the LUT is only guaranteed
//! monotonic for y1 <= y2 with control points inside [0,1].

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Precomputed intensity remap table.
pub struct ToneCurve {
    lut: [u8; 256],
}

impl ToneCurve {
    /// Build the LUT from (x1, y1, x2, y2) control points.
    pub fn from_points(points: [f32; 4]) -> Self {
        let [_x1, y1, _x2, y2] = points;
        let mut lut = [0u8; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let t = i as f32 / 255.0;
            let y = bezier_y(t, y1, y2).clamp(0.0, 1.0);
            *entry = (y * 255.0).round() as u8;
        }
        Self { lut }
    }

    /// The linear curve (0,0,1,1) is special-cased by the pipeline and
    /// never evaluated, so identity settings leave intensities untouched.
    #[inline]
    pub fn is_identity(points: [f32; 4]) -> bool {
        points == [0.0, 0.0, 1.0, 1.0]
    }

    /// Remap a single intensity
    #[inline]
    pub fn remap(&self, v: u8) -> u8 {
        self.lut[v as usize]
    }

    /// Apply the LUT to R, G and B of every pixel, leaving alpha untouched.
    pub fn apply_in_place(&self, buf: &mut PixelBuffer) {
        let lut = &self.lut;
        buf.data_mut().par_chunks_exact_mut(4).for_each(|px| {
            px[0] = lut[px[0] as usize];
            px[1] = lut[px[1] as usize];
            px[2] = lut[px[2] as usize];
        });
    }
}

/// `B(t).y` for endpoints (0,0)/(1,1): the (1-t)³ term vanishes and the
/// t³ term has coefficient 1.
#[inline]
fn bezier_y(t: f32, y1: f32, y2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * y1 + 3.0 * mt * t * t * y2 + t * t * t
}
