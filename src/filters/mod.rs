//! Image filter pipeline: photo in, height/selection signal out
//!
//! Stage order is fixed: grayscale, invert, Gaussian blur, uniform (disc)
//! blur, tone curve. Each stage is a pure transform over the whole buffer;
//! each is row-parallel internally but the stages themselves run strictly
//! in sequence, since every stage reads the previous stage's full output.

mod blur;
mod curve;

pub use blur::{gaussian_blur, uniform_blur};
pub use curve::ToneCurve;

use log::debug;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::settings::FilterSettings;

/// ITU-R BT.601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Run the full filter pipeline. Deterministic, pure function of its
/// inputs; `source` is never mutated.
pub fn apply_filters(source: &PixelBuffer, settings: &FilterSettings) -> PixelBuffer {
    let mut buf = source.clone();

    grayscale_in_place(&mut buf);

    if settings.invert {
        invert_in_place(&mut buf);
    }

    if settings.gaussian_blur_radius > 0.0 {
        debug!(
            "gaussian blur radius {} on {}x{}",
            settings.gaussian_blur_radius,
            buf.width(),
            buf.height()
        );
        buf = gaussian_blur(&buf, settings.gaussian_blur_radius);
    }

    if settings.uniform_blur_radius > 0.0 {
        debug!(
            "uniform blur radius {} on {}x{}",
            settings.uniform_blur_radius,
            buf.width(),
            buf.height()
        );
        buf = uniform_blur(&buf, settings.uniform_blur_radius);
    }

    // The linear curve maps every intensity to itself, so it is skipped
    // outright; any other control points go through the LUT.
    if !ToneCurve::is_identity(settings.tone_curve) {
        let curve = ToneCurve::from_points(settings.tone_curve);
        curve.apply_in_place(&mut buf);
    }

    buf
}

/// Replace RGB with ITU luma, leaving alpha untouched.
pub fn grayscale_in_place(buf: &mut PixelBuffer) {
    buf.data_mut().par_chunks_exact_mut(4).for_each(|px| {
        let gray = (LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32)
            .round()
            .clamp(0.0, 255.0) as u8;
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    });
}

/// Invert every color channel, leaving alpha untouched.
pub fn invert_in_place(buf: &mut PixelBuffer) {
    buf.data_mut().par_chunks_exact_mut(4).for_each(|px| {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;

    fn test_buffer() -> PixelBuffer {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let v = (x * 60 + y * 13) as u8;
                buf.set_rgba(x, y, [v, 255 - v, v / 2, 200]);
            }
        }
        buf
    }

    #[test]
    fn test_identity_settings_equal_grayscale_alone() {
        let src = test_buffer();
        let filtered = apply_filters(&src, &FilterSettings::default());

        let mut expected = src.clone();
        grayscale_in_place(&mut expected);
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_grayscale_is_idempotent() {
        let mut once = test_buffer();
        grayscale_in_place(&mut once);
        let mut twice = once.clone();
        grayscale_in_place(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_grayscale_preserves_alpha() {
        let mut buf = test_buffer();
        grayscale_in_place(&mut buf);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.rgba(x, y)[3], 200);
            }
        }
    }

    #[test]
    fn test_invert_is_self_inverse() {
        let original = test_buffer();
        let mut buf = original.clone();
        invert_in_place(&mut buf);
        assert_ne!(buf, original);
        invert_in_place(&mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn test_luma_weights() {
        let mut buf = PixelBuffer::new(1, 1).unwrap();
        buf.set_rgba(0, 0, [255, 0, 0, 255]);
        grayscale_in_place(&mut buf);
        // 0.299 * 255 = 76.245 -> 76
        assert_eq!(buf.gray(0, 0), 76);
    }

    #[test]
    fn test_source_is_not_mutated() {
        let src = test_buffer();
        let copy = src.clone();
        let settings = FilterSettings {
            invert: true,
            gaussian_blur_radius: 2.0,
            uniform_blur_radius: 1.5,
            tone_curve: [0.25, 0.1, 0.75, 0.9],
        };
        let _ = apply_filters(&src, &settings);
        assert_eq!(src, copy);
    }
}
