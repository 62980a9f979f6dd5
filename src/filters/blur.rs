//! The two blur kernels: separable Gaussian and disc-masked box blur

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// 9-tap Gaussian kernel, tap k sits at `(k - 4) * radius` pixels
const GAUSS_WEIGHTS: [f32; 9] = [
    0.0162162162,
    0.0540540541,
    0.1216216216,
    0.1945945946,
    0.2270270270,
    0.1945945946,
    0.1216216216,
    0.0540540541,
    0.0162162162,
];

/// Approximately Gaussian low-pass, `radius` in pixels.
///
/// Separable two-pass convolution: the horizontal pass completes into a
/// scratch buffer before the vertical pass reads it. Samples are clamped
/// at the image borders.
pub fn gaussian_blur(src: &PixelBuffer, radius: f32) -> PixelBuffer {
    if radius <= 0.0 {
        return src.clone();
    }
    let horizontal = gaussian_pass(src, radius, true);
    gaussian_pass(&horizontal, radius, false)
}

fn gaussian_pass(src: &PixelBuffer, radius: f32, horizontal: bool) -> PixelBuffer {
    let w = src.width();
    let h = src.height();

    let mut offsets = [0i64; 9];
    for (k, offset) in offsets.iter_mut().enumerate() {
        *offset = ((k as f32 - 4.0) * radius).round() as i64;
    }

    let mut dst = src.clone();
    let row_len = (w * 4) as usize;
    dst.data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in 0..w {
                let mut acc = [0.0f32; 3];
                for (k, &weight) in GAUSS_WEIGHTS.iter().enumerate() {
                    let (sx, sy) = if horizontal {
                        (x as i64 + offsets[k], y as i64)
                    } else {
                        (x as i64, y as i64 + offsets[k])
                    };
                    let sx = sx.clamp(0, w as i64 - 1) as u32;
                    let sy = sy.clamp(0, h as i64 - 1) as u32;
                    let px = src.rgba(sx, sy);
                    acc[0] += weight * px[0] as f32;
                    acc[1] += weight * px[1] as f32;
                    acc[2] += weight * px[2] as f32;
                }
                let i = (x * 4) as usize;
                row[i] = acc[0].round().clamp(0.0, 255.0) as u8;
                row[i + 1] = acc[1].round().clamp(0.0, 255.0) as u8;
                row[i + 2] = acc[2].round().clamp(0.0, 255.0) as u8;
                // row[i + 3] keeps the source alpha from the clone
            }
        });
    dst
}

/// Box blur restricted to a circular kernel: every in-bounds neighbor
/// within Euclidean distance `radius` contributes equally. Near the
/// borders the divisor shrinks to the neighbors actually present; there
/// is no wraparound and no padding value.
pub fn uniform_blur(src: &PixelBuffer, radius: f32) -> PixelBuffer {
    if radius <= 0.0 {
        return src.clone();
    }
    let w = src.width() as i64;
    let h = src.height() as i64;
    let reach = radius.ceil() as i64;
    let radius_sq = radius * radius;

    let mut dst = src.clone();
    let row_len = (src.width() * 4) as usize;
    dst.data_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for x in 0..w {
                let mut acc = [0u32; 3];
                let mut count = 0u32;
                for ky in -reach..=reach {
                    let sy = y + ky;
                    if sy < 0 || sy >= h {
                        continue;
                    }
                    for kx in -reach..=reach {
                        if (kx * kx + ky * ky) as f32 > radius_sq {
                            continue;
                        }
                        let sx = x + kx;
                        if sx < 0 || sx >= w {
                            continue;
                        }
                        let px = src.rgba(sx as u32, sy as u32);
                        acc[0] += px[0] as u32;
                        acc[1] += px[1] as u32;
                        acc[2] += px[2] as u32;
                        count += 1;
                    }
                }
                let i = (x * 4) as usize;
                row[i] = ((acc[0] as f32 / count as f32).round()) as u8;
                row[i + 1] = ((acc[1] as f32 / count as f32).round()) as u8;
                row[i + 2] = ((acc[2] as f32 / count as f32).round()) as u8;
            }
        });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_buffer(w: u32, h: u32, v: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                buf.set_rgba(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    #[test]
    fn test_uniform_blur_radius_zero_is_identity() {
        let buf = constant_buffer(5, 5, 99);
        assert_eq!(uniform_blur(&buf, 0.0), buf);
    }

    #[test]
    fn test_uniform_blur_subpixel_radius_is_identity() {
        // A disc of radius 0.5 contains only the center sample
        let mut buf = PixelBuffer::new(3, 3).unwrap();
        buf.set_rgba(1, 1, [255, 255, 255, 255]);
        assert_eq!(uniform_blur(&buf, 0.5), buf);
    }

    #[test]
    fn test_uniform_blur_constant_unchanged() {
        let buf = constant_buffer(6, 4, 180);
        assert_eq!(uniform_blur(&buf, 2.0), buf);
    }

    #[test]
    fn test_uniform_blur_edge_divisor_shrinks() {
        // 2x1 image, radius 1: each pixel sees itself and its one neighbor
        let mut buf = PixelBuffer::new(2, 1).unwrap();
        buf.set_rgba(0, 0, [0, 0, 0, 255]);
        buf.set_rgba(1, 0, [255, 255, 255, 255]);
        let out = uniform_blur(&buf, 1.0);
        assert_eq!(out.gray(0, 0), 128);
        assert_eq!(out.gray(1, 0), 128);
    }

    #[test]
    fn test_uniform_blur_disc_excludes_corners() {
        // Radius 1 disc over a 3x3 neighborhood is a plus shape: the
        // corner at distance sqrt(2) must not contribute
        let mut buf = PixelBuffer::new(3, 3).unwrap();
        buf.set_rgba(0, 0, [255, 255, 255, 255]);
        let out = uniform_blur(&buf, 1.0);
        // Center pixel's disc: itself + 4 neighbors, none of which is the
        // lit corner
        assert_eq!(out.gray(1, 1), 0);
    }

    #[test]
    fn test_gaussian_blur_constant_unchanged() {
        let buf = constant_buffer(8, 8, 200);
        let out = gaussian_blur(&buf, 3.0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.gray(x, y), 200);
            }
        }
    }

    #[test]
    fn test_gaussian_blur_impulse_is_symmetric() {
        let mut buf = PixelBuffer::new(9, 9).unwrap();
        buf.set_rgba(4, 4, [255, 255, 255, 255]);
        let out = gaussian_blur(&buf, 1.0);
        for d in 1..=4u32 {
            assert_eq!(out.gray(4 - d, 4), out.gray(4 + d, 4));
            assert_eq!(out.gray(4, 4 - d), out.gray(4, 4 + d));
        }
        // Energy spreads away from the impulse
        assert!(out.gray(4, 4) < 255);
        assert!(out.gray(3, 4) > 0);
    }

    #[test]
    fn test_gaussian_blur_preserves_alpha() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                buf.set_rgba(x, y, [100, 100, 100, 42]);
            }
        }
        let out = gaussian_blur(&buf, 2.0);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.rgba(x, y)[3], 42);
            }
        }
    }
}
