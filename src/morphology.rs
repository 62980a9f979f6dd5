//! Threshold binarization and disc dilation for the silhouette path

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

// ============================================================================
// BitMap
// ============================================================================

/// A width x height grid of on/off pixels: the silhouette mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMap {
    bits: Vec<bool>,
    width: u32,
    height: u32,
}

impl BitMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: vec![false; (width * height) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.bits[(y * self.width + x) as usize] = value;
    }

    /// True if at least one pixel is set
    pub fn any_set(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    /// Render the mask to a grayscale buffer (set = 255, clear = 0) so the
    /// anti-alias blur can run over it.
    pub fn to_gray_buffer(&self) -> PixelBuffer {
        let mut data = Vec::with_capacity(self.bits.len() * 4);
        for &bit in &self.bits {
            let v = if bit { 255 } else { 0 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
        // Length is bits * 4 = width * height * 4 by construction
        PixelBuffer::from_rgba(self.width, self.height, data)
            .unwrap_or_else(|_| unreachable!("bitmap dimensions are valid"))
    }
}

/// Pixel is set iff its grayscale value is strictly above `threshold`.
pub fn binarize(buf: &PixelBuffer, threshold: u8) -> BitMap {
    let mut map = BitMap::new(buf.width(), buf.height());
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            if buf.gray(x, y) > threshold {
                map.set(x, y, true);
            }
        }
    }
    map
}

/// Grow the mask outward with a disc structuring element: a pixel is set
/// in the output iff any input pixel within Euclidean distance
/// `radius_px` is set. Radius below one pixel of reach is a plain copy.
pub fn dilate(map: &BitMap, radius_px: f32) -> BitMap {
    if radius_px < 1.0 {
        return map.clone();
    }
    let w = map.width as i64;
    let h = map.height as i64;
    let reach = radius_px.floor() as i64;
    let radius_sq = radius_px * radius_px;

    let mut out = map.clone();
    out.bits
        .par_chunks_exact_mut(map.width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for x in 0..w {
                if row[x as usize] {
                    continue;
                }
                'scan: for ky in -reach..=reach {
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
                        if map.get(sx as u32, sy as u32) {
                            row[x as usize] = true;
                            break 'scan;
                        }
                    }
                }
            }
        });
    out
}
