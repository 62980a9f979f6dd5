//! Canonical in-memory image representation
//!
//! Every pipeline stage consumes and produces a [`PixelBuffer`]: row-major
//! RGBA8888, `data.len() == width * height * 4` by construction. Filters
//! preserve alpha and never resize a buffer mid-pipeline.

use crate::error::{Error, Result};

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer, the input and output of every filter stage and
/// the sampling source for both mesh generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create an opaque black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width,
                height,
                len: 0,
            });
        }
        let mut data = vec![0u8; (width * height * 4) as usize];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap an existing RGBA byte vector. The length must be exactly
    /// `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != (width * height * 4) as usize {
            return Err(Error::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Decode PNG/JPEG/… bytes into an RGBA buffer.
    ///
    /// This is the only place the crate touches an encoded image; a failed
    /// decode is fatal to the request and produces no output.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| Error::Decode(e.to_string()))?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.into_raw())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the pixel at (x, y)
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    #[inline]
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.pixel_index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn set_rgba(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.pixel_index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Grayscale intensity at (x, y). After the grayscale stage all three
    /// color channels are equal, so the red channel is the height signal.
    #[inline]
    pub fn gray(&self, x: u32, y: u32) -> u8 {
        self.data[self.pixel_index(x, y)]
    }

    // ------------------------------------------------------------------
    // Nearest sampling in normalized [0,1] coordinates
    // ------------------------------------------------------------------

    /// Pixel coordinate for a normalized coordinate, nearest-sample rule:
    /// `floor(u * (extent - 1))`, clamped into range.
    #[inline]
    fn nearest(u: f32, extent: u32) -> u32 {
        let i = (u * (extent - 1) as f32).floor();
        (i.max(0.0) as u32).min(extent - 1)
    }

    /// Nearest-sampled grayscale value at normalized (u, v)
    #[inline]
    pub fn sample_gray(&self, u: f32, v: f32) -> u8 {
        let x = Self::nearest(u, self.width);
        let y = Self::nearest(v, self.height);
        self.gray(x, y)
    }

    /// Nearest-sampled RGB at normalized (u, v), scaled to [0, 1]
    #[inline]
    pub fn sample_rgb(&self, u: f32, v: f32) -> [f32; 3] {
        let x = Self::nearest(u, self.width);
        let y = Self::nearest(v, self.height);
        let px = self.rgba(x, y);
        [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ]
    }
}
