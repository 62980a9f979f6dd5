//! Mesh data model and the grid machinery shared by both generators

mod contour;
mod heightfield;

pub use contour::generate_contour_mesh;
pub use heightfield::generate_heightfield_mesh;

use crate::buffer::PixelBuffer;
use crate::math3d::Vec3;
use crate::settings::MAX_RESOLUTION;

/// Fixed color of every bottom-surface vertex
pub(crate) const BOTTOM_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

// ============================================================================
// Mesh
// ============================================================================

/// Indexed triangle mesh: parallel position/color sequences plus an index
/// buffer whose length is a multiple of three. Owned by the caller that
/// requested generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is no exportable geometry (the contour generator's
    /// empty-silhouette result)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex and return its index
    #[inline]
    pub(crate) fn push_vertex(&mut self, position: [f32; 3], color: [f32; 3]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.colors.push(color);
        index
    }

    #[inline]
    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    /// The three corner positions of triangle `t`
    #[inline]
    pub fn triangle(&self, t: usize) -> [[f32; 3]; 3] {
        let i = t * 3;
        [
            self.positions[self.indices[i] as usize],
            self.positions[self.indices[i + 1] as usize],
            self.positions[self.indices[i + 2] as usize],
        ]
    }

    /// Drop triangles whose area is not above `min_area`. Callers run this
    /// before export when they want the degenerate-facet guarantee; the
    /// generators themselves never auto-repair.
    pub fn retain_nondegenerate(&mut self, min_area: f32) {
        let positions = &self.positions;
        let mut kept = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            let a = Vec3::from_array(positions[tri[0] as usize]);
            let b = Vec3::from_array(positions[tri[1] as usize]);
            let c = Vec3::from_array(positions[tri[2] as usize]);
            let area = (b - a).cross(&(c - a)).length() * 0.5;
            if area > min_area {
                kept.extend_from_slice(tri);
            }
        }
        self.indices = kept;
    }
}

// ============================================================================
// Grid sizing and sampling
// ============================================================================

/// Segment counts for the evaluation grid. The requested resolution
/// applies to the image's shorter side; the longer side scales by aspect
/// ratio. Each axis is capped at the image's own pixel count and at 1024.
pub(crate) fn grid_segments(img_w: u32, img_h: u32, resolution: u32) -> (u32, u32) {
    let aspect = img_w as f32 / img_h as f32;
    let (mut segs_x, mut segs_y) = if img_w < img_h {
        let sx = resolution.min(img_w);
        let sy = ((resolution as f32 / aspect).round() as u32).min(img_h);
        (sx, sy)
    } else {
        let sy = resolution.min(img_h);
        let sx = ((resolution as f32 * aspect).round() as u32).min(img_w);
        (sx, sy)
    };
    segs_x = segs_x.min(MAX_RESOLUTION);
    segs_y = segs_y.min(MAX_RESOLUTION);
    (segs_x.max(1), segs_y.max(1))
}

/// Scalar intensities nearest-sampled onto the (segs_x+1) x (segs_y+1)
/// corner lattice of the evaluation grid.
pub(crate) struct GridSample {
    values: Vec<f32>,
    cols: u32,
}

impl GridSample {
    pub(crate) fn from_buffer(buf: &PixelBuffer, segs_x: u32, segs_y: u32) -> Self {
        let cols = segs_x + 1;
        let rows = segs_y + 1;
        let mut values = Vec::with_capacity((cols * rows) as usize);
        for y in 0..rows {
            let v = y as f32 / segs_y as f32;
            for x in 0..cols {
                let u = x as f32 / segs_x as f32;
                values.push(buf.sample_gray(u, v) as f32);
            }
        }
        Self { values, cols }
    }

    /// Intensity at lattice corner (x, y)
    #[inline]
    pub(crate) fn value(&self, x: u32, y: u32) -> f32 {
        self.values[(y * self.cols + x) as usize]
    }
}

/// Top-surface vertex color: nearest RGB from the color source when one
/// is provided, otherwise the grayscale intensity replicated.
#[inline]
pub(crate) fn surface_color(
    grayscale: &PixelBuffer,
    color_source: Option<&PixelBuffer>,
    u: f32,
    v: f32,
) -> [f32; 3] {
    match color_source {
        Some(src) => src.sample_rgb(u, v),
        None => {
            let g = grayscale.sample_gray(u, v) as f32 / 255.0;
            [g, g, g]
        }
    }
}

// ============================================================================
// Quantized coordinate keys for vertex and edge dedup
// ============================================================================

/// Collapse radius for coordinate keys, in normalized image space
pub(crate) const KEY_EPSILON: f32 = 1e-5;

/// A 2D point collapsed onto the `KEY_EPSILON` lattice, usable as a hash
/// map key where raw floats must not be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct VertexKey(i64, i64);

impl VertexKey {
    #[inline]
    pub(crate) fn of(u: f32, v: f32) -> Self {
        Self(
            (u / KEY_EPSILON).round() as i64,
            (v / KEY_EPSILON).round() as i64,
        )
    }
}

/// Order-independent key for an undirected edge between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EdgeKey(VertexKey, VertexKey);

impl EdgeKey {
    #[inline]
    pub(crate) fn of(a: VertexKey, b: VertexKey) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}
