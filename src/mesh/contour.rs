//! Marching-squares silhouette extrusion: the shape-clipped stamp
//!
//! The silhouette mask decides *where* geometry exists; the grayscale
//! signal still decides how high it is. Side walls are not traced as an
//! ordered polyline: every polygon edge is counted in an edge-usage
//! table, and an edge used exactly once lies on the silhouette, so a
//! wall quad is raised there. Contour closure falls out of the parity
//! rule.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{grid_segments, surface_color, EdgeKey, GridSample, Mesh, VertexKey, BOTTOM_COLOR};
use crate::buffer::PixelBuffer;
use crate::filters::uniform_blur;
use crate::morphology::{binarize, dilate};
use crate::settings::MeshSettings;

/// Corner values closer than this are treated as flat and their crossing
/// defaults to the edge midpoint
const CROSSING_EPSILON: f32 = 1e-3;

/// A point on the evaluation lattice, normalized [0,1] image space
#[derive(Debug, Clone, Copy)]
struct GridPoint {
    u: f32,
    v: f32,
}

impl GridPoint {
    #[inline]
    fn key(&self) -> VertexKey {
        VertexKey::of(self.u, self.v)
    }
}

/// Extrude the image's silhouette into a closed solid clipped to the
/// detected shape.
///
/// Returns an empty mesh when no pixel passes the threshold; callers
/// treat that as "no exportable geometry", not as an error.
pub fn generate_contour_mesh(
    grayscale: &PixelBuffer,
    color_source: Option<&PixelBuffer>,
    settings: &MeshSettings,
) -> Mesh {
    let img_w = grayscale.width();
    let img_h = grayscale.height();
    let longer_side = img_w.max(img_h) as f32;
    let threshold = settings.outline_threshold;

    let dilation_radius = settings.clamped_offset_percent() * longer_side / 100.0;
    let mask = dilate(&binarize(grayscale, threshold), dilation_radius);
    if !mask.any_set() {
        debug!("contour mesh: no pixels above threshold {threshold}, empty silhouette");
        return Mesh::new();
    }

    let resolution = settings.clamped_resolution();
    let (segs_x, segs_y) = grid_segments(img_w, img_h, resolution);

    // Anti-alias the mask before resampling so the iso-crossing is a
    // smooth ramp rather than a pixel staircase. One evaluation-grid
    // cell worth of source pixels; shrinks as the grid gets denser.
    let smooth_radius = (longer_side / resolution as f32).max(1.0);
    let field_buf = uniform_blur(&mask.to_gray_buffer(), smooth_radius);
    let field = GridSample::from_buffer(&field_buf, segs_x, segs_y);

    let mut builder = ContourBuilder::new(grayscale, color_source, settings);
    let iso = threshold as f32;
    for cy in 0..segs_y {
        for cx in 0..segs_x {
            let polygon = cell_polygon(&field, cx, cy, segs_x, segs_y, iso);
            if polygon.len() >= 3 {
                builder.add_polygon(&polygon);
            }
        }
    }
    builder.finish()
}

#[inline]
fn lattice_point(corner: (u32, u32), segs_x: u32, segs_y: u32) -> GridPoint {
    GridPoint {
        u: corner.0 as f32 / segs_x as f32,
        v: corner.1 as f32 / segs_y as f32,
    }
}

/// Interpolated iso-crossing on the lattice edge between corners `a` and
/// `b`. The corners are re-ordered canonically before interpolating so
/// the two cells sharing this edge compute the bit-identical point.
fn edge_crossing(
    a: (u32, u32),
    va: f32,
    b: (u32, u32),
    vb: f32,
    iso: f32,
    segs_x: u32,
    segs_y: u32,
) -> GridPoint {
    let ((ca, cva), (cb, cvb)) = if (a.1, a.0) <= (b.1, b.0) {
        ((a, va), (b, vb))
    } else {
        ((b, vb), (a, va))
    };
    let t = if (cvb - cva).abs() < CROSSING_EPSILON {
        0.5
    } else {
        ((iso - cva) / (cvb - cva)).clamp(0.0, 1.0)
    };
    let pa = lattice_point(ca, segs_x, segs_y);
    let pb = lattice_point(cb, segs_x, segs_y);
    GridPoint {
        u: pa.u + t * (pb.u - pa.u),
        v: pa.v + t * (pb.v - pa.v),
    }
}

/// One marching-squares cell evaluation.
///
/// Walks the four corners and edge crossings in fixed clockwise order
/// (TL, top edge, TR, right edge, BR, bottom edge, BL, left edge),
/// keeping each corner iff it is above the iso level and each crossing
/// iff its edge changes state. Case 0 yields nothing; case 15 yields the
/// full cell quad. Consecutive points that collapse to the same
/// quantized key are merged so crossings landing on corners cannot
/// produce zero-area fan triangles.
fn cell_polygon(
    field: &GridSample,
    cx: u32,
    cy: u32,
    segs_x: u32,
    segs_y: u32,
    iso: f32,
) -> Vec<GridPoint> {
    let corners = [
        (cx, cy),
        (cx + 1, cy),
        (cx + 1, cy + 1),
        (cx, cy + 1),
    ];
    let mut points: Vec<GridPoint> = Vec::with_capacity(6);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let va = field.value(a.0, a.1);
        let vb = field.value(b.0, b.1);
        if va > iso {
            points.push(lattice_point(a, segs_x, segs_y));
        }
        if (va > iso) != (vb > iso) {
            points.push(edge_crossing(a, va, b, vb, iso, segs_x, segs_y));
        }
    }
    dedup_cyclic(&mut points);
    points
}

/// Remove consecutive points sharing a quantized key, treating the list
/// as cyclic.
fn dedup_cyclic(points: &mut Vec<GridPoint>) {
    let mut i = 0;
    while points.len() > 1 && i < points.len() {
        let next = (i + 1) % points.len();
        if points[i].key() == points[next].key() {
            points.remove(next);
        } else {
            i += 1;
        }
    }
}

// ============================================================================
// Builder: vertex dedup, fan triangulation, edge-parity walls
// ============================================================================

struct EdgeRecord {
    a: GridPoint,
    b: GridPoint,
    count: u32,
}

struct ContourBuilder<'a> {
    mesh: Mesh,
    /// Quantized position -> top-surface vertex index
    top_index: HashMap<VertexKey, u32>,
    /// Independent map for the bottom: same XY, different Z and color
    bottom_index: HashMap<VertexKey, u32>,
    /// Undirected edge -> usage; BTreeMap so wall emission order is
    /// deterministic across runs
    edges: BTreeMap<EdgeKey, EdgeRecord>,
    grayscale: &'a PixelBuffer,
    color_source: Option<&'a PixelBuffer>,
    settings: &'a MeshSettings,
}

impl<'a> ContourBuilder<'a> {
    fn new(
        grayscale: &'a PixelBuffer,
        color_source: Option<&'a PixelBuffer>,
        settings: &'a MeshSettings,
    ) -> Self {
        Self {
            mesh: Mesh::new(),
            top_index: HashMap::new(),
            bottom_index: HashMap::new(),
            edges: BTreeMap::new(),
            grayscale,
            color_source,
            settings,
        }
    }

    fn top_vertex(&mut self, p: GridPoint) -> u32 {
        if let Some(&index) = self.top_index.get(&p.key()) {
            return index;
        }
        let g = self.grayscale.sample_gray(p.u, p.v) as f32 / 255.0;
        let position = [
            (p.u - 0.5) * self.settings.width,
            (p.v - 0.5) * self.settings.height,
            self.settings.base_height + g * self.settings.extrusion_height,
        ];
        let color = surface_color(self.grayscale, self.color_source, p.u, p.v);
        let index = self.mesh.push_vertex(position, color);
        self.top_index.insert(p.key(), index);
        index
    }

    fn bottom_vertex(&mut self, p: GridPoint) -> u32 {
        if let Some(&index) = self.bottom_index.get(&p.key()) {
            return index;
        }
        let position = [
            (p.u - 0.5) * self.settings.width,
            (p.v - 0.5) * self.settings.height,
            0.0,
        ];
        let index = self.mesh.push_vertex(position, BOTTOM_COLOR);
        self.bottom_index.insert(p.key(), index);
        index
    }

    /// Fan-triangulate one cell polygon twice (top, bottom reversed) and
    /// record its perimeter in the edge-usage table.
    fn add_polygon(&mut self, points: &[GridPoint]) {
        let top: Vec<u32> = points.iter().map(|&p| self.top_vertex(p)).collect();
        for i in 1..top.len() - 1 {
            self.mesh.push_triangle(top[0], top[i], top[i + 1]);
        }

        let bottom: Vec<u32> = points.iter().map(|&p| self.bottom_vertex(p)).collect();
        for i in 1..bottom.len() - 1 {
            self.mesh.push_triangle(bottom[0], bottom[i + 1], bottom[i]);
        }

        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            self.edges
                .entry(EdgeKey::of(a.key(), b.key()))
                .and_modify(|rec| rec.count += 1)
                .or_insert(EdgeRecord { a, b, count: 1 });
        }
    }

    /// Raise a wall quad on every edge used exactly once. The stored
    /// first-seen direction is the owning polygon's traversal order,
    /// which puts the outside on the wall's visible side.
    fn finish(mut self) -> Mesh {
        let boundary: Vec<(GridPoint, GridPoint)> = self
            .edges
            .values()
            .filter(|rec| rec.count == 1)
            .map(|rec| (rec.a, rec.b))
            .collect();

        for &(a, b) in &boundary {
            let top_a = self.top_vertex(a);
            let top_b = self.top_vertex(b);
            let bottom_a = self.bottom_vertex(a);
            let bottom_b = self.bottom_vertex(b);
            self.mesh.push_triangle(top_a, bottom_a, top_b);
            self.mesh.push_triangle(top_b, bottom_a, bottom_b);
        }

        debug!(
            "contour mesh: {} vertices, {} triangles, {} boundary edges",
            self.mesh.vertex_count(),
            self.mesh.triangle_count(),
            boundary.len()
        );
        self.mesh
    }
}
