//! Regular-grid relief solid: the full-rectangle stamp

use log::debug;

use super::{grid_segments, surface_color, Mesh, BOTTOM_COLOR};
use crate::buffer::PixelBuffer;
use crate::settings::MeshSettings;

/// Extrude the grayscale signal into a closed, six-sided relief solid.
///
/// The top surface is a `segs_x x segs_y` grid displaced by the height
/// signal, the bottom is the same lattice flat at z = 0, and four side
/// walls stitch the borders together. Deterministic for identical inputs.
pub fn generate_heightfield_mesh(
    grayscale: &PixelBuffer,
    color_source: Option<&PixelBuffer>,
    settings: &MeshSettings,
) -> Mesh {
    let (segs_x, segs_y) = grid_segments(
        grayscale.width(),
        grayscale.height(),
        settings.clamped_resolution(),
    );
    let cols = segs_x + 1;

    let mesh_w = settings.width;
    let mesh_h = settings.height;
    let mut mesh = Mesh::new();

    // Top lattice: relief surface. Vertex (x, y) lands at index
    // y * cols + x, so the quad loops below can address neighbors directly.
    for y in 0..=segs_y {
        let v = y as f32 / segs_y as f32;
        for x in 0..=segs_x {
            let u = x as f32 / segs_x as f32;
            let g = grayscale.sample_gray(u, v) as f32 / 255.0;
            let position = [
                (u - 0.5) * mesh_w,
                (v - 0.5) * mesh_h,
                settings.base_height + g * settings.extrusion_height,
            ];
            mesh.push_vertex(position, surface_color(grayscale, color_source, u, v));
        }
    }

    // Two triangles per cell, wound for +Z top normals
    for y in 0..segs_y {
        for x in 0..segs_x {
            let a = y * cols + x;
            let b = y * cols + x + 1;
            let c = (y + 1) * cols + x + 1;
            let d = (y + 1) * cols + x;
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
    }

    // Bottom lattice: flat at z = 0, reversed winding for -Z normals
    let bottom_start = mesh.vertex_count() as u32;
    for y in 0..=segs_y {
        let v = y as f32 / segs_y as f32;
        for x in 0..=segs_x {
            let u = x as f32 / segs_x as f32;
            mesh.push_vertex([(u - 0.5) * mesh_w, (v - 0.5) * mesh_h, 0.0], BOTTOM_COLOR);
        }
    }
    for y in 0..segs_y {
        for x in 0..segs_x {
            let a = bottom_start + y * cols + x;
            let b = bottom_start + y * cols + x + 1;
            let c = bottom_start + (y + 1) * cols + x + 1;
            let d = bottom_start + (y + 1) * cols + x;
            mesh.push_triangle(a, c, b);
            mesh.push_triangle(a, d, c);
        }
    }

    // Side walls reuse the existing border vertices, wound outward

    // Left wall (x = 0)
    for y in 0..segs_y {
        let top_a = y * cols;
        let top_b = (y + 1) * cols;
        let bottom_a = bottom_start + y * cols;
        let bottom_b = bottom_start + (y + 1) * cols;
        mesh.push_triangle(top_a, top_b, bottom_a);
        mesh.push_triangle(top_b, bottom_b, bottom_a);
    }

    // Right wall (x = segs_x)
    for y in 0..segs_y {
        let top_a = y * cols + segs_x;
        let top_b = (y + 1) * cols + segs_x;
        let bottom_a = bottom_start + y * cols + segs_x;
        let bottom_b = bottom_start + (y + 1) * cols + segs_x;
        mesh.push_triangle(top_a, bottom_a, top_b);
        mesh.push_triangle(top_b, bottom_a, bottom_b);
    }

    // Front wall (y = 0)
    for x in 0..segs_x {
        let top_a = x;
        let top_b = x + 1;
        let bottom_a = bottom_start + x;
        let bottom_b = bottom_start + x + 1;
        mesh.push_triangle(top_a, bottom_a, top_b);
        mesh.push_triangle(top_b, bottom_a, bottom_b);
    }

    // Back wall (y = segs_y)
    for x in 0..segs_x {
        let top_a = segs_y * cols + x;
        let top_b = segs_y * cols + x + 1;
        let bottom_a = bottom_start + segs_y * cols + x;
        let bottom_b = bottom_start + segs_y * cols + x + 1;
        mesh.push_triangle(top_a, top_b, bottom_a);
        mesh.push_triangle(top_b, bottom_b, bottom_a);
    }

    debug!(
        "heightfield mesh: {}x{} segments, {} vertices, {} triangles",
        segs_x,
        segs_y,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math3d::Vec3;
    use std::collections::HashMap;

    fn white_square(size: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(size, size).unwrap();
        for y in 0..size {
            for x in 0..size {
                buf.set_rgba(x, y, [255, 255, 255, 255]);
            }
        }
        buf
    }

    #[test]
    fn test_vertex_and_triangle_counts_closed_form() {
        // R x R resolution on a square image: (R+1)^2 vertices top and
        // bottom, 4R^2 + 8R triangles
        let buf = white_square(64);
        let settings = MeshSettings {
            resolution: 16,
            ..MeshSettings::default()
        };
        let mesh = generate_heightfield_mesh(&buf, None, &settings);
        let r = 16u32;
        assert_eq!(mesh.vertex_count(), ((r + 1) * (r + 1) * 2) as usize);
        assert_eq!(mesh.triangle_count(), (4 * r * r + 8 * r) as usize);
    }

    #[test]
    fn test_heights_follow_signal() {
        let mut buf = white_square(4);
        // Darken one corner region
        buf.set_rgba(0, 0, [0, 0, 0, 255]);
        let settings = MeshSettings {
            resolution: 10,
            extrusion_height: 10.0,
            base_height: 2.0,
            ..MeshSettings::default()
        };
        let mesh = generate_heightfield_mesh(&buf, None, &settings);
        // First top vertex samples (0,0): black -> base height only
        assert_eq!(mesh.positions[0][2], 2.0);
        // Last top vertex samples (1,1): white -> base + extrusion
        let cols = 5;
        let last_top = cols * cols - 1;
        assert_eq!(mesh.positions[last_top][2], 12.0);
    }

    #[test]
    fn test_all_indices_in_range_and_multiple_of_three() {
        let buf = white_square(8);
        let mesh = generate_heightfield_mesh(&buf, None, &MeshSettings::default());
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.positions.len(), mesh.colors.len());
    }

    #[test]
    fn test_mesh_is_watertight() {
        // Every edge of a closed solid is shared by exactly two triangles
        let buf = white_square(6);
        let settings = MeshSettings {
            resolution: 12,
            ..MeshSettings::default()
        };
        let mesh = generate_heightfield_mesh(&buf, None, &settings);

        let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in mesh.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&c| c == 2));
    }

    #[test]
    fn test_top_normals_point_up() {
        let buf = white_square(4);
        let settings = MeshSettings {
            resolution: 10,
            extrusion_height: 0.0,
            base_height: 1.0,
            ..MeshSettings::default()
        };
        let mesh = generate_heightfield_mesh(&buf, None, &settings);
        // With a flat top every top-surface triangle normal is +Z; the
        // top surface is the first 2 * segs^2 triangles
        let segs = 4;
        for t in 0..(2 * segs * segs) {
            let [a, b, c] = mesh.triangle(t);
            let n = (Vec3::from_array(b) - Vec3::from_array(a))
                .cross(&(Vec3::from_array(c) - Vec3::from_array(a)));
            assert!(n.z > 0.0, "triangle {t} normal not upward");
        }
    }

    #[test]
    fn test_color_source_sampling() {
        let gray = white_square(4);
        let mut color = PixelBuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                color.set_rgba(x, y, [255, 0, 0, 255]);
            }
        }
        let settings = MeshSettings::default();
        let mesh = generate_heightfield_mesh(&gray, Some(&color), &settings);
        // Top vertices take the color source; bottom vertices stay gray
        assert_eq!(mesh.colors[0], [1.0, 0.0, 0.0]);
        let bottom_first = mesh.vertex_count() / 2;
        assert_eq!(mesh.colors[bottom_first], BOTTOM_COLOR);
    }

    #[test]
    fn test_deterministic() {
        let buf = white_square(8);
        let settings = MeshSettings::default();
        let a = generate_heightfield_mesh(&buf, None, &settings);
        let b = generate_heightfield_mesh(&buf, None, &settings);
        assert_eq!(a, b);
    }
}
