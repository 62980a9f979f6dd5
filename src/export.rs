//! ASCII STL serialization of generated meshes
//!
//! One `solid` block, triangles in index-buffer order, numbers in
//! scientific notation with a fixed six-digit mantissa. The face normal
//! is the normalized cross product of the two edge vectors with no
//! degeneracy guard; callers filter zero-area triangles with
//! [`Mesh::retain_nondegenerate`](crate::Mesh::retain_nondegenerate)
//! before exporting.

use std::io::Write;

use log::debug;

use crate::error::Result;
use crate::math3d::Vec3;
use crate::mesh::Mesh;

/// Serialize the mesh as ASCII STL into `writer`.
pub fn write_stl<W: Write>(mesh: &Mesh, name: &str, writer: &mut W) -> Result<()> {
    writeln!(writer, "solid {name}")?;
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle(t);
        let va = Vec3::from_array(a);
        let vb = Vec3::from_array(b);
        let vc = Vec3::from_array(c);
        let normal = (vb - va).cross(&(vc - va)).normalize();

        writeln!(
            writer,
            "  facet normal {:.6e} {:.6e} {:.6e}",
            normal.x, normal.y, normal.z
        )?;
        writeln!(writer, "    outer loop")?;
        for v in [a, b, c] {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v[0], v[1], v[2])?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    debug!("exported {} triangles as solid \"{name}\"", mesh.triangle_count());
    Ok(())
}

/// Serialize the mesh as an in-memory ASCII STL string.
pub fn stl_string(mesh: &Mesh, name: &str) -> String {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail
    if write_stl(mesh, name, &mut bytes).is_ok() {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        String::new()
    }
}
