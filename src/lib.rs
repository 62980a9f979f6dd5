//! stampcast: turn a raster image into a 3D-printable relief stamp
//!
//! The pipeline has two halves. The filter half reduces a photo to a
//! grayscale height/selection signal: grayscale, optional invert, a
//! separable Gaussian blur, a disc-masked uniform blur, and a cubic
//! Bézier tone curve. The geometry half extrudes that signal into a
//! watertight solid, either as a full rectangle
//! ([`generate_heightfield_mesh`]) or clipped to the image's silhouette
//! via marching squares ([`generate_contour_mesh`]), and serializes the
//! result as ASCII STL.
//!
//! The crate is a pure core: it takes decoded pixel buffers and value
//! structs, returns buffers and meshes, and performs no UI, network, or
//! display work.
//!
//! ```
//! use stampcast::{
//!     apply_filters, generate_contour_mesh, stl_string, FilterSettings, MeshSettings,
//!     PixelBuffer,
//! };
//!
//! # fn main() -> stampcast::Result<()> {
//! let source = PixelBuffer::new(64, 64)?;
//! let signal = apply_filters(&source, &FilterSettings::default());
//! let mesh = generate_contour_mesh(&signal, Some(&source), &MeshSettings::default());
//! if !mesh.is_empty() {
//!     let stl = stl_string(&mesh, "stamp");
//!     assert!(stl.starts_with("solid stamp"));
//! }
//! # Ok(())
//! # }
//! ```

mod buffer;
mod error;
mod export;
mod filters;
mod math3d;
mod mesh;
mod morphology;
mod settings;

pub use buffer::PixelBuffer;
pub use error::{Error, Result};
pub use export::{stl_string, write_stl};
pub use filters::{
    apply_filters, gaussian_blur, grayscale_in_place, invert_in_place, uniform_blur, ToneCurve,
};
pub use math3d::Vec3;
pub use mesh::{generate_contour_mesh, generate_heightfield_mesh, Mesh};
pub use morphology::{binarize, dilate, BitMap};
pub use settings::{FilterSettings, MeshSettings, Settings, MAX_RESOLUTION, MIN_RESOLUTION};
