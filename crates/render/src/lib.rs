//! Rendering: camera, the hidden-line wireframe pipeline, and output surfaces.
//!
//! # Invariants
//! - The renderer never mutates simulation state; it only reads instances.
//! - Occlusion is approximate: back-face culling plus a global far-to-near
//!   sort. There is no depth buffer and no clipping against occluders.
//! - `resolve` output is exactly what gets drawn, so exporters can reuse it.
//! - Edges are clipped to the camera's near plane, and every rasterizer clips
//!   strokes to its surface, so one frame's work is bounded by the surface size.
//!
//! The pipeline draws onto any [`Canvas`]. [`Framebuffer`] is the software
//! backend; [`TextArt`] rasterizes resolved segments into characters.

mod camera;
mod canvas;
mod config;
mod pipeline;
mod text_art;

pub use camera::{Camera, MIN_ZOOM_DISTANCE, ORTHO_HALF_EXTENT, Projection};
pub use canvas::{Canvas, Framebuffer};
pub use config::{FrontFace, RenderConfig};
pub use pipeline::{LineSegment, MeshInstance, ShapeInstance, WireframeRenderer};
pub use text_art::TextArt;
