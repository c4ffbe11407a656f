//! Mesh assets: wireframe geometry built from factories or imported from JSON.
//!
//! A `Mesh` is validated once at construction and immutable afterwards. The
//! renderer and the simulation share meshes read-only through `MeshLibrary`
//! handles, never by raw file paths.

mod library;
mod mesh;

pub use library::MeshLibrary;
pub use mesh::{MAX_ICOSPHERE_SUBDIVISIONS, Mesh, MeshData, VertexData};

use phosphor_common::MeshHandle;

/// Errors from mesh construction and mesh I/O.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("edge {edge} references vertex {index}, but the mesh has {vertex_count} vertices")]
    EdgeOutOfRange {
        edge: usize,
        index: usize,
        vertex_count: usize,
    },
    #[error("edge {edge} joins vertex {index} to itself")]
    DegenerateEdge { edge: usize, index: usize },
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
    #[error("face {face} has {len} vertices, at least 3 are required")]
    FaceTooSmall { face: usize, len: usize },
    #[error("mesh not found: {0:?}")]
    NotFound(MeshHandle),
}
