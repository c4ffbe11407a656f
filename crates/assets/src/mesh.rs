use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::MeshError;

/// Upper bound for icosphere subdivision (20 * 4^6 faces).
pub const MAX_ICOSPHERE_SUBDIVISIONS: u32 = 6;

/// Wireframe mesh: vertices, edges between vertex pairs, and faces.
///
/// Faces are never filled; they only decide edge visibility in the renderer.
/// Every index stored here is a valid vertex index.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    edges: Vec<[usize; 2]>,
    faces: Vec<Vec<usize>>,
    /// Per face, the indices into `edges` of its boundary edges.
    face_edges: Vec<Vec<usize>>,
    /// Edges that bound no face.
    loose_edges: Vec<usize>,
}

/// A vertex in the JSON geometry format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// JSON geometry format: `{vertices:[{x,y,z}], edges:[[i,j]], faces:[[i,j,k,...]]}`.
///
/// When `edges` is omitted the edge list is derived from the faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<VertexData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<[usize; 2]>>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Build a mesh from explicit vertices, edges and faces, validating every index.
    pub fn new(
        vertices: Vec<Vec3>,
        edges: Vec<[usize; 2]>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        for (edge, &[a, b]) in edges.iter().enumerate() {
            for index in [a, b] {
                if index >= vertex_count {
                    return Err(MeshError::EdgeOutOfRange {
                        edge,
                        index,
                        vertex_count,
                    });
                }
            }
            if a == b {
                return Err(MeshError::DegenerateEdge { edge, index: a });
            }
        }
        validate_faces(&faces, vertex_count)?;
        Ok(Self::assemble(vertices, edges, faces))
    }

    /// Build a mesh whose edge list is derived from its faces.
    pub fn from_faces(vertices: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        validate_faces(&faces, vertices.len())?;
        let edges = edges_from_faces(&faces);
        Ok(Self::assemble(vertices, edges, faces))
    }

    /// Axis-aligned cube of edge length `size`, centered on the origin.
    pub fn cube(size: f32) -> Self {
        Self::cuboid(size, size, size)
    }

    /// Axis-aligned box of width `w` (x), height `h` (y) and depth `d` (z).
    pub fn cuboid(w: f32, h: f32, d: f32) -> Self {
        let (x, y, z) = (w * 0.5, h * 0.5, d * 0.5);
        let vertices = vec![
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
        ];
        // Counter-clockwise seen from outside.
        let faces = vec![
            vec![4, 5, 6, 7], // +z
            vec![1, 0, 3, 2], // -z
            vec![5, 1, 2, 6], // +x
            vec![0, 4, 7, 3], // -x
            vec![7, 6, 2, 3], // +y
            vec![0, 1, 5, 4], // -y
        ];
        let edges = edges_from_faces(&faces);
        Self::assemble(vertices, edges, faces)
    }

    /// Geodesic sphere: an icosahedron whose triangles are split into four
    /// `subdivisions` times, with every vertex pushed out to `radius`.
    pub fn icosphere(radius: f32, subdivisions: u32) -> Self {
        let subdivisions = if subdivisions > MAX_ICOSPHERE_SUBDIVISIONS {
            tracing::warn!(
                requested = subdivisions,
                max = MAX_ICOSPHERE_SUBDIVISIONS,
                "icosphere subdivision clamped"
            );
            MAX_ICOSPHERE_SUBDIVISIONS
        } else {
            subdivisions
        };

        let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let mut vertices: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z).normalize() * radius)
        .collect();

        let mut triangles: Vec<[usize; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
            let mut midpoint = |a: usize, b: usize, vertices: &mut Vec<Vec3>| -> usize {
                *midpoints.entry(sorted_pair(a, b)).or_insert_with(|| {
                    let m = ((vertices[a] + vertices[b]) * 0.5).normalize_or_zero() * radius;
                    vertices.push(m);
                    vertices.len() - 1
                })
            };

            let mut next = Vec::with_capacity(triangles.len() * 4);
            for [a, b, c] in triangles {
                let ab = midpoint(a, b, &mut vertices);
                let bc = midpoint(b, c, &mut vertices);
                let ca = midpoint(c, a, &mut vertices);
                next.push([a, ab, ca]);
                next.push([b, bc, ab]);
                next.push([c, ca, bc]);
                next.push([ab, bc, ca]);
            }
            triangles = next;
        }

        let faces: Vec<Vec<usize>> = triangles.into_iter().map(|t| t.to_vec()).collect();
        let edges = edges_from_faces(&faces);
        Self::assemble(vertices, edges, faces)
    }

    /// Parse and validate a mesh from the JSON geometry format.
    pub fn from_json_str(json: &str) -> Result<Self, MeshError> {
        let data: MeshData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    /// Load and validate a mesh from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let file = std::fs::File::open(path.as_ref())?;
        let data: MeshData = serde_json::from_reader(std::io::BufReader::new(file))?;
        let mesh = Self::try_from(data)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            vertices = mesh.vertex_count(),
            edges = mesh.edge_count(),
            faces = mesh.face_count(),
            "mesh loaded"
        );
        Ok(mesh)
    }

    /// Write the mesh in the JSON geometry format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.to_data())?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, MeshError> {
        Ok(serde_json::to_string_pretty(&self.to_data())?)
    }

    pub fn to_data(&self) -> MeshData {
        MeshData {
            vertices: self
                .vertices
                .iter()
                .map(|v| VertexData {
                    x: v.x,
                    y: v.y,
                    z: v.z,
                })
                .collect(),
            edges: Some(self.edges.clone()),
            faces: self.faces.clone(),
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Indices into [`Mesh::edges`] of the boundary edges of face `face`.
    pub fn face_edges(&self, face: usize) -> &[usize] {
        self.face_edges.get(face).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices into [`Mesh::edges`] of edges that bound no face.
    pub fn loose_edges(&self) -> &[usize] {
        &self.loose_edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Largest distance of any vertex from the local origin.
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max)
    }

    /// Build adjacency for already-validated geometry.
    fn assemble(vertices: Vec<Vec3>, edges: Vec<[usize; 2]>, faces: Vec<Vec<usize>>) -> Self {
        let mut lookup: HashMap<(usize, usize), usize> = HashMap::with_capacity(edges.len());
        for (i, &[a, b]) in edges.iter().enumerate() {
            lookup.entry(sorted_pair(a, b)).or_insert(i);
        }

        let mut bounded = vec![false; edges.len()];
        let face_edges: Vec<Vec<usize>> = faces
            .iter()
            .map(|face| {
                let mut ids = Vec::with_capacity(face.len());
                for (a, b) in face_pairs(face) {
                    if let Some(&e) = lookup.get(&sorted_pair(a, b)) {
                        bounded[e] = true;
                        ids.push(e);
                    }
                }
                ids
            })
            .collect();

        let loose_edges = bounded
            .iter()
            .enumerate()
            .filter(|(_, b)| !**b)
            .map(|(i, _)| i)
            .collect();

        Self {
            vertices,
            edges,
            faces,
            face_edges,
            loose_edges,
        }
    }
}

impl TryFrom<MeshData> for Mesh {
    type Error = MeshError;

    fn try_from(data: MeshData) -> Result<Self, Self::Error> {
        let vertices = data
            .vertices
            .into_iter()
            .map(|v| Vec3::new(v.x, v.y, v.z))
            .collect();
        match data.edges {
            Some(edges) => Self::new(vertices, edges, data.faces),
            None => Self::from_faces(vertices, data.faces),
        }
    }
}

fn validate_faces(faces: &[Vec<usize>], vertex_count: usize) -> Result<(), MeshError> {
    for (face, indices) in faces.iter().enumerate() {
        if indices.len() < 3 {
            return Err(MeshError::FaceTooSmall {
                face,
                len: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(MeshError::FaceOutOfRange {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Unique edges of `faces` in first-seen order, deduplicated by sorted index pair.
fn edges_from_faces(faces: &[Vec<usize>]) -> Vec<[usize; 2]> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for face in faces {
        for (a, b) in face_pairs(face) {
            if a != b && seen.insert(sorted_pair(a, b)) {
                edges.push([a, b]);
            }
        }
    }
    edges
}

/// Consecutive vertex pairs around a face, closing back to the first vertex.
fn face_pairs(face: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    face.iter()
        .zip(face.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b))
}

#[inline]
fn sorted_pair(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}
