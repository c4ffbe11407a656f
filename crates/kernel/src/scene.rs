//! Turns component state into renderer inputs.
//!
//! Extraction only asks whether an entity carries a mesh with a spatial
//! transform or a planar shape with a planar transform. It never looks at
//! view modes.

use phosphor_assets::MeshLibrary;
use phosphor_common::{Color, Transform};
use phosphor_ecs::{ComponentStore, Mesh3D, Renderable2D};
use phosphor_render::{MeshInstance, ShapeInstance};

/// Everything one frame draws.
#[derive(Debug, Clone, Default)]
pub struct Drawables {
    pub meshes: Vec<MeshInstance>,
    pub shapes: Vec<ShapeInstance>,
}

impl Drawables {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.shapes.is_empty()
    }
}

/// Collect drawables in entity order. Meshes without a color use `phosphor`.
pub fn extract(store: &ComponentStore, library: &MeshLibrary, phosphor: Color) -> Drawables {
    let mut drawables = Drawables::default();

    for (entity, mesh3d) in store.column::<Mesh3D>() {
        let Some(Transform::Spatial(transform)) = store.get::<Transform>(entity).copied() else {
            continue;
        };
        match library.get(mesh3d.handle) {
            Some(mesh) => drawables.meshes.push(MeshInstance {
                mesh: mesh.clone(),
                transform,
                color: mesh3d.color.unwrap_or(phosphor),
            }),
            None => tracing::warn!(%entity, handle = ?mesh3d.handle, "mesh handle not in library"),
        }
    }

    for (entity, renderable) in store.column::<Renderable2D>() {
        if let Some(Transform::Planar(transform)) = store.get::<Transform>(entity).copied() {
            drawables.shapes.push(ShapeInstance {
                shape: renderable.shape,
                transform,
                color: renderable.color,
            });
        }
    }

    drawables
}
