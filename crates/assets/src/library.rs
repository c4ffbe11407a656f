use phosphor_common::MeshHandle;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Mesh, MeshError};

/// Handle-addressed registry of shared, read-only meshes.
///
/// One mesh may back many instances at different transforms; the library
/// hands out `Arc` clones and never mutates a registered mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: BTreeMap<MeshHandle, Arc<Mesh>>,
    names: BTreeMap<String, MeshHandle>,
    next_id: u64,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the stock `cube`, `paddle` and `ball` meshes.
    pub fn with_defaults() -> Self {
        let mut library = Self::new();
        library.insert_named("cube", Mesh::cube(1.0));
        library.insert_named("paddle", Mesh::cuboid(1.0, 1.0, 1.0));
        library.insert_named("ball", Mesh::icosphere(0.5, 1));
        library
    }

    /// Register a mesh and return its handle.
    pub fn insert(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next_id);
        self.next_id += 1;
        self.meshes.insert(handle, Arc::new(mesh));
        handle
    }

    /// Register a mesh under a name. A later registration under the same name
    /// takes over the name; the earlier handle stays valid.
    pub fn insert_named(&mut self, name: impl Into<String>, mesh: Mesh) -> MeshHandle {
        let handle = self.insert(mesh);
        let name = name.into();
        tracing::debug!(%name, ?handle, "mesh registered");
        self.names.insert(name, handle);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&Arc<Mesh>> {
        self.meshes.get(&handle)
    }

    /// Like [`MeshLibrary::get`] but reports a missing handle as an error.
    pub fn require(&self, handle: MeshHandle) -> Result<Arc<Mesh>, MeshError> {
        self.meshes
            .get(&handle)
            .cloned()
            .ok_or(MeshError::NotFound(handle))
    }

    pub fn handle(&self, name: &str) -> Option<MeshHandle> {
        self.names.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<Mesh>> {
        self.handle(name).and_then(|h| self.get(h))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
