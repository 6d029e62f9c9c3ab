use super::attributes::MeshAttributeSet;
use crate::frame_sync::FrameState;
use crate::material::MaterialAssignment;

/// One drawable primitive of an imported scene.
#[derive(Debug, Clone, Default)]
pub struct ImportedMesh {
    pub name: String,
    /// Index into the document's `materials` array.
    pub material_index: Option<usize>,
    pub attributes: MeshAttributeSet,
    pub material: MaterialAssignment,
}

impl ImportedMesh {
    #[must_use]
    pub fn new(name: impl Into<String>, material_index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            material_index,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: MeshAttributeSet) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Host-side scene graph as produced by the import: a flat list of mesh
/// primitives in document order.
#[derive(Debug, Clone, Default)]
pub struct ImportedScene {
    pub meshes: Vec<ImportedMesh>,
}

impl ImportedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: ImportedMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Meshes that ended up with a brush material.
    pub fn brush_meshes(&self) -> impl Iterator<Item = &ImportedMesh> {
        self.meshes.iter().filter(|m| m.material.is_brush())
    }

    /// Runs FrameSync on every brush mesh. Call once per frame before drawing.
    pub fn sync_frame(&mut self, frame: &FrameState<'_>) {
        for material in self
            .meshes
            .iter_mut()
            .filter_map(|m| m.material.as_brush_mut())
        {
            material.sync(frame);
        }
    }
}
