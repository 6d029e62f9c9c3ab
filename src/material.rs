use std::sync::Arc;

use crate::assets::TextureImage;
use crate::brush::{CanonicalBrushKey, RenderState, TextureSlot};
use crate::frame_sync::{FrameState, FrameSyncBinding, sync_material};
use crate::program::CompiledProgram;
use crate::uniforms::{UniformSet, UniformValue};

/// Per-mesh instance of a brush program.
///
/// Shares the compiled program and owns its uniform values, so two meshes
/// using the same brush can be synced independently.
#[derive(Debug, Clone)]
pub struct BrushMaterial {
    program: Arc<CompiledProgram>,
    uniforms: UniformSet,
    sync: FrameSyncBinding,
}

impl BrushMaterial {
    #[must_use]
    pub fn new(program: Arc<CompiledProgram>) -> Self {
        let uniforms = program.default_uniforms.clone();
        let sync = FrameSyncBinding::resolve(program.capabilities(), &uniforms);
        Self {
            program,
            uniforms,
            sync,
        }
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> &Arc<CompiledProgram> {
        &self.program
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &CanonicalBrushKey {
        self.program.key()
    }

    #[inline]
    #[must_use]
    pub fn render_state(&self) -> &RenderState {
        self.program.render_state()
    }

    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&TextureImage> {
        self.program.texture(slot)
    }

    #[inline]
    #[must_use]
    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    #[inline]
    pub fn uniforms_mut(&mut self) -> &mut UniformSet {
        &mut self.uniforms
    }

    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name)
    }

    #[inline]
    #[must_use]
    pub fn sync_binding(&self) -> &FrameSyncBinding {
        &self.sync
    }

    /// Applies FrameSync for this frame.
    pub fn sync(&mut self, frame: &FrameState<'_>) {
        sync_material(self, frame);
    }
}

/// Material slot of an imported mesh.
#[derive(Debug, Clone, Default)]
pub enum MaterialAssignment {
    /// Host default material: unresolved, undefined or failed brushes.
    #[default]
    Default,
    Brush(Box<BrushMaterial>),
}

impl MaterialAssignment {
    #[must_use]
    pub fn is_brush(&self) -> bool {
        matches!(self, Self::Brush(_))
    }

    #[must_use]
    pub fn as_brush(&self) -> Option<&BrushMaterial> {
        match self {
            Self::Brush(material) => Some(material.as_ref()),
            Self::Default => None,
        }
    }

    pub fn as_brush_mut(&mut self) -> Option<&mut BrushMaterial> {
        match self {
            Self::Brush(material) => Some(material.as_mut()),
            Self::Default => None,
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&CanonicalBrushKey> {
        self.as_brush().map(BrushMaterial::key)
    }
}
