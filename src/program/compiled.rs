use std::sync::Arc;

use super::compiler::ProgramHandle;
use crate::assets::TextureImage;
use crate::brush::{BrushDefinition, CanonicalBrushKey, RenderState, TextureSlot, UniformCaps};
use crate::uniforms::UniformSet;

/// A texture decoded for one of the brush's sampler slots.
#[derive(Debug, Clone)]
pub struct BoundTexture {
    pub slot: TextureSlot,
    pub image: TextureImage,
}

/// A loaded, compiled brush program.
///
/// One instance exists per canonical key per cache; materials share it
/// through `Arc` and copy [`default_uniforms`](Self::default_uniforms) into
/// their own [`UniformSet`].
#[derive(Debug)]
pub struct CompiledProgram {
    pub handle: ProgramHandle,
    pub definition: Arc<BrushDefinition>,
    pub vertex_source: String,
    pub fragment_source: String,
    pub textures: Vec<BoundTexture>,
    pub default_uniforms: UniformSet,
}

impl CompiledProgram {
    #[inline]
    #[must_use]
    pub fn key(&self) -> &CanonicalBrushKey {
        &self.definition.key
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> UniformCaps {
        self.definition.capabilities
    }

    #[inline]
    #[must_use]
    pub fn render_state(&self) -> &RenderState {
        &self.definition.render_state
    }

    /// `true` if the program has a uniform slot named `name`.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.default_uniforms.contains(name)
    }

    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&TextureImage> {
        self.textures
            .iter()
            .find(|t| t.slot == slot)
            .map(|t| &t.image)
    }
}
