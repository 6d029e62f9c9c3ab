use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use super::table;
use super::{CanonicalBrushKey, ChannelSet, UniformCaps};
use crate::assets::{ColorSpace, join_asset_path};
use crate::uniforms::{UniformValue, standard_uniforms};

// ============================================================================
// Render state
// ============================================================================

/// Which faces are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    /// The face wgpu should cull, `None` for double-sided brushes.
    #[inline]
    #[must_use]
    pub fn cull_face(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Alpha,
    Additive,
}

impl BlendMode {
    #[must_use]
    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Opaque => None,
            BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
            BlendMode::Additive => {
                let additive = wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                };
                Some(wgpu::BlendState {
                    color: additive,
                    alpha: additive,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Alpha test with the given cutoff.
    Mask(f32),
    Blend,
}

impl AlphaMode {
    #[inline]
    #[must_use]
    pub fn cutoff(self) -> Option<f32> {
        match self {
            AlphaMode::Mask(cutoff) => Some(cutoff),
            _ => None,
        }
    }
}

/// Fixed pipeline state of a brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub side: Side,
    pub blend: BlendMode,
    pub alpha_mode: AlphaMode,
    pub transparent: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub depth_compare: wgpu::CompareFunction,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            side: Side::Front,
            blend: BlendMode::Opaque,
            alpha_mode: AlphaMode::Opaque,
            transparent: false,
            depth_write: true,
            depth_test: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        }
    }
}

impl RenderState {
    /// Render state for a blend mode: blended brushes are transparent and do
    /// not write depth.
    #[must_use]
    pub fn for_blend(blend: BlendMode, side: Side, alpha_mode: AlphaMode) -> Self {
        let blended = blend != BlendMode::Opaque;
        Self {
            side,
            blend,
            alpha_mode: if blended { AlphaMode::Blend } else { alpha_mode },
            transparent: blended,
            depth_write: !blended,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        self.blend.blend_state()
    }

    #[inline]
    #[must_use]
    pub fn cull_face(&self) -> Option<wgpu::Face> {
        self.side.cull_face()
    }

    /// Depth compare function actually used; `Always` when depth testing is off.
    #[inline]
    #[must_use]
    pub fn effective_depth_compare(&self) -> wgpu::CompareFunction {
        if self.depth_test {
            self.depth_compare
        } else {
            wgpu::CompareFunction::Always
        }
    }
}

// ============================================================================
// Asset slots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Main,
    Bump,
    AlphaMask,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Main, TextureSlot::Bump, TextureSlot::AlphaMask];

    /// Sampler uniform the slot binds to.
    #[must_use]
    pub fn uniform_name(self) -> &'static str {
        match self {
            TextureSlot::Main => "u_MainTex",
            TextureSlot::Bump => "u_BumpMap",
            TextureSlot::AlphaMask => "u_AlphaMask",
        }
    }

    /// `(1/w, 1/h, w, h)` uniform filled after the image is decoded.
    #[must_use]
    pub fn texel_size_uniform(self) -> &'static str {
        match self {
            TextureSlot::Main => "u_MainTex_TexelSize",
            TextureSlot::Bump => "u_BumpMap_TexelSize",
            TextureSlot::AlphaMask => "u_AlphaMask_TexelSize",
        }
    }

    /// File name suffix in the brush asset layout.
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            TextureSlot::Main => "MainTex.png",
            TextureSlot::Bump => "BumpMap.png",
            TextureSlot::AlphaMask => "AlphaMask.png",
        }
    }

    #[must_use]
    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureSlot::Main => ColorSpace::Srgb,
            TextureSlot::Bump | TextureSlot::AlphaMask => ColorSpace::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex.glsl",
            ShaderStage::Fragment => "fragment.glsl",
        }
    }
}

// ============================================================================
// BrushDefinition
// ============================================================================

/// Declarative bundle of shader files, texture files, uniform defaults and
/// render state for one canonical brush key.
///
/// All paths are relative to the loader's base path; use
/// [`shader_path`](Self::shader_path) / [`texture_path`](Self::texture_path)
/// to root them.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushDefinition {
    pub key: CanonicalBrushKey,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub textures: Vec<(TextureSlot, String)>,
    pub uniforms: Vec<(Cow<'static, str>, UniformValue)>,
    pub render_state: RenderState,
    pub channels: ChannelSet,
    pub capabilities: UniformCaps,
}

impl BrushDefinition {
    /// Creates a definition following the brush asset layout:
    /// `<Key>-<guid>/<Key>-<guid>-<version>-<Suffix>.<ext>`.
    ///
    /// Starts with no textures, no capabilities and the required channels only.
    #[must_use]
    pub fn with_layout(key: &str, guid: &str, version: &str) -> Self {
        let stem = format!("{key}-{guid}");
        let file = |suffix: &str| format!("{stem}/{stem}-{version}-{suffix}");
        Self {
            key: CanonicalBrushKey::new(key),
            vertex_shader: file(ShaderStage::Vertex.file_suffix()),
            fragment_shader: file(ShaderStage::Fragment.file_suffix()),
            textures: Vec::new(),
            uniforms: Vec::new(),
            render_state: RenderState::default(),
            channels: ChannelSet::REQUIRED,
            capabilities: UniformCaps::empty(),
        }
    }

    /// Adds a texture slot using the layout's file naming.
    #[must_use]
    pub fn with_texture(mut self, slot: TextureSlot) -> Self {
        let prefix = self
            .vertex_shader
            .strip_suffix(ShaderStage::Vertex.file_suffix())
            .unwrap_or_default();
        let path = format!("{prefix}{}", slot.file_suffix());
        self.textures.retain(|(s, _)| *s != slot);
        self.textures.push((slot, path));
        self
    }

    #[must_use]
    pub fn with_uniform(mut self, name: impl Into<Cow<'static, str>>, value: UniformValue) -> Self {
        let name = name.into();
        self.uniforms.retain(|(n, _)| *n != name);
        self.uniforms.push((name, value));
        self
    }

    #[must_use]
    pub fn with_render_state(mut self, render_state: RenderState) -> Self {
        self.render_state = render_state;
        if let Some(cutoff) = render_state.alpha_mode.cutoff()
            && self.uniform_default("u_Cutoff").is_none()
        {
            self.uniforms.push((Cow::Borrowed("u_Cutoff"), UniformValue::Float(cutoff)));
        }
        self
    }

    #[must_use]
    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels | ChannelSet::REQUIRED;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: UniformCaps) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Returns the relative file of a texture slot, if the brush uses it.
    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&str> {
        self.textures
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, path)| path.as_str())
    }

    /// Base-path-rooted location of a texture slot.
    #[must_use]
    pub fn texture_path(&self, base: &str, slot: TextureSlot) -> Option<String> {
        self.texture(slot).map(|rel| join_asset_path(base, rel))
    }

    /// Base-path-rooted location of a shader stage.
    #[must_use]
    pub fn shader_path(&self, base: &str, stage: ShaderStage) -> String {
        let rel = match stage {
            ShaderStage::Vertex => &self.vertex_shader,
            ShaderStage::Fragment => &self.fragment_shader,
        };
        join_asset_path(base, rel)
    }

    /// Every file a program load fetches, rooted at `base`.
    #[must_use]
    pub fn asset_paths(&self, base: &str) -> Vec<String> {
        let mut paths = vec![
            self.shader_path(base, ShaderStage::Vertex),
            self.shader_path(base, ShaderStage::Fragment),
        ];
        paths.extend(self.textures.iter().map(|(_, rel)| join_asset_path(base, rel)));
        paths
    }

    #[must_use]
    pub fn uniform_default(&self, name: &str) -> Option<UniformValue> {
        self.uniforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    #[inline]
    #[must_use]
    pub fn declares(&self, caps: UniformCaps) -> bool {
        self.capabilities.contains(caps)
    }

    /// Names of every uniform the program exposes: defaults, standard
    /// host-driven uniforms and texture samplers.
    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms
            .iter()
            .map(|(name, _)| name.as_ref())
            .chain(standard_uniforms(self.capabilities).map(|u| u.name))
            .chain(self.textures.iter().map(|(slot, _)| slot.uniform_name()))
    }
}

// ============================================================================
// MaterialParameterTable
// ============================================================================

/// Read-only lookup from canonical key to brush definition.
#[derive(Debug, Default)]
pub struct MaterialParameterTable {
    definitions: FxHashMap<CanonicalBrushKey, Arc<BrushDefinition>>,
}

impl MaterialParameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, built once per process.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<MaterialParameterTable>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut table = MaterialParameterTable::new();
                for definition in table::builtin_definitions() {
                    table.insert(definition);
                }
                log::debug!("Built-in brush table: {} definitions", table.len());
                Arc::new(table)
            })
            .clone()
    }

    pub fn insert(&mut self, definition: BrushDefinition) -> Option<Arc<BrushDefinition>> {
        self.definitions
            .insert(definition.key.clone(), Arc::new(definition))
    }

    /// Looks up a definition. Unknown keys and placeholder brushes return `None`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Arc<BrushDefinition>> {
        self.definitions.get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalBrushKey> {
        self.definitions.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BrushDefinition>> {
        self.definitions.values()
    }
}
