//! Brush Identity and Definitions
//!
//! - [`BrushRegistry`]: legacy identifier (GUID, name, prefixed name) to [`CanonicalBrushKey`]
//! - [`MaterialParameterTable`]: canonical key to [`BrushDefinition`]
//! - `table`: the built-in brush data both of the above are built from
//!
//! Everything downstream of resolution keys on [`CanonicalBrushKey`].

pub mod definition;
pub mod registry;
mod table;

pub use definition::{
    AlphaMode, BlendMode, BrushDefinition, MaterialParameterTable, RenderState, ShaderStage, Side,
    TextureSlot,
};
pub use registry::{BrushAliases, BrushRegistry, RegistryBuilder};

use bitflags::bitflags;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stable name of one logical brush family.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalBrushKey(Arc<str>);

impl CanonicalBrushKey {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalBrushKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalBrushKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalBrushKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl PartialEq<str> for CanonicalBrushKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for CanonicalBrushKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for CanonicalBrushKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CanonicalBrushKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalBrushKey({})", &self.0)
    }
}

bitflags! {
    /// Vertex channels a brush program consumes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ChannelSet: u8 {
        const POSITION = 1 << 0;
        const NORMAL   = 1 << 1;
        const COLOR    = 1 << 2;
        const UV0      = 1 << 3;
        const UV1      = 1 << 4;

        /// Channels every brush needs.
        const REQUIRED = Self::POSITION.bits() | Self::COLOR.bits();
    }
}

bitflags! {
    /// Host-driven uniforms a brush program declares.
    ///
    /// Computed once when the brush table is authored; FrameSync consults
    /// these instead of probing the program every frame.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UniformCaps: u16 {
        const TIME                 = 1 << 0;
        const CAMERA_POSITION      = 1 << 1;
        const SCENE_LIGHT_0_COLOR  = 1 << 2;
        const SCENE_LIGHT_1_COLOR  = 1 << 3;
        const SCENE_LIGHT_0_MATRIX = 1 << 4;
        const SCENE_LIGHT_1_MATRIX = 1 << 5;
        const AMBIENT_LIGHT        = 1 << 6;
        const FOG_COLOR            = 1 << 7;
        const FOG_DENSITY          = 1 << 8;

        const FOG = Self::FOG_COLOR.bits() | Self::FOG_DENSITY.bits();
        const SCENE_LIGHTS = Self::SCENE_LIGHT_0_COLOR.bits()
            | Self::SCENE_LIGHT_1_COLOR.bits()
            | Self::SCENE_LIGHT_0_MATRIX.bits()
            | Self::SCENE_LIGHT_1_MATRIX.bits();
        const LIT = Self::SCENE_LIGHTS.bits() | Self::AMBIENT_LIGHT.bits() | Self::FOG.bits();
    }
}
